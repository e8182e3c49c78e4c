//! Verification findings.

use std::fmt;

use thiserror::Error;

use crate::error::IntegrityError;
use crate::ir::gate::GateId;
use crate::ir::opcode::OpCode;
use crate::ir::types::MachineType;

/// Which selector flow a finding concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorFlow {
    Data,
    Depend,
}

impl fmt::Display for SelectorFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectorFlow::Data => "data",
            SelectorFlow::Depend => "depend",
        })
    }
}

/// A structural rule a gate violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("input is empty")]
    EmptyInput,

    #[error("state input must be {expected}, found {actual}")]
    StateProducerMismatch { expected: OpCode, actual: OpCode },

    #[error("state input must be a general state gate, found {actual}")]
    NotGeneralState { actual: OpCode },

    #[error("value input has machine type {actual}, expected {expected}")]
    MachineTypeMismatch {
        expected: MachineType,
        actual: MachineType,
    },

    #[error("depend input {actual} produces no effect")]
    NotDependProducer { actual: OpCode },

    #[error("root input must be {expected}, found {actual}")]
    RootMismatch { expected: OpCode, actual: OpCode },

    #[error("frame state input must be FRAME_STATE, found {actual}")]
    NotFrameState { actual: OpCode },

    #[error("state successor count is {actual}, expected {expected}")]
    StateSuccessorCount { expected: usize, actual: usize },

    #[error("duplicate branch output {opcode} with {state_count} state inputs")]
    DuplicateBranchOutput { opcode: OpCode, state_count: usize },

    #[error("NOP gate has {count} consumers")]
    NopHasConsumers { count: usize },

    #[error("{flow} selector must hang off MERGE or LOOP_BEGIN, found {actual}")]
    SelectorNotOnMerge { flow: SelectorFlow, actual: OpCode },

    #[error("number of {flow} inputs does not match the merge (expected:{expected} actual:{actual})")]
    SelectorArity {
        flow: SelectorFlow,
        expected: usize,
        actual: usize,
    },

    #[error("DEPEND_RELAY must hang off a control case or block, found {actual}")]
    RelayNotOnCase { actual: OpCode },

    #[error("edge integrity: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("control flow cycle through {from} -> {to} without LOOP_BACK")]
    CfgCycle { from: GateId, to: GateId },

    #[error("CFG is not sound: control input {pred} is unreachable from STATE_ENTRY")]
    UnreachableStateInput { pred: GateId },

    #[error("data or depend flow cycle through {from} -> {to} without passing a selector")]
    FlowCycle { from: GateId, to: GateId },
}

/// One finding, located at a gate and optionally one of its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub gate: GateId,
    pub opcode: OpCode,
    pub input: Option<usize>,
    pub error: VerifyError,
    /// Dump of the gate with the offending input highlighted.
    pub dump: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.opcode, self.gate)?;
        if let Some(input) = self.input {
            write!(f, " input {}", input)?;
        }
        write!(f, ": {}", self.error)?;
        if !self.dump.is_empty() {
            write!(f, "\n    {}", self.dump)?;
        }
        Ok(())
    }
}

/// All findings of one verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    diagnostics: Vec<Diagnostic>,
    dropped: usize,
    limit: Option<usize>,
}

impl VerifyReport {
    pub fn new(limit: Option<usize>) -> Self {
        VerifyReport {
            diagnostics: Vec::new(),
            dropped: 0,
            limit,
        }
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        match self.limit {
            Some(limit) if self.diagnostics.len() >= limit => self.dropped += 1,
            _ => self.diagnostics.push(diagnostic),
        }
    }

    /// Check if nothing was found.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty() && self.dropped == 0
    }

    /// Recorded findings.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Findings not recorded because of the diagnostic limit.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Iterate over the recorded errors.
    pub fn errors(&self) -> impl Iterator<Item = &VerifyError> {
        self.diagnostics.iter().map(|d| &d.error)
    }

    /// Check if any recorded error satisfies `pred`.
    pub fn any(&self, pred: impl Fn(&VerifyError) -> bool) -> bool {
        self.errors().any(pred)
    }

    /// Convert into a `Result`, keeping the report as the error.
    pub fn into_result(self) -> Result<(), VerifyReport> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub(crate) fn merge(&mut self, other: VerifyReport) {
        for diagnostic in other.diagnostics {
            self.push(diagnostic);
        }
        self.dropped += other.dropped;
    }

    /// Number of findings, recorded or not.
    #[inline]
    pub fn total(&self) -> usize {
        self.diagnostics.len() + self.dropped
    }

    /// Multi-line rendering of every finding.
    pub fn render(&self) -> String {
        let mut out = self.to_string();
        for diagnostic in &self.diagnostics {
            out.push('\n');
            out.push_str(&diagnostic.to_string());
        }
        if self.dropped > 0 {
            out.push_str(&format!("\n... {} more not recorded", self.dropped));
        }
        out
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} verification failure(s)", self.total())
    }
}

impl std::error::Error for VerifyReport {}

// =============================================================================
// Tests
// =============================================================================
