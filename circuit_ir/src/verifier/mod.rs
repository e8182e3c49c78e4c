//! Structural verification of circuits.
//!
//! Two layers of checks:
//! - **Gate checks** ([`verify_gate`]): opcode-specific shape rules for one
//!   gate and its immediate neighbours
//! - **Circuit checks** ([`verify_circuit`]): edge integrity across the whole
//!   arena, then gate checks over every live gate, then walks of the
//!   control-flow skeleton (acyclic and sound) and of the floating data and
//!   depend gates (acyclic unless a selector intervenes)
//!
//! No check writes to the circuit: walks keep their marks in side tables.
//!
//! Findings are collected as [`Diagnostic`]s in a [`VerifyReport`]. Under
//! [`FailurePolicy::Abort`] a non-empty report is logged at ERROR and the
//! call panics; under [`FailurePolicy::Collect`] the report is returned.

mod circuit_checks;
mod diagnostic;
mod gate_checks;

use tracing::{debug, error};

use crate::config::{FailurePolicy, VerifierConfig};
use crate::ir::circuit::Circuit;
use crate::ir::gate::GateId;

pub use circuit_checks::{
    check_cfg_acyclic, check_cfg_sound, check_flow_acyclic, check_integrity, integrity_errors,
};
pub use diagnostic::{Diagnostic, SelectorFlow, VerifyError, VerifyReport};

// =============================================================================
// Verifier
// =============================================================================

/// Read-only checker over one circuit.
pub struct Verifier<'a> {
    circuit: &'a Circuit,
    config: &'a VerifierConfig,
    report: VerifyReport,
}

impl<'a> Verifier<'a> {
    pub fn new(circuit: &'a Circuit, config: &'a VerifierConfig) -> Self {
        Verifier {
            circuit,
            config,
            report: VerifyReport::new(config.max_diagnostics),
        }
    }

    #[inline]
    pub fn circuit(&self) -> &'a Circuit {
        self.circuit
    }

    /// Record a finding against `gate`.
    pub(crate) fn fail(&mut self, gate: GateId, input: Option<usize>, error: VerifyError) {
        let mut dump = self.circuit.dump(gate).preview(true);
        if let Some(idx) = input {
            dump = dump.highlight(idx);
        }
        self.report.push(Diagnostic {
            gate,
            opcode: self.circuit.opcode(gate),
            input,
            error,
            dump: dump.to_string(),
        });
    }

    /// Consume the verifier, yielding everything it found.
    pub fn into_report(self) -> VerifyReport {
        self.report
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Run the gate checks on one gate.
pub fn verify_gate(circuit: &Circuit, gate: GateId, config: &VerifierConfig) -> VerifyReport {
    let mut verifier = Verifier::new(circuit, config);
    verifier.check_gate(gate);
    conclude(verifier.into_report(), config)
}

/// Run integrity, gate, control-flow and data-flow checks over the whole
/// circuit.
///
/// Everything after the integrity check is skipped when edge integrity is
/// broken, since the later checks walk consumer lists.
pub fn verify_circuit(circuit: &Circuit, config: &VerifierConfig) -> VerifyReport {
    debug!(gates = circuit.live_count(), "verifying circuit");

    let mut report = VerifyReport::new(config.max_diagnostics);
    let broken = integrity_errors(circuit);
    if !broken.is_empty() {
        let mut verifier = Verifier::new(circuit, config);
        for err in broken {
            let (gate, index) = err.location();
            verifier.fail(gate, Some(index), err.into());
        }
        report.merge(verifier.into_report());
        return conclude(report, config);
    }

    let mut verifier = Verifier::new(circuit, config);
    for gate in circuit.gates() {
        verifier.check_gate(gate);
    }
    if let Err((from, to)) = check_cfg_acyclic(circuit) {
        verifier.fail(to, None, VerifyError::CfgCycle { from, to });
    }
    if let Err((gate, input)) = check_cfg_sound(circuit) {
        let pred = verifier.producer(gate, input);
        verifier.fail(gate, Some(input), VerifyError::UnreachableStateInput { pred });
    }
    if let Err((from, to)) = check_flow_acyclic(circuit) {
        verifier.fail(to, None, VerifyError::FlowCycle { from, to });
    }
    report.merge(verifier.into_report());
    conclude(report, config)
}

/// Apply the failure policy to a finished report.
fn conclude(report: VerifyReport, config: &VerifierConfig) -> VerifyReport {
    if report.is_ok() || config.policy == FailurePolicy::Collect {
        return report;
    }
    error!("{}", report.render());
    panic!("circuit verification failed: {}", report);
}

// =============================================================================
// Tests
// =============================================================================
