//! Per-gate shape rules.

use rustc_hash::FxHashSet;

use super::diagnostic::{SelectorFlow, VerifyError};
use super::Verifier;
use crate::ir::gate::GateId;
use crate::ir::opcode::{EdgeZone, OpCode};
use crate::ir::types::MachineType;

/// Required machine type of one value input.
#[derive(Clone, Copy)]
enum ValueRule {
    /// Value input `idx` must have the given type.
    At(usize, MachineType),
    /// Every value input must have the given type.
    All(MachineType),
}

fn value_rule(op: OpCode) -> Option<ValueRule> {
    use OpCode::*;
    let rule = match op {
        IfBranch | Rev => ValueRule::At(0, MachineType::I1),
        ValueSelector | Add | Sub | Mul | Exp | Sdiv | Smod | Udiv | Umod | Fdiv | Fmod | And
        | Xor | Or | Lsl | Lsr | Asr => ValueRule::All(MachineType::Flex),
        Load => ValueRule::At(0, MachineType::Arch),
        Store => ValueRule::At(1, MachineType::Arch),
        HeapAlloc | TaggedToInt64 | Int64ToTagged => ValueRule::At(0, MachineType::I64),
        ObjectTypeCheck | LoadElement | StoreElement => ValueRule::At(1, MachineType::I64),
        _ => return None,
    };
    Some(rule)
}

/// Root gate each root-bearing opcode must hang off.
fn expected_root(op: OpCode) -> Option<OpCode> {
    match op {
        OpCode::StateEntry | OpCode::DependEntry | OpCode::ReturnList | OpCode::ArgList => {
            Some(OpCode::CircuitRoot)
        }
        OpCode::Arg => Some(OpCode::ArgList),
        OpCode::Return | OpCode::ReturnVoid => Some(OpCode::ReturnList),
        _ => None,
    }
}

impl Verifier<'_> {
    /// Run every gate rule on `gate`, in order.
    pub(crate) fn check_gate(&mut self, gate: GateId) {
        if !self.check_no_empty_inputs(gate) {
            return;
        }
        self.check_state_inputs(gate);
        self.check_value_types(gate);
        self.check_depend_inputs(gate);
        self.check_root_input(gate);
        self.check_frame_state_input(gate);
        self.check_state_successor_count(gate);
        self.check_branch_outputs(gate);
        self.check_nop(gate);
        self.check_selector(gate);
        self.check_relay(gate);
    }

    /// Producer of a slot already known to be connected.
    pub(super) fn producer(&self, gate: GateId, idx: usize) -> GateId {
        match self.circuit.in_gate(gate, idx) {
            Some(producer) => producer,
            None => unreachable!("gate {} input {} checked non-empty", gate, idx),
        }
    }

    fn check_no_empty_inputs(&mut self, gate: GateId) -> bool {
        let mut ok = true;
        for idx in 0..self.circuit.num_ins(gate) {
            if self.circuit.in_gate(gate, idx).is_none() {
                self.fail(gate, Some(idx), VerifyError::EmptyInput);
                ok = false;
            }
        }
        ok
    }

    fn check_state_inputs(&mut self, gate: GateId) {
        let op = self.circuit.opcode(gate);
        let range = self.circuit.gate_meta(gate).zone_range(EdgeZone::State);
        for idx in range {
            let producer = self.producer(gate, idx);
            let actual = self.circuit.opcode(producer);
            let expected = match (op, idx) {
                (OpCode::IfTrue | OpCode::IfFalse, _) => Some(OpCode::IfBranch),
                (OpCode::SwitchCase | OpCode::DefaultCase, _) => Some(OpCode::SwitchBranch),
                (OpCode::LoopBegin, 1) => Some(OpCode::LoopBack),
                _ => None,
            };
            match expected {
                Some(expected) if actual != expected => {
                    self.fail(gate, Some(idx), VerifyError::StateProducerMismatch { expected, actual });
                }
                Some(_) => {}
                None if !self.circuit.gate_meta(producer).is_general_state() => {
                    self.fail(gate, Some(idx), VerifyError::NotGeneralState { actual });
                }
                None => {}
            }
        }
    }

    fn check_value_types(&mut self, gate: GateId) {
        let op = self.circuit.opcode(gate);
        let Some(rule) = value_rule(op) else {
            return;
        };
        let own = self.circuit.gate(gate).machine_type();
        let arch64 = self.config.is_arch64;
        let resolve = |mt: MachineType| {
            let mt = if mt == MachineType::Flex { own } else { mt };
            mt.resolve_arch(arch64)
        };

        let range = self.circuit.gate_meta(gate).zone_range(EdgeZone::Value);
        let start = range.start;
        let slots: smallvec::SmallVec<[(usize, MachineType); 4]> = match rule {
            ValueRule::At(i, mt) if i < range.len() => smallvec::smallvec![(start + i, mt)],
            ValueRule::At(..) => smallvec::SmallVec::new(),
            ValueRule::All(mt) => range.map(|idx| (idx, mt)).collect(),
        };

        for (idx, required) in slots {
            let producer = self.producer(gate, idx);
            let expected = resolve(required);
            let actual = resolve(self.circuit.gate(producer).machine_type());
            if expected != actual {
                self.fail(
                    gate,
                    Some(idx),
                    VerifyError::MachineTypeMismatch { expected, actual },
                );
            }
        }
    }

    fn check_depend_inputs(&mut self, gate: GateId) {
        let range = self.circuit.gate_meta(gate).zone_range(EdgeZone::Depend);
        for idx in range {
            let producer = self.producer(gate, idx);
            let actual = self.circuit.opcode(producer);
            if self.circuit.gate_meta(producer).depend_count() == 0 && actual != OpCode::DependEntry {
                self.fail(gate, Some(idx), VerifyError::NotDependProducer { actual });
            }
        }
    }

    fn check_root_input(&mut self, gate: GateId) {
        let meta = self.circuit.gate_meta(gate);
        if !meta.has_root() {
            return;
        }
        let idx = meta.root_start();
        let Some(expected) = expected_root(meta.opcode()) else {
            return;
        };
        let actual = self.circuit.opcode(self.producer(gate, idx));
        if actual != expected {
            self.fail(gate, Some(idx), VerifyError::RootMismatch { expected, actual });
        }
    }

    fn check_frame_state_input(&mut self, gate: GateId) {
        let meta = self.circuit.gate_meta(gate);
        if !meta.has_frame_state() {
            return;
        }
        let idx = meta.frame_state_start();
        let actual = self.circuit.opcode(self.producer(gate, idx));
        if actual != OpCode::FrameState {
            self.fail(gate, Some(idx), VerifyError::NotFrameState { actual });
        }
    }

    /// Consumers that are control gates reached through a state edge.
    fn state_successors(&self, gate: GateId) -> impl Iterator<Item = GateId> + '_ {
        self.circuit
            .uses(gate)
            .filter(|u| u.is_state_edge && self.circuit.gate_meta(u.consumer).is_state())
            .map(|u| u.consumer)
    }

    fn check_state_successor_count(&mut self, gate: GateId) {
        let meta = self.circuit.gate_meta(gate);
        if !meta.is_state() {
            return;
        }
        let expected = match meta.opcode() {
            OpCode::SwitchBranch => return,
            OpCode::IfBranch | OpCode::JsBytecode => 2,
            _ if meta.is_terminal_state() => 0,
            _ => 1,
        };
        let actual = self.state_successors(gate).count();
        if actual != expected {
            self.fail(gate, None, VerifyError::StateSuccessorCount { expected, actual });
        }
    }

    fn check_branch_outputs(&mut self, gate: GateId) {
        if !matches!(
            self.circuit.opcode(gate),
            OpCode::IfBranch | OpCode::SwitchBranch
        ) {
            return;
        }
        let mut seen = FxHashSet::default();
        let mut duplicates = smallvec::SmallVec::<[(OpCode, usize); 2]>::new();
        for succ in self.state_successors(gate) {
            let meta = self.circuit.gate_meta(succ);
            let key = (meta.opcode(), meta.state_count());
            if !seen.insert(key) {
                duplicates.push(key);
            }
        }
        for (opcode, state_count) in duplicates {
            self.fail(gate, None, VerifyError::DuplicateBranchOutput { opcode, state_count });
        }
    }

    fn check_nop(&mut self, gate: GateId) {
        if self.circuit.opcode(gate) != OpCode::Nop {
            return;
        }
        let count = self.circuit.use_count(gate);
        if count > 0 {
            self.fail(gate, None, VerifyError::NopHasConsumers { count });
        }
    }

    fn check_selector(&mut self, gate: GateId) {
        let flow = match self.circuit.opcode(gate) {
            OpCode::ValueSelector => SelectorFlow::Data,
            OpCode::DependSelector => SelectorFlow::Depend,
            _ => return,
        };
        let merge = self.producer(gate, 0);
        let actual = self.circuit.opcode(merge);
        if !matches!(actual, OpCode::Merge | OpCode::LoopBegin) {
            self.fail(gate, Some(0), VerifyError::SelectorNotOnMerge { flow, actual });
            return;
        }
        let expected = self.circuit.num_ins(merge);
        let actual = self.circuit.num_ins(gate) - 1;
        if expected != actual {
            self.fail(
                gate,
                None,
                VerifyError::SelectorArity {
                    flow,
                    expected,
                    actual,
                },
            );
        }
    }

    fn check_relay(&mut self, gate: GateId) {
        if self.circuit.opcode(gate) != OpCode::DependRelay {
            return;
        }
        let actual = self.circuit.opcode(self.producer(gate, 0));
        let ok = matches!(
            actual,
            OpCode::IfTrue
                | OpCode::IfFalse
                | OpCode::SwitchCase
                | OpCode::DefaultCase
                | OpCode::IfSuccess
                | OpCode::IfException
                | OpCode::OrdinaryBlock
        );
        if !ok {
            self.fail(gate, Some(0), VerifyError::RelayNotOnCase { actual });
        }
    }
}
