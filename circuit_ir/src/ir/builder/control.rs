use smallvec::SmallVec;

use super::CircuitBuilder;
use crate::ir::gate::GateId;
use crate::ir::opcode::OpCode;
use crate::ir::types::MachineType;

/// Builder trait for control flow and pinned gates.
pub trait ControlBuilder {
    // Blocks and Branches
    fn ordinary_block(&mut self, state: GateId) -> GateId;
    fn if_branch(&mut self, state: GateId, condition: GateId) -> GateId;
    fn if_true(&mut self, branch: GateId) -> GateId;
    fn if_false(&mut self, branch: GateId) -> GateId;
    fn switch_branch(&mut self, state: GateId, index: GateId, case_count: u64) -> GateId;
    fn switch_case(&mut self, branch: GateId, value: u64) -> GateId;
    fn default_case(&mut self, branch: GateId) -> GateId;
    fn if_success(&mut self, state: GateId) -> GateId;
    fn if_exception(&mut self, state: GateId) -> GateId;

    // Joins and Loops
    fn merge(&mut self, preds: &[GateId]) -> GateId;
    fn loop_begin(&mut self, entry: GateId) -> GateId;
    fn loop_back(&mut self, loop_begin: GateId, state: GateId) -> GateId;

    // Exits
    fn return_value(&mut self, state: GateId, depend: GateId, value: GateId) -> GateId;
    fn return_void(&mut self, state: GateId, depend: GateId) -> GateId;
    fn throw(&mut self, state: GateId, depend: GateId, value: GateId) -> GateId;

    // Pinned Gates
    fn value_selector(&mut self, machine_type: MachineType, merge: GateId, values: &[GateId]) -> GateId;
    fn depend_selector(&mut self, merge: GateId, depends: &[GateId]) -> GateId;
    fn depend_relay(&mut self, state: GateId, depend: GateId) -> GateId;
    fn depend_and(&mut self, first: GateId, second: GateId) -> GateId;

    // Bytecode and Deoptimization
    fn js_bytecode(
        &mut self,
        state: GateId,
        depend: GateId,
        values: &[GateId],
        bytecode: u32,
        pc_offset: u32,
    ) -> GateId;
    fn frame_state(&mut self, frame_values: GateId, frame_args: GateId) -> GateId;
}

impl ControlBuilder for CircuitBuilder<'_> {
    fn ordinary_block(&mut self, state: GateId) -> GateId {
        self.control(OpCode::OrdinaryBlock, &[state])
    }

    fn if_branch(&mut self, state: GateId, condition: GateId) -> GateId {
        self.control(OpCode::IfBranch, &[state, condition])
    }

    fn if_true(&mut self, branch: GateId) -> GateId {
        self.control(OpCode::IfTrue, &[branch])
    }

    fn if_false(&mut self, branch: GateId) -> GateId {
        self.control(OpCode::IfFalse, &[branch])
    }

    fn switch_branch(&mut self, state: GateId, index: GateId, case_count: u64) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::SwitchBranch, case_count);
        self.gate(meta, MachineType::NoValue, &[state, index])
    }

    fn switch_case(&mut self, branch: GateId, value: u64) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::SwitchCase, value);
        self.gate(meta, MachineType::NoValue, &[branch])
    }

    fn default_case(&mut self, branch: GateId) -> GateId {
        self.control(OpCode::DefaultCase, &[branch])
    }

    fn if_success(&mut self, state: GateId) -> GateId {
        self.control(OpCode::IfSuccess, &[state])
    }

    fn if_exception(&mut self, state: GateId) -> GateId {
        self.control(OpCode::IfException, &[state])
    }

    fn merge(&mut self, preds: &[GateId]) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .sized(OpCode::Merge, preds.len() as u32);
        let merge = self.gate(meta, MachineType::NoValue, preds);
        self.state = merge;
        merge
    }

    fn loop_begin(&mut self, entry: GateId) -> GateId {
        // The back edge is connected by `loop_back`.
        let meta = self.fixed_meta(OpCode::LoopBegin);
        let head = self.partial_gate(meta, MachineType::NoValue, &[Some(entry), None]);
        self.state = head;
        head
    }

    fn loop_back(&mut self, loop_begin: GateId, state: GateId) -> GateId {
        let back = self.control(OpCode::LoopBack, &[state]);
        self.circuit.new_in(loop_begin, 1, back);
        back
    }

    fn return_value(&mut self, state: GateId, depend: GateId, value: GateId) -> GateId {
        let return_list = self.circuit.return_list();
        self.control(OpCode::Return, &[state, depend, value, return_list])
    }

    fn return_void(&mut self, state: GateId, depend: GateId) -> GateId {
        let return_list = self.circuit.return_list();
        self.control(OpCode::ReturnVoid, &[state, depend, return_list])
    }

    fn throw(&mut self, state: GateId, depend: GateId, value: GateId) -> GateId {
        self.control(OpCode::Throw, &[state, depend, value])
    }

    fn value_selector(&mut self, machine_type: MachineType, merge: GateId, values: &[GateId]) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .sized(OpCode::ValueSelector, values.len() as u32);
        let mut ins: SmallVec<[GateId; 8]> = SmallVec::with_capacity(values.len() + 1);
        ins.push(merge);
        ins.extend_from_slice(values);
        self.gate(meta, machine_type, &ins)
    }

    fn depend_selector(&mut self, merge: GateId, depends: &[GateId]) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .sized(OpCode::DependSelector, depends.len() as u32);
        let mut ins: SmallVec<[GateId; 8]> = SmallVec::with_capacity(depends.len() + 1);
        ins.push(merge);
        ins.extend_from_slice(depends);
        self.gate(meta, MachineType::NoValue, &ins)
    }

    fn depend_relay(&mut self, state: GateId, depend: GateId) -> GateId {
        self.control(OpCode::DependRelay, &[state, depend])
    }

    fn depend_and(&mut self, first: GateId, second: GateId) -> GateId {
        self.control(OpCode::DependAnd, &[first, second])
    }

    fn js_bytecode(
        &mut self,
        state: GateId,
        depend: GateId,
        values: &[GateId],
        bytecode: u32,
        pc_offset: u32,
    ) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .js_bytecode(values.len() as u32, bytecode, pc_offset);
        let mut ins: SmallVec<[GateId; 8]> = SmallVec::with_capacity(values.len() + 2);
        ins.push(state);
        ins.push(depend);
        ins.extend_from_slice(values);
        self.gate(meta, MachineType::AnyValue, &ins)
    }

    fn frame_state(&mut self, frame_values: GateId, frame_args: GateId) -> GateId {
        let meta = self.fixed_meta(OpCode::FrameState);
        self.gate(meta, MachineType::NoValue, &[frame_values, frame_args])
    }
}
