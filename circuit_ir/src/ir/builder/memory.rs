//! Memory and guarded-access constructors.
//!
//! Every constructor here consumes the builder's current effect-chain tail
//! as its depend input and becomes the new tail:
//!
//! ```text
//!   depend ──► LOAD ──► STORE ──► OBJECT_TYPE_CHECK ──► ...
//! ```
//!
//! Gates with a state input, checks included, also take the builder's
//! current control gate and become the new control gate.

use super::CircuitBuilder;
use crate::ir::gate::GateId;
use crate::ir::meta::MetaRef;
use crate::ir::opcode::OpCode;
use crate::ir::types::{GateType, MachineType};

/// Builder trait for memory access and deoptimizing checks.
pub trait MemoryBuilder {
    // Raw Memory
    fn load(&mut self, machine_type: MachineType, address: GateId) -> GateId;
    fn store(&mut self, value: GateId, address: GateId) -> GateId;
    fn heap_alloc(&mut self, size: GateId, space: u64) -> GateId;

    // Element and Property Access
    fn load_element(&mut self, access_kind: u64, receiver: GateId, index: GateId) -> GateId;
    fn store_element(&mut self, access_kind: u64, receiver: GateId, index: GateId, value: GateId) -> GateId;
    fn load_property(&mut self, receiver: GateId, offset: GateId) -> GateId;
    fn store_property(&mut self, receiver: GateId, offset: GateId, value: GateId) -> GateId;

    // Checks
    fn object_type_check(
        &mut self,
        expected: GateType,
        receiver: GateId,
        hclass_index: GateId,
        frame_state: GateId,
    ) -> GateId;
    fn index_check(&mut self, expected: GateType, receiver: GateId, index: GateId, frame_state: GateId) -> GateId;
}

impl CircuitBuilder<'_> {
    /// Create an effectful gate on the current chain and make it the tail.
    fn chained(
        &mut self,
        meta: MetaRef,
        machine_type: MachineType,
        with_state: bool,
        values: &[GateId],
        gate_type: GateType,
    ) -> GateId {
        let mut ins: smallvec::SmallVec<[GateId; 6]> = smallvec::SmallVec::new();
        if with_state {
            ins.push(self.state);
        }
        ins.push(self.depend);
        ins.extend_from_slice(values);
        let gate = self.typed_gate(meta, machine_type, &ins, gate_type);
        if with_state {
            self.state = gate;
        }
        self.depend = gate;
        gate
    }
}

impl MemoryBuilder for CircuitBuilder<'_> {
    fn load(&mut self, machine_type: MachineType, address: GateId) -> GateId {
        let meta = self.fixed_meta(OpCode::Load);
        self.chained(meta, machine_type, false, &[address], GateType::NJS_VALUE)
    }

    fn store(&mut self, value: GateId, address: GateId) -> GateId {
        let meta = self.fixed_meta(OpCode::Store);
        self.chained(meta, MachineType::NoValue, false, &[value, address], GateType::EMPTY)
    }

    fn heap_alloc(&mut self, size: GateId, space: u64) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::HeapAlloc, space);
        self.chained(meta, MachineType::I64, true, &[size], GateType::TAGGED_POINTER)
    }

    fn load_element(&mut self, access_kind: u64, receiver: GateId, index: GateId) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::LoadElement, access_kind);
        self.chained(meta, MachineType::I64, true, &[receiver, index], GateType::ANY_TYPE)
    }

    fn store_element(&mut self, access_kind: u64, receiver: GateId, index: GateId, value: GateId) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::StoreElement, access_kind);
        self.chained(
            meta,
            MachineType::NoValue,
            true,
            &[receiver, index, value],
            GateType::EMPTY,
        )
    }

    fn load_property(&mut self, receiver: GateId, offset: GateId) -> GateId {
        let meta = self.fixed_meta(OpCode::LoadProperty);
        self.chained(meta, MachineType::I64, true, &[receiver, offset], GateType::ANY_TYPE)
    }

    fn store_property(&mut self, receiver: GateId, offset: GateId, value: GateId) -> GateId {
        let meta = self.fixed_meta(OpCode::StoreProperty);
        self.chained(
            meta,
            MachineType::NoValue,
            true,
            &[receiver, offset, value],
            GateType::EMPTY,
        )
    }

    fn object_type_check(
        &mut self,
        expected: GateType,
        receiver: GateId,
        hclass_index: GateId,
        frame_state: GateId,
    ) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::ObjectTypeCheck, u64::from(expected.raw()));
        self.chained(
            meta,
            MachineType::I1,
            true,
            &[receiver, hclass_index, frame_state],
            GateType::NJS_VALUE,
        )
    }

    fn index_check(&mut self, expected: GateType, receiver: GateId, index: GateId, frame_state: GateId) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::IndexCheck, u64::from(expected.raw()));
        self.chained(
            meta,
            MachineType::I1,
            true,
            &[receiver, index, frame_state],
            GateType::NJS_VALUE,
        )
    }
}
