//! Typed constructors for common gate shapes.
//!
//! [`CircuitBuilder`] borrows a circuit and tracks the current control gate
//! and the tail of the effect chain. Constructors are grouped by concern:
//! - [`ControlBuilder`]: branches, merges, loops, returns, selectors
//! - [`ArithmeticBuilder`]: constants, integer/float ops, conversions
//! - [`MemoryBuilder`]: loads, stores, allocation, guarded element access
//!
//! Memory constructors consume and advance the effect chain; control and
//! arithmetic constructors take their inputs explicitly.

use crate::ir::circuit::Circuit;
use crate::ir::gate::{GateId, In};
use crate::ir::meta::MetaRef;
use crate::ir::opcode::OpCode;
use crate::ir::types::{GateType, MachineType};

pub mod arithmetic;
pub mod control;
pub mod memory;


pub use arithmetic::ArithmeticBuilder;
pub use control::ControlBuilder;
pub use memory::MemoryBuilder;

// =============================================================================
// Circuit Builder
// =============================================================================

/// Convenience front end over a [`Circuit`].
pub struct CircuitBuilder<'a> {
    circuit: &'a mut Circuit,
    /// Current control gate.
    state: GateId,
    /// Current tail of the effect chain.
    depend: GateId,
}

impl<'a> CircuitBuilder<'a> {
    /// Start building at the circuit's entry gates.
    pub fn new(circuit: &'a mut Circuit) -> Self {
        let state = circuit.state_entry();
        let depend = circuit.depend_entry();
        CircuitBuilder {
            circuit,
            state,
            depend,
        }
    }

    #[inline]
    pub fn circuit(&self) -> &Circuit {
        self.circuit
    }

    #[inline]
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        self.circuit
    }

    // =========================================================================
    // State Management
    // =========================================================================

    /// Get the current control gate.
    #[inline]
    pub fn state(&self) -> GateId {
        self.state
    }

    /// Set the current control gate.
    #[inline]
    pub fn set_state(&mut self, state: GateId) {
        self.state = state;
    }

    /// Get the current effect-chain tail.
    #[inline]
    pub fn depend(&self) -> GateId {
        self.depend
    }

    /// Set the current effect-chain tail.
    #[inline]
    pub fn set_depend(&mut self, depend: GateId) {
        self.depend = depend;
    }

    /// Create a function argument.
    pub fn arg(&mut self, machine_type: MachineType, index: u64) -> GateId {
        self.circuit
            .new_arg(machine_type, index, GateType::TAGGED_VALUE)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn fixed_meta(&self, op: OpCode) -> MetaRef {
        self.circuit.metas().fixed(op)
    }

    fn gate(&mut self, meta: MetaRef, machine_type: MachineType, ins: &[GateId]) -> GateId {
        self.circuit
            .new_gate(meta, machine_type, ins, GateType::EMPTY)
    }

    fn typed_gate(
        &mut self,
        meta: MetaRef,
        machine_type: MachineType,
        ins: &[GateId],
        gate_type: GateType,
    ) -> GateId {
        self.circuit.new_gate(meta, machine_type, ins, gate_type)
    }

    fn partial_gate(&mut self, meta: MetaRef, machine_type: MachineType, ins: &[In]) -> GateId {
        self.circuit
            .new_gate_partial(meta, machine_type, ins, GateType::EMPTY)
    }

    fn control(&mut self, op: OpCode, ins: &[GateId]) -> GateId {
        let meta = self.fixed_meta(op);
        self.gate(meta, MachineType::NoValue, ins)
    }
}
