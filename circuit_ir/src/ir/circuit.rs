//! The circuit: owner of gates, metadata and every edge mutation.
//!
//! The circuit provides:
//! - **Root gates**: `CIRCUIT_ROOT` plus the four lists hanging off it
//! - **Edge mutation**: `new_in`, `modify_in`, `delete_in`, `delete_gate`,
//!   `append_in`, all keeping `In` slots and consumer lists in lock-step
//! - **Consumer walks**: [`Circuit::uses`] follows a producer's list without
//!   allocating
//! - **Traversal marks**: a circuit-wide time stamp so a new walk starts with
//!   every gate unmarked in O(1)
//!
//! # Invariant
//!
//! After every public mutation, each non-empty `In[i]` of a gate `g` has
//! exactly one `(g, i)` node in its producer's consumer list, and every
//! node in a consumer list is backed by such an `In`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::gate::{Gate, GateId, In, MarkCode, Out, TimeStamp, UseRef};
use super::meta::{GateMetaData, MetaRef};
use super::meta_builder::MetaBuilder;
use super::opcode::{EdgeZone, OpCode, ShapeKind};
use super::types::{GateType, MachineType};

// =============================================================================
// Uses
// =============================================================================

/// One consumer of a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Use {
    /// The consuming gate.
    pub consumer: GateId,
    /// Input slot of the consumer that holds the edge.
    pub index: usize,
    /// The edge lands in the consumer's state zone.
    pub is_state_edge: bool,
}

/// Iterator over a producer's consumer list, most recent edge first.
pub struct Uses<'a> {
    circuit: &'a Circuit,
    cursor: Option<UseRef>,
}

impl Iterator for Uses<'_> {
    type Item = Use;

    fn next(&mut self) -> Option<Use> {
        let at = self.cursor?;
        let consumer = &self.circuit.gates[at.gate];
        self.cursor = consumer.out_at(at.slot()).next();
        Some(Use {
            consumer: at.gate,
            index: at.slot(),
            is_state_edge: at.slot() < self.circuit.metas.get(consumer.meta()).state_count(),
        })
    }
}

// =============================================================================
// Circuit
// =============================================================================

/// A sea-of-nodes graph.
#[derive(Debug)]
pub struct Circuit {
    gates: Arena<Gate>,
    metas: MetaBuilder,
    root: GateId,
    state_entry: GateId,
    depend_entry: GateId,
    return_list: GateId,
    arg_list: GateId,
    time: TimeStamp,
    live: usize,
    constants: FxHashMap<(MachineType, u64, GateType), GateId>,
}

impl Circuit {
    /// Create a circuit holding only its root gates.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a circuit with room for `gate_capacity` gates.
    pub fn with_capacity(gate_capacity: usize) -> Self {
        let metas = MetaBuilder::new();
        let placeholder = GateId::new(0);
        let mut circuit = Circuit {
            gates: Arena::with_capacity(gate_capacity),
            metas,
            root: placeholder,
            state_entry: placeholder,
            depend_entry: placeholder,
            return_list: placeholder,
            arg_list: placeholder,
            time: 1,
            live: 0,
            constants: FxHashMap::default(),
        };

        let root = circuit.new_fixed(OpCode::CircuitRoot, &[]);
        circuit.root = root;
        circuit.state_entry = circuit.new_fixed(OpCode::StateEntry, &[root]);
        circuit.depend_entry = circuit.new_fixed(OpCode::DependEntry, &[root]);
        circuit.return_list = circuit.new_fixed(OpCode::ReturnList, &[root]);
        circuit.arg_list = circuit.new_fixed(OpCode::ArgList, &[root]);
        circuit
    }

    fn new_fixed(&mut self, op: OpCode, producers: &[GateId]) -> GateId {
        let meta = self.metas.fixed(op);
        self.new_gate(meta, MachineType::NoValue, producers, GateType::EMPTY)
    }

    // =========================================================================
    // Roots
    // =========================================================================

    #[inline]
    pub fn root(&self) -> GateId {
        self.root
    }

    #[inline]
    pub fn state_entry(&self) -> GateId {
        self.state_entry
    }

    #[inline]
    pub fn depend_entry(&self) -> GateId {
        self.depend_entry
    }

    #[inline]
    pub fn return_list(&self) -> GateId {
        self.return_list
    }

    #[inline]
    pub fn arg_list(&self) -> GateId {
        self.arg_list
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    #[inline]
    pub fn metas(&self) -> &MetaBuilder {
        &self.metas
    }

    #[inline]
    pub fn metas_mut(&mut self) -> &mut MetaBuilder {
        &mut self.metas
    }

    #[inline]
    pub fn meta(&self, meta: MetaRef) -> &GateMetaData {
        self.metas.get(meta)
    }

    /// Metadata of a gate.
    #[inline]
    pub fn gate_meta(&self, gate: GateId) -> &GateMetaData {
        self.metas.get(self.gates[gate].meta())
    }

    // =========================================================================
    // Gate Access
    // =========================================================================

    #[inline]
    pub fn gate(&self, gate: GateId) -> &Gate {
        &self.gates[gate]
    }

    #[inline]
    pub fn get(&self, gate: GateId) -> Option<&Gate> {
        self.gates.get(gate)
    }

    /// Mutable access for type and mark updates. Edges are only changed
    /// through the circuit.
    #[inline]
    pub fn gate_mut(&mut self, gate: GateId) -> &mut Gate {
        &mut self.gates[gate]
    }

    #[inline]
    pub fn opcode(&self, gate: GateId) -> OpCode {
        self.gates[gate].opcode()
    }

    #[inline]
    pub fn num_ins(&self, gate: GateId) -> usize {
        self.gates[gate].num_ins()
    }

    /// Producer of input `idx` of `gate`.
    #[track_caller]
    #[inline]
    pub fn in_gate(&self, gate: GateId, idx: usize) -> In {
        self.gates[gate].in_at(idx)
    }

    /// Input slots of one zone of `gate`.
    pub fn zone_ins(&self, gate: GateId, zone: EdgeZone) -> &[In] {
        let range = self.gate_meta(gate).zone_range(zone);
        &self.gates[gate].ins()[range]
    }

    /// Number of gates ever allocated, deleted ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of gates not deleted.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Every gate ever allocated, retired `NOP`s included.
    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> {
        self.gates.ids()
    }

    /// Iterate over live gates in allocation order.
    pub fn gates(&self) -> impl Iterator<Item = GateId> + '_ {
        self.gates
            .iter()
            .filter(|(_, gate)| !gate.is_deleted())
            .map(|(id, _)| id)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn alloc_gate(&mut self, meta: MetaRef, machine_type: MachineType, gate_type: GateType) -> GateId {
        let shape = self.metas.get(meta);
        let (opcode, num_ins) = (shape.opcode(), shape.num_ins());
        let id = self
            .gates
            .alloc_with(|id| Gate::new(id, meta, opcode, num_ins, machine_type, gate_type));
        self.live += 1;
        debug!(gate = %id, op = %opcode, num_ins, "new gate");
        id
    }

    /// Create a gate with every input connected.
    ///
    /// # Panics
    ///
    /// Panics if `producers.len()` differs from the shape's input count.
    #[track_caller]
    pub fn new_gate(
        &mut self,
        meta: MetaRef,
        machine_type: MachineType,
        producers: &[GateId],
        gate_type: GateType,
    ) -> GateId {
        let num_ins = self.metas.get(meta).num_ins();
        assert_eq!(
            producers.len(),
            num_ins,
            "{} expects {} inputs",
            self.metas.get(meta).opcode(),
            num_ins
        );
        let id = self.alloc_gate(meta, machine_type, gate_type);
        for (idx, &producer) in producers.iter().enumerate() {
            self.new_in(id, idx, producer);
        }
        id
    }

    /// Create a gate where `None` slots stay empty.
    ///
    /// # Panics
    ///
    /// Panics if `slots.len()` differs from the shape's input count.
    #[track_caller]
    pub fn new_gate_partial(
        &mut self,
        meta: MetaRef,
        machine_type: MachineType,
        slots: &[In],
        gate_type: GateType,
    ) -> GateId {
        let num_ins = self.metas.get(meta).num_ins();
        assert_eq!(
            slots.len(),
            num_ins,
            "{} expects {} inputs",
            self.metas.get(meta).opcode(),
            num_ins
        );
        let id = self.alloc_gate(meta, machine_type, gate_type);
        for (idx, slot) in slots.iter().enumerate() {
            if let Some(producer) = *slot {
                self.new_in(id, idx, producer);
            }
        }
        id
    }

    /// The `index`-th function argument.
    pub fn new_arg(&mut self, machine_type: MachineType, index: u64, gate_type: GateType) -> GateId {
        let meta = self.metas.arg(index);
        let arg_list = self.arg_list;
        self.new_gate(meta, machine_type, &[arg_list], gate_type)
    }

    /// A `CONSTANT` gate, shared by every request with the same key.
    pub fn constant(&mut self, machine_type: MachineType, value: u64, gate_type: GateType) -> GateId {
        let key = (machine_type, value, gate_type);
        if let Some(&gate) = self.constants.get(&key) {
            if !self.gates[gate].is_deleted() {
                return gate;
            }
        }
        let meta = self.metas.constant(value);
        let gate = self.new_gate(meta, machine_type, &[], gate_type);
        self.constants.insert(key, gate);
        gate
    }

    // =========================================================================
    // Edge Mutation
    // =========================================================================

    #[inline]
    fn out_mut(&mut self, at: UseRef) -> &mut Out {
        self.gates[at.gate].out_mut(at.slot())
    }

    /// Connect empty input `idx` of `gate` to `producer`.
    ///
    /// The new edge becomes the head of the producer's consumer list.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range or the slot is already connected.
    #[track_caller]
    pub fn new_in(&mut self, gate: GateId, idx: usize, producer: GateId) {
        assert!(
            self.gates[gate].in_at(idx).is_none(),
            "gate {}: input {} is already connected",
            gate,
            idx
        );
        debug_assert!(!self.gates[producer].is_deleted(), "producer {} is deleted", producer);

        let edge = UseRef::new(gate, idx);
        let head = self.gates[producer].first_out();
        if let Some(head) = head {
            self.out_mut(head).prev = Some(edge);
        }

        let consumer = &mut self.gates[gate];
        consumer.set_in(idx, Some(producer));
        *consumer.out_mut(idx) = Out { prev: None, next: head };
        self.gates[producer].set_first_out(Some(edge));

        trace!(gate = %gate, idx, producer = %producer, "new_in");
    }

    /// Disconnect input `idx` of `gate`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range or the slot is empty.
    #[track_caller]
    pub fn delete_in(&mut self, gate: GateId, idx: usize) {
        let Some(producer) = self.gates[gate].in_at(idx) else {
            panic!("gate {}: input {} is already empty", gate, idx);
        };
        let out = *self.gates[gate].out_at(idx);

        match (out.prev, out.next) {
            // Sole consumer.
            (None, None) => self.gates[producer].set_first_out(None),
            // Head of a longer list.
            (None, Some(next)) => {
                self.out_mut(next).prev = None;
                self.gates[producer].set_first_out(Some(next));
            }
            // Tail.
            (Some(prev), None) => self.out_mut(prev).next = None,
            // Middle.
            (Some(prev), Some(next)) => {
                self.out_mut(prev).next = Some(next);
                self.out_mut(next).prev = Some(prev);
            }
        }

        let consumer = &mut self.gates[gate];
        consumer.set_in(idx, None);
        *consumer.out_mut(idx) = Out::default();

        trace!(gate = %gate, idx, producer = %producer, "delete_in");
    }

    /// Reconnect input `idx` of `gate` to `producer`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range or the slot is empty.
    #[track_caller]
    pub fn modify_in(&mut self, gate: GateId, idx: usize, producer: GateId) {
        self.delete_in(gate, idx);
        self.new_in(gate, idx, producer);
    }

    /// Disconnect every input of `gate` and retire it as a `NOP`.
    ///
    /// The gate keeps its id but is skipped by [`Circuit::gates`]. Gates
    /// still consuming it are left untouched; the verifier reports them.
    pub fn delete_gate(&mut self, gate: GateId) {
        if self.gates[gate].is_deleted() {
            return;
        }
        for idx in 0..self.gates[gate].num_ins() {
            if self.gates[gate].ins()[idx].is_some() {
                self.delete_in(gate, idx);
            }
        }
        let nop = self.metas.fixed(OpCode::Nop);
        self.gates[gate].retire(nop, OpCode::Nop);
        self.live -= 1;
        debug!(gate = %gate, "deleted gate");
    }

    /// Widen the variable zone of `gate` by one and connect the new slot to
    /// `producer`.
    ///
    /// # Panics
    ///
    /// Panics if the gate's shape is not size-parameterized.
    #[track_caller]
    pub fn append_in(&mut self, gate: GateId, producer: GateId) {
        let meta = self.gates[gate].meta();
        let shape = self.metas.get(meta);
        let ShapeKind::Sized(zone) = shape.opcode().shape_kind() else {
            panic!("gate {}: cannot append an input to {}", gate, shape.opcode());
        };
        let zone_range = shape.zone_range(zone);
        assert_eq!(
            zone_range.end,
            shape.num_ins(),
            "gate {}: variable zone of {} is not the last zone",
            gate,
            shape.opcode()
        );

        let width = (zone_range.len() + 1) as u32;
        let wider = self.metas.resized(meta, width);
        self.gates[gate].grow(wider);
        let idx = self.gates[gate].num_ins() - 1;
        self.new_in(gate, idx, producer);

        trace!(gate = %gate, width, "append_in");
    }

    /// Point every consumer of `old` at `new`.
    pub fn replace_all_uses(&mut self, old: GateId, new: GateId) {
        let uses: SmallVec<[Use; 8]> = self.uses(old).collect();
        for u in uses {
            self.modify_in(u.consumer, u.index, new);
        }
    }

    // =========================================================================
    // Consumers
    // =========================================================================

    /// Iterate over the consumers of `gate`.
    #[inline]
    pub fn uses(&self, gate: GateId) -> Uses<'_> {
        Uses {
            circuit: self,
            cursor: self.gates[gate].first_out(),
        }
    }

    /// Number of edges leaving `gate`.
    pub fn use_count(&self, gate: GateId) -> usize {
        self.uses(gate).count()
    }

    // =========================================================================
    // Marks
    // =========================================================================

    /// Current traversal generation.
    #[inline]
    pub fn time(&self) -> TimeStamp {
        self.time
    }

    /// Start a new traversal generation; every gate reads as unmarked.
    pub fn advance_time(&mut self) -> TimeStamp {
        if self.time == TimeStamp::MAX {
            self.gates
                .values_mut()
                .for_each(|gate| gate.set_mark(MarkCode::NoMark, 0));
            self.time = 0;
        }
        self.time += 1;
        self.time
    }

    #[inline]
    pub fn get_mark(&self, gate: GateId) -> MarkCode {
        self.gates[gate].get_mark(self.time)
    }

    #[inline]
    pub fn set_mark(&mut self, gate: GateId, mark: MarkCode) {
        let time = self.time;
        self.gates[gate].set_mark(mark, time);
    }

    #[inline]
    pub fn is_visited(&self, gate: GateId) -> bool {
        self.get_mark(gate) == MarkCode::Visited
    }

    #[inline]
    pub fn set_visited(&mut self, gate: GateId) {
        self.set_mark(gate, MarkCode::Visited);
    }

    #[inline]
    pub fn is_finished(&self, gate: GateId) -> bool {
        self.get_mark(gate) == MarkCode::Finished
    }

    #[inline]
    pub fn set_finished(&mut self, gate: GateId) {
        self.set_mark(gate, MarkCode::Finished);
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn consumers(circuit: &Circuit, gate: GateId) -> Vec<(GateId, usize)> {
        circuit.uses(gate).map(|u| (u.consumer, u.index)).collect()
    }

    fn add(circuit: &mut Circuit, lhs: GateId, rhs: GateId) -> GateId {
        let meta = circuit.metas().fixed(OpCode::Add);
        circuit.new_gate(meta, MachineType::I64, &[lhs, rhs], GateType::NJS_VALUE)
    }

    #[test]
    fn test_roots_hang_off_circuit_root() {
        let circuit = Circuit::new();
        let root = circuit.root();
        assert_eq!(circuit.opcode(root), OpCode::CircuitRoot);
        for list in [
            circuit.state_entry(),
            circuit.depend_entry(),
            circuit.return_list(),
            circuit.arg_list(),
        ] {
            assert_eq!(circuit.num_ins(list), 1);
            assert_eq!(circuit.in_gate(list, 0), Some(root));
        }
        assert_eq!(circuit.use_count(root), 4);
        assert_eq!(circuit.live_count(), 5);
    }

    #[test]
    fn test_new_in_pushes_at_head() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, x);
        assert_eq!(consumers(&circuit, x), vec![(a, 1), (a, 0)]);

        let b = add(&mut circuit, x, x);
        assert_eq!(consumers(&circuit, x), vec![(b, 1), (b, 0), (a, 1), (a, 0)]);
    }

    #[test]
    fn test_delete_in_all_list_positions() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let y = circuit.new_arg(MachineType::I64, 1, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, y);
        let b = add(&mut circuit, x, y);
        let c = add(&mut circuit, x, y);
        // x's list: c0, b0, a0

        circuit.delete_in(b, 0); // middle
        assert_eq!(consumers(&circuit, x), vec![(c, 0), (a, 0)]);
        circuit.delete_in(c, 0); // head
        assert_eq!(consumers(&circuit, x), vec![(a, 0)]);
        circuit.new_in(b, 0, x);
        circuit.delete_in(a, 0); // tail
        assert_eq!(consumers(&circuit, x), vec![(b, 0)]);
        circuit.delete_in(b, 0); // sole
        assert!(circuit.gate(x).is_first_out_null());

        assert!(circuit.gate(a).is_in_null(0));
        assert_eq!(circuit.use_count(y), 3);
    }

    #[test]
    fn test_modify_in_moves_edge() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let y = circuit.new_arg(MachineType::I64, 1, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, x);

        circuit.modify_in(a, 1, y);
        assert_eq!(circuit.in_gate(a, 1), Some(y));
        assert_eq!(consumers(&circuit, x), vec![(a, 0)]);
        assert_eq!(consumers(&circuit, y), vec![(a, 1)]);
    }

    #[test]
    #[should_panic(expected = "already empty")]
    fn test_delete_empty_slot_panics() {
        let mut circuit = Circuit::new();
        let meta = circuit.metas().fixed(OpCode::Add);
        let a = circuit.new_gate_partial(meta, MachineType::I64, &[None, None], GateType::EMPTY);
        circuit.delete_in(a, 0);
    }

    #[test]
    #[should_panic(expected = "already connected")]
    fn test_new_in_on_connected_slot_panics() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, x);
        circuit.new_in(a, 0, x);
    }

    #[test]
    #[should_panic(expected = "expects 2 inputs")]
    fn test_new_gate_checks_arity() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let meta = circuit.metas().fixed(OpCode::Add);
        circuit.new_gate(meta, MachineType::I64, &[x], GateType::EMPTY);
    }

    #[test]
    fn test_delete_gate_severs_inputs() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, x);
        let live = circuit.live_count();

        circuit.delete_gate(a);
        assert!(circuit.gate(x).is_first_out_null());
        assert!(circuit.gate(a).is_deleted());
        assert_eq!(circuit.opcode(a), OpCode::Nop);
        assert_eq!(circuit.num_ins(a), 0);
        assert_eq!(circuit.live_count(), live - 1);
        assert!(circuit.gates().all(|g| g != a));

        circuit.delete_gate(a);
        assert_eq!(circuit.live_count(), live - 1);
    }

    #[test]
    fn test_append_in_widens_merge() {
        let mut circuit = Circuit::new();
        let entry = circuit.state_entry();
        let merge_meta = circuit.metas_mut().sized(OpCode::Merge, 1);
        let merge = circuit.new_gate(merge_meta, MachineType::NoValue, &[entry], GateType::EMPTY);
        let block_meta = circuit.metas().fixed(OpCode::OrdinaryBlock);
        let block = circuit.new_gate(block_meta, MachineType::NoValue, &[entry], GateType::EMPTY);

        for _ in 0..6 {
            circuit.append_in(merge, block);
        }
        assert_eq!(circuit.num_ins(merge), 7);
        assert_eq!(circuit.gate_meta(merge).state_count(), 7);
        assert_eq!(circuit.in_gate(merge, 6), Some(block));
        assert_eq!(circuit.use_count(block), 6);
        assert!(circuit.uses(block).all(|u| u.is_state_edge));
    }

    #[test]
    #[should_panic(expected = "cannot append an input to ADD")]
    fn test_append_in_rejects_fixed_shape() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, x);
        circuit.append_in(a, x);
    }

    #[test]
    fn test_replace_all_uses() {
        let mut circuit = Circuit::new();
        let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
        let y = circuit.new_arg(MachineType::I64, 1, GateType::NJS_VALUE);
        let a = add(&mut circuit, x, x);
        circuit.replace_all_uses(x, y);
        assert!(circuit.gate(x).is_first_out_null());
        assert_eq!(circuit.in_gate(a, 0), Some(y));
        assert_eq!(circuit.in_gate(a, 1), Some(y));
    }

    #[test]
    fn test_constant_cache() {
        let mut circuit = Circuit::new();
        let a = circuit.constant(MachineType::I64, 1, GateType::NJS_VALUE);
        let b = circuit.constant(MachineType::I64, 1, GateType::NJS_VALUE);
        let c = circuit.constant(MachineType::I32, 1, GateType::NJS_VALUE);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(circuit.gate_meta(a).value(), 1);
    }

    #[test]
    fn test_advance_time_clears_marks() {
        let mut circuit = Circuit::new();
        let entry = circuit.state_entry();
        circuit.set_visited(entry);
        assert!(circuit.is_visited(entry));

        circuit.advance_time();
        assert_eq!(circuit.get_mark(entry), MarkCode::NoMark);
        circuit.set_finished(entry);
        assert!(circuit.is_finished(entry));
    }

    #[test]
    fn test_uses_flags_state_edges() {
        let mut circuit = Circuit::new();
        let entry = circuit.state_entry();
        let cond = circuit.constant(MachineType::I1, 1, GateType::NJS_VALUE);
        let meta = circuit.metas().fixed(OpCode::IfBranch);
        let branch = circuit.new_gate(meta, MachineType::NoValue, &[entry, cond], GateType::EMPTY);

        let from_entry: Vec<_> = circuit.uses(entry).collect();
        assert_eq!(from_entry.len(), 1);
        assert!(from_entry[0].is_state_edge);
        let from_cond: Vec<_> = circuit.uses(cond).collect();
        assert_eq!(from_cond[0].consumer, branch);
        assert!(!from_cond[0].is_state_edge);
    }
}
