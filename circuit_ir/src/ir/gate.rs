//! Gate records and their edge slots.
//!
//! A gate with `N` inputs owns `N` [`In`] slots and `N` [`Out`] slots. `In[i]`
//! names the producer feeding input `i`; `Out[i]` is the node of the
//! producer's consumer list that represents that same edge. Walking a
//! producer's consumers therefore never allocates:
//!
//! ```text
//!   producer.first_out ──► (consumer A, slot 2) ──► (consumer B, slot 0) ──► ∅
//! ```
//!
//! Slot storage is owned here; linking and unlinking happen in
//! [`Circuit`](super::circuit::Circuit), which can reach both ends of an
//! edge.

use smallvec::SmallVec;

use super::arena::Id;
use super::meta::MetaRef;
use super::opcode::OpCode;
use super::types::{GateType, MachineType};

/// Handle to a gate inside its circuit.
pub type GateId = Id<Gate>;

/// An incoming edge slot. `None` is the empty sentinel.
pub type In = Option<GateId>;

/// Traversal generation.
pub type TimeStamp = u32;

/// Inline slot capacity before spilling to the heap.
const INLINE_SLOTS: usize = 4;

// =============================================================================
// Edge Slots
// =============================================================================

/// One edge seen from its producer: the consumer and the input slot it uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UseRef {
    /// Consuming gate.
    pub gate: GateId,
    /// Input slot of the consumer.
    pub index: u32,
}

impl UseRef {
    #[inline]
    pub const fn new(gate: GateId, index: usize) -> Self {
        UseRef {
            gate,
            index: index as u32,
        }
    }

    #[inline]
    pub const fn slot(self) -> usize {
        self.index as usize
    }
}

/// Consumer-list node paired with the `In` slot of the same index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Out {
    pub(crate) prev: Option<UseRef>,
    pub(crate) next: Option<UseRef>,
}

impl Out {
    /// Previous node in the producer's consumer list.
    #[inline]
    pub fn prev(&self) -> Option<UseRef> {
        self.prev
    }

    /// Next node in the producer's consumer list.
    #[inline]
    pub fn next(&self) -> Option<UseRef> {
        self.next
    }

    /// Check if this node heads its list.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.prev.is_none()
    }

    /// Check if this node ends its list.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

// =============================================================================
// Marks
// =============================================================================

/// Per-traversal mark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MarkCode {
    #[default]
    NoMark = 0,
    Visited = 1,
    Finished = 2,
}

impl MarkCode {
    /// Numeric value used in dumps.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// Gate
// =============================================================================

/// A node of the circuit.
#[derive(Debug, Clone)]
pub struct Gate {
    id: GateId,
    meta: MetaRef,
    opcode: OpCode,
    machine_type: MachineType,
    gate_type: GateType,
    mark: MarkCode,
    stamp: TimeStamp,
    first_out: Option<UseRef>,
    ins: SmallVec<[In; INLINE_SLOTS]>,
    outs: SmallVec<[Out; INLINE_SLOTS]>,
    deleted: bool,
}

impl Gate {
    /// Create a gate with `num_ins` empty slots.
    pub(crate) fn new(
        id: GateId,
        meta: MetaRef,
        opcode: OpCode,
        num_ins: usize,
        machine_type: MachineType,
        gate_type: GateType,
    ) -> Self {
        // Zero-input gates still reserve one slot pair.
        let capacity = num_ins.max(1);
        let mut ins = SmallVec::with_capacity(capacity);
        ins.resize(num_ins, None);
        let mut outs = SmallVec::with_capacity(capacity);
        outs.resize(num_ins, Out::default());
        Gate {
            id,
            meta,
            opcode,
            machine_type,
            gate_type,
            mark: MarkCode::NoMark,
            stamp: 0,
            first_out: None,
            ins,
            outs,
            deleted: false,
        }
    }

    #[inline]
    pub fn id(&self) -> GateId {
        self.id
    }

    #[inline]
    pub fn meta(&self) -> MetaRef {
        self.meta
    }

    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    #[inline]
    pub fn machine_type(&self) -> MachineType {
        self.machine_type
    }

    #[inline]
    pub fn set_machine_type(&mut self, machine_type: MachineType) {
        self.machine_type = machine_type;
    }

    #[inline]
    pub fn gate_type(&self) -> GateType {
        self.gate_type
    }

    #[inline]
    pub fn set_gate_type(&mut self, gate_type: GateType) {
        self.gate_type = gate_type;
    }

    #[inline]
    pub fn num_ins(&self) -> usize {
        self.ins.len()
    }

    /// Check if the gate was removed from the circuit.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    // =========================================================================
    // Slot Access
    // =========================================================================

    #[track_caller]
    #[inline]
    fn check_index(&self, idx: usize) {
        assert!(
            idx < self.ins.len(),
            "gate {}: input index {} out of range (numIns = {})",
            self.id,
            idx,
            self.ins.len()
        );
    }

    /// Producer of input `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= num_ins()`.
    #[track_caller]
    #[inline]
    pub fn in_at(&self, idx: usize) -> In {
        self.check_index(idx);
        self.ins[idx]
    }

    /// Consumer-list node of input `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= num_ins()`.
    #[track_caller]
    #[inline]
    pub fn out_at(&self, idx: usize) -> &Out {
        self.check_index(idx);
        &self.outs[idx]
    }

    /// All input slots.
    #[inline]
    pub fn ins(&self) -> &[In] {
        &self.ins
    }

    /// Check if input `idx` is empty.
    #[track_caller]
    #[inline]
    pub fn is_in_null(&self, idx: usize) -> bool {
        self.in_at(idx).is_none()
    }

    /// Head of this gate's consumer list.
    #[inline]
    pub fn first_out(&self) -> Option<UseRef> {
        self.first_out
    }

    /// Check if no gate consumes this one.
    #[inline]
    pub fn is_first_out_null(&self) -> bool {
        self.first_out.is_none()
    }

    #[track_caller]
    #[inline]
    pub(crate) fn set_in(&mut self, idx: usize, producer: In) {
        self.check_index(idx);
        self.ins[idx] = producer;
    }

    #[track_caller]
    #[inline]
    pub(crate) fn out_mut(&mut self, idx: usize) -> &mut Out {
        self.check_index(idx);
        &mut self.outs[idx]
    }

    #[inline]
    pub(crate) fn set_first_out(&mut self, head: Option<UseRef>) {
        self.first_out = head;
    }

    /// Switch to a wider shape and open one empty slot at the end.
    pub(crate) fn grow(&mut self, meta: MetaRef) {
        self.meta = meta;
        self.ins.push(None);
        self.outs.push(Out::default());
    }

    /// Replace the shape of an edgeless gate.
    pub(crate) fn retire(&mut self, meta: MetaRef, opcode: OpCode) {
        debug_assert!(self.ins.iter().all(Option::is_none));
        self.meta = meta;
        self.opcode = opcode;
        self.ins.clear();
        self.outs.clear();
        self.deleted = true;
    }

    // =========================================================================
    // Marks
    // =========================================================================

    /// Mark stored for `stamp`, or [`MarkCode::NoMark`] if the stored mark
    /// belongs to another traversal.
    #[inline]
    pub fn get_mark(&self, stamp: TimeStamp) -> MarkCode {
        if self.stamp == stamp {
            self.mark
        } else {
            MarkCode::NoMark
        }
    }

    #[inline]
    pub fn set_mark(&mut self, mark: MarkCode, stamp: TimeStamp) {
        self.mark = mark;
        self.stamp = stamp;
    }

    /// Raw stored mark and stamp, for dumps.
    #[inline]
    pub fn raw_mark(&self) -> (MarkCode, TimeStamp) {
        (self.mark, self.stamp)
    }
}

// =============================================================================
// Tests
// =============================================================================
