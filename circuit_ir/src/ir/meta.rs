//! Gate metadata: the shared description of a gate's shape.
//!
//! A [`GateMetaData`] records the opcode, flags and the explicit state,
//! depend and value counts. Frame-state and root counts are derived from the
//! flags. Every zone boundary a gate needs is a projection over these five
//! numbers; nothing about the shape is stored per gate.
//!
//! Metadata is never copied into a gate. Gates hold a [`MetaRef`] into the
//! [`MetaBuilder`](super::meta_builder::MetaBuilder) arena, so thousands of
//! `ADD` gates share one descriptor.

use std::fmt;

use super::arena::Id;
use super::opcode::{EdgeZone, GateFlags, OpCode, OpTraits, ShapeKind, TypedBinOp};

/// Handle to interned gate metadata.
pub type MetaRef = Id<GateMetaData>;

// =============================================================================
// Payload
// =============================================================================

/// Bytecode instruction carried by a `JS_BYTECODE` gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BytecodeInfo {
    /// Front-end opcode of the bytecode.
    pub bytecode: u32,
    /// Offset of the instruction in its method.
    pub pc_offset: u32,
}

/// Sub-operator and packed operand types of a `TYPED_BINARY_OP` gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypedBinaryInfo {
    /// Left and right operand `GateType`s packed as `(lhs << 32) | rhs`.
    pub operand_types: u64,
    /// The arithmetic or comparison performed.
    pub op: TypedBinOp,
}

impl TypedBinaryInfo {
    /// Pack two raw gate types into one operand-type word.
    #[inline]
    pub const fn pack(lhs: u32, rhs: u32) -> u64 {
        ((lhs as u64) << 32) | rhs as u64
    }

    /// Left operand type, raw.
    #[inline]
    pub const fn lhs(&self) -> u32 {
        (self.operand_types >> 32) as u32
    }

    /// Right operand type, raw.
    #[inline]
    pub const fn rhs(&self) -> u32 {
        self.operand_types as u32
    }
}

/// Storage flavour of a metadata instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaPayload {
    /// Parameterless flyweight.
    Fixed,
    /// Size-parameterized; the width lives in the variable zone count.
    Sized,
    /// One 64-bit parameter.
    OneParameter(u64),
    /// A string literal.
    Str(String),
    /// A bytecode instruction.
    Bytecode(BytecodeInfo),
    /// A typed binary operator.
    TypedBinary(TypedBinaryInfo),
}

/// Discriminant of [`MetaPayload`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    Immutable,
    MutableWithSize,
    OneParameter,
    Str,
    Bytecode,
    TypedBinary,
}

impl MetaPayload {
    /// The kind tag of this payload.
    pub const fn kind(&self) -> MetaKind {
        match self {
            MetaPayload::Fixed => MetaKind::Immutable,
            MetaPayload::Sized => MetaKind::MutableWithSize,
            MetaPayload::OneParameter(_) => MetaKind::OneParameter,
            MetaPayload::Str(_) => MetaKind::Str,
            MetaPayload::Bytecode(_) => MetaKind::Bytecode,
            MetaPayload::TypedBinary(_) => MetaKind::TypedBinary,
        }
    }
}

// =============================================================================
// Gate Metadata
// =============================================================================

/// Shape of a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateMetaData {
    opcode: OpCode,
    flags: GateFlags,
    state_count: u32,
    depend_count: u32,
    value_count: u32,
    payload: MetaPayload,
}

impl GateMetaData {
    /// Build metadata from explicit counts.
    ///
    /// The payload must agree with the opcode's [`ShapeKind`]; the builder is
    /// the only caller outside tests.
    pub fn new(
        opcode: OpCode,
        state_count: u32,
        depend_count: u32,
        value_count: u32,
        payload: MetaPayload,
    ) -> Self {
        debug_assert!(
            payload_matches(opcode.shape_kind(), &payload),
            "{} cannot carry a {:?} payload",
            opcode,
            payload.kind()
        );
        GateMetaData {
            opcode,
            flags: opcode.flags(),
            state_count,
            depend_count,
            value_count,
            payload,
        }
    }

    /// Build metadata with the opcode's default counts.
    pub fn with_defaults(opcode: OpCode, payload: MetaPayload) -> Self {
        let d = opcode.descriptor();
        Self::new(opcode, d.state, d.depend, d.value, payload)
    }

    // =========================================================================
    // Counts and Zone Offsets
    // =========================================================================

    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    #[inline]
    pub fn flags(&self) -> GateFlags {
        self.flags
    }

    #[inline]
    pub fn payload(&self) -> &MetaPayload {
        &self.payload
    }

    #[inline]
    pub fn kind(&self) -> MetaKind {
        self.payload.kind()
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.state_count as usize
    }

    #[inline]
    pub fn depend_count(&self) -> usize {
        self.depend_count as usize
    }

    #[inline]
    pub fn value_count(&self) -> usize {
        self.value_count as usize
    }

    #[inline]
    pub fn has_frame_state(&self) -> bool {
        self.flags.contains(GateFlags::HAS_FRAME_STATE)
    }

    #[inline]
    pub fn has_root(&self) -> bool {
        self.flags.contains(GateFlags::HAS_ROOT)
    }

    #[inline]
    pub fn is_no_write(&self) -> bool {
        self.flags.contains(GateFlags::NO_WRITE)
    }

    #[inline]
    pub fn frame_state_count(&self) -> usize {
        usize::from(self.has_frame_state())
    }

    #[inline]
    pub fn root_count(&self) -> usize {
        usize::from(self.has_root())
    }

    /// Total number of inputs across all five zones.
    #[inline]
    pub fn num_ins(&self) -> usize {
        self.state_count()
            + self.depend_count()
            + self.value_count()
            + self.frame_state_count()
            + self.root_count()
    }

    #[inline]
    pub fn depend_start(&self) -> usize {
        self.state_count()
    }

    #[inline]
    pub fn value_start(&self) -> usize {
        self.depend_start() + self.depend_count()
    }

    #[inline]
    pub fn frame_state_start(&self) -> usize {
        self.value_start() + self.value_count()
    }

    #[inline]
    pub fn root_start(&self) -> usize {
        self.frame_state_start() + self.frame_state_count()
    }

    /// Slot range of one zone.
    pub fn zone_range(&self, zone: EdgeZone) -> std::ops::Range<usize> {
        let (start, len) = match zone {
            EdgeZone::State => (0, self.state_count()),
            EdgeZone::Depend => (self.depend_start(), self.depend_count()),
            EdgeZone::Value => (self.value_start(), self.value_count()),
            EdgeZone::FrameState => (self.frame_state_start(), self.frame_state_count()),
            EdgeZone::Root => (self.root_start(), self.root_count()),
        };
        start..start + len
    }

    /// Zone that contains input slot `idx`.
    pub fn zone_of(&self, idx: usize) -> Option<EdgeZone> {
        EdgeZone::ALL
            .into_iter()
            .find(|zone| self.zone_range(*zone).contains(&idx))
    }

    /// Width of the variable zone for size-parameterized shapes.
    pub fn size(&self) -> Option<usize> {
        match (self.opcode.shape_kind(), &self.payload) {
            (ShapeKind::Sized(zone), MetaPayload::Sized) => Some(self.zone_range(zone).len()),
            (ShapeKind::Bytecode, MetaPayload::Bytecode(_)) => Some(self.value_count()),
            _ => None,
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[inline]
    fn has(&self, t: OpTraits) -> bool {
        self.opcode.has(t)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.has(OpTraits::ROOT)
    }

    #[inline]
    pub fn is_prolog(&self) -> bool {
        self.has(OpTraits::PROLOG)
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.has(OpTraits::FIXED)
    }

    #[inline]
    pub fn is_nop(&self) -> bool {
        self.opcode == OpCode::Nop
    }

    /// Floating data gate: scheduled freely by the scheduler.
    pub fn is_schedulable(&self) -> bool {
        !self.is_nop()
            && !self.is_prolog()
            && !self.is_root()
            && !self.is_fixed()
            && self.state_count == 0
    }

    /// Control gate: has at least one state input.
    pub fn is_state(&self) -> bool {
        !self.is_nop()
            && !self.is_prolog()
            && !self.is_root()
            && !self.is_fixed()
            && self.state_count > 0
    }

    #[inline]
    pub fn is_general_state(&self) -> bool {
        self.has(OpTraits::GENERAL_STATE)
    }

    #[inline]
    pub fn is_terminal_state(&self) -> bool {
        self.has(OpTraits::TERMINAL)
    }

    #[inline]
    pub fn is_cfg_merge(&self) -> bool {
        self.has(OpTraits::CFG_MERGE)
    }

    #[inline]
    pub fn is_control_case(&self) -> bool {
        self.has(OpTraits::CONTROL_CASE)
    }

    #[inline]
    pub fn is_loop_head(&self) -> bool {
        self.opcode == OpCode::LoopBegin
    }

    #[inline]
    pub fn is_loop_back(&self) -> bool {
        self.opcode == OpCode::LoopBack
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.has(OpTraits::CONSTANT)
    }

    #[inline]
    pub fn is_depend_selector(&self) -> bool {
        self.opcode == OpCode::DependSelector
    }

    #[inline]
    pub fn is_typed_operator(&self) -> bool {
        self.has(OpTraits::TYPED_OPERATOR)
    }

    #[inline]
    pub fn is_check_with_one_in(&self) -> bool {
        self.has(OpTraits::CHECK_ONE_IN)
    }

    #[inline]
    pub fn is_check_with_two_ins(&self) -> bool {
        self.has(OpTraits::CHECK_TWO_INS)
    }

    // =========================================================================
    // Kind-specific Accessors
    // =========================================================================

    /// The 64-bit parameter, if this metadata carries one.
    pub fn try_value(&self) -> Option<u64> {
        match self.payload {
            MetaPayload::OneParameter(v) => Some(v),
            MetaPayload::TypedBinary(info) => Some(info.operand_types),
            _ => None,
        }
    }

    /// The 64-bit parameter.
    ///
    /// # Panics
    ///
    /// Panics if the metadata is not of the one-parameter kind.
    pub fn value(&self) -> u64 {
        match self.payload {
            MetaPayload::OneParameter(v) => v,
            _ => self.wrong_kind(MetaKind::OneParameter),
        }
    }

    /// The string literal.
    ///
    /// # Panics
    ///
    /// Panics if the metadata is not of the string kind.
    pub fn string(&self) -> &str {
        match &self.payload {
            MetaPayload::Str(s) => s,
            _ => self.wrong_kind(MetaKind::Str),
        }
    }

    /// The bytecode instruction.
    ///
    /// # Panics
    ///
    /// Panics if the metadata is not of the bytecode kind.
    pub fn bytecode(&self) -> BytecodeInfo {
        match self.payload {
            MetaPayload::Bytecode(info) => info,
            _ => self.wrong_kind(MetaKind::Bytecode),
        }
    }

    /// The typed binary operator.
    ///
    /// # Panics
    ///
    /// Panics if the metadata is not of the typed-binary kind.
    pub fn typed_binary(&self) -> TypedBinaryInfo {
        match self.payload {
            MetaPayload::TypedBinary(info) => info,
            _ => self.wrong_kind(MetaKind::TypedBinary),
        }
    }

    #[cold]
    #[track_caller]
    fn wrong_kind(&self, expected: MetaKind) -> ! {
        panic!(
            "{} metadata is {:?}, not {:?}",
            self.opcode,
            self.kind(),
            expected
        )
    }
}

fn payload_matches(kind: ShapeKind, payload: &MetaPayload) -> bool {
    matches!(
        (kind, payload),
        (ShapeKind::Fixed, MetaPayload::Fixed)
            | (ShapeKind::Sized(_), MetaPayload::Sized)
            | (ShapeKind::OneParameter, MetaPayload::OneParameter(_))
            | (ShapeKind::Str, MetaPayload::Str(_))
            | (ShapeKind::Bytecode, MetaPayload::Bytecode(_))
            | (ShapeKind::TypedBinary, MetaPayload::TypedBinary(_))
    )
}

impl fmt::Display for GateMetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(s={}, d={}, v={}, fs={}, r={})",
            self.opcode,
            self.state_count,
            self.depend_count,
            self.value_count,
            self.frame_state_count(),
            self.root_count()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
