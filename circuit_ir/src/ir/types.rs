//! Machine-level and front-end type tags carried by every gate.
//!
//! - [`MachineType`] is the width/kind of the value a gate produces as seen by
//!   the code generator. Two pseudo types exist: `ARCH` (pointer width of the
//!   target) and `FLEX` (same width as the consuming gate).
//! - [`GateType`] is an opaque front-end type reference (module id + local
//!   id) plus a handful of named tags for untyped values.

use std::fmt;

// =============================================================================
// Machine Type
// =============================================================================

/// Machine representation of a gate's output.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum MachineType {
    /// Produces no value (control and effect gates).
    NoValue = 0,
    /// Produces a value whose representation is decided later.
    AnyValue = 1,
    /// Pointer-sized integer of the compilation target.
    Arch = 2,
    /// Same width as the gate that consumes it.
    Flex = 3,
    /// 1-bit integer (conditions).
    I1 = 4,
    /// 8-bit integer.
    I8 = 5,
    /// 16-bit integer.
    I16 = 6,
    /// 32-bit integer.
    I32 = 7,
    /// 64-bit integer.
    I64 = 8,
    /// 32-bit float.
    F32 = 9,
    /// 64-bit float.
    F64 = 10,
}

impl MachineType {
    /// Upper-case name used in dumps and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            MachineType::NoValue => "NOVALUE",
            MachineType::AnyValue => "ANYVALUE",
            MachineType::Arch => "ARCH",
            MachineType::Flex => "FLEX",
            MachineType::I1 => "I1",
            MachineType::I8 => "I8",
            MachineType::I16 => "I16",
            MachineType::I32 => "I32",
            MachineType::I64 => "I64",
            MachineType::F32 => "F32",
            MachineType::F64 => "F64",
        }
    }

    /// Replace `ARCH` by the concrete pointer-width integer.
    #[inline]
    pub const fn resolve_arch(self, is_arch64: bool) -> MachineType {
        match self {
            MachineType::Arch if is_arch64 => MachineType::I64,
            MachineType::Arch => MachineType::I32,
            other => other,
        }
    }

    /// Check if this is an integer type (including the pointer pseudo type).
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            MachineType::I1
                | MachineType::I8
                | MachineType::I16
                | MachineType::I32
                | MachineType::I64
                | MachineType::Arch
        )
    }

    /// Check if this is a floating-point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, MachineType::F32 | MachineType::F64)
    }

    /// Bit width, if the type is concrete.
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            MachineType::I1 => Some(1),
            MachineType::I8 => Some(8),
            MachineType::I16 => Some(16),
            MachineType::I32 | MachineType::F32 => Some(32),
            MachineType::I64 | MachineType::F64 => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Gate Type
// =============================================================================

/// Front-end type reference attached to a gate.
///
/// Layout: the upper 16 bits are the module id, the lower 16 bits the local
/// id inside that module. Module `0xFFFF` is reserved for the named tags.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GateType(u32);

const MODULE_SHIFT: u32 = 16;
const LOCAL_MASK: u32 = 0xFFFF;
const RESERVED_MODULE: u16 = 0xFFFF;

impl GateType {
    /// No type (control and effect gates).
    pub const EMPTY: Self = Self::reserved(0);
    /// Any tagged or untagged value.
    pub const ANY_TYPE: Self = Self::reserved(1);
    /// A raw machine value that is not a managed-language value.
    pub const NJS_VALUE: Self = Self::reserved(2);
    /// A tagged managed-language value.
    pub const TAGGED_VALUE: Self = Self::reserved(3);
    /// A tagged value known to be a heap pointer.
    pub const TAGGED_POINTER: Self = Self::reserved(4);
    /// A tagged value known not to be a heap pointer.
    pub const TAGGED_NPOINTER: Self = Self::reserved(5);

    const fn reserved(local: u16) -> Self {
        Self::new(RESERVED_MODULE, local)
    }

    /// Build a type reference from its module and local ids.
    #[inline]
    pub const fn new(module_id: u16, local_id: u16) -> Self {
        GateType(((module_id as u32) << MODULE_SHIFT) | local_id as u32)
    }

    /// Rebuild a type from its raw encoding.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        GateType(raw)
    }

    /// Raw encoding.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Module id half of the reference.
    #[inline]
    pub const fn module_id(self) -> u16 {
        (self.0 >> MODULE_SHIFT) as u16
    }

    /// Local id half of the reference.
    #[inline]
    pub const fn local_id(self) -> u16 {
        (self.0 & LOCAL_MASK) as u16
    }

    /// Name of a reserved tag, `None` for real type references.
    pub const fn tag_name(self) -> Option<&'static str> {
        if self.module_id() != RESERVED_MODULE {
            return None;
        }
        match self.local_id() {
            0 => Some("EMPTY"),
            1 => Some("ANY_TYPE"),
            2 => Some("NJS_VALUE"),
            3 => Some("TAGGED_VALUE"),
            4 => Some("TAGGED_POINTER"),
            5 => Some("TAGGED_NPOINTER"),
            _ => None,
        }
    }
}

impl Default for GateType {
    fn default() -> Self {
        GateType::EMPTY
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "GT(M={}, L={})", self.module_id(), self.local_id()),
        }
    }
}

impl fmt::Debug for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// =============================================================================
// Tests
// =============================================================================
