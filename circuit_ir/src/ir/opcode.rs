//! Opcode catalogue for the circuit IR.
//!
//! Every opcode has exactly one row in [`OpCode::descriptor`]. The row is the
//! single source of truth for:
//! - the printable name
//! - the [`GateFlags`] (no-write, root edge, frame-state edge)
//! - the default state/depend/value input counts
//! - which payload the metadata carries ([`ShapeKind`])
//! - the classification traits queried by passes ([`OpTraits`])
//!
//! Classification predicates on [`GateMetaData`](super::meta::GateMetaData)
//! are thin projections over this table.

use std::fmt;

// =============================================================================
// Gate Flags
// =============================================================================

bitflags::bitflags! {
    /// Cross-cutting properties of a gate shape.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct GateFlags: u8 {
        /// The gate never writes memory.
        const NO_WRITE = 0b0000_0001;
        /// The gate carries one root edge after its frame-state zone.
        const HAS_ROOT = 0b0000_0010;
        /// The gate carries one frame-state edge after its value zone.
        const HAS_FRAME_STATE = 0b0000_0100;

        /// Plain control gates.
        const CONTROL = Self::NO_WRITE.bits();
        /// Gates that may deoptimize and therefore need a frame state.
        const CHECKABLE = Self::HAS_FRAME_STATE.bits();
        /// Graph roots hanging off the circuit root.
        const ROOT = Self::NO_WRITE.bits() | Self::HAS_ROOT.bits();
        /// Gates pinned to a control node (selectors, relays).
        const FIXED = Self::NO_WRITE.bits();
    }
}

impl Default for GateFlags {
    fn default() -> Self {
        GateFlags::empty()
    }
}

bitflags::bitflags! {
    /// Classification traits used by scheduling and verification.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpTraits: u16 {
        /// One of the five graph roots.
        const ROOT = 1 << 0;
        /// Lives in the prolog (function arguments).
        const PROLOG = 1 << 1;
        /// Pinned to a control gate (selectors, relays).
        const FIXED = 1 << 2;
        /// May feed the state input of an ordinary control gate.
        const GENERAL_STATE = 1 << 3;
        /// Ends a control path.
        const TERMINAL = 1 << 4;
        /// Joins control paths.
        const CFG_MERGE = 1 << 5;
        /// Branches or branch projections.
        const CONTROL_CASE = 1 << 6;
        /// Compile-time constant.
        const CONSTANT = 1 << 7;
        /// Operator specialised on front-end types.
        const TYPED_OPERATOR = 1 << 8;
        /// Type check with one checked value.
        const CHECK_ONE_IN = 1 << 9;
        /// Type check with a checked value and an index/type operand.
        const CHECK_TWO_INS = 1 << 10;
    }
}

// =============================================================================
// Edge Zones
// =============================================================================

/// The five input zones of a gate, in layout order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EdgeZone {
    /// Control predecessors.
    State = 0,
    /// Effect ordering.
    Depend = 1,
    /// Data operands.
    Value = 2,
    /// Deoptimization frame state.
    FrameState = 3,
    /// Graph root.
    Root = 4,
}

impl EdgeZone {
    /// All zones in layout order.
    pub const ALL: [EdgeZone; 5] = [
        EdgeZone::State,
        EdgeZone::Depend,
        EdgeZone::Value,
        EdgeZone::FrameState,
        EdgeZone::Root,
    ];
}

// =============================================================================
// Shape Kinds
// =============================================================================

/// Which metadata payload an opcode carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Parameterless; one shared instance per opcode.
    Fixed,
    /// Width of the given zone is chosen per instance.
    Sized(EdgeZone),
    /// One 64-bit parameter.
    OneParameter,
    /// A string literal.
    Str,
    /// A bytecode instruction with a variable number of value inputs.
    Bytecode,
    /// Typed binary sub-operator plus packed operand types.
    TypedBinary,
}

// =============================================================================
// Descriptor
// =============================================================================

/// One row of the opcode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpDesc {
    /// Printable name.
    pub name: &'static str,
    /// Cross-cutting flags.
    pub flags: GateFlags,
    /// State inputs (0 for the variable zone of sized shapes).
    pub state: u32,
    /// Depend inputs.
    pub depend: u32,
    /// Value inputs.
    pub value: u32,
    /// Payload kind.
    pub kind: ShapeKind,
    /// Classification traits.
    pub traits: OpTraits,
}

const fn row(
    name: &'static str,
    flags: GateFlags,
    counts: (u32, u32, u32),
    kind: ShapeKind,
    traits: OpTraits,
) -> OpDesc {
    OpDesc {
        name,
        flags,
        state: counts.0,
        depend: counts.1,
        value: counts.2,
        kind,
        traits,
    }
}

const NONE: GateFlags = GateFlags::empty();
const PLAIN: OpTraits = OpTraits::empty();
const GS: OpTraits = OpTraits::GENERAL_STATE;
const CASE: OpTraits = OpTraits::CONTROL_CASE;

// =============================================================================
// Opcodes
// =============================================================================

/// Instruction kind of a gate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum OpCode {
    // Graph structure
    Nop,
    CircuitRoot,
    StateEntry,
    DependEntry,
    ReturnList,
    ArgList,
    Arg,

    // Control
    Return,
    ReturnVoid,
    Throw,
    OrdinaryBlock,
    IfBranch,
    SwitchBranch,
    IfTrue,
    IfFalse,
    SwitchCase,
    DefaultCase,
    Merge,
    LoopBegin,
    LoopBack,
    IfSuccess,
    IfException,
    JsBytecode,

    // Fixed
    ValueSelector,
    DependSelector,
    DependRelay,
    DependAnd,

    // Leaves
    Constant,
    ConstData,
    ConstString,
    RelocatableData,
    Alloca,
    FrameState,
    GetException,

    // Binary arithmetic
    Add,
    Sub,
    Mul,
    Exp,
    Sdiv,
    Smod,
    Udiv,
    Umod,
    Fdiv,
    Fmod,
    And,
    Xor,
    Or,
    Lsl,
    Lsr,
    Asr,
    Icmp,
    Fcmp,

    // Unary and conversions
    Rev,
    Zext,
    Sext,
    Trunc,
    Fext,
    Ftrunc,
    SignedIntToFloat,
    UnsignedIntToFloat,
    FloatToSignedInt,
    UnsignedFloatToInt,
    Bitcast,
    TaggedToInt64,
    Int64ToTagged,

    // Memory
    Load,
    Store,
    HeapAlloc,
    LoadElement,
    StoreElement,
    LoadProperty,
    StoreProperty,
    LoadArrayLength,
    ToLength,

    // Calls
    Call,
    RuntimeCall,
    BytecodeCall,
    TypedCall,

    // Typed operators
    TypedBinaryOp,
    TypedUnaryOp,
    TypeConvert,

    // Checks
    ObjectTypeCheck,
    IndexCheck,
    PrimitiveTypeCheck,
    TypedArrayCheck,
    StableArrayCheck,
    ArrayCheck,
    TypedCallCheck,
    Int32OverflowCheck,
    DeoptCheck,
    UpdateHotness,
}

impl OpCode {
    /// Number of opcodes.
    pub const COUNT: usize = OpCode::UpdateHotness as usize + 1;

    /// Every opcode, in discriminant order.
    pub const ALL: [OpCode; OpCode::COUNT] = {
        let mut all = [OpCode::Nop; OpCode::COUNT];
        let mut i = 0;
        while i < OpCode::COUNT {
            // SAFETY: `OpCode` is a fieldless `repr(u8)` enum with contiguous
            // discriminants `0..COUNT`.
            all[i] = unsafe { std::mem::transmute::<u8, OpCode>(i as u8) };
            i += 1;
        }
        all
    };

    /// The table row for this opcode.
    pub const fn descriptor(self) -> OpDesc {
        use OpCode::*;
        use ShapeKind::*;
        match self {
            Nop => row("NOP", NONE, (0, 0, 0), Fixed, PLAIN),
            CircuitRoot => row("CIRCUIT_ROOT", NONE, (0, 0, 0), Fixed, OpTraits::ROOT),
            StateEntry => row(
                "STATE_ENTRY",
                GateFlags::ROOT,
                (0, 0, 0),
                Fixed,
                OpTraits::ROOT.union(GS),
            ),
            DependEntry => row("DEPEND_ENTRY", GateFlags::ROOT, (0, 0, 0), Fixed, OpTraits::ROOT),
            ReturnList => row("RETURN_LIST", GateFlags::ROOT, (0, 0, 0), Fixed, OpTraits::ROOT),
            ArgList => row("ARG_LIST", GateFlags::ROOT, (0, 0, 0), Fixed, OpTraits::ROOT),
            Arg => row("ARG", GateFlags::HAS_ROOT, (0, 0, 0), OneParameter, OpTraits::PROLOG),

            Return => row("RETURN", GateFlags::HAS_ROOT, (1, 1, 1), Fixed, OpTraits::TERMINAL),
            ReturnVoid => row(
                "RETURN_VOID",
                GateFlags::HAS_ROOT,
                (1, 1, 0),
                Fixed,
                OpTraits::TERMINAL,
            ),
            Throw => row("THROW", GateFlags::CONTROL, (1, 1, 1), Fixed, OpTraits::TERMINAL),
            OrdinaryBlock => row("ORDINARY_BLOCK", GateFlags::CONTROL, (1, 0, 0), Fixed, GS),
            IfBranch => row("IF_BRANCH", GateFlags::CONTROL, (1, 0, 1), Fixed, CASE),
            SwitchBranch => row(
                "SWITCH_BRANCH",
                GateFlags::CONTROL,
                (1, 0, 1),
                OneParameter,
                CASE,
            ),
            IfTrue => row("IF_TRUE", GateFlags::CONTROL, (1, 0, 0), Fixed, GS.union(CASE)),
            IfFalse => row("IF_FALSE", GateFlags::CONTROL, (1, 0, 0), Fixed, GS.union(CASE)),
            SwitchCase => row(
                "SWITCH_CASE",
                GateFlags::CONTROL,
                (1, 0, 0),
                OneParameter,
                GS.union(CASE),
            ),
            DefaultCase => row(
                "DEFAULT_CASE",
                GateFlags::CONTROL,
                (1, 0, 0),
                Fixed,
                GS.union(CASE),
            ),
            Merge => row(
                "MERGE",
                GateFlags::CONTROL,
                (0, 0, 0),
                Sized(EdgeZone::State),
                GS.union(OpTraits::CFG_MERGE),
            ),
            LoopBegin => row(
                "LOOP_BEGIN",
                GateFlags::CONTROL,
                (2, 0, 0),
                Fixed,
                GS.union(OpTraits::CFG_MERGE),
            ),
            LoopBack => row("LOOP_BACK", GateFlags::CONTROL, (1, 0, 0), Fixed, PLAIN),
            IfSuccess => row("IF_SUCCESS", GateFlags::CONTROL, (1, 0, 0), Fixed, GS.union(CASE)),
            IfException => row(
                "IF_EXCEPTION",
                GateFlags::CONTROL,
                (1, 0, 0),
                Fixed,
                GS.union(CASE),
            ),
            JsBytecode => row("JS_BYTECODE", NONE, (1, 1, 0), Bytecode, GS),

            ValueSelector => row(
                "VALUE_SELECTOR",
                GateFlags::FIXED,
                (1, 0, 0),
                Sized(EdgeZone::Value),
                OpTraits::FIXED,
            ),
            DependSelector => row(
                "DEPEND_SELECTOR",
                GateFlags::FIXED,
                (1, 0, 0),
                Sized(EdgeZone::Depend),
                OpTraits::FIXED,
            ),
            DependRelay => row("DEPEND_RELAY", GateFlags::FIXED, (1, 1, 0), Fixed, OpTraits::FIXED),
            DependAnd => row("DEPEND_AND", GateFlags::FIXED, (0, 2, 0), Fixed, OpTraits::FIXED),

            Constant => row(
                "CONSTANT",
                GateFlags::NO_WRITE,
                (0, 0, 0),
                OneParameter,
                OpTraits::CONSTANT,
            ),
            ConstData => row(
                "CONST_DATA",
                GateFlags::NO_WRITE,
                (0, 0, 0),
                OneParameter,
                OpTraits::CONSTANT,
            ),
            ConstString => row("CONSTSTRING", GateFlags::NO_WRITE, (0, 0, 0), Str, PLAIN),
            RelocatableData => row(
                "RELOCATABLE_DATA",
                GateFlags::NO_WRITE,
                (0, 0, 0),
                OneParameter,
                PLAIN,
            ),
            Alloca => row("ALLOCA", GateFlags::NO_WRITE, (0, 0, 0), OneParameter, PLAIN),
            FrameState => row("FRAME_STATE", GateFlags::NO_WRITE, (0, 0, 2), Fixed, PLAIN),
            GetException => row("GET_EXCEPTION", NONE, (0, 1, 0), Fixed, PLAIN),

            Add => binary("ADD"),
            Sub => binary("SUB"),
            Mul => binary("MUL"),
            Exp => binary("EXP"),
            Sdiv => binary("SDIV"),
            Smod => binary("SMOD"),
            Udiv => binary("UDIV"),
            Umod => binary("UMOD"),
            Fdiv => binary("FDIV"),
            Fmod => binary("FMOD"),
            And => binary("AND"),
            Xor => binary("XOR"),
            Or => binary("OR"),
            Lsl => binary("LSL"),
            Lsr => binary("LSR"),
            Asr => binary("ASR"),
            Icmp => row("ICMP", GateFlags::NO_WRITE, (0, 0, 2), OneParameter, PLAIN),
            Fcmp => row("FCMP", GateFlags::NO_WRITE, (0, 0, 2), OneParameter, PLAIN),

            Rev => unary("REV"),
            Zext => unary("ZEXT"),
            Sext => unary("SEXT"),
            Trunc => unary("TRUNC"),
            Fext => unary("FEXT"),
            Ftrunc => unary("FTRUNC"),
            SignedIntToFloat => unary("SIGNED_INT_TO_FLOAT"),
            UnsignedIntToFloat => unary("UNSIGNED_INT_TO_FLOAT"),
            FloatToSignedInt => unary("FLOAT_TO_SIGNED_INT"),
            UnsignedFloatToInt => unary("UNSIGNED_FLOAT_TO_INT"),
            Bitcast => unary("BITCAST"),
            TaggedToInt64 => unary("TAGGED_TO_INT64"),
            Int64ToTagged => unary("INT64_TO_TAGGED"),

            Load => row("LOAD", NONE, (0, 1, 1), Fixed, PLAIN),
            Store => row("STORE", NONE, (0, 1, 2), Fixed, PLAIN),
            HeapAlloc => row("HEAP_ALLOC", NONE, (1, 1, 1), OneParameter, GS),
            LoadElement => row("LOAD_ELEMENT", NONE, (1, 1, 2), OneParameter, GS),
            StoreElement => row("STORE_ELEMENT", NONE, (1, 1, 3), OneParameter, GS),
            LoadProperty => row("LOAD_PROPERTY", NONE, (1, 1, 2), Fixed, GS),
            StoreProperty => row("STORE_PROPERTY", NONE, (1, 1, 3), Fixed, GS),
            LoadArrayLength => row("LOAD_ARRAY_LENGTH", GateFlags::NO_WRITE, (0, 1, 1), Fixed, PLAIN),
            ToLength => row("TO_LENGTH", NONE, (1, 1, 1), Fixed, GS),

            Call => row("CALL", NONE, (0, 1, 0), Sized(EdgeZone::Value), PLAIN),
            RuntimeCall => row("RUNTIME_CALL", NONE, (0, 1, 0), Sized(EdgeZone::Value), PLAIN),
            BytecodeCall => row("BYTECODE_CALL", NONE, (0, 1, 0), Sized(EdgeZone::Value), PLAIN),
            TypedCall => row("TYPED_CALL", NONE, (1, 1, 0), Sized(EdgeZone::Value), GS),

            TypedBinaryOp => row(
                "TYPED_BINARY_OP",
                NONE,
                (1, 1, 2),
                TypedBinary,
                GS.union(OpTraits::TYPED_OPERATOR),
            ),
            TypedUnaryOp => row(
                "TYPED_UNARY_OP",
                NONE,
                (1, 1, 1),
                OneParameter,
                GS.union(OpTraits::TYPED_OPERATOR),
            ),
            TypeConvert => row(
                "TYPE_CONVERT",
                NONE,
                (1, 1, 1),
                OneParameter,
                GS.union(OpTraits::TYPED_OPERATOR),
            ),

            ObjectTypeCheck => check("OBJECT_TYPE_CHECK", 2, OneParameter, OpTraits::CHECK_TWO_INS),
            IndexCheck => check("INDEX_CHECK", 2, OneParameter, OpTraits::CHECK_TWO_INS),
            PrimitiveTypeCheck => {
                check("PRIMITIVE_TYPE_CHECK", 1, OneParameter, OpTraits::CHECK_ONE_IN)
            }
            TypedArrayCheck => check("TYPED_ARRAY_CHECK", 1, OneParameter, OpTraits::CHECK_ONE_IN),
            StableArrayCheck => check("STABLE_ARRAY_CHECK", 1, Fixed, OpTraits::CHECK_ONE_IN),
            ArrayCheck => check("ARRAY_CHECK", 1, Fixed, OpTraits::CHECK_ONE_IN),
            TypedCallCheck => check("TYPED_CALL_CHECK", 3, Fixed, OpTraits::CHECK_ONE_IN),
            Int32OverflowCheck => check("INT32_OVERFLOW_CHECK", 1, OneParameter, PLAIN),
            DeoptCheck => check("DEOPT_CHECK", 1, Fixed, PLAIN),
            UpdateHotness => row("UPDATE_HOTNESS", NONE, (0, 1, 1), Fixed, PLAIN),
        }
    }

    /// Printable name, e.g. `IF_BRANCH`.
    #[inline]
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Flags of this opcode.
    #[inline]
    pub const fn flags(self) -> GateFlags {
        self.descriptor().flags
    }

    /// Payload kind of this opcode.
    #[inline]
    pub const fn shape_kind(self) -> ShapeKind {
        self.descriptor().kind
    }

    /// Classification traits of this opcode.
    #[inline]
    pub const fn traits(self) -> OpTraits {
        self.descriptor().traits
    }

    /// Check if this opcode has the given trait.
    #[inline]
    pub const fn has(self, t: OpTraits) -> bool {
        self.traits().contains(t)
    }

    /// Look an opcode up by its printable name.
    pub fn from_name(name: &str) -> Option<OpCode> {
        OpCode::ALL.iter().copied().find(|op| op.name() == name)
    }
}

const fn binary(name: &'static str) -> OpDesc {
    row(name, GateFlags::NO_WRITE, (0, 0, 2), ShapeKind::Fixed, PLAIN)
}

const fn unary(name: &'static str) -> OpDesc {
    row(name, GateFlags::NO_WRITE, (0, 0, 1), ShapeKind::Fixed, PLAIN)
}

/// Deoptimizing guard: sits on the control chain and the effect chain.
const fn check(name: &'static str, values: u32, kind: ShapeKind, traits: OpTraits) -> OpDesc {
    row(name, GateFlags::CHECKABLE, (1, 1, values), kind, GS.union(traits))
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Sub-operators
// =============================================================================

/// Sub-operator of a `TYPED_BINARY_OP` gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypedBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    Shl,
    Shr,
    Ashr,
    And,
    Or,
    Xor,
    Exp,
}

impl TypedBinOp {
    /// Printable name, e.g. `TYPED_ADD`.
    pub const fn name(self) -> &'static str {
        match self {
            TypedBinOp::Add => "TYPED_ADD",
            TypedBinOp::Sub => "TYPED_SUB",
            TypedBinOp::Mul => "TYPED_MUL",
            TypedBinOp::Div => "TYPED_DIV",
            TypedBinOp::Mod => "TYPED_MOD",
            TypedBinOp::Less => "TYPED_LESS",
            TypedBinOp::LessEq => "TYPED_LESSEQ",
            TypedBinOp::Greater => "TYPED_GREATER",
            TypedBinOp::GreaterEq => "TYPED_GREATEREQ",
            TypedBinOp::Eq => "TYPED_EQ",
            TypedBinOp::NotEq => "TYPED_NOTEQ",
            TypedBinOp::Shl => "TYPED_SHL",
            TypedBinOp::Shr => "TYPED_SHR",
            TypedBinOp::Ashr => "TYPED_ASHR",
            TypedBinOp::And => "TYPED_AND",
            TypedBinOp::Or => "TYPED_OR",
            TypedBinOp::Xor => "TYPED_XOR",
            TypedBinOp::Exp => "TYPED_EXP",
        }
    }

    /// Check if the sub-operator produces a boolean.
    #[inline]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            TypedBinOp::Less
                | TypedBinOp::LessEq
                | TypedBinOp::Greater
                | TypedBinOp::GreaterEq
                | TypedBinOp::Eq
                | TypedBinOp::NotEq
        )
    }
}

/// Condition code carried by `ICMP` gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ICmpCondition {
    Eq = 1,
    Ugt,
    Uge,
    Ult,
    Ule,
    Ne,
    Sgt,
    Sge,
    Slt,
    Sle,
}

/// Condition code carried by `FCMP` gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FCmpCondition {
    Oeq = 1,
    Ogt,
    Oge,
    Olt,
    Ole,
    One,
    Ord,
    Uno,
}

// =============================================================================
// Tests
// =============================================================================
