//! Interning factory for gate metadata.
//!
//! The builder owns the metadata arena. Requests for the same shape return
//! the same [`MetaRef`] wherever deduplication is cheap:
//! - parameterless opcodes: one flyweight each, created up front
//! - size-parameterized opcodes: widths `1..=MAX_CACHED_WIDTH` created up front
//! - `ARG`: indices `0..=MAX_CACHED_ARG` created up front
//!
//! Everything else (larger widths, other parameters, strings, bytecodes,
//! typed operators) allocates a fresh instance on every request.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use super::arena::Arena;
use super::meta::{BytecodeInfo, GateMetaData, MetaPayload, MetaRef, TypedBinaryInfo};
use super::opcode::{EdgeZone, OpCode, ShapeKind, TypedBinOp};

/// Largest variable-zone width served from the cache.
pub const MAX_CACHED_WIDTH: u32 = 5;

/// Largest `ARG` index served from the cache.
pub const MAX_CACHED_ARG: u64 = 10;

/// Owner and interner of all metadata of one circuit.
#[derive(Debug, Clone)]
pub struct MetaBuilder {
    metas: Arena<GateMetaData>,
    fixed: [Option<MetaRef>; OpCode::COUNT],
    sized: FxHashMap<(OpCode, u32), MetaRef>,
    args: SmallVec<[MetaRef; 11]>,
}

impl MetaBuilder {
    /// Create a builder with every cached shape pre-allocated.
    pub fn new() -> Self {
        let mut builder = MetaBuilder {
            metas: Arena::with_capacity(OpCode::COUNT * 2),
            fixed: [None; OpCode::COUNT],
            sized: FxHashMap::default(),
            args: SmallVec::new(),
        };

        for op in OpCode::ALL {
            match op.shape_kind() {
                ShapeKind::Fixed => {
                    let meta = builder
                        .metas
                        .alloc(GateMetaData::with_defaults(op, MetaPayload::Fixed));
                    builder.fixed[op as usize] = Some(meta);
                }
                ShapeKind::Sized(zone) => {
                    for width in 1..=MAX_CACHED_WIDTH {
                        let meta = builder.metas.alloc(sized_shape(op, zone, width));
                        builder.sized.insert((op, width), meta);
                    }
                }
                _ => {}
            }
        }

        for index in 0..=MAX_CACHED_ARG {
            let meta = builder
                .metas
                .alloc(GateMetaData::with_defaults(OpCode::Arg, MetaPayload::OneParameter(index)));
            builder.args.push(meta);
        }

        builder
    }

    /// Look metadata up by handle.
    #[inline]
    pub fn get(&self, meta: MetaRef) -> &GateMetaData {
        &self.metas[meta]
    }

    /// Number of metadata instances allocated so far, cached ones included.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.metas.len()
    }

    fn alloc_fresh(&mut self, meta: GateMetaData) -> MetaRef {
        debug!(meta = %meta, "allocating uncached gate metadata");
        self.metas.alloc(meta)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// The flyweight of a parameterless opcode.
    ///
    /// # Panics
    ///
    /// Panics if `op` carries a payload or a size parameter.
    #[track_caller]
    pub fn fixed(&self, op: OpCode) -> MetaRef {
        match self.fixed[op as usize] {
            Some(meta) => meta,
            None => panic!("{} is not a parameterless opcode", op),
        }
    }

    /// Shape of a size-parameterized opcode with `width` inputs in its
    /// variable zone.
    ///
    /// # Panics
    ///
    /// Panics if `op` is not size-parameterized.
    #[track_caller]
    pub fn sized(&mut self, op: OpCode, width: u32) -> MetaRef {
        let ShapeKind::Sized(zone) = op.shape_kind() else {
            panic!("{} is not a size-parameterized opcode", op);
        };
        if let Some(&meta) = self.sized.get(&(op, width)) {
            return meta;
        }
        self.alloc_fresh(sized_shape(op, zone, width))
    }

    /// Shape of a one-parameter opcode.
    ///
    /// # Panics
    ///
    /// Panics if `op` does not take exactly one 64-bit parameter.
    #[track_caller]
    pub fn one_parameter(&mut self, op: OpCode, value: u64) -> MetaRef {
        assert!(
            op.shape_kind() == ShapeKind::OneParameter,
            "{} does not take a 64-bit parameter",
            op
        );
        if op == OpCode::Arg && value <= MAX_CACHED_ARG {
            return self.args[value as usize];
        }
        self.alloc_fresh(GateMetaData::with_defaults(op, MetaPayload::OneParameter(value)))
    }

    /// Shape of the `index`-th function argument.
    #[inline]
    pub fn arg(&mut self, index: u64) -> MetaRef {
        self.one_parameter(OpCode::Arg, index)
    }

    /// Shape of a `CONSTANT` holding `value`.
    #[inline]
    pub fn constant(&mut self, value: u64) -> MetaRef {
        self.one_parameter(OpCode::Constant, value)
    }

    /// Shape of a string literal.
    pub fn const_string(&mut self, literal: impl Into<String>) -> MetaRef {
        self.alloc_fresh(GateMetaData::with_defaults(
            OpCode::ConstString,
            MetaPayload::Str(literal.into()),
        ))
    }

    /// Shape of a bytecode instruction with `value_count` operands.
    pub fn js_bytecode(&mut self, value_count: u32, bytecode: u32, pc_offset: u32) -> MetaRef {
        let d = OpCode::JsBytecode.descriptor();
        self.alloc_fresh(GateMetaData::new(
            OpCode::JsBytecode,
            d.state,
            d.depend,
            value_count,
            MetaPayload::Bytecode(BytecodeInfo {
                bytecode,
                pc_offset,
            }),
        ))
    }

    /// Shape of a typed binary operator.
    pub fn typed_binary(&mut self, operand_types: u64, op: TypedBinOp) -> MetaRef {
        self.alloc_fresh(GateMetaData::with_defaults(
            OpCode::TypedBinaryOp,
            MetaPayload::TypedBinary(TypedBinaryInfo { operand_types, op }),
        ))
    }

    /// The same opcode as `meta` with its variable zone `width` wide.
    ///
    /// # Panics
    ///
    /// Panics if `meta` is not size-parameterized.
    #[track_caller]
    pub fn resized(&mut self, meta: MetaRef, width: u32) -> MetaRef {
        let op = self.metas[meta].opcode();
        self.sized(op, width)
    }
}

impl Default for MetaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Default counts of `op` with the variable `zone` replaced by `width`.
fn sized_shape(op: OpCode, zone: EdgeZone, width: u32) -> GateMetaData {
    let d = op.descriptor();
    let (mut state, mut depend, mut value) = (d.state, d.depend, d.value);
    match zone {
        EdgeZone::State => state = width,
        EdgeZone::Depend => depend = width,
        EdgeZone::Value => value = width,
        EdgeZone::FrameState | EdgeZone::Root => {
            unreachable!("{} cannot size its {:?} zone", op, zone)
        }
    }
    GateMetaData::new(op, state, depend, value, MetaPayload::Sized)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_is_flyweight() {
        let builder = MetaBuilder::new();
        let a = builder.fixed(OpCode::Add);
        let b = builder.fixed(OpCode::Add);
        assert_eq!(a, b);
        assert_ne!(a, builder.fixed(OpCode::Sub));
        assert_eq!(builder.get(a).opcode(), OpCode::Add);
    }

    #[test]
    #[should_panic(expected = "not a parameterless opcode")]
    fn test_fixed_rejects_sized_opcode() {
        MetaBuilder::new().fixed(OpCode::Merge);
    }

    #[test]
    fn test_sized_cache_boundary() {
        let mut builder = MetaBuilder::new();
        for width in 1..=MAX_CACHED_WIDTH {
            assert_eq!(
                builder.sized(OpCode::Merge, width),
                builder.sized(OpCode::Merge, width)
            );
        }

        let before = builder.allocated();
        let a = builder.sized(OpCode::Merge, 6);
        let b = builder.sized(OpCode::Merge, 6);
        assert_ne!(a, b);
        assert_eq!(builder.allocated(), before + 2);
        assert_eq!(builder.get(a).state_count(), 6);
    }

    #[test]
    fn test_sized_counts_follow_zone() {
        let mut builder = MetaBuilder::new();
        let selector = builder.sized(OpCode::ValueSelector, 3);
        let meta = builder.get(selector);
        assert_eq!((meta.state_count(), meta.value_count()), (1, 3));

        let call = builder.sized(OpCode::Call, 2);
        let meta = builder.get(call);
        assert_eq!((meta.depend_count(), meta.value_count()), (1, 2));

        let depend = builder.sized(OpCode::DependSelector, 4);
        assert_eq!(builder.get(depend).depend_count(), 4);
    }

    #[test]
    fn test_arg_cache_boundary() {
        let mut builder = MetaBuilder::new();
        for index in 0..=MAX_CACHED_ARG {
            assert_eq!(builder.arg(index), builder.arg(index));
        }
        assert_ne!(builder.arg(11), builder.arg(11));
        assert_eq!(builder.get(builder.args[3]).value(), 3);
    }

    #[test]
    fn test_other_parameters_are_fresh() {
        let mut builder = MetaBuilder::new();
        assert_ne!(builder.constant(1), builder.constant(1));
        assert_ne!(builder.const_string("a"), builder.const_string("a"));
        assert_ne!(
            builder.typed_binary(0, TypedBinOp::Add),
            builder.typed_binary(0, TypedBinOp::Add)
        );
    }

    #[test]
    fn test_js_bytecode_width() {
        let mut builder = MetaBuilder::new();
        let meta = builder.js_bytecode(3, 0x21, 16);
        let meta = builder.get(meta);
        assert_eq!(meta.value_count(), 3);
        assert_eq!(meta.num_ins(), 5);
        assert_eq!(meta.bytecode().pc_offset, 16);
    }

    #[test]
    fn test_resized_keeps_opcode() {
        let mut builder = MetaBuilder::new();
        let two = builder.sized(OpCode::ValueSelector, 2);
        let three = builder.resized(two, 3);
        assert_eq!(three, builder.sized(OpCode::ValueSelector, 3));
        assert_eq!(builder.get(three).num_ins(), 4);
    }
}
