//! Circuit intermediate representation.
//!
//! # Core Components
//!
//! - **Arena** (`arena.rs`): typed handles into append-only storage
//! - **Types** (`types.rs`): machine types and front-end type tags
//! - **Opcodes** (`opcode.rs`): the opcode table, flags and traits
//! - **Metadata** (`meta.rs`, `meta_builder.rs`): interned gate shapes
//! - **Gate** (`gate.rs`): edge slots, consumer links and marks
//! - **Circuit** (`circuit.rs`): the graph and every edge mutation
//! - **Dump** (`dump.rs`): one-line gate rendering
//! - **Builder** (`builder/`): typed constructors
//!
//! # Design Principles
//!
//! - **Handles, not pointers**: edges are `(gate, slot)` pairs, so growing a
//!   gate never invalidates its neighbours
//! - **Shared shapes**: gates point at interned metadata
//! - **Zones from metadata**: a gate stores no per-zone bookkeeping

pub mod arena;
pub mod builder;
pub mod circuit;
pub mod dump;
pub mod gate;
pub mod meta;
pub mod meta_builder;
pub mod opcode;
pub mod types;

// Re-export commonly used types
pub use arena::{Arena, Id};
pub use builder::{ArithmeticBuilder, CircuitBuilder, ControlBuilder, MemoryBuilder};
pub use circuit::{Circuit, Use, Uses};
pub use dump::GateDump;
pub use gate::{Gate, GateId, In, MarkCode, Out, TimeStamp, UseRef};
pub use meta::{BytecodeInfo, GateMetaData, MetaKind, MetaPayload, MetaRef, TypedBinaryInfo};
pub use meta_builder::MetaBuilder;
pub use opcode::{
    EdgeZone, FCmpCondition, GateFlags, ICmpCondition, OpCode, OpTraits, ShapeKind, TypedBinOp,
};
pub use types::{GateType, MachineType};
