//! Sea-of-nodes circuit IR for an optimizing compiler.
//!
//! Every instruction is a gate; every dependency is an edge in one of five
//! zones (state, depend, value, frame state, root). The crate provides:
//! - Interned gate metadata shared across structurally identical gates
//! - Arena-backed gates with O(1) edge insertion and removal
//! - Typed builders for common shapes
//! - A structural verifier with collect-or-abort reporting
#![deny(unsafe_op_in_unsafe_fn)]
pub mod config;
pub mod error;
pub mod ir;
pub mod verifier;

pub use config::{FailurePolicy, VerifierConfig};
pub use error::{ConfigError, IntegrityError};
pub use ir::{Circuit, GateId, MachineType, OpCode};
pub use verifier::{verify_circuit, verify_gate, VerifyError, VerifyReport};
