//! Crate error types.

use thiserror::Error;

use crate::ir::gate::GateId;

/// A break in the pairing between `In` slots and consumer lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("gate {gate} input {index}: producer {producer} does not list this edge")]
    MissingUse {
        gate: GateId,
        index: usize,
        producer: GateId,
    },

    #[error("gate {producer}: consumer entry ({gate}, {index}) is not backed by an input")]
    DanglingUse {
        producer: GateId,
        gate: GateId,
        index: usize,
    },

    #[error("gate {producer}: consumer entry ({gate}, {index}) is listed twice")]
    DuplicateUse {
        producer: GateId,
        gate: GateId,
        index: usize,
    },

    #[error("gate {producer}: consumer list link at ({gate}, {index}) is inconsistent")]
    BrokenLink {
        producer: GateId,
        gate: GateId,
        index: usize,
    },

    #[error("gate {gate} input {index}: producer {producer} is deleted")]
    DeletedProducer {
        gate: GateId,
        index: usize,
        producer: GateId,
    },
}

impl IntegrityError {
    /// The gate and input slot the error is reported against.
    pub fn location(&self) -> (GateId, usize) {
        match *self {
            IntegrityError::MissingUse { gate, index, .. }
            | IntegrityError::DanglingUse { gate, index, .. }
            | IntegrityError::DuplicateUse { gate, index, .. }
            | IntegrityError::BrokenLink { gate, index, .. }
            | IntegrityError::DeletedProducer { gate, index, .. } => (gate, index),
        }
    }
}

/// Invalid verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Result type for configuration loading.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
