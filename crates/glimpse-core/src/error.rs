//! Error types for the pool engine.
//!
//! These cover caller protocol violations and engine faults. Per-environment
//! computation errors are *not* represented here: they travel in-band inside
//! [`Reply::data`](crate::messages::Reply) so one environment's failure never
//! breaks batch alignment for the others.

use std::fmt;

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors surfaced directly by pool calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Invalid construction parameters (zero environments, etc.).
    InvalidConfig {
        param: String,
        message: String,
    },
    /// An environment instance could not be built for a slot.
    Build {
        slot: usize,
        message: String,
    },
    /// Action batch length does not match the number of slots.
    BatchSizeMismatch {
        expected: usize,
        actual: usize,
    },
    /// Operation on a pool that has already been shut down.
    Closed,
    /// Deadline expired while waiting on a slot's result.
    RecvTimeout {
        slot: usize,
    },
    /// Engine invariant violated: a worker thread died, panicked, or failed
    /// to join. Distinct from ordinary environment computation errors.
    Worker {
        slot: usize,
        message: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { param, message } => {
                write!(f, "Invalid configuration for '{}': {}", param, message)
            }
            Self::Build { slot, message } => {
                write!(f, "Failed to build environment for slot {}: {}", slot, message)
            }
            Self::BatchSizeMismatch { expected, actual } => {
                write!(f, "Action batch length mismatch: expected {}, got {}", expected, actual)
            }
            Self::Closed => write!(f, "Pool has been shut down"),
            Self::RecvTimeout { slot } => {
                write!(f, "Timed out waiting for a result from slot {}", slot)
            }
            Self::Worker { slot, message } => {
                write!(f, "Worker for slot {} failed: {}", slot, message)
            }
        }
    }
}

impl std::error::Error for PoolError {}
