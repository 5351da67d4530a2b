// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types

use thiserror::Error;

/// Top-level error type for Tessera.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures reported by a geometry kernel backend.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The handle was never issued or has already been released.
    #[error("unknown native handle {0}")]
    InvalidHandle(u64),

    /// The backend does not implement the requested mode.
    #[error("unsupported kernel operation: {0}")]
    Unsupported(&'static str),

    /// Delaunay insertion failed (non-finite or out-of-range seed).
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

/// Invalid option or settings value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} = {value} is invalid: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::from(KernelError::InvalidHandle(7));
        assert_eq!(err.to_string(), "unknown native handle 7");

        let err = Error::from(ConfigError::invalid("wall", -1.0, "must be positive"));
        assert!(err.to_string().contains("wall = -1"));
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
