//! Error types.

use std::io;

use fusefs_types::Value;
use thiserror::Error;

use crate::errno::{decode_error, errno_of, UNKNOWN_ERRNO};

/// Error raised by interceptors, capability methods and the mount front-end.
///
/// Inside the pipeline every variant is folded into a numeric errno via
/// [`FuseError::errno`]; nothing is thrown across the pipeline boundary.
#[derive(Debug, Error)]
pub enum FuseError {
    /// Raw errno value, passed through unchanged.
    #[error("errno {0}")]
    Errno(i64),

    /// Symbolic errno name such as `ENOENT`.
    #[error("{0}")]
    Code(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arbitrary value raised by a provider or interceptor.
    #[error("raised {0}")]
    Thrown(Value),

    /// Arguments did not have the shape an adapter expects.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Mount configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A callback-style provider dropped its completion without calling it.
    #[error("completion dropped before it was invoked")]
    Abandoned,

    /// Unmount requested with nothing mounted.
    #[error("not mounted")]
    NotMounted,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl FuseError {
    /// Create a Code error.
    pub fn code(name: impl Into<String>) -> Self {
        Self::Code(name.into())
    }

    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Numeric errno for the host.
    pub fn errno(&self) -> i64 {
        match self {
            FuseError::Errno(n) => *n,
            FuseError::Code(name) => errno_of(name),
            FuseError::Io(e) => e.raw_os_error().map(|n| -i64::from(n)).unwrap_or(UNKNOWN_ERRNO),
            FuseError::Thrown(value) => decode_error(value),
            FuseError::InvalidArgument(_) => -i64::from(libc::EINVAL),
            FuseError::Abandoned => -i64::from(libc::EIO),
            FuseError::Config(_) | FuseError::NotMounted | FuseError::Other(_) => UNKNOWN_ERRNO,
        }
    }
}

impl From<Value> for FuseError {
    fn from(value: Value) -> Self {
        Self::Thrown(value)
    }
}

/// Result type for fusefs operations.
pub type FuseResult<T> = Result<T, FuseError>;
