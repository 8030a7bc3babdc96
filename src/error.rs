//! Unified error type for canonical ABI adapters.
//!
//! Every failure the resolver, the adapters, or the invocation primitives can
//! produce is a [`CanonError`]. Failures returned by a wrapped core or
//! component function are handed back to the adapter's caller unchanged.

use std::fmt;

use thiserror::Error;

use crate::ast::{ResourceOp, StringEncoding};

/// Errors that can occur while resolving or invoking canonical functions.
#[derive(Error, Debug)]
pub enum CanonError {
    /// A canonical declaration carries an option or operation that cannot be honoured.
    #[error("Invalid canonical option: {0}")]
    InvalidCanonOption(#[from] InvalidCanonOption),

    /// A value or type has no representation on the requested side of the boundary.
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Arity mismatch: expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// An index does not resolve inside the component instance.
    #[error("Unknown {space} index {index}")]
    UnknownIndex { space: IndexSpace, index: u32 },

    #[error("Invalid memory pointer: {ptr} with length {len} exceeds memory size {memory_size}")]
    InvalidMemoryPointer {
        ptr: u32,
        len: u32,
        memory_size: usize,
    },

    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    /// A core module does not export the requested item.
    #[error("Export not found in module: {0}")]
    MissingExport(String),

    /// Failure raised by a wrapped host or wasm function.
    #[error("Trap: {0}")]
    Trap(String),

    #[error("WAVE error: {0}")]
    Wave(String),

    #[error("WIT error: {0}")]
    Wit(#[from] anyhow::Error),
}

/// A [`Result`] type alias using [`CanonError`].
pub type Result<T> = std::result::Result<T, CanonError>;

impl CanonError {
    /// Create a trap from any displayable failure.
    pub fn trap(msg: impl fmt::Display) -> Self {
        Self::Trap(msg.to_string())
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedConversion(what.into())
    }

    pub fn type_mismatch(expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Returns `true` if this is an [`InvalidCanonOption`] error.
    pub fn is_invalid_option(&self) -> bool {
        matches!(self, Self::InvalidCanonOption(_))
    }

    /// Returns `true` if this is an unsupported conversion.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedConversion(_))
    }

    /// Returns `true` if this failure came from a wrapped function.
    pub fn is_trap(&self) -> bool {
        matches!(self, Self::Trap(_))
    }
}

/// The reason a canonical declaration was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCanonOption {
    #[error("string-encoding={0} is not supported")]
    StringEncoding(StringEncoding),

    #[error("post-return (function {0}) is not supported")]
    PostReturn(u32),

    #[error("{0} is not supported")]
    Resource(ResourceOp),

    #[error("type {0} is not a function type")]
    NotAFunction(u32),

    #[error("option `{0}` is declared more than once")]
    Duplicate(&'static str),

    #[error("option `{0}` is required to transfer strings")]
    Missing(&'static str),

    #[error("realloc function must have type [i32 i32 i32 i32] -> [i32], got {0}")]
    ReallocSignature(String),
}

/// Index spaces of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpace {
    CoreFunc,
    CoreMemory,
    Func,
    Type,
}

impl fmt::Display for IndexSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CoreFunc => "core function",
            Self::CoreMemory => "core memory",
            Self::Func => "function",
            Self::Type => "type",
        };
        f.write_str(name)
    }
}
