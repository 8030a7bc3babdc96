//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use wit_canon::prelude::*;
//!
//! let mut instance = ComponentInstance::new();
//! let memory = instance.add_memory(LinearMemory::with_size(64));
//! ```

// Unified error handling
pub use crate::error::{CanonError, InvalidCanonOption, Result};

// Values and signatures
pub use crate::abi::{
    CoreFuncType, CoreType, CoreValue, FunctionType, InterfaceType, InterfaceValue, LinearMemory,
    Memory,
};

// Component declarations
pub use crate::ast::{
    Canon, CanonOpt, CanonSection, DefType, FuncType, LabelValType, PrimValType, ResultList,
    ValueType,
};

// Instance and adapters
pub use crate::canon::{LiftAdapter, LowerAdapter, instantiate_canonical_section, lifting, lowering};
pub use crate::runtime::{
    BumpRealloc, ComponentInstance, CoreFn, CoreFuncIdx, FuncIdx, HostFn, MemoryIdx,
};

// Wasmtime-backed core modules (requires "wasm" feature)
#[cfg(feature = "wasm")]
pub use crate::runtime::CoreModule;

// Front-ends
pub use crate::wave::{parse_value, to_wave};
pub use crate::wit::load_wit_function;
