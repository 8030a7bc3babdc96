//! Canonical ABI value model.
//!
//! This module holds the pieces the adapters are built from: type
//! descriptors, values, scalar lifting, signatures and memory access.
//!
//! # Module Organization
//!
//! - [`types`]: Interface type descriptors and core type codes
//! - [`value`]: Core words and interface values
//! - [`lift`]: Scalar lifting of core words
//! - [`signature`]: Component and core function signatures
//! - [`memory`]: Linear memory accessor and in-process memory
//! - `buffer`: Bounds-checked byte range helpers

mod buffer;
pub mod lift;
pub mod memory;
pub mod signature;
pub mod types;
pub mod value;

pub(crate) use buffer::align_to;
pub use lift::{lift_core_value, lift_value};
pub use memory::{LinearMemory, Memory};
pub use signature::{CoreFuncType, FunctionType};
pub use types::{CoreType, ITypeCode, InterfaceType};
pub use value::{CoreValue, FromInterfaceValue, InterfaceValue};
