//! Canonical ABI adapters for the WebAssembly Component Model.
//!
//! This library converts calls between core wasm functions, which only see
//! numeric words, and component functions, which see interface values such
//! as narrow integers and strings. `canon lift` wraps a core function as a
//! component function; `canon lower` wraps a component function as a core
//! function. Strings cross the boundary through a linear memory, allocated
//! with the component's `realloc` function.
//!
//! # Quick Start
//!
//! ```ignore
//! use wit_canon::prelude::*;
//!
//! let mut instance = ComponentInstance::new();
//! let memory = instance.add_memory(LinearMemory::with_size(1024));
//! let realloc = instance.add_core_host_function(BumpRealloc::new(memory, 8));
//!
//! // A core function `(ptr, len) -> len` and its declared component type
//! let core_func = instance.add_core_host_function(strlen);
//! let ty = instance.add_type(DefType::Func(FuncType::new(
//!     vec![LabelValType::new("s", PrimValType::String)],
//!     ResultList::Unnamed(PrimValType::U32.into()),
//! )));
//!
//! let section = CanonSection::new(vec![Canon::Lift {
//!     core_func: core_func.0,
//!     options: vec![CanonOpt::Memory(memory.0), CanonOpt::Realloc(realloc.0)],
//!     func_type: ty,
//! }]);
//! instantiate_canonical_section(&section, &mut instance)?;
//! let len = instance.invoke(FuncIdx(0), &["hello".into()])?;
//! ```
//!
//! # Modules
//!
//! - [`abi`] - Interface types, values, signatures and scalar lifting
//! - [`ast`] - Component declarations consumed by the resolver
//! - [`runtime`] - Component instance arena and invocation primitives
//! - [`canon`] - Lift/lower adapters and the canonical section resolver
//! - [`wit`] - Function types from WIT text
//! - [`wave`] - WAVE text for interface values
//!
//! # Feature Flags
//!
//! - `wasm` - Back core functions and memories with wasmtime (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `full` - Enable all features

pub mod abi;
pub mod ast;
pub mod canon;
#[cfg(feature = "cli")]
pub mod cli;
mod logging;
pub mod prelude;
pub mod runtime;
pub mod wave;
pub mod wit;

mod error;

// Re-export the unified error type
pub use error::{CanonError, IndexSpace, InvalidCanonOption, Result};

// Re-export the adapter entry points
pub use canon::{LiftAdapter, LowerAdapter, instantiate_canonical_section, lifting, lowering};

// Re-export commonly used types from dependencies for convenience
pub use wasm_wave::value::{Type as WaveType, Value};
pub use wit_parser::Resolve;
