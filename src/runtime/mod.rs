//! Component instance runtime consumed by the adapters.
//!
//! - [`instance`]: the resource arena and its typed indices
//! - [`host`]: host function traits, closure wrappers and a bump reallocator
//! - `invoke`: the core and component invocation primitives
//! - [`wasmtime_core`]: core functions and memories from a wasmtime instance (requires `wasm` feature)

pub mod host;
pub mod instance;
mod invoke;
#[cfg(feature = "wasm")]
pub mod wasmtime_core;

pub use host::{BumpRealloc, ComponentHostFunc, CoreFn, CoreHostFunc, HostFn};
pub use instance::{
    Checkpoint, ComponentFunc, ComponentInstance, CoreFunc, CoreFuncIdx, FuncIdx, MemoryIdx,
};
#[cfg(feature = "wasm")]
pub use wasmtime_core::{CoreExports, CoreModule, WasmtimeFunc, WasmtimeMemory};
