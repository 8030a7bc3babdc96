//! Core functions and memories backed by a wasmtime core instance.
//!
//! A [`CoreModule`] compiles and instantiates a core wasm module (binary or
//! WAT text) that has no imports. Its function and memory exports can then
//! be added to a [`ComponentInstance`] and used as the targets of `lift`,
//! `memory` and `realloc`.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use wasmtime::{Engine, Extern, Func, Instance, Module, Store, V128, Val, ValType};

use crate::abi::{CoreFuncType, CoreType, CoreValue, Memory};
use crate::error::{CanonError, Result};
use crate::logging::debug;
use crate::runtime::host::CoreHostFunc;
use crate::runtime::instance::{ComponentInstance, CoreFuncIdx, MemoryIdx};

const WASM_PAGE_SIZE: usize = 65536;

type SharedStore = Arc<Mutex<Store<()>>>;

fn lock(store: &SharedStore) -> MutexGuard<'_, Store<()>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An instantiated core module.
pub struct CoreModule {
    store: SharedStore,
    instance: Instance,
}

impl CoreModule {
    /// Compile and instantiate a module from binary or WAT bytes.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, bytes).map_err(CanonError::trap)?;
        Self::instantiate(&engine, &module)
    }

    /// Compile and instantiate a module from a `.wasm` or `.wat` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::from_file(&engine, path).map_err(CanonError::trap)?;
        Self::instantiate(&engine, &module)
    }

    fn instantiate(engine: &Engine, module: &Module) -> Result<Self> {
        let mut store = Store::new(engine, ());
        let instance = Instance::new(&mut store, module, &[]).map_err(CanonError::trap)?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            instance,
        })
    }

    /// Look up an exported function.
    pub fn func(&self, name: &str) -> Result<WasmtimeFunc> {
        let func = {
            let mut store = lock(&self.store);
            self.instance.get_func(&mut *store, name)
        };
        let func = func.ok_or_else(|| CanonError::MissingExport(name.to_string()))?;
        WasmtimeFunc::new(self.store.clone(), func)
    }

    /// Look up an exported memory.
    pub fn memory(&self, name: &str) -> Result<WasmtimeMemory> {
        let memory = {
            let mut store = lock(&self.store);
            self.instance.get_memory(&mut *store, name)
        };
        let memory = memory.ok_or_else(|| CanonError::MissingExport(name.to_string()))?;
        Ok(WasmtimeMemory {
            store: self.store.clone(),
            memory,
        })
    }

    /// Add every function and memory export to `instance`, in export order.
    pub fn export_into(&self, instance: &mut ComponentInstance) -> Result<CoreExports> {
        let externs: Vec<(String, Extern)> = {
            let mut store = lock(&self.store);
            self.instance
                .exports(&mut *store)
                .map(|export| (export.name().to_string(), export.into_extern()))
                .collect()
        };

        let mut exports = CoreExports::default();
        for (name, item) in externs {
            match item {
                Extern::Func(func) => {
                    let func = WasmtimeFunc::new(self.store.clone(), func)?;
                    debug!(export = %name, ty = %func.func_type(), "core function export");
                    let idx = instance.add_core_host_function(func);
                    exports.funcs.push((name, idx));
                }
                Extern::Memory(memory) => {
                    let idx = instance.add_memory(WasmtimeMemory {
                        store: self.store.clone(),
                        memory,
                    });
                    exports.memories.push((name, idx));
                }
                _ => {}
            }
        }
        Ok(exports)
    }
}

/// Indices assigned to a module's exports by [`CoreModule::export_into`].
#[derive(Debug, Clone, Default)]
pub struct CoreExports {
    pub funcs: Vec<(String, CoreFuncIdx)>,
    pub memories: Vec<(String, MemoryIdx)>,
}

impl CoreExports {
    pub fn func(&self, name: &str) -> Option<CoreFuncIdx> {
        self.funcs
            .iter()
            .find(|(export, _)| export == name)
            .map(|(_, idx)| *idx)
    }

    pub fn memory(&self, name: &str) -> Option<MemoryIdx> {
        self.memories
            .iter()
            .find(|(export, _)| export == name)
            .map(|(_, idx)| *idx)
    }
}

/// A wasmtime function exposed as a core host function.
pub struct WasmtimeFunc {
    store: SharedStore,
    func: Func,
    ty: CoreFuncType,
}

impl WasmtimeFunc {
    fn new(store: SharedStore, func: Func) -> Result<Self> {
        let ty = {
            let store = lock(&store);
            let ty = func.ty(&*store);
            let params = ty.params().map(|t| core_type(&t)).collect();
            let results = ty.results().map(|t| core_type(&t)).collect();
            CoreFuncType::new(params, results)
        };
        Ok(Self { store, func, ty })
    }
}

impl CoreHostFunc for WasmtimeFunc {
    fn func_type(&self) -> &CoreFuncType {
        &self.ty
    }

    fn call(&self, _instance: &mut ComponentInstance, args: &[CoreValue]) -> Result<Vec<CoreValue>> {
        let params: Vec<Val> = args.iter().map(to_val).collect();
        let mut results: Vec<Val> = self
            .ty
            .results()
            .iter()
            .map(|ty| zero_val(*ty))
            .collect::<Result<_>>()?;

        let mut store = lock(&self.store);
        self.func
            .call(&mut *store, &params, &mut results)
            .map_err(CanonError::trap)?;
        results.iter().map(from_val).collect()
    }
}

/// A wasmtime memory exposed through the [`Memory`] accessor.
pub struct WasmtimeMemory {
    store: SharedStore,
    memory: wasmtime::Memory,
}

impl Memory for WasmtimeMemory {
    fn set_bytes(&mut self, bytes: &[u8], offset: u32) -> Result<()> {
        let mut store = lock(&self.store);
        let memory_size = self.memory.data_size(&*store);
        self.memory
            .write(&mut *store, offset as usize, bytes)
            .map_err(|_| CanonError::InvalidMemoryPointer {
                ptr: offset,
                len: bytes.len() as u32,
                memory_size,
            })
    }

    fn get_bytes(&self, offset: u32, len: u32) -> Result<Vec<u8>> {
        let store = lock(&self.store);
        let mut buffer = vec![0; len as usize];
        self.memory
            .read(&*store, offset as usize, &mut buffer)
            .map_err(|_| CanonError::InvalidMemoryPointer {
                ptr: offset,
                len,
                memory_size: self.memory.data_size(&*store),
            })?;
        Ok(buffer)
    }

    fn size(&self) -> usize {
        let store = lock(&self.store);
        self.memory.data_size(&*store)
    }

    fn grow(&mut self, delta: usize) -> Result<()> {
        let pages = delta.div_ceil(WASM_PAGE_SIZE) as u64;
        let mut store = lock(&self.store);
        self.memory
            .grow(&mut *store, pages)
            .map(|_| ())
            .map_err(CanonError::trap)
    }
}

fn core_type(ty: &ValType) -> CoreType {
    match ty {
        ValType::I32 => CoreType::I32,
        ValType::I64 => CoreType::I64,
        ValType::F32 => CoreType::F32,
        ValType::F64 => CoreType::F64,
        ValType::V128 => CoreType::V128,
        other if other.is_externref() => CoreType::ExternRef,
        _ => CoreType::FuncRef,
    }
}

fn to_val(word: &CoreValue) -> Val {
    match *word {
        CoreValue::I32(v) => Val::I32(v),
        CoreValue::I64(v) => Val::I64(v),
        CoreValue::F32(v) => Val::F32(v.to_bits()),
        CoreValue::F64(v) => Val::F64(v.to_bits()),
        CoreValue::V128(v) => Val::V128(V128::from(v)),
    }
}

fn from_val(val: &Val) -> Result<CoreValue> {
    match val {
        Val::I32(v) => Ok(CoreValue::I32(*v)),
        Val::I64(v) => Ok(CoreValue::I64(*v)),
        Val::F32(bits) => Ok(CoreValue::F32(f32::from_bits(*bits))),
        Val::F64(bits) => Ok(CoreValue::F64(f64::from_bits(*bits))),
        Val::V128(v) => Ok(CoreValue::V128(v.as_u128())),
        _ => Err(CanonError::unsupported("reference values cannot cross the adapter")),
    }
}

fn zero_val(ty: CoreType) -> Result<Val> {
    match ty {
        CoreType::I32 => Ok(Val::I32(0)),
        CoreType::I64 => Ok(Val::I64(0)),
        CoreType::F32 => Ok(Val::F32(0)),
        CoreType::F64 => Ok(Val::F64(0)),
        CoreType::V128 => Ok(Val::V128(V128::from(0u128))),
        other => Err(CanonError::unsupported(format!(
            "core functions returning {other} cannot be called"
        ))),
    }
}
