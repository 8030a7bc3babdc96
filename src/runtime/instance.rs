//! Component instance: the arena that owns functions, memories and types.
//!
//! Adapters never hold references into the instance. They hold typed
//! indices and receive the instance at call time, so an adapter cannot
//! outlive the resources it names.

use std::fmt;
use std::sync::Arc;

use crate::abi::{CoreFuncType, FunctionType, Memory};
use crate::ast::DefType;
use crate::canon::{LiftAdapter, LowerAdapter};
use crate::error::{CanonError, IndexSpace, Result};

use super::host::{ComponentHostFunc, CoreHostFunc};

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(idx: u32) -> Self {
                Self(idx)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_type!(
    /// Index into the core function index space.
    CoreFuncIdx
);
index_type!(
    /// Index into the core memory index space.
    MemoryIdx
);
index_type!(
    /// Index into the component function index space.
    FuncIdx
);

/// A core-level function: a host function or a lowered component function.
#[derive(Clone)]
pub enum CoreFunc {
    Host(Arc<dyn CoreHostFunc>),
    Lowered(Arc<LowerAdapter>),
}

impl CoreFunc {
    pub fn host(func: impl CoreHostFunc + 'static) -> Self {
        Self::Host(Arc::new(func))
    }

    pub fn func_type(&self) -> &CoreFuncType {
        match self {
            Self::Host(func) => func.func_type(),
            Self::Lowered(adapter) => adapter.core_type(),
        }
    }
}

impl fmt::Debug for CoreFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(func) => write!(f, "CoreFunc::Host({})", func.func_type()),
            Self::Lowered(adapter) => write!(f, "CoreFunc::Lowered({})", adapter.core_type()),
        }
    }
}

/// A component-level function: a host function or a lifted core function.
#[derive(Clone)]
pub enum ComponentFunc {
    Host(Arc<dyn ComponentHostFunc>),
    Lifted(Arc<LiftAdapter>),
}

impl ComponentFunc {
    pub fn host(func: impl ComponentHostFunc + 'static) -> Self {
        Self::Host(Arc::new(func))
    }

    pub fn func_type(&self) -> &FunctionType {
        match self {
            Self::Host(func) => func.func_type(),
            Self::Lifted(adapter) => adapter.func_type(),
        }
    }
}

impl fmt::Debug for ComponentFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(func) => write!(f, "ComponentFunc::Host({})", func.func_type()),
            Self::Lifted(adapter) => write!(f, "ComponentFunc::Lifted({})", adapter.func_type()),
        }
    }
}

/// Sizes of the function index spaces at some point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    core_funcs: usize,
    funcs: usize,
}

/// Resources of one component instance.
#[derive(Default)]
pub struct ComponentInstance {
    types: Vec<DefType>,
    core_funcs: Vec<CoreFunc>,
    memories: Vec<Box<dyn Memory>>,
    funcs: Vec<ComponentFunc>,
}

impl ComponentInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a type definition and return its index.
    pub fn add_type(&mut self, ty: DefType) -> u32 {
        self.types.push(ty);
        (self.types.len() - 1) as u32
    }

    pub fn types(&self) -> &[DefType] {
        &self.types
    }

    pub fn get_type(&self, idx: u32) -> Result<&DefType> {
        self.types
            .get(idx as usize)
            .ok_or(CanonError::UnknownIndex {
                space: IndexSpace::Type,
                index: idx,
            })
    }

    pub fn add_core_function(&mut self, func: CoreFunc) -> CoreFuncIdx {
        self.core_funcs.push(func);
        CoreFuncIdx((self.core_funcs.len() - 1) as u32)
    }

    pub fn add_core_host_function(&mut self, func: impl CoreHostFunc + 'static) -> CoreFuncIdx {
        self.add_core_function(CoreFunc::host(func))
    }

    pub fn core_function(&self, idx: CoreFuncIdx) -> Result<&CoreFunc> {
        self.core_funcs
            .get(idx.0 as usize)
            .ok_or(CanonError::UnknownIndex {
                space: IndexSpace::CoreFunc,
                index: idx.0,
            })
    }

    pub fn core_function_count(&self) -> usize {
        self.core_funcs.len()
    }

    pub fn add_memory(&mut self, memory: impl Memory + 'static) -> MemoryIdx {
        self.memories.push(Box::new(memory));
        MemoryIdx((self.memories.len() - 1) as u32)
    }

    pub fn memory(&self, idx: MemoryIdx) -> Result<&dyn Memory> {
        self.memories
            .get(idx.0 as usize)
            .map(|memory| &**memory)
            .ok_or(CanonError::UnknownIndex {
                space: IndexSpace::CoreMemory,
                index: idx.0,
            })
    }

    pub fn memory_mut(&mut self, idx: MemoryIdx) -> Result<&mut dyn Memory> {
        match self.memories.get_mut(idx.0 as usize) {
            Some(memory) => {
                let memory: &mut dyn Memory = &mut **memory;
                Ok(memory)
            }
            None => Err(CanonError::UnknownIndex {
                space: IndexSpace::CoreMemory,
                index: idx.0,
            }),
        }
    }

    pub fn add_function(&mut self, func: ComponentFunc) -> FuncIdx {
        self.funcs.push(func);
        FuncIdx((self.funcs.len() - 1) as u32)
    }

    pub fn add_host_function(&mut self, func: impl ComponentHostFunc + 'static) -> FuncIdx {
        self.add_function(ComponentFunc::host(func))
    }

    pub fn function(&self, idx: FuncIdx) -> Result<&ComponentFunc> {
        self.funcs
            .get(idx.0 as usize)
            .ok_or(CanonError::UnknownIndex {
                space: IndexSpace::Func,
                index: idx.0,
            })
    }

    pub fn function_count(&self) -> usize {
        self.funcs.len()
    }

    /// Record the current sizes of the function index spaces.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            core_funcs: self.core_funcs.len(),
            funcs: self.funcs.len(),
        }
    }

    /// Drop every function registered after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.core_funcs.truncate(checkpoint.core_funcs);
        self.funcs.truncate(checkpoint.funcs);
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("types", &self.types)
            .field("core_funcs", &self.core_funcs)
            .field("memories", &self.memories.len())
            .field("funcs", &self.funcs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::LinearMemory;
    use crate::runtime::host::CoreFn;

    #[test]
    fn lookups_fail_outside_index_space() {
        let inst = ComponentInstance::new();
        assert!(matches!(
            inst.memory(MemoryIdx(0)),
            Err(CanonError::UnknownIndex {
                space: IndexSpace::CoreMemory,
                index: 0
            })
        ));
        assert!(inst.core_function(CoreFuncIdx(3)).is_err());
        assert!(inst.function(FuncIdx(0)).is_err());
        assert!(inst.get_type(1).is_err());
    }

    #[test]
    fn rollback_truncates_functions() {
        let mut inst = ComponentInstance::new();
        let ty = CoreFuncType::new(vec![], vec![]);
        inst.add_core_host_function(CoreFn::new(ty.clone(), |_, _| Ok(vec![])));
        let cp = inst.checkpoint();
        inst.add_core_host_function(CoreFn::new(ty, |_, _| Ok(vec![])));
        inst.add_memory(LinearMemory::with_size(8));
        assert_eq!(inst.core_function_count(), 2);
        inst.rollback(cp);
        assert_eq!(inst.core_function_count(), 1);
        assert!(inst.memory(MemoryIdx(0)).is_ok());
    }
}
