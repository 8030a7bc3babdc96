//! Host-provided functions.
//!
//! Host functions receive the owning [`ComponentInstance`] at call time so
//! they can reach memories and call other functions by index.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::abi::{CoreFuncType, CoreValue, FunctionType, InterfaceValue, align_to};
use crate::error::{CanonError, Result};
use crate::logging::trace;

use super::instance::{ComponentInstance, MemoryIdx};

/// A core function implemented by the host.
pub trait CoreHostFunc: Send + Sync {
    fn func_type(&self) -> &CoreFuncType;

    fn call(&self, instance: &mut ComponentInstance, args: &[CoreValue]) -> Result<Vec<CoreValue>>;
}

/// A component function implemented by the host.
pub trait ComponentHostFunc: Send + Sync {
    fn func_type(&self) -> &FunctionType;

    fn call(
        &self,
        instance: &mut ComponentInstance,
        args: &[InterfaceValue],
    ) -> Result<Vec<InterfaceValue>>;
}

/// A [`CoreHostFunc`] backed by a closure.
pub struct CoreFn<F> {
    ty: CoreFuncType,
    func: F,
}

impl<F> CoreFn<F>
where
    F: Fn(&mut ComponentInstance, &[CoreValue]) -> Result<Vec<CoreValue>> + Send + Sync,
{
    pub fn new(ty: CoreFuncType, func: F) -> Self {
        Self { ty, func }
    }
}

impl<F> CoreHostFunc for CoreFn<F>
where
    F: Fn(&mut ComponentInstance, &[CoreValue]) -> Result<Vec<CoreValue>> + Send + Sync,
{
    fn func_type(&self) -> &CoreFuncType {
        &self.ty
    }

    fn call(&self, instance: &mut ComponentInstance, args: &[CoreValue]) -> Result<Vec<CoreValue>> {
        (self.func)(instance, args)
    }
}

/// A [`ComponentHostFunc`] backed by a closure.
pub struct HostFn<F> {
    ty: FunctionType,
    func: F,
}

impl<F> HostFn<F>
where
    F: Fn(&mut ComponentInstance, &[InterfaceValue]) -> Result<Vec<InterfaceValue>> + Send + Sync,
{
    pub fn new(ty: FunctionType, func: F) -> Self {
        Self { ty, func }
    }
}

impl<F> ComponentHostFunc for HostFn<F>
where
    F: Fn(&mut ComponentInstance, &[InterfaceValue]) -> Result<Vec<InterfaceValue>> + Send + Sync,
{
    fn func_type(&self) -> &FunctionType {
        &self.ty
    }

    fn call(
        &self,
        instance: &mut ComponentInstance,
        args: &[InterfaceValue],
    ) -> Result<Vec<InterfaceValue>> {
        (self.func)(instance, args)
    }
}

/// Bump reallocator over one memory of the instance.
///
/// Implements `(old_ptr, old_size, align, new_size) -> new_ptr`. Every call
/// hands out fresh space past the previous allocation, growing the memory
/// when needed, and copies the old contents when `old_ptr` is non-zero.
/// Nothing is ever freed.
pub struct BumpRealloc {
    ty: CoreFuncType,
    memory: MemoryIdx,
    next: AtomicU32,
}

impl BumpRealloc {
    /// Allocate from `memory` starting at byte offset `start`.
    pub fn new(memory: MemoryIdx, start: u32) -> Self {
        Self {
            ty: CoreFuncType::realloc(),
            memory,
            next: AtomicU32::new(start),
        }
    }

    /// Offset the next allocation will start from, before alignment.
    pub fn watermark(&self) -> u32 {
        self.next.load(Ordering::SeqCst)
    }
}

impl CoreHostFunc for BumpRealloc {
    fn func_type(&self) -> &CoreFuncType {
        &self.ty
    }

    fn call(&self, instance: &mut ComponentInstance, args: &[CoreValue]) -> Result<Vec<CoreValue>> {
        let [old_ptr, old_size, align, new_size] = args else {
            return Err(CanonError::ArityMismatch {
                expected: 4,
                got: args.len(),
            });
        };
        let (old_ptr, old_size) = (old_ptr.as_u32(), old_size.as_u32());
        let new_size = new_size.as_u32();

        let ptr = align_to(self.watermark() as usize, align.as_u32() as usize);
        let end = ptr + new_size as usize;
        let ptr = u32::try_from(ptr).map_err(|_| CanonError::trap("realloc: out of memory"))?;
        let end = u32::try_from(end).map_err(|_| CanonError::trap("realloc: out of memory"))?;

        let memory = instance.memory_mut(self.memory)?;
        let size = memory.size();
        if end as usize > size {
            memory.grow(end as usize - size)?;
        }
        if old_ptr != 0 {
            let keep = old_size.min(new_size);
            let bytes = memory.get_bytes(old_ptr, keep)?;
            memory.set_bytes(&bytes, ptr)?;
        }
        self.next.store(end, Ordering::SeqCst);

        trace!(ptr, size = new_size, "realloc");
        Ok(vec![CoreValue::from(ptr)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{LinearMemory, Memory};

    fn realloc_args(old_ptr: u32, old_size: u32, align: u32, new_size: u32) -> Vec<CoreValue> {
        [old_ptr, old_size, align, new_size]
            .into_iter()
            .map(CoreValue::from)
            .collect()
    }

    #[test]
    fn bump_allocations_do_not_overlap() {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::with_size(16));
        let realloc = BumpRealloc::new(mem, 8);

        let a = realloc.call(&mut inst, &realloc_args(0, 0, 0, 5)).unwrap();
        let b = realloc.call(&mut inst, &realloc_args(0, 0, 4, 3)).unwrap();
        assert_eq!(a, vec![CoreValue::I32(8)]);
        assert_eq!(b, vec![CoreValue::I32(16)]);
        assert_eq!(inst.memory(mem).unwrap().size(), 19);
    }

    #[test]
    fn zero_sized_allocation_still_returns_pointer() {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::with_size(4));
        let realloc = BumpRealloc::new(mem, 4);
        let p = realloc.call(&mut inst, &realloc_args(0, 0, 0, 0)).unwrap();
        assert_eq!(p, vec![CoreValue::I32(4)]);
        assert_eq!(inst.memory(mem).unwrap().size(), 4);
    }

    #[test]
    fn reallocation_copies_old_contents() {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::with_size(8));
        inst.memory_mut(mem).unwrap().set_bytes(b"abc", 1).unwrap();
        let realloc = BumpRealloc::new(mem, 8);
        let p = realloc.call(&mut inst, &realloc_args(1, 3, 1, 6)).unwrap();
        assert_eq!(p, vec![CoreValue::I32(8)]);
        assert_eq!(inst.memory(mem).unwrap().get_bytes(8, 3).unwrap(), b"abc");
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::new());
        let realloc = BumpRealloc::new(mem, 0);
        assert!(matches!(
            realloc.call(&mut inst, &[CoreValue::I32(0)]),
            Err(CanonError::ArityMismatch { expected: 4, got: 1 })
        ));
    }
}
