//! Lower adapter: a component function made callable with core words.

use crate::abi::{CoreFuncType, CoreValue, FunctionType, InterfaceType, InterfaceValue, lift_value};
use crate::error::{CanonError, InvalidCanonOption, Result};
use crate::logging::{info, trace, warn};
use crate::runtime::{ComponentInstance, CoreFuncIdx, FuncIdx, MemoryIdx};

use super::strings::{load_string, next_word, required, store_string};

/// A component function wrapped as a core function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerAdapter {
    func_type: FunctionType,
    core_type: CoreFuncType,
    func: FuncIdx,
    memory: Option<MemoryIdx>,
    realloc: Option<CoreFuncIdx>,
}

impl LowerAdapter {
    /// Build an adapter for component function `func` of type `func_type`.
    ///
    /// String parameters need a memory to read from; string results also
    /// need a realloc to allocate with.
    pub fn new(
        func_type: FunctionType,
        func: FuncIdx,
        memory: Option<MemoryIdx>,
        realloc: Option<CoreFuncIdx>,
    ) -> Result<Self> {
        let core_type = func_type.to_core()?;
        if func_type.transfers_strings() && memory.is_none() {
            warn!(signature = %func_type, "strings cross the boundary without a memory");
            return Err(InvalidCanonOption::Missing("memory").into());
        }
        if func_type.results().iter().any(InterfaceType::is_string) && realloc.is_none() {
            warn!(signature = %func_type, "string results need a realloc");
            return Err(InvalidCanonOption::Missing("realloc").into());
        }
        info!(signature = %func_type, core = %core_type, "lowered");
        Ok(Self {
            func_type,
            core_type,
            func,
            memory,
            realloc,
        })
    }

    pub fn func_type(&self) -> &FunctionType {
        &self.func_type
    }

    /// The core signature callers of this adapter use.
    pub fn core_type(&self) -> &CoreFuncType {
        &self.core_type
    }

    pub fn func(&self) -> FuncIdx {
        self.func
    }

    /// Call the wrapped component function with core arguments.
    ///
    /// `(ptr, len)` pairs are decoded into strings and scalar words are
    /// narrowed to their declared types. String results are allocated with
    /// realloc and copied out before their words are emitted.
    pub fn run(
        &self,
        instance: &mut ComponentInstance,
        args: &[CoreValue],
    ) -> Result<Vec<CoreValue>> {
        self.core_type.check_args(args)?;

        let expected = self.core_type.params().len();
        let mut words = args.iter().copied();
        let mut values = Vec::with_capacity(self.func_type.params().len());
        for ty in self.func_type.params() {
            let value = match ty {
                InterfaceType::String => {
                    let memory = required(self.memory, "memory")?;
                    let ptr = next_word(&mut words, expected, args.len())?.as_u32();
                    let len = next_word(&mut words, expected, args.len())?.as_u32();
                    InterfaceValue::String(load_string(instance, memory, ptr, len)?)
                }
                InterfaceType::List(_) => {
                    return Err(CanonError::unsupported(format!("cannot lower {ty}")));
                }
                scalar => lift_value(scalar, next_word(&mut words, expected, args.len())?)?,
            };
            values.push(value);
        }

        trace!(func = %self.func, values = values.len(), "calling lowered component function");
        let results = instance.invoke(self.func, &values)?;
        self.func_type.check_results(&results)?;

        let mut out = Vec::with_capacity(self.core_type.results().len());
        for value in &results {
            match value {
                InterfaceValue::String(s) => {
                    let memory = required(self.memory, "memory")?;
                    let realloc = required(self.realloc, "realloc")?;
                    let (ptr, len) = store_string(instance, memory, realloc, s)?;
                    out.push(CoreValue::from(ptr));
                    out.push(CoreValue::from(len));
                }
                scalar => out.push(scalar.to_core_value()?),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{CoreType, LinearMemory};
    use crate::runtime::{BumpRealloc, HostFn};

    #[test]
    fn string_results_need_realloc() {
        let ty = FunctionType::new(vec![], vec![InterfaceType::String]);
        let err = LowerAdapter::new(ty, FuncIdx(0), Some(MemoryIdx(0)), None).unwrap_err();
        assert!(matches!(
            err,
            CanonError::InvalidCanonOption(InvalidCanonOption::Missing("realloc"))
        ));
    }

    #[test]
    fn narrow_arguments_are_truncated() {
        let mut inst = ComponentInstance::new();
        let ty = FunctionType::new(vec![InterfaceType::U8], vec![InterfaceType::U8]);
        let f = inst.add_host_function(HostFn::new(ty.clone(), |_, args| Ok(args.to_vec())));
        let adapter = LowerAdapter::new(ty, f, None, None).unwrap();
        assert_eq!(adapter.core_type().params(), &[CoreType::I32]);
        assert_eq!(
            adapter.run(&mut inst, &[CoreValue::I32(0x1ff)]).unwrap(),
            vec![CoreValue::I32(0xff)]
        );
    }

    #[test]
    fn strings_cross_in_both_directions() {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::with_size(8));
        inst.memory_mut(mem).unwrap().set_bytes(b"abc", 0).unwrap();
        let realloc = inst.add_core_host_function(BumpRealloc::new(mem, 8));

        let ty = FunctionType::new(vec![InterfaceType::String], vec![InterfaceType::String]);
        let f = inst.add_host_function(HostFn::new(ty.clone(), |_, args| {
            let s: String = args[0].get()?;
            Ok(vec![InterfaceValue::String(s.to_uppercase())])
        }));
        let adapter = LowerAdapter::new(ty, f, Some(mem), Some(realloc)).unwrap();

        let out = adapter
            .run(&mut inst, &[CoreValue::I32(0), CoreValue::I32(3)])
            .unwrap();
        assert_eq!(out, vec![CoreValue::I32(8), CoreValue::I32(3)]);
        assert_eq!(inst.memory(mem).unwrap().get_string(8, 3).unwrap(), "ABC");
    }

    #[test]
    fn invalid_utf8_argument_fails() {
        let mut inst = ComponentInstance::new();
        let mem = inst.add_memory(LinearMemory::from_bytes(vec![0xff, 0xfe]));
        let ty = FunctionType::new(vec![InterfaceType::String], vec![]);
        let f = inst.add_host_function(HostFn::new(ty.clone(), |_, _| Ok(vec![])));
        let adapter = LowerAdapter::new(ty, f, Some(mem), None).unwrap();
        assert!(matches!(
            adapter.run(&mut inst, &[CoreValue::I32(0), CoreValue::I32(2)]),
            Err(CanonError::InvalidUtf8)
        ));
    }
}
