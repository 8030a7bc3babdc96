//! Lift adapter: a core function made callable with interface values.

use crate::abi::{CoreFuncType, CoreValue, FunctionType, InterfaceType, InterfaceValue, lift_value};
use crate::error::{CanonError, InvalidCanonOption, Result};
use crate::logging::{info, trace, warn};
use crate::runtime::{ComponentInstance, CoreFuncIdx, MemoryIdx};

use super::strings::{load_string, next_word, required, store_string};

/// A core function wrapped as a component function.
///
/// Holds indices into the owning instance only; the instance is passed to
/// [`LiftAdapter::run`] on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftAdapter {
    func_type: FunctionType,
    core_type: CoreFuncType,
    core_func: CoreFuncIdx,
    memory: Option<MemoryIdx>,
    realloc: Option<CoreFuncIdx>,
}

impl LiftAdapter {
    /// Build an adapter for `core_func` with the component signature `func_type`.
    ///
    /// Fails when the signature cannot be flattened, when strings cross the
    /// boundary without a memory, or when string arguments have no realloc.
    pub fn new(
        func_type: FunctionType,
        core_func: CoreFuncIdx,
        memory: Option<MemoryIdx>,
        realloc: Option<CoreFuncIdx>,
    ) -> Result<Self> {
        let core_type = func_type.to_core()?;
        if func_type.transfers_strings() && memory.is_none() {
            warn!(signature = %func_type, "strings cross the boundary without a memory");
            return Err(InvalidCanonOption::Missing("memory").into());
        }
        if func_type.params().iter().any(InterfaceType::is_string) && realloc.is_none() {
            warn!(signature = %func_type, "string arguments need a realloc");
            return Err(InvalidCanonOption::Missing("realloc").into());
        }
        info!(signature = %func_type, core = %core_type, "lifted");
        Ok(Self {
            func_type,
            core_type,
            core_func,
            memory,
            realloc,
        })
    }

    pub fn func_type(&self) -> &FunctionType {
        &self.func_type
    }

    /// The core signature the wrapped function must have.
    pub fn core_type(&self) -> &CoreFuncType {
        &self.core_type
    }

    pub fn core_func(&self) -> CoreFuncIdx {
        self.core_func
    }

    /// Call the wrapped core function with interface arguments.
    ///
    /// Each string argument is allocated through realloc and copied into
    /// memory before its `(ptr, len)` words are emitted. String results are
    /// read back from memory. A failure of the core function is returned
    /// unchanged and no results are produced.
    pub fn run(
        &self,
        instance: &mut ComponentInstance,
        args: &[InterfaceValue],
    ) -> Result<Vec<InterfaceValue>> {
        self.func_type.check_args(args)?;

        let mut words = Vec::with_capacity(self.core_type.params().len());
        for arg in args {
            match arg {
                InterfaceValue::String(s) => {
                    let memory = required(self.memory, "memory")?;
                    let realloc = required(self.realloc, "realloc")?;
                    let (ptr, len) = store_string(instance, memory, realloc, s)?;
                    words.push(CoreValue::from(ptr));
                    words.push(CoreValue::from(len));
                }
                scalar => words.push(scalar.to_core_value()?),
            }
        }

        trace!(func = %self.core_func, words = words.len(), "calling lifted core function");
        let core_results = instance.invoke_core(self.core_func, &words)?;
        self.core_type.check_results(&core_results)?;

        let expected = self.core_type.results().len();
        let got = core_results.len();
        let mut core_results = core_results.into_iter();
        let mut results = Vec::with_capacity(self.func_type.results().len());
        for ty in self.func_type.results() {
            let value = match ty {
                InterfaceType::String => {
                    let memory = required(self.memory, "memory")?;
                    let ptr = next_word(&mut core_results, expected, got)?.as_u32();
                    let len = next_word(&mut core_results, expected, got)?.as_u32();
                    InterfaceValue::String(load_string(instance, memory, ptr, len)?)
                }
                InterfaceType::List(_) => {
                    return Err(CanonError::unsupported(format!("cannot lift {ty}")));
                }
                scalar => lift_value(scalar, next_word(&mut core_results, expected, got)?)?,
            };
            results.push(value);
        }
        Ok(results)
    }
}
