//! Invocation primitives for core and component functions.

use crate::abi::{CoreValue, InterfaceValue};
use crate::error::Result;
use crate::logging::trace;

use super::instance::{ComponentInstance, ComponentFunc, CoreFunc, CoreFuncIdx, FuncIdx};

impl ComponentInstance {
    /// Call a core function with core arguments.
    ///
    /// Arguments and results are checked against the callee's declared
    /// core type. A failure raised by the callee is returned unchanged.
    pub fn invoke_core(&mut self, idx: CoreFuncIdx, args: &[CoreValue]) -> Result<Vec<CoreValue>> {
        let func = self.core_function(idx)?.clone();
        func.func_type().check_args(args)?;
        trace!(func = %idx, args = args.len(), "invoke core");

        let results = match &func {
            CoreFunc::Host(host) => host.call(self, args)?,
            CoreFunc::Lowered(adapter) => adapter.run(self, args)?,
        };
        func.func_type().check_results(&results)?;
        Ok(results)
    }

    /// Call a component function with interface values.
    ///
    /// Same contract as [`ComponentInstance::invoke_core`], checked against
    /// the callee's component signature.
    pub fn invoke(&mut self, idx: FuncIdx, args: &[InterfaceValue]) -> Result<Vec<InterfaceValue>> {
        let func = self.function(idx)?.clone();
        func.func_type().check_args(args)?;
        trace!(func = %idx, args = args.len(), "invoke");

        let results = match &func {
            ComponentFunc::Host(host) => host.call(self, args)?,
            ComponentFunc::Lifted(adapter) => adapter.run(self, args)?,
        };
        func.func_type().check_results(&results)?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{CoreFuncType, CoreType, FunctionType, InterfaceType};
    use crate::error::CanonError;
    use crate::runtime::host::{CoreFn, HostFn};

    #[test]
    fn core_arguments_are_checked() {
        let mut inst = ComponentInstance::new();
        let ty = CoreFuncType::new(vec![CoreType::I32], vec![CoreType::I32]);
        let f = inst.add_core_host_function(CoreFn::new(ty, |_, args| Ok(args.to_vec())));

        assert_eq!(
            inst.invoke_core(f, &[CoreValue::I32(3)]).unwrap(),
            vec![CoreValue::I32(3)]
        );
        assert!(matches!(
            inst.invoke_core(f, &[CoreValue::I64(3)]),
            Err(CanonError::TypeMismatch { .. })
        ));
        assert!(matches!(
            inst.invoke_core(f, &[]),
            Err(CanonError::ArityMismatch { expected: 1, got: 0 })
        ));
    }

    #[test]
    fn results_are_checked() {
        let mut inst = ComponentInstance::new();
        let ty = FunctionType::new(vec![], vec![InterfaceType::U8]);
        let f = inst.add_host_function(HostFn::new(ty, |_, _| Ok(vec![InterfaceValue::U16(1)])));
        assert!(matches!(inst.invoke(f, &[]), Err(CanonError::TypeMismatch { .. })));
    }

    #[test]
    fn callee_failure_is_returned_unchanged() {
        let mut inst = ComponentInstance::new();
        let ty = FunctionType::new(vec![], vec![]);
        let f = inst.add_host_function(HostFn::new(ty, |_, _| Err(CanonError::trap("boom"))));
        match inst.invoke(f, &[]) {
            Err(CanonError::Trap(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
