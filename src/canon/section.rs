//! Instantiation of a component's canonical function section.

use std::sync::Arc;

use crate::ast::{Canon, CanonSection, DefType, FuncType};
use crate::error::{CanonError, InvalidCanonOption, Result};
use crate::logging::{debug, error, warn};
use crate::runtime::{ComponentFunc, ComponentInstance, CoreFunc, CoreFuncIdx, FuncIdx, MemoryIdx};

use super::convert::convert_func_type;
use super::lift::LiftAdapter;
use super::lower::LowerAdapter;
use super::options::CanonOptions;

/// Lift core function `core_func` to the declared component type.
///
/// The core function's type must equal the core signature derived from
/// `declared`.
pub fn lifting(
    instance: &ComponentInstance,
    declared: &FuncType,
    core_func: CoreFuncIdx,
    memory: Option<MemoryIdx>,
    realloc: Option<CoreFuncIdx>,
) -> Result<LiftAdapter> {
    CanonOptions { memory, realloc }.validate(instance)?;
    let func_type = convert_func_type(instance.types(), declared)?;
    let adapter = LiftAdapter::new(func_type, core_func, memory, realloc)?;
    let actual = instance.core_function(core_func)?.func_type();
    if actual != adapter.core_type() {
        return Err(CanonError::type_mismatch(adapter.core_type(), actual));
    }
    Ok(adapter)
}

/// Lower component function `func` to a core function.
pub fn lowering(
    instance: &ComponentInstance,
    func: FuncIdx,
    memory: Option<MemoryIdx>,
    realloc: Option<CoreFuncIdx>,
) -> Result<LowerAdapter> {
    CanonOptions { memory, realloc }.validate(instance)?;
    let func_type = instance.function(func)?.func_type().clone();
    LowerAdapter::new(func_type, func, memory, realloc)
}

/// Resolve every declaration of `section` in order and register the
/// resulting functions in `instance`.
///
/// Lifted functions are appended to the component function index space and
/// lowered functions to the core function index space. If any declaration
/// fails, every function registered by this section is removed again before
/// the error is returned.
pub fn instantiate_canonical_section(
    section: &CanonSection,
    instance: &mut ComponentInstance,
) -> Result<()> {
    let checkpoint = instance.checkpoint();
    for (i, canon) in section.content().iter().enumerate() {
        if let Err(err) = instantiate_canon(canon, instance) {
            debug!(declaration = i, error = %err, "canonical section failed, rolling back");
            instance.rollback(checkpoint);
            return Err(err);
        }
    }
    Ok(())
}

fn instantiate_canon(canon: &Canon, instance: &mut ComponentInstance) -> Result<()> {
    match canon {
        Canon::Lift {
            core_func,
            options,
            func_type,
        } => {
            let options = CanonOptions::parse(options)?;
            let declared = match instance.get_type(*func_type) {
                Ok(DefType::Func(func)) => func.clone(),
                _ => {
                    error!(func_type, "cannot lift a non-function type");
                    return Err(InvalidCanonOption::NotAFunction(*func_type).into());
                }
            };
            let adapter = lifting(
                instance,
                &declared,
                CoreFuncIdx(*core_func),
                options.memory,
                options.realloc,
            )?;
            let idx = instance.add_function(ComponentFunc::Lifted(Arc::new(adapter)));
            debug!(func = %idx, core_func, "registered lifted function");
        }
        Canon::Lower { func, options } => {
            let options = CanonOptions::parse(options)?;
            let adapter = lowering(instance, FuncIdx(*func), options.memory, options.realloc)?;
            let idx = instance.add_core_function(CoreFunc::Lowered(Arc::new(adapter)));
            debug!(core_func = %idx, func, "registered lowered function");
        }
        Canon::Resource(op) => {
            warn!(%op, "resource is not supported yet");
            return Err(InvalidCanonOption::Resource(*op).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{CoreFuncType, CoreType, FunctionType, InterfaceType, InterfaceValue};
    use crate::ast::{CanonOpt, LabelValType, PrimValType, ResourceOp, ResultList};
    use crate::runtime::{CoreFn, HostFn};

    fn identity_instance() -> (ComponentInstance, u32) {
        let mut inst = ComponentInstance::new();
        let core = CoreFuncType::new(vec![CoreType::I32], vec![CoreType::I32]);
        inst.add_core_host_function(CoreFn::new(core, |_, args| Ok(args.to_vec())));
        let ty = inst.add_type(DefType::Func(FuncType::new(
            vec![LabelValType::new("x", PrimValType::S32)],
            ResultList::Unnamed(PrimValType::S32.into()),
        )));
        (inst, ty)
    }

    #[test]
    fn lift_registers_component_function() {
        let (mut inst, ty) = identity_instance();
        let section = CanonSection::new(vec![Canon::Lift {
            core_func: 0,
            options: vec![],
            func_type: ty,
        }]);
        instantiate_canonical_section(&section, &mut inst).unwrap();
        assert_eq!(inst.function_count(), 1);
        let out = inst.invoke(FuncIdx(0), &[InterfaceValue::I32(-4)]).unwrap();
        assert_eq!(out, vec![InterfaceValue::I32(-4)]);
    }

    #[test]
    fn lift_of_non_function_type_fails() {
        let (mut inst, _) = identity_instance();
        let list = inst.add_type(DefType::List(PrimValType::U8.into()));
        let section = CanonSection::new(vec![Canon::Lift {
            core_func: 0,
            options: vec![],
            func_type: list,
        }]);
        let err = instantiate_canonical_section(&section, &mut inst).unwrap_err();
        assert!(matches!(
            err,
            CanonError::InvalidCanonOption(InvalidCanonOption::NotAFunction(idx)) if idx == list
        ));
    }

    #[test]
    fn lift_checks_core_signature() {
        let (inst, _) = identity_instance();
        let declared = FuncType::new(
            vec![LabelValType::new("x", PrimValType::S64)],
            ResultList::none(),
        );
        assert!(matches!(
            lifting(&inst, &declared, CoreFuncIdx(0), None, None),
            Err(CanonError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn lower_registers_core_function() {
        let mut inst = ComponentInstance::new();
        let ty = FunctionType::new(vec![InterfaceType::I64], vec![InterfaceType::I64]);
        inst.add_host_function(HostFn::new(ty, |_, args| {
            let v: i64 = args[0].get()?;
            Ok(vec![InterfaceValue::I64(v * 2)])
        }));
        let section = CanonSection::new(vec![Canon::Lower {
            func: 0,
            options: vec![],
        }]);
        instantiate_canonical_section(&section, &mut inst).unwrap();
        assert_eq!(inst.core_function_count(), 1);
        let out = inst.invoke_core(CoreFuncIdx(0), &[21i64.into()]).unwrap();
        assert_eq!(out, vec![42i64.into()]);
    }

    #[test]
    fn failure_rolls_back_whole_section() {
        let (mut inst, ty) = identity_instance();
        let section = CanonSection::new(vec![
            Canon::Lift {
                core_func: 0,
                options: vec![],
                func_type: ty,
            },
            Canon::Lower {
                func: 0,
                options: vec![],
            },
            Canon::Lift {
                core_func: 0,
                options: vec![CanonOpt::PostReturn(0)],
                func_type: ty,
            },
        ]);
        assert!(instantiate_canonical_section(&section, &mut inst).is_err());
        assert_eq!(inst.function_count(), 0);
        assert_eq!(inst.core_function_count(), 1);
    }

    #[test]
    fn resource_operations_fail() {
        for op in [ResourceOp::New(0), ResourceOp::Drop(0), ResourceOp::Rep(0)] {
            let mut inst = ComponentInstance::new();
            let section = CanonSection::new(vec![Canon::Resource(op)]);
            let err = instantiate_canonical_section(&section, &mut inst).unwrap_err();
            assert!(matches!(
                err,
                CanonError::InvalidCanonOption(InvalidCanonOption::Resource(o)) if o == op
            ));
            assert_eq!(inst.function_count(), 0);
            assert_eq!(inst.core_function_count(), 0);
        }
    }
}
