//! Conversion of declared AST function types into interface signatures.

use crate::abi::{FunctionType, InterfaceType};
use crate::ast::{DefType, FuncType, LabelValType, PrimValType, ResultList, ValueType};
use crate::error::{CanonError, IndexSpace, Result};
use crate::logging::warn;

/// Nesting limit for type references such as `list<list<...>>`.
const MAX_TYPE_DEPTH: usize = 32;

/// Map a primitive value type to its interface type.
///
/// `bool` and `char` travel in the 8-bit slot, and signedness is not kept:
/// each unsigned type maps to the signed type of the same width.
pub fn convert_prim(ty: PrimValType) -> InterfaceType {
    match ty {
        PrimValType::Bool | PrimValType::Char | PrimValType::S8 | PrimValType::U8 => {
            InterfaceType::I8
        }
        PrimValType::S16 | PrimValType::U16 => InterfaceType::I16,
        PrimValType::S32 | PrimValType::U32 => InterfaceType::I32,
        PrimValType::S64 | PrimValType::U64 => InterfaceType::I64,
        PrimValType::Float32 => InterfaceType::F32,
        PrimValType::Float64 => InterfaceType::F64,
        PrimValType::String => InterfaceType::String,
    }
}

/// Resolve a value type against the component's type index space.
pub fn convert_value_type(types: &[DefType], ty: &ValueType) -> Result<InterfaceType> {
    convert_at_depth(types, ty, 0)
}

fn convert_at_depth(types: &[DefType], ty: &ValueType, depth: usize) -> Result<InterfaceType> {
    let idx = match ty {
        ValueType::Prim(prim) => return Ok(convert_prim(*prim)),
        ValueType::Type(idx) => *idx,
    };
    if depth >= MAX_TYPE_DEPTH {
        return Err(CanonError::unsupported(format!(
            "type {idx} nests deeper than {MAX_TYPE_DEPTH} levels"
        )));
    }
    let def = types.get(idx as usize).ok_or(CanonError::UnknownIndex {
        space: IndexSpace::Type,
        index: idx,
    })?;
    match def {
        DefType::List(elem) => Ok(InterfaceType::list(convert_at_depth(
            types,
            elem,
            depth + 1,
        )?)),
        DefType::Record(_) => {
            warn!(ty = idx, "record types are not supported");
            Err(CanonError::unsupported(format!("record type {idx}")))
        }
        DefType::Func(_) | DefType::Instance => Err(CanonError::unsupported(format!(
            "type {idx} is not a value type"
        ))),
    }
}

/// Build the interface signature of a declared function type.
pub fn convert_func_type(types: &[DefType], func: &FuncType) -> Result<FunctionType> {
    let params = convert_labels(types, &func.params)?;
    let results = match &func.results {
        ResultList::Unnamed(ty) => vec![convert_value_type(types, ty)?],
        ResultList::Named(named) => convert_labels(types, named)?,
    };
    Ok(FunctionType::new(params, results))
}

fn convert_labels(types: &[DefType], labels: &[LabelValType]) -> Result<Vec<InterfaceType>> {
    labels
        .iter()
        .map(|label| convert_value_type(types, &label.ty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_map_by_width() {
        assert_eq!(convert_prim(PrimValType::Bool), InterfaceType::I8);
        assert_eq!(convert_prim(PrimValType::Char), InterfaceType::I8);
        assert_eq!(convert_prim(PrimValType::U16), InterfaceType::I16);
        assert_eq!(convert_prim(PrimValType::U32), InterfaceType::I32);
        assert_eq!(convert_prim(PrimValType::S64), InterfaceType::I64);
        assert_eq!(convert_prim(PrimValType::Float64), InterfaceType::F64);
        assert_eq!(convert_prim(PrimValType::String), InterfaceType::String);
    }

    #[test]
    fn function_type_with_unnamed_result() {
        let func = FuncType::new(
            vec![
                LabelValType::new("s", PrimValType::String),
                LabelValType::new("n", PrimValType::S32),
            ],
            ResultList::Unnamed(PrimValType::S32.into()),
        );
        let ty = convert_func_type(&[], &func).unwrap();
        assert_eq!(ty.params(), &[InterfaceType::String, InterfaceType::I32]);
        assert_eq!(ty.results(), &[InterfaceType::I32]);
    }

    #[test]
    fn list_references_resolve_recursively() {
        let types = vec![
            DefType::List(PrimValType::U8.into()),
            DefType::List(ValueType::Type(0)),
        ];
        let ty = convert_value_type(&types, &ValueType::Type(1)).unwrap();
        assert_eq!(
            ty,
            InterfaceType::list(InterfaceType::list(InterfaceType::I8))
        );
    }

    #[test]
    fn records_and_unknown_indices_fail() {
        let types = vec![DefType::Record(vec![LabelValType::new("a", PrimValType::U8)])];
        assert!(
            convert_value_type(&types, &ValueType::Type(0))
                .unwrap_err()
                .is_unsupported()
        );
        assert!(matches!(
            convert_value_type(&types, &ValueType::Type(5)),
            Err(CanonError::UnknownIndex {
                space: IndexSpace::Type,
                index: 5
            })
        ));
    }

    #[test]
    fn self_referencing_list_hits_depth_limit() {
        let types = vec![DefType::List(ValueType::Type(0))];
        assert!(
            convert_value_type(&types, &ValueType::Type(0))
                .unwrap_err()
                .is_unsupported()
        );
    }
}
