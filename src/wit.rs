//! Function types from WIT definitions.
//!
//! Builds the AST [`FuncType`] of a named WIT function together with the
//! type table its `Type(idx)` references point into.
//!
//! # Example
//!
//! ```ignore
//! use wit_canon::wit::load_wit_function;
//!
//! let wit = r#"
//!     package demo:echo;
//!     world echo {
//!         export echo: func(s: string) -> string;
//!     }
//! "#;
//! let sig = load_wit_function(wit, "echo")?;
//! ```

use std::path::Path;

use anyhow::anyhow;
use wit_parser::{Function, Resolve, Type, TypeDefKind, WorldItem};

use crate::ast::{DefType, FuncType, LabelValType, PrimValType, ResultList, ValueType};
use crate::error::{CanonError, Result};

/// A WIT function converted to AST form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitFunction {
    pub name: String,
    pub func: FuncType,
    /// Types referenced by `func` through [`ValueType::Type`].
    pub types: Vec<DefType>,
}

/// Find `name` in WIT source text.
pub fn load_wit_function(wit_definition: &str, name: &str) -> Result<WitFunction> {
    let mut resolve = Resolve::new();
    resolve.push_str("input.wit", wit_definition)?;
    find_function(&resolve, name)
}

/// Find `name` in a WIT file or directory.
pub fn load_wit_function_from_path(path: &Path, name: &str) -> Result<WitFunction> {
    let mut resolve = Resolve::new();
    resolve.push_path(path)?;
    find_function(&resolve, name)
}

/// Look `name` up among world imports and exports, then interface functions.
pub fn find_function(resolve: &Resolve, name: &str) -> Result<WitFunction> {
    let from_worlds = resolve.worlds.iter().flat_map(|(_, world)| {
        world
            .imports
            .values()
            .chain(world.exports.values())
            .filter_map(|item| match item {
                WorldItem::Function(func) => Some(func),
                _ => None,
            })
    });
    let from_interfaces = resolve
        .interfaces
        .iter()
        .flat_map(|(_, iface)| iface.functions.values());

    let func = from_worlds
        .chain(from_interfaces)
        .find(|func| func.name == name)
        .ok_or_else(|| CanonError::Wit(anyhow!("function `{name}` not found in WIT")))?;
    convert_function(resolve, func)
}

fn convert_function(resolve: &Resolve, func: &Function) -> Result<WitFunction> {
    let mut types = Vec::new();
    let params = func
        .params
        .iter()
        .map(|(label, ty)| Ok(LabelValType::new(label.clone(), value_type(resolve, ty, &mut types)?)))
        .collect::<Result<Vec<_>>>()?;
    let results = match &func.result {
        Some(ty) => ResultList::Unnamed(value_type(resolve, ty, &mut types)?),
        None => ResultList::none(),
    };
    Ok(WitFunction {
        name: func.name.clone(),
        func: FuncType::new(params, results),
        types,
    })
}

fn value_type(resolve: &Resolve, ty: &Type, types: &mut Vec<DefType>) -> Result<ValueType> {
    let prim = match ty {
        Type::Bool => PrimValType::Bool,
        Type::U8 => PrimValType::U8,
        Type::U16 => PrimValType::U16,
        Type::U32 => PrimValType::U32,
        Type::U64 => PrimValType::U64,
        Type::S8 => PrimValType::S8,
        Type::S16 => PrimValType::S16,
        Type::S32 => PrimValType::S32,
        Type::S64 => PrimValType::S64,
        Type::F32 => PrimValType::Float32,
        Type::F64 => PrimValType::Float64,
        Type::Char => PrimValType::Char,
        Type::String => PrimValType::String,
        Type::Id(id) => {
            let typedef = resolve
                .types
                .get(*id)
                .ok_or_else(|| CanonError::Wit(anyhow!("dangling WIT type id")))?;
            let def = match &typedef.kind {
                TypeDefKind::Type(inner) => return value_type(resolve, inner, types),
                TypeDefKind::List(elem) => DefType::List(value_type(resolve, elem, types)?),
                TypeDefKind::Record(record) => DefType::Record(
                    record
                        .fields
                        .iter()
                        .map(|field| {
                            Ok(LabelValType::new(
                                field.name.clone(),
                                value_type(resolve, &field.ty, types)?,
                            ))
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                other => {
                    return Err(CanonError::unsupported(format!(
                        "WIT type `{}` has no canonical form here",
                        other.as_str()
                    )));
                }
            };
            types.push(def);
            return Ok(ValueType::Type((types.len() - 1) as u32));
        }
        Type::ErrorContext => {
            return Err(CanonError::unsupported("error-context"));
        }
    };
    Ok(ValueType::Prim(prim))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIT: &str = r#"
        package test:canon;

        interface strings {
            record pair { a: u8, b: string }
            type bytes = list<u8>;

            upper: func(s: string) -> string;
            swap: func(p: pair) -> pair;
            sum: func(b: bytes) -> u32;
        }

        world demo {
            export add: func(a: s32, b: s32) -> s32;
            export ping: func();
        }
    "#;

    #[test]
    fn world_export_function() {
        let f = load_wit_function(WIT, "add").unwrap();
        assert_eq!(
            f.func,
            FuncType::new(
                vec![
                    LabelValType::new("a", PrimValType::S32),
                    LabelValType::new("b", PrimValType::S32),
                ],
                ResultList::Unnamed(PrimValType::S32.into()),
            )
        );
        assert!(f.types.is_empty());
    }

    #[test]
    fn function_without_result() {
        let f = load_wit_function(WIT, "ping").unwrap();
        assert_eq!(f.func.results, ResultList::none());
    }

    #[test]
    fn interface_function_with_list_alias() {
        let f = load_wit_function(WIT, "sum").unwrap();
        assert_eq!(f.types, vec![DefType::List(PrimValType::U8.into())]);
        assert_eq!(f.func.params[0].ty, ValueType::Type(0));
    }

    #[test]
    fn records_are_collected() {
        let f = load_wit_function(WIT, "swap").unwrap();
        assert!(matches!(f.types.first(), Some(DefType::Record(fields)) if fields.len() == 2));
    }

    #[test]
    fn missing_function_is_an_error() {
        assert!(matches!(
            load_wit_function(WIT, "nope"),
            Err(CanonError::Wit(_))
        ));
        assert!(load_wit_function("not wit", "add").is_err());
    }
}
