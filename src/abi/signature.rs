//! Component and core function signatures.

use std::fmt;

use crate::error::{CanonError, Result};

use super::types::{CoreType, InterfaceType};
use super::value::{CoreValue, InterfaceValue};

/// Signature of a component-level function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionType {
    params: Vec<InterfaceType>,
    results: Vec<InterfaceType>,
}

impl FunctionType {
    pub fn new(params: Vec<InterfaceType>, results: Vec<InterfaceType>) -> Self {
        Self { params, results }
    }

    pub fn params(&self) -> &[InterfaceType] {
        &self.params
    }

    pub fn results(&self) -> &[InterfaceType] {
        &self.results
    }

    /// Derive the core signature that carries this function's values.
    ///
    /// Every string becomes an `(i32 ptr, i32 len)` pair and every scalar
    /// one word of its slot type. Lists are not flattened and fail.
    pub fn to_core(&self) -> Result<CoreFuncType> {
        Ok(CoreFuncType::new(
            flatten(&self.params)?,
            flatten(&self.results)?,
        ))
    }

    /// Returns `true` if any parameter or result is a string.
    pub fn transfers_strings(&self) -> bool {
        self.params.iter().chain(&self.results).any(InterfaceType::is_string)
    }

    /// Check call arguments against the declared parameters.
    pub fn check_args(&self, args: &[InterfaceValue]) -> Result<()> {
        check_values(&self.params, args)
    }

    /// Check returned values against the declared results.
    pub fn check_results(&self, results: &[InterfaceValue]) -> Result<()> {
        check_values(&self.results, results)
    }
}

fn flatten(types: &[InterfaceType]) -> Result<Vec<CoreType>> {
    let mut flat = Vec::with_capacity(types.len());
    for ty in types {
        match ty {
            InterfaceType::String => {
                flat.push(CoreType::I32);
                flat.push(CoreType::I32);
            }
            InterfaceType::List(_) => {
                return Err(CanonError::unsupported(format!(
                    "{ty} cannot cross the canonical ABI boundary yet"
                )));
            }
            scalar => flat.push(scalar.core_slot()?),
        }
    }
    Ok(flat)
}

fn check_values(expected: &[InterfaceType], values: &[InterfaceValue]) -> Result<()> {
    if expected.len() != values.len() {
        return Err(CanonError::ArityMismatch {
            expected: expected.len(),
            got: values.len(),
        });
    }
    for (ty, value) in expected.iter().zip(values) {
        let got = value.ty();
        if *ty != got {
            return Err(CanonError::type_mismatch(ty, got));
        }
    }
    Ok(())
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.params)?;
        f.write_str(" -> ")?;
        write_list(f, &self.results)
    }
}

/// Signature of a core function, in core value types only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreFuncType {
    params: Vec<CoreType>,
    results: Vec<CoreType>,
}

impl CoreFuncType {
    pub fn new(params: Vec<CoreType>, results: Vec<CoreType>) -> Self {
        Self { params, results }
    }

    /// `(old_ptr, old_size, align, new_size) -> new_ptr`
    pub fn realloc() -> Self {
        Self::new(vec![CoreType::I32; 4], vec![CoreType::I32])
    }

    pub fn params(&self) -> &[CoreType] {
        &self.params
    }

    pub fn results(&self) -> &[CoreType] {
        &self.results
    }

    pub fn check_args(&self, args: &[CoreValue]) -> Result<()> {
        check_words(&self.params, args)
    }

    pub fn check_results(&self, results: &[CoreValue]) -> Result<()> {
        check_words(&self.results, results)
    }
}

fn check_words(expected: &[CoreType], words: &[CoreValue]) -> Result<()> {
    if expected.len() != words.len() {
        return Err(CanonError::ArityMismatch {
            expected: expected.len(),
            got: words.len(),
        });
    }
    for (ty, word) in expected.iter().zip(words) {
        if *ty != word.ty() {
            return Err(CanonError::type_mismatch(ty, word.ty()));
        }
    }
    Ok(())
}

impl fmt::Display for CoreFuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.params)?;
        f.write_str(" -> ")?;
        write_list(f, &self.results)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[ ")?;
    for item in items {
        write!(f, "{item} ")?;
    }
    f.write_str("]")
}
