//! String transfer through linear memory.

use crate::abi::CoreValue;
use crate::error::{CanonError, InvalidCanonOption, Result};
use crate::logging::trace;
use crate::runtime::{ComponentInstance, CoreFuncIdx, MemoryIdx};

/// Allocate `s.len()` bytes with `realloc(0, 0, 0, len)` and copy `s` there.
///
/// Returns the `(ptr, len)` pair. A zero-length string still calls realloc.
pub(crate) fn store_string(
    instance: &mut ComponentInstance,
    memory: MemoryIdx,
    realloc: CoreFuncIdx,
    s: &str,
) -> Result<(u32, u32)> {
    let len = u32::try_from(s.len())
        .map_err(|_| CanonError::unsupported("string longer than 4GiB"))?;
    let args = [
        CoreValue::I32(0),
        CoreValue::I32(0),
        CoreValue::I32(0),
        CoreValue::from(len),
    ];
    let ptr = instance
        .invoke_core(realloc, &args)?
        .first()
        .map(CoreValue::as_u32)
        .ok_or(CanonError::ArityMismatch {
            expected: 1,
            got: 0,
        })?;
    instance.memory_mut(memory)?.set_bytes(s.as_bytes(), ptr)?;
    trace!(ptr, len, "copied string into linear memory");
    Ok((ptr, len))
}

/// Read `[ptr, ptr + len)` and decode it as UTF-8.
pub(crate) fn load_string(
    instance: &ComponentInstance,
    memory: MemoryIdx,
    ptr: u32,
    len: u32,
) -> Result<String> {
    let s = instance.memory(memory)?.get_string(ptr, len)?;
    trace!(ptr, len, "read string from linear memory");
    Ok(s)
}

/// Unwrap an option that string transfer requires.
pub(crate) fn required<T>(value: Option<T>, name: &'static str) -> Result<T> {
    value.ok_or(CanonError::InvalidCanonOption(InvalidCanonOption::Missing(name)))
}

/// Take the next core word of a flattened value list.
pub(crate) fn next_word(
    words: &mut impl Iterator<Item = CoreValue>,
    expected: usize,
    got: usize,
) -> Result<CoreValue> {
    words
        .next()
        .ok_or(CanonError::ArityMismatch { expected, got })
}
