//! Bounds-checked byte range helpers for linear memory.

use crate::error::{CanonError, Result};

/// Align a value up to the nearest multiple of alignment.
///
/// An alignment of zero is treated as one.
#[inline]
pub fn align_to(val: usize, align: usize) -> usize {
    let align = align.max(1);
    (val + align - 1) & !(align - 1)
}

/// Byte range `[ptr, ptr + len)` as `usize` bounds, or an error if it
/// does not fit inside a memory of `memory_size` bytes.
#[inline]
pub fn checked_range(ptr: u32, len: u32, memory_size: usize) -> Result<(usize, usize)> {
    let start = ptr as usize;
    match start.checked_add(len as usize) {
        Some(end) if end <= memory_size => Ok((start, end)),
        _ => Err(CanonError::InvalidMemoryPointer {
            ptr,
            len,
            memory_size,
        }),
    }
}

/// Safe buffer slice read helper.
#[inline]
pub fn read_slice(buffer: &[u8], ptr: u32, len: u32) -> Result<&[u8]> {
    let (start, end) = checked_range(ptr, len, buffer.len())?;
    buffer
        .get(start..end)
        .ok_or(CanonError::InvalidMemoryPointer {
            ptr,
            len,
            memory_size: buffer.len(),
        })
}

/// Safe buffer slice write helper.
#[inline]
pub fn write_slice(buffer: &mut [u8], ptr: u32, data: &[u8]) -> Result<()> {
    let memory_size = buffer.len();
    let len = u32::try_from(data.len()).map_err(|_| CanonError::InvalidMemoryPointer {
        ptr,
        len: u32::MAX,
        memory_size,
    })?;
    let (start, end) = checked_range(ptr, len, memory_size)?;
    buffer
        .get_mut(start..end)
        .ok_or(CanonError::InvalidMemoryPointer {
            ptr,
            len,
            memory_size,
        })?
        .copy_from_slice(data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align() {
        assert_eq!(align_to(5, 4), 8);
        assert_eq!(align_to(8, 4), 8);
        assert_eq!(align_to(3, 0), 3);
        assert_eq!(align_to(3, 1), 3);
    }

    #[test]
    fn ranges_are_checked() {
        let mut buf = [0u8; 8];
        assert!(write_slice(&mut buf, 6, b"ab").is_ok());
        assert!(write_slice(&mut buf, 7, b"ab").is_err());
        assert_eq!(read_slice(&buf, 6, 2).unwrap(), b"ab");
        assert!(read_slice(&buf, u32::MAX, 2).is_err());
        assert_eq!(read_slice(&buf, 8, 0).unwrap(), b"");
    }
}
