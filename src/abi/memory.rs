//! Linear memory access used for string transfer.

use super::buffer::{read_slice, write_slice};
use crate::error::{CanonError, Result};

/// Accessor for a linear memory owned by a component instance.
///
/// Adapters only ever copy bytes in and out; allocation is the job of the
/// instance's reallocator function.
pub trait Memory: Send {
    /// Copy `bytes` into memory starting at `offset`.
    fn set_bytes(&mut self, bytes: &[u8], offset: u32) -> Result<()>;

    /// Copy `len` bytes starting at `offset` out of memory.
    fn get_bytes(&self, offset: u32, len: u32) -> Result<Vec<u8>>;

    /// Current size in bytes.
    fn size(&self) -> usize;

    /// Grow the memory by at least `delta` bytes.
    fn grow(&mut self, delta: usize) -> Result<()>;

    /// Read `[offset, offset + len)` and decode it as UTF-8.
    fn get_string(&self, offset: u32, len: u32) -> Result<String> {
        let bytes = self.get_bytes(offset, len)?;
        String::from_utf8(bytes).map_err(|_| CanonError::InvalidUtf8)
    }
}

/// In-process linear memory.
///
/// Behaves like a core wasm memory: reads and writes outside the current
/// size fail instead of growing it.
///
/// # Example
///
/// ```ignore
/// use wit_canon::abi::{LinearMemory, Memory};
///
/// let mut mem = LinearMemory::with_size(64);
/// mem.set_bytes(b"hello", 16)?;
/// assert_eq!(mem.get_string(16, 5)?, "hello");
/// ```
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct LinearMemory {
    data: Vec<u8>,
}

impl LinearMemory {
    /// Create a new empty linear memory.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a zero-filled memory of `size` bytes.
    pub fn with_size(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// Create a linear memory from existing bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Get the raw bytes of the linear memory.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl Memory for LinearMemory {
    fn set_bytes(&mut self, bytes: &[u8], offset: u32) -> Result<()> {
        write_slice(&mut self.data, offset, bytes)
    }

    fn get_bytes(&self, offset: u32, len: u32) -> Result<Vec<u8>> {
        read_slice(&self.data, offset, len).map(<[u8]>::to_vec)
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn grow(&mut self, delta: usize) -> Result<()> {
        self.data.resize(self.data.len() + delta, 0);
        Ok(())
    }
}
