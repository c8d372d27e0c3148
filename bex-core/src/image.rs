//! Read-only view over a ROM image buffer.
//!
//! Every field the Phoenix container stores is an offset, length or selector
//! into this buffer, supplied by the firmware itself. All multi-byte reads go
//! through the bounds-checked accessors here; nothing in the crate indexes
//! the raw slice directly.

use crate::error::{BiosError, BiosResult};

/// Immutable, bounds-checked view of a full ROM image.
///
/// The image length must be a power of two: chain offsets in the Phoenix
/// format wrap around via `offset & (len - 1)`, which is only meaningful for
/// power-of-two sizes.
#[derive(Debug, Clone, Copy)]
pub struct RomImage<'a> {
    data: &'a [u8],
}

impl<'a> RomImage<'a> {
    /// Wrap a ROM image buffer. Rejects empty and non-power-of-two lengths.
    pub fn new(data: &'a [u8]) -> BiosResult<Self> {
        if data.is_empty() || !data.len().is_power_of_two() {
            return Err(BiosError::InvalidImageLength(data.len()));
        }
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reduce an offset into the image's address range.
    ///
    /// This reproduces the format's wraparound semantics: out-of-range chain
    /// offsets alias back into the buffer instead of faulting.
    pub fn mask(&self, offset: u32) -> u32 {
        (offset as u64 & (self.data.len() as u64 - 1)) as u32
    }

    /// Borrow `len` bytes at `offset`, or `None` if the range does not fit.
    pub fn slice(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        let b = self.slice(offset, 2)?;
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        let b = self.slice(offset, 4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a fixed-width ASCII field, trimming trailing NUL and space
    /// padding. Non-ASCII bytes are replaced.
    pub fn ascii_field(&self, offset: usize, len: usize) -> Option<String> {
        let b = self.slice(offset, len)?;
        let s = String::from_utf8_lossy(b);
        Some(s.trim_end_matches(['\0', ' ']).to_string())
    }

    /// Read a NUL-terminated ASCII string starting at `offset`, stopping at
    /// the buffer end if no terminator is found.
    pub fn cstr_at(&self, offset: usize) -> Option<String> {
        let tail = self.data.get(offset..)?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(String::from_utf8_lossy(&tail[..end]).into_owned())
    }
}
