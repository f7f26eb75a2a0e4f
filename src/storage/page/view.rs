//! Checked construction of borrowed byte ranges inside a page extent.
//!
//! Every key, value, element slot and dump in this layer is produced here, so
//! no view ever reaches past the bytes the page actually owns.

use crate::types::{PageError, Result};

/// Borrows `len` bytes starting at `offset` from `extent`.
#[inline]
pub fn slice_at(extent: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).ok_or(PageError::LayoutViolation {
        offset,
        len,
        extent: extent.len(),
    })?;
    extent.get(offset..end).ok_or(PageError::LayoutViolation {
        offset,
        len,
        extent: extent.len(),
    })
}

/// Mutable counterpart of [`slice_at`] used by the encoders.
#[inline]
pub fn slice_at_mut(extent: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8]> {
    let available = extent.len();
    let violation = PageError::LayoutViolation {
        offset,
        len,
        extent: available,
    };
    let Some(end) = offset.checked_add(len) else {
        return Err(violation);
    };
    extent.get_mut(offset..end).ok_or(violation)
}

// Fixed-width field access below indexes directly and panics out of range.
// Callers only pass ranges already bounds-checked through `slice_at`.

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&buf[offset..offset + 2]);
    u16::from_le_bytes(raw)
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

#[inline]
pub(crate) fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

#[inline]
pub(crate) fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn write_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
