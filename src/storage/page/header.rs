//! Fixed page header shared by every page kind.
//!
//! Layout (16 bytes, little-endian):
//! - `id`: u64 at 0
//! - `flags`: u16 at 8
//! - `count`: u16 at 10
//! - `overflow`: u32 at 12

use std::borrow::Cow;
use std::ops::Range;

use super::view::{read_u16, read_u32, read_u64, slice_at, write_u16, write_u32, write_u64};
use crate::types::{PageError, PageId, Result};

/// Size of the page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 16;

/// Branch (internal) B+tree node.
pub const BRANCH_PAGE_FLAG: u16 = 0x01;
/// Leaf B+tree node.
pub const LEAF_PAGE_FLAG: u16 = 0x02;
/// Meta page holding root pointers.
pub const META_PAGE_FLAG: u16 = 0x04;
/// Freelist page holding unused page ids.
pub const FREELIST_PAGE_FLAG: u16 = 0x10;

/// Byte ranges of the header fields.
pub mod field {
    use core::ops::Range;

    /// Page id.
    pub const ID: Range<usize> = 0..8;
    /// Page kind flags.
    pub const FLAGS: Range<usize> = 8..10;
    /// Element or record count.
    pub const COUNT: Range<usize> = 10..12;
    /// Number of extra contiguous pages.
    pub const OVERFLOW: Range<usize> = 12..16;
}

/// Recognized page kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PageKind {
    /// Internal node: keys route to child pages.
    Branch,
    /// Terminal node: keys with values or sub-buckets.
    Leaf,
    /// Database root pointers.
    Meta,
    /// Free page ids.
    Freelist,
}

impl PageKind {
    /// Classifies raw header flags, testing bits in branch, leaf, meta,
    /// freelist order.
    pub const fn from_flags(flags: u16) -> Option<Self> {
        if flags & BRANCH_PAGE_FLAG != 0 {
            Some(PageKind::Branch)
        } else if flags & LEAF_PAGE_FLAG != 0 {
            Some(PageKind::Leaf)
        } else if flags & META_PAGE_FLAG != 0 {
            Some(PageKind::Meta)
        } else if flags & FREELIST_PAGE_FLAG != 0 {
            Some(PageKind::Freelist)
        } else {
            None
        }
    }

    /// The flag bit written for this kind.
    pub const fn flag(self) -> u16 {
        match self {
            PageKind::Branch => BRANCH_PAGE_FLAG,
            PageKind::Leaf => LEAF_PAGE_FLAG,
            PageKind::Meta => META_PAGE_FLAG,
            PageKind::Freelist => FREELIST_PAGE_FLAG,
        }
    }

    /// Lowercase display name.
    pub const fn name(self) -> &'static str {
        match self {
            PageKind::Branch => "branch",
            PageKind::Leaf => "leaf",
            PageKind::Meta => "meta",
            PageKind::Freelist => "freelist",
        }
    }
}

/// Human-readable name for `flags`; unknown patterns render as `unknown<xx>`.
pub fn type_name(flags: u16) -> Cow<'static, str> {
    match PageKind::from_flags(flags) {
        Some(kind) => Cow::Borrowed(kind.name()),
        None => Cow::Owned(format!("unknown<{flags:02x}>")),
    }
}

/// Decoded copy of a page header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageHeader {
    /// Page id.
    pub id: PageId,
    /// Raw kind flags.
    pub flags: u16,
    /// Element or record count.
    pub count: u16,
    /// Extra contiguous pages following this one.
    pub overflow: u32,
}

impl PageHeader {
    /// Header for a single-page image of `kind`.
    pub fn new(id: PageId, kind: PageKind) -> Self {
        Self {
            id,
            flags: kind.flag(),
            count: 0,
            overflow: 0,
        }
    }

    /// Sets the element count.
    pub fn with_count(mut self, count: u16) -> Self {
        self.count = count;
        self
    }

    /// Sets the overflow page count.
    pub fn with_overflow(mut self, overflow: u32) -> Self {
        self.overflow = overflow;
        self
    }

    /// Reads the header at the start of `src`.
    pub fn decode(src: &[u8]) -> Result<Self> {
        let hdr = slice_at(src, 0, PAGE_HEADER_SIZE)?;
        Ok(Self {
            id: PageId(read_u64(hdr, field::ID.start)),
            flags: read_u16(hdr, field::FLAGS.start),
            count: read_u16(hdr, field::COUNT.start),
            overflow: read_u32(hdr, field::OVERFLOW.start),
        })
    }

    /// Writes the header into the start of `dst`.
    pub fn encode(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() < PAGE_HEADER_SIZE {
            return Err(PageError::LayoutViolation {
                offset: 0,
                len: PAGE_HEADER_SIZE,
                extent: dst.len(),
            });
        }
        write_u64(dst, field::ID.start, self.id.0);
        write_u16(dst, field::FLAGS.start, self.flags);
        write_u16(dst, field::COUNT.start, self.count);
        write_u32(dst, field::OVERFLOW.start, self.overflow);
        Ok(())
    }

    /// Kind encoded in the flags, if recognized.
    pub fn kind(&self) -> Option<PageKind> {
        PageKind::from_flags(self.flags)
    }

    /// See [`type_name`].
    pub fn type_name(&self) -> Cow<'static, str> {
        type_name(self.flags)
    }

    /// Total number of pages this page spans.
    pub fn span(&self) -> u64 {
        1 + u64::from(self.overflow)
    }

    /// Byte range of the whole page inside a buffer of `page_size` pages.
    pub fn byte_range(&self, page_size: usize) -> Option<Range<usize>> {
        let start = usize::try_from(self.id.0).ok()?.checked_mul(page_size)?;
        let len = usize::try_from(self.span()).ok()?.checked_mul(page_size)?;
        Some(start..start.checked_add(len)?)
    }
}
