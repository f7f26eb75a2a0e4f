//! Element records stored after the header of branch and leaf pages.
//!
//! Elements form a contiguous array starting at [`PAGE_HEADER_SIZE`]. Each
//! record locates its key through `pos`, an offset measured from the record's
//! own first byte, so key and value views are resolved against the whole page
//! extent rather than the 16-byte slot.

use core::fmt;
use core::marker::PhantomData;

use super::header::PAGE_HEADER_SIZE;
use super::view::{read_u32, read_u64, slice_at};
use crate::types::{PageError, PageId, Result};

/// Size of a branch element record.
pub const BRANCH_ELEMENT_SIZE: usize = 16;
/// Size of a leaf element record.
pub const LEAF_ELEMENT_SIZE: usize = 16;
/// Leaf element flag marking a nested sub-bucket.
pub const BUCKET_LEAF_FLAG: u32 = 0x01;
/// Fewest keys a node keeps before the node layer merges it away.
pub const MIN_KEYS_PER_PAGE: usize = 2;

/// A fixed-size record type that can be read out of a page extent.
pub trait ElementLayout<'a>: Copy {
    /// Encoded record size in bytes.
    const SIZE: usize;

    /// Wraps the record at `offset`, failing with
    /// [`PageError::LayoutViolation`] unless `SIZE` bytes fit there.
    fn at(page: &'a [u8], offset: usize) -> Result<Self>;
}

/// Resolves `base + pos`, `len` bytes, as a view into `page`.
fn relative_slice(page: &[u8], base: usize, pos: u64, len: u32) -> Result<&[u8]> {
    let len = len as usize;
    let start = usize::try_from(pos)
        .ok()
        .and_then(|pos| base.checked_add(pos))
        .ok_or(PageError::LayoutViolation {
            offset: base,
            len,
            extent: page.len(),
        })?;
    slice_at(page, start, len)
}

/// Branch record: `{ pos: u32, ksize: u32, pgid: u64 }`.
#[derive(Clone, Copy)]
pub struct BranchElement<'a> {
    page: &'a [u8],
    offset: usize,
}

impl<'a> ElementLayout<'a> for BranchElement<'a> {
    const SIZE: usize = BRANCH_ELEMENT_SIZE;

    fn at(page: &'a [u8], offset: usize) -> Result<Self> {
        slice_at(page, offset, Self::SIZE)?;
        Ok(Self { page, offset })
    }
}

impl<'a> BranchElement<'a> {
    /// Offset of this record from the start of the page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Distance from this record to its key bytes.
    pub fn pos(&self) -> u32 {
        read_u32(self.page, self.offset)
    }

    /// Key length.
    pub fn ksize(&self) -> u32 {
        read_u32(self.page, self.offset + 4)
    }

    /// Child page this key routes to.
    pub fn child(&self) -> PageId {
        PageId(read_u64(self.page, self.offset + 8))
    }

    /// Key bytes, borrowed from the page.
    pub fn key(&self) -> Result<&'a [u8]> {
        relative_slice(self.page, self.offset, u64::from(self.pos()), self.ksize())
    }
}

impl fmt::Debug for BranchElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchElement")
            .field("pos", &self.pos())
            .field("ksize", &self.ksize())
            .field("child", &self.child())
            .finish()
    }
}

/// Leaf record: `{ flags: u32, pos: u32, ksize: u32, vsize: u32 }`.
#[derive(Clone, Copy)]
pub struct LeafElement<'a> {
    page: &'a [u8],
    offset: usize,
}

impl<'a> ElementLayout<'a> for LeafElement<'a> {
    const SIZE: usize = LEAF_ELEMENT_SIZE;

    fn at(page: &'a [u8], offset: usize) -> Result<Self> {
        slice_at(page, offset, Self::SIZE)?;
        Ok(Self { page, offset })
    }
}

impl<'a> LeafElement<'a> {
    /// Offset of this record from the start of the page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Raw element flags.
    pub fn flags(&self) -> u32 {
        read_u32(self.page, self.offset)
    }

    /// Distance from this record to its key bytes.
    pub fn pos(&self) -> u32 {
        read_u32(self.page, self.offset + 4)
    }

    /// Key length.
    pub fn ksize(&self) -> u32 {
        read_u32(self.page, self.offset + 8)
    }

    /// Value length.
    pub fn vsize(&self) -> u32 {
        read_u32(self.page, self.offset + 12)
    }

    /// True when the entry is a nested sub-bucket rather than a plain value.
    pub fn is_bucket(&self) -> bool {
        self.flags() & BUCKET_LEAF_FLAG != 0
    }

    /// Key bytes, borrowed from the page.
    pub fn key(&self) -> Result<&'a [u8]> {
        relative_slice(self.page, self.offset, u64::from(self.pos()), self.ksize())
    }

    /// Value bytes, stored directly after the key.
    pub fn value(&self) -> Result<&'a [u8]> {
        let pos = u64::from(self.pos()) + u64::from(self.ksize());
        relative_slice(self.page, self.offset, pos, self.vsize())
    }
}

impl fmt::Debug for LeafElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafElement")
            .field("flags", &self.flags())
            .field("pos", &self.pos())
            .field("ksize", &self.ksize())
            .field("vsize", &self.vsize())
            .finish()
    }
}

/// Element array of a page, checked once against the page extent.
#[derive(Clone, Copy)]
pub struct Elements<'a, E> {
    page: &'a [u8],
    count: usize,
    _kind: PhantomData<E>,
}

impl<'a, E: ElementLayout<'a>> Elements<'a, E> {
    /// Views `count` records following the header of `page`.
    pub fn new(page: &'a [u8], count: usize) -> Result<Self> {
        let len = count.checked_mul(E::SIZE).ok_or(PageError::LayoutViolation {
            offset: PAGE_HEADER_SIZE,
            len: usize::MAX,
            extent: page.len(),
        })?;
        slice_at(page, PAGE_HEADER_SIZE, len)?;
        Ok(Self {
            page,
            count,
            _kind: PhantomData,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when the page holds no records.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Result<E> {
        if index >= self.count {
            return Err(PageError::OutOfRange {
                index,
                count: self.count,
            });
        }
        E::at(self.page, PAGE_HEADER_SIZE + index * E::SIZE)
    }

    /// Iterates the records in slot order.
    pub fn iter(&self) -> ElementIter<'a, E> {
        ElementIter {
            page: self.page,
            next: 0,
            count: self.count,
            _kind: PhantomData,
        }
    }
}

impl<'a, E: ElementLayout<'a>> IntoIterator for Elements<'a, E> {
    type Item = E;
    type IntoIter = ElementIter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E> fmt::Debug for Elements<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elements")
            .field("count", &self.count)
            .finish()
    }
}

/// Iterator over an [`Elements`] array.
pub struct ElementIter<'a, E> {
    page: &'a [u8],
    next: usize,
    count: usize,
    _kind: PhantomData<E>,
}

impl<'a, E: ElementLayout<'a>> Iterator for ElementIter<'a, E> {
    type Item = E;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        // The array was checked against the extent when `Elements` was built.
        let element = E::at(self.page, PAGE_HEADER_SIZE + self.next * E::SIZE).ok()?;
        self.next += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, E: ElementLayout<'a>> ExactSizeIterator for ElementIter<'a, E> {}
