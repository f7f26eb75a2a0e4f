//! Encoders producing branch and leaf page images.
//!
//! An image is laid out as header, element array, then the packed key and
//! value bytes in element order. Each element's `pos` is the distance from the
//! element slot to its key. Images are zero-filled to a whole number of pages
//! and the header's `overflow` records the pages beyond the first.

use super::element::{BRANCH_ELEMENT_SIZE, BUCKET_LEAF_FLAG, LEAF_ELEMENT_SIZE};
use super::header::{PageHeader, PageKind, PAGE_HEADER_SIZE};
use super::view::{slice_at_mut, write_u32, write_u64};
use crate::storage::options::PageOptions;
use crate::types::{PageError, PageId, Result};

/// Pages needed to hold `total` bytes, returned as the overflow count.
fn overflow_for(total: usize, options: &PageOptions) -> Result<u32> {
    options.validate()?;
    let pages = total.div_ceil(options.page_size).max(1);
    u32::try_from(pages - 1)
        .map_err(|_| PageError::Invalid("page image needs too many overflow pages"))
}

/// Bytes in an image of `header.span()` pages.
fn image_len(header: &PageHeader, page_size: usize) -> Result<usize> {
    usize::try_from(header.span())
        .ok()
        .and_then(|span| span.checked_mul(page_size))
        .ok_or(PageError::Invalid("page image larger than addressable memory"))
}

fn len_u32(len: usize, what: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| PageError::Invalid(what))
}

fn count_u16(count: usize) -> Result<u16> {
    u16::try_from(count).map_err(|_| PageError::Invalid("too many elements for one page"))
}

/// Writes `bytes` at `offset` of `dst`, returning the offset after them.
fn put_bytes(dst: &mut [u8], offset: usize, bytes: &[u8]) -> Result<usize> {
    slice_at_mut(dst, offset, bytes.len())?.copy_from_slice(bytes);
    Ok(offset + bytes.len())
}

#[derive(Clone, Copy, Debug)]
struct LeafEntry<'k> {
    flags: u32,
    key: &'k [u8],
    value: &'k [u8],
}

/// Collects leaf entries and encodes them as one page image.
#[derive(Clone, Debug)]
pub struct LeafPageBuilder<'k> {
    options: PageOptions,
    entries: Vec<LeafEntry<'k>>,
}

impl<'k> LeafPageBuilder<'k> {
    /// Builder producing pages of `options.page_size` bytes. The options
    /// are validated when a header or image is produced.
    pub fn new(options: &PageOptions) -> Self {
        Self {
            options: options.clone(),
            entries: Vec::new(),
        }
    }

    /// Appends a plain key/value entry. Entries are written in push order;
    /// callers push keys ascending.
    pub fn push(&mut self, key: &'k [u8], value: &'k [u8]) -> &mut Self {
        self.entries.push(LeafEntry {
            flags: 0,
            key,
            value,
        });
        self
    }

    /// Appends a sub-bucket entry whose value is the bucket's inline header.
    pub fn push_bucket(&mut self, key: &'k [u8], value: &'k [u8]) -> &mut Self {
        self.entries.push(LeafEntry {
            flags: BUCKET_LEAF_FLAG,
            key,
            value,
        });
        self
    }

    /// Number of entries pushed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoded size before padding to whole pages.
    pub fn encoded_len(&self) -> usize {
        let data: usize = self
            .entries
            .iter()
            .map(|entry| entry.key.len() + entry.value.len())
            .sum();
        PAGE_HEADER_SIZE + self.entries.len() * LEAF_ELEMENT_SIZE + data
    }

    /// Header the image for `id` will carry.
    pub fn header(&self, id: PageId) -> Result<PageHeader> {
        Ok(PageHeader::new(id, PageKind::Leaf)
            .with_count(count_u16(self.entries.len())?)
            .with_overflow(overflow_for(self.encoded_len(), &self.options)?))
    }

    /// Encodes the page into a fresh, page-aligned buffer.
    pub fn build(&self, id: PageId) -> Result<Vec<u8>> {
        let header = self.header(id)?;
        let mut buf = vec![0u8; image_len(&header, self.options.page_size)?];
        self.write_into(id, &mut buf)?;
        Ok(buf)
    }

    /// Encodes the page into `dst`, which must cover the whole image.
    pub fn write_into(&self, id: PageId, dst: &mut [u8]) -> Result<PageHeader> {
        let header = self.header(id)?;
        header.encode(dst)?;
        let mut data = PAGE_HEADER_SIZE + self.entries.len() * LEAF_ELEMENT_SIZE;
        for (idx, entry) in self.entries.iter().enumerate() {
            let slot_off = PAGE_HEADER_SIZE + idx * LEAF_ELEMENT_SIZE;
            let slot = slice_at_mut(dst, slot_off, LEAF_ELEMENT_SIZE)?;
            write_u32(slot, 0, entry.flags);
            write_u32(slot, 4, len_u32(data - slot_off, "element offset exceeds u32")?);
            write_u32(slot, 8, len_u32(entry.key.len(), "key longer than u32")?);
            write_u32(slot, 12, len_u32(entry.value.len(), "value longer than u32")?);
            data = put_bytes(dst, data, entry.key)?;
            data = put_bytes(dst, data, entry.value)?;
        }
        Ok(header)
    }
}

#[derive(Clone, Copy, Debug)]
struct BranchEntry<'k> {
    key: &'k [u8],
    child: PageId,
}

/// Collects routing keys and encodes them as one branch page image.
#[derive(Clone, Debug)]
pub struct BranchPageBuilder<'k> {
    options: PageOptions,
    entries: Vec<BranchEntry<'k>>,
}

impl<'k> BranchPageBuilder<'k> {
    /// Builder producing pages of `options.page_size` bytes. The options
    /// are validated when a header or image is produced.
    pub fn new(options: &PageOptions) -> Self {
        Self {
            options: options.clone(),
            entries: Vec::new(),
        }
    }

    /// Appends a key routing to `child`.
    pub fn push(&mut self, key: &'k [u8], child: PageId) -> &mut Self {
        self.entries.push(BranchEntry { key, child });
        self
    }

    /// Number of entries pushed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoded size before padding to whole pages.
    pub fn encoded_len(&self) -> usize {
        let keys: usize = self.entries.iter().map(|entry| entry.key.len()).sum();
        PAGE_HEADER_SIZE + self.entries.len() * BRANCH_ELEMENT_SIZE + keys
    }

    /// Header the image for `id` will carry.
    pub fn header(&self, id: PageId) -> Result<PageHeader> {
        Ok(PageHeader::new(id, PageKind::Branch)
            .with_count(count_u16(self.entries.len())?)
            .with_overflow(overflow_for(self.encoded_len(), &self.options)?))
    }

    /// Encodes the page into a fresh, page-aligned buffer.
    pub fn build(&self, id: PageId) -> Result<Vec<u8>> {
        let header = self.header(id)?;
        let mut buf = vec![0u8; image_len(&header, self.options.page_size)?];
        self.write_into(id, &mut buf)?;
        Ok(buf)
    }

    /// Encodes the page into `dst`, which must cover the whole image.
    pub fn write_into(&self, id: PageId, dst: &mut [u8]) -> Result<PageHeader> {
        let header = self.header(id)?;
        header.encode(dst)?;
        let mut data = PAGE_HEADER_SIZE + self.entries.len() * BRANCH_ELEMENT_SIZE;
        for (idx, entry) in self.entries.iter().enumerate() {
            let slot_off = PAGE_HEADER_SIZE + idx * BRANCH_ELEMENT_SIZE;
            let slot = slice_at_mut(dst, slot_off, BRANCH_ELEMENT_SIZE)?;
            write_u32(slot, 0, len_u32(data - slot_off, "element offset exceeds u32")?);
            write_u32(slot, 4, len_u32(entry.key.len(), "key longer than u32")?);
            write_u64(slot, 8, entry.child.0);
            data = put_bytes(dst, data, entry.key)?;
        }
        Ok(header)
    }
}
