#![forbid(unsafe_code)]
//! Typed views over raw page bytes.
//!
//! A [`Page`] borrows the bytes of one page, overflow pages included, from a
//! buffer owned by the mapping layer. Nothing here copies page contents: keys,
//! values and element records are all slices of that buffer and carry its
//! lifetime, so a view cannot outlive the mapping it was taken from.

use std::borrow::Cow;

use tracing::debug;

use crate::types::{PageError, PageId, Result};

pub mod builder;
pub mod element;
pub mod header;
pub mod info;
pub mod space;
pub mod view;

pub use builder::{BranchPageBuilder, LeafPageBuilder};
pub use element::{
    BranchElement, ElementIter, ElementLayout, Elements, LeafElement, BRANCH_ELEMENT_SIZE,
    BUCKET_LEAF_FLAG, LEAF_ELEMENT_SIZE, MIN_KEYS_PER_PAGE,
};
pub use header::{
    type_name, PageHeader, PageKind, BRANCH_PAGE_FLAG, FREELIST_PAGE_FLAG, LEAF_PAGE_FLAG,
    META_PAGE_FLAG, PAGE_HEADER_SIZE,
};
pub use info::PageInfo;
pub use space::PageSpace;

/// Read-only view of a page and its overflow pages.
#[derive(Clone, Copy)]
pub struct Page<'a> {
    buf: &'a [u8],
    header: PageHeader,
}

impl<'a> Page<'a> {
    /// Views `buf` as a page. `buf` must start at the page base and span
    /// every byte the page may reference.
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        let header = PageHeader::decode(buf)?;
        Ok(Self { buf, header })
    }

    /// Decoded header.
    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    /// Page id.
    pub fn id(&self) -> PageId {
        self.header.id
    }

    /// Raw kind flags.
    pub fn flags(&self) -> u16 {
        self.header.flags
    }

    /// Element or record count.
    pub fn count(&self) -> u16 {
        self.header.count
    }

    /// Extra contiguous pages.
    pub fn overflow(&self) -> u32 {
        self.header.overflow
    }

    /// Recognized kind, if any.
    pub fn kind(&self) -> Option<PageKind> {
        self.header.kind()
    }

    /// See [`type_name`].
    pub fn type_name(&self) -> Cow<'static, str> {
        self.header.type_name()
    }

    /// Bytes available to this view.
    pub fn extent(&self) -> usize {
        self.buf.len()
    }

    /// Whole page, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Region after the header where the meta structure lives.
    pub fn meta(&self) -> Result<&'a [u8]> {
        view::slice_at(
            self.buf,
            PAGE_HEADER_SIZE,
            self.buf.len().saturating_sub(PAGE_HEADER_SIZE),
        )
    }

    /// Branch record at `index`.
    pub fn branch_element(&self, index: usize) -> Result<BranchElement<'a>> {
        self.element_at(index)
    }

    /// All branch records.
    pub fn branch_elements(&self) -> Result<Elements<'a, BranchElement<'a>>> {
        Elements::new(self.buf, usize::from(self.header.count))
    }

    /// Leaf record at `index`.
    pub fn leaf_element(&self, index: usize) -> Result<LeafElement<'a>> {
        self.element_at(index)
    }

    /// All leaf records.
    pub fn leaf_elements(&self) -> Result<Elements<'a, LeafElement<'a>>> {
        Elements::new(self.buf, usize::from(self.header.count))
    }

    fn element_at<E: ElementLayout<'a>>(&self, index: usize) -> Result<E> {
        let count = usize::from(self.header.count);
        if index >= count {
            return Err(PageError::OutOfRange { index, count });
        }
        E::at(self.buf, PAGE_HEADER_SIZE + index * E::SIZE)
    }

    /// Lowercase hex of the first `n` bytes of the page. Debug output only.
    pub fn hexdump(&self, n: usize) -> Result<String> {
        Ok(hex::encode(view::slice_at(self.buf, 0, n)?))
    }

    /// Diagnostic summary.
    pub fn info(&self) -> PageInfo {
        PageInfo::from(&self.header)
    }

    /// Emits the summary and a dump of the first `n` bytes at debug level.
    pub fn trace_dump(&self, n: usize) {
        let info = self.info();
        let n = n.min(self.buf.len());
        let dump = hex::encode(&self.buf[..n]);
        debug!(
            page = info.id,
            page_type = %info.page_type,
            count = info.count,
            overflow = info.overflow_count,
            dump = %dump,
            "page dump"
        );
    }
}

impl std::fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("header", &self.header)
            .field("extent", &self.buf.len())
            .finish()
    }
}

/// Orders page views by id.
pub fn sort_pages(pages: &mut [Page<'_>]) {
    pages.sort_by_key(|page| page.id());
}
