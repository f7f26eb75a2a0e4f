//! Page-id to byte-range resolution over a mapped buffer.

use tracing::{debug, trace};

use super::header::PageHeader;
use super::view::slice_at;
use super::Page;
use crate::storage::options::PageOptions;
use crate::types::{PageError, PageId, Result};

/// A buffer of consecutive pages, such as a memory-mapped database file.
///
/// The buffer is only borrowed; every [`Page`] handed out lives no longer
/// than the mapping it came from.
#[derive(Clone, Copy, Debug)]
pub struct PageSpace<'a> {
    data: &'a [u8],
    page_size: usize,
}

impl<'a> PageSpace<'a> {
    /// Wraps `data` using the page size from `options`.
    pub fn new(data: &'a [u8], options: &PageOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            data,
            page_size: options.page_size,
        })
    }

    /// Configured page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whole pages present in the buffer.
    pub fn page_count(&self) -> u64 {
        (self.data.len() / self.page_size) as u64
    }

    /// Resolves `id` to a view spanning the page and its overflow pages.
    pub fn page(&self, id: PageId) -> Result<Page<'a>> {
        let base = usize::try_from(id.0)
            .ok()
            .and_then(|raw| raw.checked_mul(self.page_size))
            .ok_or(PageError::LayoutViolation {
                offset: usize::MAX,
                len: self.page_size,
                extent: self.data.len(),
            })?;
        let head = slice_at(self.data, base, self.page_size)?;
        let header = PageHeader::decode(head)?;
        if header.id != id {
            debug!(
                requested = id.0,
                stored = header.id.0,
                "page header id mismatch"
            );
        }
        let len = usize::try_from(header.span())
            .ok()
            .and_then(|span| span.checked_mul(self.page_size))
            .ok_or(PageError::LayoutViolation {
                offset: base,
                len: usize::MAX,
                extent: self.data.len(),
            })?;
        let extent = slice_at(self.data, base, len).inspect_err(|_| {
            debug!(
                page = id.0,
                overflow = header.overflow,
                buffer = self.data.len(),
                "page extent runs past buffer"
            );
        })?;
        trace!(
            page = id.0,
            flags = header.flags,
            overflow = header.overflow,
            "resolved page"
        );
        Page::new(extent)
    }

    /// Iterates page heads in id order, stepping over overflow pages.
    pub fn pages(&self) -> PageHeads<'a> {
        PageHeads {
            space: *self,
            next: 0,
            done: false,
        }
    }
}

/// Iterator returned by [`PageSpace::pages`]. Stops after the first error.
#[derive(Debug)]
pub struct PageHeads<'a> {
    space: PageSpace<'a>,
    next: u64,
    done: bool,
}

impl<'a> Iterator for PageHeads<'a> {
    type Item = Result<Page<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= self.space.page_count() {
            return None;
        }
        match self.space.page(PageId(self.next)) {
            Ok(page) => {
                self.next = self.next.saturating_add(page.header().span());
                Some(Ok(page))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
