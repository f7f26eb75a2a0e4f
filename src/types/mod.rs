#![forbid(unsafe_code)]
//! Identifiers and error types shared by every page-layer module.

use std::fmt;

/// Page identifier: the page's offset in the file, in units of the page size.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct PageId(pub u64);

impl PageId {
    /// Returns the raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PageId {
    fn from(value: u64) -> Self {
        PageId(value)
    }
}

impl From<PageId> for u64 {
    fn from(value: PageId) -> Self {
        value.0
    }
}

/// Errors surfaced by page views, encoders and options.
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    /// Element index at or beyond the page's element count.
    #[error("element index {index} out of range (count {count})")]
    OutOfRange {
        /// Requested element index.
        index: usize,
        /// Element count recorded in the page header.
        count: usize,
    },
    /// A computed byte range falls outside the page extent.
    #[error("layout violation: {len} bytes at offset {offset} exceed page extent {extent}")]
    LayoutViolation {
        /// Start of the requested range, relative to the page base.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Bytes available to the page, overflow pages included.
        extent: usize,
    },
    /// Caller supplied an argument the layer cannot encode.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// Options could not be parsed.
    #[error("config: {0}")]
    Config(String),
    /// IO while loading options.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PageError>;
