//! Page encoding and page-id set algebra for a copy-on-write B+tree store.
//!
//! A database file is a run of fixed-size pages. This crate interprets the
//! bytes at a page boundary as typed, borrowed views (branch and leaf element
//! arrays, the meta region, diagnostic summaries) and merges the sorted page-id
//! lists produced when freed pages are released.

#![warn(missing_docs)]

pub mod primitives;
pub mod storage;
pub mod types;

pub use primitives::pgids::{merge, merge_into};
pub use storage::options::PageOptions;
pub use storage::page::{Page, PageInfo, PageSpace};
pub use types::{PageError, PageId, Result};
