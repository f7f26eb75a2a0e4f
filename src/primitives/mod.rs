//! Dependency-free building blocks used by the page layer.

/// Sorted page-id sequences and their merge.
pub mod pgids;
