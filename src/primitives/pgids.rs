#![forbid(unsafe_code)]
//! Sorted page-id sequences and the run-based merge used to combine them.
//!
//! Inputs are expected to be ascending with no duplicates inside a single
//! sequence. Values present in both inputs are kept twice: this is a merge,
//! not a deduplicating union.

use std::borrow::Cow;

use crate::types::PageId;

/// Returns the sorted merge of `a` and `b`.
///
/// When either side is empty the other is returned borrowed, so the result
/// may alias an input and no allocation happens.
pub fn merge<'a>(a: &'a [PageId], b: &'a [PageId]) -> Cow<'a, [PageId]> {
    if a.is_empty() {
        return Cow::Borrowed(b);
    }
    if b.is_empty() {
        return Cow::Borrowed(a);
    }
    let mut merged = vec![PageId::default(); a.len() + b.len()];
    merge_into(&mut merged, a, b);
    Cow::Owned(merged)
}

/// Writes the sorted merge of `a` and `b` into the front of `dst`.
///
/// # Panics
///
/// Panics if `dst` is shorter than `a.len() + b.len()`. Callers size `dst`
/// themselves, so a short buffer is a bug on their side.
///
/// In debug builds it also panics when `a` or `b` is not strictly ascending.
/// Release builds do not check ordering and merge whatever they are given.
pub fn merge_into(dst: &mut [PageId], a: &[PageId], b: &[PageId]) {
    assert!(
        dst.len() >= a.len() + b.len(),
        "merge_into bad len {} < {} + {}",
        dst.len(),
        a.len(),
        b.len()
    );
    debug_assert!(is_sorted_unique(a), "merge_into: left input not sorted");
    debug_assert!(is_sorted_unique(b), "merge_into: right input not sorted");

    if a.is_empty() {
        dst[..b.len()].copy_from_slice(b);
        return;
    }
    if b.is_empty() {
        dst[..a.len()].copy_from_slice(a);
        return;
    }

    let (mut lead, mut follow) = if b[0] < a[0] { (b, a) } else { (a, b) };
    let mut written = 0;
    while !lead.is_empty() {
        // Longest prefix of `lead` that is not ahead of follow's head.
        let run = lead.partition_point(|id| *id <= follow[0]);
        dst[written..written + run].copy_from_slice(&lead[..run]);
        written += run;
        if run >= lead.len() {
            break;
        }
        let rest = &lead[run..];
        lead = follow;
        follow = rest;
    }
    dst[written..written + follow.len()].copy_from_slice(follow);
}

/// Returns true when `ids` is strictly ascending.
pub fn is_sorted_unique(ids: &[PageId]) -> bool {
    ids.windows(2).all(|pair| pair[0] < pair[1])
}
