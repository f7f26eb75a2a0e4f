#![allow(missing_docs)]

use std::collections::BTreeSet;

use cowpage::primitives::pgids::{is_sorted_unique, merge, merge_into};
use cowpage::PageId;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn ids(raw: impl IntoIterator<Item = u64>) -> Vec<PageId> {
    raw.into_iter().map(PageId).collect()
}

fn arb_id_set() -> impl Strategy<Value = Vec<PageId>> {
    prop::collection::btree_set(0u64..512, 0..64).prop_map(ids)
}

#[test]
fn merge_interleaved_preserves_shared_id() {
    let (a, b) = (ids([1, 3, 5, 9]), ids([2, 3, 7]));
    let merged = merge(&a, &b);
    assert_eq!(merged.len(), 7);
    assert_eq!(merged.as_ref(), ids([1, 2, 3, 3, 5, 7, 9]).as_slice());
}

#[test]
fn merge_of_long_interleaved_runs() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    let mut a = BTreeSet::new();
    let mut b = BTreeSet::new();
    let mut next = 0u64;
    for _ in 0..200 {
        let run = rng.gen_range(1..20);
        let target = if rng.gen_bool(0.5) { &mut a } else { &mut b };
        for _ in 0..run {
            target.insert(next);
            next += 1;
        }
    }
    let a = ids(a);
    let b = ids(b);
    let merged = merge(&a, &b);
    assert_eq!(merged.as_ref(), ids(0..next).as_slice());
    assert!(is_sorted_unique(&merged));
}

proptest! {
    #[test]
    fn merge_is_sorted_union(a in arb_id_set(), b in arb_id_set()) {
        let merged = merge(&a, &b);
        prop_assert_eq!(merged.len(), a.len() + b.len());
        prop_assert!(merged.windows(2).all(|w| w[0] <= w[1]));

        let mut expected: Vec<PageId> = a.iter().chain(b.iter()).copied().collect();
        expected.sort();
        prop_assert_eq!(merged.as_ref(), expected.as_slice());
    }

    #[test]
    fn merge_is_symmetric(a in arb_id_set(), b in arb_id_set()) {
        let ab = merge(&a, &b);
        let ba = merge(&b, &a);
        prop_assert_eq!(ab.as_ref(), ba.as_ref());
    }

    #[test]
    fn merge_with_empty_is_identity(a in arb_id_set()) {
        let none: Vec<PageId> = Vec::new();
        let left = merge(&a, &none);
        let right = merge(&none, &a);
        prop_assert_eq!(left.as_ref(), a.as_slice());
        prop_assert_eq!(right.as_ref(), a.as_slice());
    }

    #[test]
    fn merge_into_matches_merge(a in arb_id_set(), b in arb_id_set(), slack in 0usize..4) {
        let mut dst = vec![PageId(u64::MAX); a.len() + b.len() + slack];
        merge_into(&mut dst, &a, &b);
        let total = a.len() + b.len();
        let merged = merge(&a, &b);
        prop_assert_eq!(&dst[..total], merged.as_ref());
        prop_assert!(dst[total..].iter().all(|id| *id == PageId(u64::MAX)));
    }

    #[test]
    fn merge_into_short_dst_always_panics(a in arb_id_set(), b in arb_id_set()) {
        prop_assume!(!a.is_empty() || !b.is_empty());
        let result = std::panic::catch_unwind(|| {
            let mut dst = vec![PageId(0); a.len() + b.len() - 1];
            merge_into(&mut dst, &a, &b);
            dst
        });
        prop_assert!(result.is_err());
    }
}
