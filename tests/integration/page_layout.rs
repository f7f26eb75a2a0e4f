#![allow(missing_docs)]

use cowpage::storage::page::{
    type_name, BranchPageBuilder, LeafPageBuilder, Page, PageHeader, PageInfo, PageKind,
    PageSpace, BRANCH_PAGE_FLAG, FREELIST_PAGE_FLAG, LEAF_ELEMENT_SIZE, LEAF_PAGE_FLAG,
    META_PAGE_FLAG, PAGE_HEADER_SIZE,
};
use cowpage::{PageError, PageId, PageOptions, Result};
use proptest::prelude::*;

fn arb_entries() -> impl Strategy<Value = Vec<(Vec<u8>, Vec<u8>)>> {
    prop::collection::btree_map(
        prop::collection::vec(any::<u8>(), 0..24),
        prop::collection::vec(any::<u8>(), 0..300),
        0..40,
    )
    .prop_map(|map| map.into_iter().collect::<Vec<_>>())
}

fn read_leaf(page: &Page<'_>) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    page.leaf_elements()?
        .iter()
        .map(|element| -> Result<(Vec<u8>, Vec<u8>)> {
            Ok((element.key()?.to_vec(), element.value()?.to_vec()))
        })
        .collect()
}

#[test]
fn file_of_mixed_pages_reads_back() -> Result<()> {
    let options = PageOptions::with_page_size(1024);
    let mut meta = vec![0u8; 1024];
    PageHeader::new(PageId(0), PageKind::Meta).encode(&mut meta)?;
    meta[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + 4].copy_from_slice(b"ROOT");

    let mut freelist = vec![0u8; 1024];
    PageHeader::new(PageId(1), PageKind::Freelist)
        .with_count(2)
        .encode(&mut freelist)?;

    let mut branch = BranchPageBuilder::new(&options);
    branch.push(b"apple", PageId(3)).push(b"mango", PageId(4));

    let mut left = LeafPageBuilder::new(&options);
    left.push(b"apple", b"red").push(b"banana", b"yellow");
    let mut right = LeafPageBuilder::new(&options);
    right.push(b"mango", b"orange").push_bucket(b"nested", b"");

    let data = [
        meta,
        freelist,
        branch.build(PageId(2))?,
        left.build(PageId(3))?,
        right.build(PageId(4))?,
    ]
    .concat();
    let space = PageSpace::new(&data, &options)?;

    let names: Vec<String> = space
        .pages()
        .map(|page| page.map(|p| p.type_name().into_owned()))
        .collect::<Result<_>>()?;
    assert_eq!(names, ["meta", "freelist", "branch", "leaf", "leaf"]);

    assert_eq!(&space.page(PageId(0))?.meta()?[..4], b"ROOT");

    let root = space.page(PageId(2))?;
    let mut routed = Vec::new();
    for element in root.branch_elements()? {
        let child = space.page(element.child())?;
        routed.push((element.key()?.to_vec(), read_leaf(&child)?));
    }
    assert_eq!(routed[0].0, b"apple");
    assert_eq!(routed[0].1[1], (b"banana".to_vec(), b"yellow".to_vec()));
    assert_eq!(routed[1].1[0], (b"mango".to_vec(), b"orange".to_vec()));
    assert!(space.page(PageId(4))?.leaf_element(1)?.is_bucket());
    Ok(())
}

#[test]
fn type_names_cover_every_flag() {
    assert_eq!(type_name(BRANCH_PAGE_FLAG), "branch");
    assert_eq!(type_name(LEAF_PAGE_FLAG), "leaf");
    assert_eq!(type_name(META_PAGE_FLAG), "meta");
    assert_eq!(type_name(FREELIST_PAGE_FLAG), "freelist");
    let unknown = type_name(0x08);
    assert!(unknown.contains("unknown"));
    assert!(unknown.contains("08"));
}

#[test]
fn page_info_serializes_with_display_names() -> Result<()> {
    let options = PageOptions::default();
    let mut builder = LeafPageBuilder::new(&options);
    builder.push(b"a", b"1").push(b"b", b"2").push(b"c", b"3");
    let buf = builder.build(PageId(5))?;
    let info = Page::new(&buf)?.info();
    assert_eq!(
        info,
        PageInfo {
            id: 5,
            page_type: "leaf".into(),
            count: 3,
            overflow_count: 0,
        }
    );
    let json = serde_json::to_value(&info).expect("serialize page info");
    assert_eq!(
        json,
        serde_json::json!({"ID": 5, "Type": "leaf", "Count": 3, "OverflowCount": 0})
    );
    Ok(())
}

#[test]
fn corrupted_pos_cannot_escape_page() -> Result<()> {
    let options = PageOptions::with_page_size(512);
    let mut builder = LeafPageBuilder::new(&options);
    builder.push(b"key", b"value");
    let mut buf = builder.build(PageId(1))?;
    // Point the key 600 bytes past the slot, beyond the 512-byte page.
    let pos_at = PAGE_HEADER_SIZE + 4;
    buf[pos_at..pos_at + 4].copy_from_slice(&600u32.to_le_bytes());
    let page = Page::new(&buf)?;
    let element = page.leaf_element(0)?;
    assert!(matches!(element.key(), Err(PageError::LayoutViolation { .. })));
    assert!(matches!(element.value(), Err(PageError::LayoutViolation { .. })));
    Ok(())
}

#[test]
fn count_larger_than_page_is_layout_violation() -> Result<()> {
    let mut buf = vec![0u8; 512];
    PageHeader::new(PageId(1), PageKind::Leaf)
        .with_count(u16::MAX)
        .encode(&mut buf)?;
    let page = Page::new(&buf)?;
    let fits = (512 - PAGE_HEADER_SIZE) / LEAF_ELEMENT_SIZE;
    assert!(page.leaf_element(fits - 1).is_ok());
    assert!(matches!(
        page.leaf_element(fits),
        Err(PageError::LayoutViolation { .. })
    ));
    assert!(matches!(
        page.leaf_element(usize::from(u16::MAX)),
        Err(PageError::OutOfRange { .. })
    ));
    Ok(())
}

proptest! {
    #[test]
    fn leaf_pairs_roundtrip(entries in arb_entries()) {
        let options = PageOptions::with_page_size(512);
        let mut builder = LeafPageBuilder::new(&options);
        for (key, value) in &entries {
            builder.push(key, value);
        }
        let buf = builder.build(PageId(7)).expect("encode leaf");
        prop_assert_eq!(buf.len() % 512, 0);
        let page = Page::new(&buf).expect("view leaf");
        prop_assert_eq!(usize::from(page.count()), entries.len());
        prop_assert_eq!(buf.len(), (page.overflow() as usize + 1) * 512);
        for element in page.leaf_elements().expect("elements") {
            prop_assert_eq!(element.key().expect("key").len(), element.ksize() as usize);
            prop_assert_eq!(element.value().expect("value").len(), element.vsize() as usize);
        }
        prop_assert_eq!(read_leaf(&page).expect("read back"), entries);
    }

    #[test]
    fn branch_routes_roundtrip(
        keys in prop::collection::btree_set(prop::collection::vec(any::<u8>(), 1..32), 0..60)
    ) {
        let options = PageOptions::with_page_size(1024);
        let keys: Vec<Vec<u8>> = keys.into_iter().collect();
        let mut builder = BranchPageBuilder::new(&options);
        for (idx, key) in keys.iter().enumerate() {
            builder.push(key, PageId(100 + idx as u64));
        }
        let buf = builder.build(PageId(1)).expect("encode branch");
        let page = Page::new(&buf).expect("view branch");
        let elements = page.branch_elements().expect("elements");
        prop_assert_eq!(elements.len(), keys.len());
        for (idx, key) in keys.iter().enumerate() {
            let element = elements.get(idx).expect("element");
            prop_assert_eq!(element.key().expect("key"), key.as_slice());
            prop_assert_eq!(element.child(), PageId(100 + idx as u64));
        }
    }
}
