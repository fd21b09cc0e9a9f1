use super::*;

use crate::foundation::core::{ExtensionId, UnitId};
use crate::layout::StaticLayout;
use crate::layout::model::DeclaredUnit;
use crate::reduce::reduce;
use crate::unit::RenderType;

fn sample_tree() -> RenderTree {
    let host = StaticLayout::new(80, 60)
        .with_unit(Arc::new(DeclaredUnit::new(UnitId(1), RenderType::Host)))
        .with_child(
            10,
            20,
            StaticLayout::new(30, 30)
                .with_unit(Arc::new(DeclaredUnit::new(UnitId(2), RenderType::Content))),
        );
    let root = StaticLayout::new(100, 100).with_child(5, 5, host);
    reduce(&root, 320, 240, &[]).unwrap()
}

#[test]
fn arena_links_parents_and_children_by_position() {
    let tree = sample_tree();
    assert_eq!(tree.len(), 3);
    assert!(!tree.is_empty());

    let root = tree.root();
    assert_eq!(root.index(), 0);
    assert_eq!(root.parent(), None);
    assert_eq!(root.children(), &[1]);
    assert_eq!(root.child_count(), 1);

    let host = tree.node_at(1).unwrap();
    assert_eq!(host.parent(), Some(0));
    assert_eq!(host.children(), &[2]);

    let leaf = tree.node_at(2).unwrap();
    assert_eq!(leaf.parent(), Some(1));
    assert_eq!(leaf.children(), &[] as &[usize]);
}

#[test]
fn absolute_bounds_derive_from_origin_and_size() {
    let tree = sample_tree();

    let host = tree.node_at(1).unwrap();
    assert_eq!(host.bounds(), Rect::from_origin_size(5, 5, 80, 60));
    assert_eq!(host.absolute_bounds(), Rect::from_origin_size(5, 5, 80, 60));

    let leaf = tree.node_at(2).unwrap();
    assert_eq!(leaf.bounds(), Rect::from_origin_size(10, 20, 30, 30));
    assert_eq!(leaf.absolute_origin(), Point::new(15, 25));
    assert_eq!(leaf.absolute_bounds(), Rect::from_origin_size(15, 25, 30, 30));
}

#[test]
fn snapshot_keeps_specs_and_rejects_unknown_lookups() {
    let tree = sample_tree();
    assert_eq!(tree.width_spec(), 320);
    assert_eq!(tree.height_spec(), 240);
    assert!(tree.node_at(tree.len()).is_none());
    assert!(tree.extension_state(ExtensionId(99)).is_none());
}
