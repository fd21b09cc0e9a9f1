use super::*;

use std::sync::Arc;

use crate::extension::{ExtensionState, LayoutVisitor, MountExtension, RenderExtension};
use crate::foundation::core::{EdgeInsets, ExtensionId, UnitId};
use crate::layout::StaticLayout;
use crate::layout::model::DeclaredUnit;
use crate::unit::RenderType;

fn content_unit(id: u64) -> Arc<dyn RenderUnit> {
    Arc::new(DeclaredUnit::new(UnitId(id), RenderType::Content))
}

fn host_unit(id: u64) -> Arc<dyn RenderUnit> {
    Arc::new(DeclaredUnit::new(UnitId(id), RenderType::Host))
}

fn leaf(id: u64, width: i32, height: i32) -> StaticLayout {
    StaticLayout::new(width, height).with_unit(content_unit(id))
}

#[test]
fn host_and_leaf_flatten_in_preorder() {
    let host = StaticLayout::new(100, 50)
        .with_unit(host_unit(1))
        .with_child(10, 10, leaf(2, 20, 20));
    let root = StaticLayout::new(100, 50).with_child(0, 0, host);

    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(tree.len(), 3);

    let root_node = tree.root();
    assert_eq!(root_node.unit().id(), UnitId::ROOT_HOST);
    assert_eq!(root_node.unit().render_type(), RenderType::Host);
    assert_eq!(root_node.bounds(), Rect::from_origin_size(0, 0, 100, 50));

    let host_node = tree.node_at(1).unwrap();
    assert_eq!(host_node.unit().id(), UnitId(1));
    assert_eq!(host_node.parent(), Some(0));
    assert_eq!(host_node.children(), &[2]);

    let leaf_node = tree.node_at(2).unwrap();
    assert_eq!(leaf_node.unit().id(), UnitId(2));
    assert_eq!(leaf_node.bounds(), Rect::new(10, 10, 30, 30).unwrap());
    assert_eq!(leaf_node.absolute_bounds(), Rect::new(10, 10, 30, 30).unwrap());
    assert_eq!(leaf_node.parent(), Some(1));
}

#[test]
fn transparent_chain_compounds_offsets() {
    let inner = StaticLayout::new(50, 50).with_child(3, 3, leaf(1, 10, 10));
    let root = StaticLayout::new(100, 100).with_child(5, 5, inner);

    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(tree.len(), 2);

    let leaf_node = tree.node_at(1).unwrap();
    assert_eq!(leaf_node.bounds().origin(), Point::new(8, 8));
    assert_eq!(leaf_node.absolute_origin(), Point::new(8, 8));
    // Transparent nodes never open a new parent.
    assert_eq!(leaf_node.parent(), Some(0));
}

#[test]
fn host_boundary_resets_translation() {
    let host = StaticLayout::new(40, 40)
        .with_unit(host_unit(1))
        .with_child(1, 1, leaf(2, 10, 10));
    let inner = StaticLayout::new(50, 50).with_child(2, 2, host);
    let root = StaticLayout::new(100, 100).with_child(4, 4, inner);

    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(tree.len(), 3);

    let host_node = tree.node_at(1).unwrap();
    assert_eq!(host_node.bounds().origin(), Point::new(6, 6));
    assert_eq!(host_node.absolute_origin(), Point::new(6, 6));

    let leaf_node = tree.node_at(2).unwrap();
    assert_eq!(leaf_node.bounds(), Rect::from_origin_size(1, 1, 10, 10));
    assert_eq!(leaf_node.absolute_origin(), Point::new(7, 7));
}

#[test]
fn zero_size_subtree_is_pruned_entirely() {
    let zero = StaticLayout::new(0, 0)
        .with_unit(content_unit(1))
        .with_child(1, 1, leaf(2, 20, 20));
    let root = StaticLayout::new(100, 100).with_child(0, 0, zero);

    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(tree.len(), 1);
}

#[test]
fn zero_size_root_still_produces_root_node() {
    let root = StaticLayout::new(0, 0);
    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.root().unit().id(), UnitId::ROOT_HOST);
    assert!(tree.root().bounds().is_empty());
}

#[test]
fn index_always_matches_position() {
    let host = StaticLayout::new(80, 80)
        .with_unit(host_unit(1))
        .with_child(0, 0, leaf(2, 10, 10))
        .with_child(10, 0, leaf(3, 10, 10));
    let root = StaticLayout::new(100, 100)
        .with_child(0, 0, host)
        .with_child(0, 80, leaf(4, 20, 20));

    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(tree.len(), 5);
    for i in 0..tree.len() {
        assert_eq!(tree.node_at(i).unwrap().index(), i);
    }
}

#[test]
fn reduce_is_idempotent_over_the_same_layout() {
    let host = StaticLayout::new(80, 80)
        .with_unit(host_unit(1))
        .with_child(7, 9, leaf(2, 10, 10));
    let root = StaticLayout::new(100, 100).with_child(3, 4, host);

    let a = reduce(&root, 0, 0, &[]).unwrap();
    let b = reduce(&root, 0, 0, &[]).unwrap();

    assert_eq!(a.len(), b.len());
    for i in 0..a.len() {
        let na = a.node_at(i).unwrap();
        let nb = b.node_at(i).unwrap();
        assert_eq!(na.unit().id(), nb.unit().id());
        assert_eq!(na.bounds(), nb.bounds());
        assert_eq!(na.absolute_origin(), nb.absolute_origin());
        assert_eq!(na.parent(), nb.parent());
    }
}

#[test]
fn padding_is_captured_only_when_nonzero() {
    let padded = StaticLayout::new(10, 10)
        .with_unit(content_unit(1))
        .with_padding(EdgeInsets::new(1, 2, 3, 4));
    let unpadded = StaticLayout::new(10, 10)
        .with_unit(content_unit(2))
        .with_padding(EdgeInsets::default());
    let root = StaticLayout::new(100, 100)
        .with_child(0, 0, padded)
        .with_child(20, 0, unpadded);

    let tree = reduce(&root, 0, 0, &[]).unwrap();
    assert_eq!(
        tree.node_at(1).unwrap().padding(),
        Some(EdgeInsets::new(1, 2, 3, 4))
    );
    assert_eq!(tree.node_at(2).unwrap().padding(), None);
}

#[test]
fn specs_are_stored_on_the_tree() {
    let tree = reduce(&StaticLayout::new(10, 10), 640, 480, &[]).unwrap();
    assert_eq!(tree.width_spec(), 640);
    assert_eq!(tree.height_spec(), 480);
}

struct LyingLayout;

impl LayoutResult for LyingLayout {
    fn width(&self) -> i32 {
        10
    }

    fn height(&self) -> i32 {
        10
    }

    fn child_count(&self) -> usize {
        1
    }

    fn child_at(&self, _index: usize) -> Option<&dyn LayoutResult> {
        None
    }

    fn x_for_child(&self, _index: usize) -> i32 {
        0
    }

    fn y_for_child(&self, _index: usize) -> i32 {
        0
    }
}

#[test]
fn missing_claimed_child_is_a_structure_error() {
    let err = reduce(&LyingLayout, 0, 0, &[]).unwrap_err();
    assert!(matches!(err, TrellisError::Structure(_)));
}

struct NegativeLayout;

impl LayoutResult for NegativeLayout {
    fn width(&self) -> i32 {
        -1
    }

    fn height(&self) -> i32 {
        10
    }

    fn child_count(&self) -> usize {
        0
    }

    fn child_at(&self, _index: usize) -> Option<&dyn LayoutResult> {
        None
    }

    fn x_for_child(&self, _index: usize) -> i32 {
        0
    }

    fn y_for_child(&self, _index: usize) -> i32 {
        0
    }
}

#[test]
fn negative_size_is_a_structure_error() {
    let err = reduce(&NegativeLayout, 0, 0, &[]).unwrap_err();
    assert!(matches!(err, TrellisError::Structure(_)));
}

const BOUNDS_ID: ExtensionId = ExtensionId(11);

/// Collects `(bounds, absolute_origin)` for every visited layout node.
struct BoundsCollector;

impl RenderExtension for BoundsCollector {
    fn id(&self) -> ExtensionId {
        BOUNDS_ID
    }

    fn create_state(&self) -> ExtensionState {
        Box::new(Vec::<(Rect, Point)>::new())
    }

    fn layout_visitor(&self) -> Option<&dyn LayoutVisitor> {
        Some(self)
    }
}

impl LayoutVisitor for BoundsCollector {
    fn visit(
        &self,
        _layout: &dyn LayoutResult,
        bounds: Rect,
        absolute_origin: Point,
        state: &mut ExtensionState,
    ) -> TrellisResult<()> {
        if let Some(visits) = state.downcast_mut::<Vec<(Rect, Point)>>() {
            visits.push((bounds, absolute_origin));
        }
        Ok(())
    }
}

#[test]
fn visitors_see_transparent_nodes_but_not_pruned_ones() {
    let inner = StaticLayout::new(50, 50).with_child(3, 3, leaf(1, 10, 10));
    let root = StaticLayout::new(100, 100)
        .with_child(5, 5, inner)
        .with_child(90, 90, StaticLayout::new(0, 0).with_unit(content_unit(2)));

    let extensions: Vec<Arc<dyn RenderExtension>> = vec![Arc::new(BoundsCollector)];
    let tree = reduce(&root, 0, 0, &extensions).unwrap();

    let visits = tree
        .extension_state(BOUNDS_ID)
        .and_then(|s| s.downcast_ref::<Vec<(Rect, Point)>>())
        .unwrap();

    // Root layout, transparent wrapper and leaf; the zero-size child is
    // pruned before visitation.
    assert_eq!(visits.len(), 3);
    assert_eq!(visits[0].0, Rect::from_origin_size(0, 0, 100, 100));
    assert_eq!(visits[1].0, Rect::from_origin_size(5, 5, 50, 50));
    assert_eq!(visits[2].0, Rect::from_origin_size(8, 8, 10, 10));
    assert_eq!(visits[2].1, Point::new(8, 8));
}

const FAILING_ID: ExtensionId = ExtensionId(12);

struct FailingVisitor;

impl RenderExtension for FailingVisitor {
    fn id(&self) -> ExtensionId {
        FAILING_ID
    }

    fn create_state(&self) -> ExtensionState {
        Box::new(())
    }

    fn layout_visitor(&self) -> Option<&dyn LayoutVisitor> {
        Some(self)
    }
}

impl LayoutVisitor for FailingVisitor {
    fn visit(
        &self,
        _layout: &dyn LayoutResult,
        _bounds: Rect,
        _absolute_origin: Point,
        _state: &mut ExtensionState,
    ) -> TrellisResult<()> {
        Err(TrellisError::structure("visitor refused node"))
    }
}

#[test]
fn visitor_failures_are_isolated_and_aggregated() {
    let root = StaticLayout::new(100, 100).with_child(0, 0, leaf(1, 10, 10));
    let extensions: Vec<Arc<dyn RenderExtension>> = vec![Arc::new(FailingVisitor)];

    let err = reduce(&root, 0, 0, &extensions).unwrap_err();
    match err {
        TrellisError::Extensions(failures) => {
            // One failure per visited node: the pass finished despite them.
            assert_eq!(failures.len(), 2);
            assert!(failures.failures.iter().all(|f| f.extension == FAILING_ID));
        }
        other => panic!("expected aggregated extension failures, got {other}"),
    }
}

#[test]
fn state_is_allocated_only_for_visitor_extensions() {
    struct HookOnly;

    impl RenderExtension for HookOnly {
        fn id(&self) -> ExtensionId {
            ExtensionId(13)
        }

        fn create_state(&self) -> ExtensionState {
            Box::new(())
        }

        fn mount_hooks(&self) -> Option<&dyn MountExtension> {
            Some(&HOOKS)
        }
    }

    struct Hooks;
    impl MountExtension for Hooks {}
    static HOOKS: Hooks = Hooks;

    let extensions: Vec<Arc<dyn RenderExtension>> = vec![Arc::new(HookOnly)];
    let tree = reduce(&StaticLayout::new(10, 10), 0, 0, &extensions).unwrap();
    assert!(tree.extension_state(ExtensionId(13)).is_none());
}
