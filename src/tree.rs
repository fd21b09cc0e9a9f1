//! The immutable flattened render tree.

use std::sync::Arc;

use crate::extension::{ExtensionState, ExtensionStateMap};
use crate::foundation::core::{EdgeInsets, ExtensionId, Point, Rect};
use crate::layout::LayoutData;
use crate::unit::RenderUnit;

/// One node of the flattened render tree.
///
/// Nodes live in an arena owned by the [`RenderTree`]; parent and children
/// are arena positions, not owning references. A node is immutable once the
/// reduce pass that produced it returns.
pub struct RenderTreeNode {
    unit: Arc<dyn RenderUnit>,
    layout_data: Option<LayoutData>,
    bounds: Rect,
    absolute_origin: Point,
    padding: Option<EdgeInsets>,
    parent: Option<usize>,
    children: Vec<usize>,
    index: usize,
}

impl std::fmt::Debug for RenderTreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTreeNode")
            .field("unit", &self.unit.id())
            .field("layout_data", &self.layout_data)
            .field("bounds", &self.bounds)
            .field("absolute_origin", &self.absolute_origin)
            .field("padding", &self.padding)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("index", &self.index)
            .finish()
    }
}

impl RenderTreeNode {
    pub(crate) fn new(
        unit: Arc<dyn RenderUnit>,
        layout_data: Option<LayoutData>,
        bounds: Rect,
        absolute_origin: Point,
        padding: Option<EdgeInsets>,
        parent: Option<usize>,
        index: usize,
    ) -> Self {
        Self {
            unit,
            layout_data,
            bounds,
            absolute_origin,
            padding,
            parent,
            children: Vec::new(),
            index,
        }
    }

    pub(crate) fn push_child(&mut self, child: usize) {
        self.children.push(child);
    }

    /// The mountable unit this node was emitted for.
    pub fn unit(&self) -> &Arc<dyn RenderUnit> {
        &self.unit
    }

    /// Payload handed to the unit's binder at mount time.
    pub fn layout_data(&self) -> Option<&LayoutData> {
        self.layout_data.as_ref()
    }

    /// Bounds relative to the nearest host ancestor.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Top-left corner in root space. Always the parent's absolute origin
    /// plus this node's local offset.
    pub fn absolute_origin(&self) -> Point {
        self.absolute_origin
    }

    /// Bounds in root space.
    pub fn absolute_bounds(&self) -> Rect {
        Rect::from_origin_size(
            self.absolute_origin.x,
            self.absolute_origin.y,
            self.bounds.width(),
            self.bounds.height(),
        )
    }

    /// Padding captured from the layout node, when any edge was non-zero.
    pub fn padding(&self) -> Option<EdgeInsets> {
        self.padding
    }

    /// Arena position of the parent node; `None` only for the root.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Arena positions of this node's children, in emission order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// This node's own position in the flattened array.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Immutable snapshot of one reduce pass.
///
/// The arena order is stable pre-order depth-first; position 0 is always the
/// synthetic root host, and `node_at(i).index() == i` for every position. A
/// new generation is always produced by a new reduce pass, never patched.
pub struct RenderTree {
    nodes: Vec<RenderTreeNode>,
    width_spec: i32,
    height_spec: i32,
    extension_state: ExtensionStateMap,
}

impl std::fmt::Debug for RenderTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTree")
            .field("nodes", &self.nodes)
            .field("width_spec", &self.width_spec)
            .field("height_spec", &self.height_spec)
            .field("extension_state_len", &self.extension_state.len())
            .finish()
    }
}

impl RenderTree {
    pub(crate) fn new(
        nodes: Vec<RenderTreeNode>,
        width_spec: i32,
        height_spec: i32,
        extension_state: ExtensionStateMap,
    ) -> Self {
        debug_assert!(!nodes.is_empty());
        Self {
            nodes,
            width_spec,
            height_spec,
            extension_state,
        }
    }

    /// Node at `position`, or `None` past the end of the flattened array.
    pub fn node_at(&self, position: usize) -> Option<&RenderTreeNode> {
        self.nodes.get(position)
    }

    /// The synthetic root host node at position 0.
    pub fn root(&self) -> &RenderTreeNode {
        &self.nodes[0]
    }

    /// Number of nodes in the flattened array.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: every tree contains at least the root node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The width spec this tree was reduced for.
    pub fn width_spec(&self) -> i32 {
        self.width_spec
    }

    /// The height spec this tree was reduced for.
    pub fn height_spec(&self) -> i32 {
        self.height_spec
    }

    /// State produced for extension `id` during this generation's reduction.
    pub fn extension_state(&self, id: ExtensionId) -> Option<&ExtensionState> {
        self.extension_state.get(id)
    }

    pub(crate) fn split_mut(&mut self) -> (&[RenderTreeNode], &mut ExtensionStateMap) {
        let Self {
            nodes,
            extension_state,
            ..
        } = self;
        (nodes.as_slice(), extension_state)
    }
}

#[cfg(test)]
#[path = "../tests/unit/tree.rs"]
mod tests;
