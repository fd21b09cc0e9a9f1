//! The layout read contract consumed by the reducer.
//!
//! The layout algorithm itself is an external collaborator: trellis only
//! reads its result. [`LayoutResult`] is that read surface, and
//! [`StaticLayout`] is a plain owned implementation used by callers that
//! build trees programmatically (and by the serde boundary [`model`]).

pub mod model;

use std::any::Any;
use std::sync::Arc;

use crate::foundation::core::EdgeInsets;
use crate::unit::RenderUnit;

/// Arbitrary layout payload carried from a layout node to mount time, where
/// it is handed to the unit's binder.
pub type LayoutData = Arc<dyn Any + Send + Sync>;

/// Read contract of one measured layout node.
///
/// Width, height and per-child offsets are in the coordinate space of the
/// nearest mountable ancestor. Implementations must report a `child_count`
/// consistent with `child_at`; an out-of-range index observed by the reducer
/// is a structural violation.
pub trait LayoutResult {
    /// Measured width, `>= 0`.
    fn width(&self) -> i32;

    /// Measured height, `>= 0`.
    fn height(&self) -> i32;

    /// Padding, when any edge is non-zero.
    fn padding(&self) -> Option<EdgeInsets> {
        None
    }

    /// The mountable unit at this node, if any. Nodes without a unit are
    /// transparent: they contribute only offset accumulation.
    fn render_unit(&self) -> Option<Arc<dyn RenderUnit>> {
        None
    }

    /// Number of children.
    fn child_count(&self) -> usize;

    /// Child at `index`, or `None` when `index >= child_count()`.
    fn child_at(&self, index: usize) -> Option<&dyn LayoutResult>;

    /// Horizontal offset of child `index` relative to this node.
    fn x_for_child(&self, index: usize) -> i32;

    /// Vertical offset of child `index` relative to this node.
    fn y_for_child(&self, index: usize) -> i32;

    /// Opaque payload passed through to the unit's binder at mount time.
    fn layout_data(&self) -> Option<LayoutData> {
        None
    }
}

/// Owned, immutable layout node; the canonical in-process implementation of
/// [`LayoutResult`].
pub struct StaticLayout {
    width: i32,
    height: i32,
    padding: Option<EdgeInsets>,
    unit: Option<Arc<dyn RenderUnit>>,
    layout_data: Option<LayoutData>,
    children: Vec<StaticChild>,
}

struct StaticChild {
    x: i32,
    y: i32,
    layout: StaticLayout,
}

impl StaticLayout {
    /// A node of the given size with no unit, padding, payload or children.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            padding: None,
            unit: None,
            layout_data: None,
            children: Vec::new(),
        }
    }

    /// Attach a mountable unit.
    pub fn with_unit(mut self, unit: Arc<dyn RenderUnit>) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attach padding.
    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Attach a layout payload.
    pub fn with_layout_data(mut self, data: LayoutData) -> Self {
        self.layout_data = Some(data);
        self
    }

    /// Append a child at offset `(x, y)`.
    pub fn with_child(mut self, x: i32, y: i32, layout: StaticLayout) -> Self {
        self.children.push(StaticChild { x, y, layout });
        self
    }
}

impl LayoutResult for StaticLayout {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn padding(&self) -> Option<EdgeInsets> {
        self.padding
    }

    fn render_unit(&self) -> Option<Arc<dyn RenderUnit>> {
        self.unit.clone()
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_at(&self, index: usize) -> Option<&dyn LayoutResult> {
        self.children
            .get(index)
            .map(|c| &c.layout as &dyn LayoutResult)
    }

    fn x_for_child(&self, index: usize) -> i32 {
        self.children.get(index).map_or(0, |c| c.x)
    }

    fn y_for_child(&self, index: usize) -> i32 {
        self.children.get(index).map_or(0, |c| c.y)
    }

    fn layout_data(&self) -> Option<LayoutData> {
        self.layout_data.clone()
    }
}
