//! Mountable units and the content capability they create.

use std::any::Any;

use crate::foundation::core::UnitId;
use crate::foundation::error::TrellisResult;
use crate::layout::LayoutData;

/// Opaque handle to a live platform content instance.
///
/// The engine never looks inside; it only threads the handle between the
/// factory, the binder and the mount bookkeeping.
pub type Content = Box<dyn Any>;

/// Whether a unit's content can host other mounted content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderType {
    /// Plain content with no mounted children.
    Content,
    /// A container that groups and offsets its mounted children. A host is
    /// the coordinate origin for its subtree.
    Host,
}

/// Describes one mountable unit: a stable identity, a factory capability for
/// its content, and binder callbacks that attach data to that content.
///
/// Two units with equal [`id`](RenderUnit::id) and
/// [`render_type`](RenderUnit::render_type) are mount-equivalent: reconciling
/// one generation onto the next rebinds the existing content instead of
/// creating a fresh instance.
pub trait RenderUnit: Send + Sync {
    /// Stable identity, unique within one render tree and stable across
    /// generations when representing the same thing.
    fn id(&self) -> UnitId;

    /// Content role of this unit.
    fn render_type(&self) -> RenderType;

    /// Create a fresh content instance.
    fn create_content(&self) -> TrellisResult<Content>;

    /// Destroy a content instance previously created by this unit.
    fn destroy_content(&self, content: Content) {
        drop(content);
    }

    /// Bind the node's layout data to the content.
    fn bind(&self, _content: &mut dyn Any, _data: Option<&LayoutData>) -> TrellisResult<()> {
        Ok(())
    }

    /// Undo a previous [`bind`](RenderUnit::bind).
    fn unbind(&self, _content: &mut dyn Any) {}
}

/// The reserved unit mounted at position 0 of every render tree.
///
/// A well-known constant identity ([`UnitId::ROOT_HOST`]) constructed per
/// reduce pass; never shared mutable state.
#[derive(Debug, Default)]
pub struct RootHostUnit;

impl RenderUnit for RootHostUnit {
    fn id(&self) -> UnitId {
        UnitId::ROOT_HOST
    }

    fn render_type(&self) -> RenderType {
        RenderType::Host
    }

    fn create_content(&self) -> TrellisResult<Content> {
        Ok(Box::new(RootHost))
    }
}

/// Marker content held by the root mount item.
#[derive(Debug)]
pub struct RootHost;
