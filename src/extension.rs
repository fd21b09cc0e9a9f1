//! Pluggable extensions observing reduction and mount.
//!
//! An extension owns exactly one opaque state object per render tree
//! generation. The state is created fresh during [`reduce`](crate::reduce),
//! written by the extension's [`LayoutVisitor`] while the tree is flattened,
//! and read or updated by its [`MountExtension`] hooks while that generation
//! is mounted. Generation N state is dropped once generation N+1 is mounted.

use std::any::Any;
use std::collections::HashMap;

use crate::foundation::core::{ExtensionId, Point, Rect};
use crate::foundation::error::TrellisResult;
use crate::layout::LayoutResult;
use crate::mount::MountItem;

/// Type-erased per-generation extension state.
pub type ExtensionState = Box<dyn Any + Send>;

/// State objects of one render tree generation, keyed by extension identity.
#[derive(Default)]
pub struct ExtensionStateMap {
    entries: HashMap<ExtensionId, ExtensionState>,
}

impl ExtensionStateMap {
    pub(crate) fn insert(&mut self, id: ExtensionId, state: ExtensionState) {
        self.entries.insert(id, state);
    }

    /// State produced by the extension with `id`, if it registered a layout
    /// visitor for this generation.
    pub fn get(&self, id: ExtensionId) -> Option<&ExtensionState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ExtensionId) -> Option<&mut ExtensionState> {
        self.entries.get_mut(&id)
    }

    /// Number of state entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no extension produced state.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A render extension: an identity plus up to two hook families.
///
/// The same extension list is handed to [`reduce`](crate::reduce) and to the
/// [`MountTarget`](crate::mount::MountTarget) so that state written during
/// reduction is visible to the mount hooks of the same generation.
pub trait RenderExtension: Send + Sync {
    /// Stable identity keying this extension's per-generation state.
    fn id(&self) -> ExtensionId;

    /// Create this extension's state for a new generation.
    fn create_state(&self) -> ExtensionState;

    /// The reduction-time hook family, if any. State is only allocated for
    /// extensions that return one.
    fn layout_visitor(&self) -> Option<&dyn LayoutVisitor> {
        None
    }

    /// The mount-time hook family, if any.
    fn mount_hooks(&self) -> Option<&dyn MountExtension> {
        None
    }
}

/// Reduction-time hooks, invoked once per non-pruned layout node.
///
/// Visitors read the node and write their own state; they never mutate the
/// tree being built.
pub trait LayoutVisitor {
    /// Observe one layout node.
    ///
    /// `bounds` is relative to the nearest open host; `absolute_origin` is in
    /// root space. A visitor error is isolated to this node and aggregated
    /// into the pass result.
    fn visit(
        &self,
        layout: &dyn LayoutResult,
        bounds: Rect,
        absolute_origin: Point,
        state: &mut ExtensionState,
    ) -> TrellisResult<()>;
}

/// Mount-time hooks, invoked per position transition.
///
/// Hooks may read the mounted content through the item but must not retain
/// the reference beyond the call. Rebinds are not transitions and fire no
/// hooks. `state` is present when the extension produced state for the
/// generation being mounted.
pub trait MountExtension {
    /// Content was mounted at the item's position.
    fn on_mount(&self, _item: &MountItem, _state: Option<&mut ExtensionState>) -> TrellisResult<()> {
        Ok(())
    }

    /// Content is about to be unmounted from the item's position.
    fn on_unmount(
        &self,
        _item: &MountItem,
        _state: Option<&mut ExtensionState>,
    ) -> TrellisResult<()> {
        Ok(())
    }
}
