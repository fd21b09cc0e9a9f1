//! Mount reconciliation: applies render tree generations to live content.
//!
//! A [`MountTarget`] owns the currently-mounted generation and one
//! [`MountItem`] per mounted position. Mounting a new generation diffs it
//! position by position against the previous one: identical unit identities
//! rebind in place, everything else is unmounted and remounted. All methods
//! must run on the single thread owning the live content surface; the
//! bookkeeping has no internal locking and callers serialize generations.

use std::any::Any;
use std::sync::Arc;

use crate::extension::{ExtensionStateMap, RenderExtension};
use crate::foundation::core::{Point, Rect, UnitId};
use crate::foundation::error::{ExtensionFailures, TrellisError, TrellisResult};
use crate::layout::LayoutData;
use crate::tree::{RenderTree, RenderTreeNode};
use crate::unit::{Content, RenderType, RenderUnit};

/// Binds one render tree node to one live content instance.
///
/// Created when content is mounted at a position, destroyed when that
/// position unmounts. While alive it is the only owner of the content's
/// mounted state.
pub struct MountItem {
    content: Content,
    unit: Arc<dyn RenderUnit>,
    layout_data: Option<LayoutData>,
    bounds: Rect,
    absolute_origin: Point,
    position: usize,
    bound: bool,
}

impl MountItem {
    /// The live content instance.
    pub fn content(&self) -> &dyn Any {
        self.content.as_ref()
    }

    /// The unit this item was mounted for.
    pub fn unit(&self) -> &Arc<dyn RenderUnit> {
        &self.unit
    }

    /// Identity of the mounted unit.
    pub fn id(&self) -> UnitId {
        self.unit.id()
    }

    /// Render type of the mounted unit.
    pub fn render_type(&self) -> RenderType {
        self.unit.render_type()
    }

    /// Layout payload the content is currently bound with.
    pub fn layout_data(&self) -> Option<&LayoutData> {
        self.layout_data.as_ref()
    }

    /// Host-relative bounds of the mounted node.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Root-space origin of the mounted node.
    pub fn absolute_origin(&self) -> Point {
        self.absolute_origin
    }

    /// Position of this item in the mounted generation.
    pub fn position(&self) -> usize {
        self.position
    }

    /// `false` while the owning target is detached.
    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

/// Reconciles render tree generations against live platform content.
pub struct MountTarget {
    extensions: Vec<Arc<dyn RenderExtension>>,
    items: Vec<Option<MountItem>>,
    tree: Option<RenderTree>,
    attached: bool,
    needs_remount: bool,
}

impl Default for MountTarget {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MountTarget {
    /// Create a target with the extension list whose mount hooks should fire.
    ///
    /// Pass the same extensions given to [`reduce`](crate::reduce) so their
    /// per-generation state lines up.
    pub fn new(extensions: Vec<Arc<dyn RenderExtension>>) -> Self {
        Self {
            extensions,
            items: Vec::new(),
            tree: None,
            attached: true,
            needs_remount: true,
        }
    }

    /// Reconcile a new generation against the currently-mounted content.
    ///
    /// Stale positions are unmounted first (ascending), then surviving and
    /// new positions are rebound or mounted (ascending). Content factory and
    /// binder errors propagate unchanged and leave the failing position
    /// unmounted; extension hook failures are aggregated and reported once
    /// after the pass.
    #[tracing::instrument(skip(self, tree), fields(len = tree.len()))]
    pub fn mount(&mut self, mut tree: RenderTree) -> TrellisResult<()> {
        let mut failures = ExtensionFailures::default();
        let result = mount_pass(&self.extensions, &mut self.items, &mut tree, &mut failures);
        self.tree = Some(tree);
        match result {
            Ok(()) => {
                self.needs_remount = false;
                failures.into_result()
            }
            Err(error) => {
                self.needs_remount = true;
                Err(error)
            }
        }
    }

    /// Mount the current generation's node at one position.
    ///
    /// A no-op when the position is already mounted. Errors when no
    /// generation has been mounted or the position is out of range.
    pub fn notify_mount(&mut self, position: usize) -> TrellisResult<()> {
        let mut failures = ExtensionFailures::default();
        let Self {
            extensions,
            items,
            tree,
            ..
        } = self;
        let Some(tree) = tree.as_mut() else {
            return Err(TrellisError::structure("no generation mounted"));
        };
        let (nodes, states) = tree.split_mut();
        let Some(node) = nodes.get(position) else {
            return Err(TrellisError::structure(format!(
                "position {position} out of range for generation of {}",
                nodes.len()
            )));
        };
        if items.len() < nodes.len() {
            items.resize_with(nodes.len(), || None);
        }
        if items[position].is_some() {
            return Ok(());
        }
        let item = mount_item(extensions, states, node, position, &mut failures)?;
        items[position] = Some(item);
        failures.into_result()
    }

    /// Unmount one position. A no-op when nothing is mounted there.
    pub fn notify_unmount(&mut self, position: usize) -> TrellisResult<()> {
        let mut failures = ExtensionFailures::default();
        let Self {
            extensions,
            items,
            tree,
            ..
        } = self;
        let Some(item) = items.get_mut(position).and_then(Option::take) else {
            return Ok(());
        };
        let Some(tree) = tree.as_mut() else {
            return Ok(());
        };
        let (_, states) = tree.split_mut();
        unmount_item(extensions, states, item, &mut failures);
        failures.into_result()
    }

    /// Unmount every mounted position. Used on teardown.
    pub fn unmount_all(&mut self) -> TrellisResult<()> {
        let mut failures = ExtensionFailures::default();
        let Self {
            extensions,
            items,
            tree,
            needs_remount,
            ..
        } = self;
        if let Some(tree) = tree.as_mut() {
            let (_, states) = tree.split_mut();
            for slot in items.iter_mut() {
                if let Some(item) = slot.take() {
                    unmount_item(extensions, states, item, &mut failures);
                }
            }
        }
        *needs_remount = true;
        failures.into_result()
    }

    /// `true` when a full mount pass is required before the target reflects
    /// a generation: before the first mount, after [`unmount_all`]
    /// (teardown), and after a mount pass that failed partway.
    ///
    /// [`unmount_all`]: MountTarget::unmount_all
    pub fn needs_remount(&self) -> bool {
        self.needs_remount
    }

    /// Rebind every mounted item after a [`detach`](MountTarget::detach).
    ///
    /// Content stays mounted throughout; no instances are created.
    pub fn attach(&mut self) -> TrellisResult<()> {
        for item in self.items.iter_mut().flatten() {
            if item.bound {
                continue;
            }
            let unit = item.unit.clone();
            unit.bind(item.content.as_mut(), item.layout_data.as_ref())?;
            item.bound = true;
        }
        self.attached = true;
        Ok(())
    }

    /// Unbind every mounted item without unmounting it, for when the owning
    /// surface becomes temporarily invisible.
    pub fn detach(&mut self) {
        for item in self.items.iter_mut().flatten() {
            if !item.bound {
                continue;
            }
            let unit = item.unit.clone();
            unit.unbind(item.content.as_mut());
            item.bound = false;
        }
        self.attached = false;
    }

    /// `true` while the target is attached to a visible surface.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Content mounted at `position`, if any.
    pub fn content_at(&self, position: usize) -> Option<&dyn Any> {
        self.items
            .get(position)
            .and_then(|slot| slot.as_ref())
            .map(|item| item.content())
    }

    /// Content mounted for the unit with identity `id`, if any.
    pub fn content_by_id(&self, id: UnitId) -> Option<&dyn Any> {
        self.items
            .iter()
            .flatten()
            .find(|item| item.id() == id)
            .map(|item| item.content())
    }

    /// Mount item at `position`, if any.
    pub fn mount_item_at(&self, position: usize) -> Option<&MountItem> {
        self.items.get(position).and_then(|slot| slot.as_ref())
    }

    /// The root host's mount item, if mounted.
    pub fn root_item(&self) -> Option<&MountItem> {
        self.mount_item_at(0)
    }

    /// `true` only for a mounted position 0.
    pub fn is_root_item(&self, position: usize) -> bool {
        position == 0 && self.mount_item_at(0).is_some()
    }

    /// Number of live content instances.
    pub fn content_count(&self) -> usize {
        self.items.iter().flatten().count()
    }

    /// Number of positions tracked for the current generation.
    pub fn mount_item_count(&self) -> usize {
        self.items.len()
    }

    /// Contents of every mounted host, in position order.
    pub fn host_contents(&self) -> Vec<&dyn Any> {
        self.items
            .iter()
            .flatten()
            .filter(|item| item.render_type() == RenderType::Host)
            .map(|item| item.content())
            .collect()
    }

    /// The currently-mounted generation, if any.
    pub fn current_tree(&self) -> Option<&RenderTree> {
        self.tree.as_ref()
    }
}

fn mount_pass(
    extensions: &[Arc<dyn RenderExtension>],
    items: &mut Vec<Option<MountItem>>,
    tree: &mut RenderTree,
    failures: &mut ExtensionFailures,
) -> TrellisResult<()> {
    let (nodes, states) = tree.split_mut();

    // Stale positions unmount before any new content mounts.
    for position in 0..items.len() {
        let Some(item) = items[position].as_ref() else {
            continue;
        };
        let stale = match nodes.get(position) {
            None => true,
            Some(node) => {
                let unit = node.unit();
                if unit.id() == item.id() {
                    if unit.render_type() != item.render_type() {
                        return Err(TrellisError::structure(format!(
                            "unit id {} reused with a different render type at position {position}",
                            item.id().0
                        )));
                    }
                    false
                } else {
                    true
                }
            }
        };
        if stale {
            if let Some(item) = items[position].take() {
                unmount_item(extensions, states, item, failures);
            }
        }
    }
    items.resize_with(nodes.len(), || None);

    for (position, node) in nodes.iter().enumerate() {
        match items[position].take() {
            Some(mut item) => {
                // Same identity: rebind in place with the new generation's
                // layout data.
                let old_unit = item.unit.clone();
                if item.bound {
                    old_unit.unbind(item.content.as_mut());
                    item.bound = false;
                }
                let unit = node.unit().clone();
                let data = node.layout_data().cloned();
                match unit.bind(item.content.as_mut(), data.as_ref()) {
                    Ok(()) => {
                        item.unit = unit;
                        item.layout_data = data;
                        item.bounds = node.bounds();
                        item.absolute_origin = node.absolute_origin();
                        item.bound = true;
                        items[position] = Some(item);
                    }
                    Err(error) => {
                        // A failed rebind leaves the position unmounted.
                        fire_unmount_hooks(extensions, states, &item, failures);
                        let MountItem { content, unit, .. } = item;
                        unit.destroy_content(content);
                        return Err(error);
                    }
                }
            }
            None => {
                let item = mount_item(extensions, states, node, position, failures)?;
                items[position] = Some(item);
            }
        }
    }

    Ok(())
}

fn mount_item(
    extensions: &[Arc<dyn RenderExtension>],
    states: &mut ExtensionStateMap,
    node: &RenderTreeNode,
    position: usize,
    failures: &mut ExtensionFailures,
) -> TrellisResult<MountItem> {
    let unit = node.unit().clone();
    let mut content = unit.create_content()?;
    let data = node.layout_data().cloned();
    if let Err(error) = unit.bind(content.as_mut(), data.as_ref()) {
        unit.destroy_content(content);
        return Err(error);
    }
    let item = MountItem {
        content,
        unit,
        layout_data: data,
        bounds: node.bounds(),
        absolute_origin: node.absolute_origin(),
        position,
        bound: true,
    };
    tracing::trace!(position, id = item.id().0, "mounted");
    fire_mount_hooks(extensions, states, &item, failures);
    Ok(item)
}

fn unmount_item(
    extensions: &[Arc<dyn RenderExtension>],
    states: &mut ExtensionStateMap,
    mut item: MountItem,
    failures: &mut ExtensionFailures,
) {
    let unit = item.unit.clone();
    if item.bound {
        unit.unbind(item.content.as_mut());
        item.bound = false;
    }
    // Hooks fire while the content is still alive.
    fire_unmount_hooks(extensions, states, &item, failures);
    tracing::trace!(position = item.position, id = item.id().0, "unmounted");
    let MountItem { content, unit, .. } = item;
    unit.destroy_content(content);
}

fn fire_mount_hooks(
    extensions: &[Arc<dyn RenderExtension>],
    states: &mut ExtensionStateMap,
    item: &MountItem,
    failures: &mut ExtensionFailures,
) {
    for extension in extensions {
        let Some(hooks) = extension.mount_hooks() else {
            continue;
        };
        let state = states.get_mut(extension.id());
        if let Err(error) = hooks.on_mount(item, state) {
            failures.push(extension.id(), error);
        }
    }
}

fn fire_unmount_hooks(
    extensions: &[Arc<dyn RenderExtension>],
    states: &mut ExtensionStateMap,
    item: &MountItem,
    failures: &mut ExtensionFailures,
) {
    for extension in extensions {
        let Some(hooks) = extension.mount_hooks() else {
            continue;
        };
        let state = states.get_mut(extension.id());
        if let Err(error) = hooks.on_unmount(item, state) {
            failures.push(extension.id(), error);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/mount.rs"]
mod tests;
