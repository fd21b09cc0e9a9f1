//! Reduces a measured layout tree into a flattened [`RenderTree`].
//!
//! Reduction is a synchronous pre-order walk. Transparent layout nodes emit
//! nothing but thread their accumulated offset down to the first mountable
//! descendant; hosts reset the accumulated translation and become the
//! coordinate origin for their subtree. Zero-size subtrees are pruned
//! entirely.

use std::sync::Arc;

use crate::extension::{ExtensionStateMap, RenderExtension};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ExtensionFailures, TrellisError, TrellisResult};
use crate::layout::LayoutResult;
use crate::tree::{RenderTree, RenderTreeNode};
use crate::unit::{RenderUnit, RootHostUnit};

/// Flatten `layout_root` into a new render tree generation.
///
/// The synthetic root host always occupies position 0, even when the layout
/// root itself has zero size. Extension layout visitors run once per
/// non-pruned layout node; their failures are isolated, aggregated, and
/// reported once after the traversal as [`TrellisError::Extensions`].
#[tracing::instrument(skip(layout_root, extensions))]
pub fn reduce(
    layout_root: &dyn LayoutResult,
    width_spec: i32,
    height_spec: i32,
    extensions: &[Arc<dyn RenderExtension>],
) -> TrellisResult<RenderTree> {
    let root_width = layout_root.width();
    let root_height = layout_root.height();
    if root_width < 0 || root_height < 0 {
        return Err(TrellisError::structure(format!(
            "layout size must be non-negative, got {root_width}x{root_height}"
        )));
    }

    let mut states = populate(extensions);
    let mut failures = ExtensionFailures::default();

    let mut nodes = Vec::new();
    nodes.push(emit_node(
        layout_root,
        Arc::new(RootHostUnit),
        Rect::from_origin_size(0, 0, root_width, root_height),
        Point::default(),
        None,
        0,
    ));

    reduce_tree(
        layout_root,
        0,
        0,
        0,
        &mut nodes,
        extensions,
        &mut states,
        &mut failures,
    )?;

    failures.into_result()?;
    Ok(RenderTree::new(nodes, width_spec, height_spec, states))
}

#[allow(clippy::too_many_arguments)]
fn reduce_tree(
    layout: &dyn LayoutResult,
    parent: usize,
    x: i32,
    y: i32,
    nodes: &mut Vec<RenderTreeNode>,
    extensions: &[Arc<dyn RenderExtension>],
    states: &mut ExtensionStateMap,
    failures: &mut ExtensionFailures,
) -> TrellisResult<()> {
    let width = layout.width();
    let height = layout.height();
    if width < 0 || height < 0 {
        return Err(TrellisError::structure(format!(
            "layout size must be non-negative, got {width}x{height}"
        )));
    }

    // Zero-size subtrees contribute nothing to the mount surface.
    if width == 0 && height == 0 {
        return Ok(());
    }

    let bounds = Rect::from_origin_size(x, y, width, height);
    let absolute_origin = nodes[parent].absolute_origin().offset(x, y);

    for extension in extensions {
        let Some(visitor) = extension.layout_visitor() else {
            continue;
        };
        let Some(state) = states.get_mut(extension.id()) else {
            continue;
        };
        if let Err(error) = visitor.visit(layout, bounds, absolute_origin, state) {
            failures.push(extension.id(), error);
        }
    }

    let unit = layout.render_unit();
    let child_count = layout.child_count();

    let (next_parent, x_translation, y_translation) = match unit {
        // The unit is a host: it becomes the origin for its subtree.
        Some(unit) if child_count > 0 => {
            let index = nodes.len();
            nodes.push(emit_node(
                layout,
                unit,
                bounds,
                absolute_origin,
                Some(parent),
                index,
            ));
            nodes[parent].push_child(index);
            (index, 0, 0)
        }
        // The unit is a leaf.
        Some(unit) => {
            let index = nodes.len();
            nodes.push(emit_node(
                layout,
                unit,
                bounds,
                absolute_origin,
                Some(parent),
                index,
            ));
            nodes[parent].push_child(index);
            (parent, 0, 0)
        }
        // Transparent: children inherit the accumulated translation.
        None => (parent, x, y),
    };

    for i in 0..child_count {
        let child = layout.child_at(i).ok_or_else(|| {
            TrellisError::structure(format!(
                "layout claims {child_count} children but child {i} is missing"
            ))
        })?;
        reduce_tree(
            child,
            next_parent,
            layout.x_for_child(i) + x_translation,
            layout.y_for_child(i) + y_translation,
            nodes,
            extensions,
            states,
            failures,
        )?;
    }

    Ok(())
}

fn emit_node(
    layout: &dyn LayoutResult,
    unit: Arc<dyn RenderUnit>,
    bounds: Rect,
    absolute_origin: Point,
    parent: Option<usize>,
    index: usize,
) -> RenderTreeNode {
    let padding = layout.padding().filter(|p| !p.is_zero());
    RenderTreeNode::new(
        unit,
        layout.layout_data(),
        bounds,
        absolute_origin,
        padding,
        parent,
        index,
    )
}

fn populate(extensions: &[Arc<dyn RenderExtension>]) -> ExtensionStateMap {
    let mut states = ExtensionStateMap::default();
    for extension in extensions {
        if extension.layout_visitor().is_some() {
            states.insert(extension.id(), extension.create_state());
        }
    }
    states
}

#[cfg(test)]
#[path = "../tests/unit/reduce.rs"]
mod tests;
