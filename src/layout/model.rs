//! Serde boundary model for layout trees.
//!
//! A `LayoutDef` is the JSON shape consumed by the CLI and fixtures. It
//! lowers to a [`StaticLayout`] whose units are [`DeclaredUnit`]s; the
//! declared payload reaches binders as a `serde_json::Value`. All access to
//! node properties goes through these typed definitions.

use std::any::Any;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{EdgeInsets, UnitId};
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::layout::{LayoutData, StaticLayout};
use crate::unit::{Content, RenderType, RenderUnit};

/// Declared padding edges. Missing edges default to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EdgesDef {
    /// Left inset.
    #[serde(default)]
    pub left: i32,
    /// Top inset.
    #[serde(default)]
    pub top: i32,
    /// Right inset.
    #[serde(default)]
    pub right: i32,
    /// Bottom inset.
    #[serde(default)]
    pub bottom: i32,
}

impl EdgesDef {
    fn to_insets(self) -> EdgeInsets {
        EdgeInsets::new(self.left, self.top, self.right, self.bottom)
    }
}

/// Declared content role of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKindDef {
    /// Plain content.
    Content,
    /// Hosting container.
    Host,
}

/// Declared mountable unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitDef {
    /// Stable unit identity. Must be non-zero (zero is the reserved root
    /// host) and unique within the tree.
    pub id: u64,
    /// Explicit role override. Defaults to `host` when the node has children
    /// and `content` otherwise.
    #[serde(default)]
    pub kind: Option<UnitKindDef>,
}

/// Declared layout node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDef {
    /// Measured width.
    pub width: i32,
    /// Measured height.
    pub height: i32,
    /// Padding edges.
    #[serde(default)]
    pub padding: Option<EdgesDef>,
    /// Mountable unit, absent for transparent nodes.
    #[serde(default)]
    pub unit: Option<UnitDef>,
    /// Payload handed to the unit's binder at mount time.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Children with their offsets.
    #[serde(default)]
    pub children: Vec<ChildDef>,
}

/// A child position plus its declared subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildDef {
    /// Horizontal offset relative to the parent.
    #[serde(default)]
    pub x: i32,
    /// Vertical offset relative to the parent.
    #[serde(default)]
    pub y: i32,
    /// The child subtree.
    #[serde(flatten)]
    pub layout: LayoutDef,
}

impl LayoutDef {
    /// Load a declared layout tree from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> TrellisResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TrellisError::structure(format!("read layout '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            TrellisError::structure(format!("parse layout '{}': {e}", path.display()))
        })
    }

    /// Validate sizes and unit identities over the whole tree.
    pub fn validate(&self) -> TrellisResult<()> {
        let mut seen = HashSet::new();
        self.validate_node(&mut seen)
    }

    fn validate_node(&self, seen: &mut HashSet<u64>) -> TrellisResult<()> {
        if self.width < 0 || self.height < 0 {
            return Err(TrellisError::structure(format!(
                "layout size must be non-negative, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(unit) = &self.unit {
            if unit.id == UnitId::ROOT_HOST.0 {
                return Err(TrellisError::structure(
                    "unit id 0 is reserved for the root host",
                ));
            }
            if !seen.insert(unit.id) {
                return Err(TrellisError::structure(format!(
                    "duplicate unit id {}",
                    unit.id
                )));
            }
        }
        for child in &self.children {
            child.layout.validate_node(seen)?;
        }
        Ok(())
    }

    /// Lower the declaration into an owned [`StaticLayout`].
    pub fn lower(&self) -> StaticLayout {
        let mut layout = StaticLayout::new(self.width, self.height);
        if let Some(p) = self.padding {
            layout = layout.with_padding(p.to_insets());
        }
        if let Some(unit) = &self.unit {
            let render_type = match unit.kind {
                Some(UnitKindDef::Host) => RenderType::Host,
                Some(UnitKindDef::Content) => RenderType::Content,
                None if self.children.is_empty() => RenderType::Content,
                None => RenderType::Host,
            };
            layout = layout.with_unit(Arc::new(DeclaredUnit::new(UnitId(unit.id), render_type)));
        }
        if let Some(data) = &self.data {
            layout = layout.with_layout_data(Arc::new(data.clone()) as LayoutData);
        }
        for child in &self.children {
            layout = layout.with_child(child.x, child.y, child.layout.lower());
        }
        layout
    }
}

/// Render unit backed by a declaration: content is a [`DeclaredContent`]
/// that records the latest bound payload.
#[derive(Debug)]
pub struct DeclaredUnit {
    id: UnitId,
    render_type: RenderType,
}

impl DeclaredUnit {
    /// Create a declared unit.
    pub fn new(id: UnitId, render_type: RenderType) -> Self {
        Self { id, render_type }
    }
}

impl RenderUnit for DeclaredUnit {
    fn id(&self) -> UnitId {
        self.id
    }

    fn render_type(&self) -> RenderType {
        self.render_type
    }

    fn create_content(&self) -> TrellisResult<Content> {
        Ok(Box::new(DeclaredContent {
            unit: self.id,
            data: None,
        }))
    }

    fn bind(&self, content: &mut dyn Any, data: Option<&LayoutData>) -> TrellisResult<()> {
        let content = content
            .downcast_mut::<DeclaredContent>()
            .ok_or_else(|| TrellisError::content("declared unit bound to foreign content"))?;
        content.data = data
            .and_then(|d| d.downcast_ref::<serde_json::Value>())
            .cloned();
        Ok(())
    }

    fn unbind(&self, content: &mut dyn Any) {
        if let Some(content) = content.downcast_mut::<DeclaredContent>() {
            content.data = None;
        }
    }
}

/// Content instance produced by a [`DeclaredUnit`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredContent {
    /// Identity of the unit that created this content.
    pub unit: UnitId,
    /// Payload from the most recent bind, cleared on unbind.
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
#[path = "../../tests/unit/layout/model.rs"]
mod tests;
