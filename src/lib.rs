//! trellis is a retained-mode mount engine.
//!
//! It turns a measured layout tree into a flat, positionally-ordered
//! [`RenderTree`] and incrementally applies each generation to live platform
//! content, reusing content whose identity is stable and mounting or
//! unmounting only what changed.
//!
//! The pipeline is:
//!
//! ```text
//! LayoutResult → reduce (+ extension visitors) → RenderTree
//!              → MountTarget::mount → per-position diff → content bound/unbound
//! ```
//!
//! The layout algorithm and the platform content system are external
//! collaborators: trellis reads layout through the [`LayoutResult`] trait and
//! drives content through each node's [`RenderUnit`].
#![forbid(unsafe_code)]

mod foundation;

pub mod extension;
pub mod layout;
pub mod mount;
pub mod reduce;
pub mod tree;
pub mod unit;

pub use crate::foundation::core::{EdgeInsets, ExtensionId, Point, Rect, UnitId};
pub use crate::foundation::error::{
    ExtensionFailure, ExtensionFailures, TrellisError, TrellisResult,
};

pub use crate::extension::{
    ExtensionState, ExtensionStateMap, LayoutVisitor, MountExtension, RenderExtension,
};
pub use crate::layout::model::{
    ChildDef, DeclaredContent, DeclaredUnit, EdgesDef, LayoutDef, UnitDef, UnitKindDef,
};
pub use crate::layout::{LayoutData, LayoutResult, StaticLayout};
pub use crate::mount::{MountItem, MountTarget};
pub use crate::reduce::reduce;
pub use crate::tree::{RenderTree, RenderTreeNode};
pub use crate::unit::{Content, RenderType, RenderUnit, RootHost, RootHostUnit};
