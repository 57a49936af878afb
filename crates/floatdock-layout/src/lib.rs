#![forbid(unsafe_code)]

//! Window geometry, dock split trees, and dock zone detection.
//!
//! Dependency order inside this crate mirrors the data flow: the
//! [`WindowStore`] owns windows and the [`DockTree`]; [`detect`] is a pure
//! function over rectangles that the gesture runtime feeds with store reads.

pub mod dock;
pub mod store;
pub mod tree;
pub mod window;

pub use dock::{DockKind, DockPosition, DockPreview, DockZone, detect, detect_any};
pub use floatdock_core::geometry::{Axis, Point, Rect, Size};
pub use store::WindowStore;
pub use tree::{
    DetachOutcome, DockEvent, DockGroup, DockNode, DockNodeId, DockNodeKind, DockTree,
    DockTreeError, MergeOutcome,
};
pub use window::{WindowId, WindowInstance, WindowOptions, WindowPatch, WindowSnapshot};
