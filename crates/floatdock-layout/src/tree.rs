#![forbid(unsafe_code)]

//! Dock split tree.
//!
//! Docked arrangements are stored as a forest of [`DockNode`] records keyed by
//! [`DockNodeId`]. Every window owns exactly one leaf; a floating window's
//! leaf is a root. Groups are internal nodes with ordered children and a
//! parallel `sizes` vector of fractions.
//!
//! # Invariants
//!
//! 1. `children.len() == sizes.len()` for every group, and groups hold at
//!    least two children.
//! 2. `sizes` sum to 1.0 (within floating-point tolerance).
//! 3. Parent/child links agree in both directions.
//! 4. A node carries a `dock_to` tag if and only if it has a parent.
//! 5. The window → leaf index covers exactly the leaf nodes.
//!
//! [`DockTree::validate`] checks all of these; every structural operation
//! preserves them.

use std::collections::BTreeMap;
use std::fmt;

use floatdock_core::geometry::{Axis, Rect};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dock::DockPosition;
use crate::window::WindowId;

/// Tolerance used when checking that group sizes sum to one.
pub const SIZE_SUM_TOLERANCE: f64 = 1e-9;

/// Stable identifier for dock tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DockNodeId(u64);

impl DockNodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DockNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Internal split node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockGroup {
    pub orientation: Axis,
    pub children: Vec<DockNodeId>,
    pub sizes: Vec<f64>,
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DockNodeKind {
    Window { window: WindowId },
    Group(DockGroup),
}

/// One node of the dock forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockNode {
    pub id: DockNodeId,
    pub parent: Option<DockNodeId>,
    /// Slot this node holds inside its parent; `None` for roots.
    pub dock_to: Option<DockPosition>,
    /// Screen area of the slot.
    pub bounds: Rect,
    #[serde(flatten)]
    pub kind: DockNodeKind,
}

impl DockNode {
    #[must_use]
    pub fn group(&self) -> Option<&DockGroup> {
        match &self.kind {
            DockNodeKind::Group(group) => Some(group),
            DockNodeKind::Window { .. } => None,
        }
    }

    #[must_use]
    pub const fn window(&self) -> Option<WindowId> {
        match self.kind {
            DockNodeKind::Window { window } => Some(window),
            DockNodeKind::Group(_) => None,
        }
    }
}

/// Outbound record of one committed structural change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DockEvent {
    /// `source` docked onto `target`, forming `group`.
    Merged {
        group: DockNodeId,
        source: WindowId,
        target: WindowId,
        position: DockPosition,
    },
    /// `window` left `group` and is floating again.
    Undocked { window: WindowId, group: DockNodeId },
    /// `group` fell to one child and `promoted` took over its slot.
    Dissolved {
        group: DockNodeId,
        promoted: DockNodeId,
        dock_to: Option<DockPosition>,
    },
}

/// Geometry produced by a structural change: new bounds for each affected window.
pub type Placements = Vec<(WindowId, Rect)>;

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub group: DockNodeId,
    pub events: Vec<DockEvent>,
    pub placements: Placements,
}

/// Result of detaching a window from its group.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachOutcome {
    pub events: Vec<DockEvent>,
    pub placements: Placements,
}

/// Forest of dock split trees.
#[derive(Debug, Clone, Default)]
pub struct DockTree {
    next_id: u64,
    nodes: BTreeMap<DockNodeId, DockNode>,
    leaves: FxHashMap<WindowId, DockNodeId>,
}

impl DockTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup a node by ID.
    #[must_use]
    pub fn node(&self, id: DockNodeId) -> Option<&DockNode> {
        self.nodes.get(&id)
    }

    /// Iterate nodes in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &DockNode> {
        self.nodes.values()
    }

    /// Root nodes (floating windows and top-level groups) in ID order.
    pub fn roots(&self) -> impl Iterator<Item = &DockNode> {
        self.nodes.values().filter(|node| node.parent.is_none())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf node holding `window`.
    #[must_use]
    pub fn leaf_of(&self, window: WindowId) -> Option<DockNodeId> {
        self.leaves.get(&window).copied()
    }

    /// Group directly containing `window`, if it is docked.
    #[must_use]
    pub fn parent_of(&self, window: WindowId) -> Option<DockNodeId> {
        self.leaf_of(window)
            .and_then(|leaf| self.nodes.get(&leaf))
            .and_then(|node| node.parent)
    }

    /// Dock slot of `window`; `None` while floating or unknown.
    #[must_use]
    pub fn dock_to(&self, window: WindowId) -> Option<DockPosition> {
        self.leaf_of(window)
            .and_then(|leaf| self.nodes.get(&leaf))
            .and_then(|node| node.dock_to)
    }

    /// Windows under `node`, in layout order.
    #[must_use]
    pub fn windows_under(&self, node: DockNodeId) -> Vec<WindowId> {
        let mut out = Vec::new();
        self.collect_windows(node, &mut out);
        out
    }

    /// Insert a floating root leaf for a newly opened window.
    ///
    /// Re-inserting a window that already has a leaf returns the existing leaf.
    pub fn insert_leaf(&mut self, window: WindowId, bounds: Rect) -> DockNodeId {
        if let Some(existing) = self.leaf_of(window) {
            return existing;
        }
        let id = self.allocate();
        let _ = self.nodes.insert(
            id,
            DockNode {
                id,
                parent: None,
                dock_to: None,
                bounds,
                kind: DockNodeKind::Window { window },
            },
        );
        let _ = self.leaves.insert(window, id);
        id
    }

    /// Keep a floating leaf's slot in step with its window's live geometry.
    ///
    /// Docked leaves keep their slot; only root leaves follow the window.
    pub fn track_floating_bounds(&mut self, window: WindowId, bounds: Rect) {
        let Some(leaf) = self.leaf_of(window) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&leaf)
            && node.parent.is_none()
        {
            node.bounds = bounds;
        }
    }

    /// Dock `source` against `target` at `position`.
    ///
    /// A new two-child group with even sizes takes over the target's slot.
    /// If `source` was docked elsewhere it is detached first. Returns `None`
    /// when either window is unknown or both are the same window.
    pub fn merge(
        &mut self,
        source: WindowId,
        target: WindowId,
        position: DockPosition,
    ) -> Option<MergeOutcome> {
        if source == target {
            return None;
        }
        let source_leaf = self.leaf_of(source)?;
        let target_leaf = self.leaf_of(target)?;

        let mut events = Vec::new();
        let mut placements = Vec::new();
        if let Some(detached) = self.detach(source) {
            events.extend(detached.events);
            placements.extend(detached.placements);
        }

        let (slot_parent, slot_dock, slot_bounds) = {
            let node = self.nodes.get(&target_leaf)?;
            (node.parent, node.dock_to, node.bounds)
        };

        let group_id = self.allocate();
        let children = if position.incoming_first() {
            vec![source_leaf, target_leaf]
        } else {
            vec![target_leaf, source_leaf]
        };
        if let Some(parent) = slot_parent {
            self.replace_child(parent, target_leaf, group_id);
        }
        let _ = self.nodes.insert(
            group_id,
            DockNode {
                id: group_id,
                parent: slot_parent,
                dock_to: slot_dock,
                bounds: slot_bounds,
                kind: DockNodeKind::Group(DockGroup {
                    orientation: position.axis(),
                    children,
                    sizes: vec![0.5, 0.5],
                }),
            },
        );
        for (leaf, tag) in [(source_leaf, position), (target_leaf, position.opposite())] {
            if let Some(node) = self.nodes.get_mut(&leaf) {
                node.parent = Some(group_id);
                node.dock_to = Some(tag);
            }
        }

        self.relayout(group_id, slot_bounds, &mut placements);
        events.push(DockEvent::Merged {
            group: group_id,
            source,
            target,
            position,
        });
        Some(MergeOutcome {
            group: group_id,
            events,
            placements,
        })
    }

    /// Detach `window` from its group, leaving it as a floating root leaf.
    ///
    /// If the group is left with a single child, the group dissolves and that
    /// child takes over the group's slot, tag, and bounds. Returns `None` for
    /// unknown or already floating windows.
    pub fn detach(&mut self, window: WindowId) -> Option<DetachOutcome> {
        let leaf = self.leaf_of(window)?;
        let parent_id = self.nodes.get(&leaf)?.parent?;

        let mut events = vec![DockEvent::Undocked {
            window,
            group: parent_id,
        }];
        let mut placements = Vec::new();

        let remaining = {
            let parent = self.nodes.get_mut(&parent_id)?;
            let DockNodeKind::Group(group) = &mut parent.kind else {
                return None;
            };
            let index = group.children.iter().position(|child| *child == leaf)?;
            let _ = group.children.remove(index);
            let _ = group.sizes.remove(index);
            normalize_sizes(&mut group.sizes);
            group.children.clone()
        };

        if let Some(node) = self.nodes.get_mut(&leaf) {
            node.parent = None;
            node.dock_to = None;
        }

        if let [sole] = remaining.as_slice() {
            let promoted = *sole;
            let Some(group_node) = self.nodes.remove(&parent_id) else {
                return Some(DetachOutcome { events, placements });
            };
            if let Some(grandparent) = group_node.parent {
                self.replace_child(grandparent, parent_id, promoted);
            }
            if let Some(node) = self.nodes.get_mut(&promoted) {
                node.parent = group_node.parent;
                node.dock_to = group_node.dock_to;
            }
            self.relayout(promoted, group_node.bounds, &mut placements);
            events.push(DockEvent::Dissolved {
                group: parent_id,
                promoted,
                dock_to: group_node.dock_to,
            });
        } else if let Some(bounds) = self.nodes.get(&parent_id).map(|node| node.bounds) {
            self.relayout(parent_id, bounds, &mut placements);
        }

        Some(DetachOutcome { events, placements })
    }

    /// Drop `window`'s leaf entirely, detaching it first if docked.
    pub fn remove_leaf(&mut self, window: WindowId) -> Option<DetachOutcome> {
        let detached = self.detach(window);
        let leaf = self.leaves.remove(&window)?;
        let _ = self.nodes.remove(&leaf);
        Some(detached.unwrap_or(DetachOutcome {
            events: Vec::new(),
            placements: Vec::new(),
        }))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<(), DockTreeError> {
        for node in self.nodes.values() {
            match (node.parent, node.dock_to) {
                (None, Some(position)) => {
                    return Err(DockTreeError::DockTagOnRoot {
                        node: node.id,
                        position,
                    });
                }
                (Some(parent), None) => {
                    return Err(DockTreeError::MissingDockTag {
                        node: node.id,
                        parent,
                    });
                }
                _ => {}
            }
            if let Some(parent) = node.parent {
                let parent_node = self
                    .nodes
                    .get(&parent)
                    .ok_or(DockTreeError::MissingNode { node: parent })?;
                let holds_child = parent_node
                    .group()
                    .is_some_and(|group| group.children.contains(&node.id));
                if !holds_child {
                    return Err(DockTreeError::ParentChildMismatch {
                        parent,
                        child: node.id,
                    });
                }
            }
            match &node.kind {
                DockNodeKind::Window { window } => {
                    if self.leaves.get(window) != Some(&node.id) {
                        return Err(DockTreeError::LeafIndexMismatch {
                            window: *window,
                            node: node.id,
                        });
                    }
                }
                DockNodeKind::Group(group) => validate_group(self, node.id, group)?,
            }
        }
        for (window, leaf) in &self.leaves {
            let holds = self
                .nodes
                .get(leaf)
                .is_some_and(|node| node.window() == Some(*window));
            if !holds {
                return Err(DockTreeError::LeafIndexMismatch {
                    window: *window,
                    node: *leaf,
                });
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> DockNodeId {
        self.next_id += 1;
        DockNodeId(self.next_id)
    }

    fn replace_child(&mut self, parent: DockNodeId, old: DockNodeId, new: DockNodeId) {
        if let Some(DockNode {
            kind: DockNodeKind::Group(group),
            ..
        }) = self.nodes.get_mut(&parent)
            && let Some(slot) = group.children.iter_mut().find(|child| **child == old)
        {
            *slot = new;
        }
    }

    fn relayout(&mut self, node_id: DockNodeId, bounds: Rect, placements: &mut Placements) {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return;
        };
        node.bounds = bounds;
        match &node.kind {
            DockNodeKind::Window { window } => placements.push((*window, bounds)),
            DockNodeKind::Group(group) => {
                let slices = bounds.split_fractions(group.orientation, &group.sizes);
                let children = group.children.clone();
                for (child, slice) in children.into_iter().zip(slices) {
                    self.relayout(child, slice, placements);
                }
            }
        }
    }

    fn collect_windows(&self, node_id: DockNodeId, out: &mut Vec<WindowId>) {
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };
        match &node.kind {
            DockNodeKind::Window { window } => out.push(*window),
            DockNodeKind::Group(group) => {
                for child in &group.children {
                    self.collect_windows(*child, out);
                }
            }
        }
    }
}

fn normalize_sizes(sizes: &mut [f64]) {
    let total: f64 = sizes.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        let even = 1.0 / sizes.len().max(1) as f64;
        sizes.iter_mut().for_each(|size| *size = even);
        return;
    }
    sizes.iter_mut().for_each(|size| *size /= total);
}

fn validate_group(tree: &DockTree, id: DockNodeId, group: &DockGroup) -> Result<(), DockTreeError> {
    if group.children.len() != group.sizes.len() {
        return Err(DockTreeError::SizeCountMismatch {
            group: id,
            children: group.children.len(),
            sizes: group.sizes.len(),
        });
    }
    if group.children.len() < 2 {
        return Err(DockTreeError::UndersizedGroup {
            group: id,
            children: group.children.len(),
        });
    }
    let sum: f64 = group.sizes.iter().sum();
    if (sum - 1.0).abs() > SIZE_SUM_TOLERANCE {
        return Err(DockTreeError::SizesNotNormalized { group: id, sum });
    }
    for child in &group.children {
        let node = tree
            .nodes
            .get(child)
            .ok_or(DockTreeError::MissingNode { node: *child })?;
        if node.parent != Some(id) {
            return Err(DockTreeError::ParentChildMismatch {
                parent: id,
                child: *child,
            });
        }
    }
    Ok(())
}

/// Structural invariant violations reported by [`DockTree::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum DockTreeError {
    MissingNode {
        node: DockNodeId,
    },
    ParentChildMismatch {
        parent: DockNodeId,
        child: DockNodeId,
    },
    SizeCountMismatch {
        group: DockNodeId,
        children: usize,
        sizes: usize,
    },
    UndersizedGroup {
        group: DockNodeId,
        children: usize,
    },
    SizesNotNormalized {
        group: DockNodeId,
        sum: f64,
    },
    DockTagOnRoot {
        node: DockNodeId,
        position: DockPosition,
    },
    MissingDockTag {
        node: DockNodeId,
        parent: DockNodeId,
    },
    LeafIndexMismatch {
        window: WindowId,
        node: DockNodeId,
    },
}

impl fmt::Display for DockTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode { node } => write!(f, "node {node} not found"),
            Self::ParentChildMismatch { parent, child } => {
                write!(f, "parent {parent} and child {child} disagree on their link")
            }
            Self::SizeCountMismatch {
                group,
                children,
                sizes,
            } => write!(f, "group {group} has {children} children but {sizes} sizes"),
            Self::UndersizedGroup { group, children } => {
                write!(f, "group {group} has only {children} child(ren)")
            }
            Self::SizesNotNormalized { group, sum } => {
                write!(f, "group {group} sizes sum to {sum}, expected 1")
            }
            Self::DockTagOnRoot { node, position } => {
                write!(f, "root node {node} carries dock tag {position:?}")
            }
            Self::MissingDockTag { node, parent } => {
                write!(f, "node {node} inside group {parent} has no dock tag")
            }
            Self::LeafIndexMismatch { window, node } => {
                write!(f, "window {window} and leaf {node} disagree")
            }
        }
    }
}

impl std::error::Error for DockTreeError {}
