#![forbid(unsafe_code)]

//! Window geometry store.
//!
//! [`WindowStore`] is the single source of truth for window instances and the
//! dock forest. The render layer reads it; gestures and menu actions write
//! through it immediately, without batching.
//!
//! # Failure Modes
//!
//! - Operations naming an unknown window are silent no-ops. Closing a window
//!   while a gesture timer still references it is an expected race, not an
//!   error.
//! - Sizes below the configured floor are clamped up, never rejected.
//! - Opacity writes are clamped into `[0, 1]`.

use std::collections::BTreeMap;

use floatdock_core::geometry::{Point, Rect, Size};
use tracing::{debug, trace, warn};

use crate::dock::{DockPosition, DockPreview};
use crate::tree::{DockEvent, DockTree, Placements};
use crate::window::{
    DEFAULT_CASCADE_STEP, DEFAULT_WINDOW_ORIGIN, DEFAULT_WINDOW_SIZE, WindowId, WindowInstance,
    WindowOptions, WindowPatch, clamp_opacity,
};

/// Cascade offsets wrap after this many windows.
const CASCADE_WRAP: usize = 10;

/// In-memory registry of windows and their dock arrangement.
#[derive(Debug, Clone)]
pub struct WindowStore {
    min_size: Size,
    next_id: WindowId,
    windows: BTreeMap<WindowId, WindowInstance>,
    tree: DockTree,
    events: Vec<DockEvent>,
    revision: u64,
}

impl Default for WindowStore {
    fn default() -> Self {
        Self::new(Size::new(
            floatdock_core::config::MIN_WINDOW_WIDTH,
            floatdock_core::config::MIN_WINDOW_HEIGHT,
        ))
    }
}

impl WindowStore {
    /// Create an empty store with the given size floor.
    #[must_use]
    pub fn new(min_size: Size) -> Self {
        Self {
            min_size,
            next_id: WindowId::MIN,
            windows: BTreeMap::new(),
            tree: DockTree::new(),
            events: Vec::new(),
            revision: 0,
        }
    }

    /// Size floor applied to every geometry write.
    #[must_use]
    pub const fn min_size(&self) -> Size {
        self.min_size
    }

    /// Counter bumped on every applied mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Read access to the dock forest.
    #[must_use]
    pub const fn dock_tree(&self) -> &DockTree {
        &self.tree
    }

    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&WindowInstance> {
        self.windows.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    /// All windows in ID order.
    pub fn windows(&self) -> impl Iterator<Item = &WindowInstance> {
        self.windows.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Visible windows, topmost first.
    ///
    /// Always-on-top windows stack above the rest; within each layer higher
    /// `z_index` wins and ties fall back to the newer window.
    #[must_use]
    pub fn visible_windows(&self) -> Vec<&WindowInstance> {
        let mut visible: Vec<_> = self.windows.values().filter(|w| w.visible).collect();
        visible.sort_by(|a, b| {
            b.always_on_top
                .cmp(&a.always_on_top)
                .then(b.z_index.cmp(&a.z_index))
                .then(b.id.cmp(&a.id))
        });
        visible
    }

    /// Open a window and insert it as a floating leaf.
    pub fn create(&mut self, kind: impl Into<String>, options: WindowOptions) -> WindowId {
        let id = self.next_id;
        self.next_id = id.next();

        let cascade = (self.windows.len() % CASCADE_WRAP) as f64 * DEFAULT_CASCADE_STEP;
        let position = options
            .position
            .filter(|p| p.is_finite())
            .unwrap_or_else(|| DEFAULT_WINDOW_ORIGIN.offset(cascade, cascade));
        let size = options
            .size
            .unwrap_or(DEFAULT_WINDOW_SIZE)
            .at_least(self.min_size);
        let kind = kind.into();
        let window = WindowInstance {
            id,
            title: options.title.unwrap_or_else(|| kind.clone()),
            kind,
            position,
            size,
            opacity: clamp_opacity(options.opacity.unwrap_or(1.0), 1.0),
            z_index: self.top_z().saturating_add(1),
            always_on_top: options.always_on_top,
            visible: options.visible,
            dock_to: None,
        };
        self.tree.insert_leaf(id, window.bounds());
        debug!(target: "floatdock.store", window = id.get(), kind = %window.kind, "window created");
        let _ = self.windows.insert(id, window);
        self.bump();
        id
    }

    /// Shallow-merge `patch` into a window. Returns `false` for unknown IDs.
    pub fn update(&mut self, id: WindowId, patch: WindowPatch) -> bool {
        let min_size = self.min_size;
        let Some(window) = self.windows.get_mut(&id) else {
            trace!(target: "floatdock.store", window = id.get(), "update ignored: unknown window");
            return false;
        };
        let touches_geometry = patch.touches_geometry();
        if let Some(title) = patch.title {
            window.title = title;
        }
        if let Some(position) = patch.position.filter(|p| p.is_finite()) {
            window.position = position;
        }
        if let Some(size) = patch.size {
            window.size = size.at_least(min_size);
        }
        if let Some(opacity) = patch.opacity {
            window.opacity = clamp_opacity(opacity, window.opacity);
        }
        if let Some(always_on_top) = patch.always_on_top {
            window.always_on_top = always_on_top;
        }
        if let Some(visible) = patch.visible {
            window.visible = visible;
        }
        let bounds = window.bounds();
        if touches_geometry {
            self.tree.track_floating_bounds(id, bounds);
        }
        self.bump();
        true
    }

    /// Move a window's top-left corner.
    pub fn move_to(&mut self, id: WindowId, position: Point) -> bool {
        self.update(id, WindowPatch::position(position))
    }

    /// Resize a window, clamping to the size floor.
    pub fn resize(&mut self, id: WindowId, size: Size) -> bool {
        self.update(id, WindowPatch::size(size))
    }

    /// Set opacity, clamped into `[0, 1]`.
    pub fn set_opacity(&mut self, id: WindowId, opacity: f64) -> bool {
        self.update(id, WindowPatch::opacity(opacity))
    }

    /// Flip `always_on_top`, returning the new value.
    pub fn toggle_always_on_top(&mut self, id: WindowId) -> Option<bool> {
        let window = self.windows.get_mut(&id)?;
        window.always_on_top = !window.always_on_top;
        let now_on_top = window.always_on_top;
        debug!(target: "floatdock.store", window = id.get(), always_on_top = now_on_top, "pin toggled");
        self.bump();
        Some(now_on_top)
    }

    /// Raise a window above every tracked window. Returns the new `z_index`.
    pub fn focus(&mut self, id: WindowId) -> Option<u32> {
        let current = self.windows.get(&id)?.z_index;
        let top = self.top_z();
        if current == top && self.windows.values().filter(|w| w.z_index == top).count() == 1 {
            return Some(top);
        }
        let z = top.saturating_add(1);
        if let Some(window) = self.windows.get_mut(&id) {
            window.z_index = z;
        }
        self.bump();
        Some(z)
    }

    /// Close a window. A docked window is undocked first, dissolving its
    /// group when only one sibling remains.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowInstance> {
        let removed = self.windows.remove(&id)?;
        if let Some(outcome) = self.tree.remove_leaf(id) {
            self.apply_structural(outcome.events, outcome.placements);
        }
        debug!(target: "floatdock.store", window = id.get(), "window removed");
        self.bump();
        Some(removed)
    }

    /// Dock `source` onto `target` at `position`.
    ///
    /// Returns `false` when either window is unknown, they are the same
    /// window, or either one is hidden.
    pub fn dock(&mut self, source: WindowId, target: WindowId, position: DockPosition) -> bool {
        let visible = |id: WindowId| self.windows.get(&id).is_some_and(|w| w.visible);
        if !visible(source) || !visible(target) {
            trace!(
                target: "floatdock.dock",
                source = source.get(),
                target_window = target.get(),
                "dock ignored: window missing or hidden"
            );
            return false;
        }
        let Some(outcome) = self.tree.merge(source, target, position) else {
            return false;
        };
        debug!(
            target: "floatdock.dock",
            source = source.get(),
            target_window = target.get(),
            position = ?position,
            group = outcome.group.get(),
            "dock committed"
        );
        self.apply_structural(outcome.events, outcome.placements);
        self.bump();
        true
    }

    /// Commit a preview produced while dragging `source`.
    pub fn commit_preview(&mut self, source: WindowId, preview: &DockPreview) -> bool {
        self.dock(source, preview.target, preview.position())
    }

    /// Detach a window from its dock group. Returns `false` if it was not docked.
    pub fn undock(&mut self, id: WindowId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let Some(outcome) = self.tree.detach(id) else {
            return false;
        };
        debug!(target: "floatdock.dock", window = id.get(), "window undocked");
        self.apply_structural(outcome.events, outcome.placements);
        self.bump();
        true
    }

    /// Put a docked window back onto its slot in the dock tree.
    ///
    /// Returns `true` if the window's bounds changed. Floating and unknown
    /// windows are left alone.
    pub fn settle_docked(&mut self, id: WindowId) -> bool {
        let Some(slot) = self
            .tree
            .leaf_of(id)
            .and_then(|leaf| self.tree.node(leaf))
            .filter(|node| node.parent.is_some())
            .map(|node| node.bounds)
        else {
            return false;
        };
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        if window.bounds() == slot {
            return false;
        }
        window.position = slot.origin();
        window.size = slot.size();
        debug!(target: "floatdock.dock", window = id.get(), "docked window settled into slot");
        self.bump();
        true
    }

    /// Take the structural events committed since the last drain.
    pub fn drain_events(&mut self) -> Vec<DockEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events committed since the last drain, without consuming them.
    #[must_use]
    pub fn pending_events(&self) -> &[DockEvent] {
        &self.events
    }

    fn apply_structural(&mut self, events: Vec<DockEvent>, placements: Placements) {
        for (window_id, bounds) in placements {
            if let Some(window) = self.windows.get_mut(&window_id) {
                window.position = bounds.origin();
                window.size = bounds.size();
            }
        }
        for window in self.windows.values_mut() {
            window.dock_to = self.tree.dock_to(window.id);
        }
        if let Err(err) = self.tree.validate() {
            warn!(target: "floatdock.dock", error = %err, "dock tree invariant violated");
        }
        self.events.extend(events);
    }

    fn top_z(&self) -> u32 {
        self.windows.values().map(|w| w.z_index).max().unwrap_or(0)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Bounds of every visible window except `exclude`, topmost first.
    #[must_use]
    pub fn dock_candidates(&self, exclude: WindowId) -> Vec<(WindowId, Rect)> {
        self.visible_windows()
            .into_iter()
            .filter(|w| w.id != exclude)
            .map(|w| (w.id, w.bounds()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::DockKind;

    fn store_with_pair() -> (WindowStore, WindowId, WindowId) {
        let mut store = WindowStore::default();
        let a = store.create("editor", WindowOptions::at(Rect::new(100.0, 100.0, 400.0, 300.0)));
        let b = store.create("chat", WindowOptions::at(Rect::new(520.0, 100.0, 400.0, 300.0)));
        (store, a, b)
    }

    // --- create / update ---

    #[test]
    fn create_allocates_unique_ids_and_cascades() {
        let mut store = WindowStore::default();
        let a = store.create("chat", WindowOptions::default());
        let b = store.create("chat", WindowOptions::default());
        assert_ne!(a, b);
        let pa = store.get(a).unwrap().position;
        let pb = store.get(b).unwrap().position;
        assert_eq!(pb, pa.offset(DEFAULT_CASCADE_STEP, DEFAULT_CASCADE_STEP));
        assert_eq!(store.get(a).unwrap().title, "chat");
        assert!(store.dock_tree().leaf_of(a).is_some());
    }

    #[test]
    fn ids_are_not_reused_after_remove() {
        let mut store = WindowStore::default();
        let a = store.create("x", WindowOptions::default());
        store.remove(a).unwrap();
        let b = store.create("x", WindowOptions::default());
        assert!(b > a);
    }

    #[test]
    fn update_unknown_id_is_silent_noop() {
        let (mut store, _, _) = store_with_pair();
        let revision = store.revision();
        let ghost = WindowId::new(99).unwrap();
        assert!(!store.update(ghost, WindowPatch::opacity(0.2)));
        assert!(!store.move_to(ghost, Point::new(1.0, 1.0)));
        assert_eq!(store.toggle_always_on_top(ghost), None);
        assert_eq!(store.focus(ghost), None);
        assert!(store.remove(ghost).is_none());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let (mut store, a, _) = store_with_pair();
        assert!(store.update(
            a,
            WindowPatch {
                title: Some("Renamed".into()),
                ..WindowPatch::default()
            }
        ));
        let window = store.get(a).unwrap();
        assert_eq!(window.title, "Renamed");
        assert_eq!(window.position, Point::new(100.0, 100.0));
        assert_eq!(window.opacity, 1.0);
    }

    #[test]
    fn resize_clamps_to_floor() {
        let (mut store, a, _) = store_with_pair();
        store.resize(a, Size::new(10.0, -4.0));
        assert_eq!(store.get(a).unwrap().size, store.min_size());
    }

    #[test]
    fn opacity_is_clamped() {
        let (mut store, a, _) = store_with_pair();
        store.set_opacity(a, 3.0);
        assert_eq!(store.get(a).unwrap().opacity, 1.0);
        store.set_opacity(a, -1.0);
        assert_eq!(store.get(a).unwrap().opacity, 0.0);
    }

    // --- z-order ---

    #[test]
    fn focus_raises_above_all() {
        let (mut store, a, b) = store_with_pair();
        let z = store.focus(a).unwrap();
        assert!(z > store.get(b).unwrap().z_index);
        // Focusing the sole topmost window keeps its value.
        assert_eq!(store.focus(a), Some(z));
        assert_eq!(store.visible_windows()[0].id, a);
    }

    #[test]
    fn pinned_windows_sort_first() {
        let (mut store, a, b) = store_with_pair();
        store.toggle_always_on_top(a);
        store.focus(b);
        let order: Vec<_> = store.visible_windows().iter().map(|w| w.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn hidden_windows_are_not_candidates() {
        let (mut store, a, b) = store_with_pair();
        store.update(
            b,
            WindowPatch {
                visible: Some(false),
                ..WindowPatch::default()
            },
        );
        assert!(store.dock_candidates(a).is_empty());
        assert!(!store.dock(a, b, DockPosition::Left));
    }

    // --- docking ---

    #[test]
    fn dock_commit_sets_geometry_and_tags() {
        let (mut store, a, b) = store_with_pair();
        assert!(store.dock(a, b, DockPosition::Left));
        let wa = store.get(a).unwrap();
        let wb = store.get(b).unwrap();
        assert_eq!(wa.bounds(), Rect::new(520.0, 100.0, 200.0, 300.0));
        assert_eq!(wb.bounds(), Rect::new(720.0, 100.0, 200.0, 300.0));
        assert_eq!(wa.dock_to, Some(DockPosition::Left));
        assert_eq!(wb.dock_to, Some(DockPosition::Right));
        assert!(matches!(store.drain_events().as_slice(), [DockEvent::Merged { .. }]));
        assert!(store.pending_events().is_empty());
    }

    #[test]
    fn commit_preview_uses_preview_target() {
        let (mut store, a, b) = store_with_pair();
        let preview = crate::dock::DockZone::for_position(
            store.get(b).unwrap().bounds(),
            DockPosition::Top,
        )
        .for_target(b);
        assert_eq!(preview.zone.kind, DockKind::Squeeze);
        assert!(store.commit_preview(a, &preview));
        assert_eq!(store.get(a).unwrap().dock_to, Some(DockPosition::Top));
    }

    #[test]
    fn remove_docked_window_dissolves_group() {
        let (mut store, a, b) = store_with_pair();
        store.dock(a, b, DockPosition::Left);
        store.drain_events();
        store.remove(a).unwrap();
        let wb = store.get(b).unwrap();
        assert_eq!(wb.dock_to, None);
        assert_eq!(wb.bounds(), Rect::new(520.0, 100.0, 400.0, 300.0));
        assert!(matches!(
            store.drain_events().as_slice(),
            [DockEvent::Undocked { .. }, DockEvent::Dissolved { .. }]
        ));
        assert!(store.dock_tree().validate().is_ok());
    }

    #[test]
    fn undock_floating_window_is_noop() {
        let (mut store, a, _) = store_with_pair();
        assert!(!store.undock(a));
        assert!(!store.undock(WindowId::new(77).unwrap()));
    }

    #[test]
    fn moving_floating_window_tracks_leaf_bounds() {
        let (mut store, a, _) = store_with_pair();
        store.move_to(a, Point::new(10.0, 20.0));
        let leaf = store.dock_tree().leaf_of(a).unwrap();
        let bounds = store.dock_tree().node(leaf).unwrap().bounds;
        assert_eq!(bounds.origin(), Point::new(10.0, 20.0));
    }

    #[test]
    fn settle_docked_restores_slot_after_free_move() {
        let (mut store, a, b) = store_with_pair();
        store.dock(a, b, DockPosition::Left);
        store.move_to(a, Point::new(900.0, 700.0));
        assert!(store.settle_docked(a));
        assert_eq!(store.get(a).unwrap().bounds(), Rect::new(520.0, 100.0, 200.0, 300.0));
        assert!(!store.settle_docked(a));

        let c = store.create("explorer", WindowOptions::at(Rect::new(0.0, 0.0, 300.0, 200.0)));
        store.move_to(c, Point::new(40.0, 40.0));
        assert!(!store.settle_docked(c));
        assert_eq!(store.get(c).unwrap().position, Point::new(40.0, 40.0));
    }
}
