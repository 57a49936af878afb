#![forbid(unsafe_code)]

//! Multi-window interaction engine.
//!
//! [`InteractionEngine`] owns the [`WindowStore`], one [`GestureSession`] per
//! pressed window, and the injected [`WindowHost`]. Every entry point runs to
//! completion on the caller's event loop and then mirrors whatever it changed
//! to the host.
//!
//! # Design Notes
//!
//! - Sessions are keyed by window, so simultaneous gestures on different
//!   windows keep independent clocks and timers. The store is the only shared
//!   state and `&mut self` serializes every write.
//! - A second press on the same window interrupts the old session before the
//!   new one starts; half-finished sessions are never resumed.
//! - Host errors are logged and swallowed. A failed native move must not
//!   strand a gesture.

use std::collections::BTreeMap;

use floatdock_core::config::InteractionConfig;
use floatdock_core::event::PointerSample;
use floatdock_core::geometry::Rect;
use floatdock_layout::{
    DockEvent, DockPosition, DockPreview, WindowId, WindowInstance, WindowOptions, WindowPatch,
    WindowStore,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::gesture::{GestureOutcome, GestureSession, Stage};
use crate::host::{DetachedHost, WindowHost};

/// Last values pushed to the host for one window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mirrored {
    bounds: Rect,
    opacity: f64,
    always_on_top: bool,
}

impl Mirrored {
    fn of(window: &WindowInstance) -> Self {
        Self {
            bounds: window.bounds(),
            opacity: window.opacity,
            always_on_top: window.always_on_top,
        }
    }
}

/// Window store, gesture sessions, and host wiring for one screen.
#[derive(Debug)]
pub struct InteractionEngine<H: WindowHost = DetachedHost> {
    config: InteractionConfig,
    viewport: Rect,
    store: WindowStore,
    sessions: BTreeMap<WindowId, GestureSession>,
    host: H,
    mirrored: FxHashMap<WindowId, Mirrored>,
}

impl InteractionEngine<DetachedHost> {
    /// Engine without a native host.
    #[must_use]
    pub fn headless(config: InteractionConfig, viewport: Rect) -> Self {
        Self::new(config, viewport, DetachedHost)
    }
}

impl<H: WindowHost> InteractionEngine<H> {
    /// Create an engine. The store's size floor comes from `config`.
    #[must_use]
    pub fn new(config: InteractionConfig, viewport: Rect, host: H) -> Self {
        let store = WindowStore::new(config.min_window_size());
        Self {
            config,
            viewport,
            store,
            sessions: BTreeMap::new(),
            host,
            mirrored: FxHashMap::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Screen area available to windows.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Update the screen area. Sessions already in progress keep the slider
    /// band they started with.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Read access for the render layer.
    #[must_use]
    pub const fn store(&self) -> &WindowStore {
        &self.store
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -----------------------------------------------------------------------
    // Window lifecycle and explicit actions
    // -----------------------------------------------------------------------

    /// Open a window.
    pub fn create(&mut self, kind: impl Into<String>, options: WindowOptions) -> WindowId {
        let id = self.store.create(kind, options);
        self.sync_host();
        id
    }

    /// Close a window. Any gesture on it aborts and previews aimed at it are
    /// dropped.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowInstance> {
        let removed = self.store.remove(id)?;
        if self.sessions.remove(&id).is_some() {
            debug!(target: "floatdock.gesture", window = id.get(), "gesture aborted: window closed");
        }
        for session in self.sessions.values_mut() {
            session.forget_target(id);
        }
        self.sync_host();
        Some(removed)
    }

    /// Raise a window to the top of the z-order.
    pub fn focus(&mut self, id: WindowId) -> Option<u32> {
        let z = self.store.focus(id);
        self.sync_host();
        z
    }

    /// Shallow-merge fields into a window, e.g. after an OS-level move.
    pub fn update(&mut self, id: WindowId, patch: WindowPatch) -> bool {
        let applied = self.store.update(id, patch);
        self.sync_host();
        applied
    }

    /// Menu/keyboard pin toggle.
    pub fn toggle_pin(&mut self, id: WindowId) -> Option<bool> {
        let pinned = self.store.toggle_always_on_top(id);
        self.sync_host();
        pinned
    }

    /// Menu/keyboard opacity change.
    pub fn set_opacity(&mut self, id: WindowId, opacity: f64) -> bool {
        let applied = self.store.set_opacity(id, opacity);
        self.sync_host();
        applied
    }

    /// Dock without a gesture.
    pub fn dock(&mut self, source: WindowId, target: WindowId, position: DockPosition) -> bool {
        let docked = self.store.dock(source, target, position);
        self.sync_host();
        docked
    }

    /// Menu/keyboard undock.
    pub fn undock(&mut self, id: WindowId) -> bool {
        let undocked = self.store.undock(id);
        self.sync_host();
        undocked
    }

    /// Structural commits since the last drain, for layout persistence.
    pub fn drain_events(&mut self) -> Vec<DockEvent> {
        self.store.drain_events()
    }

    // -----------------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------------

    /// Pointer pressed on `window`'s draggable region.
    ///
    /// Returns `false` for unknown windows.
    pub fn pointer_down(&mut self, window: WindowId, sample: PointerSample) -> bool {
        if let Some(mut stale) = self.sessions.remove(&window) {
            trace!(target: "floatdock.gesture", window = window.get(), "replacing unfinished session");
            let _ = stale.interrupt(&mut self.store);
        }
        let started = GestureSession::begin(window, &sample, &self.store, &self.config, self.viewport);
        let pressed = match started {
            Some(session) => {
                let _ = self.sessions.insert(window, session);
                true
            }
            None => false,
        };
        self.sync_host();
        pressed
    }

    /// Pointer moved while pressed on `window`.
    ///
    /// Returns `Some` only when the session aborted; it is gone afterwards.
    pub fn pointer_move(&mut self, window: WindowId, sample: PointerSample) -> Option<GestureOutcome> {
        let outcome = self
            .sessions
            .get_mut(&window)
            .and_then(|session| session.pointer_move(&sample, &mut self.store));
        if outcome.is_some() {
            let _ = self.sessions.remove(&window);
        }
        self.sync_host();
        outcome
    }

    /// Pointer released. `None` if no gesture was active on `window`.
    pub fn pointer_up(&mut self, window: WindowId, sample: PointerSample) -> Option<GestureOutcome> {
        let mut session = self.sessions.remove(&window)?;
        let outcome = session.pointer_up(&sample, &mut self.store);
        self.sync_host();
        Some(outcome)
    }

    /// Pointer left the tracked surface mid-gesture.
    pub fn interrupt(&mut self, window: WindowId) -> Option<GestureOutcome> {
        let mut session = self.sessions.remove(&window)?;
        let outcome = session.interrupt(&mut self.store);
        self.sync_host();
        Some(outcome)
    }

    /// Progress timer callback for every active session.
    ///
    /// Returns the outcomes of sessions that aborted on this tick.
    pub fn tick(&mut self, now_ms: u64) -> Vec<GestureOutcome> {
        let mut aborted = Vec::new();
        let store = &mut self.store;
        self.sessions.retain(|_, session| match session.tick(now_ms, store) {
            Some(outcome) => {
                aborted.push(outcome);
                false
            }
            None => true,
        });
        self.sync_host();
        aborted
    }

    /// Earliest timer deadline across sessions; `None` when no timer is armed.
    #[must_use]
    pub fn next_tick_at(&self) -> Option<u64> {
        self.sessions.values().filter_map(GestureSession::next_tick_at).min()
    }

    // -----------------------------------------------------------------------
    // Session queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn session(&self, window: WindowId) -> Option<&GestureSession> {
        self.sessions.get(&window)
    }

    #[must_use]
    pub fn stage(&self, window: WindowId) -> Option<Stage> {
        self.sessions.get(&window).map(GestureSession::stage)
    }

    /// Hold progress of the press on `window`, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, window: WindowId) -> Option<f64> {
        self.sessions.get(&window).map(GestureSession::progress)
    }

    #[must_use]
    pub fn preview(&self, window: WindowId) -> Option<&DockPreview> {
        self.sessions.get(&window).and_then(GestureSession::preview)
    }

    /// Every active preview, keyed by the dragged window.
    pub fn previews(&self) -> impl Iterator<Item = (WindowId, &DockPreview)> {
        self.sessions
            .iter()
            .filter_map(|(id, session)| session.preview().map(|preview| (*id, preview)))
    }

    // -----------------------------------------------------------------------
    // Host mirroring
    // -----------------------------------------------------------------------

    fn sync_host(&mut self) {
        let store = &self.store;
        let host = &mut self.host;
        let mirrored = &mut self.mirrored;

        mirrored.retain(|id, _| {
            let alive = store.contains(*id);
            if !alive {
                host.release(*id);
            }
            alive
        });

        for window in store.windows() {
            let next = Mirrored::of(window);
            let previous = mirrored.insert(window.id, next);
            if previous.map(|p| p.bounds) != Some(next.bounds)
                && let Err(err) = host.apply_geometry(window.id, next.bounds)
            {
                warn!(target: "floatdock.host", window = window.id.get(), error = %err, "apply_geometry failed");
            }
            if previous.map(|p| p.opacity) != Some(next.opacity)
                && let Err(err) = host.apply_opacity(window.id, next.opacity)
            {
                warn!(target: "floatdock.host", window = window.id.get(), error = %err, "apply_opacity failed");
            }
            if previous.map(|p| p.always_on_top) != Some(next.always_on_top)
                && let Err(err) = host.apply_always_on_top(window.id, next.always_on_top)
            {
                warn!(target: "floatdock.host", window = window.id.get(), error = %err, "apply_always_on_top failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt;
    use floatdock_core::geometry::Point;

    #[derive(Debug)]
    struct HostError;

    impl fmt::Display for HostError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("native window gone")
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Geometry(WindowId, Rect),
        Opacity(WindowId, f64),
        OnTop(WindowId, bool),
        Release(WindowId),
    }

    #[derive(Debug, Default)]
    struct RecordingHost {
        calls: Vec<Call>,
        fail_geometry: bool,
    }

    impl WindowHost for RecordingHost {
        type Error = HostError;

        fn apply_geometry(&mut self, window: WindowId, bounds: Rect) -> Result<(), Self::Error> {
            self.calls.push(Call::Geometry(window, bounds));
            if self.fail_geometry { Err(HostError) } else { Ok(()) }
        }

        fn apply_opacity(&mut self, window: WindowId, opacity: f64) -> Result<(), Self::Error> {
            self.calls.push(Call::Opacity(window, opacity));
            Ok(())
        }

        fn apply_always_on_top(
            &mut self,
            window: WindowId,
            always_on_top: bool,
        ) -> Result<(), Self::Error> {
            self.calls.push(Call::OnTop(window, always_on_top));
            Ok(())
        }

        fn release(&mut self, window: WindowId) {
            self.calls.push(Call::Release(window));
        }
    }

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

    fn sample(x: f64, y: f64, t: u64) -> PointerSample {
        PointerSample::at_screen(x, y, t).expect("finite test sample")
    }

    fn engine() -> (InteractionEngine<RecordingHost>, WindowId, WindowId) {
        let mut engine =
            InteractionEngine::new(InteractionConfig::default(), VIEWPORT, RecordingHost::default());
        let a = engine.create("editor", WindowOptions::at(Rect::new(100.0, 100.0, 400.0, 300.0)));
        let b = engine.create("chat", WindowOptions::at(Rect::new(520.0, 100.0, 400.0, 300.0)));
        engine.host_mut().calls.clear();
        (engine, a, b)
    }

    // --- host mirroring ---

    #[test]
    fn create_pushes_initial_state() {
        let mut engine = InteractionEngine::new(
            InteractionConfig::default(),
            VIEWPORT,
            RecordingHost::default(),
        );
        let a = engine.create("chat", WindowOptions::at(Rect::new(0.0, 0.0, 300.0, 200.0)));
        assert_eq!(
            engine.host().calls,
            vec![
                Call::Geometry(a, Rect::new(0.0, 0.0, 300.0, 200.0)),
                Call::Opacity(a, 1.0),
                Call::OnTop(a, false),
            ]
        );
    }

    #[test]
    fn only_changed_values_reach_the_host() {
        let (mut engine, a, _) = engine();
        assert_eq!(engine.toggle_pin(a), Some(true));
        assert_eq!(engine.host().calls, vec![Call::OnTop(a, true)]);
        engine.host_mut().calls.clear();
        engine.focus(a);
        assert!(engine.host().calls.is_empty());
    }

    #[test]
    fn dock_commit_moves_both_native_windows() {
        let (mut engine, a, b) = engine();
        assert!(engine.dock(a, b, DockPosition::Left));
        assert_eq!(
            engine.host().calls,
            vec![
                Call::Geometry(a, Rect::new(520.0, 100.0, 200.0, 300.0)),
                Call::Geometry(b, Rect::new(720.0, 100.0, 200.0, 300.0)),
            ]
        );
        assert_eq!(engine.drain_events().len(), 1);
    }

    #[test]
    fn removal_releases_native_window() {
        let (mut engine, a, _) = engine();
        engine.remove(a).unwrap();
        assert_eq!(engine.host().calls, vec![Call::Release(a)]);
    }

    #[test]
    fn host_errors_do_not_strand_gestures() {
        let (mut engine, a, _) = engine();
        engine.host_mut().fail_geometry = true;
        assert!(engine.pointer_down(a, sample(300.0, 250.0, 0)));
        engine.tick(700);
        engine.pointer_move(a, sample(400.0, 250.0, 720));
        assert_eq!(engine.store().get(a).unwrap().position, Point::new(200.0, 100.0));
        assert!(matches!(
            engine.pointer_up(a, sample(400.0, 250.0, 760)),
            Some(GestureOutcome::Moved { .. })
        ));
    }

    // --- sessions ---

    #[test]
    fn sessions_are_independent_per_window() {
        let (mut engine, a, b) = engine();
        engine.pointer_down(a, sample(300.0, 250.0, 0));
        engine.pointer_down(b, sample(720.0, 250.0, 500));
        engine.tick(800);
        assert_eq!(engine.stage(a), Some(Stage::Dragging));
        assert_eq!(engine.stage(b), Some(Stage::Normal));
        assert_eq!(engine.next_tick_at(), Some(816));
        engine.tick(2_000);
        assert_eq!(engine.stage(a), Some(Stage::Selecting));
        assert_eq!(engine.stage(b), Some(Stage::Selecting));
        assert_eq!(engine.next_tick_at(), None);
    }

    #[test]
    fn second_press_replaces_unfinished_session() {
        let (mut engine, a, _) = engine();
        engine.pointer_down(a, sample(300.0, 250.0, 0));
        engine.tick(700);
        engine.pointer_move(a, sample(400.0, 250.0, 720));
        engine.pointer_down(a, sample(400.0, 250.0, 900));
        assert_eq!(engine.stage(a), Some(Stage::Normal));
        // The old drag was rolled back before the fresh snapshot.
        let session = engine.session(a).unwrap();
        assert_eq!(session.snapshot().position, Point::new(100.0, 100.0));
    }

    #[test]
    fn unknown_window_press_is_rejected() {
        let (mut engine, _, _) = engine();
        let ghost = WindowId::new(99).unwrap();
        assert!(!engine.pointer_down(ghost, sample(0.0, 0.0, 0)));
        assert_eq!(engine.pointer_up(ghost, sample(0.0, 0.0, 10)), None);
        assert_eq!(engine.interrupt(ghost), None);
    }

    #[test]
    fn closing_a_target_clears_other_previews() {
        let (mut engine, a, b) = engine();
        engine.pointer_down(a, sample(300.0, 250.0, 0));
        engine.tick(700);
        engine.pointer_move(a, sample(525.0, 250.0, 760));
        assert_eq!(engine.previews().count(), 1);
        engine.remove(b).unwrap();
        assert!(engine.preview(a).is_none());
        assert_eq!(engine.stage(a), Some(Stage::Dragging));
    }

    #[test]
    fn closing_the_dragged_window_drops_its_session() {
        let (mut engine, a, _) = engine();
        engine.pointer_down(a, sample(300.0, 250.0, 0));
        engine.remove(a).unwrap();
        assert!(engine.session(a).is_none());
        assert_eq!(engine.pointer_move(a, sample(310.0, 250.0, 10)), None);
    }

    #[test]
    fn progress_tracks_hold_time() {
        let (mut engine, a, _) = engine();
        engine.pointer_down(a, sample(300.0, 250.0, 0));
        engine.tick(750);
        assert_eq!(engine.progress(a), Some(0.5));
        engine.pointer_up(a, sample(300.0, 250.0, 760));
        assert_eq!(engine.progress(a), None);
    }

    #[test]
    fn engine_uses_configured_size_floor() {
        let config = InteractionConfig {
            min_window_width: 300.0,
            ..InteractionConfig::default()
        };
        let mut engine = InteractionEngine::headless(config, VIEWPORT);
        let id = engine.create("tiny", WindowOptions::at(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(engine.store().get(id).unwrap().size.width, 300.0);
    }
}
