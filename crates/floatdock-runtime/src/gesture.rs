#![forbid(unsafe_code)]

//! Long-press gesture sessions.
//!
//! A [`GestureSession`] turns one pointer-down → pointer-up sequence on a
//! window into a [`GestureOutcome`]. Hold time and pointer travel are the only
//! inputs; every geometry or opacity effect is written straight through the
//! [`WindowStore`].
//!
//! # State Machine
//!
//! ```text
//!            moved > 5px                    up / down > 60px
//!   Normal ───────────────► Canceled ◄──────────────────────┐
//!     │ held 700ms                ▲ back within ±60px       │
//!     ▼                           └──────────────► Selecting ◄──► OpacitySlider
//!   Dragging ── held 1500ms, no drag ─────────────────▲       ±60px / > +60px
//! ```
//!
//! - `Dragging` moves the window by the cumulative pointer delta since the
//!   stage began and re-runs dock detection, throttled. Release detects once
//!   more without the throttle and commits only that result; a docked window
//!   released outside every zone goes back to its slot.
//! - `Selecting` reads the vertical offset from the press origin: below the
//!   band opens the opacity slider, above it cancels.
//! - `OpacitySlider` maps the horizontal offset onto opacity live.
//! - A release more than 5px from the press point while still `Normal` is a
//!   cancel, not a click.
//!
//! # Invariants
//!
//! 1. A session never returns to `Normal` once it has left it.
//! 2. The only backward transitions are `OpacitySlider → Selecting` and
//!    `Canceled → Selecting` (the latter only when the cancel came from
//!    `Selecting`).
//! 3. The session clock never runs backwards: late or reordered timestamps
//!    are clamped to the latest seen.
//! 4. The progress timer is armed from press until 1500ms have elapsed or the
//!    session ends, whichever is first.
//! 5. A canceled or interrupted gesture leaves the window's opacity exactly as
//!    it was at press time.
//!
//! # Failure Modes
//!
//! - If the window disappears from the store mid-gesture, the next call
//!   returns [`GestureOutcome::Aborted`], drops any preview, and writes
//!   nothing.
//! - A dock commit the store refuses (target closed or hidden since the
//!   preview) degrades to [`GestureOutcome::Moved`].

use floatdock_core::config::InteractionConfig;
use floatdock_core::event::PointerSample;
use floatdock_core::geometry::{Point, Rect};
use floatdock_layout::{DockPreview, WindowId, WindowInstance, WindowSnapshot, WindowStore, detect_any};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Interaction stage of a gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Pressed, not yet held long enough to drag.
    Normal,
    /// Held past the drag threshold; movement relocates the window.
    Dragging,
    /// Held past the pin threshold without dragging; the pin choice region.
    Selecting,
    /// Below the selection band; horizontal travel sets opacity.
    OpacitySlider,
    /// No action will be taken on release.
    Canceled,
}

impl Stage {
    /// Stable name used in logs and host payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Dragging => "dragging",
            Self::Selecting => "selecting",
            Self::OpacitySlider => "opacity-slider",
            Self::Canceled => "canceled",
        }
    }
}

/// Where a cancel came from. Only selection cancels can be walked back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelOrigin {
    Movement,
    Selection,
}

/// Repeating progress timer owned by one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProgressTimer {
    interval_ms: u64,
    next_due_ms: Option<u64>,
}

impl ProgressTimer {
    fn armed(now_ms: u64, interval_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            interval_ms,
            next_due_ms: Some(now_ms.saturating_add(interval_ms)),
        }
    }

    fn rearm(&mut self, now_ms: u64) {
        if self.next_due_ms.is_some() {
            self.next_due_ms = Some(now_ms.saturating_add(self.interval_ms));
        }
    }

    fn disarm(&mut self) {
        self.next_due_ms = None;
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of a gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GestureOutcome {
    /// Released before the drag threshold without moving. The caller owns
    /// click handling.
    Click { window: WindowId },
    /// Released while dragging with no dock zone active.
    Moved {
        window: WindowId,
        from: Point,
        to: Point,
    },
    /// Released over a dock zone and the merge was committed.
    Docked {
        window: WindowId,
        preview: DockPreview,
    },
    /// Released in the pin region; `always_on_top` is the new value.
    PinToggled {
        window: WindowId,
        always_on_top: bool,
    },
    /// Released on the opacity slider; `opacity` is kept.
    OpacityChanged { window: WindowId, opacity: f64 },
    /// Released or interrupted while canceled; pre-gesture opacity restored.
    Canceled { window: WindowId },
    /// The window vanished mid-gesture; nothing was written.
    Aborted { window: WindowId },
}

impl GestureOutcome {
    #[must_use]
    pub const fn window(&self) -> WindowId {
        match *self {
            Self::Click { window }
            | Self::Moved { window, .. }
            | Self::Docked { window, .. }
            | Self::PinToggled { window, .. }
            | Self::OpacityChanged { window, .. }
            | Self::Canceled { window }
            | Self::Aborted { window } => window,
        }
    }
}

// ---------------------------------------------------------------------------
// GestureSession
// ---------------------------------------------------------------------------

/// State for one pointer-down on one window.
///
/// Created by [`begin`](Self::begin); the owner drops it once
/// [`pointer_up`](Self::pointer_up) or [`interrupt`](Self::interrupt) has
/// returned, or once any call reports [`GestureOutcome::Aborted`].
#[derive(Debug, Clone)]
pub struct GestureSession {
    window: WindowId,
    config: InteractionConfig,
    stage: Stage,
    start_point: Point,
    started_at_ms: u64,
    now_ms: u64,
    snapshot: WindowSnapshot,
    timer: ProgressTimer,
    pointer: Point,
    drag_anchor: Option<Point>,
    dragged: bool,
    slider_half_width: f64,
    slider_entry_opacity: Option<f64>,
    cancel_origin: Option<CancelOrigin>,
    last_dock_eval_ms: Option<u64>,
    preview: Option<DockPreview>,
}

impl GestureSession {
    /// Start a session from the store's current view of `window`.
    ///
    /// The snapshot is always read fresh, so external moves made between
    /// gestures win. `viewport` bounds the opacity slider band. Returns `None`
    /// for unknown windows.
    #[must_use]
    pub fn begin(
        window: WindowId,
        sample: &PointerSample,
        store: &WindowStore,
        config: &InteractionConfig,
        viewport: Rect,
    ) -> Option<Self> {
        let Some(instance) = store.get(window) else {
            trace!(target: "floatdock.gesture", window = window.get(), "press ignored: unknown window");
            return None;
        };
        let now_ms = sample.timestamp_ms();
        let start_point = sample.screen();
        let slider_half_width = config
            .opacity_half_width_px
            .min(viewport.width / 2.0)
            .max(0.0);
        debug!(
            target: "floatdock.gesture",
            window = window.get(),
            x = start_point.x,
            y = start_point.y,
            "gesture started"
        );
        Some(Self {
            window,
            config: config.clone(),
            stage: Stage::Normal,
            start_point,
            started_at_ms: now_ms,
            now_ms,
            snapshot: instance.snapshot(),
            timer: ProgressTimer::armed(now_ms, config.tick_interval_ms),
            pointer: start_point,
            drag_anchor: None,
            dragged: false,
            slider_half_width,
            slider_entry_opacity: None,
            cancel_origin: None,
            last_dock_eval_ms: None,
            preview: None,
        })
    }

    #[inline]
    #[must_use]
    pub const fn window(&self) -> WindowId {
        self.window
    }

    #[inline]
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Screen point of the press.
    #[inline]
    #[must_use]
    pub const fn start_point(&self) -> Point {
        self.start_point
    }

    /// Window state captured at press time.
    #[inline]
    #[must_use]
    pub const fn snapshot(&self) -> WindowSnapshot {
        self.snapshot
    }

    /// Milliseconds since the press.
    #[inline]
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.started_at_ms)
    }

    /// Whether the pointer travelled past the move threshold while dragging.
    #[inline]
    #[must_use]
    pub const fn has_dragged(&self) -> bool {
        self.dragged
    }

    /// Active dock preview, if the drag currently hovers a zone.
    #[inline]
    #[must_use]
    pub const fn preview(&self) -> Option<&DockPreview> {
        self.preview.as_ref()
    }

    /// Hold progress toward the pin threshold, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.config.pin_select_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms() as f64 / self.config.pin_select_ms as f64).min(1.0)
    }

    /// When the host should call [`tick`](Self::tick) next; `None` once the
    /// timer is disarmed.
    #[inline]
    #[must_use]
    pub const fn next_tick_at(&self) -> Option<u64> {
        self.timer.next_due_ms
    }

    /// Progress timer callback.
    pub fn tick(&mut self, now_ms: u64, store: &mut WindowStore) -> Option<GestureOutcome> {
        if !store.contains(self.window) {
            return Some(self.abort());
        }
        self.advance(now_ms, store);
        self.timer.rearm(self.now_ms);
        None
    }

    /// Pointer moved while pressed. Returns `Some` only when the session
    /// aborted.
    pub fn pointer_move(
        &mut self,
        sample: &PointerSample,
        store: &mut WindowStore,
    ) -> Option<GestureOutcome> {
        if !store.contains(self.window) {
            return Some(self.abort());
        }
        self.advance(sample.timestamp_ms(), store);
        self.pointer = sample.screen();

        let band = self.config.selection_band_px;
        let dy = self.pointer.y - self.start_point.y;
        match self.stage {
            Stage::Normal => {
                if self.pointer.distance(self.start_point) > self.config.move_cancel_px {
                    self.cancel(CancelOrigin::Movement);
                }
            }
            Stage::Dragging => self.drag(store),
            Stage::Selecting => {
                if dy > band {
                    self.slider_entry_opacity = store.get(self.window).map(|w| w.opacity);
                    self.transition(Stage::OpacitySlider);
                    self.apply_slider(store);
                } else if dy < -band {
                    self.cancel(CancelOrigin::Selection);
                }
            }
            Stage::OpacitySlider => {
                if dy.abs() <= band {
                    self.restore_slider_entry(store);
                    self.transition(Stage::Selecting);
                } else if dy < -band {
                    self.restore_slider_entry(store);
                    self.cancel(CancelOrigin::Selection);
                } else {
                    self.apply_slider(store);
                }
            }
            Stage::Canceled => {
                if self.cancel_origin == Some(CancelOrigin::Selection) && dy.abs() <= band {
                    self.cancel_origin = None;
                    self.transition(Stage::Selecting);
                }
            }
        }
        None
    }

    /// Pointer released. The session is finished afterwards.
    pub fn pointer_up(&mut self, sample: &PointerSample, store: &mut WindowStore) -> GestureOutcome {
        if !store.contains(self.window) {
            return self.abort();
        }
        self.advance(sample.timestamp_ms(), store);
        self.timer.disarm();
        let window = self.window;
        if self.stage == Stage::Normal
            && sample.screen().distance(self.start_point) > self.config.move_cancel_px
        {
            self.pointer = sample.screen();
            self.cancel(CancelOrigin::Movement);
        }

        let outcome = match self.stage {
            Stage::Normal => GestureOutcome::Click { window },
            Stage::Dragging => {
                // The throttled preview may be stale; commit only what the
                // final bounds still hit.
                self.evaluate_dock(store, true);
                match self.preview.take() {
                    Some(preview) if store.commit_preview(window, &preview) => {
                        GestureOutcome::Docked { window, preview }
                    }
                    _ => {
                        store.settle_docked(window);
                        GestureOutcome::Moved {
                            window,
                            from: self.snapshot.position,
                            to: store.get(window).map_or(self.snapshot.position, |w| w.position),
                        }
                    }
                }
            }
            Stage::Selecting if self.elapsed_ms() >= self.config.pin_select_ms => {
                match store.toggle_always_on_top(window) {
                    Some(always_on_top) => GestureOutcome::PinToggled {
                        window,
                        always_on_top,
                    },
                    None => GestureOutcome::Aborted { window },
                }
            }
            Stage::OpacitySlider => GestureOutcome::OpacityChanged {
                window,
                opacity: store.get(window).map_or(self.snapshot.opacity, |w| w.opacity),
            },
            Stage::Selecting | Stage::Canceled => {
                self.restore_opacity(store);
                GestureOutcome::Canceled { window }
            }
        };
        debug!(
            target: "floatdock.gesture",
            window = window.get(),
            stage = self.stage.as_str(),
            elapsed_ms = self.elapsed_ms(),
            outcome = ?outcome,
            "gesture released"
        );
        self.preview = None;
        outcome
    }

    /// Pointer left the tracked surface: an implicit release with the
    /// canceled outcome. Position and opacity return to their press-time
    /// values.
    pub fn interrupt(&mut self, store: &mut WindowStore) -> GestureOutcome {
        if !store.contains(self.window) {
            return self.abort();
        }
        self.timer.disarm();
        self.preview = None;
        self.restore_position(store);
        self.restore_opacity(store);
        debug!(
            target: "floatdock.gesture",
            window = self.window.get(),
            stage = self.stage.as_str(),
            "gesture interrupted"
        );
        GestureOutcome::Canceled {
            window: self.window,
        }
    }

    /// Drop a preview that points at `target`, e.g. because it closed.
    pub fn forget_target(&mut self, target: WindowId) {
        if self.preview.is_some_and(|p| p.target == target) {
            self.preview = None;
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Move the clock forward and apply time-driven transitions.
    fn advance(&mut self, now_ms: u64, store: &mut WindowStore) {
        self.now_ms = self.now_ms.max(now_ms);
        let elapsed = self.elapsed_ms();

        if self.stage == Stage::Normal && elapsed >= self.config.drag_ready_ms {
            self.drag_anchor = Some(self.pointer);
            self.transition(Stage::Dragging);
        }
        if self.stage == Stage::Dragging && !self.dragged && elapsed >= self.config.pin_select_ms {
            // Sub-threshold jitter moved the window; selection starts clean.
            self.preview = None;
            self.restore_position(store);
            self.transition(Stage::Selecting);
        }
        if elapsed >= self.config.pin_select_ms {
            self.timer.disarm();
        }
    }

    fn drag(&mut self, store: &mut WindowStore) {
        let Some(anchor) = self.drag_anchor else {
            return;
        };
        if !self.dragged && self.pointer.distance(anchor) > self.config.move_cancel_px {
            self.dragged = true;
            debug!(target: "floatdock.gesture", window = self.window.get(), "drag started");
        }
        let (dx, dy) = self.pointer.delta_from(anchor);
        store.move_to(self.window, self.snapshot.position.offset(dx, dy));
        self.evaluate_dock(store, false);
    }

    /// Re-run detection against the current bounds. `force` skips the
    /// throttle.
    fn evaluate_dock(&mut self, store: &WindowStore, force: bool) {
        let due = force
            || self
                .last_dock_eval_ms
                .is_none_or(|last| self.now_ms.saturating_sub(last) >= self.config.dock_throttle_ms);
        if !due {
            return;
        }
        self.last_dock_eval_ms = Some(self.now_ms);
        let Some(drag_bounds) = store.get(self.window).map(WindowInstance::bounds) else {
            return;
        };
        let preview = detect_any(
            drag_bounds,
            store.dock_candidates(self.window),
            self.config.dock_threshold_px,
        );
        if preview != self.preview {
            debug!(
                target: "floatdock.gesture",
                window = self.window.get(),
                target_window = preview.map(|p| p.target.get()),
                position = ?preview.map(|p| p.position()),
                "dock preview changed"
            );
        }
        self.preview = preview;
    }

    fn apply_slider(&self, store: &mut WindowStore) {
        let half = self.slider_half_width;
        if half <= 0.0 {
            return;
        }
        let dx = (self.pointer.x - self.start_point.x).clamp(-half, half);
        store.set_opacity(self.window, (dx + half) / (2.0 * half));
    }

    fn restore_slider_entry(&mut self, store: &mut WindowStore) {
        if let Some(opacity) = self.slider_entry_opacity.take()
            && store.get(self.window).is_some_and(|w| w.opacity != opacity)
        {
            store.set_opacity(self.window, opacity);
        }
    }

    fn restore_opacity(&self, store: &mut WindowStore) {
        let opacity = self.snapshot.opacity;
        if store.get(self.window).is_some_and(|w| w.opacity != opacity) {
            store.set_opacity(self.window, opacity);
        }
    }

    fn restore_position(&self, store: &mut WindowStore) {
        let position = self.snapshot.position;
        if store.get(self.window).is_some_and(|w| w.position != position) {
            store.move_to(self.window, position);
        }
    }

    fn cancel(&mut self, origin: CancelOrigin) {
        self.cancel_origin = Some(origin);
        self.preview = None;
        self.timer.disarm();
        self.transition(Stage::Canceled);
    }

    fn abort(&mut self) -> GestureOutcome {
        self.preview = None;
        self.timer.disarm();
        debug!(target: "floatdock.gesture", window = self.window.get(), "gesture aborted: window gone");
        GestureOutcome::Aborted {
            window: self.window,
        }
    }

    fn transition(&mut self, next: Stage) {
        debug!(
            target: "floatdock.gesture",
            window = self.window.get(),
            from = self.stage.as_str(),
            to = next.as_str(),
            elapsed_ms = self.elapsed_ms(),
            "stage transition"
        );
        self.stage = next;
    }
}
