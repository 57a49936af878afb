#![forbid(unsafe_code)]

//! Window instance records.

use std::fmt;

use floatdock_core::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::dock::DockPosition;

/// Default size for windows opened without an explicit size.
pub const DEFAULT_WINDOW_SIZE: Size = Size::new(480.0, 360.0);

/// Origin of the first window opened without an explicit position.
pub const DEFAULT_WINDOW_ORIGIN: Point = Point::new(80.0, 80.0);

/// Offset applied per already-open window when cascading default positions.
pub const DEFAULT_CASCADE_STEP: f64 = 24.0;

/// Stable identifier for window instances.
///
/// `0` is reserved/invalid so IDs are always non-zero. IDs are never reused
/// within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    /// Lowest valid window ID.
    pub const MIN: Self = Self(1);

    /// Create a window ID, rejecting 0.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// One on-screen panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInstance {
    pub id: WindowId,
    /// Host surface key (`"chat"`, `"editor"`, ...).
    pub kind: String,
    pub title: String,
    pub position: Point,
    pub size: Size,
    /// Always within `[0, 1]`.
    pub opacity: f64,
    pub z_index: u32,
    pub always_on_top: bool,
    pub visible: bool,
    /// Mirrors the window's slot in the dock tree; `None` while floating.
    pub dock_to: Option<DockPosition>,
}

impl WindowInstance {
    /// Current screen bounds.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Position, size, and opacity as captured at gesture start.
    #[must_use]
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            position: self.position,
            size: self.size,
            opacity: self.opacity,
        }
    }
}

/// Geometry and opacity captured from a window at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub position: Point,
    pub size: Size,
    pub opacity: f64,
}

impl WindowSnapshot {
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

/// Overrides accepted when opening a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowOptions {
    pub title: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub opacity: Option<f64>,
    pub always_on_top: bool,
    pub visible: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: None,
            position: None,
            size: None,
            opacity: None,
            always_on_top: false,
            visible: true,
        }
    }
}

impl WindowOptions {
    /// Options pinned to explicit bounds.
    #[must_use]
    pub fn at(bounds: Rect) -> Self {
        Self {
            position: Some(bounds.origin()),
            size: Some(bounds.size()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    #[must_use]
    pub fn always_on_top(mut self, always_on_top: bool) -> Self {
        self.always_on_top = always_on_top;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Partial update merged shallowly into a window.
///
/// Dock placement is absent on purpose: it only changes through dock and
/// undock operations so the dock tree stays the single authority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowPatch {
    pub title: Option<String>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub opacity: Option<f64>,
    pub always_on_top: Option<bool>,
    pub visible: Option<bool>,
}

impl WindowPatch {
    #[must_use]
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Self::default()
        }
    }

    /// Whether the patch touches position or size.
    #[must_use]
    pub const fn touches_geometry(&self) -> bool {
        self.position.is_some() || self.size.is_some()
    }
}

/// Clamp an opacity write into `[0, 1]`; non-finite input leaves `current`.
#[must_use]
pub(crate) fn clamp_opacity(value: f64, current: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_rejects_zero() {
        assert_eq!(WindowId::new(0), None);
        assert_eq!(WindowId::new(3).map(WindowId::get), Some(3));
        assert_eq!(WindowId::MIN.next().get(), 2);
        assert_eq!(WindowId::MIN.to_string(), "w1");
    }

    #[test]
    fn opacity_clamp() {
        assert_eq!(clamp_opacity(1.4, 0.5), 1.0);
        assert_eq!(clamp_opacity(-0.1, 0.5), 0.0);
        assert_eq!(clamp_opacity(f64::NAN, 0.5), 0.5);
    }

    #[test]
    fn instance_serializes_camel_case() {
        let window = WindowInstance {
            id: WindowId::MIN,
            kind: "editor".into(),
            title: "Editor".into(),
            position: Point::new(1.0, 2.0),
            size: Size::new(3.0, 4.0),
            opacity: 1.0,
            z_index: 7,
            always_on_top: true,
            visible: true,
            dock_to: None,
        };
        let json = serde_json::to_value(&window).unwrap();
        assert_eq!(json["zIndex"], 7);
        assert_eq!(json["alwaysOnTop"], true);
        assert!(json["dockTo"].is_null());
    }

    #[test]
    fn options_builder() {
        let options = WindowOptions::at(Rect::new(1.0, 2.0, 30.0, 40.0))
            .title("Chat")
            .opacity(0.5)
            .always_on_top(true)
            .hidden();
        assert_eq!(options.position, Some(Point::new(1.0, 2.0)));
        assert_eq!(options.size, Some(Size::new(30.0, 40.0)));
        assert!(!options.visible);
        assert!(options.always_on_top);
    }
}
