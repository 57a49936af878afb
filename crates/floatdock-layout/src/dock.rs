#![forbid(unsafe_code)]

//! Dock zone detection.
//!
//! [`detect`] decides whether a dragged window sits close enough to one edge
//! of a target window to propose a half split, and computes the zone the
//! dragged window would occupy.
//!
//! # Invariants
//!
//! 1. Detection is pure: no state, no side effects. Identical inputs always
//!    produce identical outputs, so callers may re-run it on every throttled
//!    drag sample.
//! 2. Non-overlapping rectangles never produce a zone.
//! 3. Edge bands are tested left, right, top, bottom; the first match wins.
//!    A drag near a corner therefore prefers a side-by-side split.
//! 4. Edge zones bisect the target along the matched axis.

use floatdock_core::geometry::{Axis, Rect};
use serde::{Deserialize, Serialize};

use crate::window::WindowId;

/// Where a window sits relative to its docking partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockPosition {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

impl DockPosition {
    /// Edge bands in detection priority order.
    pub const EDGES: [Self; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// Split orientation a dock at this position produces.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right | Self::Center => Axis::Horizontal,
            Self::Top | Self::Bottom => Axis::Vertical,
        }
    }

    /// Position the docking partner ends up in.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Center => Self::Center,
        }
    }

    /// Whether the incoming window takes the first slot of the new group.
    #[must_use]
    pub const fn incoming_first(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }

    /// Preview flavor for a dock at this position.
    #[must_use]
    pub const fn kind(self) -> DockKind {
        match self {
            Self::Center => DockKind::Dock,
            Self::Left | Self::Right | Self::Top | Self::Bottom => DockKind::Squeeze,
        }
    }
}

/// Dock preview flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockKind {
    /// Full replace of the target area.
    Dock,
    /// Half split of the target area.
    Squeeze,
}

/// Zone the dragged window would occupy inside one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockZone {
    pub position: DockPosition,
    #[serde(rename = "type")]
    pub kind: DockKind,
    pub bounds: Rect,
}

impl DockZone {
    /// Zone for `position` inside `target`.
    #[must_use]
    pub fn for_position(target: Rect, position: DockPosition) -> Self {
        let half_w = target.width / 2.0;
        let half_h = target.height / 2.0;
        let bounds = match position {
            DockPosition::Left => Rect::new(target.x, target.y, half_w, target.height),
            DockPosition::Right => Rect::new(target.x + half_w, target.y, half_w, target.height),
            DockPosition::Top => Rect::new(target.x, target.y, target.width, half_h),
            DockPosition::Bottom => Rect::new(target.x, target.y + half_h, target.width, half_h),
            DockPosition::Center => target,
        };
        Self {
            position,
            kind: position.kind(),
            bounds,
        }
    }

    /// Attach the target identity.
    #[must_use]
    pub const fn for_target(self, target: WindowId) -> DockPreview {
        DockPreview { target, zone: self }
    }
}

/// Active dock preview drawn as an overlay while a drag hovers a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockPreview {
    pub target: WindowId,
    #[serde(flatten)]
    pub zone: DockZone,
}

impl DockPreview {
    #[inline]
    #[must_use]
    pub const fn position(&self) -> DockPosition {
        self.zone.position
    }

    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.zone.bounds
    }
}

/// Propose a dock zone for `drag` against `target`.
///
/// Returns `None` when the rectangles do not overlap or when the drag center
/// is not within `threshold` of any target edge.
#[must_use]
pub fn detect(drag: Rect, target: Rect, threshold: f64) -> Option<DockZone> {
    if !drag.overlaps(&target) {
        return None;
    }
    let rel = target.relative(drag.center());
    let near = |offset: f64| offset.abs() <= threshold;
    DockPosition::EDGES
        .into_iter()
        .find(|edge| match edge {
            DockPosition::Left => near(rel.x),
            DockPosition::Right => near(rel.x - target.width),
            DockPosition::Top => near(rel.y),
            DockPosition::Bottom => near(rel.y - target.height),
            DockPosition::Center => false,
        })
        .map(|position| DockZone::for_position(target, position))
}

/// First non-null preview across `candidates`, in the order given.
///
/// Callers pass candidates topmost first so the window the user sees under
/// the drag wins.
#[must_use]
pub fn detect_any<I>(drag: Rect, candidates: I, threshold: f64) -> Option<DockPreview>
where
    I: IntoIterator<Item = (WindowId, Rect)>,
{
    candidates
        .into_iter()
        .find_map(|(id, bounds)| detect(drag, bounds, threshold).map(|zone| zone.for_target(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use floatdock_core::geometry::Point;

    const T: f64 = 50.0;

    fn target() -> Rect {
        Rect::new(520.0, 100.0, 400.0, 300.0)
    }

    /// A 400x300 drag rectangle centered on `center`.
    fn drag_centered(center: Point) -> Rect {
        Rect::new(center.x - 200.0, center.y - 150.0, 400.0, 300.0)
    }

    #[test]
    fn left_edge_squeeze_bisects_target() {
        let zone = detect(drag_centered(Point::new(525.0, 250.0)), target(), T).unwrap();
        assert_eq!(zone.position, DockPosition::Left);
        assert_eq!(zone.kind, DockKind::Squeeze);
        assert_eq!(zone.bounds, Rect::new(520.0, 100.0, 200.0, 300.0));
    }

    #[test]
    fn each_edge_has_its_half() {
        let t = target();
        let cases = [
            (Point::new(915.0, 250.0), DockPosition::Right, Rect::new(720.0, 100.0, 200.0, 300.0)),
            (Point::new(720.0, 110.0), DockPosition::Top, Rect::new(520.0, 100.0, 400.0, 150.0)),
            (Point::new(720.0, 390.0), DockPosition::Bottom, Rect::new(520.0, 250.0, 400.0, 150.0)),
        ];
        for (center, position, bounds) in cases {
            let zone = detect(drag_centered(center), t, T).unwrap();
            assert_eq!(zone.position, position, "center {center:?}");
            assert_eq!(zone.bounds, bounds, "center {center:?}");
        }
    }

    #[test]
    fn corner_prefers_horizontal_edges() {
        // Within the band of both the left and the top edge.
        let zone = detect(drag_centered(Point::new(530.0, 110.0)), target(), T).unwrap();
        assert_eq!(zone.position, DockPosition::Left);
    }

    #[test]
    fn interior_center_is_not_a_zone() {
        assert_eq!(detect(drag_centered(Point::new(720.0, 250.0)), target(), T), None);
    }

    #[test]
    fn disjoint_rectangles_never_dock() {
        let far = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(detect(far, target(), T), None);
        // Touching edge only.
        let touching = Rect::new(420.0, 100.0, 100.0, 300.0);
        assert_eq!(detect(touching, target(), 1_000.0), None);
    }

    #[test]
    fn band_straddles_the_edge() {
        // Center 40px left of the target's left edge, rectangles still overlap.
        let zone = detect(drag_centered(Point::new(480.0, 250.0)), target(), T).unwrap();
        assert_eq!(zone.position, DockPosition::Left);
        assert_eq!(detect(drag_centered(Point::new(460.0, 250.0)), target(), T), None);
    }

    #[test]
    fn detection_is_deterministic() {
        let drag = drag_centered(Point::new(525.0, 250.0));
        assert_eq!(detect(drag, target(), T), detect(drag, target(), T));
    }

    #[test]
    fn center_zone_is_a_full_dock() {
        let zone = DockZone::for_position(target(), DockPosition::Center);
        assert_eq!(zone.kind, DockKind::Dock);
        assert_eq!(zone.bounds, target());
    }

    #[test]
    fn detect_any_takes_first_hit_in_order() {
        let a = WindowId::new(1).unwrap();
        let b = WindowId::new(2).unwrap();
        let drag = drag_centered(Point::new(525.0, 250.0));
        let miss = Rect::new(2_000.0, 0.0, 10.0, 10.0);
        let preview = detect_any(drag, [(a, miss), (b, target()), (a, target())], T).unwrap();
        assert_eq!(preview.target, b);
        assert_eq!(preview.position(), DockPosition::Left);
        assert_eq!(detect_any(drag, [(a, miss)], T), None);
    }

    #[test]
    fn preview_serializes_flat_with_type_tag() {
        let preview = DockZone::for_position(target(), DockPosition::Left)
            .for_target(WindowId::new(9).unwrap());
        let json = serde_json::to_value(preview).unwrap();
        assert_eq!(json["target"], 9);
        assert_eq!(json["position"], "left");
        assert_eq!(json["type"], "squeeze");
        assert_eq!(json["bounds"]["width"], 200.0);
    }

    #[test]
    fn opposite_and_axis_pairs() {
        for position in DockPosition::EDGES {
            assert_eq!(position.opposite().opposite(), position);
            assert_eq!(position.opposite().axis(), position.axis());
        }
        assert_eq!(DockPosition::Center.opposite(), DockPosition::Center);
    }
}
