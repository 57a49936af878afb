#![forbid(unsafe_code)]

//! Pointer input crossing the host boundary.
//!
//! Hosts hand the engine [`PointerSample`] values. Shape checks happen here,
//! once, so the gesture machinery downstream never has to second-guess a
//! coordinate.
//!
//! # Design Notes
//!
//! - `x`/`y` are surface-local; `screen_x`/`screen_y` are screen-global.
//!   Gestures track the screen coordinates because the surface moves with the
//!   window being dragged.
//! - Timestamps are host milliseconds on a monotonic clock. The engine never
//!   reads a wall clock of its own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One validated pointer observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPointerSample", rename_all = "camelCase")]
pub struct PointerSample {
    x: f64,
    y: f64,
    screen_x: f64,
    screen_y: f64,
    timestamp_ms: u64,
}

impl PointerSample {
    /// Build a sample, rejecting non-finite coordinates.
    pub fn new(
        x: f64,
        y: f64,
        screen_x: f64,
        screen_y: f64,
        timestamp_ms: u64,
    ) -> Result<Self, PointerSampleError> {
        for (field, value) in [("x", x), ("y", y), ("screenX", screen_x), ("screenY", screen_y)] {
            if !value.is_finite() {
                return Err(PointerSampleError::NonFiniteCoordinate { field, value });
            }
        }
        Ok(Self {
            x,
            y,
            screen_x,
            screen_y,
            timestamp_ms,
        })
    }

    /// Sample where surface-local and screen coordinates coincide.
    pub fn at_screen(screen_x: f64, screen_y: f64, timestamp_ms: u64) -> Result<Self, PointerSampleError> {
        Self::new(screen_x, screen_y, screen_x, screen_y, timestamp_ms)
    }

    /// Surface-local position.
    #[inline]
    #[must_use]
    pub const fn local(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Screen-global position.
    #[inline]
    #[must_use]
    pub const fn screen(&self) -> Point {
        Point::new(self.screen_x, self.screen_y)
    }

    #[inline]
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

/// Wire shape accepted from hosts before validation.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPointerSample {
    x: f64,
    y: f64,
    screen_x: f64,
    screen_y: f64,
    timestamp_ms: u64,
}

impl TryFrom<RawPointerSample> for PointerSample {
    type Error = PointerSampleError;

    fn try_from(raw: RawPointerSample) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y, raw.screen_x, raw.screen_y, raw.timestamp_ms)
    }
}

/// Boundary rejection for malformed pointer samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSampleError {
    NonFiniteCoordinate { field: &'static str, value: f64 },
}

impl fmt::Display for PointerSampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteCoordinate { field, value } => {
                write!(f, "pointer sample field {field} is not finite ({value})")
            }
        }
    }
}

impl std::error::Error for PointerSampleError {}
