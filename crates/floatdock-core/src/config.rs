#![forbid(unsafe_code)]

//! Interaction tuning as data.
//!
//! Every threshold the gesture and docking machinery consults lives in
//! [`InteractionConfig`]. The defaults are product-tuned UX constants and are
//! exported individually so call sites and tests can name them.
//!
//! # Loading
//!
//! ```toml
//! # floatdock.toml
//! drag_ready_ms = 650
//! dock_threshold_px = 40.0
//! ```
//!
//! ```rust,ignore
//! let config = InteractionConfig::from_toml_file("floatdock.toml")?;
//! let config = InteractionConfig::from_json_str(json)?;
//! ```
//!
//! Omitted keys fall back to the defaults below.

#[cfg(feature = "config-file")]
use std::path::Path;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Pointer travel (px) that cancels a press still in the `normal` stage.
pub const MOVE_CANCEL_PX: f64 = 5.0;
/// Hold time before a press becomes a drag.
pub const DRAG_READY_MS: u64 = 700;
/// Hold time before an undragged press enters pin selection.
pub const PIN_SELECT_MS: u64 = 1500;
/// Vertical band (px, either direction) around the press origin in selection.
pub const SELECTION_BAND_PX: f64 = 60.0;
/// Half-width (px) of the horizontal opacity slider band.
pub const OPACITY_HALF_WIDTH_PX: f64 = 200.0;
/// Edge proximity (px) for dock zone detection.
pub const DOCK_THRESHOLD_PX: f64 = 50.0;
/// Minimum wall-clock spacing between dock evaluations while dragging.
pub const DOCK_THROTTLE_MS: u64 = 50;
/// Progress tick cadence during an active press.
pub const TICK_INTERVAL_MS: u64 = 16;
/// Smallest width a window may be resized to.
pub const MIN_WINDOW_WIDTH: f64 = 120.0;
/// Smallest height a window may be resized to.
pub const MIN_WINDOW_HEIGHT: f64 = 80.0;

/// Tunable thresholds for the long-press gesture and dock detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub move_cancel_px: f64,
    pub drag_ready_ms: u64,
    pub pin_select_ms: u64,
    pub selection_band_px: f64,
    pub opacity_half_width_px: f64,
    pub dock_threshold_px: f64,
    pub dock_throttle_ms: u64,
    pub tick_interval_ms: u64,
    pub min_window_width: f64,
    pub min_window_height: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            move_cancel_px: MOVE_CANCEL_PX,
            drag_ready_ms: DRAG_READY_MS,
            pin_select_ms: PIN_SELECT_MS,
            selection_band_px: SELECTION_BAND_PX,
            opacity_half_width_px: OPACITY_HALF_WIDTH_PX,
            dock_threshold_px: DOCK_THRESHOLD_PX,
            dock_throttle_ms: DOCK_THROTTLE_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            min_window_width: MIN_WINDOW_WIDTH,
            min_window_height: MIN_WINDOW_HEIGHT,
        }
    }
}

impl InteractionConfig {
    /// Size floor applied to every resize.
    #[must_use]
    pub const fn min_window_size(&self) -> Size {
        Size::new(self.min_window_width, self.min_window_height)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let positive = [
            ("move_cancel_px", self.move_cancel_px),
            ("selection_band_px", self.selection_band_px),
            ("opacity_half_width_px", self.opacity_half_width_px),
            ("dock_threshold_px", self.dock_threshold_px),
            ("min_window_width", self.min_window_width),
            ("min_window_height", self.min_window_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be a finite value > 0, got {value}"));
            }
        }

        if self.drag_ready_ms == 0 {
            errors.push("drag_ready_ms must be > 0".into());
        }
        if self.pin_select_ms <= self.drag_ready_ms {
            errors.push(format!(
                "pin_select_ms must exceed drag_ready_ms ({} <= {})",
                self.pin_select_ms, self.drag_ready_ms
            ));
        }
        if self.tick_interval_ms == 0 {
            errors.push("tick_interval_ms must be > 0".into());
        }

        errors
    }

    /// Return `self` if valid, otherwise every validation message.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating an [`InteractionConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "invalid interaction config: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
