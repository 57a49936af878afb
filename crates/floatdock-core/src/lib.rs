#![forbid(unsafe_code)]

//! Core: geometry, pointer samples, and interaction tuning.
//!
//! # Role in Floatdock
//! `floatdock-core` holds the vocabulary shared by the docking layout and the
//! gesture runtime. It has no notion of windows or stages; it only describes
//! rectangles, validated pointer observations, and the constants that tune
//! how those observations are interpreted.
//!
//! # Primary responsibilities
//! - **Geometry**: `Point`, `Size`, `Rect`, and `Axis` in screen space.
//! - **PointerSample**: the boundary type hosts hand to the engine, validated
//!   on construction and on deserialization.
//! - **InteractionConfig**: named thresholds with TOML/JSON loading behind the
//!   `config-file` feature.

pub mod config;
pub mod event;
pub mod geometry;

pub use config::{ConfigError, InteractionConfig};
pub use event::{PointerSample, PointerSampleError};
pub use geometry::{Axis, Point, Rect, Size};
