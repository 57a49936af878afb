#![forbid(unsafe_code)]

//! Long-press gesture handling and host wiring for Floatdock.
//!
//! # Role in Floatdock
//! `floatdock-runtime` is where pointer input becomes window behavior. A
//! [`GestureSession`] classifies one press into a [`Stage`] and finally a
//! [`GestureOutcome`]; the [`InteractionEngine`] keeps one session per
//! pressed window, owns the [`WindowStore`](floatdock_layout::WindowStore),
//! and mirrors every applied change to a [`WindowHost`].
//!
//! # How it fits in the system
//! Hosts feed validated [`PointerSample`](floatdock_core::event::PointerSample)
//! values and timer callbacks in; render layers read the store and the active
//! previews out. Geometry, dock trees, and detection live in
//! `floatdock-layout`; tuning lives in `floatdock-core`.

pub mod engine;
pub mod gesture;
pub mod host;

pub use engine::InteractionEngine;
pub use gesture::{GestureOutcome, GestureSession, Stage};
pub use host::{DetachedHost, WindowHost};

pub use floatdock_core::config::InteractionConfig;
pub use floatdock_core::event::{PointerSample, PointerSampleError};
