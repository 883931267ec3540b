//! Scene Input
//!
//! Routes tracked-controller and gaze input into a 3D scene graph: diffs
//! per-device samples into canonical events, resolves targets by ray hit
//! testing, and delivers events to global listeners and bubbling node
//! listeners.

/// Device adapters - hardware samples to snapshots
pub mod adapter;

/// Head camera for reticle sizing and camera transform updates
pub mod camera;

/// Router configuration profiles
pub mod config;

/// Setup errors
pub mod error;

/// Canonical events, actions and listeners
pub mod event;

/// Self-diagnostics
pub mod health;

/// State tracking and dispatch
pub mod input;

/// Reticle placement listener
pub mod presenter;

/// Per-tick driver
pub mod router;

/// Scene graph and hit testing
pub mod scene;

pub use camera::Camera;
pub use config::RouterConfig;
pub use error::{Result, RouterError};
pub use router::{InputRouter, TickReport};
