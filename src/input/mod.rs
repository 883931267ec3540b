//! Input tracking and dispatch
//!
//! Turns per-device snapshots into canonical events and delivers them:
//! - Diffs each device's snapshot against the previous tick
//! - Resolves targets by hit testing the scene along the device's forward ray
//! - Pairs Down/Up into Clicked when device, source and target match
//! - Delivers batches to global listeners, then bubbles them to node listeners
//!
//! # Architecture
//!
//! ```text
//! Raw samples → DeviceAdapter → Snapshot (per device)
//!                                   ↓
//!                             StateTracker
//!                        (diff, hit test, pairing)
//!                                   ↓
//!                              TickEvents
//!                                   ↓
//!                              Dispatcher
//!                     (global pass, then node pass)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut tracker = StateTracker::new(&config);
//! tracker.register_device(DeviceId(1))?;
//!
//! // Each tick
//! let events = tracker.process(&scene, &snapshots);
//! Dispatcher::new(&scene, &registry).dispatch(Some(&camera), &events);
//! ```

mod dispatcher;
mod snapshot;
mod tracker;

pub use dispatcher::Dispatcher;
pub use snapshot::{Snapshot, ThumbStick};
pub use tracker::{StateTracker, TickEvents};
