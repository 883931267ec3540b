//! Device adapters
//!
//! One adapter per hardware family. An adapter knows which device ids it
//! drives, turns that family's raw samples into [`Snapshot`]s, and derives the
//! head camera transform each tick.

mod gaze;
mod passthrough;
mod touch;

use tracing::debug;

use crate::camera::Camera;
use crate::event::{CameraTransform, DeviceId};
use crate::input::Snapshot;

pub use gaze::{GazeAdapter, GazeSample};
pub use passthrough::SnapshotAdapter;
pub use touch::{
    TouchAdapter, TouchButtons, TouchInput, TouchPose, TouchSample, TouchSources, TrackingFlags,
};

/// Raw hardware sample tagged with the device that produced it
pub trait RawSample {
    fn device(&self) -> DeviceId;
}

/// Translates one hardware family's samples into snapshots
pub trait DeviceAdapter {
    type Sample: RawSample;

    /// Name of this adapter for logs and diagnostics
    fn name(&self) -> &str;

    /// Device ids this adapter drives
    fn known_devices(&self) -> &[DeviceId];

    /// Builds this tick's snapshot for `device`
    ///
    /// `sample` is `None` when the device reported nothing; adapters for
    /// devices that can disconnect return a disconnected snapshot then.
    fn translate(&mut self, device: DeviceId, sample: Option<&Self::Sample>) -> Snapshot;

    /// Head transform for this tick
    fn update_head(&mut self, camera: &Camera) -> CameraTransform {
        camera.transform()
    }
}

/// Produces exactly one snapshot per known device
///
/// Samples for devices the adapter does not drive are dropped. When a device
/// reports several samples in one tick the last one wins.
pub fn collect_snapshots<A: DeviceAdapter + ?Sized>(
    adapter: &mut A,
    samples: &[A::Sample],
) -> Vec<Snapshot> {
    for sample in samples {
        let device = sample.device();
        if !adapter.known_devices().contains(&device) {
            debug!(adapter = adapter.name(), %device, "Dropping sample for unknown device");
        }
    }

    let devices = adapter.known_devices().to_vec();
    devices
        .into_iter()
        .map(|device| {
            let sample = samples.iter().rev().find(|s| s.device() == device);
            adapter.translate(device, sample)
        })
        .collect()
}
