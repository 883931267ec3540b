//! Head-gaze pointer with a single tap button

use glam::{Quat, Vec3};

use super::{DeviceAdapter, RawSample};
use crate::camera::Camera;
use crate::event::{CameraTransform, DeviceId, SourceId, TrackingQuality};
use crate::input::Snapshot;

/// Tap state of the gaze pointer for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazeSample {
    pub tapped: bool,
}

impl RawSample for GazeSample {
    fn device(&self) -> DeviceId {
        GazeAdapter::DEVICE
    }
}

/// Pointer that aims wherever the head looks
///
/// The gaze device never disconnects; a tick without a sample means the tap
/// button is released.
#[derive(Debug, Clone)]
pub struct GazeAdapter {
    devices: [DeviceId; 1],
    head_position: Vec3,
    head_orientation: Quat,
}

impl GazeAdapter {
    pub const DEVICE: DeviceId = DeviceId(1);
    pub const TAP: SourceId = SourceId(1);

    pub fn new() -> Self {
        Self {
            devices: [Self::DEVICE],
            head_position: Vec3::ZERO,
            head_orientation: Quat::IDENTITY,
        }
    }
}

impl Default for GazeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceAdapter for GazeAdapter {
    type Sample = GazeSample;

    fn name(&self) -> &str {
        "gaze"
    }

    fn known_devices(&self) -> &[DeviceId] {
        &self.devices
    }

    fn translate(&mut self, device: DeviceId, sample: Option<&GazeSample>) -> Snapshot {
        Snapshot::connected(device)
            .with_pose(self.head_position, self.head_orientation)
            .with_tracking(TrackingQuality::RotationOnly)
            .with_button(Self::TAP, sample.is_some_and(|s| s.tapped))
    }

    fn update_head(&mut self, camera: &Camera) -> CameraTransform {
        self.head_position = camera.position;
        self.head_orientation = camera.orientation;
        camera.transform()
    }
}
