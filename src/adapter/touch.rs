//! Tracked hand controllers

use bitflags::bitflags;
use glam::{Quat, Vec2, Vec3};
use tracing::trace;

use super::{DeviceAdapter, RawSample};
use crate::event::{DeviceId, SourceId, TrackingQuality};
use crate::input::Snapshot;

bitflags! {
    /// Digital buttons reported by a hand controller
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TouchButtons: u32 {
        const A = 1 << 0;
        const B = 1 << 1;
        const INDEX_TRIGGER = 1 << 2;
        const HAND_TRIGGER = 1 << 3;
        const THUMBSTICK = 1 << 4;
    }
}

bitflags! {
    /// Pose validity reported alongside the controller pose
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TrackingFlags: u32 {
        const ORIENTATION_TRACKED = 1 << 0;
        const POSITION_TRACKED = 1 << 1;
        const ORIENTATION_VALID = 1 << 2;
        const POSITION_VALID = 1 << 3;
    }
}

impl Default for TouchButtons {
    fn default() -> Self {
        Self::empty()
    }
}

/// Source ids for each controller input
pub struct TouchSources;

impl TouchSources {
    pub const A: SourceId = SourceId(1);
    pub const B: SourceId = SourceId(2);
    pub const INDEX_TRIGGER: SourceId = SourceId(3);
    pub const HAND_TRIGGER: SourceId = SourceId(4);
    pub const THUMBSTICK: SourceId = SourceId(5);

    /// Button flag → source pairs
    pub const BUTTONS: [(TouchButtons, SourceId); 5] = [
        (TouchButtons::A, Self::A),
        (TouchButtons::B, Self::B),
        (TouchButtons::INDEX_TRIGGER, Self::INDEX_TRIGGER),
        (TouchButtons::HAND_TRIGGER, Self::HAND_TRIGGER),
        (TouchButtons::THUMBSTICK, Self::THUMBSTICK),
    ];
}

/// Button and analog state of one controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchInput {
    pub buttons: TouchButtons,
    pub index_trigger: f32,
    pub hand_trigger: f32,
    pub thumbstick: Vec2,
    pub battery_percent: u8,
}

/// Pose of one controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPose {
    pub position: Vec3,
    pub orientation: Quat,
    pub flags: TrackingFlags,
}

impl TouchPose {
    pub fn tracking(&self) -> TrackingQuality {
        let position = TrackingFlags::POSITION_TRACKED | TrackingFlags::POSITION_VALID;
        if self.flags.contains(position) {
            TrackingQuality::Full6Dof
        } else if self.flags.contains(TrackingFlags::ORIENTATION_VALID) {
            TrackingQuality::RotationOnly
        } else {
            TrackingQuality::None
        }
    }
}

/// One poll of a hand controller
///
/// `input` or `pose` is `None` when the corresponding query failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub device: DeviceId,
    pub input: Option<TouchInput>,
    pub pose: Option<TouchPose>,
}

impl TouchSample {
    pub fn new(device: DeviceId, input: TouchInput, pose: TouchPose) -> Self {
        Self {
            device,
            input: Some(input),
            pose: Some(pose),
        }
    }
}

impl RawSample for TouchSample {
    fn device(&self) -> DeviceId {
        self.device
    }
}

/// Adapter for a left/right pair of tracked controllers
#[derive(Debug, Clone)]
pub struct TouchAdapter {
    devices: [DeviceId; 2],
}

impl TouchAdapter {
    pub const RIGHT: DeviceId = DeviceId(536_870_914);
    pub const LEFT: DeviceId = DeviceId(536_870_915);

    pub fn new() -> Self {
        Self {
            devices: [Self::RIGHT, Self::LEFT],
        }
    }
}

impl Default for TouchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceAdapter for TouchAdapter {
    type Sample = TouchSample;

    fn name(&self) -> &str {
        "touch"
    }

    fn known_devices(&self) -> &[DeviceId] {
        &self.devices
    }

    fn translate(&mut self, device: DeviceId, sample: Option<&TouchSample>) -> Snapshot {
        let Some((input, pose)) = sample.and_then(|s| s.input.zip(s.pose)) else {
            trace!(%device, "Controller not reporting");
            return Snapshot::disconnected(device);
        };

        let mut snapshot = Snapshot::connected(device)
            .with_pose(pose.position, pose.orientation)
            .with_tracking(pose.tracking())
            .with_battery(input.battery_percent)
            .with_trigger(TouchSources::INDEX_TRIGGER, input.index_trigger)
            .with_trigger(TouchSources::HAND_TRIGGER, input.hand_trigger)
            .with_thumbstick(
                TouchSources::THUMBSTICK,
                input.thumbstick,
                input.buttons.contains(TouchButtons::THUMBSTICK),
            );

        for (flag, source) in TouchSources::BUTTONS {
            snapshot = snapshot.with_button(source, input.buttons.contains(flag));
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(flags: TrackingFlags) -> TouchPose {
        TouchPose {
            position: Vec3::new(0.2, 1.2, -0.3),
            orientation: Quat::IDENTITY,
            flags,
        }
    }

    #[test]
    fn test_buttons_map_to_sources() {
        let mut adapter = TouchAdapter::new();
        let input = TouchInput {
            buttons: TouchButtons::A | TouchButtons::THUMBSTICK,
            index_trigger: 0.75,
            thumbstick: Vec2::new(0.0, 1.0),
            battery_percent: 60,
            ..Default::default()
        };
        let sample = TouchSample::new(TouchAdapter::RIGHT, input, pose(TrackingFlags::all()));
        let snapshot = adapter.translate(TouchAdapter::RIGHT, Some(&sample));

        assert!(snapshot.is_connected);
        assert!(snapshot.is_pressed(TouchSources::A));
        assert!(!snapshot.is_pressed(TouchSources::B));
        assert!(snapshot.is_pressed(TouchSources::THUMBSTICK));
        assert_eq!(snapshot.trigger(TouchSources::INDEX_TRIGGER), 0.75);
        assert_eq!(snapshot.battery_percent, 60);
        assert_eq!(snapshot.tracking, TrackingQuality::Full6Dof);
        let stick = snapshot.thumbstick.unwrap();
        assert!(stick.pressed);
        assert_eq!(stick.axis, Vec2::Y);
    }

    #[test]
    fn test_rotation_only_without_position_flags() {
        let p = pose(TrackingFlags::ORIENTATION_TRACKED | TrackingFlags::ORIENTATION_VALID);
        assert_eq!(p.tracking(), TrackingQuality::RotationOnly);
        let p = pose(TrackingFlags::POSITION_TRACKED | TrackingFlags::ORIENTATION_VALID);
        assert_eq!(p.tracking(), TrackingQuality::RotationOnly);
        assert_eq!(pose(TrackingFlags::empty()).tracking(), TrackingQuality::None);
    }

    #[test]
    fn test_failed_query_is_disconnected() {
        let mut adapter = TouchAdapter::new();
        let sample = TouchSample {
            device: TouchAdapter::LEFT,
            input: Some(TouchInput::default()),
            pose: None,
        };
        assert!(!adapter.translate(TouchAdapter::LEFT, Some(&sample)).is_connected);
        assert!(!adapter.translate(TouchAdapter::LEFT, None).is_connected);
    }

    #[test]
    fn test_known_devices() {
        let adapter = TouchAdapter::new();
        assert_eq!(adapter.known_devices(), &[TouchAdapter::RIGHT, TouchAdapter::LEFT]);
    }
}
