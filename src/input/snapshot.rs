//! Per-device raw state for a single tick

use std::collections::BTreeMap;

use glam::{Quat, Vec2, Vec3};

use crate::event::{DeviceId, SourceId, TrackingQuality};

/// Thumbstick sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbStick {
    pub source: SourceId,
    pub axis: Vec2,
    pub pressed: bool,
}

/// One tick's full state for one device
///
/// Produced by a device adapter, never mutated after it reaches the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub device: DeviceId,
    /// Pressed state per button source
    pub buttons: BTreeMap<SourceId, bool>,
    /// Analog weight (0..=1) per trigger source
    pub triggers: BTreeMap<SourceId, f32>,
    pub thumbstick: Option<ThumbStick>,
    /// World-space position
    pub position: Vec3,
    pub orientation: Quat,
    pub is_connected: bool,
    pub tracking: TrackingQuality,
    pub battery_percent: u8,
}

impl Snapshot {
    /// Default snapshot for a device that reported nothing this tick
    pub fn disconnected(device: DeviceId) -> Self {
        Self {
            device,
            buttons: BTreeMap::new(),
            triggers: BTreeMap::new(),
            thumbstick: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            is_connected: false,
            tracking: TrackingQuality::None,
            battery_percent: 0,
        }
    }

    /// Connected device at the origin with nothing pressed
    pub fn connected(device: DeviceId) -> Self {
        Self {
            is_connected: true,
            tracking: TrackingQuality::RotationOnly,
            battery_percent: 100,
            ..Self::disconnected(device)
        }
    }

    pub fn with_pose(mut self, position: Vec3, orientation: Quat) -> Self {
        self.position = position;
        self.orientation = orientation;
        self
    }

    /// Points the device from `position` at `target`
    pub fn looking_at(self, position: Vec3, target: Vec3) -> Self {
        let direction = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let orientation = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
        self.with_pose(position, orientation)
    }

    pub fn with_button(mut self, source: SourceId, pressed: bool) -> Self {
        self.buttons.insert(source, pressed);
        self
    }

    pub fn with_trigger(mut self, source: SourceId, weight: f32) -> Self {
        self.triggers.insert(source, weight.clamp(0.0, 1.0));
        self
    }

    pub fn with_thumbstick(mut self, source: SourceId, axis: Vec2, pressed: bool) -> Self {
        self.thumbstick = Some(ThumbStick {
            source,
            axis,
            pressed,
        });
        self
    }

    pub fn with_tracking(mut self, tracking: TrackingQuality) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn with_battery(mut self, battery_percent: u8) -> Self {
        self.battery_percent = battery_percent.min(100);
        self
    }

    pub fn is_pressed(&self, source: SourceId) -> bool {
        self.buttons.get(&source).copied().unwrap_or(false)
    }

    pub fn trigger(&self, source: SourceId) -> f32 {
        self.triggers.get(&source).copied().unwrap_or(0.0)
    }

    /// Pointing direction in world space
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Whether position or orientation differs from `other` by more than `epsilon`
    pub fn pose_differs(&self, other: &Snapshot, epsilon: f32) -> bool {
        !self.position.abs_diff_eq(other.position, epsilon)
            || !self.orientation.abs_diff_eq(other.orientation, epsilon)
    }
}
