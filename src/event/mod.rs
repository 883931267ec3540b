//! Canonical input events
//!
//! Device-agnostic event vocabulary produced by the state tracker and consumed
//! by listeners. Events are created fresh every tick and never persisted.

mod action;
mod listener;

use std::fmt;

use glam::{Quat, Vec2, Vec3};

use crate::scene::NodeId;

pub use action::{EnabledActions, EventAction};
pub use listener::{EventListener, ListenerRegistry, SharedListener, shared};

/// Input device identifier as reported by the hardware layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// Input source on a device (button, trigger, stick)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u32);

impl SourceId {
    /// Source used for events that belong to the device as a whole
    pub const DEVICE: SourceId = SourceId(0);
}

/// Phase of a button interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickState {
    Down,
    Up,
    /// Synthesized after an Up that matches the pending Down
    Clicked,
}

/// Quality of positional tracking reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackingQuality {
    /// No valid pose
    #[default]
    None,
    /// Orientation only
    RotationOnly,
    /// Full position and orientation
    Full6Dof,
}

/// Button transition, resolved against the device's hit result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub device: DeviceId,
    pub source: SourceId,
    pub state: ClickState,
    pub hit_position: Vec3,
    pub target: NodeId,
}

/// Hover on/off transition for a single device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEvent {
    pub device: DeviceId,
    pub source: SourceId,
    pub is_hovering: bool,
    pub hit_position: Vec3,
    /// Node the device now points at
    pub entered: NodeId,
    /// Node the device pointed at before, if any
    pub exited: Option<NodeId>,
    pub is_background_hit: bool,
}

impl HoverEvent {
    /// Node this event is about: the entered node for hover-on, the exited
    /// node for hover-off.
    pub fn target(&self) -> Option<NodeId> {
        if self.is_hovering {
            Some(self.entered)
        } else {
            self.exited
        }
    }
}

/// Pose change of a device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvent {
    pub device: DeviceId,
    pub source: SourceId,
    pub position: Vec3,
    pub orientation: Quat,
}

impl MoveEvent {
    /// World-space pointing direction of the device
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

/// Thumbstick axis or click change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbStickEvent {
    pub device: DeviceId,
    pub source: SourceId,
    pub is_pressed: bool,
    pub axis: Vec2,
}

/// Analog trigger weight change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub device: DeviceId,
    pub source: SourceId,
    /// Weight in 0..=1
    pub weight: f32,
}

/// Connection, tracking or battery change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStatusEvent {
    pub device: DeviceId,
    pub is_connected: bool,
    pub tracking: TrackingQuality,
    pub battery_percent: u8,
}

/// Head/camera transform forwarded straight from the adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub orientation: Quat,
    pub forward: Vec3,
    pub up: Vec3,
}

impl CameraTransform {
    /// Builds a transform from a pose, deriving forward (-Z) and up (+Y)
    pub fn from_pose(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            forward: orientation * Vec3::NEG_Z,
            up: orientation * Vec3::Y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_target_follows_direction() {
        let on = HoverEvent {
            device: DeviceId(1),
            source: SourceId(1),
            is_hovering: true,
            hit_position: Vec3::ZERO,
            entered: NodeId(4),
            exited: Some(NodeId(2)),
            is_background_hit: false,
        };
        let off = HoverEvent {
            is_hovering: false,
            ..on
        };
        assert_eq!(on.target(), Some(NodeId(4)));
        assert_eq!(off.target(), Some(NodeId(2)));
    }

    #[test]
    fn test_camera_transform_from_identity_pose() {
        let transform = CameraTransform::from_pose(Vec3::ONE, Quat::IDENTITY);
        assert_eq!(transform.forward, Vec3::NEG_Z);
        assert_eq!(transform.up, Vec3::Y);
    }

    #[test]
    fn test_move_forward_rotates_with_orientation() {
        let event = MoveEvent {
            device: DeviceId(1),
            source: SourceId(1),
            position: Vec3::ZERO,
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };
        // Quarter turn left around +Y maps -Z to -X
        assert!(event.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));
    }
}
