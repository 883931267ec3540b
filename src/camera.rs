//! Head camera used for reticle sizing and camera transform updates

use glam::{Quat, Vec3};

use crate::event::CameraTransform;

/// Perspective camera driven by the head pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport height in pixels
    pub viewport_height: f32,
}

impl Camera {
    pub fn new(fov_y: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov_y,
            viewport_height,
        }
    }

    /// Moves the camera to a new head pose
    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
    }

    pub fn with_pose(mut self, position: Vec3, orientation: Quat) -> Self {
        self.set_pose(position, orientation);
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Transform forwarded to listeners that enable camera updates
    pub fn transform(&self) -> CameraTransform {
        CameraTransform::from_pose(self.position, self.orientation)
    }

    /// World units covered by one pixel at `depth`
    ///
    /// The sign of `depth` is ignored.
    pub fn world_per_screen(&self, depth: f32) -> f32 {
        if self.viewport_height <= 0.0 {
            return 0.0;
        }
        2.0 * depth.abs() * (self.fov_y * 0.5).tan() / self.viewport_height
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(90f32.to_radians(), 1080.0)
    }
}
