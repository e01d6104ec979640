use glam::{Mat4, Quat, Vec3};

use crate::config::CameraConfig;

/// Perspective camera. At zero rotation it looks down -Z with +Y up;
/// orientation is applied as pitch about X, then yaw about Y.
pub struct Camera {
    pub eye: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 5.0),
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch)
            * Quat::from_rotation_y(self.yaw)
            * Quat::from_rotation_z(self.roll)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.eye).inverse()
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
