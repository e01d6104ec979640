use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionState {
    Grounded,
    Airborne,
}

/// The player: a point with vertical velocity, standing on a fixed ground plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub on_ground: bool,
}

impl PlayerState {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            vertical_velocity: 0.0,
            on_ground: true,
        }
    }

    pub fn motion(&self) -> MotionState {
        if self.on_ground {
            MotionState::Grounded
        } else {
            MotionState::Airborne
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 0.0))
    }
}
