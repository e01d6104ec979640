use glam::Vec3;

use crate::config::PhysicsConfig;
use crate::controller::input::{InputState, KeyBindings};
use crate::model::{Camera, PlayerState};

/// Moves the player from held keys, integrates gravity against the ground
/// plane and keeps the camera on the player.
pub struct PlayerController {
    pub physics: PhysicsConfig,
    pub bindings: KeyBindings,
}

impl PlayerController {
    pub fn new(physics: PhysicsConfig, bindings: KeyBindings) -> Self {
        Self { physics, bindings }
    }

    /// Advance the player by one tick
    pub fn update(&self, player: &mut PlayerState, input: &mut InputState, camera: &mut Camera) {
        self.apply_movement(player, input, camera.yaw);
        self.apply_jump(player, input);
        self.integrate_gravity(player);
        self.clamp_to_ground(player);
        self.sync_camera(player, input, camera);
    }

    /// Each held direction key adds one full step. Steps are summed without
    /// normalizing, so diagonals cover more ground per tick.
    fn apply_movement(&self, player: &mut PlayerState, input: &InputState, yaw: f32) {
        let speed = self.physics.move_speed;
        let (sin, cos) = yaw.sin_cos();
        let forward = Vec3::new(-sin, 0.0, -cos) * speed;
        let right = Vec3::new(cos, 0.0, -sin) * speed;

        if self.bindings.is_moving_forward(input) {
            player.position += forward;
        }
        if self.bindings.is_moving_backward(input) {
            player.position -= forward;
        }
        if self.bindings.is_moving_left(input) {
            player.position -= right;
        }
        if self.bindings.is_moving_right(input) {
            player.position += right;
        }
    }

    fn apply_jump(&self, player: &mut PlayerState, input: &InputState) {
        if self.bindings.is_jumping(input) && player.on_ground {
            player.vertical_velocity = self.physics.jump_speed;
            player.on_ground = false;
            tracing::debug!("jump from y={:.2}", player.position.y);
        }
    }

    fn integrate_gravity(&self, player: &mut PlayerState) {
        player.vertical_velocity -= self.physics.gravity;
        player.position.y += player.vertical_velocity;
    }

    fn clamp_to_ground(&self, player: &mut PlayerState) {
        if player.position.y < self.physics.ground_height {
            if !player.on_ground {
                tracing::debug!("landed at x={:.2} z={:.2}", player.position.x, player.position.z);
            }
            player.position.y = self.physics.ground_height;
            player.vertical_velocity = 0.0;
            player.on_ground = true;
        }
    }

    fn sync_camera(&self, player: &PlayerState, input: &mut InputState, camera: &mut Camera) {
        camera.eye = player.position;

        let (dx, dy) = input.consume_look();
        let sensitivity = self.physics.mouse_sensitivity;
        camera.pitch -= dy * sensitivity;
        camera.yaw -= dx * sensitivity;
        camera.roll = 0.0;
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(PhysicsConfig::default(), KeyBindings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::controller::input::InputEvent;
    use crate::model::MotionState;

    const EPS: f32 = 1e-5;

    fn setup() -> (PlayerController, PlayerState, InputState, Camera) {
        (
            PlayerController::default(),
            PlayerState::default(),
            InputState::new(),
            Camera::new(800, 600, &CameraConfig::default()),
        )
    }

    fn press(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyDown(key.to_string()));
    }

    fn release(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyUp(key.to_string()));
    }

    #[test]
    fn test_forward_at_zero_yaw_moves_along_neg_z() {
        let (ctl, mut player, mut input, mut cam) = setup();
        press(&mut input, "w");
        ctl.update(&mut player, &mut input, &mut cam);

        assert!(player.position.x.abs() < EPS);
        assert!((player.position.z + 0.1).abs() < EPS);
        assert_eq!(player.position.y, 2.0);
    }

    #[test]
    fn test_each_direction() {
        let cases = [("w", (0.0, -0.1)), ("s", (0.0, 0.1)), ("a", (-0.1, 0.0)), ("d", (0.1, 0.0))];
        for (key, (ex, ez)) in cases {
            let (ctl, mut player, mut input, mut cam) = setup();
            press(&mut input, key);
            ctl.update(&mut player, &mut input, &mut cam);
            assert!((player.position.x - ex).abs() < EPS, "{key}: x={}", player.position.x);
            assert!((player.position.z - ez).abs() < EPS, "{key}: z={}", player.position.z);
        }
    }

    #[test]
    fn test_movement_follows_yaw() {
        let (ctl, mut player, mut input, mut cam) = setup();
        cam.yaw = std::f32::consts::FRAC_PI_2;
        press(&mut input, "w");
        ctl.update(&mut player, &mut input, &mut cam);

        // facing -X after a quarter turn left
        assert!((player.position.x + 0.1).abs() < EPS);
        assert!(player.position.z.abs() < EPS);
    }

    #[test]
    fn test_diagonal_is_not_normalized() {
        let (ctl, mut player, mut input, mut cam) = setup();
        press(&mut input, "w");
        press(&mut input, "d");
        ctl.update(&mut player, &mut input, &mut cam);

        let horizontal = Vec3::new(player.position.x, 0.0, player.position.z);
        assert!((horizontal.length() - 0.1 * std::f32::consts::SQRT_2).abs() < EPS);
        assert!((player.position.x - 0.1).abs() < EPS);
        assert!((player.position.z + 0.1).abs() < EPS);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let (ctl, mut player, mut input, mut cam) = setup();
        press(&mut input, "a");
        press(&mut input, "d");
        ctl.update(&mut player, &mut input, &mut cam);
        assert!(player.position.x.abs() < EPS);
    }

    #[test]
    fn test_ground_clamp_is_fixed_point() {
        let (ctl, mut player, mut input, mut cam) = setup();
        player.position.y = 1.5;
        player.vertical_velocity = -0.3;
        player.on_ground = false;

        ctl.update(&mut player, &mut input, &mut cam);
        assert_eq!(player.position.y, 2.0);
        assert_eq!(player.vertical_velocity, 0.0);
        assert!(player.on_ground);

        let settled = player;
        for _ in 0..10 {
            ctl.update(&mut player, &mut input, &mut cam);
            assert_eq!(player, settled);
        }
    }

    #[test]
    fn test_jump_then_fall_returns_to_ground() {
        let (ctl, mut player, mut input, mut cam) = setup();
        press(&mut input, " ");
        ctl.update(&mut player, &mut input, &mut cam);
        release(&mut input, " ");

        assert!(!player.on_ground);
        assert_eq!(player.motion(), MotionState::Airborne);
        // jump speed minus one tick of gravity
        assert!((player.vertical_velocity - 0.19).abs() < EPS);

        let mut ticks = 1;
        let mut peak = player.position.y;
        let mut rising_ticks = 1;
        while !player.on_ground {
            let before = player.position.y;
            ctl.update(&mut player, &mut input, &mut cam);
            ticks += 1;
            if player.position.y > before {
                rising_ticks += 1;
            }
            peak = peak.max(player.position.y);
            assert!(ticks < 100, "never landed");
        }

        // v = 0.2 - 0.01k, so y climbs for ~20 ticks and is back at 2.0 by tick 40
        assert!((19..=20).contains(&rising_ticks), "rose for {rising_ticks} ticks");
        assert!((39..=40).contains(&ticks), "airborne for {ticks} ticks");
        assert!((peak - 3.9).abs() < 0.01, "peak {peak}");
        assert_eq!(player.position.y, 2.0);
        assert_eq!(player.vertical_velocity, 0.0);
        assert_eq!(player.motion(), MotionState::Grounded);
    }

    #[test]
    fn test_airborne_count_is_deterministic() {
        let airborne_ticks = || {
            let (ctl, mut player, mut input, mut cam) = setup();
            press(&mut input, " ");
            ctl.update(&mut player, &mut input, &mut cam);
            release(&mut input, " ");
            let mut ticks = 1;
            while !player.on_ground {
                ctl.update(&mut player, &mut input, &mut cam);
                ticks += 1;
            }
            ticks
        };
        assert_eq!(airborne_ticks(), airborne_ticks());
    }

    #[test]
    fn test_holding_jump_fires_once_per_landing() {
        let (ctl, mut player, mut input, mut cam) = setup();
        press(&mut input, " ");

        ctl.update(&mut player, &mut input, &mut cam);
        let velocity_after_jump = player.vertical_velocity;
        ctl.update(&mut player, &mut input, &mut cam);
        // still airborne: no second impulse, only gravity
        assert!((player.vertical_velocity - (velocity_after_jump - 0.01)).abs() < EPS);

        while !player.on_ground {
            ctl.update(&mut player, &mut input, &mut cam);
        }
        // grounded again with the key held: the next tick jumps again
        ctl.update(&mut player, &mut input, &mut cam);
        assert!(!player.on_ground);
    }

    #[test]
    fn test_camera_follows_player() {
        let (ctl, mut player, mut input, mut cam) = setup();
        press(&mut input, "s");
        ctl.update(&mut player, &mut input, &mut cam);
        assert_eq!(cam.eye, player.position);
    }

    #[test]
    fn test_mouse_look_is_inverted_and_drained() {
        let (ctl, mut player, mut input, mut cam) = setup();
        input.process_event(&InputEvent::MouseMove { dx: 100.0, dy: -50.0 });

        ctl.update(&mut player, &mut input, &mut cam);
        assert!((cam.yaw + 0.2).abs() < EPS);
        assert!((cam.pitch - 0.1).abs() < EPS);
        assert_eq!(cam.roll, 0.0);
        assert_eq!(input.look_delta, (0.0, 0.0));

        ctl.update(&mut player, &mut input, &mut cam);
        assert!((cam.yaw + 0.2).abs() < EPS);
        assert!((cam.pitch - 0.1).abs() < EPS);
    }
}
