use glam::Vec3;

use crate::controller::input::KeyBindings;

/// Base URL the browser build fetches block textures from.
pub const WEB_TEXTURE_BASE: &str = "https://threejs.org/examples/textures/terrain/";

/// Directory the native build reads block textures from.
pub const NATIVE_TEXTURE_DIR: &str = "assets/textures";

/// Largest terrain half extent accepted from the environment
pub const MAX_TERRAIN_HALF_EXTENT: u32 = 1024;

/// Player movement and look tuning. All values are per tick, not per second.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub ground_height: f32,
    pub mouse_sensitivity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.1,
            jump_speed: 0.2,
            gravity: 0.01,
            ground_height: 2.0,
            mouse_sensitivity: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

/// Everything tunable about a session, fixed at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Blocks are generated for x, z in [-half_extent, half_extent)
    pub terrain_half_extent: u32,
    pub block_size: f32,
    /// `None` seeds the terrain RNG from entropy
    pub terrain_seed: Option<u64>,
    pub spawn: Vec3,
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub bindings: KeyBindings,
    /// URL prefix (web) or directory (native) block textures are loaded from
    pub texture_source: String,
    pub window_size: (u32, u32),
}

impl Default for Settings {
    fn default() -> Self {
        let texture_source = if cfg!(target_arch = "wasm32") {
            WEB_TEXTURE_BASE
        } else {
            NATIVE_TEXTURE_DIR
        };

        Self {
            terrain_half_extent: 10,
            block_size: 1.0,
            terrain_seed: None,
            spawn: Vec3::new(0.0, 2.0, 0.0),
            physics: PhysicsConfig::default(),
            camera: CameraConfig::default(),
            bindings: KeyBindings::default(),
            texture_source: texture_source.to_string(),
            window_size: (1280, 720),
        }
    }
}

impl Settings {
    /// Defaults overridden by `SANDBOX_TERRAIN_SIZE` (at most
    /// [`MAX_TERRAIN_HALF_EXTENT`]), `SANDBOX_SEED` and `SANDBOX_TEXTURE_DIR`.
    /// Malformed values are logged and ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("SANDBOX_TERRAIN_SIZE") {
            match raw.trim().parse::<u32>() {
                Ok(size) if size > MAX_TERRAIN_HALF_EXTENT => {
                    tracing::warn!("SANDBOX_TERRAIN_SIZE={size} too large, capping at {MAX_TERRAIN_HALF_EXTENT}");
                    self.terrain_half_extent = MAX_TERRAIN_HALF_EXTENT;
                }
                Ok(size) => self.terrain_half_extent = size,
                Err(e) => tracing::warn!("ignoring SANDBOX_TERRAIN_SIZE={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup("SANDBOX_SEED") {
            match raw.trim().parse() {
                Ok(seed) => self.terrain_seed = Some(seed),
                Err(e) => tracing::warn!("ignoring SANDBOX_SEED={raw:?}: {e}"),
            }
        }
        if let Some(dir) = lookup("SANDBOX_TEXTURE_DIR") {
            self.texture_source = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let settings = Settings::default();
        assert_eq!(settings.terrain_half_extent, 10);
        assert_eq!(settings.spawn, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(settings.physics.move_speed, 0.1);
        assert_eq!(settings.physics.jump_speed, 0.2);
        assert_eq!(settings.physics.gravity, 0.01);
        assert_eq!(settings.physics.ground_height, 2.0);
        assert_eq!(settings.camera.fov_y_degrees, 75.0);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::default().with_overrides(|key| match key {
            "SANDBOX_TERRAIN_SIZE" => Some("4".to_string()),
            "SANDBOX_SEED" => Some(" 42 ".to_string()),
            "SANDBOX_TEXTURE_DIR" => Some("/tmp/tex".to_string()),
            _ => None,
        });
        assert_eq!(settings.terrain_half_extent, 4);
        assert_eq!(settings.terrain_seed, Some(42));
        assert_eq!(settings.texture_source, "/tmp/tex");
    }

    #[test]
    fn test_malformed_overrides_are_ignored() {
        let settings = Settings::default().with_overrides(|key| match key {
            "SANDBOX_TERRAIN_SIZE" => Some("-3".to_string()),
            "SANDBOX_SEED" => Some("abc".to_string()),
            _ => None,
        });
        assert_eq!(settings.terrain_half_extent, 10);
        assert_eq!(settings.terrain_seed, None);
    }

    #[test]
    fn test_terrain_size_is_capped() {
        let huge = Settings::default().with_overrides(|key| match key {
            "SANDBOX_TERRAIN_SIZE" => Some("3000000000".to_string()),
            _ => None,
        });
        assert_eq!(huge.terrain_half_extent, MAX_TERRAIN_HALF_EXTENT);

        let at_cap = Settings::default().with_overrides(|key| match key {
            "SANDBOX_TERRAIN_SIZE" => Some(MAX_TERRAIN_HALF_EXTENT.to_string()),
            _ => None,
        });
        assert_eq!(at_cap.terrain_half_extent, MAX_TERRAIN_HALF_EXTENT);
    }
}
