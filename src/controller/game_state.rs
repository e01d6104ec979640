use crate::config::Settings;
use crate::controller::input::{InputQueue, InputState};
use crate::controller::player_controller::PlayerController;
use crate::model::{Block, Camera, PlayerState, Scene, TerrainGenerator};

/// Everything one session owns: the player, the input it reacts to, the
/// camera that follows it and the generated world.
pub struct GameState {
    pub player: PlayerState,
    pub input: InputState,
    pub camera: Camera,
    pub scene: Scene,
    pub blocks: Vec<Block>,
    controller: PlayerController,
    events: InputQueue,
}

impl GameState {
    /// Build the world and the player. `width`/`height` size the camera.
    pub fn new(settings: &Settings, events: InputQueue, width: u32, height: u32) -> Self {
        let mut generator = match settings.terrain_seed {
            Some(seed) => TerrainGenerator::with_seed(settings.block_size, seed),
            None => TerrainGenerator::new(settings.block_size),
        };
        let mut scene = Scene::new();
        let blocks = generator.generate(settings.terrain_half_extent, &mut scene);

        let player = PlayerState::new(settings.spawn);
        let mut camera = Camera::new(width, height, &settings.camera);
        camera.eye = player.position;

        Self {
            player,
            input: InputState::new(),
            camera,
            scene,
            blocks,
            controller: PlayerController::new(settings.physics.clone(), settings.bindings.clone()),
            events,
        }
    }

    /// One simulation step: apply queued input, then move the player
    pub fn tick(&mut self) {
        self.events.drain_into(&mut self.input);
        self.controller
            .update(&mut self.player, &mut self.input, &mut self.camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::{channel, InputEvent};

    fn settings(half_extent: u32) -> Settings {
        Settings {
            terrain_half_extent: half_extent,
            terrain_seed: Some(5),
            ..Settings::default()
        }
    }

    #[test]
    fn test_new_generates_world() {
        let (_tx, queue) = channel();
        let game = GameState::new(&settings(10), queue, 800, 600);

        assert_eq!(game.blocks.len(), 400);
        assert_eq!(game.scene.len(), 400);
        assert_eq!(game.player, PlayerState::default());
        assert_eq!(game.camera.eye, game.player.position);
    }

    #[test]
    fn test_generate_then_walk_forward() {
        let (tx, queue) = channel();
        let mut game = GameState::new(&settings(2), queue, 800, 600);

        let mut coords: Vec<(i32, i32)> = game.blocks.iter().map(|b| (b.position.x, b.position.z)).collect();
        coords.sort();
        let expected: Vec<(i32, i32)> = (-2..2).flat_map(|x| (-2..2).map(move |z| (x, z))).collect();
        assert_eq!(coords, expected);

        tx.send(InputEvent::KeyDown("w".to_string()));
        game.tick();

        assert!(game.player.position.x.abs() < 1e-6);
        assert!((game.player.position.z + 0.1).abs() < 1e-6);
        assert_eq!(game.player.position.y, 2.0);
        assert_eq!(game.camera.eye, game.player.position);
    }

    #[test]
    fn test_tick_drains_queue_once() {
        let (tx, queue) = channel();
        let mut game = GameState::new(&settings(1), queue, 800, 600);

        tx.send(InputEvent::MouseMove { dx: 50.0, dy: 0.0 });
        game.tick();
        let yaw = game.camera.yaw;
        assert!((yaw + 0.1).abs() < 1e-6);

        game.tick();
        assert_eq!(game.camera.yaw, yaw);
    }

    #[test]
    fn test_key_release_stops_movement() {
        let (tx, queue) = channel();
        let mut game = GameState::new(&settings(1), queue, 800, 600);

        tx.send(InputEvent::KeyDown("d".to_string()));
        game.tick();
        game.tick();
        tx.send(InputEvent::KeyUp("d".to_string()));
        game.tick();
        game.tick();

        assert!((game.player.position.x - 0.2).abs() < 1e-6);
    }
}
