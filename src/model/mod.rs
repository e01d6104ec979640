// MODEL: Game state and data
pub mod world;
pub mod camera;
pub mod player;
pub mod scene;

pub use world::{Block, BlockKind, TerrainGenerator};
pub use camera::Camera;
pub use player::{MotionState, PlayerState};
pub use scene::{RenderHandle, Scene, SceneObject};
