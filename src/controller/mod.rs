// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod player_controller;
pub mod game_state;
pub mod frame_loop;

pub use input::{InputEvent, InputQueue, InputSender, InputState, KeyBindings};
pub use player_controller::PlayerController;
pub use game_state::GameState;
pub use frame_loop::{Frame, FrameLoopContext, FrameRenderer};
