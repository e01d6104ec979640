use crate::controller::game_state::GameState;
use crate::model::{Camera, Scene};
use crate::ui::{self, Hud};

/// Everything the renderer needs to draw one frame
pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub ui_primitives: Vec<egui::ClippedPrimitive>,
    pub ui_textures: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// The drawing service the frame loop hands each frame to
pub trait FrameRenderer {
    type Error;

    /// Current drawable size in physical pixels
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: Frame<'_>) -> Result<(), Self::Error>;
}

/// Main game loop state and per-frame update logic
pub struct FrameLoopContext {
    pub game: GameState,
    pub egui_ctx: egui::Context,
    last_time: Option<f64>,
    fps: f32,
}

impl FrameLoopContext {
    pub fn new(game: GameState) -> Self {
        Self {
            game,
            egui_ctx: egui::Context::default(),
            last_time: None,
            fps: 0.0,
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Update the simulation, build the overlay and draw. `now` is in
    /// milliseconds and only feeds the fps counter and UI clock.
    pub fn tick<R: FrameRenderer>(
        &mut self,
        renderer: &mut R,
        now: f64,
        pixels_per_point: f32,
    ) -> Result<(), R::Error> {
        self.update_fps(now);
        self.game.tick();

        let (width, height) = renderer.size();
        let hud = Hud::from_game(&self.game, self.fps);
        let full_output = ui::build_ui(&self.egui_ctx, &hud, width, height, pixels_per_point, now);
        let ui_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        renderer.render(Frame {
            scene: &self.game.scene,
            camera: &self.game.camera,
            ui_primitives,
            ui_textures: full_output.textures_delta,
            pixels_per_point,
        })
    }

    /// Propagate a new drawable size to the renderer and the camera.
    /// Zero-sized and unchanged sizes are ignored.
    pub fn resize<R: FrameRenderer>(&mut self, renderer: &mut R, width: u32, height: u32) {
        if width == 0 || height == 0 || renderer.size() == (width, height) {
            return;
        }
        tracing::info!("resize to {width}x{height}");
        renderer.resize(width, height);
        self.game.camera.set_aspect(width, height);
    }

    fn update_fps(&mut self, now: f64) {
        if let Some(last) = self.last_time {
            let dt = (now - last) as f32;
            if dt > 0.0 {
                let instant = 1000.0 / dt;
                self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
            }
        }
        self.last_time = Some(now);
    }
}
