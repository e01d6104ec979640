use egui::Context;
use glam::Vec3;

use crate::controller::GameState;
use crate::model::{BlockKind, MotionState};

/// Read-only snapshot of what the overlay shows
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub position: Vec3,
    pub motion: MotionState,
    pub yaw: f32,
    pub pitch: f32,
    pub block_count: usize,
    pub fps: f32,
}

impl Hud {
    pub fn from_game(game: &GameState, fps: f32) -> Self {
        Self {
            position: game.player.position,
            motion: game.player.motion(),
            yaw: game.camera.yaw,
            pitch: game.camera.pitch,
            block_count: game.blocks.len(),
            fps,
        }
    }
}

/// Build the overlay and return egui output. The overlay is display only.
pub fn build_ui(
    egui_ctx: &Context,
    hud: &Hud,
    width: u32,
    height: u32,
    pixels_per_point: f32,
    now: f64,
) -> egui::FullOutput {
    egui_ctx.set_pixels_per_point(pixels_per_point);

    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(now / 1000.0);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(width as f32 / pixels_per_point, height as f32 / pixels_per_point),
    ));

    egui_ctx.run(raw_input, |ctx| {
        draw_crosshair(ctx);
        draw_debug_window(ctx, hud);
        draw_inventory(ctx);
    })
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    let stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
    painter.line_segment(
        [egui::Pos2::new(center.x - size, center.y), egui::Pos2::new(center.x + size, center.y)],
        stroke,
    );
    painter.line_segment(
        [egui::Pos2::new(center.x, center.y - size), egui::Pos2::new(center.x, center.y + size)],
        stroke,
    );
}

fn draw_debug_window(ctx: &Context, hud: &Hud) {
    let motion = match hud.motion {
        MotionState::Grounded => "grounded",
        MotionState::Airborne => "airborne",
    };

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", hud.fps)).small());
            ui.label(
                egui::RichText::new(format!(
                    "Pos: x: {:.1} y: {:.1} z: {:.1}",
                    hud.position.x, hud.position.y, hud.position.z
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("State: {motion}")).small());
            ui.label(
                egui::RichText::new(format!(
                    "Yaw: {:.1} Pitch: {:.1}",
                    hud.yaw.to_degrees(),
                    hud.pitch.to_degrees()
                ))
                .small(),
            );
            ui.label(egui::RichText::new(format!("Blocks: {}", hud.block_count)).small());
            ui.separator();
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Space - Jump").small());
            ui.label(egui::RichText::new("Mouse - Look").small());
        });
}

/// Static inventory bar, one slot per block kind. Not wired to anything.
fn draw_inventory(ctx: &Context) {
    egui::Area::new(egui::Id::new("inventory"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -8.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for kind in BlockKind::ALL {
                    let [r, g, b, _] = kind.color_rgba8();
                    egui::Frame::NONE
                        .fill(egui::Color32::from_rgb(r, g, b))
                        .stroke(egui::Stroke::new(0.5, egui::Color32::BLACK))
                        .inner_margin(2.0)
                        .show(ui, |ui| {
                            ui.set_min_size(egui::vec2(40.0, 40.0));
                            ui.vertical_centered(|ui| {
                                ui.add_space(14.0);
                                ui.label(
                                    egui::RichText::new(kind.name())
                                        .size(10.0)
                                        .color(egui::Color32::WHITE),
                                );
                            });
                        });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hud() -> Hud {
        Hud {
            position: Vec3::new(0.0, 2.0, 0.0),
            motion: MotionState::Grounded,
            yaw: 0.0,
            pitch: 0.0,
            block_count: 400,
            fps: 60.0,
        }
    }

    #[test]
    fn test_overlay_produces_shapes() {
        let ctx = Context::default();
        let output = build_ui(&ctx, &hud(), 800, 600, 1.0, 0.0);
        assert!(!output.shapes.is_empty());
    }

    #[test]
    fn test_overlay_at_high_dpi() {
        let ctx = Context::default();
        let output = build_ui(&ctx, &hud(), 1600, 1200, 2.0, 16.0);
        assert!(!output.shapes.is_empty());
    }
}
