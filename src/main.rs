use winit::{
    event::*,
    event_loop::EventLoop,
    window::{CursorGrabMode, Window},
};
use std::sync::Arc;
use std::time::Instant;

use voxel_sandbox::{
    logging, Settings, SandboxError,
    controller::{self, FrameLoopContext, GameState, InputEvent, InputSender, KeyBindings},
    view::{texture, GpuContext, RenderState},
};

struct App {
    window: Arc<Window>,
    renderer: RenderState,
    frame_loop: FrameLoopContext,
    input: InputSender,
    bindings: KeyBindings,
    mouse_locked: bool,
    started: Instant,
}

impl App {
    async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self, SandboxError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new_native(&instance, surface, size.width, size.height).await?;
        let renderer = RenderState::new(gpu, &settings.texture_source);

        let (input, input_queue) = controller::input::channel();
        let game = GameState::new(settings, input_queue, size.width.max(1), size.height.max(1));

        Ok(Self {
            window,
            renderer,
            frame_loop: FrameLoopContext::new(game),
            input,
            bindings: settings.bindings.clone(),
            mouse_locked: false,
            started: Instant::now(),
        })
    }

    /// Returns true if the event was consumed as game input
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, .. }, .. } => {
                let Some(input) = controller::input::native::key_to_input(logical_key, state.is_pressed()) else {
                    return true;
                };
                if let InputEvent::KeyDown(key) = &input {
                    if self.bindings.is_release_pointer(key) {
                        self.set_mouse_lock(false);
                    }
                }
                self.input.send(input);
                true
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                self.set_mouse_lock(true);
                true
            }
            WindowEvent::Focused(false) => {
                self.set_mouse_lock(false);
                self.input.send(InputEvent::FocusLost);
                true
            }
            WindowEvent::Occluded(occluded) => {
                self.input.send(InputEvent::VisibilityChanged { visible: !occluded });
                true
            }
            _ => false,
        }
    }

    fn set_mouse_lock(&mut self, locked: bool) {
        if self.mouse_locked == locked {
            return;
        }
        let grab = if locked {
            // not every platform supports Locked
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab failed: {e}");
            return;
        }
        self.window.set_cursor_visible(!locked);
        self.mouse_locked = locked;
    }

    fn handle_mouse_motion(&self, dx: f64, dy: f64) {
        if self.mouse_locked {
            self.input.send(InputEvent::MouseMove { dx: dx as f32, dy: dy as f32 });
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.frame_loop.resize(&mut self.renderer, new_size.width, new_size.height);
    }

    fn redraw(&mut self) -> Result<(), SandboxError> {
        let now = self.started.elapsed().as_secs_f64() * 1000.0;
        let pixels_per_point = self.window.scale_factor() as f32;
        self.frame_loop.tick(&mut self.renderer, now, pixels_per_point)
    }
}

fn main() -> Result<(), SandboxError> {
    logging::init();

    let settings = Settings::from_env();
    let event_loop = EventLoop::new()?;
    let (width, height) = settings.window_size;
    let window_attributes = Window::default_attributes()
        .with_title("Voxel Sandbox")
        .with_inner_size(winit::dpi::LogicalSize::new(width, height));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    tracing::info!("loading block textures from {}", settings.texture_source);
    let missing = texture::missing_textures(&settings.texture_source);
    if !missing.is_empty() {
        let files: Vec<&str> = missing.iter().map(|kind| kind.texture_file()).collect();
        tracing::warn!(
            "missing {} in {}, those blocks keep flat colours (set SANDBOX_TEXTURE_DIR to change the directory)",
            files.join(", "),
            settings.texture_source
        );
    }

    let mut app = pollster::block_on(App::new(window, &settings))?;
    tracing::info!("sandbox ready, click the window to capture the mouse");

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => match app.redraw() {
                            Ok(()) => {}
                            Err(SandboxError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                                tracing::error!("GPU out of memory, exiting");
                                elwt.exit();
                            }
                            Err(e) => tracing::error!("frame failed: {e}"),
                        },
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
                app.handle_mouse_motion(delta.0, delta.1);
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
