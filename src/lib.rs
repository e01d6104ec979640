pub mod config;
pub mod error;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::Settings;
pub use error::{Result, SandboxError};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};
#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use controller::{FrameLoopContext, GameState, InputEvent, InputSender, KeyBindings};
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, RenderState};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();

    let settings = Settings::default();
    let (window, document, canvas) = init_canvas()?;
    setup_app(window, document, canvas, settings).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    settings: Settings,
) -> Result<(), JsValue> {
    let (width, height) = canvas_size(&window);
    canvas.set_width(width);
    canvas.set_height(height);

    let gpu = GpuContext::new(&canvas, width, height)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e}")))?;
    let mut renderer = RenderState::new(gpu, &settings.texture_source);

    let (input_tx, input_queue) = controller::input::channel();
    let game = GameState::new(&settings, input_queue, width, height);
    let mut frame_loop = FrameLoopContext::new(game);

    setup_input_listeners(&document, &window, &canvas, input_tx, settings.bindings.clone())?;

    let performance = window.performance();
    let loop_window = window.clone();
    RcCellCallback::new(window, move || {
        // the canvas tracks the window; pick up size changes before drawing
        let (w, h) = canvas_size(&loop_window);
        if (canvas.width(), canvas.height()) != (w, h) {
            canvas.set_width(w);
            canvas.set_height(h);
        }
        frame_loop.resize(&mut renderer, w, h);

        let now = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
        let pixels_per_point = loop_window.device_pixel_ratio() as f32;
        match frame_loop.tick(&mut renderer, now, pixels_per_point) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("rendering failed, stopping frame loop: {e}");
                false
            }
        }
    })
    .start()?;

    tracing::info!("frame loop started at {width}x{height}");
    Ok(())
}

/// Forward browser events into the input queue
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    input: InputSender,
    bindings: KeyBindings,
) -> Result<(), JsValue> {
    use controller::input::wasm::{keyboard_event_to_input, mouse_move_to_input};

    // Keyboard down
    {
        let input = input.clone();
        let document_for_exit = document.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let key = e.key();
            if bindings.is_release_pointer(&key) {
                document_for_exit.exit_pointer_lock();
            }
            if bindings.is_game_key(&key) {
                e.prevent_default();
            }
            input.send(keyboard_event_to_input(&e, true));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input = input.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            input.send(keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss: no keyup will arrive for keys held right now
    {
        let input = input.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input.send(InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    {
        let input = input.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            input.send(InputEvent::VisibilityChanged { visible: !doc.hidden() });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Canvas click to enter pointer lock
    {
        let canvas_click = canvas.clone();
        let click = Closure::wrap(Box::new(move |_e: MouseEvent| {
            canvas_click.request_pointer_lock();
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();
    }

    // Mouse move
    {
        let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
            input.send(mouse_move_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
        mm.forget();
    }

    Ok(())
}

/// Drawable size of a full-window canvas in physical pixels
#[cfg(target_arch = "wasm32")]
fn canvas_size(window: &Window) -> (u32, u32) {
    let dpr = window.device_pixel_ratio();
    let css = |v: std::result::Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let width = (css(window.inner_width()) * dpr).round() as u32;
    let height = (css(window.inner_height()) * dpr).round() as u32;
    (width.max(1), height.max(1))
}

#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    body.set_attribute("style", "margin: 0; overflow: hidden;")?;

    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_attribute("style", "display: block; width: 100vw; height: 100vh;")?;
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

/// requestAnimationFrame chain. The callback returns `false` to stop.
#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut() -> bool>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !inner.borrow_mut().as_mut()() {
                return;
            }

            // Recursively schedule next frame
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
        Ok(())
    }
}
