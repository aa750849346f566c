/// pShape Web - rotating prisms on an HTML canvas
///
/// `create_shape` binds one shape to a `<canvas>` element and animates it with
/// `requestAnimationFrame` once all of its textures have settled.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, LevelFilter};
use pshape_core::{Clock, LoopHandle, RenderLoop, Shape, ShapeConfig, TextureManager, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

pub mod canvas;
pub mod images;
pub mod logging;

pub use canvas::CanvasSurface;
pub use images::{WebImage, WebImageHost};

thread_local! {
    // One cache per page, shared by every shape
    static TEXTURES: Rc<TextureManager<WebImageHost>> = Rc::new(TextureManager::new(WebImageHost));
}

/// `performance.now()` in seconds
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Self {
        Self {
            performance: window.performance(),
        }
    }
}

impl Clock for PerformanceClock {
    fn now_seconds(&self) -> f64 {
        self.performance.as_ref().map_or(0.0, |p| p.now() / 1000.0)
    }
}

/// Handle returned to JavaScript for stopping a shape
#[wasm_bindgen]
pub struct ShapeHandle {
    handle: LoopHandle,
}

#[wasm_bindgen]
impl ShapeHandle {
    /// Stop animating; the last drawn frame stays on the canvas
    pub fn stop(&self) {
        self.handle.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

fn canvas_context(window: &Window, canvas_id: &str) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{canvas_id}'")))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("element '{canvas_id}' is not a canvas")))?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into()?;
    Ok((canvas, ctx))
}

/// Start a shape on the canvas `canvas_id`.
///
/// `options_json` is an optional JSON object of shape options; missing fields
/// take their defaults. Fails immediately if the canvas cannot be drawn on.
#[wasm_bindgen(js_name = createShape)]
pub fn create_shape(canvas_id: &str, options_json: Option<String>) -> Result<ShapeHandle, JsValue> {
    let config = match options_json.as_deref() {
        Some(json) => ShapeConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => ShapeConfig::default(),
    };

    let window = window()?;
    let (canvas, ctx) = canvas_context(&window, canvas_id)?;

    let (width, height) = config.pixel_size();
    canvas.set_width(width);
    canvas.set_height(height);
    let viewport = Viewport::new(width as f64, height as f64);
    let surface = CanvasSurface::new(ctx, width, height);

    let handle = LoopHandle::new();
    let loop_handle = handle.clone();
    let textures = TEXTURES.with(Rc::clone);

    wasm_bindgen_futures::spawn_local(async move {
        let shape = Shape::load(&config, viewport, &textures).await;
        if !loop_handle.is_running() {
            return;
        }
        info!("shape on '{}' ready", canvas.id());
        let render_loop = RenderLoop::with_handle(shape, PerformanceClock::new(&window), loop_handle);
        if let Err(err) = animate(window, render_loop, surface) {
            log::error!("could not start animation: {err:?}");
        }
    });

    Ok(ShapeHandle { handle })
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(window: &Window, callback: &FrameCallback) -> Result<i32, JsValue> {
    let callback = callback.borrow();
    let closure = callback
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
    window.request_animation_frame(closure.as_ref().unchecked_ref())
}

fn animate(
    window: Window,
    mut render_loop: RenderLoop<WebImage, PerformanceClock>,
    mut surface: CanvasSurface,
) -> Result<(), JsValue> {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();
    let frame_window = window.clone();

    *callback.borrow_mut() = Some(Closure::new(move || {
        if !render_loop.tick(&mut surface) {
            // Not rescheduled; the closure stays alive with `next`
            return;
        }
        if let Err(err) = request_frame(&frame_window, &next) {
            log::error!("requestAnimationFrame failed: {err:?}");
        }
    }));

    request_frame(&window, &callback)?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Info);
    Ok(())
}
