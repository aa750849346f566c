/// `CanvasRenderingContext2d` as a drawing surface
use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use nalgebra::Affine2;
use pshape_core::Surface;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::CanvasRenderingContext2d;

use crate::images::WebImage;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    // answers from CSS.supports, by color string
    known_colors: RefCell<HashMap<String, bool>>,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: u32, height: u32) -> Self {
        Self {
            ctx,
            width: width as f64,
            height: height as f64,
            known_colors: RefCell::new(HashMap::new()),
        }
    }
}

/// `CSS.supports("color", value)`
fn css_supports_color(color: &str) -> Result<bool, JsValue> {
    let css = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("CSS"))?;
    let supports: js_sys::Function = js_sys::Reflect::get(&css, &JsValue::from_str("supports"))?.dyn_into()?;
    let result = supports.call2(&css, &JsValue::from_str("color"), &JsValue::from_str(color))?;
    Ok(result.is_truthy())
}

impl Surface for CanvasSurface {
    type Image = WebImage;

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn clip(&mut self) {
        self.ctx.clip();
    }

    fn supports_color(&self, color: &str) -> bool {
        if let Some(&known) = self.known_colors.borrow().get(color) {
            return known;
        }
        let supported = css_supports_color(color).unwrap_or_else(|err| {
            warn!("CSS.supports unavailable: {err:?}");
            true
        });
        self.known_colors.borrow_mut().insert(color.to_string(), supported);
        supported
    }

    fn fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn draw_image(&mut self, image: &WebImage, transform: &Affine2<f64>) {
        let m = transform.matrix();
        self.ctx.save();
        let result = self
            .ctx
            .transform(m[(0, 0)], m[(1, 0)], m[(0, 1)], m[(1, 1)], m[(0, 2)], m[(1, 2)])
            .and_then(|()| self.ctx.draw_image_with_html_image_element(image.element(), 0.0, 0.0));
        self.ctx.restore();

        if let Err(err) = result {
            warn!("drawImage failed: {err:?}");
        }
    }

    fn set_image_smoothing(&mut self, enabled: bool, quality: &str) {
        self.ctx.set_image_smoothing_enabled(enabled);
        let key = JsValue::from_str("imageSmoothingQuality");
        if let Err(err) = js_sys::Reflect::set(&self.ctx, &key, &JsValue::from_str(quality)) {
            warn!("could not set smoothing quality: {err:?}");
        }
    }
}
