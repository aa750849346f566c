/// Browser image decoding and slicing through `HtmlImageElement`
use futures::future::{FutureExt, LocalBoxFuture};
use pshape_core::{ImageHost, Raster, SliceRegion, TextureError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

#[derive(Debug, Clone)]
pub struct WebImage(HtmlImageElement);

impl WebImage {
    pub fn element(&self) -> &HtmlImageElement {
        &self.0
    }
}

impl Raster for WebImage {
    fn width(&self) -> u32 {
        self.0.natural_width()
    }

    fn height(&self) -> u32 {
        self.0.natural_height()
    }

    fn is_ready(&self) -> bool {
        self.0.complete()
    }
}

/// Decodes URLs and data URLs; slices are re-encoded as PNG data URLs
#[derive(Debug, Default)]
pub struct WebImageHost;

fn js_reason(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

impl ImageHost for WebImageHost {
    type Raster = WebImage;

    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<WebImage, TextureError>> {
        let source = source.to_string();
        async move {
            let img = HtmlImageElement::new().map_err(|e| TextureError::decode(&source, js_reason(e)))?;
            img.set_src(&source);
            JsFuture::from(img.decode())
                .await
                .map_err(|e| TextureError::decode(&source, js_reason(e)))?;
            Ok(WebImage(img))
        }
        .boxed_local()
    }

    fn slice(&self, raster: &WebImage, source: &str, region: SliceRegion) -> Result<String, TextureError> {
        let fail = |e: JsValue| TextureError::slice(source, js_reason(e));

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| TextureError::slice(source, "no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas").map_err(fail)?.dyn_into().map_err(|_| {
            TextureError::slice(source, "created element is not a canvas")
        })?;
        canvas.set_width(region.width);
        canvas.set_height(region.height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(fail)?
            .ok_or_else(|| TextureError::slice(source, "no 2d context"))?
            .dyn_into()
            .map_err(|_| TextureError::slice(source, "unexpected context type"))?;

        let (w, h) = (region.width as f64, region.height as f64);
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            raster.element(),
            region.x as f64,
            region.y as f64,
            w,
            h,
            0.0,
            0.0,
            w,
            h,
        )
        .map_err(fail)?;

        canvas.to_data_url().map_err(fail)
    }
}
