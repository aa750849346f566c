/// File-system image host backed by the `image` crate
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};
use image::{imageops, DynamicImage, ImageOutputFormat, RgbaImage};
use log::debug;
use pshape_core::{ImageHost, Raster, SliceRegion, TextureError};

/// Prefix of sources produced by slicing
const GENERATED_PREFIX: &str = "generated:";

/// Decoded RGBA pixels, cheap to clone
#[derive(Debug, Clone)]
pub struct TerminalImage(Rc<RgbaImage>);

impl TerminalImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Rc::new(pixels))
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }
}

impl Raster for TerminalImage {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }
}

/// Decodes image files relative to a base directory.
///
/// Sliced regions are re-encoded as PNG and kept in memory under a
/// `generated:` source so they load through the same path as files.
pub struct FileImageHost {
    base_dir: PathBuf,
    generated: RefCell<HashMap<String, Vec<u8>>>,
    next_id: Cell<usize>,
}

impl FileImageHost {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            generated: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    fn decode_now(&self, source: &str) -> Result<TerminalImage, TextureError> {
        let decoded = if source.starts_with(GENERATED_PREFIX) {
            let generated = self.generated.borrow();
            let bytes = generated
                .get(source)
                .ok_or_else(|| TextureError::decode(source, "unknown generated image"))?;
            image::load_from_memory(bytes)
        } else {
            let path = self.base_dir.join(source);
            debug!("decoding {}", path.display());
            image::open(&path)
        };

        decoded
            .map(|image| TerminalImage::new(image.to_rgba8()))
            .map_err(|err| TextureError::decode(source, err))
    }
}

impl ImageHost for FileImageHost {
    type Raster = TerminalImage;

    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<TerminalImage, TextureError>> {
        future::ready(self.decode_now(source)).boxed_local()
    }

    fn slice(
        &self,
        raster: &TerminalImage,
        source: &str,
        region: SliceRegion,
    ) -> Result<String, TextureError> {
        let strip = imageops::crop_imm(raster.pixels(), region.x, region.y, region.width, region.height).to_image();

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(strip)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .map_err(|err| TextureError::slice(source, err))?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let name = format!("{GENERATED_PREFIX}{id}.png");
        self.generated.borrow_mut().insert(name.clone(), bytes);
        Ok(name)
    }
}
