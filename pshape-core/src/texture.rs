/// Texture resource manager: asynchronous image loading, the shared texture
/// cache and per-side texture slicing.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::future::{join_all, FutureExt, LocalBoxFuture, Shared};
use log::{debug, warn};

use crate::fill::{normalize_side_fills, FillSpec, ResolvedFace};

/// A decoded raster image handed out by the host
pub trait Raster: Clone + 'static {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Whether the pixels can be drawn yet
    fn is_ready(&self) -> bool {
        true
    }
}

/// Host image primitives: decoding a source and re-encoding a sub-region of
/// a decoded image as a new loadable source.
pub trait ImageHost {
    type Raster: Raster;

    fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<Self::Raster, TextureError>>;

    fn slice(
        &self,
        raster: &Self::Raster,
        source: &str,
        region: SliceRegion,
    ) -> Result<String, TextureError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    Decode { source: String, reason: String },
    Slice { source: String, reason: String },
}

impl TextureError {
    pub fn decode(source: &str, reason: impl fmt::Display) -> Self {
        TextureError::Decode {
            source: source.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn slice(source: &str, reason: impl fmt::Display) -> Self {
        TextureError::Slice {
            source: source.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Decode { source, reason } => {
                write!(f, "failed to decode image '{source}': {reason}")
            }
            TextureError::Slice { source, reason } => {
                write!(f, "failed to slice image '{source}': {reason}")
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// Pixel rectangle inside a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SliceRegion {
    /// Strip `index` of `count` vertical strips covering the whole image.
    ///
    /// Strip edges are rounded down, so widths differ by at most one pixel.
    pub fn vertical_strip(image_width: u32, image_height: u32, index: usize, count: usize) -> Self {
        let count = count.max(1) as u64;
        let edge = |i: u64| (i * image_width as u64 / count) as u32;
        let x = edge(index as u64);
        Self {
            x,
            y: 0,
            width: edge(index as u64 + 1) - x,
            height: image_height,
        }
    }
}

/// A loaded, immutable texture
#[derive(Debug)]
pub struct Texture<R> {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub raster: R,
}

impl<R: Raster> Texture<R> {
    pub fn new(source: impl Into<String>, raster: R) -> Self {
        Self {
            source: source.into(),
            width: raster.width(),
            height: raster.height(),
            raster,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0 && self.raster.is_ready()
    }
}

type SharedLoad<R> = Shared<LocalBoxFuture<'static, Result<Rc<Texture<R>>, TextureError>>>;

/// Loads textures through an [`ImageHost`] and caches them by source.
///
/// One manager is meant to be created at startup and shared by every shape.
/// Entries are never evicted: a source decoded once stays decoded for the
/// life of the process. Concurrent loads of the same source share a single
/// decode. A failed decode is dropped from the cache so a later request can
/// try again.
pub struct TextureManager<H: ImageHost> {
    host: H,
    cache: RefCell<HashMap<String, SharedLoad<H::Raster>>>,
}

impl<H: ImageHost> TextureManager<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Already loaded texture for `source`, if any
    pub fn cached(&self, source: &str) -> Option<Rc<Texture<H::Raster>>> {
        let cache = self.cache.borrow();
        match cache.get(source)?.peek() {
            Some(Ok(texture)) => Some(Rc::clone(texture)),
            _ => None,
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.borrow().len()
    }

    pub async fn load(&self, source: &str) -> Result<Rc<Texture<H::Raster>>, TextureError> {
        let pending = self.pending_load(source);
        let result = pending.clone().await;

        if result.is_err() {
            let mut cache = self.cache.borrow_mut();
            if cache.get(source).is_some_and(|entry| entry.ptr_eq(&pending)) {
                cache.remove(source);
            }
        }

        result
    }

    fn pending_load(&self, source: &str) -> SharedLoad<H::Raster> {
        let mut cache = self.cache.borrow_mut();
        if let Some(pending) = cache.get(source) {
            debug!("texture cache hit: {source}");
            return pending.clone();
        }

        debug!("texture cache miss, decoding: {source}");
        let decode = self.host.decode(source);
        let owned = source.to_string();
        let pending = async move {
            let raster = decode.await?;
            Ok::<_, TextureError>(Rc::new(Texture::new(owned, raster)))
        }
        .boxed_local()
        .shared();

        cache.insert(source.to_string(), pending.clone());
        pending
    }

    /// Resolve one fill. Colors resolve immediately; a failed load settles
    /// as [`ResolvedFace::Failed`].
    pub async fn resolve_face(&self, spec: &FillSpec) -> ResolvedFace<H::Raster> {
        match spec {
            FillSpec::Color(color) => ResolvedFace::Color(color.clone()),
            FillSpec::TextureRef(source) => self.settle(source, self.load(source).await),
        }
    }

    /// Resolve the side fills of a prism with `num_sides` sides.
    ///
    /// A single image with `wrap` enabled is cut into one strip per side.
    /// Otherwise the list is normalized to `num_sides` entries and every
    /// entry resolves on its own. Returns once every load has settled.
    pub async fn resolve_side_fills(
        &self,
        fills: &[String],
        num_sides: usize,
        wrap: bool,
        default_color: &str,
    ) -> Vec<ResolvedFace<H::Raster>> {
        if let [single] = fills {
            if let FillSpec::TextureRef(source) = FillSpec::classify(single, default_color) {
                if wrap {
                    return self.load_sliced(&source, num_sides).await;
                }
            }
        }

        let specs = normalize_side_fills(fills, num_sides, default_color);
        join_all(specs.iter().map(|spec| self.resolve_face(spec))).await
    }

    async fn load_sliced(&self, source: &str, num_sides: usize) -> Vec<ResolvedFace<H::Raster>> {
        let texture = match self.load(source).await {
            Ok(texture) if texture.is_ready() => texture,
            Ok(_) => {
                warn!("side image '{source}' has no pixels, using fallback color");
                return vec![ResolvedFace::Failed; num_sides];
            }
            Err(err) => {
                warn!("{err}, using fallback color for all sides");
                return vec![ResolvedFace::Failed; num_sides];
            }
        };

        debug!(
            "slicing '{source}' ({}x{}) into {num_sides} strips",
            texture.width, texture.height
        );
        let strips: Vec<Result<String, TextureError>> = (0..num_sides)
            .map(|i| {
                let region = SliceRegion::vertical_strip(texture.width, texture.height, i, num_sides);
                if region.width == 0 {
                    return Err(TextureError::slice(source, format!("strip {i} is empty")));
                }
                self.host.slice(&texture.raster, source, region)
            })
            .collect();

        join_all(strips.iter().map(|strip| async move {
            match strip {
                Ok(strip_source) => self.settle(strip_source, self.load(strip_source).await),
                Err(err) => {
                    warn!("{err}, using fallback color");
                    ResolvedFace::Failed
                }
            }
        }))
        .await
    }

    fn settle(
        &self,
        source: &str,
        result: Result<Rc<Texture<H::Raster>>, TextureError>,
    ) -> ResolvedFace<H::Raster> {
        match result {
            Ok(texture) => {
                debug!("texture ready: {source}");
                ResolvedFace::Ready(texture)
            }
            Err(err) => {
                warn!("{err}, using fallback color");
                ResolvedFace::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Pixels(u32, u32);

    impl Raster for Pixels {
        fn width(&self) -> u32 {
            self.0
        }
        fn height(&self) -> u32 {
            self.1
        }
    }

    #[derive(Default)]
    struct CountingHost {
        decodes: Cell<usize>,
    }

    impl ImageHost for CountingHost {
        type Raster = Pixels;

        fn decode(&self, source: &str) -> LocalBoxFuture<'static, Result<Pixels, TextureError>> {
            self.decodes.set(self.decodes.get() + 1);
            let result = if source.starts_with("missing") {
                Err(TextureError::decode(source, "not found"))
            } else {
                Ok(Pixels(140, 20))
            };
            futures::future::ready(result).boxed_local()
        }

        fn slice(&self, _raster: &Pixels, source: &str, region: SliceRegion) -> Result<String, TextureError> {
            Ok(format!("{source}#{}-{}.png", region.x, region.width))
        }
    }

    #[test]
    fn test_vertical_strips_cover_image() {
        let strips: Vec<_> = (0..3).map(|i| SliceRegion::vertical_strip(100, 10, i, 3)).collect();
        assert_eq!(strips[0], SliceRegion { x: 0, y: 0, width: 33, height: 10 });
        assert_eq!(strips[1].x, 33);
        assert_eq!(strips[2].x + strips[2].width, 100);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let manager = TextureManager::new(CountingHost::default());
        assert!(block_on(manager.load("missing.png")).is_err());
        assert_eq!(manager.cached_count(), 0);
        assert!(block_on(manager.load("missing.png")).is_err());
        assert_eq!(manager.host().decodes.get(), 2);
    }

    #[test]
    fn test_cached_lookup() {
        let manager = TextureManager::new(CountingHost::default());
        assert!(manager.cached("a.png").is_none());
        let loaded = block_on(manager.load("a.png")).unwrap();
        let cached = manager.cached("a.png").unwrap();
        assert!(Rc::ptr_eq(&loaded, &cached));
        assert_eq!((cached.width, cached.height), (140, 20));
    }

    #[test]
    fn test_wrap_slices_single_image() {
        let manager = TextureManager::new(CountingHost::default());
        let sides = block_on(manager.resolve_side_fills(&["band.png".into()], 7, true, "green"));
        assert_eq!(sides.len(), 7);
        let sources: Vec<&str> = sides
            .iter()
            .map(|face| face.texture().unwrap().source.as_str())
            .collect();
        assert_eq!(sources[0], "band.png#0-20.png");
        assert_eq!(sources[6], "band.png#120-20.png");
        // the full image plus one decode per strip
        assert_eq!(manager.host().decodes.get(), 8);
    }

    #[test]
    fn test_wrap_disabled_repeats_image() {
        let manager = TextureManager::new(CountingHost::default());
        let sides = block_on(manager.resolve_side_fills(&["band.png".into()], 4, false, "green"));
        assert_eq!(sides.len(), 4);
        let first = sides[0].texture().unwrap();
        assert!(sides.iter().all(|face| Rc::ptr_eq(face.texture().unwrap(), first)));
        assert_eq!(manager.host().decodes.get(), 1);
    }

    #[test]
    fn test_wrap_of_missing_image_fails_every_side() {
        let manager = TextureManager::new(CountingHost::default());
        let sides = block_on(manager.resolve_side_fills(&["missing.png".into()], 3, true, "green"));
        assert!(sides.iter().all(|face| matches!(face, ResolvedFace::Failed)));
    }
}
