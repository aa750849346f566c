/// pShape Core Library - animated extruded-polygon rendering
///
/// This library provides the host-independent pipeline: polygon model, two-axis
/// rotation, orthographic projection, back-face culling, affine texture mapping
/// and the asynchronous texture manager. Hosts supply the drawing surface, the
/// image primitives and the frame scheduling.

pub mod config;
pub mod culling;
pub mod fill;
pub mod geometry;
pub mod projection;
pub mod raster;
pub mod render_loop;
pub mod shape;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use config::{ConfigError, FallbackColors, ShapeConfig};
pub use culling::CapVisibility;
pub use fill::{FillSpec, ResolvedFace};
pub use geometry::PolygonModel;
pub use projection::Viewport;
pub use raster::{FaceRasterizer, Surface};
pub use render_loop::{Clock, LoopHandle, RenderLoop};
pub use shape::{FrameStats, Shape};
pub use texture::{ImageHost, Raster, SliceRegion, Texture, TextureError, TextureManager};
pub use transform::{RotationState, Transform};
