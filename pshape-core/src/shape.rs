/// The animated prism: static model, resolved fills and the per-frame pipeline
use log::info;
use nalgebra::{Point3, Rotation3, Vector3};

use crate::config::{FallbackColors, ShapeConfig};
use crate::culling::{self, CapVisibility};
use crate::fill::{FillSpec, ResolvedFace};
use crate::geometry::PolygonModel;
use crate::projection::Viewport;
use crate::raster::{FaceRasterizer, Surface};
use crate::texture::{ImageHost, Raster, TextureManager};
use crate::transform::{RotationState, Transform};

/// Screen-space cap points for the frame being drawn.
///
/// Overwritten every frame; the allocations are kept.
#[derive(Debug, Default)]
struct FrameBuffers {
    top: Vec<Point3<f64>>,
    bottom: Vec<Point3<f64>>,
}

/// What one frame drew
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub sides_drawn: usize,
    pub cap: CapVisibility,
}

pub struct Shape<R> {
    model: PolygonModel,
    viewport: Viewport,
    camera_direction: Vector3<f64>,
    speed_x: f64,
    speed_y: f64,
    wrap_side_image: bool,
    image_smoothing: bool,
    smoothing_quality: String,
    fallback: FallbackColors,
    top_spec: FillSpec,
    bottom_spec: FillSpec,
    side_fills: Vec<String>,
    top: ResolvedFace<R>,
    bottom: ResolvedFace<R>,
    sides: Vec<ResolvedFace<R>>,
    frame: FrameBuffers,
}

impl<R: Raster> Shape<R> {
    /// Build the model and classify the fills. Textured faces stay
    /// [`ResolvedFace::Pending`] until [`Shape::resolve`] runs.
    pub fn new(config: &ShapeConfig, viewport: Viewport) -> Self {
        let num_sides = config.sides();
        let (rx, ry) = config.half_extents();
        let model = PolygonModel::new(num_sides, rx, ry, config.thickness);

        let top_spec = FillSpec::classify(&config.top_fill, &config.fallback.top);
        let bottom_spec = FillSpec::classify(&config.bottom_fill, &config.fallback.bottom);
        let sides = (0..num_sides).map(|_| ResolvedFace::Pending).collect();

        Self {
            top: ResolvedFace::from(&top_spec),
            bottom: ResolvedFace::from(&bottom_spec),
            sides,
            model,
            viewport,
            camera_direction: config.camera(),
            speed_x: config.speed_x,
            speed_y: config.speed_y,
            wrap_side_image: config.wrap_side_image,
            image_smoothing: config.image_smoothing,
            smoothing_quality: config.smoothing_quality.clone(),
            fallback: config.fallback.clone(),
            top_spec,
            bottom_spec,
            side_fills: config.side_fills.clone(),
            frame: FrameBuffers {
                top: Vec::with_capacity(num_sides),
                bottom: Vec::with_capacity(num_sides),
            },
        }
    }

    /// Build a shape and wait until every one of its texture loads has settled
    pub async fn load<H>(config: &ShapeConfig, viewport: Viewport, textures: &TextureManager<H>) -> Self
    where
        H: ImageHost<Raster = R>,
    {
        let mut shape = Self::new(config, viewport);
        shape.resolve(textures).await;
        shape
    }

    /// Resolve top, bottom and side fills together
    pub async fn resolve<H>(&mut self, textures: &TextureManager<H>)
    where
        H: ImageHost<Raster = R>,
    {
        let num_sides = self.model.num_sides();
        let (top, bottom, sides) = futures::join!(
            textures.resolve_face(&self.top_spec),
            textures.resolve_face(&self.bottom_spec),
            textures.resolve_side_fills(
                &self.side_fills,
                num_sides,
                self.wrap_side_image,
                &self.fallback.side
            ),
        );

        self.top = top;
        self.bottom = bottom;
        self.sides = sides;

        let textured = self.sides.iter().filter(|f| f.texture().is_some()).count();
        info!(
            "shape ready: {num_sides} sides ({textured} textured), top {}, bottom {}",
            describe(&self.top),
            describe(&self.bottom)
        );
    }

    pub fn is_settled(&self) -> bool {
        self.top.is_settled() && self.bottom.is_settled() && self.sides.iter().all(|f| f.is_settled())
    }

    pub fn model(&self) -> &PolygonModel {
        &self.model
    }

    pub fn top_face(&self) -> &ResolvedFace<R> {
        &self.top
    }

    pub fn bottom_face(&self) -> &ResolvedFace<R> {
        &self.bottom
    }

    pub fn side_faces(&self) -> &[ResolvedFace<R>] {
        &self.sides
    }

    pub fn configure_surface<S: Surface<Image = R>>(&self, surface: &mut S) {
        surface.set_image_smoothing(self.image_smoothing, &self.smoothing_quality);
    }

    /// Draw the frame `elapsed` seconds after the shape started.
    ///
    /// Visible side faces go first, then the one cap facing the camera.
    pub fn render_frame<S: Surface<Image = R>>(&mut self, surface: &mut S, elapsed: f64) -> FrameStats {
        surface.clear();

        let rotation = RotationState::at_time(elapsed, self.speed_x, self.speed_y);
        let matrix = Transform::rotation_matrix(&rotation);

        Transform::rotate_into(&mut self.frame.top, self.model.top(), &matrix);
        Transform::rotate_into(&mut self.frame.bottom, self.model.bottom(), &matrix);
        self.viewport.project_all(&mut self.frame.top);
        self.viewport.project_all(&mut self.frame.bottom);

        let top = &self.frame.top;
        let bottom = &self.frame.bottom;
        let num_sides = top.len();
        let mut raster = FaceRasterizer::new(surface);
        let mut sides_drawn = 0;

        for i in 0..num_sides {
            let j = (i + 1) % num_sides;
            if culling::is_side_visible(&top[i], &top[j], &bottom[i], &self.camera_direction) {
                raster.draw_side_face(
                    &top[i],
                    &top[j],
                    &bottom[i],
                    &bottom[j],
                    &self.sides[i],
                    &self.fallback.side,
                );
                sides_drawn += 1;
            }
        }

        let cap = culling::cap_visibility(&rotation);
        let half_thickness = self.model.half_thickness();
        match cap {
            CapVisibility::Top => {
                let square = self.projected_square(&matrix, half_thickness);
                raster.draw_cap(top, &square, &self.top, &self.fallback.top);
            }
            CapVisibility::Bottom => {
                let square = self.projected_square(&matrix, -half_thickness);
                raster.draw_cap(bottom, &square, &self.bottom, &self.fallback.bottom);
            }
            CapVisibility::Neither => {}
        }

        FrameStats { sides_drawn, cap }
    }

    fn projected_square(&self, matrix: &Rotation3<f64>, z_offset: f64) -> [Point3<f64>; 4] {
        let mut square = self.model.cap_square(z_offset);
        for p in &mut square {
            *p = matrix * *p;
            self.viewport.project(p);
        }
        square
    }
}

fn describe<R>(face: &ResolvedFace<R>) -> String {
    match face {
        ResolvedFace::Color(color) => format!("color '{color}'"),
        ResolvedFace::Pending => "pending".to_string(),
        ResolvedFace::Ready(texture) => format!("texture '{}'", texture.source),
        ResolvedFace::Failed => "fallback".to_string(),
    }
}
