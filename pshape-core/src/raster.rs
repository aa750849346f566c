/// Face rasterization onto a host drawing surface
use nalgebra::{Affine2, Matrix3, Point3};

use crate::fill::ResolvedFace;
use crate::texture::{Raster, Texture};

/// Host drawing surface with canvas-style path, clip and image primitives
pub trait Surface {
    type Image: Raster;

    /// Pixel size (width, height)
    fn size(&self) -> (f64, f64);

    fn clear(&mut self);

    /// Push the current clip and transform
    fn save(&mut self);
    /// Pop back to the last saved clip and transform
    fn restore(&mut self);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);

    /// Intersect the clip region with the current path
    fn clip(&mut self);

    /// Whether `color` is a color string this surface can fill with
    fn supports_color(&self, _color: &str) -> bool {
        true
    }

    /// Fill the current path with a solid color
    fn fill(&mut self, color: &str);

    /// Draw the whole image with its pixel (0,0) at the origin of `transform`
    fn draw_image(&mut self, image: &Self::Image, transform: &Affine2<f64>);

    fn set_image_smoothing(&mut self, _enabled: bool, _quality: &str) {}
}

/// Affine map taking image pixel space onto a projected parallelogram.
///
/// Pixel `(0,0)` lands on `origin`, `(width,0)` on `u_end` and
/// `(0,height)` on `v_end`.
pub fn texture_transform(
    origin: &Point3<f64>,
    u_end: &Point3<f64>,
    v_end: &Point3<f64>,
    width: u32,
    height: u32,
) -> Affine2<f64> {
    let width = width as f64;
    let height = height as f64;
    Affine2::from_matrix_unchecked(Matrix3::new(
        (u_end.x - origin.x) / width,
        (v_end.x - origin.x) / height,
        origin.x,
        (u_end.y - origin.y) / width,
        (v_end.y - origin.y) / height,
        origin.y,
        0.0,
        0.0,
        1.0,
    ))
}

/// Draws caps and side faces. Faces whose texture is pending, failed or not
/// ready, or whose color the surface cannot parse, are filled with the
/// fallback color instead.
pub struct FaceRasterizer<'s, S: Surface> {
    surface: &'s mut S,
}

impl<'s, S: Surface> FaceRasterizer<'s, S> {
    pub fn new(surface: &'s mut S) -> Self {
        Self { surface }
    }

    /// Draw a cap polygon. `square` is the cap's reference square, already
    /// rotated and projected with this frame's angles.
    pub fn draw_cap(
        &mut self,
        points: &[Point3<f64>],
        square: &[Point3<f64>; 4],
        face: &ResolvedFace<S::Image>,
        fallback: &str,
    ) {
        if points.is_empty() {
            return;
        }

        match ready_texture(face) {
            Some(texture) => {
                self.surface.save();
                self.polygon_path(points);
                self.surface.clip();
                self.surface.fill(fallback);
                let transform =
                    texture_transform(&square[0], &square[1], &square[3], texture.width, texture.height);
                self.surface.draw_image(&texture.raster, &transform);
                self.surface.restore();
            }
            None => {
                self.polygon_path(points);
                let color = self.fill_color(face, fallback);
                self.surface.fill(color);
            }
        }
    }

    /// Draw the side quad top1 -> top2 -> bottom2 -> bottom1
    pub fn draw_side_face(
        &mut self,
        top1: &Point3<f64>,
        top2: &Point3<f64>,
        bottom1: &Point3<f64>,
        bottom2: &Point3<f64>,
        face: &ResolvedFace<S::Image>,
        fallback: &str,
    ) {
        let quad = [*top1, *top2, *bottom2, *bottom1];

        match ready_texture(face) {
            Some(texture) => {
                self.surface.save();
                self.polygon_path(&quad);
                self.surface.clip();
                let transform = texture_transform(top1, top2, bottom1, texture.width, texture.height);
                self.surface.draw_image(&texture.raster, &transform);
                self.surface.restore();
            }
            None => {
                self.polygon_path(&quad);
                let color = self.fill_color(face, fallback);
                self.surface.fill(color);
            }
        }
    }

    fn polygon_path(&mut self, points: &[Point3<f64>]) {
        self.surface.begin_path();
        self.surface.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            self.surface.line_to(p.x, p.y);
        }
        self.surface.close_path();
    }

    fn fill_color<'a>(&self, face: &'a ResolvedFace<S::Image>, fallback: &'a str) -> &'a str {
        match face {
            ResolvedFace::Color(color) if self.surface.supports_color(color) => color.as_str(),
            _ => fallback,
        }
    }
}

fn ready_texture<R: Raster>(face: &ResolvedFace<R>) -> Option<&Texture<R>> {
    face.texture().map(|t| t.as_ref()).filter(|t| t.is_ready())
}
