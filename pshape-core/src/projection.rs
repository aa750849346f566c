/// Orthographic projection onto the drawing surface
use nalgebra::Point3;

/// Screen mapping derived from the surface's pixel size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub aspect_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        let aspect_ratio = if height > 0.0 { width / height } else { 1.0 };
        Self {
            center_x: width / 2.0,
            center_y: height / 2.0,
            aspect_ratio,
        }
    }

    /// Project a rotated point to screen space in place.
    ///
    /// No perspective divide: x is stretched by the aspect ratio and both axes
    /// are offset to the surface center. z is left as is.
    pub fn project(&self, point: &mut Point3<f64>) {
        point.x = point.x * self.aspect_ratio + self.center_x;
        point.y += self.center_y;
    }

    pub fn project_all(&self, points: &mut [Point3<f64>]) {
        for point in points {
            self.project(point);
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.center_x, 400.0);
        assert_eq!(viewport.center_y, 300.0);
        assert!((viewport.aspect_ratio - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_is_affine() {
        let viewport = Viewport::new(1000.0, 500.0);
        let mut p = Point3::new(10.0, -4.0, 99.0);
        viewport.project(&mut p);
        assert_eq!(p.x - viewport.center_x, 10.0 * 2.0);
        assert_eq!(p.y - viewport.center_y, -4.0);
        assert_eq!(p.z, 99.0);
    }

    #[test]
    fn test_zero_height_surface() {
        let viewport = Viewport::new(0.0, 0.0);
        assert_eq!(viewport.aspect_ratio, 1.0);
    }
}
