/// Polygon model: base polygon and the two cap vertex sets of the prism
use nalgebra::Point3;

/// Fewest sides a prism may have
pub const MIN_SIDES: usize = 2;
/// Most sides a prism may have
pub const MAX_SIDES: usize = 100;

/// Clamp a requested side count into `[MIN_SIDES, MAX_SIDES]` and round it.
///
/// Out-of-range requests are never rejected: `-5 -> 2`, `3.6 -> 4`, `500 -> 100`.
pub fn clamp_sides(requested: f64) -> usize {
    if requested.is_nan() {
        return MIN_SIDES;
    }
    requested.clamp(MIN_SIDES as f64, MAX_SIDES as f64).round() as usize
}

/// Generate the flat base polygon in the z = 0 plane.
///
/// Vertex `i` sits at angle `i / num_sides * 2π`. Four sides produce an
/// upright rectangle instead of a diamond.
pub fn generate_polygon_points(num_sides: usize, rx: f64, ry: f64) -> Vec<Point3<f64>> {
    if num_sides == 4 {
        return rectangle_corners(rx, ry, 0.0).to_vec();
    }

    (0..num_sides)
        .map(|i| {
            let theta = (i as f64 / num_sides as f64) * std::f64::consts::TAU;
            Point3::new(rx * theta.cos(), ry * theta.sin(), 0.0)
        })
        .collect()
}

/// Axis-aligned rectangle corners at height `z`, ordered (-,-), (+,-), (+,+), (-,+)
pub fn rectangle_corners(rx: f64, ry: f64, z: f64) -> [Point3<f64>; 4] {
    [
        Point3::new(-rx, -ry, z),
        Point3::new(rx, -ry, z),
        Point3::new(rx, ry, z),
        Point3::new(-rx, ry, z),
    ]
}

/// Static model-space geometry of one prism.
///
/// Built once at construction; the per-frame pipeline copies the cap points
/// into its own buffers before rotating them.
#[derive(Debug, Clone)]
pub struct PolygonModel {
    rx: f64,
    ry: f64,
    half_thickness: f64,
    base: Vec<Point3<f64>>,
    top: Vec<Point3<f64>>,
    bottom: Vec<Point3<f64>>,
}

impl PolygonModel {
    pub fn new(num_sides: usize, rx: f64, ry: f64, thickness: f64) -> Self {
        let half_thickness = thickness / 2.0;
        let base = generate_polygon_points(num_sides, rx, ry);
        let top = base
            .iter()
            .map(|p| Point3::new(p.x, p.y, half_thickness))
            .collect();
        let bottom = base
            .iter()
            .map(|p| Point3::new(p.x, p.y, -half_thickness))
            .collect();

        Self {
            rx,
            ry,
            half_thickness,
            base,
            top,
            bottom,
        }
    }

    pub fn num_sides(&self) -> usize {
        self.base.len()
    }

    pub fn half_thickness(&self) -> f64 {
        self.half_thickness
    }

    pub fn base(&self) -> &[Point3<f64>] {
        &self.base
    }

    /// Top cap vertices, z = +half_thickness
    pub fn top(&self) -> &[Point3<f64>] {
        &self.top
    }

    /// Bottom cap vertices, z = -half_thickness
    pub fn bottom(&self) -> &[Point3<f64>] {
        &self.bottom
    }

    /// Reference square a cap texture is stretched over, at the cap's z offset
    pub fn cap_square(&self, z_offset: f64) -> [Point3<f64>; 4] {
        rectangle_corners(self.rx, self.ry, z_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_sides() {
        assert_eq!(clamp_sides(-5.0), 2);
        assert_eq!(clamp_sides(3.6), 4);
        assert_eq!(clamp_sides(500.0), 100);
        assert_eq!(clamp_sides(14.0), 14);
        assert_eq!(clamp_sides(f64::NAN), MIN_SIDES);
    }

    #[test]
    fn test_four_sides_is_rectangle() {
        let points = generate_polygon_points(4, 3.0, 2.0);
        let expected = [(-3.0, -2.0), (3.0, -2.0), (3.0, 2.0), (-3.0, 2.0)];
        assert_eq!(points.len(), 4);
        for (p, (x, y)) in points.iter().zip(expected) {
            assert_eq!((p.x, p.y, p.z), (x, y, 0.0));
        }

        // radius configuration uses the same corner order
        let square = generate_polygon_points(4, 5.0, 5.0);
        assert_eq!((square[0].x, square[0].y), (-5.0, -5.0));
        assert_eq!((square[2].x, square[2].y), (5.0, 5.0));
    }

    #[test]
    fn test_trigonometric_placement() {
        let points = generate_polygon_points(6, 10.0, 4.0);
        assert_eq!(points.len(), 6);
        assert!((points[0].x - 10.0).abs() < 1e-9);
        assert!(points[0].y.abs() < 1e-9);

        let theta = std::f64::consts::TAU / 6.0;
        assert!((points[1].x - 10.0 * theta.cos()).abs() < 1e-9);
        assert!((points[1].y - 4.0 * theta.sin()).abs() < 1e-9);
        assert!(points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_caps_offset_by_half_thickness() {
        let model = PolygonModel::new(5, 1.0, 1.0, 6.0);
        assert_eq!(model.num_sides(), 5);
        assert!(model.top().iter().all(|p| p.z == 3.0));
        assert!(model.bottom().iter().all(|p| p.z == -3.0));
        for ((b, t), base) in model.bottom().iter().zip(model.top()).zip(model.base()) {
            assert_eq!((b.x, b.y), (base.x, base.y));
            assert_eq!((t.x, t.y), (base.x, base.y));
        }
    }
}
