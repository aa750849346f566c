/// Time-driven two-axis rotation
use nalgebra::{Point3, Rotation3, Vector3};

/// Rotation angles about the x and y axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Angles after `elapsed` seconds at the given angular speeds.
    ///
    /// Angles are not wrapped and grow for as long as the shape runs.
    pub fn at_time(elapsed: f64, speed_x: f64, speed_y: f64) -> Self {
        Self {
            x: elapsed * speed_x,
            y: elapsed * speed_y,
        }
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for the prism rotation
pub struct Transform;

impl Transform {
    /// Rotation about x by `rotation.x`, then about the new y axis by `rotation.y`.
    pub fn rotation_matrix(rotation: &RotationState) -> Rotation3<f64> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), rotation.x);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), rotation.y);

        // Apply rotations in order: X, Y
        ry * rx
    }

    /// Rotate a point in place
    pub fn rotate(point: &mut Point3<f64>, rotation: &RotationState) {
        *point = Self::rotation_matrix(rotation) * *point;
    }

    /// Copy `source` into `target` and rotate every copied point with `matrix`.
    ///
    /// `target` keeps its allocation across frames.
    pub fn rotate_into(target: &mut Vec<Point3<f64>>, source: &[Point3<f64>], matrix: &Rotation3<f64>) {
        target.clear();
        target.extend(source.iter().map(|p| matrix * p));
    }
}
