/// Back-face culling for side faces and caps
use nalgebra::{Point3, Vector3};

use crate::transform::RotationState;

/// Which cap, if any, faces the camera this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapVisibility {
    Top,
    Bottom,
    Neither,
}

/// Unit normal of the side quad spanned by `top1 -> top2` and `top1 -> bottom1`.
///
/// Returns `None` for a degenerate quad.
pub fn side_face_normal(
    top1: &Point3<f64>,
    top2: &Point3<f64>,
    bottom1: &Point3<f64>,
) -> Option<Vector3<f64>> {
    let u = top2 - top1;
    let v = bottom1 - top1;
    u.cross(&v).try_normalize(0.0)
}

/// A side face is visible iff its normal has a strictly positive dot product
/// with the camera direction.
pub fn is_side_visible(
    top1: &Point3<f64>,
    top2: &Point3<f64>,
    bottom1: &Point3<f64>,
    camera_direction: &Vector3<f64>,
) -> bool {
    match side_face_normal(top1, top2, bottom1) {
        Some(normal) => normal.dot(camera_direction) > 0.0,
        None => false,
    }
}

/// Cap visibility from the sign of `cos(angle_x) * cos(angle_y)`.
///
/// This is a proxy for the cap normal, not the normal itself.
pub fn cap_visibility(rotation: &RotationState) -> CapVisibility {
    let normal_z = rotation.x.cos() * rotation.y.cos();
    if normal_z > 0.0 {
        CapVisibility::Top
    } else if normal_z < 0.0 {
        CapVisibility::Bottom
    } else {
        CapVisibility::Neither
    }
}
