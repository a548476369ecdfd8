//! Small vector helpers on top of `glam`.

use glam::{Mat3, Quat, Vec3};

/// Interaction weights at or below this value count as "no influence".
pub const WEIGHT_EPSILON: f32 = 0.001;

/// Directions shorter than this are treated as zero-length.
const DIRECTION_EPSILON: f32 = 1e-6;

/// Limits the length of `v` to `max`. A non-positive `max` yields zero.
#[inline]
pub fn clamp_magnitude(v: Vec3, max: f32) -> Vec3 {
    if max <= 0.0 || !v.is_finite() {
        return Vec3::ZERO;
    }
    v.clamp_length_max(max)
}

/// Rotation whose local +Z axis points along `forward`, keeping +Y as up
/// where possible. Returns `None` for a zero-length or non-finite direction.
pub fn look_rotation(forward: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let right = Vec3::Y.cross(forward);
    if right.length_squared() < DIRECTION_EPSILON {
        // Looking straight up or down; any roll is as good as another.
        return Some(Quat::from_rotation_arc(Vec3::Z, forward));
    }
    let right = right.normalize();
    let up = forward.cross(right);

    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize())
}
