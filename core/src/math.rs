//! Math type aliases and helper functions.
//!
//! All rig math is `f32` and built on `nalgebra`. Matrices are column-major
//! and act on column vectors, so `parent * local` composes a child under its
//! parent.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_xyzw`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Squared norm below which a quaternion is treated as degenerate.
const QUAT_NORM_EPSILON: f32 = 1e-12;

/// Squared-norm distance from one within which a quaternion counts as unit.
const QUAT_UNIT_EPSILON: f32 = 1e-6;

/// Denominator below which two vectors are considered to have no angle.
const ANGLE_EPSILON: f32 = 1e-15;

// ===== Construction =====

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::new_unchecked(rotation);
    let m = r.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Build a rotation + translation matrix (unit scale).
pub fn mat4_from_rotation_translation(rotation: Quat, translation: Vec3) -> Mat4 {
    mat4_from_scale_rotation_translation(Vec3::new(1.0, 1.0, 1.0), rotation, translation)
}

/// Create a quaternion from x, y, z, w components.
pub fn quat_from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Quat {
    nalgebra::Quaternion::new(w, x, y, z)
}

/// Convert a quaternion to a `[x, y, z, w]` array.
pub fn quat_to_array(q: Quat) -> [f32; 4] {
    [q.coords.x, q.coords.y, q.coords.z, q.coords.w]
}

/// Create a quaternion from rotation around the Z axis.
///
/// Positive angles rotate +X toward +Y, which is the 2D rig convention.
pub fn quat_from_rotation_z(angle: f32) -> Quat {
    nalgebra::UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), angle).into_inner()
}

/// Create a quaternion from a rotation of `angle` radians around `axis`.
///
/// The axis does not need to be normalized. A zero axis yields identity.
pub fn quat_from_axis_angle(axis: Vec3, angle: f32) -> Quat {
    match nalgebra::Unit::try_new(axis, 0.0) {
        Some(axis) => nalgebra::UnitQuaternion::from_axis_angle(&axis, angle).into_inner(),
        None => Quat::identity(),
    }
}

// ===== Quaternion helpers =====

/// Normalize a quaternion, falling back to identity when it is degenerate.
///
/// Quaternions that are already unit come back bit-for-bit unchanged, so
/// normalizing a stored rotation again never drifts it.
pub fn normalize_quat(q: Quat) -> Quat {
    let norm_sq = q.norm_squared();
    if norm_sq < QUAT_NORM_EPSILON {
        Quat::identity()
    } else if (norm_sq - 1.0).abs() <= QUAT_UNIT_EPSILON {
        q
    } else {
        q / norm_sq.sqrt()
    }
}

/// Inverse of a unit quaternion.
pub fn quat_inverse(q: Quat) -> Quat {
    q.conjugate()
}

/// Rotate a vector by a quaternion.
pub fn quat_rotate_vec3(q: Quat, v: Vec3) -> Vec3 {
    nalgebra::UnitQuaternion::new_unchecked(q) * v
}

/// Flip quaternion components so the rotation keeps its handedness under
/// a scale with negative axes.
///
/// Each of `x`, `y`, `z` is negated when the product of the signs of the two
/// *other* scale axes is negative. With all-positive scale this is identity.
pub fn scale_mul_quat(scale: Vec3, q: Quat) -> Quat {
    let sx = sign_of(scale.x);
    let sy = sign_of(scale.y);
    let sz = sign_of(scale.z);
    quat_from_xyzw(
        chgsign(q.coords.x, sy * sz),
        chgsign(q.coords.y, sx * sz),
        chgsign(q.coords.z, sx * sy),
        q.coords.w,
    )
}

fn sign_of(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

fn chgsign(x: f32, y: f32) -> f32 {
    if y < 0.0 { -x } else { x }
}

// ===== Vectors and angles =====

/// Unsigned angle between two vectors in radians. Zero if either is zero.
pub fn angle_between(from: Vec3, to: Vec3) -> f32 {
    let denominator = (from.norm_squared() * to.norm_squared()).sqrt();
    if denominator < ANGLE_EPSILON {
        return 0.0;
    }
    let cos = (from.dot(&to) / denominator).clamp(-1.0, 1.0);
    cos.acos()
}

/// Angle between two vectors, signed by which side of `axis` the turn lies on.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let angle = angle_between(from, to);
    if axis.dot(&from.cross(&to)) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Shortest rotation turning `from` onto the direction of `to`.
///
/// Returns identity when `from` or `to` has zero length. When the vectors
/// are opposite, the half turn is taken around +Z if it is perpendicular to
/// `from`, otherwise around `from x +Y`.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    if from.norm_squared() <= 0.0 || to.norm_squared() <= 0.0 {
        return Quat::identity();
    }
    let axis = from.cross(&to);
    let angle = signed_angle(from, to, axis);
    if axis.norm_squared() > 0.0 {
        return quat_from_axis_angle(axis, angle);
    }
    if from.dot(&to) >= 0.0 {
        return Quat::identity();
    }
    let fallback = if from.z.abs() <= f32::EPSILON * from.norm() {
        Vec3::z()
    } else {
        from.cross(&Vec3::y())
    };
    quat_from_axis_angle(fallback, std::f32::consts::PI)
}

// ===== Matrix application =====

/// Transform a point by an affine matrix (translation applied).
pub fn transform_point3(m: &Mat4, p: Vec3) -> Vec3 {
    m.fixed_view::<3, 3>(0, 0) * p + Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// Transform a direction by an affine matrix (translation ignored).
pub fn transform_vector3(m: &Mat4, v: Vec3) -> Vec3 {
    m.fixed_view::<3, 3>(0, 0) * v
}

/// Inverse of `m`, or identity when `m` is singular (e.g. a zero scale axis).
pub fn inverse_or_identity(m: &Mat4) -> Mat4 {
    m.try_inverse().unwrap_or_else(|| {
        log::warn!("singular transform matrix, substituting identity inverse");
        Mat4::identity()
    })
}

/// Normalize a vector, or return zero when it has no length.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let norm = v.norm();
    if norm > 0.0 { v / norm } else { Vec3::zeros() }
}

// ===== Comparisons =====

/// Relative float comparison with a tiny absolute floor.
pub fn approximately(a: f32, b: f32) -> bool {
    (b - a).abs() < (1e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0)
}

/// Whether every component of `scale` is approximately one.
pub fn is_unit_scale(scale: Vec3) -> bool {
    approximately(scale.x, 1.0) && approximately(scale.y, 1.0) && approximately(scale.z, 1.0)
}

/// Whether two quaternions describe the same rotation within `epsilon`.
///
/// `q` and `-q` are the same rotation, so the absolute dot product is used.
pub fn quat_approx_eq(a: Quat, b: Quat, epsilon: f32) -> bool {
    1.0 - a.dot(&b).abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn vec_close(a: Vec3, b: Vec3) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn identity_trs_matrix() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(1.0, 1.0, 1.0),
            Quat::identity(),
            Vec3::zeros(),
        );
        assert!((m - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 1.0),
            quat_from_rotation_z(FRAC_PI_2),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let p = transform_point3(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!(vec_close(p, Vec3::new(1.0, 2.0, 0.0)));
        let v = transform_vector3(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!(vec_close(v, Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn normalize_degenerate_quat_is_identity() {
        let q = normalize_quat(quat_from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(q, Quat::identity());
        let q = normalize_quat(quat_from_xyzw(0.0, 0.0, 0.0, 2.0));
        assert!((q.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_quat_is_idempotent() {
        let axes = [
            Vec3::z(),
            Vec3::x(),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-0.3, 0.7, 0.2),
        ];
        for axis in axes {
            for step in 0..180 {
                let angle = step as f32 * 0.0371 - PI;
                let once = normalize_quat(quat_from_axis_angle(axis, angle) * 1.7);
                assert_eq!(normalize_quat(once), once);
            }
        }
    }

    #[test]
    fn scale_mul_quat_positive_scale_is_noop() {
        let q = quat_from_xyzw(0.1, 0.2, 0.3, 0.9);
        assert_eq!(scale_mul_quat(Vec3::new(2.0, 3.0, 4.0), q), q);
    }

    #[test]
    fn scale_mul_quat_negative_x_flips_y_and_z() {
        let q = quat_from_xyzw(0.1, 0.2, 0.3, 0.9);
        let flipped = scale_mul_quat(Vec3::new(-1.0, 1.0, 1.0), q);
        assert_eq!(quat_to_array(flipped), [0.1, -0.2, -0.3, 0.9]);
    }

    #[test]
    fn signed_angle_sign_follows_axis() {
        let a = Vec3::x();
        let b = Vec3::y();
        assert!((signed_angle(a, b, Vec3::z()) - FRAC_PI_2).abs() < 1e-6);
        assert!((signed_angle(a, b, -Vec3::z()) + FRAC_PI_2).abs() < 1e-6);
        assert_eq!(signed_angle(Vec3::zeros(), b, Vec3::z()), 0.0);
    }

    #[test]
    fn rotation_between_turns_from_onto_to() {
        let q = rotation_between(Vec3::x(), Vec3::new(1.0, 1.0, 0.0));
        let v = quat_rotate_vec3(q, Vec3::x());
        assert!(vec_close(v, Vec3::new(1.0, 1.0, 0.0).normalize()));
    }

    #[test]
    fn rotation_between_opposite_vectors_uses_z() {
        let q = rotation_between(Vec3::x(), -Vec3::x());
        assert!(quat_approx_eq(q, quat_from_rotation_z(PI), 1e-6));
    }

    #[test]
    fn rotation_between_zero_vector_is_identity() {
        assert_eq!(rotation_between(Vec3::zeros(), Vec3::x()), Quat::identity());
        assert_eq!(rotation_between(Vec3::x(), Vec3::zeros()), Quat::identity());
    }

    #[test]
    fn singular_inverse_falls_back_to_identity() {
        let m = mat4_from_scale_rotation_translation(
            Vec3::new(0.0, 1.0, 1.0),
            Quat::identity(),
            Vec3::zeros(),
        );
        assert_eq!(inverse_or_identity(&m), Mat4::identity());
    }

    #[test]
    fn unit_scale_detection() {
        assert!(is_unit_scale(Vec3::new(1.0, 1.0, 1.0)));
        assert!(is_unit_scale(Vec3::new(1.0 + 1e-7, 1.0, 1.0)));
        assert!(!is_unit_scale(Vec3::new(1.0, 2.0, 1.0)));
        assert!(!is_unit_scale(Vec3::new(-1.0, 1.0, 1.0)));
    }

    #[test]
    fn quat_double_cover_is_equal() {
        let q = quat_from_rotation_z(0.3);
        assert!(quat_approx_eq(q, -q, 1e-6));
        assert!(!quat_approx_eq(q, quat_from_rotation_z(0.6), 1e-6));
    }
}
