/// Vector and quaternion helpers shared by every pipeline stage
use nalgebra::{Matrix4, Quaternion, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Quat = Quaternion<f32>;
pub type Mat4 = Matrix4<f32>;

/// Returns `v` scaled to unit length.
///
/// A zero-length (or non-finite) vector has no direction, so the zero vector is
/// returned instead of dividing by zero. Every caller in the crate relies on
/// this: a degenerate face gets a zero normal, and a zero angular rate gets a
/// zero rotation axis.
pub fn normalise(v: &Vec3) -> Vec3 {
    let magnitude = v.norm();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return Vec3::zeros();
    }
    v / magnitude
}

/// Arithmetic mean of three points
pub fn centroid(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    (a + b + c) / 3.0
}

/// The orientation with no rotation applied
pub fn identity_quaternion() -> Quat {
    Quat::new(1.0, 0.0, 0.0, 0.0)
}

/// Composes an incremental rotation of `degrees` around `axis` onto `q`.
///
/// The increment is right-multiplied (`q * r`), so it is expressed in the
/// frame `q` already describes. `axis` is expected to be unit length or zero.
pub fn rotate_quaternion(q: &Quat, degrees: f32, axis: &Vec3) -> Quat {
    let theta = degrees.to_radians() / 2.0;
    let factor = theta.sin();
    let rotation = Quat::new(theta.cos(), axis.x * factor, axis.y * factor, axis.z * factor);
    q * rotation
}

/// Rescales `q` to unit length, leaving a zero quaternion as the identity.
pub fn renormalise(q: &Quat) -> Quat {
    let magnitude = q.norm();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return identity_quaternion();
    }
    q / magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quat_close(a: &Quat, b: &Quat, tol: f32) -> bool {
        (a.w - b.w).abs() < tol
            && (a.i - b.i).abs() < tol
            && (a.j - b.j).abs() < tol
            && (a.k - b.k).abs() < tol
    }

    #[test]
    fn test_normalise_unit_length() {
        let n = normalise(&Vec3::new(3.0, 0.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.z - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalise_zero_vector_returns_zero() {
        let n = normalise(&Vec3::zeros());
        assert_eq!(n, Vec3::zeros());
    }

    #[test]
    fn test_centroid() {
        let c = centroid(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(3.0, 0.0, 0.0),
            &Vec3::new(0.0, 3.0, 3.0),
        );
        assert!((c - Vec3::new(1.0, 1.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_zero_degree_rotation_is_identity() {
        let q = rotate_quaternion(&identity_quaternion(), 30.0, &Vec3::new(0.0, 1.0, 0.0));
        for axis in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::zeros()] {
            let r = rotate_quaternion(&q, 0.0, &axis);
            assert!(quat_close(&q, &r, 1e-7));
        }
    }

    #[test]
    fn test_rotation_order_is_right_multiplied() {
        let x90 = rotate_quaternion(&identity_quaternion(), 90.0, &Vec3::x());
        let then_y = rotate_quaternion(&x90, 90.0, &Vec3::y());

        let y90 = rotate_quaternion(&identity_quaternion(), 90.0, &Vec3::y());
        assert!(quat_close(&then_y, &(x90 * y90), 1e-6));
        assert!(!quat_close(&then_y, &(y90 * x90), 1e-3));
    }

    #[test]
    fn test_four_quarter_turns_return_to_start() {
        let mut q = identity_quaternion();
        for _ in 0..4 {
            q = rotate_quaternion(&q, 90.0, &Vec3::z());
        }
        // A full turn is -1 in quaternion space, the same orientation
        assert!((q.w.abs() - 1.0).abs() < 1e-5);
        assert!((q.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_renormalise() {
        let q = renormalise(&Quat::new(2.0, 0.0, 0.0, 0.0));
        assert!(quat_close(&q, &identity_quaternion(), 1e-7));
        assert!(quat_close(
            &renormalise(&Quat::new(0.0, 0.0, 0.0, 0.0)),
            &identity_quaternion(),
            1e-7
        ));
    }
}
