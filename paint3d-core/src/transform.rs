/// 4x4 homogeneous transforms in row-vector convention
///
/// A point is treated as the row `[x y z 1]` and multiplied on the left of the
/// matrix, so translation lives in row 3 and `a * b` applies `a` first.
use nalgebra::{RowVector4, UnitQuaternion};

use crate::math::{Mat4, Quat, Vec3};

/// Smallest |w| the perspective divide accepts
pub const W_EPSILON: f32 = 1e-6;

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    pub fn identity() -> Mat4 {
        Mat4::identity()
    }

    /// Perspective projection for a camera looking down -z.
    ///
    /// x and y are scaled by the field of view (x additionally by the aspect
    /// ratio), z maps `-near` to -1 and `-far` to +1, and w receives `-z` so the
    /// divide in [`Transform::apply`] performs the perspective division.
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let scale = (fov_degrees * 0.5).to_radians().tan();
        let depth = far - near;

        let mut m = Mat4::identity();
        m[(0, 0)] = 1.0 / (scale * aspect);
        m[(1, 1)] = 1.0 / scale;
        m[(2, 2)] = -(far + near) / depth;
        m[(3, 2)] = -2.0 * far * near / depth;
        m[(2, 3)] = -1.0;
        m[(3, 3)] = 0.0;
        m
    }

    /// Appends a translation by `offset` to `m`
    pub fn translate(m: &Mat4, offset: &Vec3) -> Mat4 {
        let mut t = Mat4::identity();
        t[(3, 0)] = offset.x;
        t[(3, 1)] = offset.y;
        t[(3, 2)] = offset.z;
        m * t
    }

    /// Appends the rotation described by the unit quaternion `q` to `m`
    pub fn rotate(m: &Mat4, q: &Quat) -> Mat4 {
        let r = UnitQuaternion::new_unchecked(*q).to_homogeneous();
        m * r
    }

    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        a * b
    }

    /// Multiplies the point `v` (implicit w = 1) by `m` and applies the
    /// homogeneous divide.
    ///
    /// The divide is skipped when w is exactly 1. Returns `None` when w is too
    /// close to zero for the divide to mean anything, which happens when the
    /// point lies on the camera plane.
    pub fn apply(m: &Mat4, v: &Vec3) -> Option<Vec3> {
        let row = RowVector4::new(v.x, v.y, v.z, 1.0) * m;
        let w = row[3];
        if w == 1.0 {
            return Some(Vec3::new(row[0], row[1], row[2]));
        }
        if w.abs() < W_EPSILON {
            return None;
        }

        let out = Vec3::new(row[0] / w, row[1] / w, row[2] / w);
        if out.iter().all(|c| c.is_finite()) {
            Some(out)
        } else {
            None
        }
    }

    /// Multiplies `v` by an affine `m` (last column `0 0 0 1`), where w is
    /// always exactly 1 and no divide is needed.
    pub fn apply_affine(m: &Mat4, v: &Vec3) -> Vec3 {
        let row = RowVector4::new(v.x, v.y, v.z, 1.0) * m;
        Vec3::new(row[0], row[1], row[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{identity_quaternion, rotate_quaternion};

    fn close(a: &Vec3, b: &Vec3) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let identity = Transform::identity();
        for v in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.5, -2.0, 3.25),
            Vec3::new(-1e4, 7.0, 0.001),
        ] {
            assert_eq!(Transform::apply(&identity, &v), Some(v));
            assert_eq!(Transform::apply_affine(&identity, &v), v);
        }
    }

    #[test]
    fn test_perspective_maps_near_and_far_planes() {
        let (near, far) = (0.1, 100.0);
        let proj = Transform::perspective(90.0, 4.0 / 3.0, near, far);

        let at_near = Transform::apply(&proj, &Vec3::new(0.0, 0.0, -near)).unwrap();
        let at_far = Transform::apply(&proj, &Vec3::new(0.0, 0.0, -far)).unwrap();
        assert!((at_near.z + 1.0).abs() < 1e-4);
        assert!((at_far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_perspective_scales_by_fov_and_aspect() {
        let proj = Transform::perspective(90.0, 2.0, 0.1, 100.0);
        // tan(45) = 1, so a point at z = -1 keeps y and halves x
        let p = Transform::apply(&proj, &Vec3::new(1.0, 0.5, -1.0)).unwrap();
        assert!((p.x - 0.5).abs() < 1e-5);
        assert!((p.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_projection_on_camera_plane_is_rejected() {
        let proj = Transform::perspective(90.0, 1.0, 0.1, 100.0);
        assert_eq!(Transform::apply(&proj, &Vec3::new(1.0, 1.0, 0.0)), None);
    }

    #[test]
    fn test_translate() {
        let m = Transform::translate(&Transform::identity(), &Vec3::new(1.0, 2.0, 3.0));
        let p = Transform::apply_affine(&m, &Vec3::new(1.0, 1.0, 1.0));
        assert!(close(&p, &Vec3::new(2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let q = rotate_quaternion(&identity_quaternion(), 90.0, &Vec3::z());
        let m = Transform::rotate(&Transform::identity(), &q);
        let p = Transform::apply_affine(&m, &Vec3::new(1.0, 0.0, 0.0));
        // Row vectors multiply by the transpose of the column-vector rotation
        assert!(close(&p, &Vec3::new(0.0, -1.0, 0.0)));
        assert!((p.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_happens_before_translation() {
        let q = rotate_quaternion(&identity_quaternion(), 90.0, &Vec3::z());
        let rotated = Transform::rotate(&Transform::identity(), &q);
        let model = Transform::translate(&rotated, &Vec3::new(10.0, 0.0, 0.0));
        let p = Transform::apply_affine(&model, &Vec3::new(1.0, 0.0, 0.0));
        assert!(close(&p, &Vec3::new(10.0, -1.0, 0.0)));
    }

    #[test]
    fn test_multiply_matches_sequential_application() {
        let a = Transform::translate(&Transform::identity(), &Vec3::new(0.0, -10.0, -35.0));
        let b = Transform::perspective(60.0, 1.0, 0.5, 50.0);
        let v = Vec3::new(0.3, 9.0, 2.0);

        let step = Transform::apply(&b, &Transform::apply_affine(&a, &v)).unwrap();
        let combined = Transform::apply(&Transform::multiply(&a, &b), &v).unwrap();
        assert!(close(&step, &combined));
    }
}
