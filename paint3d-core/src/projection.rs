/// Camera and projection utilities
use crate::math::{Mat4, Vec3};
use crate::surface::ScreenPoint;
use crate::transform::Transform;

/// A camera at a fixed position looking down the world -z axis
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 35.0),
            fov: 90.0,
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Mat4 {
        Transform::translate(&Transform::identity(), &-self.position)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Transform::perspective(self.fov, self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Whether a projected point falls strictly inside the visible x/y range
pub fn in_view(ndc: &Vec3) -> bool {
    ndc.x > -1.0 && ndc.x < 1.0 && ndc.y > -1.0 && ndc.y < 1.0
}

/// Maps normalised device coordinates to screen space, flipping y so +1 is
/// the top row
pub fn ndc_to_screen(ndc: &Vec3, width: usize, height: usize) -> (f32, f32) {
    let x = (ndc.x + 1.0) * 0.5 * width as f32;
    let y = (1.0 - (ndc.y + 1.0) * 0.5) * height as f32;
    (x, y)
}

/// Inverse of [`ndc_to_screen`] for the x and y components
pub fn screen_to_ndc(x: f32, y: f32, width: usize, height: usize) -> (f32, f32) {
    let ndc_x = x / width as f32 * 2.0 - 1.0;
    let ndc_y = (1.0 - y / height as f32) * 2.0 - 1.0;
    (ndc_x, ndc_y)
}

/// Pixel containing the projected point. Coordinates saturate instead of
/// wrapping when the point is far outside the surface.
pub fn ndc_to_pixel(ndc: &Vec3, width: usize, height: usize) -> ScreenPoint {
    let (x, y) = ndc_to_screen(ndc, width, height);
    ScreenPoint::new(x.floor() as i32, y.floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.position, Vec3::new(0.0, 10.0, 35.0));
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let camera = Camera::default();
        let p = Transform::apply_affine(&camera.view_matrix(), &camera.position);
        assert!(p.norm() < 1e-6);

        // The world origin ends up in front of the camera
        let origin = Transform::apply_affine(&camera.view_matrix(), &Vec3::zeros());
        assert!(origin.z < 0.0);
    }

    #[test]
    fn test_screen_mapping_round_trip() {
        let (width, height) = (320, 240);
        let steps = 20;
        for i in 1..steps {
            for j in 1..steps {
                let ndc = Vec3::new(
                    -1.0 + 2.0 * i as f32 / steps as f32,
                    -1.0 + 2.0 * j as f32 / steps as f32,
                    0.0,
                );
                let (sx, sy) = ndc_to_screen(&ndc, width, height);
                assert!(sx >= 0.0 && sx < width as f32);
                assert!(sy >= 0.0 && sy < height as f32);

                let (x, y) = screen_to_ndc(sx, sy, width, height);
                assert!((x - ndc.x).abs() < 1e-5);
                assert!((y - ndc.y).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_screen_y_is_inverted() {
        let (_, top) = ndc_to_screen(&Vec3::new(0.0, 0.99, 0.0), 100, 100);
        let (_, bottom) = ndc_to_screen(&Vec3::new(0.0, -0.99, 0.0), 100, 100);
        assert!(top < bottom);
    }

    #[test]
    fn test_in_view_is_strict() {
        assert!(in_view(&Vec3::new(0.0, 0.0, 5.0)));
        assert!(!in_view(&Vec3::new(1.0, 0.0, 0.0)));
        assert!(!in_view(&Vec3::new(0.0, -1.0, 0.0)));
        assert!(!in_view(&Vec3::new(0.5, 3.0, 0.0)));
    }

    #[test]
    fn test_far_off_screen_pixels_saturate() {
        let p = ndc_to_pixel(&Vec3::new(1e30, -1e30, 0.0), 100, 100);
        assert_eq!(p, ScreenPoint::new(i32::MAX, i32::MAX));
    }
}
