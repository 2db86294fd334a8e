/// Indexed triangle meshes and their simulation state
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::math::{identity_quaternion, normalise, renormalise, rotate_quaternion, Quat, Vec3};
use crate::motion::AxisRates;

/// An 8-bit per channel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiplies every channel by `factor`, saturating at 0 and 255
    pub fn scale(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Packs the colour into 16-bit RGB565
    pub fn to_rgb565(self) -> u16 {
        ((self.r as u16 & 0xF8) << 8) | ((self.g as u16 & 0xFC) << 3) | (self.b as u16 >> 3)
    }
}

/// A triangle referencing shared vertex, normal and colour entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub normal: usize,
    pub colour: usize,
}

/// A triangle mesh with its position, orientation and motion.
///
/// Vertices, normals and colours are stored once and shared between faces by
/// index. Every index held by a [`Face`] is in bounds of its target array.
#[derive(Debug)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub colours: Vec<Rgb>,
    pub faces: Vec<Face>,

    pub position: Vec3,
    /// Must stay unit length
    pub orientation: Quat,
    /// Units per second along each world axis
    pub velocity: Arc<AxisRates>,
    /// Degrees per second around each world axis
    pub angular: Arc<AxisRates>,
}

impl Mesh {
    /// Builds a mesh from vertices and per-face `(indices, colour)` pairs.
    ///
    /// Face normals are derived from winding as
    /// `normalise(cross(v0 - v1, v1 - v2))`, which assumes faces wind
    /// anti-clockwise when seen from the front. Equal normals are stored once.
    /// Callers guarantee every index is in bounds.
    pub(crate) fn from_parts(
        vertices: Vec<Vec3>,
        face_indices: Vec<([usize; 3], usize)>,
        colours: Vec<Rgb>,
    ) -> Self {
        let mut normals: Vec<Vec3> = Vec::new();
        let mut normal_lookup: HashMap<[u32; 3], usize> = HashMap::new();
        let mut faces = Vec::with_capacity(face_indices.len());
        let mut degenerate = 0;

        for (vertex_indices, colour) in face_indices {
            let [a, b, c] = vertex_indices.map(|i| vertices[i]);
            let normal = normalise(&(a - b).cross(&(b - c)));
            if normal == Vec3::zeros() {
                degenerate += 1;
            }

            // -0.0 and 0.0 are the same direction
            let key = [normal.x, normal.y, normal.z].map(|c| (c + 0.0).to_bits());
            let normal_index = *normal_lookup.entry(key).or_insert_with(|| {
                normals.push(normal);
                normals.len() - 1
            });

            faces.push(Face {
                vertices: vertex_indices,
                normal: normal_index,
                colour,
            });
        }

        if degenerate > 0 {
            warn!("{} zero-area faces were given a zero normal", degenerate);
        }
        debug!(
            "built mesh: {} vertices, {} faces, {} distinct normals, {} colours",
            vertices.len(),
            faces.len(),
            normals.len(),
            colours.len()
        );

        Self {
            vertices,
            normals,
            colours,
            faces,
            position: Vec3::zeros(),
            orientation: identity_quaternion(),
            velocity: Arc::new(AxisRates::default()),
            angular: Arc::new(AxisRates::default()),
        }
    }

    /// Create a cube centred on the origin with a different colour per side
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let colours = vec![
            Rgb::new(230, 60, 60),
            Rgb::new(60, 200, 90),
            Rgb::new(70, 110, 230),
            Rgb::new(240, 200, 60),
            Rgb::new(200, 80, 220),
            Rgb::new(70, 210, 220),
        ];
        let faces = vec![
            // Front
            ([4, 5, 6], 0),
            ([4, 6, 7], 0),
            // Back
            ([0, 3, 2], 1),
            ([0, 2, 1], 1),
            // Top
            ([3, 7, 6], 2),
            ([3, 6, 2], 2),
            // Bottom
            ([0, 1, 5], 3),
            ([0, 5, 4], 3),
            // Right
            ([1, 2, 6], 4),
            ([1, 6, 5], 4),
            // Left
            ([0, 4, 7], 5),
            ([0, 7, 3], 5),
        ];

        Self::from_parts(vertices, faces, colours)
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// The three angular rates form a single vector: its length is the turn
    /// rate in degrees per second and its direction is the axis.
    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity.load() * dt;

        let angular = self.angular.load();
        let degrees = angular.norm();
        let axis = normalise(&angular);
        self.orientation = renormalise(&rotate_quaternion(&self.orientation, degrees * dt, &axis));
    }
}
