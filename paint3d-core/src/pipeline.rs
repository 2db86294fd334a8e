/// The per-frame rendering pipeline
///
/// A frame runs in three stages over scratch buffers owned by [`Renderer`]:
///
/// 1. mesh-space vertices and normals are moved into world space,
/// 2. faces pointing away from the camera are culled (when the mode asks for
///    it) and the rest are sorted far to near by the camera-space depth of
///    their centroid,
/// 3. each sorted face has its vertices projected (once per vertex per frame)
///    and is drawn as points, an outline or a filled triangle.
///
/// Drawing far to near lets nearer faces overwrite farther ones without a
/// depth buffer. There is no clipping: a face is drawn whole if any of its
/// vertices lands inside the view, and faces straddling the camera plane are
/// not handled.
use std::io;

use log::trace;

use crate::geometry::{Face, Mesh, Rgb};
use crate::math::{centroid, normalise, Mat4, Vec3};
use crate::mode::{Primitive, RenderMode};
use crate::projection::{in_view, ndc_to_pixel, Camera};
use crate::surface::Surface;
use crate::transform::Transform;

/// Lighting and colours that stay fixed between frames
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Unit direction the light travels in
    pub light_direction: Vec3,
    /// Lowest brightness a shaded face can have
    pub ambient_floor: f32,
    pub point_colour: Rgb,
    pub line_colour: Rgb,
    pub background: Rgb,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            light_direction: normalise(&Vec3::new(-1.0, -1.0, -1.0)),
            ambient_floor: 8.0 / 255.0,
            point_colour: Rgb::WHITE,
            line_colour: Rgb::WHITE,
            background: Rgb::BLACK,
        }
    }
}

/// Face counts for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    /// Back faces removed by the render mode
    pub culled: usize,
    /// No vertex inside the view
    pub offscreen: usize,
    /// A vertex could not be projected (on the camera plane)
    pub degenerate: usize,
    pub drawn: usize,
    pub projected_vertices: usize,
}

#[derive(Debug, Clone, Copy)]
enum Projected {
    Pending,
    Ndc(Vec3),
    Rejected,
}

#[derive(Debug, Clone, Copy)]
struct DepthEntry {
    face: usize,
    depth: f32,
}

/// Renders meshes to a [`Surface`], reusing its buffers across frames
#[derive(Debug, Default)]
pub struct Renderer {
    settings: RenderSettings,
    world_vertices: Vec<Vec3>,
    world_normals: Vec<Vec3>,
    projected: Vec<Projected>,
    order: Vec<DepthEntry>,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Clears `surface`, draws `mesh` and presents the result once.
    pub fn render_frame<S: Surface + ?Sized>(
        &mut self,
        mesh: &Mesh,
        camera: &Camera,
        mode: RenderMode,
        surface: &mut S,
    ) -> io::Result<FrameStats> {
        surface.clear(self.settings.background);
        let stats = self.draw(mesh, camera, mode, surface);
        surface.present()?;
        Ok(stats)
    }

    /// Draws `mesh` on top of the current surface contents
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        mesh: &Mesh,
        camera: &Camera,
        mode: RenderMode,
        surface: &mut S,
    ) -> FrameStats {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();

        let mut stats = FrameStats {
            faces: mesh.faces.len(),
            ..Default::default()
        };

        self.to_world(mesh);
        stats.culled = self.cull_and_sort(mesh, camera, &view, mode);
        self.rasterise(mesh, &view, &projection, mode, surface, &mut stats);

        trace!(
            "{} frame: {} faces, {} culled, {} offscreen, {} degenerate, {} drawn, {} vertices projected",
            mode,
            stats.faces,
            stats.culled,
            stats.offscreen,
            stats.degenerate,
            stats.drawn,
            stats.projected_vertices
        );
        stats
    }

    /// Rotates normals and rotates then translates vertices into world space
    fn to_world(&mut self, mesh: &Mesh) {
        let rotation = Transform::rotate(&Transform::identity(), &mesh.orientation);
        let model = Transform::translate(&rotation, &mesh.position);

        self.world_normals.clear();
        self.world_normals
            .extend(mesh.normals.iter().map(|n| Transform::apply_affine(&rotation, n)));

        self.world_vertices.clear();
        self.world_vertices
            .extend(mesh.vertices.iter().map(|v| Transform::apply_affine(&model, v)));

        self.projected.clear();
        self.projected.resize(mesh.vertices.len(), Projected::Pending);
    }

    /// Fills `order` with the surviving faces, farthest first. Returns the
    /// number of faces culled.
    fn cull_and_sort(&mut self, mesh: &Mesh, camera: &Camera, view: &Mat4, mode: RenderMode) -> usize {
        self.order.clear();
        let mut culled = 0;

        for (index, face) in mesh.faces.iter().enumerate() {
            let [a, b, c] = face.vertices.map(|i| self.world_vertices[i]);
            let centre = centroid(&a, &b, &c);

            let to_camera = normalise(&(camera.position - centre));
            if mode.culls_back_faces() && self.world_normals[face.normal].dot(&to_camera) < 0.0 {
                culled += 1;
                continue;
            }

            let depth = Transform::apply_affine(view, &centre).z;
            self.order.push(DepthEntry { face: index, depth });
        }

        // The camera looks down -z, so ascending z is far to near. The sort
        // is stable; faces at equal depth keep mesh order.
        self.order.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        culled
    }

    fn rasterise<S: Surface + ?Sized>(
        &mut self,
        mesh: &Mesh,
        view: &Mat4,
        projection: &Mat4,
        mode: RenderMode,
        surface: &mut S,
        stats: &mut FrameStats,
    ) {
        let (width, height) = (surface.width(), surface.height());

        for position in 0..self.order.len() {
            let face = &mesh.faces[self.order[position].face];

            let mut ndc = [Vec3::zeros(); 3];
            let mut rejected = false;
            for (slot, &vertex) in ndc.iter_mut().zip(face.vertices.iter()) {
                match self.project(vertex, view, projection, stats) {
                    Some(p) => *slot = p,
                    None => rejected = true,
                }
            }
            if rejected {
                stats.degenerate += 1;
                continue;
            }
            if !ndc.iter().any(in_view) {
                stats.offscreen += 1;
                continue;
            }

            let points = ndc.map(|p| ndc_to_pixel(&p, width, height));
            let colour = self.face_colour(mesh, face, mode);
            match mode.primitive() {
                Primitive::Points => {
                    for p in points {
                        surface.set_pixel(p.x, p.y, colour);
                    }
                }
                Primitive::Outline => surface.draw_polygon_outline(&points, colour),
                Primitive::Fill => surface.fill_polygon(&points, colour),
            }
            stats.drawn += 1;
        }
    }

    /// World space to normalised device coordinates, memoised per vertex
    fn project(&mut self, vertex: usize, view: &Mat4, projection: &Mat4, stats: &mut FrameStats) -> Option<Vec3> {
        match self.projected[vertex] {
            Projected::Ndc(p) => Some(p),
            Projected::Rejected => None,
            Projected::Pending => {
                let camera_space = Transform::apply_affine(view, &self.world_vertices[vertex]);
                let result = Transform::apply(projection, &camera_space);
                self.projected[vertex] = match result {
                    Some(p) => Projected::Ndc(p),
                    None => Projected::Rejected,
                };
                stats.projected_vertices += 1;
                result
            }
        }
    }

    fn face_colour(&self, mesh: &Mesh, face: &Face, mode: RenderMode) -> Rgb {
        match mode.primitive() {
            Primitive::Points => self.settings.point_colour,
            Primitive::Outline => self.settings.line_colour,
            Primitive::Fill => {
                let base = mesh.colours[face.colour];
                if !mode.shades() {
                    return base;
                }
                let incidence = -self.world_normals[face.normal].dot(&self.settings.light_direction);
                base.scale(incidence.max(self.settings.ambient_floor))
            }
        }
    }
}
