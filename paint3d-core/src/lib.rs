/// Paint3D Core Library - Software rendering of triangle meshes
///
/// This library provides the host-independent part of the renderer: vector and
/// matrix math, OBJ/MTL loading, mesh simulation, back-face culling, the
/// painter's-algorithm depth sort and rasterisation onto any [`Surface`].

pub mod geometry;
pub mod math;
pub mod mode;
pub mod motion;
pub mod obj;
pub mod pipeline;
pub mod projection;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use geometry::{Face, Mesh, Rgb};
pub use math::{Mat4, Quat, Vec3};
pub use mode::{Primitive, RenderMode};
pub use motion::AxisRates;
pub use obj::{load_mesh, parse_mesh, ParseError};
pub use pipeline::{FrameStats, RenderSettings, Renderer};
pub use projection::Camera;
pub use surface::{FrameBuffer, ScreenPoint, Surface};
pub use transform::Transform;
