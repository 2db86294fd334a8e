/// Wavefront geometry (.obj) and material library (.mtl) parsing
///
/// Both formats are line oriented: each non-blank, non-comment line is split
/// on whitespace and the first token picks a handler. Only the subset the
/// renderer needs is understood (`v`, `f`, `mtllib`, `usemtl`, `newmtl`,
/// `Kd`); any other keyword is skipped so richer files still load.
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info};
use nom::{
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, opt, rest},
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};

use crate::geometry::{Mesh, Rgb};
use crate::math::Vec3;

/// Errors that can occur when loading an asset.
#[derive(Debug)]
pub enum ParseError {
    /// A file could not be read.
    Io(io::Error),
    /// A line had the wrong number or kind of arguments.
    Malformed { line: usize, message: String },
    /// A face with other than three vertices.
    UnsupportedPolygon { line: usize, vertices: usize },
    /// A face referenced a vertex that does not exist (indices are 1-based).
    IndexOutOfRange { line: usize, index: i64, len: usize },
    /// `usemtl` named a material the library does not define.
    UnknownMaterial { name: String },
    /// The material library defined no materials.
    EmptyMaterialLibrary,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "IO error: {}", e),
            ParseError::Malformed { line, message } => write!(f, "line {}: {}", line, message),
            ParseError::UnsupportedPolygon { line, vertices } => write!(
                f,
                "line {}: face has {} vertices, only triangles are supported",
                line, vertices
            ),
            ParseError::IndexOutOfRange { line, index, len } => write!(
                f,
                "line {}: vertex index {} is out of range (1..={})",
                line, index, len
            ),
            ParseError::UnknownMaterial { name } => {
                write!(f, "material '{}' is not defined by the material library", name)
            }
            ParseError::EmptyMaterialLibrary => write!(f, "material library defines no materials"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

/// Receives the tokenised lines of a file
pub trait LineHandler {
    /// Handles one line; `name` is its first token and `args` the rest
    fn parameter(&mut self, name: &str, args: &[&str], line: usize) -> Result<(), ParseError>;

    /// Called once the whole input has been consumed
    fn finish(&mut self) -> Result<(), ParseError> {
        Ok(())
    }
}

/// Feeds every meaningful line of `input` to `handler`, then calls `finish`
pub fn parse_lines<H: LineHandler>(input: &str, handler: &mut H) -> Result<(), ParseError> {
    for (number, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();
        handler.parameter(name, &args, number + 1)?;
    }
    handler.finish()
}

fn number(input: &str) -> IResult<&str, f32> {
    all_consuming(float)(input)
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`; only the vertex part is kept
fn vertex_ref(input: &str) -> IResult<&str, i64> {
    all_consuming(terminated(integer, opt(preceded(char('/'), rest))))(input)
}

fn parse_number(token: &str, line: usize) -> Result<f32, ParseError> {
    match number(token) {
        Ok((_, value)) if value.is_finite() => Ok(value),
        _ => Err(ParseError::Malformed {
            line,
            message: format!("expected a number, found '{}'", token),
        }),
    }
}

fn parse_vector(name: &str, args: &[&str], line: usize) -> Result<Vec3, ParseError> {
    // A fourth (w) component must be a number but is otherwise ignored
    if args.len() != 3 && !(name == "v" && args.len() == 4) {
        return Err(ParseError::Malformed {
            line,
            message: format!("'{}' expects 3 values, found {}", name, args.len()),
        });
    }
    if let Some(w) = args.get(3) {
        parse_number(w, line)?;
    }
    Ok(Vec3::new(
        parse_number(args[0], line)?,
        parse_number(args[1], line)?,
        parse_number(args[2], line)?,
    ))
}

fn single_name<'a>(name: &str, args: &[&'a str], line: usize) -> Result<&'a str, ParseError> {
    args.first().copied().ok_or_else(|| ParseError::Malformed {
        line,
        message: format!("'{}' expects a name", name),
    })
}

/// A face as written in the file, before indices are checked
#[derive(Debug, Clone, PartialEq)]
pub struct RawFace {
    /// 1-based vertex references
    pub indices: [i64; 3],
    pub material: Option<String>,
    pub line: usize,
}

/// Collects geometry from an .obj file
#[derive(Debug, Default)]
pub struct ObjectParser {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<RawFace>,
    pub material_library: Option<String>,
    current_material: Option<String>,
}

impl LineHandler for ObjectParser {
    fn parameter(&mut self, name: &str, args: &[&str], line: usize) -> Result<(), ParseError> {
        match name {
            "mtllib" => {
                self.material_library = Some(single_name(name, args, line)?.to_string());
            }
            "usemtl" => {
                self.current_material = Some(single_name(name, args, line)?.to_string());
            }
            "v" => {
                let vertex = parse_vector(name, args, line)?;
                self.vertices.push(vertex);
            }
            "f" => {
                // Normals are recomputed from winding, so texture and normal
                // references are dropped
                let refs = args
                    .iter()
                    .map(|token| {
                        vertex_ref(token).map(|(_, index)| index).map_err(|_| ParseError::Malformed {
                            line,
                            message: format!("bad vertex reference '{}'", token),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let indices: [i64; 3] = refs.as_slice().try_into().map_err(|_| {
                    ParseError::UnsupportedPolygon {
                        line,
                        vertices: refs.len(),
                    }
                })?;
                self.faces.push(RawFace {
                    indices,
                    material: self.current_material.clone(),
                    line,
                });
            }
            _ => {}
        }
        Ok(())
    }
}

/// A named diffuse colour from a material library
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Option<Rgb>,
}

/// Collects materials from an .mtl file
#[derive(Debug, Default)]
pub struct MaterialParser {
    pub materials: Vec<Material>,
    current: Option<Material>,
}

/// Converts a `[0, 1]` colour channel to a byte; 1.0 and above give 255
fn kd_channel(value: f32) -> u8 {
    if value >= 1.0 {
        255
    } else {
        (value * 256.0).floor().clamp(0.0, 255.0) as u8
    }
}

impl LineHandler for MaterialParser {
    fn parameter(&mut self, name: &str, args: &[&str], line: usize) -> Result<(), ParseError> {
        match name {
            "newmtl" => {
                let material_name = single_name(name, args, line)?;
                if let Some(done) = self.current.take() {
                    self.materials.push(done);
                }
                self.current = Some(Material {
                    name: material_name.to_string(),
                    diffuse: None,
                });
            }
            "Kd" => {
                let rgb = parse_vector(name, args, line)?;
                let material = self.current.as_mut().ok_or_else(|| ParseError::Malformed {
                    line,
                    message: "'Kd' before any 'newmtl'".to_string(),
                })?;
                material.diffuse = Some(Rgb::new(kd_channel(rgb.x), kd_channel(rgb.y), kd_channel(rgb.z)));
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        if let Some(done) = self.current.take() {
            self.materials.push(done);
        }
        Ok(())
    }
}

pub fn parse_materials(input: &str) -> Result<Vec<Material>, ParseError> {
    let mut parser = MaterialParser::default();
    parse_lines(input, &mut parser)?;
    Ok(parser.materials)
}

/// Builds a mesh from in-memory sources.
///
/// Without a material library every face is white, even if the geometry
/// names one.
pub fn parse_mesh(obj: &str, mtl: Option<&str>) -> Result<Mesh, ParseError> {
    let mut object = ObjectParser::default();
    parse_lines(obj, &mut object)?;
    let materials = mtl.map(parse_materials).transpose()?;
    build_mesh(object, materials)
}

/// Loads a mesh from a geometry file, reading its material library (if it
/// names one) from the same directory.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<Mesh, ParseError> {
    let path = path.as_ref();
    info!("loading mesh {}", path.display());

    let mut object = ObjectParser::default();
    parse_lines(&read_source(path)?, &mut object)?;

    let materials = match &object.material_library {
        Some(library) => {
            let library_path = path.parent().unwrap_or_else(|| Path::new(".")).join(library);
            debug!("reading material library {}", library_path.display());
            Some(parse_materials(&read_source(&library_path)?)?)
        }
        None => None,
    };

    let mesh = build_mesh(object, materials)?;
    info!(
        "loaded {}: {} vertices, {} faces, {} colours",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len(),
        mesh.colours.len()
    );
    Ok(mesh)
}

fn read_source(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path)
        .map_err(|e| ParseError::Io(io::Error::new(e.kind(), format!("{}: {}", path.display(), e))))
}

fn build_mesh(object: ObjectParser, materials: Option<Vec<Material>>) -> Result<Mesh, ParseError> {
    let vertex_count = object.vertices.len();

    // Material names to colour indices, with equal colours stored once
    let mut colours = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    match materials {
        Some(materials) => {
            if materials.is_empty() {
                return Err(ParseError::EmptyMaterialLibrary);
            }
            let mut by_colour: HashMap<Rgb, usize> = HashMap::new();
            for material in materials {
                let colour = material.diffuse.unwrap_or_else(|| {
                    debug!("material '{}' has no Kd, using white", material.name);
                    Rgb::WHITE
                });
                let index = *by_colour.entry(colour).or_insert_with(|| {
                    colours.push(colour);
                    colours.len() - 1
                });
                by_name.entry(material.name).or_insert(index);
            }
        }
        None => colours.push(Rgb::WHITE),
    }
    let use_materials = !by_name.is_empty();
    // Faces before the first `usemtl` take the first material
    let default_colour = 0;

    let mut faces = Vec::with_capacity(object.faces.len());
    for face in object.faces {
        let mut vertices = [0usize; 3];
        for (slot, &index) in vertices.iter_mut().zip(face.indices.iter()) {
            if index < 1 || index as usize > vertex_count {
                return Err(ParseError::IndexOutOfRange {
                    line: face.line,
                    index,
                    len: vertex_count,
                });
            }
            *slot = index as usize - 1;
        }

        let colour = match (&face.material, use_materials) {
            (Some(name), true) => *by_name
                .get(name)
                .ok_or_else(|| ParseError::UnknownMaterial { name: name.clone() })?,
            _ => default_colour,
        };
        faces.push((vertices, colour));
    }

    Ok(Mesh::from_parts(object.vertices, faces, colours))
}
