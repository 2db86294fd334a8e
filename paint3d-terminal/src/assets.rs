/// The list of meshes the host cycles through
use std::path::PathBuf;

use log::info;
use paint3d_core::{load_mesh, Mesh, ParseError};

/// Edge length of the cube shown when no asset is configured
pub const FALLBACK_CUBE_SIZE: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct AssetList {
    paths: Vec<PathBuf>,
    /// Index of the asset on screen; `None` while showing the fallback cube
    shown: Option<usize>,
    /// Index of the last load attempt
    cursor: usize,
}

impl AssetList {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            shown: None,
            cursor: 0,
        }
    }

    /// Loads the first asset, or builds the fallback cube when there is none
    pub fn load_first(&mut self) -> Result<Mesh, ParseError> {
        self.cursor = 0;
        match self.paths.first() {
            Some(path) => {
                let mesh = load_mesh(path)?;
                self.shown = Some(0);
                Ok(mesh)
            }
            None => {
                info!("no assets configured, showing the built-in cube");
                self.shown = None;
                Ok(Mesh::cube(FALLBACK_CUBE_SIZE))
            }
        }
    }

    /// Tries the asset after the last one attempted. A failure leaves the
    /// shown asset unchanged, and the following call moves past the broken
    /// file. Returns `None` when there are no assets.
    pub fn load_next(&mut self) -> Option<Result<Mesh, ParseError>> {
        if self.paths.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.paths.len();
        let result = load_mesh(&self.paths[self.cursor]);
        if result.is_ok() {
            self.shown = Some(self.cursor);
        }
        Some(result)
    }

    /// File name of the asset on screen
    pub fn name(&self) -> String {
        self.shown
            .and_then(|index| self.paths[index].file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cube".to_string())
    }

    pub fn path_of_last_attempt(&self) -> Option<&PathBuf> {
        self.paths.get(self.cursor)
    }
}
