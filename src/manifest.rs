use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    cps::{DEFAULT_HEIGHT, DEFAULT_WIDTH},
    pak::is_valid_name,
};

/// Batch export description, read from TOML.
///
/// ```toml
/// palette = "origpal.col"
///
/// [raster]
/// width = 320
/// height = 200
///
/// [[image]]
/// name = "brandon"
/// path = "data/brandon.cps"
/// category = "portraits"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub raster: RasterSize,

    /// Default palette for every image that does not name its own.
    #[serde(default)]
    pub palette: Option<PathBuf>,

    #[serde(rename = "image", default)]
    pub images: Vec<ImageDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RasterSize {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDefinition {
    pub name: String,
    pub path: PathBuf,

    #[serde(default)]
    pub palette: Option<PathBuf>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse manifest")]
    Parse(#[from] toml::de::Error),
    #[error("Raster size {0}x{1} is empty")]
    EmptyRaster(u32, u32),
    #[error("Image name or category {0:?} is not a plain file name")]
    InvalidName(String),
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for RasterSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl ImageDefinition {
    /// Where the PNG for this image goes below `out_dir`.
    pub fn output_path(&self, out_dir: &Path) -> Result<PathBuf, ManifestError> {
        let mut path = out_dir.to_path_buf();

        if let Some(category) = &self.category {
            if !is_valid_name(category) {
                return Err(ManifestError::InvalidName(category.clone()));
            }
            path.push(category);
        }

        if !is_valid_name(&self.name) {
            return Err(ManifestError::InvalidName(self.name.clone()));
        }
        path.push(format!("{}.png", self.name));

        Ok(path)
    }
}

impl AssetManifest {
    pub fn parse(manifest: &str) -> Result<Self, ManifestError> {
        let manifest: AssetManifest = toml::de::from_str(manifest)?;

        if manifest.raster.width == 0 || manifest.raster.height == 0 {
            return Err(ManifestError::EmptyRaster(
                manifest.raster.width,
                manifest.raster.height,
            ));
        }

        Ok(manifest)
    }

    /// Loads a manifest and makes its relative paths relative to the
    /// manifest's own directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let mut manifest = Self::parse(&fs::read_to_string(path)?)?;

        if let Some(base) = path.parent() {
            manifest.rebase(base);
        }

        Ok(manifest)
    }

    pub fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        if let Some(palette) = &mut self.palette {
            rebase(palette);
        }

        for image in &mut self.images {
            rebase(&mut image.path);
            if let Some(palette) = &mut image.palette {
                rebase(palette);
            }
        }
    }

    pub fn palette_for<'a>(&'a self, image: &'a ImageDefinition) -> Option<&'a Path> {
        image.palette.as_deref().or(self.palette.as_deref())
    }
}
