use image::Rgb;
use std::{fs, path::Path};
use thiserror::Error;

pub const PALETTE_ENTRIES: usize = 256;
/// Size of a raw 6-bit VGA palette (`.col`/`.pal`).
pub const PALETTE_SIZE: usize = PALETTE_ENTRIES * 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette([Rgb<u8>; PALETTE_ENTRIES]);

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file")]
    Read(#[from] std::io::Error),
    #[error("Palette data must be 768 bytes long, got {0}")]
    InvalidLength(usize),
}

impl Palette {
    /// Build a palette from 256 RGB triplets of 6-bit VGA components, scaling
    /// each to the full 8-bit range.
    pub fn from_vga(data: &[u8]) -> Result<Self, PaletteError> {
        if data.len() != PALETTE_SIZE {
            return Err(PaletteError::InvalidLength(data.len()));
        }

        let expand = |v: u8| (u32::from(v.min(63)) * 255 / 63) as u8;

        let mut palette = [Rgb([0, 0, 0]); PALETTE_ENTRIES];
        for (entry, color) in palette.iter_mut().zip(data.chunks_exact(3)) {
            *entry = Rgb([expand(color[0]), expand(color[1]), expand(color[2])]);
        }

        Ok(Palette(palette))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PaletteError> {
        let data = fs::read(path.as_ref())?;
        Self::from_vga(&data)
    }

    /// Fallback used when neither the caller nor the image provides a palette.
    pub fn greyscale() -> Self {
        // the table is built flat, one byte per component, as `i / 3`
        let flat: Vec<u8> = (0..PALETTE_SIZE).map(|i| (i / 3) as u8).collect();

        let mut palette = [Rgb([0, 0, 0]); PALETTE_ENTRIES];
        for (entry, color) in palette.iter_mut().zip(flat.chunks_exact(3)) {
            *entry = Rgb([color[0], color[1], color[2]]);
        }

        Palette(palette)
    }

    pub const fn get(&self, index: u8) -> Rgb<u8> {
        self.0[index as usize]
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::greyscale()
    }
}
