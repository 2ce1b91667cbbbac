use crate::{Compression, DecompressError, Palette, PaletteError, PALETTE_SIZE};
use image::{ImageFormat, Rgba, RgbaImage};
use std::{fs, path::Path};
use thiserror::Error;

pub const HEADER_SIZE: usize = 10;

/// CPS images are full-screen VGA pictures.
pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpsHeader {
    pub file_size: u16,
    pub compression: Compression,
    pub uncompressed_size: u32,
    /// Length in bytes of the palette stored between header and payload.
    pub palette_size: u16,
}

#[derive(Debug, Clone)]
pub struct CpsImage {
    pub header: CpsHeader,
    pub width: u32,
    pub height: u32,
    /// One palette index per pixel, row major.
    pub pixels: Vec<u8>,
    pub embedded_palette: Option<Palette>,
}

#[derive(Error, Debug)]
pub enum CpsError {
    #[error("Failed to read CPS file")]
    Read(#[from] std::io::Error),
    #[error("CPS header needs {HEADER_SIZE} bytes, got {0}", HEADER_SIZE = HEADER_SIZE)]
    TruncatedHeader(usize),
    #[error("Header declares a {declared} byte palette but only {available} bytes follow")]
    TruncatedPalette { declared: usize, available: usize },
    #[error("Failed to decompress image data")]
    Decompress(#[from] DecompressError),
    #[error("Invalid palette")]
    Palette(#[from] PaletteError),
    #[error("Scaling the image by {0} overflows its dimensions")]
    ScaleTooLarge(u32),
    #[error("Failed to encode image")]
    Encode(#[from] image::ImageError),
}

impl CpsHeader {
    pub fn parse(data: &[u8]) -> Result<Self, CpsError> {
        let header: &[u8; HEADER_SIZE] = data
            .get(..HEADER_SIZE)
            .and_then(|header| header.try_into().ok())
            .ok_or(CpsError::TruncatedHeader(data.len()))?;

        Ok(Self {
            file_size: u16::from_le_bytes([header[0], header[1]]),
            compression: Compression::from(u16::from_le_bytes([header[2], header[3]])),
            uncompressed_size: u32::from_le_bytes([header[4], header[5], header[6], header[7]]),
            palette_size: u16::from_le_bytes([header[8], header[9]]),
        })
    }
}

impl CpsImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CpsError> {
        let data = fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self, CpsError> {
        Self::parse_with_size(data, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Decode a CPS file whose raster is `width` x `height` index bytes.
    pub fn parse_with_size(data: &[u8], width: u32, height: u32) -> Result<Self, CpsError> {
        let header = CpsHeader::parse(data)?;
        log::debug!("CPS header: {:?}", header);

        if !header.compression.is_supported() {
            return Err(DecompressError::Unsupported(header.compression).into());
        }

        let body = &data[HEADER_SIZE..];
        let palette_size = usize::from(header.palette_size);
        if palette_size > body.len() {
            return Err(CpsError::TruncatedPalette {
                declared: palette_size,
                available: body.len(),
            });
        }
        let (palette_data, payload) = body.split_at(palette_size);

        let embedded_palette = match palette_size {
            0 => None,
            PALETTE_SIZE => Some(Palette::from_vga(palette_data)?),
            other => {
                log::warn!("Ignoring embedded palette of unexpected size {}", other);
                None
            }
        };

        let size = width as usize * height as usize;
        if header.uncompressed_size != 0 && header.uncompressed_size as usize != size {
            log::warn!(
                "Header declares {} uncompressed bytes, decoding {}x{} ({} bytes) instead",
                header.uncompressed_size,
                width,
                height,
                size
            );
        }

        let pixels = header.compression.decompress(payload, size)?;

        Ok(Self {
            header,
            width,
            height,
            pixels,
            embedded_palette,
        })
    }

    pub fn compression(&self) -> Compression {
        self.header.compression
    }

    pub fn has_embedded_palette(&self) -> bool {
        self.header.palette_size != 0
    }

    /// Picks the palette to render with: the supplied one, then the embedded
    /// one, then a greyscale ramp.
    pub fn resolve_palette(&self, palette: Option<Palette>) -> Palette {
        palette
            .or_else(|| self.embedded_palette.clone())
            .unwrap_or_else(Palette::greyscale)
    }

    pub fn to_image(&self, palette: &Palette) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let pixel_index = y as usize * self.width as usize + x as usize;
            let color = palette.get(self.pixels[pixel_index]);

            Rgba([color[0], color[1], color[2], 255])
        })
    }

    pub fn save_png<P: AsRef<Path>>(
        &self,
        path: P,
        palette: &Palette,
        scale: u32,
    ) -> Result<(), CpsError> {
        let scaled = match (self.width.checked_mul(scale), self.height.checked_mul(scale)) {
            (Some(width), Some(height)) => (width, height),
            _ => return Err(CpsError::ScaleTooLarge(scale)),
        };

        let mut img = self.to_image(palette);

        if scale > 1 {
            img = image::imageops::resize(
                &img,
                scaled.0,
                scaled.1,
                image::imageops::FilterType::Nearest,
            );
        }

        img.save_with_format(path.as_ref(), ImageFormat::Png)?;
        Ok(())
    }
}
