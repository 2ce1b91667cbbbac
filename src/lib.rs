mod compression;
pub use compression::{
    decompress_lcw, decompress_rle, AddressingMode, ByteStream, Command, Compression,
    DecodedBuffer, DecompressError, LcwDecoder, RleDecoder, RleOp,
};

mod palette;
pub use palette::{Palette, PaletteError, PALETTE_ENTRIES, PALETTE_SIZE};

pub mod cps;
pub use cps::{CpsError, CpsHeader, CpsImage};

pub mod pak;
pub use pak::{PakArchive, PakEntry, PakError};

mod manifest;
pub use manifest::{AssetManifest, ImageDefinition, ManifestError, RasterSize};
