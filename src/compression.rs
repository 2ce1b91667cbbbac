use std::fmt;
use thiserror::Error;

mod buffer;
mod lcw;
mod rle;
mod stream;

pub use buffer::DecodedBuffer;
pub use lcw::{decompress_lcw, AddressingMode, Command, LcwDecoder};
pub use rle::{decompress_rle, RleDecoder, RleOp};
pub use stream::ByteStream;

/// Compression type code stored in a CPS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Lzw12,
    Lzw14,
    Rle,
    Lcw,
    Unknown(u16),
}

#[derive(Error, Debug)]
pub enum DecompressError {
    #[error("Unsupported compression method: {0}")]
    Unsupported(Compression),
}

impl From<u16> for Compression {
    fn from(code: u16) -> Self {
        match code {
            0x0000 => Self::None,
            0x0001 => Self::Lzw12,
            0x0002 => Self::Lzw14,
            0x0003 => Self::Rle,
            0x0004 => Self::Lcw,
            other => Self::Unknown(other),
        }
    }
}

impl From<Compression> for u16 {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::None => 0x0000,
            Compression::Lzw12 => 0x0001,
            Compression::Lzw14 => 0x0002,
            Compression::Rle => 0x0003,
            Compression::Lcw => 0x0004,
            Compression::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Lzw12 => f.write_str("Westwood LZW 12-bit"),
            Self::Lzw14 => f.write_str("Westwood LZW 14-bit"),
            Self::Rle => f.write_str("Westwood RLE"),
            Self::Lcw => f.write_str("Westwood LCW"),
            Self::Unknown(code) => write!(f, "Unknown ({:#06x})", code),
        }
    }
}

impl Compression {
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Rle | Self::Lcw)
    }

    /// Decodes `src` into a buffer of exactly `size` bytes.
    ///
    /// Only RLE and LCW payloads can be decoded; every other method is
    /// reported as [`DecompressError::Unsupported`]. Short or malformed
    /// payloads are not an error, the output is just left partially zero.
    pub fn decompress(self, src: &[u8], size: usize) -> Result<Vec<u8>, DecompressError> {
        match self {
            Self::Lcw => Ok(decompress_lcw(src, size)),
            Self::Rle => Ok(decompress_rle(src, size)),
            other => Err(DecompressError::Unsupported(other)),
        }
    }
}
