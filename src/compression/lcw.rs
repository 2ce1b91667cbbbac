use std::ops::ControlFlow;

use super::{buffer::DecodedBuffer, stream::ByteStream};

/// How the 16-bit positions of [`Command::MediumCopy`] and
/// [`Command::VeryLargeCopy`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// Position is an offset from the start of the output.
    Absolute,
    /// Position is a distance behind the write cursor.
    Relative,
}

impl AddressingMode {
    /// A leading zero byte selects relative addressing and is consumed. Any
    /// other byte is left in place as the first opcode.
    pub fn detect(stream: &mut ByteStream) -> Self {
        if stream.peek() == Some(0x00) {
            stream.read();
            Self::Relative
        } else {
            Self::Absolute
        }
    }

    pub fn resolve(self, write_index: usize, position: u16) -> Option<usize> {
        match self {
            Self::Absolute => Some(usize::from(position)),
            Self::Relative => write_index.checked_sub(usize::from(position)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `0ccc pppp pppppppp`: copy `c + 3` bytes from `p` bytes back.
    ShortBackref { count: usize, distance: usize },
    /// `10cc cccc` with `c != 0`: copy `c` bytes from the stream.
    LiteralRun { count: usize },
    /// `11cc cccc` with `c < 0x3e`, then a LE position: copy `c + 3` bytes.
    MediumCopy { count: usize, position: u16 },
    /// `0xfe`, LE count, value.
    FillRun { count: usize, value: u8 },
    /// `0xff`, LE count, LE position.
    VeryLargeCopy { count: usize, position: u16 },
    /// `0x80`, a literal run of length zero.
    Exit,
}

impl Command {
    /// Decodes the command starting with `op`, pulling its operands from
    /// `stream`. Returns `None` if the stream ends inside the operands.
    pub fn decode(op: u8, stream: &mut ByteStream) -> Option<Self> {
        let command = match op {
            n @ 0x00..0x80 => {
                let lower = stream.read()?;
                Self::ShortBackref {
                    count: usize::from(n >> 4) + 3,
                    distance: usize::from(u16::from_be_bytes([n & 0x0f, lower])),
                }
            }

            0x80 => Self::Exit,
            n @ 0x81..0xc0 => Self::LiteralRun {
                count: usize::from(n & 0x3f),
            },

            n @ 0xc0..0xfe => Self::MediumCopy {
                count: usize::from(n & 0x3f) + 3,
                position: stream.read_u16_le()?,
            },
            0xfe => Self::FillRun {
                count: usize::from(stream.read_u16_le()?),
                value: stream.read()?,
            },
            0xff => Self::VeryLargeCopy {
                count: usize::from(stream.read_u16_le()?),
                position: stream.read_u16_le()?,
            },
        };

        Some(command)
    }
}

/// Decoder for the LCW ("Format80") copy-code scheme.
#[derive(Debug, Clone)]
pub struct LcwDecoder<'a> {
    src: ByteStream<'a>,
    dst: DecodedBuffer,
    mode: AddressingMode,
}

impl<'a> LcwDecoder<'a> {
    pub fn new(src: &'a [u8], size: usize) -> Self {
        let mut src = ByteStream::new(src);
        let mode = AddressingMode::detect(&mut src);

        Self {
            src,
            dst: DecodedBuffer::new(size),
            mode,
        }
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Runs the decoder to completion. Always returns exactly `size` bytes;
    /// anything after the last write stays zero.
    ///
    /// Decoding ends at the end marker, when the output is full, when the
    /// stream runs out, or at a back-reference whose source is not behind the
    /// write position.
    pub fn decompress(mut self) -> Vec<u8> {
        while !self.dst.is_full() {
            let Some(op) = self.src.read() else {
                log::debug!(
                    "lcw: stream exhausted after {} of {} bytes",
                    self.dst.position(),
                    self.dst.capacity()
                );
                break;
            };

            let Some(command) = Command::decode(op, &mut self.src) else {
                log::debug!("lcw: truncated operands for opcode {:#04x}", op);
                break;
            };
            log::trace!("command: {:?}", command);

            if self.execute(command).is_break() {
                break;
            }
        }

        self.dst.into_inner()
    }

    fn execute(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::ShortBackref { count, distance } => {
                let source = self.dst.position().checked_sub(distance);
                self.copy_back(source, count)
            }
            Command::LiteralRun { count } => self.copy_literal(count),
            Command::MediumCopy { count, position }
            | Command::VeryLargeCopy { count, position } => {
                let source = self.mode.resolve(self.dst.position(), position);
                self.copy_back(source, count)
            }
            Command::FillRun { count, value } => {
                self.dst.fill(value, count);
                ControlFlow::Continue(())
            }
            Command::Exit => ControlFlow::Break(()),
        }
    }

    fn copy_literal(&mut self, count: usize) -> ControlFlow<()> {
        for _ in 0..count {
            if self.dst.is_full() {
                break;
            }

            let Some(value) = self.src.read() else {
                log::debug!("lcw: stream ended inside a literal run");
                return ControlFlow::Break(());
            };
            self.dst.push(value);
        }

        ControlFlow::Continue(())
    }

    fn copy_back(&mut self, source: Option<usize>, count: usize) -> ControlFlow<()> {
        match source {
            Some(source) if self.dst.copy_back(source, count) => ControlFlow::Continue(()),
            _ => {
                log::debug!(
                    "lcw: back-reference {:?} is not behind write position {}",
                    source,
                    self.dst.position()
                );
                ControlFlow::Break(())
            }
        }
    }
}

/// Decodes an LCW stream into a buffer of exactly `size` bytes.
pub fn decompress_lcw(src: &[u8], size: usize) -> Vec<u8> {
    LcwDecoder::new(src, size).decompress()
}
