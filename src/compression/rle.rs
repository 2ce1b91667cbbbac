use super::{buffer::DecodedBuffer, stream::ByteStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RleOp {
    /// Positive control byte: that many bytes follow verbatim.
    LiteralRun(usize),
    /// Negative control byte: one value repeated `-b` times.
    RepeatRun { count: usize, value: u8 },
    /// Zero control byte: big-endian 16-bit count, then the value.
    ExtendedRun { count: usize, value: u8 },
}

impl RleOp {
    pub fn decode(control: u8, stream: &mut ByteStream) -> Option<Self> {
        let control = control as i8;

        let op = match control {
            1..=i8::MAX => Self::LiteralRun(usize::from(control.unsigned_abs())),
            i8::MIN..=-1 => Self::RepeatRun {
                count: usize::from(control.unsigned_abs()),
                value: stream.read()?,
            },
            0 => Self::ExtendedRun {
                // big endian, unlike every other scalar in these formats
                count: usize::from(stream.read_u16_be()?),
                value: stream.read()?,
            },
        };

        Some(op)
    }
}

/// Decoder for the signed run-length scheme.
#[derive(Debug, Clone)]
pub struct RleDecoder<'a> {
    src: ByteStream<'a>,
    dst: DecodedBuffer,
}

impl<'a> RleDecoder<'a> {
    pub fn new(src: &'a [u8], size: usize) -> Self {
        Self {
            src: ByteStream::new(src),
            dst: DecodedBuffer::new(size),
        }
    }

    pub fn decompress(mut self) -> Vec<u8> {
        while !self.dst.is_full() {
            let Some(control) = self.src.read() else {
                break;
            };

            let Some(op) = RleOp::decode(control, &mut self.src) else {
                log::debug!("rle: truncated operands for control {:#04x}", control);
                break;
            };
            log::trace!("operation: {:?}", op);

            match op {
                RleOp::LiteralRun(count) => {
                    if !self.copy_literal(count) {
                        log::debug!("rle: stream ended inside a literal run");
                        break;
                    }
                }
                RleOp::RepeatRun { count, value } | RleOp::ExtendedRun { count, value } => {
                    self.dst.fill(value, count);
                }
            }
        }

        if !self.dst.is_full() {
            log::debug!(
                "rle: stream exhausted after {} of {} bytes",
                self.dst.position(),
                self.dst.capacity()
            );
        }

        self.dst.into_inner()
    }

    fn copy_literal(&mut self, count: usize) -> bool {
        for _ in 0..count {
            if self.dst.is_full() {
                break;
            }

            let Some(value) = self.src.read() else {
                return false;
            };
            self.dst.push(value);
        }

        true
    }
}

/// Decodes a run-length stream into a buffer of exactly `size` bytes.
pub fn decompress_rle(src: &[u8], size: usize) -> Vec<u8> {
    RleDecoder::new(src, size).decompress()
}
