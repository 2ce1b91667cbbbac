/// Read cursor over a compressed payload.
///
/// Every read is bounds checked and reports exhaustion with `None` instead of
/// panicking, so the decoders can stop on short input and keep what they have.
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    src: &'a [u8],
    read_index: usize,
}

impl<'a> ByteStream<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, read_index: 0 }
    }

    pub fn position(&self) -> usize {
        self.read_index
    }

    pub fn remaining(&self) -> usize {
        self.src.len() - self.read_index
    }

    pub fn is_exhausted(&self) -> bool {
        self.read_index >= self.src.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.read_index).copied()
    }

    pub fn read(&mut self) -> Option<u8> {
        let value = self.peek()?;
        self.read_index += 1;
        Some(value)
    }

    fn read_pair(&mut self) -> Option<[u8; 2]> {
        let pair = self.src.get(self.read_index..self.read_index + 2)?;
        self.read_index += 2;
        Some([pair[0], pair[1]])
    }

    pub fn read_u16_le(&mut self) -> Option<u16> {
        self.read_pair().map(u16::from_le_bytes)
    }

    pub fn read_u16_be(&mut self) -> Option<u16> {
        self.read_pair().map(u16::from_be_bytes)
    }
}
