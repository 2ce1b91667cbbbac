/// Fixed-size output of a decode call.
///
/// Allocated once at the requested size and zero filled. Writes past the end
/// are dropped, so a decoder only has to check [`DecodedBuffer::is_full`] to
/// know when to stop.
#[derive(Debug, Clone)]
pub struct DecodedBuffer {
    dst: Vec<u8>,
    write_index: usize,
}

impl DecodedBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            dst: vec![0; size],
            write_index: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.write_index
    }

    pub fn capacity(&self) -> usize {
        self.dst.len()
    }

    pub fn is_full(&self) -> bool {
        self.write_index >= self.dst.len()
    }

    /// Returns `false` if the buffer was already full.
    pub fn push(&mut self, value: u8) -> bool {
        match self.dst.get_mut(self.write_index) {
            Some(slot) => {
                *slot = value;
                self.write_index += 1;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, value: u8, count: usize) {
        let end = self.write_index.saturating_add(count).min(self.dst.len());
        self.dst[self.write_index..end].fill(value);
        self.write_index = end;
    }

    /// Copies `count` bytes starting at `source` to the write position, one
    /// byte at a time. The ranges may overlap: bytes written by this call are
    /// read back once `source` catches up with them, which repeats the last
    /// `write_index - source` bytes.
    ///
    /// Returns `false` without writing anything if `source` is not behind the
    /// write position.
    pub fn copy_back(&mut self, mut source: usize, count: usize) -> bool {
        if source >= self.write_index {
            return false;
        }

        for _ in 0..count {
            let Some(&value) = self.dst.get(source) else {
                break;
            };
            if !self.push(value) {
                break;
            }
            source += 1;
        }

        true
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.dst
    }
}
