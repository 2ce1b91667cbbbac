//! PAK archives: a flat table of `{u32 LE offset, NUL-terminated name}`
//! records ended by a zero offset, followed by the entry data back to back.
//! Sizes are not stored; an entry runs until the next entry's offset, and the
//! last one until the end of the archive.

use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    pub name: String,
    pub offset: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PakArchive {
    entries: Vec<PakEntry>,
}

#[derive(Error, Debug)]
pub enum PakError {
    #[error("Failed to access archive")]
    Io(#[from] std::io::Error),
    #[error("Archive table is truncated")]
    TruncatedTable,
    #[error("Entry {name} has invalid offset {offset:#x}")]
    InvalidOffset { name: String, offset: u32 },
    #[error("Entry {0} already exists in the archive")]
    DuplicateEntry(String),
    #[error("Entry {0} has no data")]
    EmptyEntry(String),
    #[error("Entry name {0:?} cannot be stored or extracted")]
    InvalidName(String),
    #[error("No entry named {0}")]
    NotFound(String),
    #[error("Archive is too large for 32-bit offsets")]
    TooLarge,
}

struct TableReader<'a> {
    data: &'a [u8],
    read_index: usize,
}

impl TableReader<'_> {
    fn read_offset(&mut self) -> Result<u32, PakError> {
        let bytes = self
            .data
            .get(self.read_index..self.read_index + 4)
            .ok_or(PakError::TruncatedTable)?;
        self.read_index += 4;

        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_name(&mut self) -> Result<String, PakError> {
        let rest = &self.data[self.read_index..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(PakError::TruncatedTable)?;
        self.read_index += len + 1;

        Ok(String::from_utf8_lossy(&rest[..len]).into_owned())
    }
}

impl PakArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PakError> {
        let data = fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self, PakError> {
        let mut table = TableReader {
            data,
            read_index: 0,
        };

        let mut records = Vec::new();
        loop {
            let offset = table.read_offset()?;
            if offset == 0 {
                break;
            }

            let name = table.read_name()?;
            records.push((name, offset));
        }
        let table_end = table.read_index;

        let mut entries = Vec::with_capacity(records.len());
        for (i, (name, offset)) in records.iter().enumerate() {
            let start = *offset as usize;
            let end = records
                .get(i + 1)
                .map_or(data.len(), |(_, next)| *next as usize);

            if start < table_end || start > end || end > data.len() {
                return Err(PakError::InvalidOffset {
                    name: name.clone(),
                    offset: *offset,
                });
            }

            log::trace!("entry {} at {:#x}, {} bytes", name, start, end - start);
            entries.push(PakEntry {
                name: name.clone(),
                offset: *offset,
                data: data[start..end].to_vec(),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PakEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Appends an entry and recomputes every offset.
    pub fn add(&mut self, name: &str, data: Vec<u8>) -> Result<(), PakError> {
        if data.is_empty() {
            return Err(PakError::EmptyEntry(name.to_string()));
        }
        if !is_valid_name(name) {
            return Err(PakError::InvalidName(name.to_string()));
        }
        if self.get(name).is_some() {
            return Err(PakError::DuplicateEntry(name.to_string()));
        }

        self.entries.push(PakEntry {
            name: name.to_string(),
            offset: 0,
            data,
        });

        if let Err(err) = self.recalculate_offsets() {
            self.entries.pop();
            return Err(err);
        }

        Ok(())
    }

    fn recalculate_offsets(&mut self) -> Result<(), PakError> {
        // offset + name + NUL per entry, then the zero sentinel
        let table_size: usize = self
            .entries
            .iter()
            .map(|entry| 4 + entry.name.len() + 1)
            .sum::<usize>()
            + 4;

        let mut offsets = Vec::with_capacity(self.entries.len());
        let mut offset = table_size;
        for entry in &self.entries {
            offsets.push(u32::try_from(offset).map_err(|_| PakError::TooLarge)?);
            offset += entry.data.len();
        }
        u32::try_from(offset).map_err(|_| PakError::TooLarge)?;

        for (entry, offset) in self.entries.iter_mut().zip(offsets) {
            entry.offset = offset;
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        for entry in &self.entries {
            buf.extend_from_slice(&entry.offset.to_le_bytes());
            buf.extend_from_slice(entry.name.as_bytes());
            buf.push(0);
        }
        buf.extend_from_slice(&0u32.to_le_bytes());

        for entry in &self.entries {
            buf.extend_from_slice(&entry.data);
        }

        buf
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PakError> {
        fs::write(path.as_ref(), self.to_bytes())?;
        Ok(())
    }

    /// Writes the entry called `name` into `dir`, returning the created path.
    pub fn extract<P: AsRef<Path>>(&self, name: &str, dir: P) -> Result<PathBuf, PakError> {
        let entry = self
            .get(name)
            .ok_or_else(|| PakError::NotFound(name.to_string()))?;

        write_entry(entry, dir.as_ref())
    }

    pub fn extract_all<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, PakError> {
        self.entries
            .iter()
            .map(|entry| write_entry(entry, dir.as_ref()))
            .collect()
    }
}

/// Whether `name` can be used as a single file name inside a directory.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['\0', '/', '\\'])
}

fn write_entry(entry: &PakEntry, dir: &Path) -> Result<PathBuf, PakError> {
    if !is_valid_name(&entry.name) {
        return Err(PakError::InvalidName(entry.name.clone()));
    }

    let path = dir.join(&entry.name);
    fs::write(&path, &entry.data)?;
    log::debug!("Extracted {} ({} bytes)", path.display(), entry.data.len());

    Ok(path)
}
