//! # Tags Module
//!
//! Reads string tags out of a TIFF container's image file directories.
//!
//! Only raw TIFF structures are accepted (`II*\0` or `MM\0*` headers).
//! JPEG, PNG or HEIF files that embed a TIFF block are rejected, as are
//! truncated directories.

use crate::error::TagError;
use std::collections::HashSet;
use std::io::Read;

/// Tag id of the standard TIFF "DateTime" tag
pub const DATE_TIME_TAG: u16 = 306;

/// Longest directory chain `exif::Reader::read_raw` accepts in one call
const DIRECTORIES_PER_DECODE: usize = 8;

/// A decoded TIFF tag directory tree
pub struct TagReader {
    /// Consecutive runs of the directory chain, in file order
    segments: Vec<exif::Exif>,
}

impl TagReader {
    /// Decode a TIFF container from a reader positioned at its first byte.
    ///
    /// The reader is consumed to its end.
    pub fn decode<R: Read>(mut reader: R) -> Result<Self, TagError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Decode a TIFF container held in memory.
    ///
    /// Multi-page files with long directory chains are decoded a run of
    /// directories at a time, each run cut loose from the rest of the
    /// chain.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, TagError> {
        let chain = DirectoryChain::read(&data)?;
        if chain.directories.len() <= DIRECTORIES_PER_DECODE && !chain.looped {
            return Ok(Self {
                segments: vec![read_raw(data)?],
            });
        }

        let segments = chain
            .directories
            .chunks(DIRECTORIES_PER_DECODE)
            .map(|run| read_raw(chain.detach(&data, run)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Find the string value of a tag in any directory.
    ///
    /// The primary image directory is searched first, then the remaining
    /// directories in the order they appear in the file. Returns `None`
    /// when no directory carries the tag as an ASCII value.
    pub fn string_value(&self, tag: u16) -> Option<String> {
        self.segments.iter().find_map(|exif| {
            let mut fields: Vec<&exif::Field> = exif
                .fields()
                .filter(|field| field.tag.number() == tag)
                .collect();
            fields.sort_by_key(|field| field.ifd_num.index());
            fields.into_iter().find_map(|field| ascii_value(&field.value))
        })
    }

    /// The raw capture timestamp (tag 306), if present
    pub fn date_time(&self) -> Option<String> {
        self.string_value(DATE_TIME_TAG)
    }

    /// Number of tag entries decoded across all directories
    pub fn field_count(&self) -> usize {
        self.segments.iter().map(|exif| exif.fields().len()).sum()
    }
}

fn read_raw(data: Vec<u8>) -> Result<exif::Exif, TagError> {
    exif::Reader::new()
        .read_raw(data)
        .map_err(|e| TagError::Format {
            reason: e.to_string(),
        })
}

fn ascii_value(value: &exif::Value) -> Option<String> {
    if let exif::Value::Ascii(ref vec) = value {
        let bytes = vec.first()?;
        let s = std::str::from_utf8(bytes).ok()?;
        return Some(s.trim_end_matches('\0').trim().to_string());
    }
    None
}

#[derive(Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn u16_at(self, data: &[u8], at: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(at..at.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        })
    }

    fn u32_at(self, data: &[u8], at: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(at..at.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        })
    }

    fn put_u32(self, data: &mut [u8], at: usize, value: u32) {
        let bytes = match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        if let Some(slot) = data.get_mut(at..at + 4) {
            slot.copy_from_slice(&bytes);
        }
    }
}

/// One image file directory in the top-level chain
#[derive(Clone, Copy)]
struct Directory {
    offset: usize,
    /// Position of the directory's next-directory pointer
    next_at: usize,
}

/// The top-level directory chain, located without decoding any entries
struct DirectoryChain {
    order: ByteOrder,
    directories: Vec<Directory>,
    /// The chain points back at a directory already listed
    looped: bool,
}

impl DirectoryChain {
    fn read(data: &[u8]) -> Result<Self, TagError> {
        let order = match data.get(..4) {
            Some([b'I', b'I', 42, 0]) => ByteOrder::Little,
            Some([b'M', b'M', 0, 42]) => ByteOrder::Big,
            _ => return Err(format_error("missing TIFF header")),
        };

        let mut offset = order
            .u32_at(data, 4)
            .ok_or_else(|| format_error("truncated header"))? as usize;
        let mut directories = Vec::new();
        let mut seen = HashSet::new();
        let mut looped = false;

        while offset != 0 {
            if !seen.insert(offset) {
                looped = true;
                break;
            }
            let truncated = || format_error(&format!("truncated directory at offset {}", offset));
            let count = order.u16_at(data, offset).ok_or_else(truncated)?;
            let next_at = offset + 2 + 12 * count as usize;
            let next = order.u32_at(data, next_at).ok_or_else(truncated)?;

            directories.push(Directory { offset, next_at });
            offset = next as usize;
        }

        if directories.is_empty() {
            return Err(format_error("no image file directory"));
        }

        Ok(Self {
            order,
            directories,
            looped,
        })
    }

    /// Copy of `data` whose chain is exactly `run`
    fn detach(&self, data: &[u8], run: &[Directory]) -> Vec<u8> {
        let mut data = data.to_vec();
        if let (Some(first), Some(last)) = (run.first(), run.last()) {
            self.order.put_u32(&mut data, 4, first.offset as u32);
            self.order.put_u32(&mut data, last.next_at, 0);
        }
        data
    }
}

fn format_error(reason: &str) -> TagError {
    TagError::Format {
        reason: reason.to_string(),
    }
}
