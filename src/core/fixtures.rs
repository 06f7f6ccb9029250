//! Synthetic TIFF files for unit tests.

use super::tags::DATE_TIME_TAG;
use std::fs;
use std::path::{Path, PathBuf};

/// A single directory entry value
pub(crate) enum Entry {
    Short(u16),
    Ascii(String),
}

/// Build a little-endian TIFF with one directory per element of `ifds`,
/// chained in order, followed by `payload`.
pub(crate) fn build_tiff(ifds: &[Vec<(u16, Entry)>], payload: &[u8]) -> Vec<u8> {
    let mut out = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];

    for (i, ifd) in ifds.iter().enumerate() {
        let data_start = out.len() + 2 + 12 * ifd.len() + 4;
        let mut data = Vec::new();

        out.extend((ifd.len() as u16).to_le_bytes());
        for (tag, entry) in ifd {
            out.extend(tag.to_le_bytes());
            match entry {
                Entry::Short(value) => {
                    out.extend(3u16.to_le_bytes());
                    out.extend(1u32.to_le_bytes());
                    out.extend(value.to_le_bytes());
                    out.extend([0, 0]);
                }
                Entry::Ascii(text) => {
                    let mut bytes = text.as_bytes().to_vec();
                    bytes.push(0);
                    out.extend(2u16.to_le_bytes());
                    out.extend((bytes.len() as u32).to_le_bytes());
                    if bytes.len() <= 4 {
                        bytes.resize(4, 0);
                        out.extend(bytes);
                    } else {
                        out.extend(((data_start + data.len()) as u32).to_le_bytes());
                        data.extend(bytes);
                        if data.len() % 2 == 1 {
                            data.push(0);
                        }
                    }
                }
            }
        }

        let next = if i + 1 < ifds.len() {
            data_start + data.len()
        } else {
            0
        };
        out.extend((next as u32).to_le_bytes());
        out.extend(data);
    }

    out.extend(payload);
    out
}

pub(crate) fn tiff_with_date(date: &str, payload: &[u8]) -> Vec<u8> {
    build_tiff(
        &[vec![
            (256, Entry::Short(1)),
            (DATE_TIME_TAG, Entry::Ascii(date.to_string())),
        ]],
        payload,
    )
}

pub(crate) fn tiff_without_date(payload: &[u8]) -> Vec<u8> {
    build_tiff(&[vec![(256, Entry::Short(1))]], payload)
}

/// Write `bytes` to `dir/name`, creating parent directories
pub(crate) fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    path
}
