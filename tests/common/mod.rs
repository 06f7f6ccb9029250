//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Big-endian TIFF with ImageWidth and an optional DateTime, followed by
/// `payload` so distinct payloads give distinct content hashes.
pub fn tiff(date: Option<&str>, payload: &[u8]) -> Vec<u8> {
    let entry_count: u16 = if date.is_some() { 2 } else { 1 };
    let data_offset = 8 + 2 + 12 * entry_count as u32 + 4;

    let mut out = b"MM".to_vec();
    out.extend(42u16.to_be_bytes());
    out.extend(8u32.to_be_bytes());
    out.extend(entry_count.to_be_bytes());

    // ImageWidth, SHORT, inline
    out.extend(256u16.to_be_bytes());
    out.extend(3u16.to_be_bytes());
    out.extend(1u32.to_be_bytes());
    out.extend([0x01, 0x00, 0x00, 0x00]);

    let mut data = Vec::new();
    if let Some(date) = date {
        data.extend(date.as_bytes());
        data.push(0);
        out.extend(306u16.to_be_bytes());
        out.extend(2u16.to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());
        out.extend(data_offset.to_be_bytes());
    }

    out.extend(0u32.to_be_bytes());
    out.extend(data);
    out.extend(payload);
    out
}

/// Write a dated TIFF to `dir/name`
pub fn photo(dir: &Path, name: &str, date: &str, payload: &[u8]) -> PathBuf {
    write(dir, name, &tiff(Some(date), payload))
}

/// Write raw bytes to `dir/name`, creating parent directories
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    path
}

/// Every file below `root`, relative and sorted
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    files.sort();
    files
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}
