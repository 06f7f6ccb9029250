//! # Metadata Module
//!
//! Extracts the import record for a single TIFF file.
//!
//! ## Extracted Fields
//! - Capture date (tag 306, `YYYY:MM:DD HH:MM:SS`) as `YYYYMMDD`
//! - SHA-256 of the whole file, lowercase hex
//!
//! The hash covers the raw bytes exactly as they are on disk, so a renamed
//! or relocated copy of a photo always maps to the same record identity.

use crate::core::tags::TagReader;
use crate::error::{ExtractError, TagError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Layout of the capture timestamp inside the DateTime tag
pub const RAW_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Layout of the date bucket derived from the capture timestamp
pub const DATE_BUCKET_FORMAT: &str = "%Y%m%d";

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Import record for one photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    file_path: PathBuf,
    date: String,
    hash: String,
}

impl Metadata {
    pub fn new(file_path: PathBuf, date: String, hash: String) -> Self {
        Self {
            file_path,
            date,
            hash,
        }
    }

    /// Where the photo was discovered
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Capture date as `YYYYMMDD`
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Lowercase hex SHA-256 of the file contents
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Lowercased extension of the source file, including the dot.
    ///
    /// Taken from the last `.` of the file name, so a bare `.TIF` maps to
    /// `.tif` and `photo.` to `.`. Empty when the name has no dot. Names
    /// that are not valid UTF-8 are converted lossily.
    pub fn extension(&self) -> String {
        let name = self
            .file_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        name.rfind('.')
            .map(|dot| name[dot..].to_lowercase())
            .unwrap_or_default()
    }

    /// Content-addressed name the photo is stored under
    pub fn new_file_name(&self) -> String {
        format!("{}{}", self.hash, self.extension())
    }
}

/// Extract the import record for the file at `path`
pub fn extract_metadata(path: &Path) -> Result<Metadata, ExtractError> {
    let mut file = File::open(path).map_err(|source| ExtractError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let tags = TagReader::decode(&mut file).map_err(|e| match e {
        TagError::Io(source) => ExtractError::Read {
            path: path.to_path_buf(),
            source,
        },
        TagError::Format { reason } => ExtractError::NotATiff {
            path: path.to_path_buf(),
            reason,
        },
    })?;

    let raw = tags.date_time().ok_or_else(|| ExtractError::TagNotFound {
        path: path.to_path_buf(),
    })?;

    let taken = parse_capture_time(&raw).map_err(|source| ExtractError::BadTimestamp {
        path: path.to_path_buf(),
        value: raw.clone(),
        source,
    })?;

    // Decoding consumed the stream; hash from the first byte again.
    let hash = file
        .seek(SeekFrom::Start(0))
        .and_then(|_| hash_reader(&mut file))
        .map_err(|source| ExtractError::Hash {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Metadata::new(
        path.to_path_buf(),
        taken.format(DATE_BUCKET_FORMAT).to_string(),
        hash,
    ))
}

/// Parse a DateTime tag value (`YYYY:MM:DD HH:MM:SS`, no timezone)
pub fn parse_capture_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, RAW_TIME_FORMAT)
}

/// SHA-256 over everything left in `reader`, as lowercase hex
pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{build_tiff, tiff_with_date, tiff_without_date, write_file, Entry};
    use crate::core::tags::DATE_TIME_TAG;
    use tempfile::TempDir;

    // SHA-256 of the empty input
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn new_file_name_lowercases_extension() {
        let meta = Metadata::new(
            PathBuf::from("/photos/photo.TIF"),
            "20200101".to_string(),
            "abc123".to_string(),
        );
        assert_eq!(meta.new_file_name(), "abc123.tif");
    }

    #[test]
    fn new_file_name_without_extension_is_bare_hash() {
        let meta = Metadata::new(
            PathBuf::from("/photos/scan"),
            "20200101".to_string(),
            "abc123".to_string(),
        );
        assert_eq!(meta.new_file_name(), "abc123");
    }

    #[test]
    fn extension_of_dotfile_is_whole_name() {
        let meta = Metadata::new(
            PathBuf::from("/photos/.TIF"),
            "20200101".to_string(),
            "abc123".to_string(),
        );
        assert_eq!(meta.extension(), ".tif");
        assert_eq!(meta.new_file_name(), "abc123.tif");
    }

    #[test]
    fn extension_uses_last_dot_only() {
        let name = |path: &str| {
            Metadata::new(PathBuf::from(path), "20200101".to_string(), "h".to_string())
                .new_file_name()
        };
        assert_eq!(name("/photos/roll.01.Tiff"), "h.tiff");
        assert_eq!(name("/photos/trailing."), "h.");
        assert_eq!(name("/photos.d/scan"), "h");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_extension_is_converted_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/photos").join(OsStr::from_bytes(b"scan.T\xFFF"));
        let meta = Metadata::new(path, "20200101".to_string(), "abc123".to_string());

        assert_eq!(meta.extension(), ".t\u{fffd}f");
    }

    #[test]
    fn hash_reader_matches_known_digest() {
        let mut empty: &[u8] = &[];
        assert_eq!(hash_reader(&mut empty).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn parse_capture_time_rejects_other_layouts() {
        assert!(parse_capture_time("2020:01:01 12:00:00").is_ok());
        assert!(parse_capture_time("2020-01-01 12:00:00").is_err());
        assert!(parse_capture_time("2020:01:01").is_err());
        assert!(parse_capture_time("    :  :     :  :  ").is_err());
    }

    #[test]
    fn extracts_date_and_whole_file_hash() {
        let dir = TempDir::new().unwrap();
        let bytes = tiff_with_date("2021:06:15 09:30:00", b"payload");
        let path = write_file(dir.path(), "IMG_0001.TIFF", &bytes);

        let meta = extract_metadata(&path).unwrap();

        assert_eq!(meta.date(), "20210615");
        assert_eq!(meta.hash(), hash_reader(&mut bytes.as_slice()).unwrap());
        assert_eq!(meta.file_path(), path.as_path());
        assert!(meta.new_file_name().ends_with(".tiff"));
    }

    #[test]
    fn multi_page_scan_is_extracted() {
        let dir = TempDir::new().unwrap();
        let mut ifds: Vec<Vec<(u16, Entry)>> =
            (0..9).map(|_| vec![(256, Entry::Short(2480))]).collect();
        ifds[0].push((DATE_TIME_TAG, Entry::Ascii("2020:01:01 12:00:00".to_string())));
        let path = write_file(dir.path(), "scan9.tif", &build_tiff(&ifds, b"pages"));

        let meta = extract_metadata(&path).unwrap();

        assert_eq!(meta.date(), "20200101");
    }

    #[test]
    fn hash_is_invariant_under_rename() {
        let dir = TempDir::new().unwrap();
        let bytes = tiff_with_date("2020:01:01 12:00:00", b"same bytes");
        let original = write_file(dir.path(), "a/1.tif", &bytes);
        let renamed = write_file(dir.path(), "elsewhere/renamed.TIF", &bytes);

        let first = extract_metadata(&original).unwrap();
        let second = extract_metadata(&renamed).unwrap();

        assert_eq!(first.hash(), second.hash());
        assert_eq!(first.new_file_name(), second.new_file_name());
    }

    #[test]
    fn missing_date_tag_is_skippable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "nodate.tif", &tiff_without_date(b"x"));

        let err = extract_metadata(&path).unwrap_err();

        assert!(matches!(err, ExtractError::TagNotFound { .. }));
        assert!(err.is_skippable());
    }

    #[test]
    fn malformed_date_is_skippable() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "baddate.tif",
            &tiff_with_date("2020/01/01 12:00:00", b"x"),
        );

        let err = extract_metadata(&path).unwrap_err();

        assert!(matches!(err, ExtractError::BadTimestamp { .. }));
        assert!(err.is_skippable());
    }

    #[test]
    fn zero_byte_file_is_not_a_tiff() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "empty.tif", b"");

        let err = extract_metadata(&path).unwrap_err();

        assert!(matches!(err, ExtractError::NotATiff { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn read_failure_is_a_filesystem_error() {
        // Opening a directory succeeds on unix; reading it does not
        let dir = TempDir::new().unwrap();

        let err = extract_metadata(dir.path()).unwrap_err();

        assert!(matches!(err, ExtractError::Read { .. }));
        assert!(!err.is_skippable());
    }

    #[test]
    fn nonexistent_file_is_open_error() {
        let err = extract_metadata(Path::new("/nonexistent/photo.tif")).unwrap_err();
        assert!(matches!(err, ExtractError::Open { .. }));
        assert!(!err.is_skippable());
    }
}
