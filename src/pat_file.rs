#![cfg(feature = "host")]

//! Reading and writing `.pat` files.
//!
//! Headers do not store pattern ids; a pattern's id is its file name,
//! `pat0001.pat` for id 1, which is how controllers address patterns on SD cards.

use crate::arena::{ArenaGeometry, Generation};
use crate::header::HeaderVersion;
use crate::pattern::Pattern;
use crate::pattern_codec::{self, DecodedPattern};
use std::error::Error;
use std::path::{Path, PathBuf};

const PREFIX: &str = "pat";
const EXTENSION: &str = "pat";

/// File name for `pattern_id`: `pat` followed by at least four digits, `.pat` extension.
///
/// ```rust
/// use arena_pattern::pat_file::pattern_file_name;
///
/// assert_eq!(pattern_file_name(1), "pat0001.pat");
/// assert_eq!(pattern_file_name(12345), "pat12345.pat");
/// ```
#[must_use]
pub fn pattern_file_name(pattern_id: u16) -> String {
    format!("{PREFIX}{pattern_id:04}.{EXTENSION}")
}

/// Pattern id encoded in a file name, or `None` if the name does not follow
/// [`pattern_file_name`].
#[must_use]
pub fn pattern_id_from_path(path: impl AsRef<Path>) -> Option<u16> {
    let path = path.as_ref();
    if path.extension()?.to_str()? != EXTENSION {
        return None;
    }
    let digits = path.file_stem()?.to_str()?.strip_prefix(PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Encode `pattern` and write it into `dir` under its pattern id's file name.
///
/// Returns the path written.
///
/// # Errors
///
/// Fails if the pattern id is 0 (unspecified), if encoding fails, or on I/O errors.
pub fn write_pattern_file(
    dir: impl AsRef<Path>,
    pattern: &Pattern,
    geometry: &ArenaGeometry,
    version: HeaderVersion,
) -> Result<PathBuf, Box<dyn Error>> {
    if pattern.pattern_id() == 0 {
        return Err("pattern_id 0 is unspecified; cannot name the file".into());
    }
    let bytes = pattern_codec::encode(pattern, geometry, version)?;
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(pattern_file_name(pattern.pattern_id()));
    std::fs::write(&path, &bytes)?;
    println!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

/// Read and decode a `.pat` file, restoring `pattern_id` from its file name.
///
/// # Errors
///
/// Fails on I/O errors and on any [`pattern_codec::decode`] error.
pub fn read_pattern_file(
    path: impl AsRef<Path>,
    expected: Option<Generation>,
) -> Result<DecodedPattern, Box<dyn Error>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let mut decoded = pattern_codec::decode(&bytes, expected)?;
    if let Some(pattern_id) = pattern_id_from_path(path) {
        decoded.pattern = decoded.pattern.with_pattern_id(pattern_id);
    }
    Ok(decoded)
}
