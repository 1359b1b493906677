/// Input reading for the binary: OCR text, captures, registries and settings.
///
/// Every input is read through one size cap and must be UTF-8.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::PathOrStdin;
use crate::error::CliError;

/// Reads `source` (a file or `-`) into a `String`.
///
/// # Errors
///
/// Returns a [`CliError`] with exit code 2 when the input is missing,
/// unreadable, larger than `max_size` bytes, or not UTF-8.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => {
            let stdin = std::io::stdin();
            let bytes = read_capped(stdin.lock(), max_size).map_err(|e| {
                CliError::StdinReadError {
                    detail: e.to_string(),
                }
            })?;
            let bytes = bytes.ok_or_else(|| CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            })?;
            into_text(bytes, "-")
        }
    }
}

/// Label for `source` in messages: the path, or `-` for stdin.
pub fn source_label(source: &PathOrStdin) -> String {
    match source {
        PathOrStdin::Path(path) => path.display().to_string(),
        PathOrStdin::Stdin => "-".to_owned(),
    }
}

/// Reads the file at `path` into a `String`.
///
/// The metadata length is checked first so an oversized file is refused
/// before any of it is read.
///
/// # Errors
///
/// Same as [`read_input`].
pub fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let label = path.display().to_string();
    let too_large = |actual| CliError::FileTooLarge {
        source: label.clone(),
        limit: max_size,
        actual,
    };

    let file = File::open(path).map_err(|e| open_error(&e, path))?;
    let len = file.metadata().map_err(|e| open_error(&e, path))?.len();
    if len > max_size {
        return Err(too_large(Some(len)));
    }
    // The file can grow between the metadata call and the read.
    let bytes = read_capped(file, max_size)
        .map_err(|e| open_error(&e, path))?
        .ok_or_else(|| too_large(None))?;
    into_text(bytes, &label)
}

/// Reads at most `max_size` bytes from `reader`.
///
/// Returns `Ok(None)` when the stream holds more than `max_size` bytes.
fn read_capped<R: Read>(reader: R, max_size: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader
        .take(max_size.saturating_add(1))
        .read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_size {
        return Ok(None);
    }
    Ok(Some(bytes))
}

fn open_error(e: &std::io::Error, path: &Path) -> CliError {
    let kind = e.kind();
    if kind == std::io::ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == std::io::ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}

/// Converts `bytes` to text, reporting where invalid UTF-8 starts.
fn into_text(bytes: Vec<u8>, label: &str) -> Result<String, CliError> {
    String::from_utf8(bytes).map_err(|e| CliError::InvalidUtf8 {
        source: label.to_owned(),
        byte_offset: e.utf8_error().valid_up_to(),
    })
}
