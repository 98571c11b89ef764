//! Safe source file reading.
//!
//! Size limit, quick binary detection and lossy UTF-8 decoding, so a stray
//! asset in a source tree fails fast instead of reaching the parser.

use std::fs;
use std::io::Read;
use std::path::Path;

use memchr::memchr;

use crate::error::EditError;

/// Default size limit for a single source file (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Bytes scanned for NUL when detecting binary content.
const BINARY_PROBE_LEN: usize = 8192;

/// Read a source file as text.
///
/// # Errors
/// - `EditError::NotFound` if the path cannot be stat'ed
/// - `EditError::TooLarge` if it exceeds `max_bytes`
/// - `EditError::BinaryFile` if the first 8KB contain a NUL byte
/// - `EditError::Io` on read failure
pub fn read_source<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<String, EditError> {
    let path = path.as_ref();

    let metadata =
        fs::metadata(path).map_err(|_| EditError::NotFound(path.to_string_lossy().to_string()))?;

    if metadata.len() > max_bytes {
        return Err(EditError::TooLarge(metadata.len(), max_bytes));
    }

    let mut file = fs::File::open(path)?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    file.read_to_end(&mut buffer)?;

    decode_buffer(buffer)
}

/// NUL byte in the first 8KB.
#[must_use]
pub fn is_binary(buffer: &[u8]) -> bool {
    let probe = buffer.len().min(BINARY_PROBE_LEN);
    memchr(0, &buffer[..probe]).is_some()
}

/// Decode bytes, replacing invalid UTF-8 sequences with U+FFFD.
fn decode_buffer(buffer: Vec<u8>) -> Result<String, EditError> {
    if is_binary(&buffer) {
        return Err(EditError::BinaryFile);
    }
    match String::from_utf8(buffer) {
        Ok(s) => Ok(s),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
