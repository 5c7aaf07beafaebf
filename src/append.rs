//! Container-append hiding.
//!
//! Appends a delimiter and the raw payload to the end of any container file
//! (typically MP3, which players stop reading at the last frame). There is no
//! bit-level encoding and no capacity limit; anyone who looks past the end of
//! the container will see the payload. None of the LSB invariants apply.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::StegoError;

/// Marks where the appended payload starts.
pub const DELIMITER: &[u8] = b"--HIDDEN-DATA-START--";

/// Returns `container` followed by [`DELIMITER`] and `payload`.
pub fn attach(container: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(container.len() + DELIMITER.len() + payload.len());
    out.extend_from_slice(container);
    out.extend_from_slice(DELIMITER);
    out.extend_from_slice(payload);
    out
}

/// Returns everything after the first [`DELIMITER`].
pub fn detach(bytes: &[u8]) -> Result<&[u8], StegoError> {
    bytes
        .windows(DELIMITER.len())
        .position(|w| w == DELIMITER)
        .map(|pos| &bytes[pos + DELIMITER.len()..])
        .ok_or(StegoError::NoHiddenData)
}

/// File wrapper around [`attach`].
pub fn attach_file(container_in: &Path, payload_in: &Path, out: &Path) -> Result<(), StegoError> {
    let container = read_input(container_in)?;
    let payload = fs::read(payload_in).map_err(|source| StegoError::PayloadRead {
        path: payload_in.to_path_buf(),
        source,
    })?;

    fs::write(out, attach(&container, &payload)).map_err(|e| StegoError::WriteFailed {
        path: out.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(payload_bytes = payload.len(), out = %out.display(), "appended payload");
    Ok(())
}

/// File wrapper around [`detach`]. Returns the number of bytes written.
pub fn detach_file(container_in: &Path, payload_out: &Path) -> Result<usize, StegoError> {
    let bytes = read_input(container_in)?;
    let payload = detach(&bytes)?;

    fs::write(payload_out, payload).map_err(|e| StegoError::WriteFailed {
        path: payload_out.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(payload.len())
}

fn read_input(path: &Path) -> Result<Vec<u8>, StegoError> {
    if !path.exists() {
        return Err(StegoError::CarrierNotFound(path.to_path_buf()));
    }
    fs::read(path).map_err(|e| StegoError::UnreadableCarrier {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
