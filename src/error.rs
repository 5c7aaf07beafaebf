//! Error types for embedding, recovery and steganalysis.
//!
//! Every variant is recoverable at the call boundary. Messages carry the
//! parameter values and capacity numbers needed to diagnose the failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while hiding, recovering or analyzing a carrier.
#[derive(Error, Debug)]
pub enum StegoError {
    /// A parameter is outside its valid range.
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The framed payload does not fit in the carrier at the requested bit depth.
    #[error(
        "Payload too large: need {needed_bytes} bytes, carrier holds {capacity_bytes} bytes \
         ({capacity_bits} bits at {lsb_count} LSBs per unit)"
    )]
    CapacityExceeded {
        needed_bytes: usize,
        capacity_bytes: usize,
        capacity_bits: usize,
        lsb_count: u8,
    },

    /// The embedded frame (or requested byte count) asks for more data than the carrier holds.
    #[error("Corrupt frame: {0}")]
    CorruptFrame(String),

    #[error("Carrier not found: {}", .0.display())]
    CarrierNotFound(PathBuf),

    #[error("Unreadable carrier {}: {reason}", path.display())]
    UnreadableCarrier { path: PathBuf, reason: String },

    /// The carrier decodes but uses a sample or pixel format we cannot embed into.
    #[error("Unsupported carrier format: {0}")]
    UnsupportedCarrier(String),

    /// The payload file could not be read.
    #[error("Failed to read payload {}: {source}", path.display())]
    PayloadRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A carrier, recovered payload or derived image could not be written.
    #[error("Failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// No delimiter found by the container-append utility.
    #[error("No hidden data found")]
    NoHiddenData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StegoError {
    /// Shorthand for building an [`StegoError::InvalidParameter`].
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
