//! Per-call configuration.
//!
//! One [`StegoConfig`] is built per operation (from defaults, a TOML file or
//! CLI flags), validated once, and passed by reference to the engines.
//!
//! ```toml
//! lsb_count = 2
//! compression_level = 6
//! block_size = 8
//! threshold_multiplier = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::codec::compression::MAX_LEVEL;
use crate::codec::LsbCount;
use crate::error::StegoError;

/// Default number of LSBs per carrier unit.
pub const DEFAULT_LSB_COUNT: u8 = 2;

/// Default compression level (0 = store raw).
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 0;

/// Default side length of entropy blocks, in pixels.
pub const DEFAULT_BLOCK_SIZE: u32 = 8;

/// Default anomaly threshold, in standard deviations.
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 2.0;

/// Parameters shared by the embedding engines and the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Bits of each carrier unit used, 1..=8.
    pub lsb_count: u8,

    /// zlib level for the payload, 0 (raw) to 9.
    pub compression_level: u8,

    /// Side length of the square blocks scanned by the entropy detector.
    pub block_size: u32,

    /// Blocks further than this many standard deviations from the mean are anomalous.
    pub threshold_multiplier: f64,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            lsb_count: DEFAULT_LSB_COUNT,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            block_size: DEFAULT_BLOCK_SIZE,
            threshold_multiplier: DEFAULT_THRESHOLD_MULTIPLIER,
        }
    }
}

impl StegoConfig {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), StegoError> {
        LsbCount::new(self.lsb_count)?;
        if self.compression_level > MAX_LEVEL {
            return Err(StegoError::invalid(
                "compression_level",
                self.compression_level,
                format!("must be between 0 and {MAX_LEVEL}"),
            ));
        }
        validate_block_size(self.block_size)?;
        validate_threshold(self.threshold_multiplier)?;
        Ok(())
    }

    pub fn lsb(&self) -> Result<LsbCount, StegoError> {
        LsbCount::new(self.lsb_count)
    }

    /// The subset of the config used when hiding.
    pub fn embedding(&self) -> Result<EmbeddingParams, StegoError> {
        EmbeddingParams::new(self.lsb_count, self.compression_level)
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, StegoError> {
        let config: StegoConfig =
            toml::from_str(content).map_err(|e| StegoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StegoError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| StegoError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, StegoError> {
        toml::to_string_pretty(self).map_err(|e| StegoError::Config(e.to_string()))
    }
}

/// Validated parameters for one embedding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingParams {
    pub lsb_count: LsbCount,
    pub compression_level: u8,
}

impl EmbeddingParams {
    pub fn new(lsb_count: u8, compression_level: u8) -> Result<Self, StegoError> {
        let lsb_count = LsbCount::new(lsb_count)?;
        if compression_level > MAX_LEVEL {
            return Err(StegoError::invalid(
                "compression_level",
                compression_level,
                format!("must be between 0 and {MAX_LEVEL}"),
            ));
        }
        Ok(Self {
            lsb_count,
            compression_level,
        })
    }

    /// Raw (uncompressed) embedding at `lsb_count`.
    pub fn raw(lsb_count: LsbCount) -> Self {
        Self {
            lsb_count,
            compression_level: 0,
        }
    }
}

pub(crate) fn validate_block_size(block_size: u32) -> Result<(), StegoError> {
    if block_size == 0 {
        return Err(StegoError::invalid(
            "block_size",
            block_size,
            "must be at least 1",
        ));
    }
    Ok(())
}

pub(crate) fn validate_threshold(multiplier: f64) -> Result<(), StegoError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(StegoError::invalid(
            "threshold_multiplier",
            multiplier,
            "must be a positive finite number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = StegoConfig::default();
        assert_eq!(config.lsb_count, 2);
        assert_eq!(config.compression_level, 0);
        assert_eq!(config.block_size, 8);
        assert_eq!(config.threshold_multiplier, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StegoConfig::from_toml_str("lsb_count = 4\n").unwrap();
        assert_eq!(config.lsb_count, 4);
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for doc in [
            "lsb_count = 0",
            "lsb_count = 9",
            "compression_level = 10",
            "block_size = 0",
            "threshold_multiplier = -1.0",
            "threshold_multiplier = 0.0",
        ] {
            assert!(
                matches!(
                    StegoConfig::from_toml_str(doc),
                    Err(StegoError::InvalidParameter { .. })
                ),
                "{doc} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            StegoConfig::from_toml_str("lsb_count = \"two\""),
            Err(StegoError::Config(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lsbsteg.toml");

        let config = StegoConfig {
            lsb_count: 3,
            compression_level: 9,
            block_size: 16,
            threshold_multiplier: 2.5,
        };
        fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(StegoConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_embedding_params() {
        let params = StegoConfig::default().embedding().unwrap();
        assert_eq!(params.lsb_count.get(), 2);
        assert_eq!(params.compression_level, 0);
        assert!(EmbeddingParams::new(2, 12).is_err());
    }
}
