//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! Commands only parse flags and print; all work happens in `lsbsteg::ops`.

mod append;
mod entropy;
mod stegdetect;
mod steglsb;
mod wavsteg;

pub use append::AppendCommand;
pub use entropy::EntropyCommand;
pub use stegdetect::StegDetectCommand;
pub use steglsb::StegLsbCommand;
pub use wavsteg::WavStegCommand;

use anyhow::Result;
use lsbsteg::StegoConfig;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic. `base` is the configuration
/// loaded from `--config` (or the defaults); flags given on the command
/// line override it.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, base: &StegoConfig) -> Result<()>;
}

/// Applies per-command overrides and validates the result.
pub(crate) fn merge_config(
    base: &StegoConfig,
    lsb_count: Option<u8>,
    compression_level: Option<u8>,
) -> Result<StegoConfig> {
    let mut config = base.clone();
    if let Some(n) = lsb_count {
        config.lsb_count = n;
    }
    if let Some(level) = compression_level {
        config.compression_level = level;
    }
    config.validate()?;
    Ok(config)
}
