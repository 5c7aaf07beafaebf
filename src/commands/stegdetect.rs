//! stegdetect command - render the low bit-planes of an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lsbsteg::{show_lsb, StegoConfig, TracingObserver};

use super::CommandExecutor;

/// Show the n least significant bits of an image.
///
/// Sums the low bits of the color channels of every pixel and scales the
/// result to 0-255. Regions carrying hidden data look like noise. The
/// result is saved next to the input as `<name>_<n>LSBs.<ext>`.
#[derive(Args, Debug)]
pub struct StegDetectCommand {
    /// Path to an image
    #[arg(short, long)]
    pub input: PathBuf,

    /// How many LSBs to display (defaults to the configured LSB count)
    #[arg(short = 'n', long)]
    pub lsb_count: Option<u8>,
}

impl CommandExecutor for StegDetectCommand {
    fn execute(&self, base: &StegoConfig) -> Result<()> {
        let n = self.lsb_count.unwrap_or(base.lsb_count);
        let out = show_lsb(&self.input, n, &mut TracingObserver)
            .with_context(|| format!("Failed to visualize {}", self.input.display()))?;

        println!("{}", out.display());
        Ok(())
    }
}
