//! append command - attach a payload past the end of a container file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use lsbsteg::append::{attach_file, detach_file};
use lsbsteg::StegoConfig;

use super::CommandExecutor;

/// Append or reveal data at the end of a container (e.g. MP3).
///
/// No bit-level hiding: anyone who inspects the file tail sees the payload.
#[derive(Args, Debug)]
pub struct AppendCommand {
    /// Append the secret file to the container
    #[arg(long, conflicts_with = "reveal")]
    pub hide: bool,

    /// Extract the appended data
    #[arg(short, long)]
    pub reveal: bool,

    /// Path to the container file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the file to append
    #[arg(short, long)]
    pub secret: Option<PathBuf>,

    /// Path to the output file
    #[arg(short, long)]
    pub output: PathBuf,
}

impl CommandExecutor for AppendCommand {
    fn execute(&self, _base: &StegoConfig) -> Result<()> {
        if self.hide {
            let Some(secret) = &self.secret else {
                bail!("--hide needs a secret file (-s)");
            };
            attach_file(&self.input, secret, &self.output)
                .context("Failed to append data")?;
            eprintln!("Appended {} to {}", secret.display(), self.output.display());
        } else if self.reveal {
            let bytes = detach_file(&self.input, &self.output)
                .context("Failed to reveal data")?;
            eprintln!("Revealed {} bytes to {}", bytes, self.output.display());
        } else {
            bail!("Nothing to do. Use --hide or --reveal");
        }
        Ok(())
    }
}
