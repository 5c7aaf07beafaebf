//! wavsteg command - hide or recover a payload in a WAV file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use lsbsteg::{analysis, hide_data, recover_data, StegoConfig, TracingObserver};

use super::steglsb::print_analysis;
use super::{merge_config, CommandExecutor};

/// Hide or recover data in and from a sound file.
///
/// WAV carriers store no length. Note the byte count printed by --hide;
/// --recover needs it back through -b.
///
/// Examples:
///   lsbsteg wavsteg --hide -i song.wav -s msg.txt -o song-steg.wav -n 2
///   lsbsteg wavsteg --recover -i song-steg.wav -o msg.txt -n 2 -b 22
#[derive(Args, Debug)]
pub struct WavStegCommand {
    /// Hide the secret file in the sound file
    #[arg(long, conflicts_with = "recover")]
    pub hide: bool,

    /// Recover hidden data from the sound file
    #[arg(short, long)]
    pub recover: bool,

    /// Print how much data the sound file can hold
    #[arg(short, long)]
    pub analyze: bool,

    /// Path to a .wav file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the file to hide
    #[arg(short, long)]
    pub secret: Option<PathBuf>,

    /// Path to the output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How many low bits of each sample to use (1-8)
    #[arg(short = 'n', long)]
    pub lsb_count: Option<u8>,

    /// Number of bytes to recover
    #[arg(short, long)]
    pub bytes: Option<usize>,
}

impl CommandExecutor for WavStegCommand {
    fn execute(&self, base: &StegoConfig) -> Result<()> {
        if !self.hide && !self.recover && !self.analyze {
            bail!("Nothing to do. Use --hide, --recover or --analyze");
        }
        // Audio payloads are stored raw regardless of the configured level
        let config = merge_config(base, self.lsb_count, Some(0))?;
        let mut observer = TracingObserver;

        if self.analyze {
            let Some(secret) = &self.secret else {
                bail!("--analyze needs a secret file (-s)");
            };
            let report = analysis(&self.input, secret, &config, &mut observer)
                .context("Failed to analyze carrier")?;
            print_analysis(&report);
        }

        if self.hide {
            let (Some(secret), Some(output)) = (&self.secret, &self.output) else {
                bail!("--hide needs a secret file (-s) and an output file (-o)");
            };
            let report = hide_data(&self.input, secret, output, &config, &mut observer)
                .context("Failed to hide data")?;

            eprintln!("Hidden {} bytes in {}", report.payload_bytes, output.display());
            eprintln!("  Recover with: -b {}", report.payload_bytes);
        } else if self.recover {
            let Some(output) = &self.output else {
                bail!("--recover needs an output file (-o)");
            };
            let Some(bytes) = self.bytes else {
                bail!("--recover needs the number of hidden bytes (-b)");
            };
            let written = recover_data(&self.input, output, &config, Some(bytes), &mut observer)
                .context("Failed to recover data")?;
            eprintln!("Recovered {} bytes to {}", written, output.display());
        }

        Ok(())
    }
}
