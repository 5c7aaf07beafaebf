//! steglsb command - hide, recover or size a payload in an image carrier.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use lsbsteg::{analysis, hide_data, recover_data, PayloadAnalysis, StegoConfig, TracingObserver};

use super::{merge_config, CommandExecutor};

/// Hide or recover data in and from an image.
///
/// The carrier must be lossless (PNG, BMP or TIFF). Hidden data carries
/// its own length, so recovery only needs the same LSB count.
///
/// Examples:
///   lsbsteg steglsb --hide -i cover.png -s msg.txt -o cover-steg.png -n 2
///   lsbsteg steglsb --recover -i cover-steg.png -o msg.txt -n 2
///   lsbsteg steglsb --analyze -i cover.png -s msg.txt
#[derive(Args, Debug)]
pub struct StegLsbCommand {
    /// Hide the secret file in the image
    #[arg(long, conflicts_with = "recover")]
    pub hide: bool,

    /// Recover hidden data from the image
    #[arg(short, long)]
    pub recover: bool,

    /// Print how much data the image can hold and whether the secret fits
    #[arg(short, long)]
    pub analyze: bool,

    /// Path to the carrier image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the file to hide (required for --hide and --analyze)
    #[arg(short, long)]
    pub secret: Option<PathBuf>,

    /// Path to the output file (stego image for --hide, payload for --recover)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How many low bits of each channel to use (1-8)
    #[arg(short = 'n', long)]
    pub lsb_count: Option<u8>,

    /// zlib level for the payload: 0 stores it raw, 1 (fast) to 9 (small)
    #[arg(short, long)]
    pub compression: Option<u8>,
}

impl CommandExecutor for StegLsbCommand {
    fn execute(&self, base: &StegoConfig) -> Result<()> {
        if !self.hide && !self.recover && !self.analyze {
            bail!("Nothing to do. Use --hide, --recover or --analyze");
        }
        let config = merge_config(base, self.lsb_count, self.compression)?;
        let mut observer = TracingObserver;

        if self.analyze {
            let secret = self.require_secret("--analyze")?;
            let report = analysis(&self.input, secret, &config, &mut observer)
                .context("Failed to analyze carrier")?;
            print_analysis(&report);
        }

        if self.hide {
            let secret = self.require_secret("--hide")?;
            let output = self.require_output("--hide")?;
            let report = hide_data(&self.input, secret, output, &config, &mut observer)
                .context("Failed to hide data")?;

            eprintln!(
                "Hidden {} bytes in {} ({:.1}% of capacity)",
                report.payload_bytes,
                output.display(),
                report.usage() * 100.0
            );
            if report.compressed {
                eprintln!("  Compressed to {} bytes", report.body_bytes);
            }
        } else if self.recover {
            let output = self.require_output("--recover")?;
            let bytes = recover_data(&self.input, output, &config, None, &mut observer)
                .context("Failed to recover data")?;
            eprintln!("Recovered {} bytes to {}", bytes, output.display());
        }

        Ok(())
    }
}

impl StegLsbCommand {
    fn require_secret(&self, mode: &str) -> Result<&PathBuf> {
        self.secret
            .as_ref()
            .with_context(|| format!("{mode} needs a secret file (-s)"))
    }

    fn require_output(&self, mode: &str) -> Result<&PathBuf> {
        self.output
            .as_ref()
            .with_context(|| format!("{mode} needs an output file (-o)"))
    }
}

pub(crate) fn print_analysis(report: &PayloadAnalysis) {
    let capacity = &report.capacity;
    println!("Carrier units:  {}", capacity.carrier_units);
    println!("LSBs per unit:  {}", capacity.lsb_count);
    println!("Capacity:       {} bytes", capacity.capacity_bytes);
    println!("Payload:        {} bytes", report.payload_bytes);
    if report.compressed {
        println!("Compressed:     {} bytes", report.body_bytes);
    }
    println!("Usage:          {:.1}%", report.usage() * 100.0);
    if report.fits {
        println!("The payload fits.");
    } else {
        println!("The payload does NOT fit. Use a larger carrier or more LSBs.");
    }
}
