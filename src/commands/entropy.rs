//! entropy command - block entropy anomaly scan.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use lsbsteg::{detect_anomalies, StegoConfig, TracingObserver};

use super::CommandExecutor;

/// Scan an image for blocks whose entropy stands out.
///
/// Splits the luminance plane into square blocks, scores each by Shannon
/// entropy and lists blocks further than k standard deviations from the
/// mean. This is a heuristic: a clean verdict proves nothing.
#[derive(Args, Debug)]
pub struct EntropyCommand {
    /// Path to an image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Block edge length in pixels
    #[arg(short, long)]
    pub block_size: Option<u32>,

    /// Flag blocks more than this many standard deviations from the mean
    #[arg(short = 'k', long)]
    pub threshold: Option<f64>,

    /// List every anomalous block
    #[arg(short, long)]
    pub list: bool,
}

impl CommandExecutor for EntropyCommand {
    fn execute(&self, base: &StegoConfig) -> Result<()> {
        let mut config = base.clone();
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(threshold) = self.threshold {
            config.threshold_multiplier = threshold;
        }
        config.validate()?;

        let report = detect_anomalies(&self.input, &config, &mut TracingObserver)
            .with_context(|| format!("Failed to scan {}", self.input.display()))?;

        println!("Mean entropy:        {:.4}", report.mean);
        println!("Standard deviation:  {:.4}", report.std_dev);
        println!("Threshold:           {} std devs", report.threshold_multiplier);
        println!("Anomalous blocks:    {}", report.anomalies.len());

        if self.list {
            for anomaly in &report.anomalies {
                println!(
                    "  block ({}, {}) entropy {:.4}",
                    anomaly.row, anomaly.col, anomaly.entropy
                );
            }
        }

        if report.likely_tampered {
            println!("The image likely contains hidden data.");
        } else {
            println!("No hidden data detected.");
        }
        Ok(())
    }
}
