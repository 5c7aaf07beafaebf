//! lsbsteg - hide data in the low bits of images and WAV files
//!
//! A CLI front end over the `lsbsteg` library. Each subcommand lives in its
//! own module under `commands/` and implements `CommandExecutor`.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    AppendCommand, CommandExecutor, EntropyCommand, StegDetectCommand, StegLsbCommand,
    WavStegCommand,
};
use lsbsteg::StegoConfig;

/// lsbsteg - LSB steganography and steganalysis
///
/// Hides files in the least significant bits of images (PNG, BMP, TIFF) and
/// WAV audio, recovers them, and checks images for signs of hidden data.
#[derive(Parser)]
#[command(name = "lsbsteg")]
#[command(version = lsbsteg::VERSION)]
#[command(about = "Hide and recover data in the least significant bits of images and audio")]
#[command(long_about = None)]
struct Cli {
    /// TOML file with default settings (lsb_count, compression_level,
    /// block_size, threshold_multiplier). Command flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide or recover data in and from an image
    Steglsb(StegLsbCommand),

    /// Hide or recover data in and from a sound file
    Wavsteg(WavStegCommand),

    /// Show the n least significant bits of an image
    Stegdetect(StegDetectCommand),

    /// Scan an image for blocks with unusual entropy
    Entropy(EntropyCommand),

    /// Append or reveal data at the end of a container file
    Append(AppendCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => StegoConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StegoConfig::default(),
    };

    match &cli.command {
        Commands::Steglsb(cmd) => cmd.execute(&config),
        Commands::Wavsteg(cmd) => cmd.execute(&config),
        Commands::Stegdetect(cmd) => cmd.execute(&config),
        Commands::Entropy(cmd) => cmd.execute(&config),
        Commands::Append(cmd) => cmd.execute(&config),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "lsbsteg=debug" } else { "lsbsteg=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}
