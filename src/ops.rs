//! File-level operations used by front ends.
//!
//! Each call reads its inputs fully, works in memory and writes only the
//! output path it was given. Nothing is shared between calls, so different
//! threads may run these concurrently as long as they target different
//! output files.
//!
//! The engine is picked from the carrier extension: `.wav` goes to
//! [`AudioStego`], everything else to [`ImageStego`].

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::capacity::PayloadAnalysis;
use crate::codec::{Frame, LsbCount};
use crate::config::StegoConfig;
use crate::detect::{self, AnomalyReport};
use crate::error::StegoError;
use crate::observer::{Stage, StegoEvent, StegoObserver};
use crate::stego::{AudioStego, CarrierKind, ImageStego};

/// Hides the contents of `payload_in` in `carrier_in` and writes `carrier_out`.
///
/// Uses `config.lsb_count` and `config.compression_level`. Capacity is
/// checked before anything is written.
pub fn hide_data(
    carrier_in: &Path,
    payload_in: &Path,
    carrier_out: &Path,
    config: &StegoConfig,
    observer: &mut dyn StegoObserver,
) -> Result<PayloadAnalysis, StegoError> {
    let params = config.embedding()?;
    let kind = CarrierKind::from_path(carrier_in);
    check_output_kind(kind, carrier_out)?;
    let payload = read_payload(payload_in)?;

    let (analysis, units_touched) = match kind {
        CarrierKind::Image => {
            crate::stego::image::ensure_lossless(carrier_out)?;
            let carrier = ImageStego::from_file(carrier_in)?;
            let frame = Frame::seal(&payload, params.compression_level)?;
            let capacity = carrier.capacity(params.lsb_count);
            let hidden = carrier.hide_frame(&frame, params.lsb_count)?;
            hidden.save(carrier_out)?;
            let analysis = PayloadAnalysis {
                capacity,
                payload_bytes: payload.len(),
                body_bytes: frame.body_len(),
                compressed: frame.is_compressed(),
                fits: true,
            };
            (analysis, params.lsb_count.units_for(frame.framed_len()))
        }
        CarrierKind::Audio => {
            reject_audio_compression(config.compression_level)?;
            let carrier = AudioStego::from_file(carrier_in)?;
            let hidden = carrier.hide(&payload, params.lsb_count)?;
            hidden.save(carrier_out)?;
            let analysis = carrier.analyze(&payload, params.lsb_count);
            (analysis, params.lsb_count.units_for(payload.len()))
        }
    };

    observer.on_progress(
        Stage::Embedding,
        units_touched,
        analysis.capacity.carrier_units,
    );
    observer.on_event(&StegoEvent::PayloadHidden {
        payload_bytes: analysis.payload_bytes,
        embedded_bytes: analysis.body_bytes + analysis.capacity.frame_header_bytes,
        units_touched,
        capacity: &analysis.capacity,
    });
    if kind == CarrierKind::Audio {
        warn!(
            bytes = payload.len(),
            "audio carriers store no length; recover with this byte count"
        );
    }
    Ok(analysis)
}

/// Recovers a hidden payload from `carrier_in` into `payload_out`.
///
/// Image carriers describe their own length and ignore `byte_count`.
/// Audio carriers require it.
pub fn recover_data(
    carrier_in: &Path,
    payload_out: &Path,
    config: &StegoConfig,
    byte_count: Option<usize>,
    observer: &mut dyn StegoObserver,
) -> Result<usize, StegoError> {
    let lsb = config.lsb()?;

    let payload = match CarrierKind::from_path(carrier_in) {
        CarrierKind::Image => {
            if let Some(count) = byte_count {
                debug!(count, "byte count ignored for image carriers");
            }
            ImageStego::from_file(carrier_in)?.recover(lsb)?
        }
        CarrierKind::Audio => {
            let count = byte_count.ok_or_else(|| {
                StegoError::invalid(
                    "byte_count",
                    "none",
                    "audio recovery needs the number of hidden bytes",
                )
            })?;
            AudioStego::from_file(carrier_in)?.recover(lsb, count)?
        }
    };

    observer.on_progress(Stage::Recovery, payload.len(), payload.len());

    fs::write(payload_out, &payload).map_err(|e| StegoError::WriteFailed {
        path: payload_out.to_path_buf(),
        reason: e.to_string(),
    })?;
    observer.on_event(&StegoEvent::PayloadRecovered {
        bytes: payload.len(),
    });
    Ok(payload.len())
}

/// Reports whether `payload_in` fits in `carrier_in`. Writes nothing.
pub fn analysis(
    carrier_in: &Path,
    payload_in: &Path,
    config: &StegoConfig,
    observer: &mut dyn StegoObserver,
) -> Result<PayloadAnalysis, StegoError> {
    let params = config.embedding()?;
    let payload = read_payload(payload_in)?;

    let analysis = match CarrierKind::from_path(carrier_in) {
        CarrierKind::Image => ImageStego::from_file(carrier_in)?.analyze(&payload, params)?,
        CarrierKind::Audio => {
            reject_audio_compression(config.compression_level)?;
            AudioStego::from_file(carrier_in)?.analyze(&payload, params.lsb_count)
        }
    };

    observer.on_event(&StegoEvent::CapacityAnalyzed(&analysis));
    Ok(analysis)
}

/// Writes the low `n` bit-planes of `carrier_in` next to it as
/// `<name>_<n>LSBs.<ext>` and returns that path.
pub fn show_lsb(
    carrier_in: &Path,
    n: u8,
    observer: &mut dyn StegoObserver,
) -> Result<PathBuf, StegoError> {
    let lsb = LsbCount::new(n)?;
    let image = open_image(carrier_in)?;

    let out = detect::bit_plane_path(carrier_in, lsb);
    detect::visualize_bit_plane(&image, lsb)
        .save(&out)
        .map_err(|e| StegoError::WriteFailed {
            path: out.clone(),
            reason: e.to_string(),
        })?;

    observer.on_event(&StegoEvent::BitPlaneWritten {
        path: &out,
        lsb_count: n,
    });
    Ok(out)
}

/// Runs the block entropy scan over `carrier_in`.
///
/// Uses `config.block_size` and `config.threshold_multiplier`. The config is
/// validated before the carrier is opened.
pub fn detect_anomalies(
    carrier_in: &Path,
    config: &StegoConfig,
    observer: &mut dyn StegoObserver,
) -> Result<AnomalyReport, StegoError> {
    config.validate()?;
    let image = open_image(carrier_in)?;
    let report = detect::scan_image(
        &image,
        config.block_size,
        config.threshold_multiplier,
        observer,
    )?;

    observer.on_event(&StegoEvent::AnomaliesDetected(&report));
    Ok(report)
}

fn open_image(path: &Path) -> Result<image::DynamicImage, StegoError> {
    if !path.exists() {
        return Err(StegoError::CarrierNotFound(path.to_path_buf()));
    }
    image::open(path).map_err(|e| StegoError::UnreadableCarrier {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn read_payload(path: &Path) -> Result<Vec<u8>, StegoError> {
    fs::read(path).map_err(|source| StegoError::PayloadRead {
        path: path.to_path_buf(),
        source,
    })
}

fn check_output_kind(kind: CarrierKind, carrier_out: &Path) -> Result<(), StegoError> {
    if CarrierKind::from_path(carrier_out) != kind {
        return Err(StegoError::invalid(
            "carrier_out",
            carrier_out.display(),
            format!("must be the same kind of carrier as the input ({kind:?})"),
        ));
    }
    Ok(())
}

fn reject_audio_compression(level: u8) -> Result<(), StegoError> {
    if level > 0 {
        return Err(StegoError::invalid(
            "compression_level",
            level,
            "audio carriers store the payload raw; use 0",
        ));
    }
    Ok(())
}
