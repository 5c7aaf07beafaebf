//! Steganalysis: finding carriers that probably hide something.
//!
//! Works on the carrier alone, with no knowledge of any payload:
//! - [`bitplane`] renders the low bit-planes so busy regions stand out
//! - [`entropy`] scores block entropy and flags statistical outliers

pub mod bitplane;
pub mod entropy;

pub use bitplane::{bit_plane_path, visualize_bit_plane};
pub use entropy::{
    detect_anomalies, shannon_entropy, Anomaly, AnomalyReport, EntropyMap, Histogram,
};

use image::DynamicImage;

use crate::error::StegoError;
use crate::observer::StegoObserver;

/// Builds the block entropy map of `image`'s luminance plane.
pub fn block_entropy_map(
    image: &DynamicImage,
    block_size: u32,
    observer: &mut dyn StegoObserver,
) -> Result<EntropyMap, StegoError> {
    EntropyMap::compute(&image.to_luma8(), block_size, observer)
}

/// Entropy map plus anomaly detection in one call.
pub fn scan_image(
    image: &DynamicImage,
    block_size: u32,
    threshold_multiplier: f64,
    observer: &mut dyn StegoObserver,
) -> Result<AnomalyReport, StegoError> {
    let map = block_entropy_map(image, block_size, observer)?;
    detect_anomalies(&map, threshold_multiplier)
}
