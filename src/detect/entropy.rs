//! Block-wise entropy steganalysis.
//!
//! The carrier's luminance plane is cut into non-overlapping square blocks
//! (rows and columns that do not fill a whole block are dropped). Each block
//! gets the base-2 Shannon entropy of its value distribution. Blocks whose
//! entropy sits more than `k` standard deviations from the mean are flagged.
//!
//! This is a heuristic. Textured photos produce false positives, and
//! payloads spread evenly over a noisy image produce false negatives.

use image::GrayImage;

use crate::config::{validate_block_size, validate_threshold};
use crate::error::StegoError;
use crate::observer::{Stage, StegoObserver};

/// Shannon entropy (bits) of the values yielded by `values`.
pub fn shannon_entropy<I: IntoIterator<Item = u8>>(values: I) -> f64 {
    let mut counts = [0u32; 256];
    let mut total = 0u32;
    for v in values {
        counts[v as usize] += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * (1.0 / p).log2()
        })
        .sum()
}

/// Entropy per block, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyMap {
    block_size: u32,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl EntropyMap {
    /// Scans `luma` block by block.
    ///
    /// Reports one progress step per block row to `observer`.
    pub fn compute(
        luma: &GrayImage,
        block_size: u32,
        observer: &mut dyn StegoObserver,
    ) -> Result<Self, StegoError> {
        validate_block_size(block_size)?;
        let (width, height) = luma.dimensions();
        if block_size > width || block_size > height {
            return Err(StegoError::invalid(
                "block_size",
                block_size,
                format!("larger than the {width}x{height} carrier"),
            ));
        }

        let bs = block_size as usize;
        let stride = width as usize;
        let rows = height as usize / bs;
        let cols = width as usize / bs;
        let raw = luma.as_raw();

        let mut values = Vec::with_capacity(rows * cols);
        for br in 0..rows {
            for bc in 0..cols {
                let block = (0..bs).flat_map(move |dy| {
                    let start = (br * bs + dy) * stride + bc * bs;
                    raw[start..start + bs].iter().copied()
                });
                values.push(shannon_entropy(block));
            }
            observer.on_progress(Stage::EntropyScan, br + 1, rows);
        }

        Ok(Self {
            block_size,
            rows,
            cols,
            values,
        })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;
        variance.sqrt()
    }

    /// Counts block entropies in `bins` equal-width bins between the
    /// smallest and largest value.
    pub fn histogram(&self, bins: usize) -> Histogram {
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut counts = vec![0usize; bins];
        if bins == 0 || self.values.is_empty() {
            return Histogram {
                min: 0.0,
                max: 0.0,
                counts,
            };
        }

        let width = (max - min) / bins as f64;
        for &v in &self.values {
            let idx = if width > 0.0 {
                (((v - min) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }
        Histogram { min, max, counts }
    }
}

/// Distribution of block entropies.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<usize>,
}

/// One flagged block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anomaly {
    pub row: usize,
    pub col: usize,
    pub entropy: f64,
}

/// Outcome of an entropy scan.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyReport {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold_multiplier: f64,
    pub anomalies: Vec<Anomaly>,
    /// True iff at least one block was flagged. Advisory, not proof.
    pub likely_tampered: bool,
}

/// Flags blocks whose entropy differs from the map mean by more than
/// `threshold_multiplier` standard deviations.
pub fn detect_anomalies(
    map: &EntropyMap,
    threshold_multiplier: f64,
) -> Result<AnomalyReport, StegoError> {
    validate_threshold(threshold_multiplier)?;

    let mean = map.mean();
    let std_dev = map.std_dev();
    let limit = threshold_multiplier * std_dev;

    let anomalies: Vec<Anomaly> = if std_dev > 0.0 {
        map.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| (v - mean).abs() > limit)
            .map(|(i, &entropy)| Anomaly {
                row: i / map.cols,
                col: i % map.cols,
                entropy,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(AnomalyReport {
        mean,
        std_dev,
        threshold_multiplier,
        likely_tampered: !anomalies.is_empty(),
        anomalies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use image::{ImageBuffer, Luma};

    #[test]
    fn test_shannon_entropy() {
        assert_eq!(shannon_entropy([7u8; 64]), 0.0);
        assert_eq!(shannon_entropy(Vec::<u8>::new()), 0.0);
        assert!((shannon_entropy([0u8, 1]) - 1.0).abs() < 1e-12);
        assert!((shannon_entropy(0..=255u8) - 8.0).abs() < 1e-12);
        assert!((shannon_entropy([0u8, 1, 2, 3]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_map_trims_remainder() {
        let img: GrayImage = ImageBuffer::from_pixel(20, 17, Luma([5u8]));
        let map = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        assert_eq!((map.rows(), map.cols()), (2, 2));
        assert_eq!(map.values().len(), 4);
        assert!(map.get(2, 0).is_none());
    }

    #[test]
    fn test_map_per_block_values() {
        // Left 8x8 block constant, right block alternates two values
        let img: GrayImage =
            ImageBuffer::from_fn(16, 8, |x, y| Luma([if x >= 8 { ((x + y) % 2) as u8 } else { 9 }]));
        let map = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        assert_eq!(map.get(0, 0), Some(0.0));
        assert!((map.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_block_size_validation() {
        let img: GrayImage = ImageBuffer::from_pixel(4, 4, Luma([0u8]));
        assert!(matches!(
            EntropyMap::compute(&img, 0, &mut NoopObserver),
            Err(StegoError::InvalidParameter { name: "block_size", .. })
        ));
        assert!(EntropyMap::compute(&img, 5, &mut NoopObserver).is_err());
        assert!(EntropyMap::compute(&img, 4, &mut NoopObserver).is_ok());
    }

    #[test]
    fn test_progress_reported_per_row() {
        struct Rows(Vec<(usize, usize)>);
        impl StegoObserver for Rows {
            fn on_progress(&mut self, stage: Stage, done: usize, total: usize) {
                assert_eq!(stage, Stage::EntropyScan);
                self.0.push((done, total));
            }
        }

        let img: GrayImage = ImageBuffer::from_pixel(16, 24, Luma([0u8]));
        let mut rows = Rows(Vec::new());
        EntropyMap::compute(&img, 8, &mut rows).unwrap();
        assert_eq!(rows.0, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_uniform_map_has_no_anomalies() {
        let img: GrayImage = ImageBuffer::from_pixel(64, 64, Luma([128u8]));
        let map = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        let report = detect_anomalies(&map, 2.0).unwrap();
        assert_eq!(report.std_dev, 0.0);
        assert!(report.anomalies.is_empty());
        assert!(!report.likely_tampered);
    }

    #[test]
    fn test_single_noisy_block_flagged() {
        let img: GrayImage = ImageBuffer::from_fn(64, 64, |x, y| {
            if x >= 24 && x < 32 && y >= 40 && y < 48 {
                Luma([((x * 7 + y * 13) % 64) as u8])
            } else {
                Luma([200u8])
            }
        });
        let map = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        let report = detect_anomalies(&map, 2.0).unwrap();

        assert!(report.likely_tampered);
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!((report.anomalies[0].row, report.anomalies[0].col), (5, 3));
        assert!(report.anomalies[0].entropy > 0.0);
    }

    #[test]
    fn test_threshold_validation() {
        let img: GrayImage = ImageBuffer::from_pixel(8, 8, Luma([0u8]));
        let map = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        assert!(detect_anomalies(&map, 0.0).is_err());
        assert!(detect_anomalies(&map, f64::NAN).is_err());
    }

    #[test]
    fn test_deterministic_map() {
        let img: GrayImage = ImageBuffer::from_fn(40, 40, |x, y| Luma([((x * y) % 256) as u8]));
        let a = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        let b = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_histogram() {
        let img: GrayImage =
            ImageBuffer::from_fn(16, 8, |x, y| Luma([if x >= 8 { ((x + y) % 2) as u8 } else { 9 }]));
        let map = EntropyMap::compute(&img, 8, &mut NoopObserver).unwrap();
        let hist = map.histogram(30);
        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
        assert_eq!(hist.counts[0], 1);
        assert_eq!(hist.counts[29], 1);
        assert_eq!((hist.min, hist.max), (0.0, 1.0));
    }
}
