//! LSB (Least Significant Bit) steganography for images.
//!
//! Hides a framed payload in the low `n` bits of every channel value,
//! walking pixels row by row and channels in storage order (R, G, B[, A]).
//! That order is fixed; `hide` and `recover` must agree on it.
//!
//! Supports PNG, BMP and TIFF output (lossless formats only).
//!
//! Format: [4 bytes header: 31-bit length + compression flag] + [body bytes]

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::capacity::{CapacityReport, PayloadAnalysis};
use crate::codec::{embed_bytes, BitReader, Frame, LsbCount, FRAME_HEADER_BYTES};
use crate::config::EmbeddingParams;
use crate::error::StegoError;

/// Channel layouts we embed into. Everything else is converted on load.
#[derive(Debug, Clone, PartialEq)]
enum Pixels {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Pixels {
    fn from_image(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageRgb8(buf) => Self::Rgb(buf),
            DynamicImage::ImageRgba8(buf) => Self::Rgba(buf),
            other if other.color().has_alpha() => Self::Rgba(other.to_rgba8()),
            other => Self::Rgb(other.to_rgb8()),
        }
    }

    fn units(&self) -> &[u8] {
        match self {
            Self::Rgb(buf) => buf.as_raw(),
            Self::Rgba(buf) => buf.as_raw(),
        }
    }

    fn units_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Rgb(buf) => &mut **buf,
            Self::Rgba(buf) => &mut **buf,
        }
    }

    fn channels(&self) -> usize {
        match self {
            Self::Rgb(_) => 3,
            Self::Rgba(_) => 4,
        }
    }

    fn to_dynamic(&self) -> DynamicImage {
        match self {
            Self::Rgb(buf) => DynamicImage::ImageRgb8(buf.clone()),
            Self::Rgba(buf) => DynamicImage::ImageRgba8(buf.clone()),
        }
    }

    fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Rgb(buf) => DynamicImage::ImageRgb8(buf),
            Self::Rgba(buf) => DynamicImage::ImageRgba8(buf),
        }
    }
}

/// Image steganography handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStego {
    pixels: Pixels,
}

impl ImageStego {
    /// Creates a new ImageStego from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StegoError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StegoError::CarrierNotFound(path.to_path_buf()));
        }
        let image = image::open(path).map_err(|e| StegoError::UnreadableCarrier {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_image(image))
    }

    /// Creates a new ImageStego from encoded image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| StegoError::UnsupportedCarrier(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    /// Creates a new ImageStego from a DynamicImage.
    ///
    /// Images with alpha are embedded as RGBA8, everything else as RGB8.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: Pixels::from_image(image),
        }
    }

    /// Number of modifiable channel values (width * height * channels).
    pub fn unit_count(&self) -> usize {
        self.pixels.units().len()
    }

    pub fn channels(&self) -> usize {
        self.pixels.channels()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match &self.pixels {
            Pixels::Rgb(buf) => buf.dimensions(),
            Pixels::Rgba(buf) => buf.dimensions(),
        }
    }

    /// Returns what this image can hold at `lsb` bits per channel value.
    pub fn capacity(&self, lsb: LsbCount) -> CapacityReport {
        CapacityReport::plan(self.unit_count(), lsb, FRAME_HEADER_BYTES)
    }

    /// Checks whether `payload` would fit, without touching the image.
    pub fn analyze(
        &self,
        payload: &[u8],
        params: EmbeddingParams,
    ) -> Result<PayloadAnalysis, StegoError> {
        let frame = Frame::seal(payload, params.compression_level)?;
        let capacity = self.capacity(params.lsb_count);
        Ok(PayloadAnalysis {
            capacity,
            payload_bytes: payload.len(),
            body_bytes: frame.body_len(),
            compressed: frame.is_compressed(),
            fits: capacity.fits(frame.body_len()),
        })
    }

    /// Hides `payload` in the image.
    ///
    /// The payload is compressed first when `params.compression_level > 0`.
    /// Fails with [`StegoError::CapacityExceeded`] before touching any pixel
    /// if the frame does not fit.
    pub fn hide(&self, payload: &[u8], params: EmbeddingParams) -> Result<Self, StegoError> {
        let frame = Frame::seal(payload, params.compression_level)?;
        self.hide_frame(&frame, params.lsb_count)
    }

    /// Embeds an already sealed frame.
    pub fn hide_frame(&self, frame: &Frame, lsb: LsbCount) -> Result<Self, StegoError> {
        self.capacity(lsb).check(frame.body_len())?;
        let encoded = frame.encode()?;

        let mut output = self.pixels.clone();
        let touched = embed_bytes(output.units_mut().iter_mut(), &encoded, lsb);
        debug!(
            framed_bytes = encoded.len(),
            units_touched = touched,
            unit_count = self.unit_count(),
            lsb_count = lsb.get(),
            "embedded frame into image"
        );

        Ok(Self { pixels: output })
    }

    /// Extracts the hidden payload.
    ///
    /// The frame header says how many bytes follow, so no size hint is needed.
    /// A length field pointing past the end of the image is reported as
    /// [`StegoError::CorruptFrame`].
    pub fn recover(&self, lsb: LsbCount) -> Result<Vec<u8>, StegoError> {
        let mut reader = BitReader::new(self.pixels.units().iter().copied(), lsb);
        let frame = Frame::decode(&mut reader)?;
        debug!(
            body_bytes = frame.body_len(),
            compressed = frame.is_compressed(),
            "decoded image frame"
        );
        frame.open()
    }

    /// Saves the image to a file. Only lossless formats are accepted.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StegoError> {
        let path = path.as_ref();
        ensure_lossless(path)?;
        self.pixels
            .to_dynamic()
            .save(path)
            .map_err(|e| StegoError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Returns the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut bytes = Vec::new();
        self.pixels
            .to_dynamic()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| StegoError::UnsupportedCarrier(e.to_string()))?;
        Ok(bytes)
    }

    /// Returns the channel values in embedding order.
    pub fn units(&self) -> &[u8] {
        self.pixels.units()
    }

    /// Consumes self and returns the underlying image.
    pub fn into_image(self) -> DynamicImage {
        self.pixels.into_dynamic()
    }
}

/// Rejects output paths whose format would not preserve low bits.
pub fn ensure_lossless(path: &Path) -> Result<(), StegoError> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Png | ImageFormat::Bmp | ImageFormat::Tiff) => Ok(()),
        Ok(format) => Err(StegoError::invalid(
            "carrier_out",
            path.display(),
            format!("{format:?} is not a lossless format; use .png, .bmp or .tiff"),
        )),
        Err(_) => Err(StegoError::invalid(
            "carrier_out",
            path.display(),
            "unknown image extension; use .png, .bmp or .tiff",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn params(lsb: u8, level: u8) -> EmbeddingParams {
        EmbeddingParams::new(lsb, level).unwrap()
    }

    fn lsb(n: u8) -> LsbCount {
        LsbCount::new(n).unwrap()
    }

    #[test]
    fn test_capacity() {
        let stego = ImageStego::from_image(create_test_image(100, 100));

        // 100x100 = 10000 pixels, 3 channels, 2 bits each = 60000 bits = 7500 bytes
        // Minus 4 for the header = 7496 bytes
        let report = stego.capacity(lsb(2));
        assert_eq!(report.carrier_units, 30_000);
        assert_eq!(report.capacity_bits, 60_000);
        assert_eq!(report.capacity_bytes, 7_496);
    }

    #[test]
    fn test_hide_and_recover_small() {
        let stego = ImageStego::from_image(create_test_image(100, 100));
        let data = b"Hello, steganography!";

        let hidden = stego.hide(data, params(2, 0)).unwrap();
        assert_eq!(hidden.recover(lsb(2)).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_every_depth() {
        let stego = ImageStego::from_image(create_test_image(64, 64));
        let data: Vec<u8> = (0..1000).map(|i| (i * 7 % 256) as u8).collect();

        for n in 1..=8 {
            let hidden = stego.hide(&data, params(n, 0)).unwrap();
            assert_eq!(hidden.recover(lsb(n)).unwrap(), data, "lsb_count = {n}");
        }
    }

    #[test]
    fn test_roundtrip_with_compression() {
        let stego = ImageStego::from_image(create_test_image(50, 50));
        let data = "compressible text ".repeat(400).into_bytes();

        // Too big raw: 7200 bytes vs 933 at 1 LSB
        assert!(stego.hide(&data, params(1, 0)).is_err());

        let hidden = stego.hide(&data, params(1, 9)).unwrap();
        assert_eq!(hidden.recover(lsb(1)).unwrap(), data);
    }

    #[test]
    fn test_example_scenario() {
        let stego = ImageStego::from_image(create_test_image(100, 100));

        let fits: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
        let hidden = stego.hide(&fits, params(2, 0)).unwrap();
        assert_eq!(hidden.recover(lsb(2)).unwrap(), fits);

        let too_big = vec![0xA5u8; 10_000];
        assert!(matches!(
            stego.hide(&too_big, params(2, 0)),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_capacity_boundary() {
        let stego = ImageStego::from_image(create_test_image(10, 10));
        let capacity = stego.capacity(lsb(3)).capacity_bytes;

        let exact = vec![0x3Cu8; capacity];
        let hidden = stego.hide(&exact, params(3, 0)).unwrap();
        assert_eq!(hidden.recover(lsb(3)).unwrap(), exact);

        let over = vec![0x3Cu8; capacity + 1];
        assert!(matches!(
            stego.hide(&over, params(3, 0)),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_high_bits_untouched() {
        let stego = ImageStego::from_image(create_test_image(40, 40));
        let data: Vec<u8> = (0..500).map(|i| (i * 13 % 256) as u8).collect();

        for n in [1u8, 4, 7] {
            let hidden = stego.hide(&data, params(n, 0)).unwrap();
            let high = !lsb(n).mask();
            for (before, after) in stego.units().iter().zip(hidden.units()) {
                assert_eq!(before & high, after & high);
            }
        }
    }

    #[test]
    fn test_trailing_units_untouched() {
        let stego = ImageStego::from_image(create_test_image(100, 100));
        let hidden = stego.hide(b"short", params(2, 0)).unwrap();

        let used = lsb(2).units_for(FRAME_HEADER_BYTES + 5);
        assert_eq!(&stego.units()[used..], &hidden.units()[used..]);
    }

    #[test]
    fn test_deterministic_output() {
        let stego = ImageStego::from_image(create_test_image(30, 30));
        let a = stego.hide(b"same input", params(3, 6)).unwrap();
        let b = stego.hide(b"same input", params(3, 6)).unwrap();
        assert_eq!(a.to_png_bytes().unwrap(), b.to_png_bytes().unwrap());
    }

    #[test]
    fn test_rgba_uses_alpha_channel() {
        let img = ImageBuffer::from_pixel(20, 20, Rgba([10u8, 20, 30, 255]));
        let stego = ImageStego::from_image(DynamicImage::ImageRgba8(img));
        assert_eq!(stego.channels(), 4);
        assert_eq!(stego.capacity(lsb(1)).carrier_units, 1600);

        let hidden = stego.hide(b"alpha", params(1, 0)).unwrap();
        assert_eq!(hidden.recover(lsb(1)).unwrap(), b"alpha");
    }

    #[test]
    fn test_grayscale_converted_to_rgb() {
        let img = ImageBuffer::from_pixel(8, 8, image::Luma([77u8]));
        let stego = ImageStego::from_image(DynamicImage::ImageLuma8(img));
        assert_eq!(stego.channels(), 3);
    }

    #[test]
    fn test_image_too_small() {
        let stego = ImageStego::from_image(create_test_image(10, 10));
        let data = vec![0u8; 1000];

        let result = stego.hide(&data, params(1, 0));
        assert!(matches!(result, Err(StegoError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_empty_data() {
        let stego = ImageStego::from_image(create_test_image(100, 100));
        let hidden = stego.hide(&[], params(2, 0)).unwrap();
        assert!(hidden.recover(lsb(2)).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_length_field() {
        // All low bits set: length field decodes to ~2^31 bytes
        let img = ImageBuffer::from_pixel(10, 10, Rgb([255u8, 255, 255]));
        let stego = ImageStego::from_image(DynamicImage::ImageRgb8(img));
        assert!(matches!(
            stego.recover(lsb(1)),
            Err(StegoError::CorruptFrame(_))
        ));
    }

    #[test]
    fn test_wrong_depth_does_not_return_payload() {
        let stego = ImageStego::from_image(create_test_image(100, 100));
        let hidden = stego.hide(b"depth matters", params(2, 0)).unwrap();
        let recovered = hidden.recover(lsb(3));
        assert!(recovered.map(|r| r != b"depth matters").unwrap_or(true));
    }

    #[test]
    fn test_png_roundtrip() {
        let stego = ImageStego::from_image(create_test_image(100, 100));
        let data = b"Test PNG roundtrip";

        let hidden = stego.hide(data, params(4, 0)).unwrap();
        let png_bytes = hidden.to_png_bytes().unwrap();
        let reloaded = ImageStego::from_bytes(&png_bytes).unwrap();

        assert_eq!(reloaded.recover(lsb(4)).unwrap(), data);
    }

    #[test]
    fn test_lossy_output_rejected() {
        assert!(ensure_lossless(Path::new("out.png")).is_ok());
        assert!(ensure_lossless(Path::new("out.BMP")).is_ok());
        assert!(matches!(
            ensure_lossless(Path::new("out.jpg")),
            Err(StegoError::InvalidParameter { name: "carrier_out", .. })
        ));
        assert!(ensure_lossless(Path::new("out")).is_err());
    }
}
