//! Low bit-plane visualization.
//!
//! For every pixel the low `n` bits of R, G and B are summed and scaled to
//! 0..=255:
//!
//! ```text
//! value = 255 * sum(channel & mask) / (3 * mask),  mask = 2^n - 1
//! ```
//!
//! The value replaces all three channels, so regions with busy low bits
//! show up bright in an otherwise grayscale-looking image.

use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

use crate::codec::LsbCount;

const COLOR_CHANNELS: u32 = 3;

/// Renders the low `n` bit-planes of `image`. The input is not modified.
pub fn visualize_bit_plane(image: &DynamicImage, n: LsbCount) -> RgbImage {
    let rgb = image.to_rgb8();
    let mask = n.mask() as u32;

    let mut output = RgbImage::new(rgb.width(), rgb.height());
    for (src, dst) in rgb.pixels().zip(output.pixels_mut()) {
        let sum: u32 = src.0.iter().map(|&c| c as u32 & mask).sum();
        let value = (255 * sum / (COLOR_CHANNELS * mask)) as u8;
        *dst = Rgb([value; 3]);
    }
    output
}

/// `dir/name.ext` becomes `dir/name_<n>LSBs.ext`.
pub fn bit_plane_path(path: &Path, n: LsbCount) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{}LSBs.{}", n.get(), ext.to_string_lossy()),
        None => format!("{stem}_{}LSBs", n.get()),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn lsb(n: u8) -> LsbCount {
        LsbCount::new(n).unwrap()
    }

    #[test]
    fn test_formula() {
        let img = ImageBuffer::from_fn(3, 1, |x, _| match x {
            0 => Rgb([0b1111_1100u8, 0b1111_1100, 0b1111_1100]),
            1 => Rgb([0b0000_0011u8, 0b0000_0011, 0b0000_0011]),
            _ => Rgb([0b0000_0001u8, 0b0000_0010, 0b0000_0000]),
        });
        let plane = visualize_bit_plane(&DynamicImage::ImageRgb8(img), lsb(2));

        assert_eq!(plane.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(plane.get_pixel(1, 0), &Rgb([255, 255, 255]));
        // 255 * 3 / 9 = 85
        assert_eq!(plane.get_pixel(2, 0), &Rgb([85, 85, 85]));
    }

    #[test]
    fn test_single_bit_plane() {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([1u8, 0, 1]));
        let plane = visualize_bit_plane(&DynamicImage::ImageRgb8(img), lsb(1));
        // 255 * 2 / 3 = 170
        assert!(plane.pixels().all(|p| p.0 == [170, 170, 170]));
    }

    #[test]
    fn test_full_byte_plane_is_mean_intensity() {
        let img = ImageBuffer::from_pixel(2, 2, Rgb([255u8, 255, 0]));
        let plane = visualize_bit_plane(&DynamicImage::ImageRgb8(img), lsb(8));
        assert!(plane.pixels().all(|p| p.0 == [170, 170, 170]));
    }

    #[test]
    fn test_input_unchanged() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb([9u8, 8, 7])));
        let before = img.clone();
        let _ = visualize_bit_plane(&img, lsb(3));
        assert_eq!(img, before);
    }

    #[test]
    fn test_derived_path() {
        assert_eq!(
            bit_plane_path(Path::new("/tmp/photos/cat.png"), lsb(2)),
            PathBuf::from("/tmp/photos/cat_2LSBs.png")
        );
        assert_eq!(
            bit_plane_path(Path::new("scan.final.bmp"), lsb(8)),
            PathBuf::from("scan.final_8LSBs.bmp")
        );
        assert_eq!(
            bit_plane_path(Path::new("raw"), lsb(1)),
            PathBuf::from("raw_1LSBs")
        );
    }
}
