//! Embedding engines.
//!
//! Supports:
//! - Image LSB steganography (PNG, BMP, TIFF), self-describing frames
//! - Audio LSB steganography (WAV), length supplied by the caller

pub mod audio;
pub mod image;

pub use self::audio::AudioStego;
pub use self::image::ImageStego;

use std::path::Path;

/// Which engine handles a carrier file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Image,
    Audio,
}

impl CarrierKind {
    /// `.wav` files are audio; everything else is treated as an image.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("wav") => Self::Audio,
            _ => Self::Image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_kind_from_extension() {
        assert_eq!(CarrierKind::from_path(Path::new("a/b.wav")), CarrierKind::Audio);
        assert_eq!(CarrierKind::from_path(Path::new("B.WAV")), CarrierKind::Audio);
        assert_eq!(CarrierKind::from_path(Path::new("c.png")), CarrierKind::Image);
        assert_eq!(CarrierKind::from_path(Path::new("noext")), CarrierKind::Image);
    }
}
