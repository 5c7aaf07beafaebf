//! # lsbsteg - LSB steganography and steganalysis
//!
//! Hides arbitrary bytes in the least significant bits of image channel
//! values or WAV samples, recovers them, and scores carriers for signs that
//! someone else did the same.
//!
//! ## Overview
//!
//! - **Bit-depth 1..=8**: each carrier unit gives up its low `n` bits
//! - **Self-describing image frames**: a 32-bit header (31-bit length plus a
//!   compression flag) lets recovery run without knowing the payload size
//! - **Optional zlib compression**: decompression is automatic on recovery
//! - **Audio without framing**: WAV recovery takes an explicit byte count
//! - **Steganalysis**: low bit-plane rendering and block entropy outliers
//!
//! The core does not encrypt. Encrypt the payload first if it must stay
//! confidential, and keep carriers in lossless formats.
//!
//! ## Example Usage
//!
//! ```rust
//! use image::{DynamicImage, ImageBuffer, Rgb};
//! use lsbsteg::{EmbeddingParams, ImageStego, LsbCount};
//!
//! let cover = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 64, Rgb([90u8, 140, 200])));
//! let carrier = ImageStego::from_image(cover);
//!
//! let params = EmbeddingParams::new(2, 6).unwrap();
//! let stego = carrier.hide(b"meet at the usual place", params).unwrap();
//!
//! let recovered = stego.recover(LsbCount::new(2).unwrap()).unwrap();
//! assert_eq!(recovered, b"meet at the usual place");
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: bit packing, frames, compression
//! - [`capacity`]: capacity planning
//! - [`stego`]: image and audio engines
//! - [`detect`]: bit-plane visualization and entropy anomaly detection
//! - [`ops`]: file-path operations for front ends
//! - [`append`]: container-append hiding (outside the LSB core)

pub mod append;
pub mod capacity;
pub mod codec;
pub mod config;
pub mod detect;
pub mod error;
pub mod observer;
pub mod ops;
pub mod stego;

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types at the crate root
pub use capacity::{CapacityReport, PayloadAnalysis};
pub use codec::{Frame, LsbCount, FRAME_HEADER_BYTES};
pub use config::{EmbeddingParams, StegoConfig};
pub use detect::{AnomalyReport, EntropyMap};
pub use error::StegoError;
pub use observer::{NoopObserver, Stage, StegoEvent, StegoObserver, TracingObserver};
pub use ops::{analysis, detect_anomalies, hide_data, recover_data, show_lsb};
pub use stego::{AudioStego, CarrierKind, ImageStego};
