//! LSB steganography for audio files.
//!
//! Hides data in the least significant bits of PCM samples. Each sample
//! contributes one 8-bit carrier unit: its least-significant byte as stored
//! on disk (for 8-bit WAV, the unsigned sample byte itself). Units are walked
//! in file order, channels interleaved.
//!
//! Unlike images, audio carries no length header: the raw payload is
//! embedded from the first sample, and recovery needs the byte count from
//! the caller.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

use crate::capacity::{CapacityReport, PayloadAnalysis};
use crate::codec::{embed_bytes, BitReader, LsbCount};
use crate::error::StegoError;

/// Audio carries no framing in front of the payload.
pub const AUDIO_HEADER_BYTES: usize = 0;

/// Audio steganography handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStego {
    /// Audio specification (sample rate, channels, etc.)
    spec: WavSpec,
    /// Samples widened to i32, interleaved.
    samples: Vec<i32>,
}

impl AudioStego {
    /// Creates a new AudioStego from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StegoError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StegoError::CarrierNotFound(path.to_path_buf()));
        }
        let reader = WavReader::open(path).map_err(|e| StegoError::UnreadableCarrier {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_reader(reader)
    }

    /// Creates a new AudioStego from WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| StegoError::UnsupportedCarrier(e.to_string()))?;

        Self::from_reader(reader)
    }

    /// Creates an AudioStego from samples already in memory.
    pub fn from_samples(spec: WavSpec, samples: Vec<i32>) -> Result<Self, StegoError> {
        check_spec(&spec)?;
        Ok(Self { spec, samples })
    }

    fn from_reader<R: Read + Seek>(reader: WavReader<R>) -> Result<Self, StegoError> {
        let spec = reader.spec();
        check_spec(&spec)?;

        let samples: Vec<i32> = reader
            .into_samples::<i32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StegoError::UnsupportedCarrier(e.to_string()))?;

        Ok(Self { spec, samples })
    }

    /// One carrier unit per sample, in file order.
    pub fn units(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        let bits = self.spec.bits_per_sample;
        self.samples.iter().map(move |&s| unit_of(s, bits))
    }

    /// Returns what this audio can hold at `lsb` bits per sample.
    pub fn capacity(&self, lsb: LsbCount) -> CapacityReport {
        CapacityReport::plan(self.samples.len(), lsb, AUDIO_HEADER_BYTES)
    }

    /// Checks whether `payload` would fit, without touching the samples.
    pub fn analyze(&self, payload: &[u8], lsb: LsbCount) -> PayloadAnalysis {
        let capacity = self.capacity(lsb);
        PayloadAnalysis {
            capacity,
            payload_bytes: payload.len(),
            body_bytes: payload.len(),
            compressed: false,
            fits: capacity.fits(payload.len()),
        }
    }

    /// Hides `data` in the audio.
    ///
    /// Fails with [`StegoError::CapacityExceeded`] before any sample changes
    /// if the data does not fit.
    pub fn hide(&self, data: &[u8], lsb: LsbCount) -> Result<Self, StegoError> {
        self.capacity(lsb).check(data.len())?;

        let mut units: Vec<u8> = self.units().collect();
        let touched = embed_bytes(units.iter_mut(), data, lsb);

        let bits = self.spec.bits_per_sample;
        let mut new_samples = self.samples.clone();
        for (sample, &unit) in new_samples.iter_mut().zip(&units).take(touched) {
            *sample = with_unit(*sample, unit, bits);
        }
        debug!(
            bytes = data.len(),
            samples_touched = touched,
            sample_count = self.samples.len(),
            lsb_count = lsb.get(),
            "embedded payload into audio"
        );

        Ok(Self {
            spec: self.spec,
            samples: new_samples,
        })
    }

    /// Extracts `num_bytes` hidden bytes.
    ///
    /// Asking for more bytes than the audio can hold at `lsb` is a
    /// [`StegoError::CorruptFrame`]; nothing is truncated or padded.
    pub fn recover(&self, lsb: LsbCount, num_bytes: usize) -> Result<Vec<u8>, StegoError> {
        let capacity = self.capacity(lsb);
        if num_bytes > capacity.capacity_bytes {
            return Err(StegoError::CorruptFrame(format!(
                "requested {} bytes but the audio holds {} bytes at {} LSBs ({} samples)",
                num_bytes,
                capacity.capacity_bytes,
                lsb.get(),
                self.samples.len()
            )));
        }

        let mut reader = BitReader::new(self.units(), lsb);
        reader.read_bytes(num_bytes).ok_or_else(|| {
            StegoError::CorruptFrame(format!("audio ended before {num_bytes} bytes"))
        })
    }

    /// Saves the audio to a WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StegoError> {
        let path = path.as_ref();
        let write_err = |e: hound::Error| StegoError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut writer = WavWriter::create(path, self.spec).map_err(write_err)?;
        for &sample in &self.samples {
            writer.write_sample(sample).map_err(write_err)?;
        }
        writer.finalize().map_err(write_err)?;

        Ok(())
    }

    /// Returns the audio as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let encode_err = |e: hound::Error| StegoError::UnsupportedCarrier(e.to_string());

        let mut bytes = Vec::new();
        {
            let mut writer =
                WavWriter::new(Cursor::new(&mut bytes), self.spec).map_err(encode_err)?;
            for &sample in &self.samples {
                writer.write_sample(sample).map_err(encode_err)?;
            }
            writer.finalize().map_err(encode_err)?;
        }
        Ok(bytes)
    }

    /// Returns the audio specification.
    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    /// Returns the number of samples (all channels).
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }
}

fn check_spec(spec: &WavSpec) -> Result<(), StegoError> {
    if spec.channels == 0 {
        return Err(StegoError::UnsupportedCarrier(
            "WAV declares zero channels".to_string(),
        ));
    }
    if spec.sample_format != SampleFormat::Int {
        return Err(StegoError::UnsupportedCarrier(format!(
            "only integer PCM WAV is supported, got {:?}",
            spec.sample_format
        )));
    }
    if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(StegoError::UnsupportedCarrier(format!(
            "unsupported sample width of {} bits",
            spec.bits_per_sample
        )));
    }
    Ok(())
}

/// The on-disk low byte of a sample. 8-bit WAV stores samples unsigned.
fn unit_of(sample: i32, bits: u16) -> u8 {
    if bits == 8 {
        (sample + 128) as u8
    } else {
        sample as u8
    }
}

/// Replaces the on-disk low byte of a sample, keeping the upper bytes.
fn with_unit(sample: i32, unit: u8, bits: u16) -> i32 {
    if bits == 8 {
        unit as i32 - 128
    } else {
        (sample & !0xFF) | unit as i32
    }
}

#[cfg(test)]
fn test_spec(bits_per_sample: u16) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    }
}

/// Creates a simple sine-wave test audio.
#[cfg(test)]
fn create_test_audio(sample_count: usize) -> AudioStego {
    let samples: Vec<i32> = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44100.0;
            let freq = 440.0; // A4 note
            (f64::sin(2.0 * std::f64::consts::PI * freq * t) * 16000.0) as i32
        })
        .collect();

    AudioStego::from_samples(test_spec(16), samples).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lsb(n: u8) -> LsbCount {
        LsbCount::new(n).unwrap()
    }

    #[test]
    fn test_capacity() {
        let audio = create_test_audio(10000);
        // 10000 samples * 2 bits / 8 bits per byte, no header
        let report = audio.capacity(lsb(2));
        assert_eq!(report.capacity_bits, 20_000);
        assert_eq!(report.capacity_bytes, 2_500);
        assert_eq!(report.frame_header_bytes, 0);
    }

    #[test]
    fn test_hide_and_recover_small() {
        let audio = create_test_audio(10000);
        let data = b"Hello, audio steganography!";

        let hidden = audio.hide(data, lsb(1)).unwrap();
        assert_eq!(hidden.recover(lsb(1), data.len()).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_every_depth() {
        let audio = create_test_audio(20000);
        let data: Vec<u8> = (0..2000).map(|i| (i * 31 % 256) as u8).collect();

        for n in 1..=8 {
            let hidden = audio.hide(&data, lsb(n)).unwrap();
            assert_eq!(hidden.recover(lsb(n), data.len()).unwrap(), data, "lsb_count = {n}");
        }
    }

    #[test]
    fn test_only_low_byte_changes() {
        let audio = create_test_audio(5000);
        let data = vec![0xFFu8; 4000];
        let hidden = audio.hide(&data, lsb(8)).unwrap();

        for (before, after) in audio.samples().iter().zip(hidden.samples()) {
            assert_eq!(before & !0xFF, after & !0xFF);
        }
    }

    #[test]
    fn test_high_bits_of_unit_untouched() {
        let audio = create_test_audio(5000);
        let data: Vec<u8> = (0..600).map(|i| (i % 256) as u8).collect();
        let hidden = audio.hide(&data, lsb(3)).unwrap();

        let high = !lsb(3).mask();
        for (before, after) in audio.units().zip(hidden.units()) {
            assert_eq!(before & high, after & high);
        }
    }

    #[test]
    fn test_capacity_boundary() {
        let audio = create_test_audio(1000);
        let capacity = audio.capacity(lsb(4)).capacity_bytes;
        assert_eq!(capacity, 500);

        let exact = vec![0x42u8; capacity];
        let hidden = audio.hide(&exact, lsb(4)).unwrap();
        assert_eq!(hidden.recover(lsb(4), capacity).unwrap(), exact);

        assert!(matches!(
            audio.hide(&vec![0x42u8; capacity + 1], lsb(4)),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_recover_more_than_capacity_fails() {
        let audio = create_test_audio(100);
        assert!(matches!(
            audio.recover(lsb(1), 13),
            Err(StegoError::CorruptFrame(_))
        ));
        assert!(audio.recover(lsb(1), 12).is_ok());
    }

    #[test]
    fn test_audio_too_short() {
        let audio = create_test_audio(100);
        let data = vec![0u8; 1000];

        let result = audio.hide(&data, lsb(2));
        assert!(matches!(result, Err(StegoError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_empty_data() {
        let audio = create_test_audio(10000);
        let hidden = audio.hide(&[], lsb(2)).unwrap();
        assert_eq!(hidden, audio);
        assert!(hidden.recover(lsb(2), 0).unwrap().is_empty());
    }

    #[test]
    fn test_eight_bit_samples_stay_in_range() {
        let samples: Vec<i32> = (0..4000).map(|i| (i % 256) - 128).collect();
        let audio = AudioStego::from_samples(test_spec(8), samples).unwrap();
        let data: Vec<u8> = (0..=255u8).cycle().take(3000).collect();

        let hidden = audio.hide(&data, lsb(6)).unwrap();
        assert!(hidden.samples().iter().all(|s| (-128..=127).contains(s)));

        let reloaded = AudioStego::from_bytes(&hidden.to_wav_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.recover(lsb(6), data.len()).unwrap(), data);
    }

    #[test]
    fn test_float_wav_rejected() {
        let spec = WavSpec {
            sample_format: SampleFormat::Float,
            bits_per_sample: 32,
            ..test_spec(32)
        };
        assert!(matches!(
            AudioStego::from_samples(spec, vec![]),
            Err(StegoError::UnsupportedCarrier(_))
        ));
    }

    #[test]
    fn test_wav_roundtrip() {
        let audio = create_test_audio(10000);
        let data = b"Test WAV roundtrip";

        let hidden = audio.hide(data, lsb(2)).unwrap();

        let wav_bytes = hidden.to_wav_bytes().unwrap();
        let loaded = AudioStego::from_bytes(&wav_bytes).unwrap();
        assert_eq!(loaded.recover(lsb(2), data.len()).unwrap(), data);
    }

    #[test]
    fn test_zero_channels_rejected() {
        let spec = WavSpec {
            channels: 0,
            ..test_spec(16)
        };
        assert!(matches!(
            AudioStego::from_samples(spec, vec![1, 2, 3]),
            Err(StegoError::UnsupportedCarrier(_))
        ));
    }
}
