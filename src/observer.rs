//! Caller-supplied sinks for reports and progress.
//!
//! The library never prints. Front ends pass a [`StegoObserver`] into the
//! operations in [`crate::ops`] and decide themselves how to show what
//! happened.

use std::path::Path;
use tracing::{info, trace};

use crate::capacity::{CapacityReport, PayloadAnalysis};
use crate::detect::AnomalyReport;

/// Phase of work a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `done` carrier units written out of `total`.
    Embedding,
    /// `done` payload bytes read.
    Recovery,
    /// `done` block rows scanned out of `total`.
    EntropyScan,
}

/// Something worth reporting that happened during an operation.
#[derive(Debug, Clone, Copy)]
pub enum StegoEvent<'a> {
    CapacityAnalyzed(&'a PayloadAnalysis),
    PayloadHidden {
        payload_bytes: usize,
        embedded_bytes: usize,
        units_touched: usize,
        capacity: &'a CapacityReport,
    },
    PayloadRecovered {
        bytes: usize,
    },
    BitPlaneWritten {
        path: &'a Path,
        lsb_count: u8,
    },
    AnomaliesDetected(&'a AnomalyReport),
}

/// Receives events and progress. Both methods default to doing nothing.
pub trait StegoObserver {
    fn on_event(&mut self, event: &StegoEvent<'_>) {
        let _ = event;
    }

    /// Observational only: the operation does not wait on or react to it.
    fn on_progress(&mut self, stage: Stage, done: usize, total: usize) {
        let _ = (stage, done, total);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StegoObserver for NoopObserver {}

/// Forwards events to `tracing` at `info` and progress at `trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StegoObserver for TracingObserver {
    fn on_event(&mut self, event: &StegoEvent<'_>) {
        match event {
            StegoEvent::CapacityAnalyzed(analysis) => info!(
                capacity_bytes = analysis.capacity.capacity_bytes,
                capacity_bits = analysis.capacity.capacity_bits,
                lsb_count = analysis.capacity.lsb_count,
                payload_bytes = analysis.payload_bytes,
                body_bytes = analysis.body_bytes,
                fits = analysis.fits,
                "capacity analyzed"
            ),
            StegoEvent::PayloadHidden {
                payload_bytes,
                embedded_bytes,
                units_touched,
                capacity,
            } => info!(
                payload_bytes,
                embedded_bytes,
                units_touched,
                carrier_units = capacity.carrier_units,
                "payload hidden"
            ),
            StegoEvent::PayloadRecovered { bytes } => info!(bytes, "payload recovered"),
            StegoEvent::BitPlaneWritten { path, lsb_count } => {
                info!(path = %path.display(), lsb_count, "bit-plane image written")
            }
            StegoEvent::AnomaliesDetected(report) => info!(
                mean = report.mean,
                std_dev = report.std_dev,
                anomalies = report.anomalies.len(),
                likely_tampered = report.likely_tampered,
                "entropy scan finished"
            ),
        }
    }

    fn on_progress(&mut self, stage: Stage, done: usize, total: usize) {
        trace!(?stage, done, total, "progress");
    }
}
