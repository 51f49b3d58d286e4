//! Append-only fragmentation timeline
//!
//! One sample per mutating operation. Samples are never edited or removed.

use crate::core::stats::Stats;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fragmentation level after one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySample {
    pub timestamp: DateTime<Utc>,
    pub fragmentation_percent: f64,
}

impl HistorySample {
    /// Sample stamped with the current time
    pub fn now(stats: &Stats) -> Self {
        HistorySample {
            timestamp: Utc::now(),
            fragmentation_percent: stats.fragmentation_percent,
        }
    }
}

/// Ordered log of history samples
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FragmentationHistory {
    samples: Vec<HistorySample>,
}

impl FragmentationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: &Stats) -> &HistorySample {
        self.push(HistorySample::now(stats))
    }

    pub fn push(&mut self, sample: HistorySample) -> &HistorySample {
        self.samples.push(sample);
        &self.samples[self.samples.len() - 1]
    }

    pub fn samples(&self) -> &[HistorySample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Peak fragmentation seen so far
    pub fn peak(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.fragmentation_percent)
            .fold(None, |max, v| Some(max.map_or(v, |m: f64| m.max(v))))
    }
}
