// =============================================================================
// CYBERSHIELD CORE — kindness.rs
// RollingAggregator — session-wide empathy / respect / risk averages
// =============================================================================
//
// Running sums, not history: each record() is O(1) no matter how long the
// session runs.
//
//   avg(x)         = Σx / n
//   kindness_index = (avg(empathy) + avg(respect) + (1 − avg(risk))) / 3
//
// Scores are clamped into [0,1] before they are summed so the rings driven by
// these averages can never overflow.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::classification::{clamp_unit, percent, ClassificationResult};

// -----------------------------------------------------------------------------
// KindnessAggregate — read-only snapshot
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KindnessAggregate {
    pub empathy_avg: f64,
    pub respect_avg: f64,
    pub risk_avg: f64,
    pub sample_count: u64,
}

impl KindnessAggregate {
    /// Composite index; 0 before the first sample.
    pub fn kindness_index(&self) -> f64 {
        if self.sample_count == 0 { return 0.0; }
        (self.empathy_avg + self.respect_avg + (1.0 - self.risk_avg)) / 3.0
    }

    pub fn kindness_percent(&self) -> u32 {
        percent(self.kindness_index())
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

// -----------------------------------------------------------------------------
// RollingAggregator
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RollingAggregator {
    empathy_sum: f64,
    respect_sum: f64,
    risk_sum: f64,
    samples: u64,
}

impl RollingAggregator {
    pub fn new() -> Self {
        RollingAggregator::default()
    }

    pub fn record(&mut self, result: &ClassificationResult) -> KindnessAggregate {
        self.empathy_sum += clamp_unit(result.empathy_score);
        self.respect_sum += clamp_unit(result.respect_score);
        self.risk_sum += clamp_unit(result.risk);
        self.samples += 1;
        self.snapshot()
    }

    pub fn snapshot(&self) -> KindnessAggregate {
        if self.samples == 0 {
            return KindnessAggregate::default();
        }
        let n = self.samples as f64;
        KindnessAggregate {
            empathy_avg: self.empathy_sum / n,
            respect_avg: self.respect_sum / n,
            risk_avg: self.risk_sum / n,
            sample_count: self.samples,
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.samples
    }
}
