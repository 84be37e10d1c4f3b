// Telemetry data domain models
use super::gauge::GaugeAnimator;
use super::stats::DerivedStats;
use chrono::NaiveDateTime;

/// Local wall-clock instant. Screens label samples with local hours.
pub type Timestamp = NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Rendering-ready view of one channel at one instant.
///
/// Built in full by the controller before it is published, and never
/// mutated afterwards. Readers that need the needle position between ticks
/// ask the embedded animator with their own frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub taken_at: Timestamp,
    pub stats: DerivedStats,
    /// Window values, most-recent-last.
    pub series: Vec<f64>,
    pub labels: Vec<String>,
    pub gauge_value: f64,
    pub gauge: GaugeAnimator,
    pub gauge_max: f64,
}

impl Snapshot {
    pub fn gauge_value_at(&self, now: Timestamp) -> f64 {
        self.gauge.value_at(now)
    }

    /// Fill ratio of a ring gauge, in `[0, 1]`.
    pub fn gauge_fraction_at(&self, now: Timestamp) -> f64 {
        gauge_fraction(self.gauge_value_at(now), self.gauge_max)
    }
}

pub fn gauge_fraction(value: f64, gauge_max: f64) -> f64 {
    if gauge_max <= 0.0 {
        return 0.0;
    }
    (value / gauge_max).clamp(0.0, 1.0)
}
