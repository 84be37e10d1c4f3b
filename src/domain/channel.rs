// Channel domain model
use super::gauge::Easing;
use super::labels::LabelStyle;
use crate::error::{EngineError, Result};
use chrono::TimeDelta;
use serde::Deserialize;

/// Longest stretch of time a channel's window may cover.
const MAX_HISTORY_DAYS: i64 = 3_650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    SoilHumidity,
    AirHumidity,
    AirTemperature,
    Light,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::SoilHumidity => "soil_humidity",
            ChannelKind::AirHumidity => "air_humidity",
            ChannelKind::AirTemperature => "air_temperature",
            ChannelKind::Light => "light",
        }
    }
}

/// Stochastic model stepping a channel from one reading to the next.
#[derive(Debug, Clone, PartialEq)]
pub enum WalkModel {
    /// Random walk pulled back toward `target_mean`.
    MeanReverting {
        target_mean: f64,
        reversion_rate: f64,
        noise_amplitude: f64,
    },
    /// Fresh draw across the channel's bounds, ignoring the previous value.
    Uniform,
}

/// History a channel starts with when it is mounted.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedProfile {
    /// Fixed readings, oldest first, one tick interval apart.
    Flat(Vec<f64>),
    /// `capacity` readings `step_minutes` apart tracing a noisy sine.
    Sinusoid {
        base: f64,
        amplitude: f64,
        period: f64,
        noise: f64,
        step_minutes: i64,
        lower: f64,
        upper: f64,
    },
}

/// Where the gauge needle points when the channel is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeStart {
    #[default]
    Latest,
    Average,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelParams {
    pub id: String,
    pub kind: ChannelKind,
    pub title: String,
    pub unit: String,
    pub capacity: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub model: WalkModel,
    pub seed: SeedProfile,
    pub tick_interval_ms: u64,
    pub animation_duration_ms: u64,
    pub max_labels: usize,
    pub label_style: LabelStyle,
    pub easing: Easing,
    pub gauge_max: f64,
    pub gauge_start: GaugeStart,
    pub gauge_sweep_in: bool,
}

impl ChannelParams {
    /// Parameters with a uniform model, no seed and the 5 s / 700 ms cadence.
    pub fn new(id: &str, kind: ChannelKind, capacity: usize, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: id.to_string(),
            unit: String::new(),
            capacity,
            lower_bound,
            upper_bound,
            model: WalkModel::Uniform,
            seed: SeedProfile::Flat(Vec::new()),
            tick_interval_ms: 5_000,
            animation_duration_ms: 700,
            max_labels: 6,
            label_style: LabelStyle::Clock,
            easing: Easing::default(),
            gauge_max: upper_bound,
            gauge_start: GaugeStart::Latest,
            gauge_sweep_in: false,
        }
    }

    pub fn with_model(mut self, model: WalkModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_seed(mut self, seed: SeedProfile) -> Self {
        self.seed = seed;
        self
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower_bound + self.upper_bound) / 2.0
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower_bound, self.upper_bound)
    }

    pub fn reversion_rate(&self) -> f64 {
        match self.model {
            WalkModel::MeanReverting { reversion_rate, .. } => reversion_rate,
            WalkModel::Uniform => 0.0,
        }
    }

    pub fn noise_amplitude(&self) -> f64 {
        match self.model {
            WalkModel::MeanReverting { noise_amplitude, .. } => noise_amplitude,
            WalkModel::Uniform => self.upper_bound - self.lower_bound,
        }
    }

    /// Reject parameters that could let `tick` produce out-of-domain data.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(EngineError::invalid(&self.id, reason));

        if self.capacity == 0 {
            return fail("capacity must be at least 1".into());
        }
        if !self.lower_bound.is_finite() || !self.upper_bound.is_finite() {
            return fail("bounds must be finite".into());
        }
        if self.lower_bound >= self.upper_bound {
            return fail(format!(
                "lower bound {} must be below upper bound {}",
                self.lower_bound, self.upper_bound
            ));
        }
        if self.tick_interval_ms == 0 {
            return fail("tick interval must be positive".into());
        }
        let seeded = match &self.seed {
            SeedProfile::Flat(values) => values.len(),
            SeedProfile::Sinusoid { .. } => 0,
        };
        let tick_span = i64::try_from(self.tick_interval_ms)
            .ok()
            .and_then(|ms| span(ms, self.capacity.max(seeded)));
        if !fits_history(tick_span) {
            return fail(format!(
                "tick interval {} ms spans more than {MAX_HISTORY_DAYS} days of history",
                self.tick_interval_ms
            ));
        }
        if self.max_labels == 0 {
            return fail("max_labels must be at least 1".into());
        }
        if !(self.gauge_max > 0.0) {
            return fail(format!("gauge_max {} must be positive", self.gauge_max));
        }

        if let WalkModel::MeanReverting {
            target_mean,
            reversion_rate,
            noise_amplitude,
        } = self.model
        {
            if !(0.0..=1.0).contains(&reversion_rate) {
                return fail(format!("reversion rate {reversion_rate} outside [0, 1]"));
            }
            if !(noise_amplitude >= 0.0) {
                return fail(format!("noise amplitude {noise_amplitude} is negative"));
            }
            if !(self.lower_bound..=self.upper_bound).contains(&target_mean) {
                return fail(format!("target mean {target_mean} outside bounds"));
            }
        }

        match &self.seed {
            SeedProfile::Flat(values) => {
                if let Some(v) = values
                    .iter()
                    .find(|v| !(self.lower_bound..=self.upper_bound).contains(*v))
                {
                    return fail(format!("seed value {v} outside bounds"));
                }
            }
            SeedProfile::Sinusoid {
                period,
                step_minutes,
                lower,
                upper,
                ..
            } => {
                if *period == 0.0 || !period.is_finite() {
                    return fail("sinusoid period must be non-zero".into());
                }
                if *step_minutes <= 0 {
                    return fail("sinusoid step must be positive".into());
                }
                let step_span = step_minutes
                    .checked_mul(60_000)
                    .and_then(|ms| span(ms, self.capacity));
                if !fits_history(step_span) {
                    return fail(format!(
                        "sinusoid step {step_minutes} min spans more than {MAX_HISTORY_DAYS} days of history"
                    ));
                }
                if lower >= upper || *lower < self.lower_bound || *upper > self.upper_bound {
                    return fail(format!("seed range [{lower}, {upper}] outside bounds"));
                }
            }
        }

        Ok(())
    }
}

/// `count` steps of `unit_ms`, if that is representable.
fn span(unit_ms: i64, count: usize) -> Option<TimeDelta> {
    let count = i64::try_from(count).ok()?;
    TimeDelta::try_milliseconds(unit_ms.checked_mul(count)?)
}

fn fits_history(span: Option<TimeDelta>) -> bool {
    span.is_some_and(|s| s <= TimeDelta::days(MAX_HISTORY_DAYS))
}
