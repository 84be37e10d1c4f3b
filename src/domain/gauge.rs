// Gauge animation - Time-based tween of the needle toward its latest target
use super::telemetry::Timestamp;
use serde::Deserialize;

/// Progress curve applied to the linear time ratio.
///
/// Every curve maps 0 to 0 and 1 to 1 and is strictly increasing in
/// between, which keeps the needle inside `[start, target]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseOutCubic,
    /// Quadratic in-out, the usual default of mobile timing animations
    #[default]
    EaseInOutQuad,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeAnimator {
    start: f64,
    target: f64,
    started_at: Timestamp,
    duration_ms: u64,
    easing: Easing,
}

impl GaugeAnimator {
    /// An animator already resting at `value`.
    pub fn settled(value: f64, now: Timestamp, duration_ms: u64, easing: Easing) -> Self {
        Self {
            start: value,
            target: value,
            started_at: now,
            duration_ms,
            easing,
        }
    }

    /// Start a new tween from whatever is on screen at `now`.
    pub fn retarget(&mut self, new_target: f64, now: Timestamp) {
        self.start = self.value_at(now);
        self.target = new_target;
        self.started_at = now;
    }

    pub fn value_at(&self, now: Timestamp) -> f64 {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.target;
        }
        self.start + (self.target - self.start) * self.easing.apply(t)
    }

    pub fn is_settled(&self, now: Timestamp) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    #[cfg(test)]
    pub fn start(&self) -> f64 {
        self.start
    }

    fn progress(&self, now: Timestamp) -> f64 {
        if self.duration_ms == 0 || self.start == self.target {
            return 1.0;
        }
        let elapsed_ms = (now - self.started_at).num_milliseconds() as f64;
        (elapsed_ms / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}
