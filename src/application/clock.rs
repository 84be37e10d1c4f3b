// Clock abstraction so time can be injected
use crate::domain::telemetry::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Follows tokio's clock, so paused-time tests move wall time too.
#[cfg(test)]
pub struct TokioClock {
    base: Timestamp,
    origin: tokio::time::Instant,
}

#[cfg(test)]
impl TokioClock {
    pub fn starting_at(base: Timestamp) -> Self {
        Self {
            base,
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = chrono::TimeDelta::from_std(self.origin.elapsed()).unwrap_or_default();
        self.base + elapsed
    }
}
