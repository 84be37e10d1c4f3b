// Wall-clock time source
use crate::application::clock::Clock;
use crate::domain::telemetry::Timestamp;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Local::now().naive_local()
    }
}
