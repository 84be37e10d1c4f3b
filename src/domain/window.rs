// Fixed-capacity rolling window of samples
use super::telemetry::Sample;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest first when the window is full.
    pub fn push(&mut self, sample: Sample) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Pre-populate with history. Only the newest `capacity` samples survive.
    pub fn seed<I>(&mut self, initial: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        for sample in initial {
            self.push(sample);
        }
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
