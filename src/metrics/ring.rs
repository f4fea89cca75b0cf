use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-capacity ring of recent delivery latencies. Oldest sample is dropped
/// once capacity is reached instead of growing without bound.
pub struct LatencyRing {
    capacity: usize,
    samples: VecDeque<Duration>,
}

impl LatencyRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_empty_ring_is_none() {
        let ring = LatencyRing::new(4);
        assert!(ring.average().is_none());
    }

    #[test]
    fn drops_oldest_sample_past_capacity() {
        let mut ring = LatencyRing::new(2);
        ring.push(Duration::from_millis(10));
        ring.push(Duration::from_millis(20));
        ring.push(Duration::from_millis(30));

        assert_eq!(ring.samples.len(), 2);
        assert_eq!(ring.average(), Some(Duration::from_millis(25)));
    }
}
