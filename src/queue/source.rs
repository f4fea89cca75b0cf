//! Pluggable source of synthetic delivery latency and failure, so tests can
//! force deterministic outcomes instead of depending on `rand`.

use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;

/// Supplies the two random draws a worker makes per delivery attempt: how
/// long the attempt takes, and whether it fails.
pub trait DeliverySource: Send + Sync {
    fn processing_delay(&self) -> Duration;
    fn roll_failure(&self) -> bool;
}

/// Production source: uniform delay in `[min, max)` and a weighted coin flip.
pub struct RandomSource {
    delay_min_ms: u64,
    delay_max_ms: u64,
    failure_rate: f64,
}

impl RandomSource {
    pub fn new(delay_min_ms: u64, delay_max_ms: u64, failure_rate: f64) -> Self {
        Self {
            delay_min_ms,
            delay_max_ms,
            failure_rate,
        }
    }
}

impl DeliverySource for RandomSource {
    fn processing_delay(&self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.delay_min_ms..self.delay_max_ms);
        Duration::from_millis(ms)
    }

    fn roll_failure(&self) -> bool {
        rand::thread_rng().gen_bool(self.failure_rate.clamp(0.0, 1.0))
    }
}

/// Deterministic source for tests: a scripted queue of failure outcomes and a
/// fixed delay. Once the script is exhausted, draws fall back to
/// `default_outcome`.
pub struct ScriptedSource {
    delay: Duration,
    failures: Mutex<std::collections::VecDeque<bool>>,
    default_outcome: bool,
}

impl ScriptedSource {
    pub fn new(delay: Duration, scripted_failures: Vec<bool>, default_outcome: bool) -> Self {
        Self {
            delay,
            failures: Mutex::new(scripted_failures.into()),
            default_outcome,
        }
    }

    /// A source that never fails and never sleeps — the common case for tests
    /// that only care about fan-out shape, not retry behavior.
    pub fn always_succeeds() -> Self {
        Self::new(Duration::ZERO, Vec::new(), false)
    }

    /// A source that always fails, for retry-exhaustion tests.
    pub fn always_fails() -> Self {
        Self::new(Duration::ZERO, Vec::new(), true)
    }
}

impl DeliverySource for ScriptedSource {
    fn processing_delay(&self) -> Duration {
        self.delay
    }

    fn roll_failure(&self) -> bool {
        let mut failures = self.failures.lock().unwrap();
        failures.pop_front().unwrap_or(self.default_outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_replays_in_order_then_falls_back_to_default() {
        let source = ScriptedSource::new(Duration::ZERO, vec![true, true, false], false);
        assert!(source.roll_failure());
        assert!(source.roll_failure());
        assert!(!source.roll_failure());
        assert!(!source.roll_failure());
    }

    #[test]
    fn always_fails_never_stops_failing() {
        let source = ScriptedSource::always_fails();
        for _ in 0..5 {
            assert!(source.roll_failure());
        }
    }
}
