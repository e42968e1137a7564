//! Simulated tool latency

use crate::config::TimingConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Source of the artificial delays applied by the engine
pub trait Latency: Send + 'static {
    /// Delay between Initialize and the lab becoming ready
    fn boot_delay(&mut self) -> Duration;

    /// Delay before a command's output is appended
    fn response_delay(&mut self) -> Duration;
}

/// Fixed boot delay, response delays drawn uniformly from `[min, max]`
#[derive(Debug, Clone)]
pub struct UniformLatency {
    boot: Duration,
    min_ms: u64,
    max_ms: u64,
    rng: StdRng,
}

impl UniformLatency {
    pub fn new(boot: Duration, min: Duration, max: Duration, seed: Option<u64>) -> Self {
        let min_ms = min.as_millis() as u64;
        let max_ms = (max.as_millis() as u64).max(min_ms);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { boot, min_ms, max_ms, rng }
    }

    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::new(
            Duration::from_millis(timing.boot_delay_ms),
            Duration::from_millis(timing.response_delay_min_ms),
            Duration::from_millis(timing.response_delay_max_ms),
            timing.seed,
        )
    }
}

impl Default for UniformLatency {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}

impl Latency for UniformLatency {
    fn boot_delay(&mut self) -> Duration {
        self.boot
    }

    fn response_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(self.min_ms..=self.max_ms))
    }
}

/// Constant delays, handy for demos and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLatency {
    pub boot: Duration,
    pub response: Duration,
}

impl FixedLatency {
    pub fn new(boot: Duration, response: Duration) -> Self {
        Self { boot, response }
    }
}

impl Latency for FixedLatency {
    fn boot_delay(&mut self) -> Duration {
        self.boot
    }

    fn response_delay(&mut self) -> Duration {
        self.response
    }
}

impl<L: Latency + ?Sized> Latency for Box<L> {
    fn boot_delay(&mut self) -> Duration {
        (**self).boot_delay()
    }

    fn response_delay(&mut self) -> Duration {
        (**self).response_delay()
    }
}
