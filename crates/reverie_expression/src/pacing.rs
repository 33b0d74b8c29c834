use rand::Rng;
use std::time::Duration;

/// Randomized pause before a reply so responses do not arrive instantly.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl Pacer {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms: min_delay_ms.min(max_delay_ms),
            max_delay_ms: max_delay_ms.max(min_delay_ms),
        }
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }

    /// Uniform delay in [min, max].
    pub fn response_delay(&self) -> Duration {
        self.response_delay_with(&mut rand::thread_rng())
    }

    pub fn response_delay_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let ms = rng.gen_range(self.min_delay_ms..=self.max_delay_ms);
        Duration::from_millis(ms)
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(800, 4000)
    }
}
