//! Exponential backoff with symmetric jitter

use std::time::Duration;

use rand::Rng;

use crate::config::PollConfig;

/// Backoff schedule for one poll
///
/// Tracks the nominal wait. Every call to [`Backoff::next_sleep`] returns the
/// nominal wait perturbed by up to ± `jitter` (never below zero), then
/// multiplies the nominal wait by the backoff factor. Growth is unconditional:
/// it does not depend on why the previous round did not terminate.
///
/// # Example
///
/// ```
/// use jobpoll::Backoff;
/// use std::time::Duration;
///
/// let mut backoff = Backoff::new(Duration::from_secs(1), 2.0, Duration::ZERO);
///
/// assert_eq!(backoff.next_sleep(), Duration::from_secs(1));
/// assert_eq!(backoff.next_sleep(), Duration::from_secs(2));
/// assert_eq!(backoff.next_sleep(), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    current: Duration,
    factor: f64,
    jitter: Duration,
}

impl Backoff {
    /// Create a backoff starting at `initial`
    ///
    /// Factors below 1.0 (and NaN) grow as 1.0.
    pub fn new(initial: Duration, factor: f64, jitter: Duration) -> Self {
        Self {
            current: initial,
            factor: factor.max(1.0),
            jitter,
        }
    }

    /// Create a backoff from a poll configuration
    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.initial_wait_time, config.backoff_factor, config.jitter)
    }

    /// Nominal wait for the next round, before jitter
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Draw the next sleep using the thread-local RNG, then grow
    pub fn next_sleep(&mut self) -> Duration {
        self.next_sleep_with(&mut rand::thread_rng())
    }

    /// Draw the next sleep from `rng`, then grow
    pub fn next_sleep_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let sleep = jittered(self.current, self.jitter, rng);
        self.grow();
        sleep
    }

    fn grow(&mut self) {
        let next = self.current.as_secs_f64() * self.factor;
        self.current = Duration::try_from_secs_f64(next).unwrap_or(Duration::MAX);
    }
}

/// Apply symmetric jitter to `nominal`, clamped at zero
pub fn jittered<R: Rng + ?Sized>(nominal: Duration, jitter: Duration, rng: &mut R) -> Duration {
    let nominal_secs = nominal.as_secs_f64();
    let offset = if jitter.is_zero() {
        0.0
    } else {
        let bound = jitter.as_secs_f64();
        rng.gen_range(-bound..=bound)
    };

    Duration::try_from_secs_f64((nominal_secs + offset).max(0.0)).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_nominal_growth() {
        let mut backoff = Backoff::new(Duration::from_secs(1), 2.0, Duration::ZERO);

        let sleeps: Vec<_> = (0..4).map(|_| backoff.next_sleep()).collect();
        assert_eq!(
            sleeps,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
        assert_eq!(backoff.current(), Duration::from_secs(16));
    }

    #[test]
    fn test_nominal_wait_multiplies_by_factor_every_round() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut backoff = Backoff::new(
            Duration::from_millis(300),
            1.7,
            Duration::from_millis(200),
        );

        for _ in 0..20 {
            let before = backoff.current();
            backoff.next_sleep_with(&mut rng);
            let expected = Duration::try_from_secs_f64(before.as_secs_f64() * 1.7).unwrap();
            assert_eq!(backoff.current(), expected);
            assert!(backoff.current() > before);
        }
    }

    #[test]
    fn test_zero_initial_wait_stays_zero() {
        let mut backoff = Backoff::new(Duration::ZERO, 2.0, Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(backoff.next_sleep(), Duration::ZERO);
        }
    }

    #[test]
    fn test_factor_one_is_fixed_interval() {
        let mut backoff = Backoff::new(Duration::from_millis(250), 1.0, Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(backoff.next_sleep(), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let nominal = Duration::from_secs(2);
        let jitter = Duration::from_millis(500);

        for _ in 0..1_000 {
            let sleep = jittered(nominal, jitter, &mut rng);
            assert!(sleep >= Duration::from_millis(1_500), "{sleep:?}");
            assert!(sleep <= Duration::from_millis(2_500), "{sleep:?}");
        }
    }

    #[test]
    fn test_jitter_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(3);
        let nominal = Duration::from_secs(1);
        let jitter = Duration::from_millis(500);

        let draws: Vec<_> = (0..1_000)
            .map(|_| jittered(nominal, jitter, &mut rng))
            .collect();

        assert!(draws.iter().any(|d| *d < nominal));
        assert!(draws.iter().any(|d| *d > nominal));
    }

    #[test]
    fn test_sleep_is_clamped_at_zero() {
        let mut rng = StdRng::seed_from_u64(11);
        let nominal = Duration::from_millis(100);
        let jitter = Duration::from_secs(1);

        let draws: Vec<_> = (0..1_000)
            .map(|_| jittered(nominal, jitter, &mut rng))
            .collect();

        // Most draws land below zero before clamping
        assert!(draws.iter().any(|d| d.is_zero()));
        assert!(draws.iter().all(|d| *d <= Duration::from_millis(1_100)));
    }

    #[test]
    fn test_growth_saturates() {
        let mut backoff = Backoff::new(Duration::from_secs(u64::MAX / 2), 4.0, Duration::ZERO);
        backoff.next_sleep();
        assert_eq!(backoff.current(), Duration::MAX);
        backoff.next_sleep();
        assert_eq!(backoff.current(), Duration::MAX);
    }

    #[test]
    fn test_from_config() {
        let config = PollConfig::default();
        let backoff = Backoff::from_config(&config);
        assert_eq!(backoff.current(), config.initial_wait_time);
    }
}
