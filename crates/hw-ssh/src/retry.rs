//! Connect-retry schedule for one target

use std::time::Duration;

use hw_core::config::BackoffConfig;

/// Delays to sleep between the connection attempts to one target
///
/// Yields one delay fewer than the attempt budget, then ends; the caller
/// gives up once the schedule is exhausted. Delay `n` (0-based) is
/// `initial * multiplier^n`, capped at `max`, plus up to `jitter` of itself.
#[derive(Debug, Clone)]
pub struct ConnectRetries {
    config: BackoffConfig,
    issued: u32,
    retries: u32,
}

impl ConnectRetries {
    /// Schedule for `attempts` total attempts (at least one)
    pub fn new(config: &BackoffConfig, attempts: u32) -> Self {
        Self {
            config: config.clone(),
            issued: 0,
            retries: attempts.max(1) - 1,
        }
    }

    /// Total attempts this schedule allows
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Un-jittered delay before retry `n`
    fn base_delay(&self, n: u32) -> Duration {
        let factor = self.config.multiplier.max(1.0).powi(n.min(i32::MAX as u32) as i32);
        let secs = self.config.initial.as_secs_f64() * factor;
        let max = self.config.max.as_secs_f64();
        if secs.is_finite() && secs < max {
            Duration::from_secs_f64(secs)
        } else {
            self.config.max
        }
    }
}

impl Iterator for ConnectRetries {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.issued >= self.retries {
            return None;
        }
        let delay = self.base_delay(self.issued);
        self.issued += 1;

        let jitter = self.config.jitter.clamp(0.0, 1.0) * rand::random::<f64>();
        Some(delay + delay.mul_f64(jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(initial: u64, max: u64, jitter: f64) -> BackoffConfig {
        BackoffConfig {
            initial: Duration::from_secs(initial),
            max: Duration::from_secs(max),
            multiplier: 2.0,
            jitter,
        }
    }

    #[test]
    fn test_single_attempt_never_retries() {
        let mut retries = ConnectRetries::new(&config(1, 30, 0.0), 1);
        assert_eq!(retries.attempts(), 1);
        assert_eq!(retries.next(), None);

        // Zero is treated as one attempt
        assert_eq!(ConnectRetries::new(&config(1, 30, 0.0), 0).count(), 0);
    }

    #[test]
    fn test_delays_grow_until_budget_runs_out() {
        let delays: Vec<_> = ConnectRetries::new(&config(1, 60, 0.0), 4).collect();
        assert_eq!(
            delays,
            vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn test_delays_are_capped() {
        let delays: Vec<_> = ConnectRetries::new(&config(20, 30, 0.0), 4).collect();
        assert_eq!(
            delays,
            vec![Duration::from_secs(20), Duration::from_secs(30), Duration::from_secs(30)]
        );
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut cfg = config(4, 60, 0.5);
        cfg.multiplier = 1.0;
        for delay in ConnectRetries::new(&cfg, 21) {
            assert!(delay >= Duration::from_secs(4));
            assert!(delay <= Duration::from_secs(6));
        }
    }
}
