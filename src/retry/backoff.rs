//! Geometric interval schedule.

use std::time::Duration;

/// Shortest interval the schedule yields; a zero interval would spin.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Yields `initial`, `initial * m`, `initial * m^2`, ... capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    multiplier: f64,
    max: Duration,
}

impl Backoff {
    /// Multipliers below 1.0 (or NaN) are treated as 1.0. `initial` and `max`
    /// are raised to at least [`MIN_INTERVAL`].
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        let multiplier = if multiplier >= 1.0 && multiplier.is_finite() {
            multiplier
        } else {
            1.0
        };
        let max = max.max(MIN_INTERVAL);
        Self {
            current: initial.max(MIN_INTERVAL).min(max),
            multiplier,
            max,
        }
    }

    /// Return the current interval and advance the schedule.
    pub fn next_interval(&mut self) -> Duration {
        let interval = self.current;
        let grown = (self.current.as_nanos() as f64 * self.multiplier).round();
        self.current = if grown >= self.max.as_nanos() as f64 {
            self.max
        } else {
            Duration::from_nanos(grown as u64)
        };
        interval
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_capped() {
        let schedule = Backoff::new(Duration::from_millis(100), 2.0, Duration::from_millis(700));
        let intervals: Vec<_> = schedule.take(5).collect();

        assert_eq!(
            intervals,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(700),
                Duration::from_millis(700),
            ]
        );
    }

    #[test]
    fn fractional_multiplier_grows_geometrically() {
        let mut schedule = Backoff::new(Duration::from_millis(400), 1.5, Duration::from_secs(10));
        assert_eq!(schedule.next_interval(), Duration::from_millis(400));
        assert_eq!(schedule.next_interval(), Duration::from_millis(600));
        assert_eq!(schedule.next_interval(), Duration::from_millis(900));
    }

    #[test]
    fn bad_multiplier_falls_back_to_constant() {
        let mut schedule = Backoff::new(Duration::from_millis(50), 0.5, Duration::from_secs(1));
        assert_eq!(schedule.next_interval(), Duration::from_millis(50));
        assert_eq!(schedule.next_interval(), Duration::from_millis(50));

        let mut schedule = Backoff::new(Duration::from_millis(50), f64::NAN, Duration::from_secs(1));
        assert_eq!(schedule.next_interval(), Duration::from_millis(50));
        assert_eq!(schedule.next_interval(), Duration::from_millis(50));
    }

    #[test]
    fn initial_above_max_is_clamped() {
        let mut schedule = Backoff::new(Duration::from_secs(5), 2.0, Duration::from_secs(1));
        assert_eq!(schedule.next_interval(), Duration::from_secs(1));
    }

    #[test]
    fn zero_initial_interval_is_raised_to_minimum() {
        let schedule = Backoff::new(Duration::ZERO, 2.0, Duration::from_secs(1));
        let intervals: Vec<_> = schedule.take(3).collect();

        assert_eq!(
            intervals,
            vec![
                Duration::from_millis(1),
                Duration::from_millis(2),
                Duration::from_millis(4),
            ]
        );
    }

    #[test]
    fn zero_max_interval_is_raised_to_minimum() {
        let mut schedule = Backoff::new(Duration::ZERO, 2.0, Duration::ZERO);
        assert_eq!(schedule.next_interval(), MIN_INTERVAL);
        assert_eq!(schedule.next_interval(), MIN_INTERVAL);
    }
}
