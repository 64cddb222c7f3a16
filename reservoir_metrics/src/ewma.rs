use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

/// The tick period the standard 1, 5 and 15 minute averages are tuned for
pub const EWMA_TICK_PERIOD: Duration = Duration::from_secs(5);

/// An exponentially weighted per-second moving average of event counts,
/// the way UNIX load averages are computed.
///
/// Events accumulate until a whole tick period has passed. Then the average
/// folds in the rate of the period that just ended and decays through any
/// further periods that passed without events.
#[derive(Debug)]
pub struct Ewma {
    alpha: f64,
    period: Duration,
    state: Mutex<EwmaState>,
}

#[derive(Debug)]
struct EwmaState {
    /// per-second rate
    rate: f64,
    uncounted: i64,
    timestamp: Instant,
    initialized: bool,
}

impl Ewma {
    /// An average with smoothing constant `alpha`, tuned for updates every `period`.
    pub fn new(alpha: f64, period: Duration) -> Self {
        Self::new_at(alpha, period, Instant::now())
    }

    pub(crate) fn new_at(alpha: f64, period: Duration, now: Instant) -> Self {
        Self {
            alpha,
            period,
            state: Mutex::new(EwmaState {
                rate: 0.0,
                uncounted: 0,
                timestamp: now,
                initialized: false,
            }),
        }
    }

    /// A one-minute moving average
    pub fn one_minute() -> Self {
        Self::for_window_minutes(1.0, Instant::now())
    }

    /// A five-minute moving average
    pub fn five_minute() -> Self {
        Self::for_window_minutes(5.0, Instant::now())
    }

    /// A fifteen-minute moving average
    pub fn fifteen_minute() -> Self {
        Self::for_window_minutes(15.0, Instant::now())
    }

    pub(crate) fn for_window_minutes(minutes: f64, now: Instant) -> Self {
        let alpha = 1.0 - (-EWMA_TICK_PERIOD.as_secs_f64() / 60.0 / minutes).exp();
        Self::new_at(alpha, EWMA_TICK_PERIOD, now)
    }

    /// The smoothing constant
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Count `n` events
    pub fn update(&self, n: i64) {
        self.update_at(n, Instant::now())
    }

    pub(crate) fn update_at(&self, n: i64, now: Instant) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.fold_elapsed_periods(&mut state, now);
        state.uncounted = state.uncounted.wrapping_add(n);
    }

    /// Moving average rate of events per second
    pub fn rate(&self) -> f64 {
        self.rate_at(Instant::now())
    }

    pub(crate) fn rate_at(&self, now: Instant) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.fold_elapsed_periods(&mut state, now);
        if state.initialized {
            state.rate
        } else {
            // Nothing folded yet: report what the first fold would produce.
            state.uncounted as f64 / self.period.as_secs_f64()
        }
    }

    /// Advance the average through any whole periods that have passed,
    /// even if no events arrived.
    pub fn tick(&self) {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&self, now: Instant) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.fold_elapsed_periods(&mut state, now);
    }

    fn fold_elapsed_periods(&self, state: &mut EwmaState, now: Instant) {
        let period_nanos = self.period.as_nanos().max(1);
        let periods = now.saturating_duration_since(state.timestamp).as_nanos() / period_nanos;
        if periods == 0 {
            return;
        }

        let period_rate = state.uncounted as f64 / self.period.as_secs_f64();
        state.rate = if state.initialized {
            self.alpha * period_rate + (1.0 - self.alpha) * state.rate
        } else {
            state.initialized = true;
            period_rate
        };
        // The periods after the first saw no events.
        let quiet_periods = (periods - 1).min(i32::MAX as u128) as i32;
        state.rate *= (1.0 - self.alpha).powi(quiet_periods);
        state.uncounted = 0;

        let consumed = self.period.as_nanos() * periods;
        state.timestamp += Duration::from_nanos(consumed.min(u64::MAX as u128) as u64);
    }
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use super::Ewma;

    fn elapse_minute(ewma: &Ewma, start: Instant, minute: u64) -> Instant {
        let now = start + Duration::from_secs(5) + Duration::from_secs(60 * minute);
        ewma.tick_at(now);
        now
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {expected} but got {actual}"
        );
    }

    #[test]
    fn uncounted_wraps_like_counters() {
        let ewma = Ewma::one_minute();
        ewma.update(i64::MAX);
        ewma.update(1);
        assert!(ewma.rate().is_finite());
    }

    #[test]
    fn cold_start_is_nonzero() {
        let ewma = Ewma::one_minute();
        ewma.update(1);
        assert!(0.0 < ewma.rate());
    }

    #[test]
    fn rate_holds_within_a_period() {
        let start = Instant::now();
        let ewma = Ewma::for_window_minutes(1.0, start);
        ewma.update_at(3, start);
        let first = ewma.rate_at(start + Duration::from_secs(5));
        assert_close(0.6, first);
        ewma.update_at(100, start + Duration::from_secs(6));
        assert_close(first, ewma.rate_at(start + Duration::from_secs(9)));
    }

    #[test]
    fn one_minute_decay() {
        let start = Instant::now();
        let ewma = Ewma::for_window_minutes(1.0, start);
        ewma.update_at(3, start);
        let now = start + Duration::from_secs(5);
        ewma.tick_at(now);
        assert_close(0.6, ewma.rate_at(now));

        elapse_minute(&ewma, start, 1);
        let after_one = ewma.rate_at(start + Duration::from_secs(65));
        assert_close(0.6 * (-1.0_f64).exp(), after_one);
    }

    #[test]
    fn five_minute_decay() {
        let start = Instant::now();
        let ewma = Ewma::for_window_minutes(5.0, start);
        ewma.update_at(3, start);
        ewma.tick_at(start + Duration::from_secs(5));
        for minute in 1..=5 {
            elapse_minute(&ewma, start, minute);
        }
        let rate = ewma.rate_at(start + Duration::from_secs(5 + 300));
        assert_close(0.6 * (-1.0_f64).exp(), rate);
    }

    #[test]
    fn decay_ignores_poll_cadence() {
        let start = Instant::now();
        let polled = Ewma::for_window_minutes(15.0, start);
        let skipped = Ewma::for_window_minutes(15.0, start);
        polled.update_at(10, start);
        skipped.update_at(10, start);
        for tick in 1..=24 {
            polled.tick_at(start + Duration::from_secs(5 * tick));
        }
        let end = start + Duration::from_secs(120);
        assert_close(polled.rate_at(end), skipped.rate_at(end));
    }

    #[test]
    fn fractional_period_carries_forward() {
        let start = Instant::now();
        let ewma = Ewma::for_window_minutes(1.0, start);
        ewma.update_at(5, start);
        // 7.5 seconds consumes one period and leaves 2.5 seconds.
        ewma.tick_at(start + Duration::from_millis(7_500));
        ewma.update_at(5, start + Duration::from_millis(8_000));
        let before = ewma.rate_at(start + Duration::from_millis(9_900));
        assert_close(1.0, before);
        let after = ewma.rate_at(start + Duration::from_millis(10_000));
        assert_close(1.0, after);
    }
}
