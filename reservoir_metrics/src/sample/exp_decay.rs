use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{Sample, SampleSnapshot};

/// Decay factor used by the default histogram and timer samples. It heavily
/// biases toward roughly the last 5 minutes of observations.
pub const DEFAULT_DECAY_ALPHA: f64 = 0.015;

/// How long priorities grow before they are scaled back down
pub const RESCALE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

/// A forward-decaying priority sample, as described by Cormode et al.
/// "Forward Decay: A Practical Time Decay Model for Streaming Systems".
///
/// Each observation at time t gets priority `exp(alpha * (t - t0)) / u` for a
/// fresh uniform `u` in (0, 1]. The sample keeps the `reservoir_size` highest
/// priorities, which skews it toward recent observations.
#[derive(Debug)]
pub struct ExpDecaySample {
    alpha: f64,
    reservoir_size: usize,
    state: Mutex<ExpDecayState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Prioritized {
    priority: OrderedFloat<f64>,
    value: i64,
}

#[derive(Debug)]
struct ExpDecayState {
    count: i64,
    /// min-heap on priority; the root is the next eviction
    values: BinaryHeap<Reverse<Prioritized>>,
    start_time: Instant,
    next_rescale: Instant,
    rng: StdRng,
}

impl ExpDecaySample {
    /// A decaying sample of `reservoir_size` values with decay factor `alpha`
    pub fn new(reservoir_size: usize, alpha: f64) -> Self {
        Self::with_rng(reservoir_size, alpha, StdRng::from_entropy(), Instant::now())
    }

    /// A decaying sample with a reproducible random sequence
    pub fn with_seed(reservoir_size: usize, alpha: f64, seed: u64) -> Self {
        Self::with_rng(
            reservoir_size,
            alpha,
            StdRng::seed_from_u64(seed),
            Instant::now(),
        )
    }

    fn with_rng(reservoir_size: usize, alpha: f64, rng: StdRng, now: Instant) -> Self {
        Self {
            alpha,
            reservoir_size,
            state: Mutex::new(ExpDecayState {
                count: 0,
                values: BinaryHeap::with_capacity(reservoir_size),
                start_time: now,
                next_rescale: now + RESCALE_THRESHOLD,
                rng,
            }),
        }
    }

    /// Maximum number of values held
    pub fn reservoir_size(&self) -> usize {
        self.reservoir_size
    }

    /// The decay factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn state(&self) -> MutexGuard<'_, ExpDecayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn update_at(&self, value: i64, now: Instant) {
        let mut state = self.state();
        if state.next_rescale <= now {
            self.rescale(&mut state, now);
        }
        state.count += 1;

        // gen() is in [0, 1); flip it so the divisor is never zero.
        let uniform = 1.0 - state.rng.gen::<f64>();
        let age = now.saturating_duration_since(state.start_time).as_secs_f64();
        let candidate = Prioritized {
            priority: OrderedFloat((self.alpha * age).exp() / uniform),
            value,
        };

        if state.values.len() < self.reservoir_size {
            state.values.push(Reverse(candidate));
            return;
        }
        let outranks_lowest = state
            .values
            .peek()
            .is_some_and(|Reverse(lowest)| lowest.priority < candidate.priority);
        if outranks_lowest {
            state.values.pop();
            state.values.push(Reverse(candidate));
        }
    }

    /// Multiply every priority by the same positive factor and move the
    /// reference time up to `now`. Relative order does not change.
    fn rescale(&self, state: &mut ExpDecayState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.start_time).as_secs_f64();
        let factor = (-self.alpha * elapsed).exp();
        let rescaled: Vec<Reverse<Prioritized>> = std::mem::take(&mut state.values)
            .into_vec()
            .into_iter()
            .map(|Reverse(prioritized)| {
                Reverse(Prioritized {
                    priority: OrderedFloat(prioritized.priority.0 * factor),
                    value: prioritized.value,
                })
            })
            .collect();
        state.values = BinaryHeap::from(rescaled);
        state.values.reserve(self.reservoir_size.saturating_sub(state.values.len()));
        state.start_time = now;
        state.next_rescale = now + RESCALE_THRESHOLD;
        log::debug!("rescaled decaying sample of {} values", state.values.len());
    }

    #[cfg(test)]
    fn priorities(&self) -> Vec<(f64, i64)> {
        let mut priorities: Vec<(f64, i64)> = self
            .state()
            .values
            .iter()
            .map(|Reverse(prioritized)| (prioritized.priority.0, prioritized.value))
            .collect();
        priorities.sort_by(|a, b| a.0.total_cmp(&b.0));
        priorities
    }
}

impl Sample for ExpDecaySample {
    fn clear(&self) {
        let mut state = self.state();
        let now = Instant::now();
        state.count = 0;
        state.values.clear();
        state.start_time = now;
        state.next_rescale = now + RESCALE_THRESHOLD;
    }

    fn count(&self) -> i64 {
        self.state().count
    }

    fn size(&self) -> usize {
        self.state().values.len()
    }

    fn update(&self, value: i64) {
        self.update_at(value, Instant::now())
    }

    fn values(&self) -> Vec<i64> {
        self.state()
            .values
            .iter()
            .map(|Reverse(prioritized)| prioritized.value)
            .collect()
    }

    fn snapshot(&self) -> SampleSnapshot {
        let state = self.state();
        SampleSnapshot::new(
            state.count,
            state
                .values
                .iter()
                .map(|Reverse(prioritized)| prioritized.value)
                .collect(),
        )
    }
}
