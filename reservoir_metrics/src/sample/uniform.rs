use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{Sample, SampleSnapshot};

/// A uniform sample over the whole stream, using Vitter's Algorithm R.
///
/// Every value ever observed has the same k/n chance of being held, no matter
/// when it arrived.
#[derive(Debug)]
pub struct UniformSample {
    reservoir_size: usize,
    state: Mutex<UniformState>,
}

#[derive(Debug)]
struct UniformState {
    count: i64,
    values: Vec<i64>,
    rng: StdRng,
}

impl UniformSample {
    /// A uniform sample holding at most `reservoir_size` values
    pub fn new(reservoir_size: usize) -> Self {
        Self::with_rng(reservoir_size, StdRng::from_entropy())
    }

    /// A uniform sample with a reproducible random sequence
    pub fn with_seed(reservoir_size: usize, seed: u64) -> Self {
        Self::with_rng(reservoir_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(reservoir_size: usize, rng: StdRng) -> Self {
        Self {
            reservoir_size,
            state: Mutex::new(UniformState {
                count: 0,
                values: Vec::with_capacity(reservoir_size),
                rng,
            }),
        }
    }

    /// Maximum number of values held
    pub fn reservoir_size(&self) -> usize {
        self.reservoir_size
    }

    fn state(&self) -> std::sync::MutexGuard<'_, UniformState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sample for UniformSample {
    fn clear(&self) {
        let mut state = self.state();
        state.count = 0;
        state.values.clear();
    }

    fn count(&self) -> i64 {
        self.state().count
    }

    fn size(&self) -> usize {
        self.state().values.len()
    }

    fn update(&self, value: i64) {
        let mut state = self.state();
        state.count += 1;
        if state.values.len() < self.reservoir_size {
            state.values.push(value);
            return;
        }
        let count = state.count;
        let slot = state.rng.gen_range(0..count) as usize;
        if slot < state.values.len() {
            state.values[slot] = value;
        }
    }

    fn values(&self) -> Vec<i64> {
        self.state().values.clone()
    }

    fn snapshot(&self) -> SampleSnapshot {
        let state = self.state();
        SampleSnapshot::new(state.count, state.values.clone())
    }
}
