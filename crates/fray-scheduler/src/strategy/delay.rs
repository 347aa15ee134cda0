// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Probabilistic delay-bounded scheduling (PCT-style).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::machine::MachineId;
use crate::strategy::Strategy;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Prefers to keep running whichever machine is lowest-id among the runnable
/// set, occasionally inserting a random "delay" that hands the turn to a
/// different runnable machine instead.
///
/// Delays are a scarce, per-iteration budget (`max_delays`): once spent, the
/// strategy degrades to always preferring the lowest-id candidate for the
/// rest of the iteration. Concentrating a small number of delays tends to
/// surface bugs that need only a handful of interleavings to differ from the
/// "obvious" schedule, without paying the cost of fully random scheduling.
#[derive(Debug)]
pub struct ProbabilisticDelayStrategy {
    seed: u64,
    iteration: u64,
    rng: StdRng,
    max_delays: u32,
    remaining_delays: u32,
    explored: u64,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ProbabilisticDelayStrategy {
    /// Creates a strategy seeded from `seed` with up to `max_delays` delay
    /// points per iteration.
    #[must_use]
    pub fn new(seed: u64, max_delays: u32) -> Self {
        Self {
            seed,
            iteration: 0,
            rng: StdRng::seed_from_u64(seed),
            max_delays,
            remaining_delays: max_delays,
            explored: 0,
        }
    }

    fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.iteration));
    }
}

impl Strategy for ProbabilisticDelayStrategy {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        _current: Option<&MachineId>,
    ) -> Option<MachineId> {
        if runnable.is_empty() {
            return None;
        }
        self.explored += 1;
        if self.remaining_delays > 0 && self.rng.gen_bool(1.0 / f64::from(self.max_delays.max(1))) {
            self.remaining_delays -= 1;
            let index = self.rng.gen_range(0..runnable.len());
            return Some(runnable[index].clone());
        }
        runnable.first().cloned()
    }

    fn next_bool(&mut self, max_value: u32) -> Option<bool> {
        self.explored += 1;
        let bound = max_value.max(1);
        Some(self.rng.gen_range(0..bound) == 0)
    }

    fn next_int(&mut self, max_value: u32) -> Option<i64> {
        self.explored += 1;
        Some(i64::from(self.rng.gen_range(0..=max_value)))
    }

    fn explored_steps(&self) -> u64 {
        self.explored
    }

    fn max_steps_reached(&self) -> bool {
        false
    }

    fn is_fair(&self) -> bool {
        false
    }

    fn has_finished(&self) -> bool {
        false
    }

    fn configure_next_iteration(&mut self) {
        self.iteration += 1;
        self.explored = 0;
        self.remaining_delays = self.max_delays;
        self.reseed();
    }

    fn reset(&mut self) {
        self.iteration = 0;
        self.explored = 0;
        self.remaining_delays = self.max_delays;
        self.reseed();
    }

    fn description(&self) -> String {
        format!("delay(seed = {}, max_delays = {})", self.seed, self.max_delays)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::ProbabilisticDelayStrategy;
    use crate::machine::MachineId;
    use crate::strategy::Strategy;

    #[test]
    fn exhausted_delay_budget_falls_back_to_lowest_id() {
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];
        let mut strategy = ProbabilisticDelayStrategy::new(1, 0);
        for _ in 0..5 {
            assert_eq!(
                strategy.try_get_next(&candidates, None),
                Some(candidates[0].clone())
            );
        }
    }
}
