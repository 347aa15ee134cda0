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

//! Uniform random choice, reseeded deterministically per iteration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::machine::MachineId;
use crate::strategy::Strategy;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Picks uniformly among runnable machines and nondeterministic-choice
/// outcomes.
///
/// Unfair by construction: nothing stops it from starving an enabled machine
/// across an entire iteration, which is why [`Strategy::is_fair`] always
/// answers `false`.
#[derive(Debug)]
pub struct RandomStrategy {
    seed: u64,
    iteration: u64,
    rng: StdRng,
    explored: u64,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl RandomStrategy {
    /// Creates a strategy seeded from `seed`.
    ///
    /// Each iteration derives its own generator from `seed` and the iteration
    /// number, so two runs constructed with the same seed visit the same
    /// sequence of schedules regardless of how many iterations ran before.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            iteration: 0,
            rng: StdRng::seed_from_u64(seed),
            explored: 0,
        }
    }

    fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.iteration));
    }
}

impl Strategy for RandomStrategy {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        _current: Option<&MachineId>,
    ) -> Option<MachineId> {
        if runnable.is_empty() {
            return None;
        }
        self.explored += 1;
        let index = self.rng.gen_range(0..runnable.len());
        Some(runnable[index].clone())
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
        self.reseed();
    }

    fn reset(&mut self) {
        self.iteration = 0;
        self.explored = 0;
        self.reseed();
    }

    fn description(&self) -> String {
        format!("random(seed = {})", self.seed)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::RandomStrategy;
    use crate::machine::MachineId;
    use crate::strategy::Strategy;

    #[test]
    fn same_seed_reproduces_the_same_schedule() {
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];

        let mut a = RandomStrategy::new(7);
        let mut b = RandomStrategy::new(7);
        for _ in 0..10 {
            assert_eq!(
                a.try_get_next(&candidates, None),
                b.try_get_next(&candidates, None)
            );
        }
    }

    #[test]
    fn empty_runnable_set_yields_no_choice() {
        let mut strategy = RandomStrategy::new(1);
        assert_eq!(strategy.try_get_next(&[], None), None);
    }
}
