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

//! Priority-bounded scheduling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::machine::MachineId;
use crate::strategy::Strategy;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Maintains a total order over machine ids and always runs the
/// highest-priority runnable candidate, occasionally reshuffling two
/// adjacent priorities at random.
///
/// Priority-change points are budgeted per iteration exactly like
/// [`super::delay::ProbabilisticDelayStrategy`]'s delays: a small, scarce
/// number of swaps tends to explore materially different schedules without
/// the combinatorial blowup of fully random reordering.
#[derive(Debug)]
pub struct PriorityBoundedStrategy {
    seed: u64,
    iteration: u64,
    rng: StdRng,
    max_swaps: u32,
    remaining_swaps: u32,
    order: Vec<MachineId>,
    explored: u64,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl PriorityBoundedStrategy {
    /// Creates a strategy seeded from `seed` with up to `max_swaps` priority
    /// changes per iteration.
    #[must_use]
    pub fn new(seed: u64, max_swaps: u32) -> Self {
        Self {
            seed,
            iteration: 0,
            rng: StdRng::seed_from_u64(seed),
            max_swaps,
            remaining_swaps: max_swaps,
            order: Vec::new(),
            explored: 0,
        }
    }

    fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.iteration));
    }

    /// Extends the priority order with any machine not seen before, lowest
    /// priority first, preserving discovery order.
    fn sync_order(&mut self, runnable: &[MachineId]) {
        for id in runnable {
            if !self.order.contains(id) {
                self.order.push(id.clone());
            }
        }
    }

    fn maybe_swap(&mut self) {
        if self.remaining_swaps == 0 || self.order.len() < 2 {
            return;
        }
        if self.rng.gen_bool(1.0 / f64::from(self.max_swaps.max(1))) {
            let i = self.rng.gen_range(0..self.order.len() - 1);
            self.order.swap(i, i + 1);
            self.remaining_swaps -= 1;
        }
    }

    fn highest_priority<'a>(&self, runnable: &'a [MachineId]) -> Option<&'a MachineId> {
        self.order.iter().find_map(|candidate| runnable.iter().find(|id| *id == candidate))
    }
}

impl Strategy for PriorityBoundedStrategy {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        _current: Option<&MachineId>,
    ) -> Option<MachineId> {
        if runnable.is_empty() {
            return None;
        }
        self.explored += 1;
        self.sync_order(runnable);
        self.maybe_swap();
        self.highest_priority(runnable).cloned()
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
        self.remaining_swaps = self.max_swaps;
        self.order.clear();
        self.reseed();
    }

    fn reset(&mut self) {
        self.iteration = 0;
        self.explored = 0;
        self.remaining_swaps = self.max_swaps;
        self.order.clear();
        self.reseed();
    }

    fn description(&self) -> String {
        format!("priority(seed = {}, max_swaps = {})", self.seed, self.max_swaps)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::PriorityBoundedStrategy;
    use crate::machine::MachineId;
    use crate::strategy::Strategy;

    #[test]
    fn zero_swap_budget_always_picks_discovery_order() {
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];
        let mut strategy = PriorityBoundedStrategy::new(1, 0);
        for _ in 0..5 {
            assert_eq!(
                strategy.try_get_next(&candidates, None),
                Some(candidates[0].clone())
            );
        }
    }
}
