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

//! Deterministic exhaustive depth-first exploration.

use crate::machine::MachineId;
use crate::strategy::Strategy;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// One decision point recorded on the backtracking stack: how many
/// alternatives were available, and which one is currently selected.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChoicePoint {
    count: usize,
    chosen: usize,
}

/// Exhaustively walks the interleaving tree in depth-first order.
///
/// Each call that consumes a choice either replays the alternative recorded
/// for its position on the stack (while retracing a prefix already decided
/// on a previous iteration) or opens a new decision point at index zero
/// (while reaching new territory). [`Strategy::configure_next_iteration`]
/// backtracks: it bumps the deepest point that still has an untried
/// alternative, popping any point below it that has none left. Once the
/// stack empties on a bump attempt, the entire tree has been visited and
/// [`Strategy::has_finished`] starts answering `true`.
///
/// This is a plain exhaustive explorer, not a partial-order reduction - it
/// does not detect independent transitions and collapse equivalent
/// interleavings, so its tree can be far larger than the true number of
/// distinct behaviors. Documented as a known limitation rather than modeled.
#[derive(Debug, Default)]
pub struct DfsStrategy {
    pub(crate) stack: Vec<ChoicePoint>,
    pub(crate) pos: usize,
    explored: u64,
    finished: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl DfsStrategy {
    /// Creates a fresh explorer at the root of the tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected alternative for the choice point at the current
    /// cursor, opening a new one at index zero if the cursor has reached the
    /// end of the recorded stack.
    pub(crate) fn next_choice_index(&mut self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        self.explored += 1;
        if self.pos < self.stack.len() {
            let point = &self.stack[self.pos];
            let chosen = point.chosen.min(count - 1);
            self.pos += 1;
            Some(chosen)
        } else {
            self.stack.push(ChoicePoint { count, chosen: 0 });
            self.pos += 1;
            Some(0)
        }
    }
}

impl Strategy for DfsStrategy {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        _current: Option<&MachineId>,
    ) -> Option<MachineId> {
        let index = self.next_choice_index(runnable.len())?;
        Some(runnable[index].clone())
    }

    fn next_bool(&mut self, _max_value: u32) -> Option<bool> {
        let index = self.next_choice_index(2)?;
        Some(index == 1)
    }

    fn next_int(&mut self, max_value: u32) -> Option<i64> {
        let index = self.next_choice_index(max_value as usize + 1)?;
        Some(index as i64)
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
        self.finished
    }

    fn configure_next_iteration(&mut self) {
        self.pos = 0;
        self.explored = 0;
        while let Some(point) = self.stack.last_mut() {
            if point.chosen + 1 < point.count {
                point.chosen += 1;
                return;
            }
            self.stack.pop();
        }
        self.finished = true;
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.pos = 0;
        self.explored = 0;
        self.finished = false;
    }

    fn description(&self) -> String {
        "dfs".to_owned()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::DfsStrategy;
    use crate::machine::MachineId;
    use crate::strategy::Strategy;

    #[test]
    fn backtracks_through_every_branch_of_a_binary_choice() {
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];
        let mut seen = Vec::new();

        let mut strategy = DfsStrategy::new();
        loop {
            let chosen = strategy.try_get_next(&candidates, None);
            seen.push(chosen);
            strategy.configure_next_iteration();
            if strategy.has_finished() {
                break;
            }
        }

        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&Some(candidates[0].clone())));
        assert!(seen.contains(&Some(candidates[1].clone())));
    }

    #[test]
    fn empty_runnable_set_never_opens_a_choice_point() {
        let mut strategy = DfsStrategy::new();
        assert_eq!(strategy.try_get_next(&[], None), None);
        assert!(strategy.stack.is_empty());
    }
}
