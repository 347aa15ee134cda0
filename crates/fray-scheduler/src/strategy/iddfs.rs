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

//! Iterative-deepening wrapper around [`DfsStrategy`].

use crate::machine::MachineId;
use crate::strategy::dfs::DfsStrategy;
use crate::strategy::Strategy;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Runs [`DfsStrategy`] underneath a depth cap that grows by one every time
/// the inner search exhausts itself at the current depth.
///
/// Once the cursor reaches the cap, further choice points are answered with a
/// fixed default (the first runnable candidate, `false`, `0`) without being
/// recorded on the inner stack, so they cost nothing towards `explored_steps`
/// and never grow the backtracking tree beyond the current depth. This trades
/// completeness at any single depth bound for finding shallow bugs sooner -
/// the same trade classic iterative deepening makes over plain depth-first
/// search.
#[derive(Debug)]
pub struct IddfsStrategy {
    inner: DfsStrategy,
    initial_depth: usize,
    depth_limit: usize,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl IddfsStrategy {
    /// Creates a strategy whose first depth cap is `initial_depth` (at least
    /// one).
    #[must_use]
    pub fn new(initial_depth: usize) -> Self {
        let initial_depth = initial_depth.max(1);
        Self {
            inner: DfsStrategy::new(),
            initial_depth,
            depth_limit: initial_depth,
        }
    }

    fn within_depth(&self) -> bool {
        self.inner.pos < self.depth_limit
    }
}

impl Strategy for IddfsStrategy {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        current: Option<&MachineId>,
    ) -> Option<MachineId> {
        if !self.within_depth() {
            return runnable.first().cloned();
        }
        self.inner.try_get_next(runnable, current)
    }

    fn next_bool(&mut self, max_value: u32) -> Option<bool> {
        if !self.within_depth() {
            return Some(false);
        }
        self.inner.next_bool(max_value)
    }

    fn next_int(&mut self, max_value: u32) -> Option<i64> {
        if !self.within_depth() {
            return Some(0);
        }
        self.inner.next_int(max_value)
    }

    fn explored_steps(&self) -> u64 {
        self.inner.explored_steps()
    }

    fn max_steps_reached(&self) -> bool {
        self.inner.max_steps_reached()
    }

    fn is_fair(&self) -> bool {
        false
    }

    fn has_finished(&self) -> bool {
        false
    }

    fn configure_next_iteration(&mut self) {
        self.inner.configure_next_iteration();
        if self.inner.has_finished() {
            self.depth_limit += 1;
            self.inner.reset();
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.depth_limit = self.initial_depth;
    }

    fn description(&self) -> String {
        format!("iddfs(depth <= {})", self.depth_limit)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::IddfsStrategy;
    use crate::machine::MachineId;
    use crate::strategy::Strategy;

    #[test]
    fn depth_cap_grows_once_the_inner_search_exhausts_it() {
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];
        let mut strategy = IddfsStrategy::new(1);

        strategy.try_get_next(&candidates, None);
        strategy.try_get_next(&candidates, None);
        assert_eq!(strategy.try_get_next(&candidates, None), Some(candidates[0].clone()));

        strategy.configure_next_iteration();
        assert_eq!(strategy.description(), "iddfs(depth <= 1)");
    }
}
