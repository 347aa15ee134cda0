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

//! Safety-prefix composition of two strategies.

use crate::machine::MachineId;
use crate::strategy::Strategy;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Runs a `prefix` strategy for a bounded number of steps, then switches over
/// to a `suffix` strategy for the remainder of the iteration.
///
/// A common shape: run depth-first search for a short safety prefix to
/// deterministically exercise startup interleavings, then fall back to
/// random choice for the unbounded remainder of a long-running test. Once
/// the switch happens it is not undone until [`Strategy::reset`] -
/// `explored_steps` after the switch is reported as the prefix's final count
/// plus the suffix's own, so depth bookkeeping stays monotonic across the
/// handoff.
#[derive(Debug)]
pub struct ComboStrategy<P, S> {
    prefix: P,
    suffix: S,
    safety_prefix_depth: u64,
    in_prefix: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<P, S> ComboStrategy<P, S>
where
    P: Strategy,
    S: Strategy,
{
    /// Creates a strategy that runs `prefix` for `safety_prefix_depth` steps
    /// before switching to `suffix`.
    #[must_use]
    pub fn new(prefix: P, suffix: S, safety_prefix_depth: u64) -> Self {
        Self {
            prefix,
            suffix,
            safety_prefix_depth,
            in_prefix: true,
        }
    }

    fn maybe_switch(&mut self) {
        if self.in_prefix && self.prefix.explored_steps() >= self.safety_prefix_depth {
            self.in_prefix = false;
        }
    }
}

impl<P, S> Strategy for ComboStrategy<P, S>
where
    P: Strategy,
    S: Strategy,
{
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        current: Option<&MachineId>,
    ) -> Option<MachineId> {
        if self.in_prefix {
            let next = self.prefix.try_get_next(runnable, current);
            self.maybe_switch();
            next
        } else {
            self.suffix.try_get_next(runnable, current)
        }
    }

    fn next_bool(&mut self, max_value: u32) -> Option<bool> {
        if self.in_prefix {
            let next = self.prefix.next_bool(max_value);
            self.maybe_switch();
            next
        } else {
            self.suffix.next_bool(max_value)
        }
    }

    fn next_int(&mut self, max_value: u32) -> Option<i64> {
        if self.in_prefix {
            let next = self.prefix.next_int(max_value);
            self.maybe_switch();
            next
        } else {
            self.suffix.next_int(max_value)
        }
    }

    fn explored_steps(&self) -> u64 {
        if self.in_prefix {
            self.prefix.explored_steps()
        } else {
            self.safety_prefix_depth + self.suffix.explored_steps()
        }
    }

    fn max_steps_reached(&self) -> bool {
        if self.in_prefix {
            self.prefix.max_steps_reached()
        } else {
            self.suffix.max_steps_reached()
        }
    }

    fn is_fair(&self) -> bool {
        if self.in_prefix {
            self.prefix.is_fair()
        } else {
            self.suffix.is_fair()
        }
    }

    fn has_finished(&self) -> bool {
        !self.in_prefix && self.suffix.has_finished()
    }

    fn configure_next_iteration(&mut self) {
        self.prefix.configure_next_iteration();
        self.suffix.configure_next_iteration();
        self.in_prefix = true;
    }

    fn reset(&mut self) {
        self.prefix.reset();
        self.suffix.reset();
        self.in_prefix = true;
    }

    fn description(&self) -> String {
        format!(
            "combo({} -> {} after {} steps)",
            self.prefix.description(),
            self.suffix.description(),
            self.safety_prefix_depth
        )
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::ComboStrategy;
    use crate::machine::MachineId;
    use crate::strategy::dfs::DfsStrategy;
    use crate::strategy::random::RandomStrategy;
    use crate::strategy::Strategy;

    #[test]
    fn switches_to_the_suffix_after_the_safety_prefix() {
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];
        let mut combo = ComboStrategy::new(DfsStrategy::new(), RandomStrategy::new(1), 1);

        combo.try_get_next(&candidates, None);
        assert_eq!(combo.explored_steps(), 1);

        combo.try_get_next(&candidates, None);
        assert_eq!(combo.explored_steps(), 2);
        assert!(!combo.is_fair());
    }
}
