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

//! Pluggable policies for resolving nondeterministic choices.

pub mod combo;
pub mod delay;
pub mod dfs;
pub mod iddfs;
pub mod priority;
pub mod random;
pub mod replay;

use std::fmt;

use crate::machine::MachineId;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// A policy for resolving every nondeterministic choice the scheduler makes
/// on a machine's behalf: which runnable machine to schedule next, and what
/// value to hand back from a boolean or integer choice point.
///
/// Implementations must be deterministic and pure given their internal state
/// and a fixed seed: calling the same method with the same arguments against
/// freshly [`Strategy::reset`] state must produce the same decision every
/// time. The scheduler leans on this to make iteration replay and
/// depth-first backtracking sound - if a strategy's answers depend on
/// anything outside its own state (wall-clock time, thread scheduling order,
/// ambient randomness not seeded up front), replay silently stops meaning
/// anything.
pub trait Strategy: fmt::Debug + Send {
    /// Chooses the next machine to run from the given runnable candidates,
    /// sorted by machine id. `current` is the machine that is giving up the
    /// turn, if any.
    ///
    /// Returns `None` once the strategy has no further decision to offer -
    /// either because it has exhausted every alternative at this point
    /// (deterministic explorers) or because it has nothing principled to say
    /// (e.g. a replay strategy that has run off the end of its trace).
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        current: Option<&MachineId>,
    ) -> Option<MachineId>;

    /// Resolves a nondeterministic boolean choice. `max_value` is a hint at
    /// the choice's intended bias; callers are not required to honor it.
    fn next_bool(&mut self, max_value: u32) -> Option<bool>;

    /// Resolves a nondeterministic integer choice in `0..=max_value`.
    fn next_int(&mut self, max_value: u32) -> Option<i64>;

    /// Number of decisions made so far in the current iteration.
    fn explored_steps(&self) -> u64;

    /// Whether the strategy has hit a self-imposed step bound, independent of
    /// the scheduler's own `max_fair_steps` / `max_unfair_steps` configuration.
    fn max_steps_reached(&self) -> bool;

    /// Whether this strategy gives every enabled machine a bounded chance to
    /// run, in the formal sense used to classify explored schedules as fair
    /// or unfair in [`crate::scheduler::IterationOutcome`].
    fn is_fair(&self) -> bool;

    /// Whether the strategy considers its search space fully explored and has
    /// nothing further to contribute across additional iterations.
    fn has_finished(&self) -> bool;

    /// Prepares the strategy for the next iteration: deterministic explorers
    /// advance their backtracking position here, randomized strategies
    /// reseed their per-iteration generator.
    fn configure_next_iteration(&mut self);

    /// Restores the strategy to the state it was in when first constructed.
    fn reset(&mut self);

    /// Short, human-readable description used in bug reports and logs.
    fn description(&self) -> String;
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

/// Lets a boxed strategy stand in for `P` or `S` in
/// [`crate::strategy::combo::ComboStrategy`] - useful for configuration-driven
/// strategy construction, where the prefix and suffix are picked at runtime
/// and neither can be a fixed concrete type.
impl Strategy for Box<dyn Strategy> {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        current: Option<&MachineId>,
    ) -> Option<MachineId> {
        (**self).try_get_next(runnable, current)
    }

    fn next_bool(&mut self, max_value: u32) -> Option<bool> {
        (**self).next_bool(max_value)
    }

    fn next_int(&mut self, max_value: u32) -> Option<i64> {
        (**self).next_int(max_value)
    }

    fn explored_steps(&self) -> u64 {
        (**self).explored_steps()
    }

    fn max_steps_reached(&self) -> bool {
        (**self).max_steps_reached()
    }

    fn is_fair(&self) -> bool {
        (**self).is_fair()
    }

    fn has_finished(&self) -> bool {
        (**self).has_finished()
    }

    fn configure_next_iteration(&mut self) {
        (**self).configure_next_iteration();
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn description(&self) -> String {
        (**self).description()
    }
}
