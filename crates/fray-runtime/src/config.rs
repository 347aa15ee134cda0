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

//! Configuration surface for an [`crate::IterationDriver`].

use fray_scheduler::strategy::combo::ComboStrategy;
use fray_scheduler::strategy::delay::ProbabilisticDelayStrategy;
use fray_scheduler::strategy::dfs::DfsStrategy;
use fray_scheduler::strategy::iddfs::IddfsStrategy;
use fray_scheduler::strategy::priority::PriorityBoundedStrategy;
use fray_scheduler::strategy::random::RandomStrategy;
use fray_scheduler::strategy::replay::ReplayStrategy;
use fray_scheduler::{ScheduleTrace, SchedulerConfig, Strategy};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Which [`Strategy`] implementation a [`Config`] asks the driver to build.
///
/// This is a recipe, not a strategy itself - `Config` has to be `Clone` and
/// serializable (it travels inside [`crate::report::TestReport`]), which a
/// `Box<dyn Strategy>` cannot be.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Seeded uniform random choice among runnable machines, unfair.
    Random,
    /// Deterministic exhaustive depth-first exploration.
    Dfs,
    /// Iterative-deepening wrapper around [`StrategyKind::Dfs`].
    Iddfs {
        /// Depth cap for the first iteration; grows by one thereafter.
        initial_depth: usize,
    },
    /// Priority list over machines, swapped at a bounded number of points.
    PriorityBounded {
        /// Maximum number of priority-order swaps per iteration.
        max_swaps: u32,
    },
    /// Each runnable machine may be randomly delayed, up to a bounded count.
    DelayBounded {
        /// Maximum number of delays per iteration.
        max_delays: u32,
    },
    /// Runs `prefix` for `safety_prefix_depth` steps, then `suffix`.
    Combo {
        /// Strategy driving the safety prefix.
        prefix: Box<StrategyKind>,
        /// Strategy driving everything after the prefix.
        suffix: Box<StrategyKind>,
        /// Step count at which the driver switches from `prefix` to `suffix`.
        safety_prefix_depth: u64,
    },
    /// Replays a previously recorded trace instead of inventing choices.
    Replay {
        /// The trace to replay.
        trace: ScheduleTrace,
        /// Whether the replayed schedule should be reported as fair.
        fair: bool,
    },
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Every option the recognized configuration surface exposes, plus the seed
/// that makes [`StrategyKind::Random`] and its relatives reproducible.
///
/// Built with `Config::new(..)` and refined through `with_*` setters that
/// consume and return `self`, matching the manual builder style the rest of
/// this workspace uses rather than pulling in a derive-macro dependency for
/// it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Number of iterations the driver will attempt, each a fresh
    /// exploration of the program under test.
    pub num_iterations: u64,
    /// The strategy recipe driving every iteration.
    pub scheduling_strategy: StrategyKind,
    /// Seed for strategies that need one. `None` means the driver mints one
    /// from system entropy the first time it is needed and records it back
    /// onto this `Config`, so the value that actually ran is always visible
    /// in the report afterwards.
    pub seed: Option<u64>,
    /// Step bound applied while the active strategy reports itself fair.
    pub max_fair_steps: u64,
    /// Step bound applied while the active strategy does not report fair.
    pub max_unfair_steps: u64,
    /// Steps after which state-caching and liveness hooks start running.
    /// Zero means "use `max_unfair_steps`".
    pub safety_prefix_bound: u64,
    /// Whether the state-cache hook is invoked at all.
    pub cache_program_state: bool,
    /// Whether hitting a step bound is reported as a bug, rather than simply
    /// ending the iteration unexplored.
    pub consider_depth_bound_hit_as_bug: bool,
    /// Accepted for parity with the rest of the configuration surface; there
    /// is no debugger integration in a library, so this is logged at `warn`
    /// and otherwise a no-op.
    pub attach_debugger: bool,
    /// Verbosity level, `0..=2`, mapped onto a `tracing` filter by callers
    /// that install a subscriber.
    pub verbose: u8,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            num_iterations: 1,
            scheduling_strategy: StrategyKind::Random,
            seed: None,
            max_fair_steps: 0,
            max_unfair_steps: 0,
            safety_prefix_bound: 0,
            cache_program_state: false,
            consider_depth_bound_hit_as_bug: false,
            attach_debugger: false,
            verbose: 0,
        }
    }
}

impl Config {
    /// Creates a default configuration: one iteration, seeded random
    /// exploration, no step bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of iterations to attempt.
    #[must_use]
    pub fn with_num_iterations(mut self, num_iterations: u64) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    /// Sets the strategy recipe.
    #[must_use]
    pub fn with_scheduling_strategy(mut self, strategy: StrategyKind) -> Self {
        self.scheduling_strategy = strategy;
        self
    }

    /// Sets the seed driving randomized strategies.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the fair step bound.
    #[must_use]
    pub fn with_max_fair_steps(mut self, max_fair_steps: u64) -> Self {
        self.max_fair_steps = max_fair_steps;
        self
    }

    /// Sets the unfair step bound.
    #[must_use]
    pub fn with_max_unfair_steps(mut self, max_unfair_steps: u64) -> Self {
        self.max_unfair_steps = max_unfair_steps;
        self
    }

    /// Sets the safety-prefix bound. Zero means "use `max_unfair_steps`".
    #[must_use]
    pub fn with_safety_prefix_bound(mut self, safety_prefix_bound: u64) -> Self {
        self.safety_prefix_bound = safety_prefix_bound;
        self
    }

    /// Enables or disables the state-cache hook.
    #[must_use]
    pub fn with_cache_program_state(mut self, cache_program_state: bool) -> Self {
        self.cache_program_state = cache_program_state;
        self
    }

    /// Sets whether a step-bound hit is reported as a bug.
    #[must_use]
    pub fn with_consider_depth_bound_hit_as_bug(mut self, consider_depth_bound_hit_as_bug: bool) -> Self {
        self.consider_depth_bound_hit_as_bug = consider_depth_bound_hit_as_bug;
        self
    }

    /// Records whether a debugger was requested. Accepted, logged, ignored.
    #[must_use]
    pub fn with_attach_debugger(mut self, attach_debugger: bool) -> Self {
        self.attach_debugger = attach_debugger;
        self
    }

    /// Sets the verbosity level. Values above 2 are clamped.
    #[must_use]
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose.min(2);
        self
    }

    /// Rejects configurations the driver has no meaningful way to run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `num_iterations` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.num_iterations == 0 {
            return Err(Error::InvalidConfig("num_iterations must be at least 1"));
        }
        Ok(())
    }

    /// Subset of fields [`fray_scheduler::Scheduler`] itself cares about.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            max_fair_steps: self.max_fair_steps,
            max_unfair_steps: self.max_unfair_steps,
            safety_prefix_bound: self.safety_prefix_bound,
            cache_program_state: self.cache_program_state,
            consider_depth_bound_hit_as_bug: self.consider_depth_bound_hit_as_bug,
        }
    }

    /// Builds the boxed strategy this configuration describes.
    #[must_use]
    pub fn build_strategy(&self, seed: u64) -> Box<dyn Strategy> {
        build_strategy(&self.scheduling_strategy, seed)
    }
}

fn build_strategy(kind: &StrategyKind, seed: u64) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
        StrategyKind::Dfs => Box::new(DfsStrategy::new()),
        StrategyKind::Iddfs { initial_depth } => Box::new(IddfsStrategy::new(*initial_depth)),
        StrategyKind::PriorityBounded { max_swaps } => {
            Box::new(PriorityBoundedStrategy::new(seed, *max_swaps))
        }
        StrategyKind::DelayBounded { max_delays } => {
            Box::new(ProbabilisticDelayStrategy::new(seed, *max_delays))
        }
        StrategyKind::Combo {
            prefix,
            suffix,
            safety_prefix_depth,
        } => {
            let prefix = build_strategy(prefix, seed);
            let suffix = build_strategy(suffix, seed);
            Box::new(ComboStrategy::new(prefix, suffix, *safety_prefix_depth))
        }
        StrategyKind::Replay { trace, fair } => Box::new(ReplayStrategy::new(trace.clone()).fair(*fair)),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{Config, StrategyKind};

    #[test]
    fn rejects_zero_iterations() {
        let config = Config::new().with_num_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn clamps_verbose_above_two() {
        let config = Config::new().with_verbose(9);
        assert_eq!(config.verbose, 2);
    }

    #[test]
    fn builds_a_combo_strategy_from_nested_kinds() {
        let config = Config::new().with_scheduling_strategy(StrategyKind::Combo {
            prefix: Box::new(StrategyKind::Dfs),
            suffix: Box::new(StrategyKind::Random),
            safety_prefix_depth: 3,
        });
        let strategy = config.build_strategy(7);
        assert!(strategy.description().contains("combo"));
    }
}
