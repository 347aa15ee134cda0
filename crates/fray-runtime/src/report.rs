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

//! Aggregated results across every iteration an [`crate::IterationDriver`] ran.

use fray_scheduler::{BugReport, IterationOutcome};
use serde::{Deserialize, Serialize};

use crate::config::Config;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Classification of a recorded bug, handed to an `on_failure` observer.
///
/// This is a best-effort read of the bug message the scheduler (or the
/// driver itself, for entry-level failures) produced - these are treated as
/// abstract text rather than a typed exception hierarchy, so there is no
/// richer signal to classify from than the message itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// A user or runtime invariant violation (`NotifyAssertionFailure`).
    Assertion,
    /// A machine blocked on receive while nothing else was runnable.
    Livelock,
    /// A panic escaped a machine body or the entry point.
    UnhandledUserException,
    /// A step bound was hit and `consider_depth_bound_hit_as_bug` is set.
    StepBoundReached,
    /// A worker not registered with the scheduler called a scheduling-point
    /// operation.
    ExternalSynchronization,
    /// A [`crate::Runtime`] from a previous iteration was used again.
    DisposedRuntimeUse,
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Counters and bug list accumulated across every iteration of one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestReport {
    /// Number of iterations in which a bug was found.
    pub num_bugs: u64,
    /// Every bug found, in iteration order.
    pub bug_reports: Vec<BugReport>,
    /// Iterations whose strategy reported itself fair.
    pub num_explored_fair_schedules: u64,
    /// Iterations whose strategy did not report itself fair.
    pub num_explored_unfair_schedules: u64,
    /// Iterations that hit `max_fair_steps` while the strategy was fair.
    pub max_fair_hits_in_fair: u64,
    /// Iterations that hit `max_unfair_steps` while the strategy was fair.
    ///
    /// The scheduler only ever checks `max_unfair_steps` while the strategy
    /// is *not* fair (see [`fray_scheduler::SchedulerConfig`]'s step-bound
    /// rule), so this stays zero in practice; it is kept alongside the other
    /// counters rather than dropped.
    pub max_unfair_hits_in_fair: u64,
    /// Iterations that hit `max_unfair_steps` while the strategy was unfair.
    pub max_unfair_hits_in_unfair: u64,
    /// Sum of `explored_steps` across every fair iteration.
    pub total_explored_fair_steps: u64,
    /// Fewest steps explored in a fair iteration; negative means unset.
    pub min_explored_fair_steps: i64,
    /// Most steps explored in a fair iteration.
    pub max_explored_fair_steps: u64,
    /// The configuration that produced this report.
    pub config: Config,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl TestReport {
    /// Creates an empty report for a run started with `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            num_bugs: 0,
            bug_reports: Vec::new(),
            num_explored_fair_schedules: 0,
            num_explored_unfair_schedules: 0,
            max_fair_hits_in_fair: 0,
            max_unfair_hits_in_fair: 0,
            max_unfair_hits_in_unfair: 0,
            total_explored_fair_steps: 0,
            min_explored_fair_steps: -1,
            max_explored_fair_steps: 0,
            config,
        }
    }

    /// Folds one iteration's outcome into the running totals.
    pub(crate) fn record(&mut self, outcome: &IterationOutcome) {
        if let Some(bug) = &outcome.bug {
            self.num_bugs += 1;
            self.bug_reports.push(bug.clone());
        }

        if outcome.is_fair {
            self.num_explored_fair_schedules += 1;
            self.total_explored_fair_steps += outcome.explored_steps;
            if self.min_explored_fair_steps < 0 || outcome.explored_steps < self.min_explored_fair_steps as u64 {
                self.min_explored_fair_steps = i64::try_from(outcome.explored_steps).unwrap_or(i64::MAX);
            }
            self.max_explored_fair_steps = self.max_explored_fair_steps.max(outcome.explored_steps);
            if outcome.max_steps_reached {
                self.max_fair_hits_in_fair += 1;
            }
        } else {
            self.num_explored_unfair_schedules += 1;
            if outcome.max_steps_reached {
                self.max_unfair_hits_in_unfair += 1;
            }
        }
    }
}

/// Classifies a recorded bug message.
///
/// A heuristic, not a parser: every message classified here is one this
/// crate or [`fray_scheduler`] produced itself, so the prefixes are under our
/// control and stable.
#[must_use]
pub(crate) fn classify(message: &str) -> FailureKind {
    if message.starts_with("Livelock detected.") {
        FailureKind::Livelock
    } else if message.starts_with("unhandled exception:") {
        FailureKind::UnhandledUserException
    } else if message == "runtime used after its iteration ended" {
        FailureKind::DisposedRuntimeUse
    } else if message.contains("not controlled by the runtime") {
        FailureKind::ExternalSynchronization
    } else if message.contains("step bound") {
        FailureKind::StepBoundReached
    } else {
        FailureKind::Assertion
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{classify, FailureKind};

    #[test]
    fn classifies_livelock_messages() {
        let message = "Livelock detected. Machine 'M0' is waiting for an event, \
                        but no other machine is enabled.";
        assert_eq!(classify(message), FailureKind::Livelock);
    }

    #[test]
    fn falls_back_to_assertion() {
        assert_eq!(classify("Machine 'M' popped with no matching push."), FailureKind::Assertion);
    }
}
