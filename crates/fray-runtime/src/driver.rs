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

//! Runs a program under test across many iterations, folding the results
//! into a [`TestReport`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fray_scheduler::Scheduler;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::{classify, TestReport};
use crate::runtime::Runtime;

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Observer notified once per iteration that records a bug, with the
/// classified kind and the bug's message.
///
/// `UnhandledUserException` and every other bug kind are routed through here
/// exactly once per iteration, whichever one fired first -
/// `notify_assertion_failure`'s "first call wins" rule means there is never
/// more than one per iteration to report.
pub type FailureObserver = Box<dyn FnMut(crate::report::FailureKind, &str) + Send>;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Runs the configured number of iterations of a program under test,
/// building a fresh [`Runtime`] for each one.
///
/// A fresh [`Scheduler`] backs every iteration, but the active strategy's own
/// state threads through via [`fray_scheduler::Strategy::configure_next_iteration`]
/// - [`Scheduler::into_strategy`] is what lets the driver reclaim it once an
/// iteration's last worker has been joined.
pub struct IterationDriver {
    config: Config,
    seed: u64,
    generation: Arc<AtomicU64>,
    on_failure: Option<FailureObserver>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl IterationDriver {
    /// Creates a driver for `config`, resolving an absent seed from system
    /// entropy and recording the resolved value back onto the config this
    /// driver carries (and will report through [`TestReport::config`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails [`Config::validate`].
    pub fn new(mut config: Config) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        config.seed = Some(seed);
        Ok(Self {
            config,
            seed,
            generation: Arc::new(AtomicU64::new(0)),
            on_failure: None,
        })
    }

    /// Installs an observer called once per iteration that records a bug.
    #[must_use]
    pub fn with_on_failure(mut self, observer: impl FnMut(crate::report::FailureKind, &str) + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(observer));
        self
    }

    /// Runs every configured iteration of `entry`, returning the aggregated
    /// report.
    ///
    /// `entry` plays the role of the program's entry routine: called once
    /// per iteration, directly on the calling thread (the scheduler's root
    /// worker, exempt from scheduling), with a fresh [`Runtime`] it uses to
    /// create the iteration's first machine. It should not block waiting for
    /// the iteration to finish - the driver does that itself via
    /// [`Scheduler::wait`] once `entry` returns.
    ///
    /// Stops early if the strategy reports [`fray_scheduler::Strategy::has_finished`]
    /// after a completed iteration.
    pub fn run<F>(&mut self, entry: F) -> TestReport
    where
        F: Fn(&Runtime) -> Result<()>,
    {
        let mut strategy = self.config.build_strategy(self.seed);
        strategy.reset();

        let mut report = TestReport::new(self.config.clone());

        for _ in 0..self.config.num_iterations {
            let scheduler = Arc::new(Scheduler::new(strategy, self.config.scheduler_config()));
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            let runtime = Runtime::new(Arc::clone(&scheduler), generation, Arc::clone(&self.generation));

            let outcome_of_entry = panic::catch_unwind(AssertUnwindSafe(|| entry(&runtime)));
            self.report_entry_failure(&scheduler, outcome_of_entry);

            scheduler.wait();
            runtime.join_all();
            drop(runtime);

            let outcome = scheduler
                .outcome()
                .expect("scheduler gate only fails if a worker panicked outside catch_unwind");

            if let Some(bug) = &outcome.bug {
                if let Some(observer) = self.on_failure.as_mut() {
                    observer(classify(&bug.message), &bug.message);
                }
            }
            report.record(&outcome);

            strategy = match Arc::try_unwrap(scheduler) {
                Ok(scheduler) => scheduler.into_strategy(),
                Err(_) => {
                    panic!(
                        "a machine's worker thread outlived its iteration - \
                         every Runtime::spawn_machine handle must be joined before the \
                         entry point returns or the scheduler stops"
                    )
                }
            };
            strategy.configure_next_iteration();

            if strategy.has_finished() {
                break;
            }
        }

        report
    }

    fn report_entry_failure(
        &self,
        scheduler: &Scheduler,
        outcome_of_entry: std::thread::Result<Result<()>>,
    ) {
        match outcome_of_entry {
            Ok(Ok(())) | Ok(Err(Error::Cancelled(_))) => {}
            Ok(Err(Error::DisposedRuntimeUse)) => {
                scheduler.notify_assertion_failure("runtime used after its iteration ended", true);
            }
            Ok(Err(err)) => {
                scheduler.notify_assertion_failure(format!("unhandled exception: {err}"), true);
            }
            Err(payload) => {
                scheduler.notify_assertion_failure(format!("unhandled exception: {}", panic_message(&payload)), true);
            }
        }
    }
}

/// Best-effort extraction of a human-readable message from a caught panic.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::IterationDriver;
    use crate::config::Config;

    #[test]
    fn runs_a_single_machine_to_completion_without_bugs() {
        let mut driver = IterationDriver::new(Config::new().with_seed(1)).expect("valid config");
        let report = driver.run(|runtime| {
            runtime.spawn_machine(Some("M0".to_owned()), |_, _, _| Ok(()))?;
            Ok(())
        });
        assert_eq!(report.num_bugs, 0);
        assert_eq!(report.num_explored_unfair_schedules, 1);
    }

    #[test]
    fn records_an_assertion_raised_from_a_machine_body() {
        let mut driver = IterationDriver::new(Config::new().with_seed(2)).expect("valid config");
        let report = driver.run(|runtime| {
            runtime.spawn_machine(Some("M0".to_owned()), |rt, _worker, _id| {
                rt.assert(false, "Assertion failed: bad state")?;
                Ok(())
            })?;
            Ok(())
        });
        assert_eq!(report.num_bugs, 1);
        assert!(report.bug_reports[0].message.starts_with("Assertion failed"));
    }

    #[test]
    fn reusing_a_disposed_runtime_is_reported_once() {
        let mut driver = IterationDriver::new(
            Config::new().with_seed(3).with_num_iterations(2),
        )
        .expect("valid config");

        let stale = std::sync::Mutex::new(None);
        let report = driver.run(move |runtime| {
            let mut slot = stale.lock().expect("not poisoned");
            if let Some(previous) = slot.take() {
                previous.root_handle()?;
            }
            *slot = Some(runtime.clone());
            Ok(())
        });

        assert_eq!(report.num_bugs, 1);
        assert_eq!(report.bug_reports[0].message, "runtime used after its iteration ended");
    }
}
