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

//! The serialized scheduler: one gate, one active machine at a time.

use std::collections::HashMap;
use std::sync::Mutex;

use fray_executor::{Cancelled, Gate, WorkerHandle, WorkerHandles};
use slab::Slab;

use serde::{Deserialize, Serialize};

use crate::hooks::{Hooks, LivenessHook, StateCacheHook};
use crate::machine::{MachineId, MachineInfo};
use crate::strategy::Strategy;
use crate::trace::{schedule_entry, ScheduleTrace, TraceEntry};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Scheduler-relevant subset of [`fray_runtime::Config`].
///
/// Kept separate from the full configuration surface so this crate does not
/// need to know about iteration counts, debugger attachment or any of the
/// other concerns that belong to the driver rather than to a single
/// iteration's scheduler.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerConfig {
    /// Step bound applied while the active strategy reports [`Strategy::is_fair`].
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
}

/// A bug found during an iteration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BugReport {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Full schedule and choice history up to the point of failure.
    pub trace: ScheduleTrace,
    /// Description of the strategy active when the bug was found.
    pub strategy: String,
}

/// Everything a caller needs to know once an iteration's scheduler has
/// stopped.
#[derive(Clone, Debug)]
pub struct IterationOutcome {
    /// The bug found, if any.
    pub bug: Option<BugReport>,
    /// Whether the strategy reported its search space fully explored.
    pub fully_explored: bool,
    /// The full trace recorded during the iteration.
    pub trace: ScheduleTrace,
    /// Whether the strategy was fair.
    pub is_fair: bool,
    /// Number of scheduling and choice points resolved.
    pub explored_steps: u64,
    /// Whether a step bound was hit.
    pub max_steps_reached: bool,
}

struct Inner {
    machines: Slab<MachineInfo>,
    task_map: HashMap<WorkerHandle, MachineId, ahash::RandomState>,
    strategy: Box<dyn Strategy>,
    trace: ScheduleTrace,
    current: Option<MachineId>,
    running: bool,
    bug: Option<BugReport>,
    fully_explored: bool,
}

/// Drives exactly one machine at a time through a single iteration.
///
/// Every machine runs on its own OS thread, but [`Scheduler`] makes sure at
/// most one of them is ever unparked: every scheduling-point method either
/// returns immediately or blocks the calling thread on a shared
/// [`fray_executor::Gate`] until it is this machine's turn again. Methods
/// take `&self`, not `&mut self` - callers are, by construction, different
/// threads racing to take the same lock, never a single owner mutating in
/// place.
pub struct Scheduler {
    gate: Gate<Inner>,
    done: Gate<bool>,
    handles: WorkerHandles,
    root: WorkerHandle,
    config: SchedulerConfig,
    hooks: Mutex<Hooks>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl SchedulerConfig {
    fn effective_safety_prefix_bound(&self) -> u64 {
        if self.safety_prefix_bound == 0 {
            self.max_unfair_steps
        } else {
            self.safety_prefix_bound
        }
    }
}

impl Scheduler {
    /// Creates a new scheduler around `strategy`, ready for one iteration.
    #[must_use]
    pub fn new(strategy: Box<dyn Strategy>, config: SchedulerConfig) -> Self {
        let handles = WorkerHandles::new();
        let root = handles.next();
        Self {
            gate: Gate::new(Inner {
                machines: Slab::new(),
                task_map: HashMap::default(),
                strategy,
                trace: ScheduleTrace::new(),
                current: None,
                running: true,
                bug: None,
                fully_explored: false,
            }),
            done: Gate::new(false),
            handles,
            root,
            config,
            hooks: Mutex::new(Hooks::default()),
        }
    }

    /// Returns the handle reserved for the thread driving the iteration
    /// itself, exempt from scheduling.
    #[must_use]
    pub fn root_handle(&self) -> WorkerHandle {
        self.root
    }

    /// Allocates a fresh handle for a machine about to be spawned.
    #[must_use]
    pub fn next_worker_handle(&self) -> WorkerHandle {
        self.handles.next()
    }

    /// Installs the state-cache hook, replacing any previous one.
    pub fn set_state_cache_hook(&self, hook: StateCacheHook) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.state_cache = Some(hook);
        }
    }

    /// Installs the liveness hook, replacing any previous one.
    pub fn set_liveness_hook(&self, hook: LivenessHook) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.liveness = Some(hook);
        }
    }

    /// Registers a new machine created by `worker`, returning its id.
    ///
    /// If this is the very first machine of the iteration, it is marked
    /// active and started immediately: nothing has handed it the turn yet,
    /// since there is no prior "current" machine to hand off from.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn notify_new_task_created(&self, worker: WorkerHandle, name: Option<String>) -> MachineId {
        self.with(|inner| {
            let index = inner.machines.vacant_key();
            let id = MachineId::new(index, name);
            let info = MachineInfo {
                id: id.clone(),
                worker,
                is_active: false,
                is_enabled: true,
                is_waiting_to_receive: false,
                is_completed: false,
                has_started: false,
                program_counter: 0,
            };
            let inserted = inner.machines.insert(info);
            debug_assert_eq!(inserted, index);
            inner.task_map.insert(worker, id.clone());

            if inner.machines.len() == 1 {
                inner.machines[index].is_active = true;
                inner.machines[index].has_started = true;
                inner.current = Some(id.clone());
            }
            id
        })
        .expect("scheduler gate poisoned")
    }

    /// Called by a machine's creator right after registration, to guarantee
    /// the child has started before the creator proceeds.
    pub fn wait_for_task_to_start(&self, worker: WorkerHandle) -> Result<(), Cancelled> {
        self.with(|inner| {
            if inner.machines.len() == 1 {
                if let Some((_, info)) = inner.machines.iter_mut().next() {
                    info.is_active = true;
                }
            }
        })?;
        let Some(id) = self.with(|inner| inner.task_map.get(&worker).cloned())? else {
            return Ok(());
        };
        self.wait_while(
            |inner| inner.machines[id.index()].has_started || !inner.running,
            |_| (),
        )
    }

    /// Called from inside a newly spawned worker, before any user code runs.
    ///
    /// Parks until this machine is given the turn. Returns [`Cancelled`] if
    /// it wakes to find itself disabled, which happens once the scheduler
    /// has stopped without ever scheduling it.
    pub fn notify_task_started(&self, worker: WorkerHandle) -> Result<(), Cancelled> {
        let id = self.machine_id(worker)?;
        self.with(|inner| inner.machines[id.index()].has_started = true)?;
        self.gate.notify_all();

        let enabled = self.wait_while(
            |inner| inner.machines[id.index()].is_active || !inner.running,
            |inner| inner.machines[id.index()].is_enabled,
        )?;
        if enabled {
            Ok(())
        } else {
            Err(Cancelled)
        }
    }

    /// Marks the calling machine blocked on a typed receive, removing it from
    /// the runnable set until [`Scheduler::notify_task_received_event`].
    pub fn notify_task_blocked_on_event(&self, worker: WorkerHandle) -> Result<(), Cancelled> {
        let id = self.machine_id(worker)?;
        self.with(|inner| {
            let info = &mut inner.machines[id.index()];
            info.is_waiting_to_receive = true;
            info.is_enabled = false;
        })
    }

    /// Marks `machine` runnable again after it received an awaited event.
    pub fn notify_task_received_event(&self, machine: &MachineId) -> Result<(), Cancelled> {
        self.with(|inner| {
            let info = &mut inner.machines[machine.index()];
            info.is_waiting_to_receive = false;
            if !info.is_completed {
                info.is_enabled = true;
            }
        })
    }

    /// Moves a machine's bookkeeping from `old` to `new` across an
    /// asynchronous continuation boundary.
    pub fn notify_scheduled_machine_task_changed(
        &self,
        old: WorkerHandle,
        new: WorkerHandle,
    ) -> Result<(), Cancelled> {
        self.with(|inner| {
            if let Some(id) = inner.task_map.remove(&old) {
                if let Some(info) = inner.machines.get_mut(id.index()) {
                    info.worker = new;
                }
                inner.task_map.insert(new, id);
            }
        })
    }

    /// Called from inside a machine's worker right before it returns.
    pub fn notify_task_completed(&self, worker: WorkerHandle) -> Result<(), Cancelled> {
        let id = self.machine_id(worker)?;
        self.with(|inner| {
            let info = &mut inner.machines[id.index()];
            info.is_completed = true;
            info.is_enabled = false;
        })?;
        let result = self.schedule(worker);
        self.with(|inner| {
            inner.task_map.remove(&worker);
        })?;
        result
    }

    /// The heart of the scheduler: gives up the turn and hands it to the
    /// next machine the active strategy chooses, then parks the caller until
    /// it is scheduled again.
    ///
    /// Returns immediately without doing anything if `worker` is the root
    /// handle - the iteration driver's own thread is never itself a machine.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn schedule(&self, worker: WorkerHandle) -> Result<(), Cancelled> {
        if worker == self.root {
            return Ok(());
        }

        if !self.with(|inner| inner.task_map.contains_key(&worker))? {
            self.notify_assertion_failure(
                "synchronization primitive not controlled by the runtime",
                true,
            );
            return Err(Cancelled);
        }

        self.enforce_step_bound()?;

        let (next, candidates) = self.with(|inner| {
            let candidates = runnable_candidates(inner);
            let current = inner.current.clone();
            let next = inner.strategy.try_get_next(&candidates, current.as_ref());
            (next, candidates)
        })?;

        let Some(next_id) = next else {
            return self.handle_exhaustion(&candidates);
        };

        let old_current = self.with(|inner| {
            inner.trace.push(schedule_entry(&next_id));
            inner.machines[next_id.index()].program_counter = 0;
            let old = inner.current.replace(next_id.clone());
            if old.as_ref() != Some(&next_id) {
                if let Some(old_id) = &old {
                    if let Some(info) = inner.machines.get_mut(old_id.index()) {
                        info.is_active = false;
                    }
                }
                inner.machines[next_id.index()].is_active = true;
            }
            old
        })?;

        self.run_hooks()?;

        if old_current.as_ref() == Some(&next_id) {
            return Ok(());
        }

        self.gate.notify_all();

        let id = self.machine_id(worker)?;
        let enabled = self.wait_while(
            |inner| inner.machines[id.index()].is_active || !inner.running,
            |inner| inner.machines[id.index()].is_enabled,
        )?;
        if enabled {
            Ok(())
        } else {
            Err(Cancelled)
        }
    }

    /// Resolves a nondeterministic boolean choice for the calling machine.
    ///
    /// `unique_id` distinguishes a fairness-tracked call site; pass `None`
    /// for an ordinary unfair choice.
    pub fn get_next_bool_choice(
        &self,
        worker: WorkerHandle,
        max_value: u32,
        unique_id: Option<u64>,
    ) -> Result<bool, Cancelled> {
        self.enforce_step_bound()?;
        let value = self.with(|inner| inner.strategy.next_bool(max_value))?;
        let Some(value) = value else {
            return self.finish_unexplored();
        };
        self.record_choice(worker, match unique_id {
            Some(id) => TraceEntry::FairBool { unique_id: id, value },
            None => TraceEntry::Bool { value },
        })?;
        self.run_hooks()?;
        Ok(value)
    }

    /// Resolves a nondeterministic integer choice in `0..=max_value` for the
    /// calling machine.
    pub fn get_next_int_choice(&self, worker: WorkerHandle, max_value: u32) -> Result<i64, Cancelled> {
        self.enforce_step_bound()?;
        let value = self.with(|inner| inner.strategy.next_int(max_value))?;
        let Some(value) = value else {
            return self.finish_unexplored();
        };
        self.record_choice(worker, TraceEntry::Int { value })?;
        self.run_hooks()?;
        Ok(value)
    }

    /// Records a bug. The first call in an iteration wins; later calls are
    /// ignored beyond the `kill_tasks` side effect.
    pub fn notify_assertion_failure(&self, message: impl Into<String>, kill_tasks: bool) {
        let message = message.into();
        let recorded = self
            .with(|inner| {
                if inner.bug.is_some() {
                    return false;
                }
                inner.bug = Some(BugReport {
                    message: message.clone(),
                    trace: inner.trace.clone(),
                    strategy: inner.strategy.description(),
                });
                true
            })
            .unwrap_or(false);

        #[cfg(feature = "tracing")]
        if recorded {
            tracing::warn!(message = %message, "assertion failure");
        }
        let _ = recorded;

        if kill_tasks {
            self.stop();
        }
    }

    /// Stops the iteration: disables every incomplete machine, forces every
    /// parked worker awake, and completes [`Scheduler::wait`].
    ///
    /// Idempotent - only the first call has any effect.
    pub fn stop(&self) {
        let became_stopped = self
            .with(|inner| {
                if !inner.running {
                    return false;
                }
                inner.running = false;
                for (_, info) in inner.machines.iter_mut() {
                    if !info.is_completed {
                        info.is_enabled = false;
                        info.is_active = true;
                    }
                }
                true
            })
            .unwrap_or(true);

        if became_stopped {
            self.gate.notify_all();
            let _ = self.done.with(|done| *done = true);
            self.done.notify_all();
        }
    }

    /// Blocks the calling thread until [`Scheduler::stop`] has run.
    pub fn wait(&self) {
        let _ = self.done.wait_while(|done| *done, |_| ());
    }

    /// Replaces the active strategy, returning the one it displaces.
    pub fn switch_scheduling_strategy(&self, new: Box<dyn Strategy>) -> Result<Box<dyn Strategy>, Cancelled> {
        self.with(|inner| std::mem::replace(&mut inner.strategy, new))
    }

    /// Reclaims the strategy that was driving this scheduler.
    ///
    /// The iteration driver builds a fresh [`Scheduler`] for every iteration
    /// but needs the strategy's own state - RNG position, a DFS backtracking
    /// stack, accumulated step counts - to persist across that boundary, per
    /// the purity contract in [`Strategy`]: only what
    /// [`Strategy::configure_next_iteration`] carries forward survives. This
    /// is how it gets it back out once the iteration is over and every
    /// worker has been joined.
    ///
    /// # Panics
    ///
    /// Panics if the internal gate was poisoned by a worker panicking while
    /// holding it, which [`fray_executor::spawn`]'s `catch_unwind` wrapper is
    /// meant to make unreachable in practice.
    #[must_use]
    pub fn into_strategy(self) -> Box<dyn Strategy> {
        self.gate.into_inner().expect("scheduler gate poisoned").strategy
    }

    /// Snapshot of how the iteration ended, for the driver to fold into a
    /// [`crate::scheduler::BugReport`] or an aggregate test report.
    pub fn outcome(&self) -> Result<IterationOutcome, Cancelled> {
        self.with(|inner| IterationOutcome {
            bug: inner.bug.clone(),
            fully_explored: inner.fully_explored,
            trace: inner.trace.clone(),
            is_fair: inner.strategy.is_fair(),
            explored_steps: inner.strategy.explored_steps(),
            max_steps_reached: inner.strategy.max_steps_reached(),
        })
    }

    // -- internals -----------------------------------------------------

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<R, Cancelled> {
        self.gate.with(f).map_err(|_| Cancelled)
    }

    fn wait_while<R>(
        &self,
        pred: impl FnMut(&Inner) -> bool,
        f: impl FnOnce(&mut Inner) -> R,
    ) -> Result<R, Cancelled> {
        self.gate.wait_while(pred, f).map_err(|_| Cancelled)
    }

    fn machine_id(&self, worker: WorkerHandle) -> Result<MachineId, Cancelled> {
        self.with(|inner| inner.task_map.get(&worker).cloned())?.ok_or(Cancelled)
    }

    fn enforce_step_bound(&self) -> Result<(), Cancelled> {
        if !self.with(|inner| inner.running)? {
            self.stop();
            return Err(Cancelled);
        }

        let hit = self.with(|inner| {
            let fair = inner.strategy.is_fair();
            let bound = if fair {
                self.config.max_fair_steps
            } else {
                self.config.max_unfair_steps
            };
            bound != 0 && inner.strategy.explored_steps() >= bound
        })?;

        if !hit {
            return Ok(());
        }

        if self.config.consider_depth_bound_hit_as_bug {
            self.notify_assertion_failure("reached the configured step bound", true);
        } else {
            self.with(|inner| inner.fully_explored = false)?;
            self.stop();
        }
        Err(Cancelled)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    fn handle_exhaustion(&self, candidates: &[MachineId]) -> Result<(), Cancelled> {
        if candidates.is_empty() {
            let waiting = self.with(|inner| {
                inner
                    .machines
                    .iter()
                    .map(|(_, info)| info)
                    .filter(|info| info.is_waiting_to_receive)
                    .min_by(|a, b| a.id.cmp(&b.id))
                    .map(|info| info.id.clone())
            })?;
            if let Some(id) = waiting {
                self.notify_assertion_failure(
                    format!(
                        "Livelock detected. Machine '{id}' is waiting for an event, \
                         but no other machine is enabled."
                    ),
                    true,
                );
                return Err(Cancelled);
            }
        }
        self.with(|inner| inner.fully_explored = true)?;
        self.stop();
        Err(Cancelled)
    }

    fn finish_unexplored<T>(&self) -> Result<T, Cancelled> {
        self.with(|inner| inner.fully_explored = true)?;
        self.stop();
        Err(Cancelled)
    }

    fn record_choice(&self, worker: WorkerHandle, entry: TraceEntry) -> Result<(), Cancelled> {
        self.with(|inner| {
            inner.trace.push(entry);
            if let Some(current) = inner.task_map.get(&worker) {
                inner.machines[current.index()].program_counter += 1;
            }
        })
    }

    fn run_hooks(&self) -> Result<(), Cancelled> {
        let (should_cache, head) = self.with(|inner| {
            let bound = self.config.effective_safety_prefix_bound();
            let should = self.config.cache_program_state && inner.strategy.explored_steps() >= bound;
            (should, inner.trace.last().cloned())
        })?;

        if should_cache {
            if let Some(head) = &head {
                if let Ok(mut hooks) = self.hooks.lock() {
                    if let Some(cache) = hooks.state_cache.as_mut() {
                        cache(head);
                    }
                }
            }
        }

        let assertion = self
            .hooks
            .lock()
            .ok()
            .and_then(|mut hooks| hooks.liveness.as_mut().and_then(|check| check()));

        if let Some(message) = assertion {
            self.notify_assertion_failure(message, true);
            return Err(Cancelled);
        }
        Ok(())
    }
}

fn runnable_candidates(inner: &Inner) -> Vec<MachineId> {
    let mut candidates: Vec<MachineId> = inner
        .machines
        .iter()
        .filter(|(_, info)| info.is_enabled)
        .map(|(_, info)| info.id.clone())
        .collect();
    candidates.sort();
    candidates
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::{Scheduler, SchedulerConfig};
    use crate::strategy::random::RandomStrategy;

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            max_fair_steps: 0,
            max_unfair_steps: 0,
            safety_prefix_bound: 0,
            cache_program_state: false,
            consider_depth_bound_hit_as_bug: true,
        }
    }

    #[test]
    fn single_machine_runs_to_completion_without_blocking() {
        let scheduler = Arc::new(Scheduler::new(Box::new(RandomStrategy::new(1)), config()));
        let worker = scheduler.next_worker_handle();
        scheduler.notify_new_task_created(worker, Some("M0".to_owned()));

        let s = Arc::clone(&scheduler);
        let handle = thread::spawn(move || {
            s.notify_task_started(worker).expect("not cancelled");
            s.notify_task_completed(worker).ok();
        });
        scheduler.wait_for_task_to_start(worker).expect("not cancelled");
        handle.join().expect("worker thread panicked");

        let outcome = scheduler.outcome().expect("not cancelled");
        assert!(outcome.fully_explored);
        assert!(outcome.bug.is_none());
    }

    #[test]
    fn unregistered_worker_is_reported_as_external_synchronization() {
        let scheduler = Scheduler::new(Box::new(RandomStrategy::new(1)), config());
        let stray = scheduler.next_worker_handle();
        let result = scheduler.schedule(stray);
        assert!(result.is_err());
        let outcome = scheduler.outcome().expect("not cancelled");
        assert!(outcome.bug.is_some());
    }
}
