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

//! A generation-checked handle onto one iteration's [`Scheduler`].

use std::panic::UnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use fray_scheduler::{MachineId, Scheduler};

use crate::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Everything the program under test touches during one iteration.
///
/// A `Runtime` is cheap to clone - every clone shares the same scheduler, the
/// same generation counter, and the same list of spawned worker threads -
/// which is what lets a machine body hand its own `Runtime` to the child it
/// creates with [`Runtime::spawn_machine`]. What makes a clone from a *prior*
/// iteration detectably stale is the `generation` each carries: every
/// operation below checks it against the driver's current generation first,
/// so a handle captured by a closure across an iteration boundary fails
/// loudly instead of silently touching a scheduler that has moved on.
#[derive(Clone)]
pub struct Runtime {
    scheduler: Arc<Scheduler>,
    generation: u64,
    current: Arc<AtomicU64>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Runtime {
    /// Wraps `scheduler` as generation `generation`, checked against `current`.
    pub(crate) fn new(scheduler: Arc<Scheduler>, generation: u64, current: Arc<AtomicU64>) -> Self {
        Self {
            scheduler,
            generation,
            current,
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Spawns a new machine, returning its id once the scheduler has
    /// registered it and its worker has started and parked for its first
    /// turn.
    ///
    /// `body` plays the role of a machine's handler dispatch loop: it
    /// receives this same `Runtime` (so it can itself call `spawn_machine`
    /// to create further machines), the [`fray_executor::WorkerHandle`] the
    /// scheduler assigned it - which every scheduling-point call on
    /// `Runtime` needs to identify the caller - and its own freshly minted
    /// [`MachineId`], the same value this call returns to the creator. It is
    /// expected to use `?` on every scheduling-point call, so
    /// [`Error::Cancelled`] unwinds it cleanly once the scheduler stops. Its
    /// return value is otherwise discarded - a machine's own logical result
    /// has nowhere to go once dispatch is done, same as a real
    /// handler-dispatch loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisposedRuntimeUse`] if this handle belongs to an
    /// iteration that already ended, and [`Error::Spawn`] if the worker
    /// thread itself could not be created.
    pub fn spawn_machine<F>(&self, name: Option<String>, body: F) -> Result<MachineId>
    where
        F: FnOnce(&Runtime, fray_executor::WorkerHandle, MachineId) -> Result<()> + Send + UnwindSafe + 'static,
    {
        self.check()?;

        let worker = self.scheduler.next_worker_handle();
        let id = self.scheduler.notify_new_task_created(worker, name);

        let child = self.clone();
        let child_id = id.clone();
        let scheduler = Arc::clone(&self.scheduler);
        let handle = fray_executor::spawn(worker, move || {
            if scheduler.notify_task_started(worker).is_ok() {
                let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    if let Err(err) = body(&child, worker, child_id) {
                        if !matches!(err, Error::Cancelled(_)) {
                            scheduler.notify_assertion_failure(format!("unhandled exception: {err}"), true);
                        }
                    }
                }))
                .unwrap_or_else(|payload| {
                    scheduler.notify_assertion_failure(
                        format!("unhandled exception: {}", crate::driver::panic_message(&payload)),
                        true,
                    );
                });
            }
            let _ = scheduler.notify_task_completed(worker);
        })?;

        self.handles.lock().expect("runtime handle list poisoned").push(handle);
        self.scheduler.wait_for_task_to_start(worker)?;
        Ok(id)
    }

    /// Forwards a scheduling-point yield to the scheduler for `worker`.
    ///
    /// # Errors
    ///
    /// See [`Runtime::spawn_machine`].
    pub fn schedule(&self, worker: fray_executor::WorkerHandle) -> Result<()> {
        self.check()?;
        self.scheduler.schedule(worker)?;
        Ok(())
    }

    /// Resolves a nondeterministic boolean choice for `worker`.
    ///
    /// # Errors
    ///
    /// See [`Runtime::spawn_machine`].
    pub fn next_bool_choice(
        &self,
        worker: fray_executor::WorkerHandle,
        max_value: u32,
        unique_id: Option<u64>,
    ) -> Result<bool> {
        self.check()?;
        Ok(self.scheduler.get_next_bool_choice(worker, max_value, unique_id)?)
    }

    /// Resolves a nondeterministic integer choice for `worker`.
    ///
    /// # Errors
    ///
    /// See [`Runtime::spawn_machine`].
    pub fn next_int_choice(&self, worker: fray_executor::WorkerHandle, max_value: u32) -> Result<i64> {
        self.check()?;
        Ok(self.scheduler.get_next_int_choice(worker, max_value)?)
    }

    /// Marks `worker` blocked on a typed receive.
    ///
    /// # Errors
    ///
    /// See [`Runtime::spawn_machine`].
    pub fn block_on_event(&self, worker: fray_executor::WorkerHandle) -> Result<()> {
        self.check()?;
        Ok(self.scheduler.notify_task_blocked_on_event(worker)?)
    }

    /// Marks `machine` runnable again after it received an awaited event.
    ///
    /// # Errors
    ///
    /// See [`Runtime::spawn_machine`].
    pub fn notify_received_event(&self, machine: &MachineId) -> Result<()> {
        self.check()?;
        Ok(self.scheduler.notify_task_received_event(machine)?)
    }

    /// Records a bug against this iteration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisposedRuntimeUse`] if this handle belongs to an
    /// iteration that already ended.
    pub fn assert(&self, condition: bool, message: impl Into<String>) -> Result<()> {
        self.check()?;
        if !condition {
            self.scheduler.notify_assertion_failure(message, true);
        }
        Ok(())
    }

    /// The worker handle reserved for the thread that created this iteration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DisposedRuntimeUse`] if this handle belongs to an
    /// iteration that already ended.
    pub fn root_handle(&self) -> Result<fray_executor::WorkerHandle> {
        self.check()?;
        Ok(self.scheduler.root_handle())
    }

    fn check(&self) -> Result<()> {
        if self.current.load(Ordering::Acquire) == self.generation {
            Ok(())
        } else {
            Err(Error::DisposedRuntimeUse)
        }
    }

    /// Joins every worker thread spawned through this `Runtime` or any of
    /// its clones, blocking until all of them have returned.
    ///
    /// Called by the driver once [`fray_scheduler::Scheduler::wait`] has
    /// returned, so it is safe to assume every worker is at most a few
    /// instructions from exiting rather than genuinely still running user
    /// code.
    pub(crate) fn join_all(&self) {
        let handles = std::mem::take(&mut *self.handles.lock().expect("runtime handle list poisoned"));
        for handle in handles {
            let _ = handle.join();
        }
    }
}
