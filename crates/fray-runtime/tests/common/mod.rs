// Copyright (c) 2025-2026 The fray authors

// SPDX-License-Identifier: MIT
// All contributions are certified under the DCO

//! Toy machine harness used by the end-to-end tests in this directory.
//!
//! The semantic layer (mailboxes, handler dispatch, a DSL) is out of scope
//! for this crate, so these tests build the smallest
//! `send`/`receive`/`push`/`pop`/`assert`/`halt`/`create` surface needed to
//! drive the scheduler end to end, entirely in terms of the public
//! `fray_runtime::Runtime` API. It is not exported; every test module below
//! pulls it in with `mod common;`.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::panic::UnwindSafe;
use std::sync::{Arc, Mutex};

use fray_executor::WorkerHandle;
use fray_runtime::{Result, Runtime};
use fray_scheduler::MachineId;

/// Per-machine event inboxes, shared by every machine created in one run.
#[derive(Default)]
pub struct Mailboxes {
    inner: Mutex<HashMap<MachineId, VecDeque<String>>>,
}

impl Mailboxes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn deliver(&self, target: &MachineId, event: String) {
        self.inner
            .lock()
            .expect("mailboxes poisoned")
            .entry(target.clone())
            .or_default()
            .push_back(event);
    }

    fn take(&self, id: &MachineId) -> Option<String> {
        self.inner
            .lock()
            .expect("mailboxes poisoned")
            .get_mut(id)
            .and_then(VecDeque::pop_front)
    }
}

/// Per-machine push/pop stacks, used by the unbalanced-pop scenario.
#[derive(Default)]
pub struct Stacks {
    inner: Mutex<HashMap<MachineId, Vec<String>>>,
}

impl Stacks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, id: &MachineId, value: String) {
        self.inner.lock().expect("stacks poisoned").entry(id.clone()).or_default().push(value);
    }

    fn pop(&self, id: &MachineId) -> Option<String> {
        self.inner.lock().expect("stacks poisoned").get_mut(id).and_then(Vec::pop)
    }
}

/// Everything a toy machine body sees: who it is, the runtime it runs on top
/// of, and the mailbox/stack state shared across the whole program.
#[derive(Clone)]
pub struct Ctx {
    pub runtime: Runtime,
    pub worker: WorkerHandle,
    pub id: MachineId,
    mailboxes: Arc<Mailboxes>,
    stacks: Arc<Stacks>,
}

impl Ctx {
    /// Creates a new machine, handing its body a [`Ctx`] of its own that
    /// shares this program's mailboxes and stacks.
    pub fn create<F>(&self, name: Option<String>, run: F) -> Result<MachineId>
    where
        F: FnOnce(Ctx) -> Result<()> + Send + UnwindSafe + 'static,
    {
        spawn(&self.runtime, &self.mailboxes, &self.stacks, name, run)
    }

    /// Delivers `event` to `target`'s mailbox and wakes it if it was
    /// blocked on a receive.
    pub fn send(&self, target: &MachineId, event: impl Into<String>) -> Result<()> {
        self.mailboxes.deliver(target, event.into());
        self.runtime.notify_received_event(target)
    }

    /// Blocks until an event is available in this machine's own mailbox,
    /// yielding the turn every time it finds the mailbox empty.
    pub fn receive(&self) -> Result<String> {
        loop {
            if let Some(event) = self.mailboxes.take(&self.id) {
                return Ok(event);
            }
            self.runtime.block_on_event(self.worker)?;
            self.runtime.schedule(self.worker)?;
        }
    }

    /// Pushes a value onto this machine's own stack.
    pub fn push(&self, value: impl Into<String>) {
        self.stacks.push(&self.id, value.into());
    }

    /// Pops a value off this machine's own stack.
    ///
    /// An empty stack is a bug: `Machine '{name}()' popped with no matching
    /// push.`, matching the text the scheduler's assertion path is expected
    /// to produce for this condition.
    pub fn pop(&self) -> Result<String> {
        match self.stacks.pop(&self.id) {
            Some(value) => Ok(value),
            None => {
                self.assert(false, format!("Machine '{}()' popped with no matching push.", self.id))?;
                self.halt()?;
                unreachable!("halt always unwinds once this machine has been disabled")
            }
        }
    }

    /// Records a bug if `condition` is false. Does not itself yield the
    /// turn - same as `NotifyAssertionFailure`, callers that need the
    /// cancellation to actually propagate call [`Ctx::halt`] afterwards.
    pub fn assert(&self, condition: bool, message: impl Into<String>) -> Result<()> {
        self.runtime.assert(condition, message)
    }

    /// Yields the turn. Once the scheduler has stopped, this is how a
    /// machine observes its own cancellation and unwinds.
    pub fn halt(&self) -> Result<()> {
        self.runtime.schedule(self.worker)
    }
}

/// Creates the first machine of a run, wiring up fresh mailboxes and stacks.
pub fn spawn_root<F>(runtime: &Runtime, name: Option<String>, run: F) -> Result<MachineId>
where
    F: FnOnce(Ctx) -> Result<()> + Send + UnwindSafe + 'static,
{
    spawn(runtime, &Mailboxes::new(), &Stacks::new(), name, run)
}

fn spawn<F>(
    runtime: &Runtime,
    mailboxes: &Arc<Mailboxes>,
    stacks: &Arc<Stacks>,
    name: Option<String>,
    run: F,
) -> Result<MachineId>
where
    F: FnOnce(Ctx) -> Result<()> + Send + UnwindSafe + 'static,
{
    let mailboxes = Arc::clone(mailboxes);
    let stacks = Arc::clone(stacks);
    runtime.spawn_machine(name, move |runtime, worker, id| {
        let ctx = Ctx {
            runtime: runtime.clone(),
            worker,
            id,
            mailboxes,
            stacks,
        };
        run(ctx)
    })
}
