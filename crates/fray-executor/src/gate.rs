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

//! Gate for predicate-based synchronization.

use std::sync::{Condvar, Mutex, MutexGuard};

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Gate for predicate-based synchronization.
///
/// A gate is a `Mutex<T> + Condvar` pair, generalizing the single-purpose
/// termination signal of a thread pool executor (a `Mutex<bool>` that workers
/// wait on until it flips to `true`) into a parking primitive that can guard
/// arbitrary shared state. Every worker thread in the scheduler waits on the
/// *same* gate, re-checking its own predicate in a loop every time it wakes -
/// exactly like a termination signal re-checks "should I terminate yet?", but
/// parameterized over what "yet" means for that particular worker.
///
/// This sidesteps the need for one condition variable per machine: since the
/// scheduler notifies all workers on every turn hand-off, each worker simply
/// wakes, re-locks, and checks whether its own turn has come, going back to
/// sleep otherwise. Spurious wakeups are indistinguishable from real ones and
/// both are handled by the same loop.
pub struct Gate<T> {
    /// Guarded state.
    mutex: Mutex<T>,
    /// Condition used to block workers without busy-waiting.
    condvar: Condvar,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<T> Gate<T> {
    /// Creates a gate guarding the given initial state.
    pub fn new(value: T) -> Self {
        Self {
            mutex: Mutex::new(value),
            condvar: Condvar::new(),
        }
    }

    /// Locks the gate and applies `f` to the guarded state.
    ///
    /// This is the non-blocking entry point: most scheduler operations need
    /// to read or mutate a handful of fields under the single gate lock and
    /// return immediately, without parking. Use [`Gate::wait_while`] for the
    /// blocking case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GatePoisoned`] if a previous holder of the lock
    /// panicked.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    /// Blocks the calling thread until `pred` holds, then applies `f`.
    ///
    /// The predicate is re-evaluated every time the gate is notified (and on
    /// every spurious wakeup), while holding the lock throughout, which means
    /// `f` observes the exact state that made `pred` return `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GatePoisoned`] if a previous holder of the lock
    /// panicked.
    pub fn wait_while<R>(
        &self,
        mut pred: impl FnMut(&T) -> bool,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        let mut guard = self.lock()?;
        while !pred(&guard) {
            guard = self
                .condvar
                .wait(guard)
                .map_err(|_| Error::GatePoisoned)?;
        }
        Ok(f(&mut guard))
    }

    /// Wakes every thread parked on the gate.
    ///
    /// Callers are expected to have already applied whatever state change
    /// should cause a parked predicate to become true, typically from inside
    /// a prior [`Gate::with`] call.
    pub fn notify_all(&self) {
        self.condvar.notify_all();
    }

    /// Consumes the gate, returning the guarded state.
    ///
    /// Used once a gate's workers are known to have all parked or exited -
    /// the iteration driver reclaims a strategy this way after a scheduler's
    /// last worker has been joined, to carry its state into the next
    /// iteration's fresh scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GatePoisoned`] if a previous holder of the lock
    /// panicked.
    pub fn into_inner(self) -> Result<T> {
        self.mutex.into_inner().map_err(|_| Error::GatePoisoned)
    }

    /// Locks the gate, returning the raw guard.
    fn lock(&self) -> Result<MutexGuard<'_, T>> {
        self.mutex.lock().map_err(|_| Error::GatePoisoned)
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<T> std::fmt::Debug for Gate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate").finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::Gate;

    #[test]
    fn wait_while_wakes_on_notify() {
        let gate = Arc::new(Gate::new(false));
        let waiter = Arc::clone(&gate);

        let handle = thread::spawn(move || {
            waiter.wait_while(|ready| *ready, |_| ()).unwrap();
        });

        gate.with(|ready| *ready = true).unwrap();
        gate.notify_all();
        handle.join().unwrap();
    }

    #[test]
    fn with_reads_back_mutation() {
        let gate = Gate::new(0_u32);
        gate.with(|value| *value += 1).unwrap();
        let value = gate.with(|value| *value).unwrap();
        assert_eq!(value, 1);
    }
}
