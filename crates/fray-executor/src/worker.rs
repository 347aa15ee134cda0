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

//! Worker handles and machine-body spawning.

use std::fmt;
use std::panic::{self, UnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{Builder, JoinHandle};

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Runtime-local handle identifying a worker thread.
///
/// This is deliberately *not* an OS thread id. The source this scheduler is
/// modeled on keys its task map by a host-provided thread id, which is only
/// safe because serialization guarantees at most one live registration per
/// id at a time - a fragile invariant to lean on. Minting our own
/// monotonically increasing handle at spawn time removes the need for that
/// invariant entirely: handles are unique for the lifetime of a runtime, full
/// stop, regardless of what the OS does with thread ids behind the scenes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerHandle(u64);

/// Allocator for [`WorkerHandle`]s, one per runtime.
#[derive(Debug, Default)]
pub struct WorkerHandles {
    /// Next handle to hand out.
    next: AtomicU64,
}

/// Sentinel propagated by every scheduling-point call once the scheduler has
/// been stopped.
///
/// A worker that observes this value must unwind to the top of its spawned
/// closure without running any more user code, and without being caught by
/// user code along the way - it plays the role the source's "execution
/// cancelled" exception plays in a language with unwinding across task
/// boundaries. Since Rust has no such mechanism, it is instead an ordinary
/// early-return sentinel that every scheduling-point helper propagates with
/// `?`, picked up by a small guard at the top of [`spawn`]'s closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("execution cancelled")
    }
}

impl std::error::Error for Cancelled {}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl WorkerHandles {
    /// Creates a fresh handle allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next handle.
    pub fn next(&self) -> WorkerHandle {
        WorkerHandle(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Spawns a machine body on its own OS thread.
///
/// The body is run under [`panic::catch_unwind`], mirroring the work-pool
/// worker loop this is modeled on: a panicking machine must not take its
/// worker thread, or the scheduler, down with it. Unlike a pooled worker,
/// this thread belongs to exactly one machine for its entire lifetime - it is
/// parked and woken by the scheduler's gate, never reused for another
/// machine, which is what lets the scheduler preserve a total order over
/// machine steps without any real parallelism between them.
///
/// # Errors
///
/// Returns [`Error::Spawn`] if the underlying OS thread could not be created.
pub fn spawn<F>(handle: WorkerHandle, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + UnwindSafe + 'static,
{
    Builder::new()
        .name(format!("fray/machine/{handle}"))
        .spawn(move || {
            let _ = panic::catch_unwind(body);
        })
        .map_err(Error::Spawn)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::WorkerHandles;

    #[test]
    fn handles_are_monotonic_and_unique() {
        let handles = WorkerHandles::new();
        let a = handles.next();
        let b = handles.next();
        assert_ne!(a, b);
        assert!(a < b);
    }
}
