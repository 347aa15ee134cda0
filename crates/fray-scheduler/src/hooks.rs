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

//! Opaque sinks the scheduler drives at every scheduling step.
//!
//! Both hooks are boxed closures rather than a trait: the scheduler never
//! needs to know what a state cache or a liveness monitor *is*, only that it
//! can be called with a borrowed [`TraceEntry`] or polled for a verdict.
//! Neither hook is given a handle back into the scheduler - a liveness check
//! that wanted to raise an assertion would otherwise have to re-enter the
//! same gate its caller may already hold. Instead [`LivenessHook`] returns an
//! `Option<String>` and the scheduler itself calls
//! [`crate::Scheduler::notify_assertion_failure`] on its behalf.

use crate::trace::TraceEntry;

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Called after every scheduling step once the configured safety-prefix bound
/// has been passed, with the entry that was just recorded.
///
/// Typically used to fingerprint machine state and detect a revisit, which is
/// what lets a strategy like depth-first search prune a subtree it has
/// already explored under a different schedule.
pub type StateCacheHook = Box<dyn FnMut(&TraceEntry) + Send>;

/// Polled after every scheduling step and nondeterministic choice point.
///
/// Returns `Some(message)` the first time it detects a liveness violation,
/// `None` otherwise. Once it has fired it is expected to keep returning
/// `None` - the scheduler only keeps the first bug report of an iteration
/// regardless.
pub type LivenessHook = Box<dyn FnMut() -> Option<String> + Send>;

/// The pair of hooks a [`crate::Scheduler`] drives, held behind their own
/// lock so invoking them never contends with the scheduler's turn-taking
/// gate.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) state_cache: Option<StateCacheHook>,
    pub(crate) liveness: Option<LivenessHook>,
}
