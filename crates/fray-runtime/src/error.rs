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

//! Error type for the iteration driver and runtime handle.

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Result alias used throughout this crate.
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Errors raised by [`crate::Runtime`] and [`crate::IterationDriver`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A [`crate::Runtime`] handle was used after the iteration it belongs to
    /// had already ended.
    ///
    /// This happens when a machine entry point leaks a stray thread past its
    /// iteration boundary - the thread is no longer "in" any iteration the
    /// driver is tracking, and must not be allowed to touch the scheduler of
    /// whatever iteration happens to be running next.
    #[error("runtime used after its iteration ended")]
    DisposedRuntimeUse,

    /// The scheduler stopped - the iteration ended, another machine's bug
    /// was found, or a step bound was hit - while this call was in flight.
    ///
    /// Propagated with `?` like any other error, but it is not a bug in its
    /// own right: it is a cancellation sentinel standing in for a cross-task
    /// unwind, and the one place that should act on it is the scoped guard
    /// at the top of a spawned machine body, which drops it silently rather
    /// than reporting it anywhere.
    #[error(transparent)]
    Cancelled(#[from] fray_executor::Cancelled),

    /// A machine's worker thread could not be spawned.
    #[error("failed to spawn machine worker")]
    Spawn(#[from] fray_executor::Error),

    /// A [`crate::Config`] field was out of the range the driver accepts.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
