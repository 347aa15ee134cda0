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

//! Errors.

use std::io;

// ----------------------------------------------------------------------------
// Types
// ----------------------------------------------------------------------------

/// Result, defaulting to [`Error`] for the error case.
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

// ----------------------------------------------------------------------------
// Enumerations
// ----------------------------------------------------------------------------

/// Error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A gate's mutex was poisoned by a panicking worker.
    ///
    /// This can only happen if a worker panics while holding the gate, which
    /// should never occur in practice, since worker bodies are run under
    /// [`std::panic::catch_unwind`]. It is still surfaced as a recoverable
    /// error rather than propagating the poison, since a poisoned gate would
    /// otherwise wedge every remaining worker in the iteration.
    #[error("gate poisoned by a panicking worker")]
    GatePoisoned,

    /// Spawning a worker thread failed.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}
