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

//! Worker parking and machine-body spawning primitives.
//!
//! This crate is the bottom layer of fray: it owns nothing about machines,
//! strategies or schedules. It only provides the two things every worker
//! thread in the scheduler needs: a runtime-local [`WorkerHandle`] that is
//! never an OS thread id, and a [`Gate`], a generalization of a single
//! `Mutex<bool> + Condvar` termination signal into a predicate-based parking
//! primitive shared by every worker.

mod error;
pub mod gate;
pub mod worker;

pub use error::{Error, Result};
pub use gate::Gate;
pub use worker::{spawn, Cancelled, WorkerHandle, WorkerHandles};
