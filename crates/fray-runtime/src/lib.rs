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

//! Drives a program under test across many iterations on top of
//! [`fray_scheduler`], reporting every bug it finds.
//!
//! This crate is the layer a caller actually talks to: it owns the
//! generation-checked [`Runtime`] handle a machine body uses to spawn more
//! machines and make scheduling-point calls, the [`Config`] surface that
//! picks and tunes a [`fray_scheduler::Strategy`], and the
//! [`IterationDriver`] that runs the configured number of iterations and
//! folds their outcomes into a [`TestReport`].

mod config;
mod driver;
mod error;
mod report;
mod runtime;

pub use config::{Config, StrategyKind};
pub use driver::{FailureObserver, IterationDriver};
pub use error::{Error, Result};
pub use fray_scheduler::{BugReport, ScheduleTrace};
pub use report::{FailureKind, TestReport};
pub use runtime::Runtime;
