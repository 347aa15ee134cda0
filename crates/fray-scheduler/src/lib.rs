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

//! Serialized scheduler for exploring interleavings of actor-style machines.
//!
//! This crate owns the part of fray that decides, at every point a machine
//! would otherwise run concurrently with another, which single machine
//! actually gets to make progress next. It does not know what a machine
//! *is* beyond a [`MachineId`] and a worker thread - the semantic layer
//! (mailboxes, message delivery, user state machine logic) lives above this
//! crate and drives it purely through the [`Scheduler`] methods.

pub mod hooks;
pub mod machine;
pub mod scheduler;
pub mod strategy;
pub mod trace;

pub use fray_executor::Cancelled;
pub use hooks::{LivenessHook, StateCacheHook};
pub use machine::{MachineId, MachineInfo};
pub use scheduler::{BugReport, IterationOutcome, Scheduler, SchedulerConfig};
pub use strategy::Strategy;
pub use trace::{ScheduleTrace, TraceEntry};
