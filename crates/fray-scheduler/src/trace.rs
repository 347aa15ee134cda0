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

//! Recorded schedule and nondeterministic-choice history.

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::machine::MachineId;

/// One recorded decision, in the order it was made.
///
/// A [`ScheduleTrace`] is simply a sequence of these. Replaying a trace is
/// nothing more than feeding the entries back to a machine one at a time
/// instead of asking a strategy to invent new ones - see
/// [`crate::strategy::replay`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TraceEntry {
    /// A scheduling choice: which machine ran next.
    Schedule {
        /// Dense index of the machine that was scheduled.
        machine: usize,
        /// Friendly name of the machine, if it had one.
        name: Option<String>,
    },
    /// An unfair nondeterministic boolean choice.
    Bool {
        /// The value returned to the caller.
        value: bool,
    },
    /// A fair nondeterministic boolean choice, tied to a call-site identity
    /// so a fairness-aware strategy can track it across iterations.
    FairBool {
        /// Call-site identity supplied by the caller.
        unique_id: u64,
        /// The value returned to the caller.
        value: bool,
    },
    /// A nondeterministic integer choice.
    Int {
        /// The value returned to the caller.
        value: i64,
    },
}

/// The full history of decisions made during one iteration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScheduleTrace {
    entries: Vec<TraceEntry>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ScheduleTrace {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the trace, keeping the allocation for reuse across iterations.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Appends a decision.
    pub(crate) fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    /// Returns the most recently recorded decision, if any.
    #[must_use]
    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    /// Returns the full sequence of recorded decisions.
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Returns the number of [`TraceEntry::Schedule`] entries.
    #[must_use]
    pub fn num_schedule_choices(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, TraceEntry::Schedule { .. }))
            .count()
    }

    /// Returns the number of nondeterministic-choice entries, schedule
    /// choices excluded.
    #[must_use]
    pub fn num_nondet_choices(&self) -> usize {
        self.entries.len() - self.num_schedule_choices()
    }
}

pub(crate) fn schedule_entry(machine: &MachineId) -> TraceEntry {
    TraceEntry::Schedule {
        machine: machine.index(),
        name: machine.name().map(str::to_owned),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{ScheduleTrace, TraceEntry};

    #[test]
    fn counts_split_schedule_from_nondet_entries() {
        let mut trace = ScheduleTrace::new();
        trace.push(TraceEntry::Schedule {
            machine: 0,
            name: None,
        });
        trace.push(TraceEntry::Bool { value: true });
        trace.push(TraceEntry::Int { value: 3 });

        assert_eq!(trace.num_schedule_choices(), 1);
        assert_eq!(trace.num_nondet_choices(), 2);
    }

    #[test]
    fn round_trips_through_json() {
        let mut trace = ScheduleTrace::new();
        trace.push(TraceEntry::FairBool {
            unique_id: 42,
            value: false,
        });

        let json = serde_json::to_string(&trace).expect("serializable");
        let restored: ScheduleTrace = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(restored.entries(), trace.entries());
    }
}
