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

//! Deterministic replay of a previously recorded [`ScheduleTrace`].

use crate::machine::MachineId;
use crate::strategy::Strategy;
use crate::trace::{ScheduleTrace, TraceEntry};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Feeds back the entries of a recorded [`ScheduleTrace`] instead of
/// inventing new decisions.
///
/// Used to reproduce a bug found under a different strategy: construct one
/// from the [`crate::scheduler::BugReport::trace`] of a failing iteration and
/// run a single iteration against it. A mismatch between the recorded entry
/// kind and what the machine actually asks for (a [`TraceEntry::Bool`] where
/// a schedule choice was expected, or a recorded machine id that is not
/// currently runnable) ends the replay the same way running off the end of
/// the trace does: by returning `None`, same as a strategy with nothing left
/// to contribute.
#[derive(Debug)]
pub struct ReplayStrategy {
    trace: ScheduleTrace,
    pos: usize,
    explored: u64,
    fair: bool,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ReplayStrategy {
    /// Creates a strategy that replays `trace` from the beginning.
    #[must_use]
    pub fn new(trace: ScheduleTrace) -> Self {
        Self {
            trace,
            pos: 0,
            explored: 0,
            fair: false,
        }
    }

    /// Marks the replay as having originated from a fair schedule, so
    /// [`Strategy::is_fair`] reports it back consistently.
    #[must_use]
    pub fn fair(mut self, fair: bool) -> Self {
        self.fair = fair;
        self
    }

    fn advance(&mut self) -> Option<&TraceEntry> {
        let entry = self.trace.entries().get(self.pos)?;
        self.pos += 1;
        self.explored += 1;
        Some(entry)
    }
}

impl Strategy for ReplayStrategy {
    fn try_get_next(
        &mut self,
        runnable: &[MachineId],
        _current: Option<&MachineId>,
    ) -> Option<MachineId> {
        let next_pos = self.pos;
        let TraceEntry::Schedule { machine, .. } = self.trace.entries().get(next_pos)? else {
            return None;
        };
        let found = runnable.iter().find(|id| id.index() == *machine)?.clone();
        self.pos += 1;
        self.explored += 1;
        Some(found)
    }

    fn next_bool(&mut self, _max_value: u32) -> Option<bool> {
        match self.advance()? {
            TraceEntry::Bool { value } | TraceEntry::FairBool { value, .. } => Some(*value),
            _ => None,
        }
    }

    fn next_int(&mut self, _max_value: u32) -> Option<i64> {
        match self.advance()? {
            TraceEntry::Int { value } => Some(*value),
            _ => None,
        }
    }

    fn explored_steps(&self) -> u64 {
        self.explored
    }

    fn max_steps_reached(&self) -> bool {
        false
    }

    fn is_fair(&self) -> bool {
        self.fair
    }

    fn has_finished(&self) -> bool {
        self.pos >= self.trace.entries().len()
    }

    fn configure_next_iteration(&mut self) {
        self.pos = 0;
        self.explored = 0;
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.explored = 0;
    }

    fn description(&self) -> String {
        "replay".to_owned()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::ReplayStrategy;
    use crate::machine::MachineId;
    use crate::strategy::Strategy;
    use crate::trace::{ScheduleTrace, TraceEntry};

    #[test]
    fn replays_recorded_schedule_choices_in_order() {
        let mut trace = ScheduleTrace::new();
        trace.push(TraceEntry::Schedule {
            machine: 1,
            name: None,
        });
        trace.push(TraceEntry::Bool { value: true });

        let mut strategy = ReplayStrategy::new(trace);
        let candidates = vec![MachineId::new(0, None), MachineId::new(1, None)];

        assert_eq!(
            strategy.try_get_next(&candidates, None),
            Some(candidates[1].clone())
        );
        assert_eq!(strategy.next_bool(2), Some(true));
        assert!(strategy.has_finished());
    }

    #[test]
    fn mismatched_entry_kind_ends_the_replay() {
        let mut trace = ScheduleTrace::new();
        trace.push(TraceEntry::Bool { value: true });

        let candidates = vec![MachineId::new(0, None)];
        let mut strategy = ReplayStrategy::new(trace);
        assert_eq!(strategy.try_get_next(&candidates, None), None);
    }
}
