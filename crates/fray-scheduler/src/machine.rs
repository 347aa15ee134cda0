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

//! Machine identity and per-machine scheduling records.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use fray_executor::WorkerHandle;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Dense machine identifier.
///
/// Equality, ordering and hashing are defined purely on the dense integer
/// assigned by the scheduler in machine-creation order; the friendly name is
/// carried along for diagnostics (bug messages, trace dumps) but never
/// affects identity. Two [`MachineId`] values with the same index are always
/// the same machine, regardless of what name each was constructed with.
#[derive(Clone, Debug)]
pub struct MachineId {
    index: usize,
    name: Option<Box<str>>,
}

/// Per-machine scheduling record.
///
/// One [`MachineInfo`] exists for every machine that has been created during
/// the current iteration, for as long as the iteration runs - the scheduler
/// is the sole owner of these records and never hands out mutable access to
/// the semantic layer above it, only [`MachineId`]s.
#[derive(Clone, Debug)]
pub struct MachineInfo {
    /// Identity of this machine.
    pub id: MachineId,
    /// Worker currently responsible for running this machine's body.
    pub worker: WorkerHandle,
    /// Whether this machine currently holds the turn.
    ///
    /// At most one [`MachineInfo`] has this set between scheduling points.
    pub is_active: bool,
    /// Whether this machine is a candidate for [`super::Strategy::try_get_next`].
    ///
    /// Cleared once the machine halts, is cancelled, or starts waiting on a
    /// receive - this single flag is what `is_enabled ⇒ ¬is_completed` and
    /// "waiting machines are not runnable" both reduce to.
    pub is_enabled: bool,
    /// Whether this machine is blocked on a typed receive.
    pub is_waiting_to_receive: bool,
    /// Whether this machine's worker has returned.
    pub is_completed: bool,
    /// Whether this machine's worker has registered and parked for its first
    /// turn.
    pub has_started: bool,
    /// Local nondeterministic-choice counter, reset to zero every time this
    /// machine is scheduled.
    ///
    /// Distinguishes choices consumed while a machine holds the turn from
    /// scheduling choices themselves, which state-caching needs in order to
    /// fingerprint a program state independent of *how many* local choices
    /// led up to it.
    pub program_counter: u64,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl MachineId {
    /// Creates a machine id for the given dense index and optional name.
    pub(crate) fn new(index: usize, name: Option<String>) -> Self {
        Self {
            index,
            name: name.map(String::into_boxed_str),
        }
    }

    /// Returns the dense slab index backing this id.
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Returns the friendly name, if one was given at creation time.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl fmt::Display for MachineId {
    /// Formats the id as its friendly name, or `M<index>` if it has none.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "M{}", self.index),
        }
    }
}

impl PartialEq for MachineId {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for MachineId {}

impl Hash for MachineId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl PartialOrd for MachineId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MachineId {
    /// Orders purely by index, giving the scheduler a stable candidate order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::MachineId;

    #[test]
    fn equality_is_by_index_only() {
        let a = MachineId::new(0, Some("A".into()));
        let b = MachineId::new(0, Some("B".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn display_falls_back_to_dense_index() {
        let anonymous = MachineId::new(3, None);
        assert_eq!(anonymous.to_string(), "M3");
    }
}
