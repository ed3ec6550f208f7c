// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 r64core contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Timed event scheduling
//!
//! Events (the Compare timer, the vertical interrupt) are kept on an
//! absolute cycle timeline rather than as wrapping Count comparisons:
//! `now` is the monotonically increasing total of executed cycles, and
//! the guest-visible Count register is derived from it. Writing Count
//! rebases the derivation without disturbing the timeline.

use serde::{Deserialize, Serialize};

/// Kinds of timed events. At most one of each kind is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Count == Compare timer interrupt (Cause IP7).
    CompareTimer,
    /// Vertical interrupt at the TV refresh rate (Cause IP2).
    VideoInterrupt,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Event {
    kind: EventKind,
    when: u64,
}

/// Pending-event queue plus the Count derivation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler {
    events: Vec<Event>,
    /// Count value at the last rebase.
    count_base: u32,
    /// Cycle total at the last rebase.
    cycles_at_base: u64,
    /// CPU cycles per Count tick.
    factor: u64,
}

impl Scheduler {
    pub fn new(counter_factor: u32) -> Self {
        Self {
            events: Vec::new(),
            count_base: 0,
            cycles_at_base: 0,
            factor: counter_factor.max(1) as u64,
        }
    }

    /// Guest-visible Count register at a given cycle total.
    #[inline]
    pub fn count(&self, now: u64) -> u32 {
        self.count_base
            .wrapping_add(((now - self.cycles_at_base) / self.factor) as u32)
    }

    /// Rebase Count (an MTC0 to Count). Queued deadlines keep their
    /// absolute positions.
    pub fn set_count(&mut self, now: u64, value: u32) {
        self.count_base = value;
        self.cycles_at_base = now;
    }

    /// Cycle total at which Count will next equal `target`. A target
    /// equal to the current Count means one full wrap from now.
    pub fn cycles_until_count(&self, now: u64, target: u32) -> u64 {
        let delta = target.wrapping_sub(self.count(now));
        let ticks = if delta == 0 { 1u64 << 32 } else { delta as u64 };
        now + ticks * self.factor
    }

    /// Queue an event, replacing any queued event of the same kind.
    pub fn schedule(&mut self, kind: EventKind, when: u64) {
        self.remove(kind);
        self.events.push(Event { kind, when });
    }

    pub fn remove(&mut self, kind: EventKind) {
        self.events.retain(|e| e.kind != kind);
    }

    /// Earliest queued deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.events.iter().map(|e| e.when).min()
    }

    /// Pop one event whose deadline has passed, earliest first.
    pub fn pop_due(&mut self, now: u64) -> Option<EventKind> {
        let idx = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.when <= now)
            .min_by_key(|(_, e)| e.when)
            .map(|(i, _)| i)?;
        Some(self.events.swap_remove(idx).kind)
    }

    pub fn is_scheduled(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
