//! Simulation clock and shift state.

use crate::fixed::Ticks;
use serde::{Deserialize, Serialize};

/// Mutable simulation state tracked by the kitchen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// Current tick. Incremented by 1 at the start of each step.
    pub tick: Ticks,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a `Kitchen::advance()` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceResult {
    pub steps_run: u64,
    /// Whether the shift ran out during this call.
    pub shift_ended: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftState {
    #[default]
    Ready,
    Running,
    Over,
}

/// Tracks one shift: `Ready -> Running -> Over`, optionally time-limited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftClock {
    state: ShiftState,
    started_at: Ticks,
    length: Option<Ticks>,
}

impl ShiftClock {
    pub fn new(length: Option<Ticks>) -> Self {
        Self {
            state: ShiftState::Ready,
            started_at: 0,
            length,
        }
    }

    pub fn state(&self) -> ShiftState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ShiftState::Running
    }

    /// Returns `false` unless the shift was `Ready`.
    pub fn start(&mut self, now: Ticks) -> bool {
        if self.state != ShiftState::Ready {
            return false;
        }
        self.state = ShiftState::Running;
        self.started_at = now;
        true
    }

    /// Returns `false` unless the shift was `Running`.
    pub fn end(&mut self) -> bool {
        if self.state != ShiftState::Running {
            return false;
        }
        self.state = ShiftState::Over;
        true
    }

    /// Whether a running, time-limited shift has used up its time.
    pub fn is_due(&self, now: Ticks) -> bool {
        match self.length {
            Some(length) if self.is_running() => now >= self.started_at.saturating_add(length),
            _ => false,
        }
    }

    /// Ticks left in a running, time-limited shift.
    pub fn remaining(&self, now: Ticks) -> Option<Ticks> {
        let length = self.length?;
        match self.state {
            ShiftState::Ready => Some(length),
            ShiftState::Running => {
                Some(self.started_at.saturating_add(length).saturating_sub(now))
            }
            ShiftState::Over => Some(0),
        }
    }
}
