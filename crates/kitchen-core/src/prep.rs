//! Preparation progress machine.
//!
//! A [`PrepMachine`] accumulates progress toward [`PROGRESS_MAX`] at a fixed
//! per-tick rate. Automatic machines advance on every tick. Manual machines
//! advance only while liveness signals keep arriving; after
//! [`MANUAL_TIMEOUT_TICKS`] ticks without one they pause, keeping their
//! progress until the next signal.
//!
//! Each run is tagged with the occupant generation it was started for, so a
//! completion can be checked against the station's current contents.

use crate::fixed::Fixed64;
use serde::{Deserialize, Serialize};

/// Progress units needed to complete a preparation.
pub const PROGRESS_MAX: u32 = 100;

/// Ticks a manual preparation keeps running without a liveness signal.
pub const MANUAL_TIMEOUT_TICKS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepMode {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepPhase {
    #[default]
    Idle,
    InProgress,
    Paused,
    Complete,
}

/// What a single tick did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepTick {
    /// Not running (idle, complete, or still paused).
    Idle,
    Advanced,
    /// Reported once, on the transition into `Paused`.
    Paused,
    Completed { occupant: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepMachine {
    mode: PrepMode,
    /// Progress units per tick.
    rate: Fixed64,
    progress: Fixed64,
    phase: PrepPhase,
    since_signal: u32,
    occupant: u64,
}

impl PrepMachine {
    pub fn new(mode: PrepMode, rate: Fixed64) -> Self {
        Self {
            mode,
            rate,
            progress: Fixed64::ZERO,
            phase: PrepPhase::Idle,
            since_signal: 0,
            occupant: 0,
        }
    }

    /// Begin a run from zero for the given occupant generation.
    pub fn start(&mut self, occupant: u64) {
        self.progress = Fixed64::ZERO;
        self.phase = PrepPhase::InProgress;
        self.since_signal = 0;
        self.occupant = occupant;
    }

    /// Liveness signal. Resumes a paused run. Returns `true` if it resumed.
    pub fn signal(&mut self) -> bool {
        self.since_signal = 0;
        if self.phase == PrepPhase::Paused {
            self.phase = PrepPhase::InProgress;
            return true;
        }
        false
    }

    /// Drop the run and all accumulated progress.
    pub fn reset(&mut self) {
        self.progress = Fixed64::ZERO;
        self.phase = PrepPhase::Idle;
        self.since_signal = 0;
    }

    pub fn tick(&mut self) -> PrepTick {
        if self.phase != PrepPhase::InProgress {
            return PrepTick::Idle;
        }
        if self.mode == PrepMode::Manual {
            if self.since_signal >= MANUAL_TIMEOUT_TICKS {
                self.phase = PrepPhase::Paused;
                return PrepTick::Paused;
            }
            self.since_signal += 1;
        }

        self.progress = self.progress.saturating_add(self.rate);
        if self.progress >= Fixed64::from_num(PROGRESS_MAX) {
            self.progress = Fixed64::from_num(PROGRESS_MAX);
            self.phase = PrepPhase::Complete;
            return PrepTick::Completed {
                occupant: self.occupant,
            };
        }
        PrepTick::Advanced
    }

    pub fn mode(&self) -> PrepMode {
        self.mode
    }

    pub fn rate(&self) -> Fixed64 {
        self.rate
    }

    pub fn progress(&self) -> Fixed64 {
        self.progress
    }

    pub fn phase(&self) -> PrepPhase {
        self.phase
    }

    /// Running or paused mid-run.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, PrepPhase::InProgress | PrepPhase::Paused)
    }

    pub fn occupant(&self) -> u64 {
        self.occupant
    }
}
