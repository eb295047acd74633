use crate::CLOCK_INCREMENT;
use crate::CLOCK_TICK;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// Per-player countdown driven by a single cooperative ticker.
///
/// At most one player's time decrements at a time, and only while the
/// clock is running; the active slot switches exclusively on an applied
/// action or an explicit pause. Remaining time is held as an absolute
/// Duration, so pausing and resuming never drifts against wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    remaining: [Duration; 2],
    active: usize,
    running: bool,
}

impl Clock {
    pub fn new(start: Duration) -> Self {
        Self {
            remaining: [start; 2],
            active: 0,
            running: true,
        }
    }

    pub fn remaining(&self, player: usize) -> Duration {
        self.remaining[player]
    }
    pub fn active(&self) -> usize {
        self.active
    }
    pub fn running(&self) -> bool {
        self.running
    }

    /// one cooperative tick against the active player; true when the flag
    /// falls, which the caller must treat as terminal before any rule check
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining[self.active] = self.remaining[self.active].saturating_sub(CLOCK_TICK);
        self.remaining[self.active].is_zero()
    }

    /// an action was applied: credit the mover, decrement the next player
    pub fn press(&mut self, mover: usize, next: usize) {
        self.remaining[mover] += CLOCK_INCREMENT;
        self.active = next;
    }

    /// aim the countdown without crediting anyone, e.g. after joining
    /// a session mid-game from the remote record
    pub fn set_active(&mut self, player: usize) {
        self.active = player;
    }

    /// whose flag fell, if any; the other player wins on time
    pub fn timed_out(&self) -> Option<usize> {
        self.remaining.iter().position(|r| r.is_zero())
    }

    /// modal open, lobby wait, game over: stop all decrementing
    pub fn pause(&mut self) {
        self.running = false;
    }
    pub fn resume(&mut self) {
        self.running = true;
    }
}
