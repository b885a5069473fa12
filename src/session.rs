//! Per-run game state, owned by the controller and lent out to the
//! simulation pieces one call at a time.

use embassy_time::{
    Duration,
    Instant,
};

use crate::{
    config::GameConfig,
    power_up::PowerUps,
    shots::ShotTracker,
    strip::Strip,
};

/// Score, lives and level progression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    /// Final score of the previous run, shown on the game-over screen.
    pub last_score: u32,
    pub high_score: u32,
    pub level: u32,
    pub lives: u8,
    pub blocks_cleared_total: u32,
    pub next_level_threshold: u32,
}

impl Progress {
    pub const fn new(config: &GameConfig, high_score: u32, last_score: u32) -> Self {
        Self {
            score: 0,
            last_score,
            high_score,
            level: 1,
            lives: config.starting_lives,
            blocks_cleared_total: 0,
            next_level_threshold: config.speedup_interval,
        }
    }
}

/// Gravity and shot clocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Current gravity period, never below `min_step_time`.
    pub step_time: Duration,
    pub min_step_time: Duration,
    pub shot_step_time: Duration,
    pub last_step: Instant,
    pub last_shot_step: Instant,
}

impl Timing {
    pub fn new(config: &GameConfig, now: Instant) -> Self {
        Self {
            step_time: config.initial_step_time.max(config.min_step_time),
            min_step_time: config.min_step_time,
            shot_step_time: config.shot_step_time,
            last_step: now,
            last_shot_step: now,
        }
    }

    /// Shortens the gravity period by `by`, clamped at the floor.
    pub fn speed_up(&mut self, by: Duration) {
        self.step_time = self
            .step_time
            .checked_sub(by)
            .unwrap_or(self.min_step_time)
            .max(self.min_step_time);
    }

    /// Claims the shot tick if its period has elapsed.
    pub fn take_shot_tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_shot_step) >= self.shot_step_time {
            self.last_shot_step = now;
            true
        } else {
            false
        }
    }

    /// Claims the gravity tick if `period` has elapsed.
    pub fn take_gravity_tick(&mut self, now: Instant, period: Duration) -> bool {
        if now.saturating_duration_since(self.last_step) >= period {
            self.last_step = now;
            true
        } else {
            false
        }
    }
}

/// Everything a single run mutates.
#[derive(Clone, Debug)]
pub struct Session {
    pub strip: Strip,
    pub shots: ShotTracker,
    pub progress: Progress,
    pub timing: Timing,
    pub power_ups: PowerUps,
}

impl Session {
    pub fn new(config: &GameConfig, now: Instant, high_score: u32, last_score: u32) -> Self {
        Self {
            strip: Strip::new(),
            shots: ShotTracker::new(),
            progress: Progress::new(config, high_score, last_score),
            timing: Timing::new(config, now),
            power_ups: PowerUps::default(),
        }
    }

    /// Fresh run state. High score and last score survive.
    pub fn reset(&mut self, config: &GameConfig, now: Instant) {
        *self = Self::new(
            config,
            now,
            self.progress.high_score,
            self.progress.last_score,
        );
    }
}
