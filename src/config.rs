//! Game tuning and fixed geometry.

use embassy_time::Duration;

/// Number of cells on the LED strip. Index 0 is the bottom (danger zone),
/// index `STRIP_LEN - 1` is the top where new blocks spawn.
pub const STRIP_LEN: usize = 60;

/// Number of colour buttons (red, green, blue).
pub const BUTTON_COUNT: usize = 3;

/// Capacity of the in-flight shot list.
pub const MAX_SHOTS: usize = 32;

/// Idle time the firmware loop sleeps between ticks.
pub const LOOP_PERIOD: Duration = Duration::from_millis(5);

/// Gameplay tuning. `Default` matches the shipped firmware.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Gravity period at level 1.
    pub initial_step_time: Duration,
    /// Gravity never gets faster than this.
    pub min_step_time: Duration,
    /// Gravity speed-up applied on each level-up.
    pub level_step_decrement: Duration,
    /// Gravity speed-up applied on a wrong-colour hit.
    pub miss_step_penalty: Duration,
    /// Period of the shot movement tick.
    pub shot_step_time: Duration,
    /// Gravity multiplier while slow motion is active, as `num / den`.
    pub slow_factor: (u32, u32),
    pub slow_duration: Duration,
    pub mono_duration: Duration,
    /// Probability that a spawn produces a block rather than a gap.
    pub fill_probability: f64,
    /// Chain length that unlocks a random power-up.
    pub chain_unlock_threshold: usize,
    /// Blocks to clear per level.
    pub speedup_interval: u32,
    pub starting_lives: u8,
    /// LED brightness, 0..=100.
    pub brightness_percent: u8,
    pub flash_repetitions: u8,
    pub flash_hold: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_step_time: Duration::from_millis(1500),
            min_step_time: Duration::from_millis(50),
            level_step_decrement: Duration::from_millis(100),
            miss_step_penalty: Duration::from_millis(20),
            shot_step_time: Duration::from_millis(10),
            slow_factor: (3, 2),
            slow_duration: Duration::from_secs(5),
            mono_duration: Duration::from_secs(8),
            fill_probability: 0.85,
            chain_unlock_threshold: 3,
            speedup_interval: 10,
            starting_lives: 3,
            brightness_percent: 40,
            flash_repetitions: 3,
            flash_hold: Duration::from_millis(200),
        }
    }
}
