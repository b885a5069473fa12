//! High score in non-volatile memory.

use crate::devices::ScoreSlot;

/// Erased flash / never-written slot.
const UNINITIALISED: [u8; 4] = [0xFF; 4];

/// Reads and writes the high score as a little-endian `u32`.
pub struct HighScoreStore<'a, S> {
    slot: &'a mut S,
}

impl<'a, S: ScoreSlot> HighScoreStore<'a, S> {
    pub fn new(slot: &'a mut S) -> Self {
        Self { slot }
    }

    /// Stored high score; 0 if the slot is blank or unreadable.
    pub fn load(&mut self) -> u32 {
        match self.slot.read() {
            Ok(UNINITIALISED) => 0,
            Ok(bytes) => u32::from_le_bytes(bytes),
            Err(_) => {
                error!("High score slot unreadable, starting from 0");
                0
            }
        }
    }

    pub fn save(&mut self, high_score: u32) {
        if self.slot.write(high_score.to_le_bytes()).is_err() {
            error!("Failed to persist high score {}", high_score);
        }
    }
}
