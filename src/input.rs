//! Press detection on top of the debounced button levels.

use crate::config::BUTTON_COUNT;

/// Remembers the previous sample so a held button fires only once.
#[derive(Clone, Debug, Default)]
pub struct ButtonEdges {
    previous: [bool; BUTTON_COUNT],
}

impl ButtonEdges {
    pub const fn new() -> Self {
        Self {
            previous: [false; BUTTON_COUNT],
        }
    }

    /// Feeds one sample (`true` = pressed) and returns the button that went
    /// down since the last sample. With several new presses in the same
    /// sample the highest index wins.
    pub fn update(&mut self, current: [bool; BUTTON_COUNT]) -> Option<usize> {
        let pressed = (0..BUTTON_COUNT)
            .rev()
            .find(|&i| current[i] && !self.previous[i]);
        self.previous = current;
        pressed
    }
}
