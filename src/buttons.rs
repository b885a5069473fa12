//! The three fire buttons, sampled once per loop pass with debouncing.
//!
//! Left fires red, B fires green, A fires blue.

use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    ButtonResources,
    config::BUTTON_COUNT,
};

/// Consecutive identical samples before a level change is accepted.
/// At the 5 ms loop period this is 20 ms.
const DEBOUNCE_SAMPLES: u8 = 4;

/// Fire buttons in colour order (red, green, blue). Active low.
pub struct Buttons {
    pins: [Input<'static>; BUTTON_COUNT],
    stable: [bool; BUTTON_COUNT],
    streak: [u8; BUTTON_COUNT],
}

impl From<ButtonResources<'static>> for Buttons {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            pins: [
                Input::new(res.left, pull_up),
                Input::new(res.b, pull_up),
                Input::new(res.a, pull_up),
            ],
            stable: [false; BUTTON_COUNT],
            streak: [0; BUTTON_COUNT],
        }
    }
}

impl Buttons {
    /// Samples every pin and returns the debounced pressed state.
    pub fn sample(&mut self) -> [bool; BUTTON_COUNT] {
        for ((pin, stable), streak) in self
            .pins
            .iter()
            .zip(self.stable.iter_mut())
            .zip(self.streak.iter_mut())
        {
            let pressed = pin.is_low();
            if pressed == *stable {
                *streak = 0;
                continue;
            }
            *streak += 1;
            if *streak >= DEBOUNCE_SAMPLES {
                *stable = pressed;
                *streak = 0;
            }
        }
        self.stable
    }
}
