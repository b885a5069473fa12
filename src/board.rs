//! The badge as a [`Board`] for the game controller.

use esp_hal::delay::Delay;

use crate::{
    Resources,
    buttons::Buttons,
    buzzer::{
        Buzzer,
        BuzzerError,
    },
    config::BUTTON_COUNT,
    devices::Board,
    display::{
        DisplayError,
        Hud,
    },
    flash::FlashSlot,
    leds::StripLeds,
};

#[derive(Debug, defmt::Format)]
pub enum BoardError {
    Strip(esp_hal::rmt::Error),
    Display(DisplayError),
    Buzzer(BuzzerError),
}

pub struct BadgeBoard {
    leds: StripLeds<'static>,
    hud: Hud,
    buzzer: Buzzer,
    slot: FlashSlot,
    buttons: Buttons,
    delay: Delay,
}

impl BadgeBoard {
    pub fn new(resources: Resources<'static>) -> Result<Self, BoardError> {
        Ok(Self {
            leds: StripLeds::try_from(resources.strip).map_err(BoardError::Strip)?,
            hud: Hud::new(resources.display, resources.backlight).map_err(BoardError::Display)?,
            buzzer: Buzzer::try_from(resources.buzzer).map_err(BoardError::Buzzer)?,
            slot: resources.flash.into(),
            buttons: resources.buttons.into(),
            delay: Delay::new(),
        })
    }
}

impl Board for BadgeBoard {
    type Leds = StripLeds<'static>;
    type Display = Hud;
    type Audio = Buzzer;
    type Slot = FlashSlot;
    type Delay = Delay;

    fn leds(&mut self) -> &mut Self::Leds {
        &mut self.leds
    }

    fn display(&mut self) -> &mut Self::Display {
        &mut self.hud
    }

    fn audio(&mut self) -> &mut Self::Audio {
        &mut self.buzzer
    }

    fn slot(&mut self) -> &mut Self::Slot {
        &mut self.slot
    }

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }

    fn buttons(&mut self) -> [bool; BUTTON_COUNT] {
        self.buttons.sample()
    }
}
