//! Contracts between the game core and the hardware.
//!
//! The core never talks to a peripheral directly. Everything it drives goes
//! through these traits, implemented by the badge adapters in firmware builds
//! and by recording mocks in tests.

use embedded_hal::delay::DelayNs;

use crate::{
    config::BUTTON_COUNT,
    presentation::Frame,
};

/// Shape of the generated tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Waveform {
    /// 50 % duty square wave.
    Square,
}

/// Addressable LED strip.
pub trait LedStrip {
    /// Replaces the whole pending frame.
    fn write_frame(&mut self, frame: &Frame);

    /// Pushes the pending frame out to the LEDs.
    fn flush(&mut self);
}

/// Two-region text display.
pub trait TextDisplay {
    /// Multi-line HUD text.
    fn set_status(&mut self, text: &str);

    /// Transient effect text, drawn with its left edge at `x` pixels.
    /// An empty string hides the overlay.
    fn set_overlay(&mut self, text: &str, x: i32);

    /// Draws whatever changed since the last redraw.
    fn redraw(&mut self);

    /// Usable width in pixels.
    fn width(&self) -> i32;

    /// Width of one overlay glyph in pixels.
    fn overlay_char_width(&self) -> i32;
}

/// Single-voice tone generator.
pub trait AudioOutput {
    /// Starts (or retunes to) a tone; any previous tone is replaced.
    fn play_tone(&mut self, freq_hz: u32, waveform: Waveform);

    /// Silences the output. Calling it while already silent is a no-op.
    fn stop(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotError {
    Read,
    Write,
}

/// Four bytes of non-volatile memory.
pub trait ScoreSlot {
    fn read(&mut self) -> Result<[u8; 4], SlotError>;
    fn write(&mut self, bytes: [u8; 4]) -> Result<(), SlotError>;
}

/// Everything the controller drives, bundled so one type parameter covers
/// the whole board.
pub trait Board {
    type Leds: LedStrip;
    type Display: TextDisplay;
    type Audio: AudioOutput;
    type Slot: ScoreSlot;
    type Delay: DelayNs;

    fn leds(&mut self) -> &mut Self::Leds;
    fn display(&mut self) -> &mut Self::Display;
    fn audio(&mut self) -> &mut Self::Audio;
    fn slot(&mut self) -> &mut Self::Slot;
    fn delay(&mut self) -> &mut Self::Delay;

    /// Current pressed state of each colour button (already debounced).
    fn buttons(&mut self) -> [bool; BUTTON_COUNT];
}
