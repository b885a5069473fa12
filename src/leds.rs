//! WS2812 addressable LED strip driver using the RMT peripheral.
//!
//! Index 0 is the LED nearest the player (the floor).

extern crate alloc;

use embedded_hal::delay::DelayNs as _;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::Level,
    rmt::{
        PulseCode,
        Tx,
    },
};
use palette::Srgb;

use crate::{
    StripResources,
    config::STRIP_LEN,
    devices::LedStrip,
    presentation::{
        BLACK,
        Frame,
    },
};

/// WS2812 latch time after the last bit.
const RESET_MICROS: u32 = 50;

/// WS2812 strip driver.
///
/// Keeps an in-memory framebuffer that is pushed to the hardware with
/// [`flush`](LedStrip::flush).
pub struct StripLeds<'a> {
    channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
    framebuffer: [Srgb<u8>; STRIP_LEN],
    delay: Delay,
}

impl<'a> StripLeds<'a> {
    pub const fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            framebuffer: [BLACK; STRIP_LEN],
            delay: Delay::new(),
        }
    }

    /// WS2812 bit timing at 40 MHz RMT clock.
    const fn bit_to_pulse(bit: bool) -> PulseCode {
        if bit {
            // '1': 0.8 µs high (32 ticks), 0.45 µs low (18 ticks)
            PulseCode::new(Level::High, 32, Level::Low, 18)
        } else {
            // '0': 0.4 µs high (16 ticks), 0.85 µs low (34 ticks)
            PulseCode::new(Level::High, 16, Level::Low, 34)
        }
    }

    fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
        let mut pulses = [PulseCode::default(); 8];
        for (i, pulse) in pulses.iter_mut().enumerate() {
            *pulse = Self::bit_to_pulse((byte >> (7 - i)) & 1 != 0);
        }
        pulses
    }
}

impl<'a> TryFrom<StripResources<'a>> for StripLeds<'a> {
    type Error = esp_hal::rmt::Error;

    fn try_from(res: StripResources<'a>) -> Result<Self, Self::Error> {
        Ok(Self::new(res.try_into()?))
    }
}

impl LedStrip for StripLeds<'_> {
    fn write_frame(&mut self, frame: &Frame) {
        self.framebuffer.copy_from_slice(frame.pixels());
    }

    fn flush(&mut self) {
        let Some(channel) = self.channel.take() else {
            error!("RMT channel lost during previous transmission");
            return;
        };

        let pulses = self
            .framebuffer
            .iter()
            .flat_map(|c| {
                // WS2812 expects GRB byte order
                [
                    Self::byte_to_pulses(c.green),
                    Self::byte_to_pulses(c.red),
                    Self::byte_to_pulses(c.blue),
                ]
                .into_iter()
                .flatten()
            })
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(_) => {
                error!("RMT transmit failed");
                return;
            }
        };

        self.channel = Some(match transaction.wait() {
            Ok(ch) => ch,
            Err((_, ch)) => {
                error!("RMT transaction failed");
                ch
            }
        });

        self.delay.delay_us(RESET_MICROS);
    }
}
