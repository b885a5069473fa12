//! Piezo buzzer on an LEDC PWM channel.
//!
//! The pitch is the frequency of low-speed timer 0; a 50 % duty cycle gives a
//! square wave, 0 % silences it.

use esp_hal::{
    gpio::DriveMode,
    ledc::{
        LSGlobalClkSource,
        Ledc,
        LowSpeed,
        channel::{
            self,
            ChannelIFace as _,
        },
        timer::{
            self,
            TimerIFace as _,
        },
    },
    time::Rate,
};

use crate::{
    BuzzerResources,
    devices::{
        AudioOutput,
        Waveform,
    },
    mk_static,
};

const SQUARE_DUTY_PCT: u8 = 50;
const IDLE_FREQ_HZ: u32 = 1_000;

#[derive(Debug, defmt::Format)]
pub enum BuzzerError {
    Timer,
    Channel,
}

/// Timer settings for `freq_hz`. 10-bit resolution keeps the APB divider in
/// range from ~80 Hz up to several kHz.
fn timer_config(freq_hz: u32) -> timer::config::Config {
    timer::config::Config {
        duty: timer::config::Duty::Duty10Bit,
        clock_source: timer::LSClockSource::APBClk,
        frequency: Rate::from_hz(freq_hz),
    }
}

pub struct Buzzer {
    ledc: &'static Ledc<'static>,
    channel: channel::Channel<'static, LowSpeed>,
    playing: bool,
}

impl TryFrom<BuzzerResources<'static>> for Buzzer {
    type Error = BuzzerError;

    fn try_from(res: BuzzerResources<'static>) -> Result<Self, Self::Error> {
        let mut ledc = Ledc::new(res.ledc);
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
        let ledc = mk_static!(Ledc<'static>, ledc);

        let timer = mk_static!(
            timer::Timer<'static, LowSpeed>,
            ledc.timer::<LowSpeed>(timer::Number::Timer0)
        );
        timer
            .configure(timer_config(IDLE_FREQ_HZ))
            .map_err(|_| BuzzerError::Timer)?;
        let timer: &'static timer::Timer<'static, LowSpeed> = timer;

        let mut channel = ledc.channel(channel::Number::Channel0, res.pin);
        channel
            .configure(channel::config::Config {
                timer,
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .map_err(|_| BuzzerError::Channel)?;

        Ok(Self {
            ledc,
            channel,
            playing: false,
        })
    }
}

impl Buzzer {
    /// Retunes hardware timer 0 through a fresh handle; the channel stays
    /// bound to it.
    fn retune(&self, freq_hz: u32) -> Result<(), BuzzerError> {
        let mut timer = self.ledc.timer::<LowSpeed>(timer::Number::Timer0);
        timer
            .configure(timer_config(freq_hz))
            .map_err(|_| BuzzerError::Timer)
    }
}

impl AudioOutput for Buzzer {
    fn play_tone(&mut self, freq_hz: u32, waveform: Waveform) {
        let duty = match waveform {
            Waveform::Square => SQUARE_DUTY_PCT,
        };
        let result = self.retune(freq_hz).and_then(|()| {
            self.channel
                .set_duty(duty)
                .map_err(|_| BuzzerError::Channel)
        });
        match result {
            Ok(()) => self.playing = true,
            Err(BuzzerError::Timer) => error!("Buzzer timer rejected {} Hz", freq_hz),
            Err(BuzzerError::Channel) => error!("Buzzer channel refused duty at {} Hz", freq_hz),
        }
    }

    fn stop(&mut self) {
        if !self.playing {
            return;
        }
        if self.channel.set_duty(0).is_err() {
            error!("Buzzer channel refused duty 0");
        }
        self.playing = false;
    }
}
