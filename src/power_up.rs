//! Time-boxed power-ups.
//!
//! Slow motion and mono-colour are plain deadlines: an effect is active while
//! `now` is before its deadline, nothing has to fire when it runs out.

use embassy_time::{
    Duration,
    Instant,
};
use rand::Rng;

use crate::{
    config::GameConfig,
    shots::Shot,
    strip::{
        BlockColor,
        Strip,
    },
};

/// A power-up that has just been unlocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerUp {
    /// Gravity runs at `slow_factor` of its period.
    Slow,
    /// Every block, shot and spawn takes this colour.
    Mono(BlockColor),
    /// One extra rocket charge.
    Rocket,
}

impl PowerUp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Mono(_) => "mono",
            Self::Rocket => "rocket",
        }
    }

    /// Uniform pick among the three kinds.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        match rng.gen_range(0..3u8) {
            0 => Self::Slow,
            1 => Self::Mono(BlockColor::random(rng)),
            _ => Self::Rocket,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerUps {
    slow_until: Instant,
    mono_until: Instant,
    mono_color: Option<BlockColor>,
    rocket_charges: u32,
}

impl Default for PowerUps {
    fn default() -> Self {
        Self {
            slow_until: Instant::from_ticks(0),
            mono_until: Instant::from_ticks(0),
            mono_color: None,
            rocket_charges: 0,
        }
    }
}

impl PowerUps {
    pub fn slow_active(&self, now: Instant) -> bool {
        now < self.slow_until
    }

    /// The forced colour while mono-colour is active.
    pub fn mono_color(&self, now: Instant) -> Option<BlockColor> {
        if now < self.mono_until {
            self.mono_color
        } else {
            None
        }
    }

    pub const fn rocket_charges(&self) -> u32 {
        self.rocket_charges
    }

    /// Spends one rocket charge if there is one.
    pub fn take_rocket(&mut self) -> bool {
        if self.rocket_charges == 0 {
            return false;
        }
        self.rocket_charges -= 1;
        true
    }

    /// Effective gravity period; slow motion stretches it without touching
    /// the stored step time.
    pub fn gravity_period(&self, step_time: Duration, now: Instant, config: &GameConfig) -> Duration {
        if self.slow_active(now) {
            let (num, den) = config.slow_factor;
            step_time * num / den.max(1)
        } else {
            step_time
        }
    }

    pub fn activate_slow(&mut self, now: Instant, duration: Duration) {
        self.slow_until = now + duration;
    }

    pub fn activate_mono(&mut self, now: Instant, duration: Duration, color: BlockColor) {
        self.mono_until = now + duration;
        self.mono_color = Some(color);
    }

    /// Picks a random power-up and applies it.
    pub fn unlock_random<R: Rng>(
        &mut self,
        now: Instant,
        config: &GameConfig,
        rng: &mut R,
        strip: &mut Strip,
        shots: &mut [Shot],
    ) -> PowerUp {
        let power_up = PowerUp::random(rng);
        self.apply(power_up, now, config, strip, shots);
        power_up
    }

    /// Applies `power_up`. Mono-colour repaints the strip and every live shot
    /// immediately.
    pub fn apply(
        &mut self,
        power_up: PowerUp,
        now: Instant,
        config: &GameConfig,
        strip: &mut Strip,
        shots: &mut [Shot],
    ) {
        match power_up {
            PowerUp::Slow => {
                self.activate_slow(now, config.slow_duration);
                info!("Power-up: slow time until {} ms", self.slow_until.as_millis());
            }
            PowerUp::Mono(color) => {
                self.activate_mono(now, config.mono_duration, color);
                strip.recolor_all(color);
                for shot in shots.iter_mut() {
                    shot.color = color;
                }
                info!(
                    "Power-up: mono {} until {} ms",
                    color.name(),
                    self.mono_until.as_millis()
                );
            }
            PowerUp::Rocket => {
                self.rocket_charges += 1;
                info!("Power-up: rocket charges {}", self.rocket_charges);
            }
        }
    }
}
