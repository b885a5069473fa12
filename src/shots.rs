//! Shots in flight.
//!
//! Shots start at the floor and climb one cell per shot tick. The first block
//! a shot reaches decides its fate: same colour clears the chain, a different
//! colour costs a life.

use embassy_time::Instant;
use heapless::Vec;
use rand::Rng;

use crate::{
    config::{
        GameConfig,
        MAX_SHOTS,
        STRIP_LEN,
    },
    power_up::{
        PowerUp,
        PowerUps,
    },
    session::{
        Progress,
        Timing,
    },
    strip::{
        BlockColor,
        Strip,
    },
};

/// Most events reported from one shot tick; later events are dropped from
/// the report (their state changes still apply). Running out of lives is
/// carried outside the report and is never dropped.
pub const MAX_SHOT_EVENTS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Shot {
    pub color: BlockColor,
    pub position: usize,
}

impl Shot {
    pub const fn new(color: BlockColor, position: usize) -> Self {
        Self { color, position }
    }
}

/// What happened during one shot tick, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShotEvent {
    Hit {
        cleared: usize,
        points: u32,
        rocket: bool,
    },
    PowerUp(PowerUp),
    LevelUp {
        level: u32,
    },
    Miss {
        lives: u8,
    },
}

pub type ShotEvents = Vec<ShotEvent, MAX_SHOT_EVENTS>;

/// Result of one shot tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShotOutcome {
    /// Feedback for the player, in order.
    pub events: ShotEvents,
    /// The last life is gone; no further shots were evaluated this tick.
    pub lives_exhausted: bool,
}

/// State a shot tick reads and mutates besides the shots themselves.
pub struct ShotContext<'a, R> {
    pub strip: &'a mut Strip,
    pub progress: &'a mut Progress,
    pub timing: &'a mut Timing,
    pub power_ups: &'a mut PowerUps,
    pub rng: &'a mut R,
    pub config: &'a GameConfig,
    pub now: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct ShotTracker {
    shots: Vec<Shot, MAX_SHOTS>,
}

impl ShotTracker {
    pub const fn new() -> Self {
        Self { shots: Vec::new() }
    }

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn shots_mut(&mut self) -> &mut [Shot] {
        &mut self.shots
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn clear(&mut self) {
        self.shots.clear();
    }

    /// Launches a shot from the floor. Returns `false` when the list is full.
    pub fn fire(&mut self, color: BlockColor) -> bool {
        if self.shots.push(Shot::new(color, 0)).is_err() {
            warn!("Shot dropped, {} already in flight", MAX_SHOTS);
            return false;
        }
        true
    }

    /// Moves every shot up one cell and resolves collisions.
    pub fn advance_and_resolve<R: Rng>(&mut self, ctx: ShotContext<'_, R>) -> ShotOutcome {
        let ShotContext {
            strip,
            progress,
            timing,
            power_ups,
            rng,
            config,
            now,
        } = ctx;
        let mut outcome = ShotOutcome::default();
        let events = &mut outcome.events;

        let mut i = 0;
        while i < self.shots.len() {
            self.shots[i].position += 1;
            let Shot { color, position } = self.shots[i];

            if position >= STRIP_LEN {
                self.shots.remove(i);
                continue;
            }
            let Some(block) = strip.get(position).color() else {
                i += 1;
                continue;
            };

            // Consumed whether it hits or misses.
            self.shots.remove(i);

            if block == color {
                let rocket = power_ups.take_rocket();
                let cleared = if rocket {
                    strip.clear_chain_rocket(position)
                } else {
                    strip.clear_chain_at(position)
                };
                let points = cleared as u32 * progress.level;
                progress.score += points;
                progress.blocks_cleared_total += cleared as u32;
                info!(
                    "Hit: chain {} level {} points +{} score {} blocks {}",
                    cleared,
                    progress.level,
                    points,
                    progress.score,
                    progress.blocks_cleared_total
                );
                if rocket {
                    info!("Rocket fired, {} charges left", power_ups.rocket_charges());
                }
                record(events, ShotEvent::Hit {
                    cleared,
                    points,
                    rocket,
                });

                if cleared >= config.chain_unlock_threshold || strip.is_empty() {
                    let power_up =
                        power_ups.unlock_random(now, config, rng, strip, &mut self.shots);
                    record(events, ShotEvent::PowerUp(power_up));
                }

                if progress.blocks_cleared_total >= progress.next_level_threshold
                    && timing.step_time > timing.min_step_time
                {
                    progress.level += 1;
                    timing.speed_up(config.level_step_decrement);
                    progress.next_level_threshold += config.speedup_interval;
                    info!(
                        "Level up: {} step {} ms next at {} blocks",
                        progress.level,
                        timing.step_time.as_millis(),
                        progress.next_level_threshold
                    );
                    record(events, ShotEvent::LevelUp {
                        level: progress.level,
                    });
                }
            } else {
                progress.lives = progress.lives.saturating_sub(1);
                timing.speed_up(config.miss_step_penalty);
                info!(
                    "Wrong colour: lives {} step {} ms",
                    progress.lives,
                    timing.step_time.as_millis()
                );
                record(events, ShotEvent::Miss {
                    lives: progress.lives,
                });

                if progress.lives == 0 {
                    outcome.lives_exhausted = true;
                    return outcome;
                }
            }
        }

        outcome
    }
}

fn record(events: &mut ShotEvents, event: ShotEvent) {
    if events.push(event).is_err() {
        debug!("Shot event report full");
    }
}
