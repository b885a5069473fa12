//! Top-level state machine.
//!
//! [`GameController`] owns the board and all game state. The firmware calls
//! [`GameController::step`] once per loop pass; every call does a bounded
//! amount of work, and the shot and gravity actions run only when their own
//! period has elapsed.

use embassy_time::{
    Duration,
    Instant,
};
use embedded_hal::delay::DelayNs as _;
use rand::Rng;

use crate::{
    config::GameConfig,
    devices::Board,
    input::ButtonEdges,
    persistence::HighScoreStore,
    power_up::PowerUp,
    presentation::{
        BLACK,
        Frame,
        Presenter,
        base_color,
        dim,
        render_strip,
        status_text,
    },
    session::Session,
    shots::{
        ShotContext,
        ShotEvent,
    },
    sound::{
        self,
        SoundSequencer,
        Tone,
    },
    strip::{
        BlockColor,
        Strip,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameState {
    /// Power-on title screen.
    Start,
    Running,
    /// Waiting for a press after a lost run.
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameOverReason {
    FloorReached,
    NoLivesRemaining,
}

impl GameOverReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::FloorReached => "block reached the floor",
            Self::NoLivesRemaining => "no lives remaining",
        }
    }
}

/// Short-lived text over the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectOverlay {
    text: Option<&'static str>,
    expires_at: Instant,
}

impl Default for EffectOverlay {
    fn default() -> Self {
        Self {
            text: None,
            expires_at: Instant::from_ticks(0),
        }
    }
}

impl EffectOverlay {
    pub fn show(&mut self, text: &'static str, duration: Duration, now: Instant) {
        self.text = Some(text);
        self.expires_at = now + duration;
    }

    /// Clears the text once `now` is past its deadline. Returns `true` if it
    /// was cleared by this call.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.text.is_some() && now > self.expires_at {
            self.text = None;
            return true;
        }
        false
    }

    pub const fn text(&self) -> Option<&'static str> {
        self.text
    }
}

pub struct GameController<B, R> {
    board: B,
    rng: R,
    config: GameConfig,
    state: GameState,
    session: Session,
    sound: SoundSequencer,
    overlay: EffectOverlay,
    edges: ButtonEdges,
    presenter: Presenter,
    leds_dirty: bool,
}

impl<B: Board, R: Rng> GameController<B, R> {
    /// Loads the persisted high score and sits on the start screen.
    pub fn new(mut board: B, rng: R, config: GameConfig, now: Instant) -> Self {
        let high_score = HighScoreStore::new(board.slot()).load();
        info!("High score: {}", high_score);

        Self {
            board,
            rng,
            session: Session::new(&config, now, high_score, 0),
            config,
            state: GameState::Start,
            sound: SoundSequencer::new(),
            overlay: EffectOverlay::default(),
            edges: ButtonEdges::new(),
            presenter: Presenter::new(),
            leds_dirty: true,
        }
    }

    pub const fn state(&self) -> GameState {
        self.state
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        self.leds_dirty = true;
        &mut self.session
    }

    pub const fn overlay(&self) -> &EffectOverlay {
        &self.overlay
    }

    pub const fn sound(&self) -> &SoundSequencer {
        &self.sound
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub const fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// One pass of the main loop: timed actions, input, output.
    pub fn step(&mut self, now: Instant) {
        self.tick(now);

        let buttons = self.board.buttons();
        if let Some(button) = self.edges.update(buttons) {
            self.on_button_press(button, now);
        }

        self.render();
    }

    /// Sound, overlay expiry and the two gated simulation clocks.
    pub fn tick(&mut self, now: Instant) {
        self.sound.poll(now, self.board.audio());
        self.overlay.expire(now);

        if self.state != GameState::Running {
            return;
        }

        if self.session.timing.take_shot_tick(now) {
            let Session {
                strip,
                shots,
                progress,
                timing,
                power_ups,
            } = &mut self.session;
            let outcome = shots.advance_and_resolve(ShotContext {
                strip,
                progress,
                timing,
                power_ups,
                rng: &mut self.rng,
                config: &self.config,
                now,
            });
            self.leds_dirty = true;

            self.handle_shot_events(&outcome.events, now);
            if outcome.lives_exhausted {
                self.on_life_exhausted(GameOverReason::NoLivesRemaining, now);
                return;
            }
        }

        let period = self.session.power_ups.gravity_period(
            self.session.timing.step_time,
            now,
            &self.config,
        );
        if self.session.timing.take_gravity_tick(now, period) {
            let Session {
                strip, power_ups, ..
            } = &mut self.session;
            let fill = self.config.fill_probability;
            let rng = &mut self.rng;
            strip.shift_down(|| Strip::spawn_color(now, power_ups, fill, rng));
            self.leds_dirty = true;

            if strip.floor_reached() {
                self.on_floor_reached(now);
            }
        }
    }

    /// Any press starts a run from the start / game-over screens; during a run
    /// it fires a shot of the button's colour (or the mono colour).
    pub fn on_button_press(&mut self, button: usize, now: Instant) {
        match self.state {
            GameState::Start | GameState::GameOver => self.start_new_game(now),
            GameState::Running => {
                let Some(mut color) = BlockColor::from_index(button) else {
                    warn!("Ignoring unknown button {}", button);
                    return;
                };
                if let Some(mono) = self.session.power_ups.mono_color(now) {
                    color = mono;
                }
                if self.session.shots.fire(color) {
                    info!(
                        "Shot: {} ({} in flight)",
                        color.name(),
                        self.session.shots.len()
                    );
                    self.sound.start(sound::SHOT);
                    self.leds_dirty = true;
                }
            }
        }
    }

    pub fn on_floor_reached(&mut self, now: Instant) {
        self.game_over(GameOverReason::FloorReached, now);
    }

    pub fn on_life_exhausted(&mut self, reason: GameOverReason, now: Instant) {
        self.game_over(reason, now);
    }

    fn start_new_game(&mut self, now: Instant) {
        self.session.reset(&self.config, now);
        self.session.progress.last_score = 0;
        self.state = GameState::Running;
        self.leds_dirty = true;
        self.notify("READY!", Duration::from_millis(700), sound::START_JINGLE, now);
        info!("New game, high score {}", self.session.progress.high_score);
    }

    /// Maps shot events to overlay text and sound.
    fn handle_shot_events(&mut self, events: &[ShotEvent], now: Instant) {
        for event in events {
            match *event {
                ShotEvent::Hit { rocket: true, .. } => {
                    self.notify("ROCKET!", Duration::from_millis(500), sound::ROCKET, now);
                }
                ShotEvent::Hit { rocket: false, .. } => {
                    self.notify("HIT!", Duration::from_millis(200), sound::HIT, now);
                }
                ShotEvent::PowerUp(power_up) => {
                    let text = match power_up {
                        PowerUp::Slow => "SLOW TIME!",
                        PowerUp::Mono(_) => "MONO COLOR!",
                        PowerUp::Rocket => "ROCKET +1",
                    };
                    self.notify(text, Duration::from_secs(1), sound::POWER_UP, now);
                }
                ShotEvent::LevelUp { .. } => {
                    self.notify("LEVEL UP!", Duration::from_secs(1), sound::LEVEL_UP, now);
                }
                ShotEvent::Miss { .. } => {
                    self.notify("MISS!", Duration::from_millis(300), sound::WRONG, now);
                }
            }
        }
    }

    fn notify(&mut self, text: &'static str, duration: Duration, cue: &'static [Tone], now: Instant) {
        self.overlay.show(text, duration, now);
        self.sound.start(cue);
    }

    /// Records the score, plays the acknowledgement and parks on the
    /// game-over screen with a fresh session.
    fn game_over(&mut self, reason: GameOverReason, now: Instant) {
        let progress = &mut self.session.progress;
        let score = progress.score;
        info!("Game over: {}, final score {}", reason.describe(), score);

        progress.last_score = score;
        if score > progress.high_score {
            progress.high_score = score;
            HighScoreStore::new(self.board.slot()).save(score);
            self.overlay.show("NEW HIGHSCORE!", Duration::from_secs(2), now);
        } else {
            self.overlay.show("GAME OVER", Duration::from_millis(1500), now);
        }

        self.sound.start(sound::GAME_OVER);
        self.sound.poll(now, self.board.audio());
        self.render_text();
        self.flash_red();

        self.session.reset(&self.config, now);
        self.state = GameState::GameOver;
        self.leds_dirty = true;
    }

    /// Blocking red blink on the strip. The only wait in the whole loop.
    fn flash_red(&mut self) {
        let red = Frame::filled(dim(base_color(BlockColor::Red), self.config.brightness_percent));
        let blank = Frame::filled(BLACK);
        let hold_ms = u32::try_from(self.config.flash_hold.as_millis()).unwrap_or(u32::MAX);

        for _ in 0..self.config.flash_repetitions {
            self.presenter.show_frame(self.board.leds(), &red);
            self.board.delay().delay_ms(hold_ms);
            self.presenter.show_frame(self.board.leds(), &blank);
            self.board.delay().delay_ms(hold_ms);
        }
    }

    /// Pushes the LED frame (if the simulation changed) and the HUD text.
    pub fn render(&mut self) {
        if self.leds_dirty {
            let frame = render_strip(
                &self.session.strip,
                self.session.shots.shots(),
                self.config.brightness_percent,
            );
            self.presenter.show_frame(self.board.leds(), &frame);
            self.leds_dirty = false;
        }
        self.render_text();
    }

    fn render_text(&mut self) {
        let status = status_text(
            self.state,
            &self.session.progress,
            self.session.power_ups.rocket_charges(),
        );
        self.presenter
            .show_text(self.board.display(), &status, self.overlay.text());
    }
}
