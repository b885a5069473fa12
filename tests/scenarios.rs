//! End-to-end runs of the game controller against a recording mock board.

use embassy_time::{
    Duration,
    Instant,
};
use embedded_hal::delay::DelayNs;
use rand::{
    SeedableRng,
    rngs::{
        SmallRng,
        mock::StepRng,
    },
};
use strip_shooter::{
    AudioOutput,
    BUTTON_COUNT,
    BlockColor,
    Board,
    Cell,
    GameConfig,
    GameController,
    GameState,
    LedStrip,
    MAX_SHOTS,
    ScoreSlot,
    SlotError,
    Strip,
    TextDisplay,
    Waveform,
    power_up::PowerUp,
    presentation::{
        Frame,
        base_color,
        dim,
    },
    session::Session,
};

// ── Mock board ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockLeds {
    pending: Frame,
    flushed: Vec<Frame>,
}

impl LedStrip for MockLeds {
    fn write_frame(&mut self, frame: &Frame) {
        self.pending = *frame;
    }

    fn flush(&mut self) {
        self.flushed.push(self.pending);
    }
}

#[derive(Default)]
struct MockDisplay {
    status: String,
    overlay: String,
    overlay_x: i32,
    redraws: usize,
}

impl TextDisplay for MockDisplay {
    fn set_status(&mut self, text: &str) {
        self.status = text.to_owned();
    }

    fn set_overlay(&mut self, text: &str, x: i32) {
        self.overlay = text.to_owned();
        self.overlay_x = x;
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn width(&self) -> i32 {
        320
    }

    fn overlay_char_width(&self) -> i32 {
        10
    }
}

/// `Some(freq)` for a tone, `None` for stop.
#[derive(Default)]
struct MockAudio {
    log: Vec<Option<u32>>,
}

impl AudioOutput for MockAudio {
    fn play_tone(&mut self, freq_hz: u32, waveform: Waveform) {
        assert_eq!(waveform, Waveform::Square);
        self.log.push(Some(freq_hz));
    }

    fn stop(&mut self) {
        self.log.push(None);
    }
}

struct MockSlot {
    bytes: [u8; 4],
    writes: usize,
}

impl ScoreSlot for MockSlot {
    fn read(&mut self) -> Result<[u8; 4], SlotError> {
        Ok(self.bytes)
    }

    fn write(&mut self, bytes: [u8; 4]) -> Result<(), SlotError> {
        self.bytes = bytes;
        self.writes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct MockDelay {
    total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

struct MockBoard {
    leds: MockLeds,
    display: MockDisplay,
    audio: MockAudio,
    slot: MockSlot,
    delay: MockDelay,
    buttons: [bool; BUTTON_COUNT],
}

impl MockBoard {
    fn with_high_score(high_score: u32) -> Self {
        Self {
            leds: MockLeds::default(),
            display: MockDisplay::default(),
            audio: MockAudio::default(),
            slot: MockSlot {
                bytes: high_score.to_le_bytes(),
                writes: 0,
            },
            delay: MockDelay::default(),
            buttons: [false; BUTTON_COUNT],
        }
    }

    fn blank() -> Self {
        let mut board = Self::with_high_score(0);
        board.slot.bytes = [0xFF; 4];
        board
    }
}

impl Board for MockBoard {
    type Leds = MockLeds;
    type Display = MockDisplay;
    type Audio = MockAudio;
    type Slot = MockSlot;
    type Delay = MockDelay;

    fn leds(&mut self) -> &mut Self::Leds {
        &mut self.leds
    }

    fn display(&mut self) -> &mut Self::Display {
        &mut self.display
    }

    fn audio(&mut self) -> &mut Self::Audio {
        &mut self.audio
    }

    fn slot(&mut self) -> &mut Self::Slot {
        &mut self.slot
    }

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }

    fn buttons(&mut self) -> [bool; BUTTON_COUNT] {
        self.buttons
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

const RED: usize = 0;
const GREEN: usize = 1;
const BLUE: usize = 2;
const LOOP_MS: u64 = 5;

type Game<R> = GameController<MockBoard, R>;

fn at(millis: u64) -> Instant {
    Instant::from_millis(millis)
}

/// Drives the controller the way the firmware loop does.
struct Harness<R> {
    game: Game<R>,
    clock: u64,
}

impl<R: rand::Rng> Harness<R> {
    fn new(board: MockBoard, rng: R, config: GameConfig) -> Self {
        let clock = 1000;
        Self {
            game: GameController::new(board, rng, config, at(clock)),
            clock,
        }
    }

    fn step(&mut self) {
        self.clock += LOOP_MS;
        self.game.step(at(self.clock));
    }

    /// Press on one loop pass, release on the next. Returns the press time.
    fn press(&mut self, button: usize) -> u64 {
        self.game.board_mut().buttons[button] = true;
        self.step();
        let pressed_at = self.clock;
        self.game.board_mut().buttons[button] = false;
        self.step();
        pressed_at
    }

    fn run_until(&mut self, millis: u64) {
        while self.clock < millis {
            self.step();
        }
    }

    fn board(&self) -> &MockBoard {
        self.game.board()
    }

    fn session(&self) -> &Session {
        self.game.session()
    }

    /// Starts a run and replaces the strip with `bottom`.
    fn start_with(&mut self, bottom: &[Cell]) {
        self.press(RED);
        assert_eq!(self.game.state(), GameState::Running);
        self.game.session_mut().strip = Strip::from_bottom(bottom);
    }
}

fn seeded() -> Harness<SmallRng> {
    Harness::new(
        MockBoard::blank(),
        SmallRng::seed_from_u64(7),
        GameConfig::default(),
    )
}

/// Time at which a shot fired at `fired` reaches cell `index`.
fn arrival(fired: u64, index: u64) -> u64 {
    fired + index * GameConfig::default().shot_step_time.as_millis()
}

const E: Cell = Cell::Empty;
const R: Cell = Cell::Colored(BlockColor::Red);
const G: Cell = Cell::Colored(BlockColor::Green);
const B: Cell = Cell::Colored(BlockColor::Blue);

// ── Flow ────────────────────────────────────────────────────────────────────

#[test]
fn title_screen_shows_stored_high_score() {
    let mut h = Harness::new(
        MockBoard::with_high_score(1234),
        SmallRng::seed_from_u64(1),
        GameConfig::default(),
    );
    h.step();

    assert_eq!(h.game.state(), GameState::Start);
    assert_eq!(h.board().display.status, "Press any button\nto start\n\nHi: 1234");
    assert_eq!(h.session().progress.high_score, 1234);
}

#[test]
fn any_press_starts_a_run_with_ready_text_and_jingle() {
    let mut h = seeded();
    h.press(BLUE);

    assert_eq!(h.game.state(), GameState::Running);
    assert_eq!(h.game.overlay().text(), Some("READY!"));
    assert_eq!(h.board().display.overlay, "READY!");
    // 6 glyphs of 10 px centred on 320 px.
    assert_eq!(h.board().display.overlay_x, 130);
    assert_eq!(h.board().audio.log.first(), Some(&Some(523)));
    assert_eq!(h.board().display.status, "Score: 0\nLevel: 1\nLives: 3\nHi: 0");
}

#[test]
fn overlay_clears_only_after_its_deadline() {
    let mut h = seeded();
    let started = h.press(RED);

    h.run_until(started + 700);
    assert_eq!(h.board().display.overlay, "READY!");

    h.step();
    assert_eq!(h.game.overlay().text(), None);
    assert_eq!(h.board().display.overlay, "");
}

#[test]
fn held_button_fires_a_single_shot() {
    let mut h = seeded();
    h.start_with(&[]);

    h.game.board_mut().buttons[GREEN] = true;
    for _ in 0..4 {
        h.step();
    }

    assert_eq!(h.session().shots.len(), 1);
    assert_eq!(h.session().shots.shots()[0].color, BlockColor::Green);
}

#[test]
fn shots_beyond_capacity_are_dropped() {
    let mut h = seeded();
    h.start_with(&[]);

    for _ in 0..=MAX_SHOTS {
        h.press(RED);
    }

    assert_eq!(h.session().shots.len(), MAX_SHOTS);
}

#[test]
fn leds_show_blocks_and_shots() {
    let mut h = seeded();
    h.start_with(&[E, E, E, E, E, B]);
    h.press(GREEN);

    let frame = h.board().leds.flushed.last().copied().unwrap_or_default();
    let brightness = GameConfig::default().brightness_percent;
    assert_eq!(frame.get(5), Some(dim(base_color(BlockColor::Blue), brightness)));
    assert_eq!(frame.get(0), Some(dim(base_color(BlockColor::Green), brightness)));
}

// ── Collisions ──────────────────────────────────────────────────────────────

#[test]
fn matching_shot_clears_the_chain_and_scores() {
    let mut h = seeded();
    h.start_with(&[E, E, E, E, R, R, E, E, B]);

    let fired = h.press(RED);
    h.run_until(arrival(fired, 4));

    let progress = &h.session().progress;
    assert_eq!(progress.score, 2);
    assert_eq!(progress.blocks_cleared_total, 2);
    assert_eq!(h.session().strip.get(4), E);
    assert_eq!(h.session().strip.get(6), B);
    assert!(h.session().shots.is_empty());
    assert_eq!(h.game.overlay().text(), Some("HIT!"));

    h.step();
    assert_eq!(h.board().audio.log.last(), Some(&Some(1000)));
}

#[test]
fn wrong_colour_costs_a_life_and_speeds_up_gravity() {
    let mut h = seeded();
    h.start_with(&[E, E, E, B]);

    let fired = h.press(RED);
    h.run_until(arrival(fired, 3));

    assert_eq!(h.session().progress.lives, 2);
    assert_eq!(h.session().timing.step_time, Duration::from_millis(1480));
    assert_eq!(h.session().strip.get(3), B);
    assert_eq!(h.game.overlay().text(), Some("MISS!"));
}

#[test]
fn level_up_after_enough_blocks() {
    let config = GameConfig {
        speedup_interval: 2,
        ..GameConfig::default()
    };
    let mut h = Harness::new(MockBoard::blank(), SmallRng::seed_from_u64(3), config);
    h.start_with(&[E, E, G, G, E, R]);

    let fired = h.press(GREEN);
    h.run_until(arrival(fired, 2));

    let progress = &h.session().progress;
    assert_eq!(progress.level, 2);
    assert_eq!(progress.next_level_threshold, 4);
    assert_eq!(h.session().timing.step_time, Duration::from_millis(1400));
    assert_eq!(h.game.overlay().text(), Some("LEVEL UP!"));
}

// ── Game over ───────────────────────────────────────────────────────────────

#[test]
fn last_life_ends_the_run_and_records_high_score() {
    let mut h = Harness::new(
        MockBoard::with_high_score(10),
        SmallRng::seed_from_u64(5),
        GameConfig::default(),
    );
    h.start_with(&[E, E, E, B]);
    {
        let progress = &mut h.game.session_mut().progress;
        progress.lives = 1;
        progress.score = 42;
    }

    let fired = h.press(RED);
    h.run_until(arrival(fired, 3));

    assert_eq!(h.game.state(), GameState::GameOver);
    let progress = &h.session().progress;
    assert_eq!(progress.high_score, 42);
    assert_eq!(progress.last_score, 42);
    assert_eq!(progress.score, 0);
    assert_eq!(progress.lives, 3);
    assert_eq!(progress.level, 1);
    assert!(h.session().strip.is_empty());
    assert!(h.session().shots.is_empty());

    assert_eq!(h.board().slot.bytes, 42_u32.to_le_bytes());
    assert_eq!(h.board().slot.writes, 1);
    assert_eq!(h.game.overlay().text(), Some("NEW HIGHSCORE!"));
    assert_eq!(h.board().display.status, "GAME OVER\nScore: 42\nHi: 42\n\nPress any");
}

#[test]
fn last_life_ends_the_run_even_after_a_busy_shot_tick() {
    // Blue at 1, lone reds at 3, 5, .., 33: sixteen hits and a level-up
    // land in the same tick as the final miss.
    let mut bottom = [E; 34];
    bottom[1] = B;
    for cell in (3..=33).step_by(2) {
        bottom[cell] = R;
    }
    let mut h = seeded();
    h.start_with(&bottom);
    {
        let session = h.game.session_mut();
        session.progress.lives = 1;
        for _ in 0..17 {
            assert!(session.shots.fire(BlockColor::Red));
        }
        // Topmost first; the last shot stays on the floor under the blue block.
        for (i, shot) in session.shots.shots_mut()[..16].iter_mut().enumerate() {
            shot.position = 32 - 2 * i;
        }
    }

    h.run_until(h.clock + GameConfig::default().shot_step_time.as_millis());

    assert_eq!(h.game.state(), GameState::GameOver);
    let progress = &h.session().progress;
    assert_eq!(progress.last_score, 10 + 6 * 2);
    assert_eq!(progress.lives, 3);
    assert_eq!(progress.high_score, 22);
    assert!(h.session().shots.is_empty());
    assert_eq!(h.game.overlay().text(), Some("NEW HIGHSCORE!"));
}

#[test]
fn game_over_flashes_the_strip_red() {
    let mut h = seeded();
    h.start_with(&[E, B]);
    h.game.session_mut().progress.lives = 1;

    let fired = h.press(RED);
    h.run_until(arrival(fired, 1));

    let config = GameConfig::default();
    let red = Frame::filled(dim(base_color(BlockColor::Red), config.brightness_percent));
    let red_frames = h.board().leds.flushed.iter().filter(|f| **f == red).count();
    assert_eq!(red_frames, usize::from(config.flash_repetitions));

    let expected_ns = 2 * u64::from(config.flash_repetitions) * config.flash_hold.as_millis() * 1_000_000;
    assert_eq!(h.board().delay.total_ns, expected_ns);
}

#[test]
fn block_on_the_floor_ends_the_run() {
    let mut h = seeded();
    h.start_with(&[E, R]);
    let started = h.session().timing.last_step.as_millis();

    h.run_until(started + GameConfig::default().initial_step_time.as_millis());

    assert_eq!(h.game.state(), GameState::GameOver);
    assert_eq!(h.game.overlay().text(), Some("GAME OVER"));
    assert_eq!(h.board().slot.writes, 0);
    assert!(h.game.sound().is_playing());
}

#[test]
fn press_after_game_over_starts_again() {
    let mut h = seeded();
    h.start_with(&[E, R]);
    h.run_until(h.clock + GameConfig::default().initial_step_time.as_millis());
    assert_eq!(h.game.state(), GameState::GameOver);

    h.press(GREEN);

    assert_eq!(h.game.state(), GameState::Running);
    assert_eq!(h.session().progress.last_score, 0);
    assert_eq!(h.game.overlay().text(), Some("READY!"));
}

// ── Power-ups ───────────────────────────────────────────────────────────────

#[test]
fn mono_recolours_strip_shots_and_new_shots() {
    let mut h = seeded();
    h.start_with(&[E, E, E, E, E, R, B, G]);
    h.press(RED);

    let config = h.game.config().clone();
    let now = at(h.clock);
    let Session {
        strip,
        shots,
        power_ups,
        ..
    } = h.game.session_mut();
    power_ups.apply(
        PowerUp::Mono(BlockColor::Green),
        now,
        &config,
        strip,
        shots.shots_mut(),
    );

    for index in 5..=7 {
        assert_eq!(h.session().strip.get(index), G);
    }
    assert!(h.session().shots.shots().iter().all(|s| s.color == BlockColor::Green));

    h.press(BLUE);
    assert_eq!(h.session().shots.len(), 2);
    assert_eq!(h.session().shots.shots()[1].color, BlockColor::Green);
}

#[test]
fn rocket_clears_from_chain_start_to_the_top() {
    // An all-zero RNG always unlocks slow time.
    let mut h = Harness::new(
        MockBoard::blank(),
        StepRng::new(0, 0),
        GameConfig::default(),
    );
    h.start_with(&[E, E, E, R, R, G, E, B]);

    let config = h.game.config().clone();
    let now = at(h.clock);
    let Session {
        strip,
        shots,
        power_ups,
        ..
    } = h.game.session_mut();
    power_ups.apply(PowerUp::Rocket, now, &config, strip, shots.shots_mut());
    assert_eq!(h.session().power_ups.rocket_charges(), 1);

    let fired = h.press(RED);
    h.run_until(arrival(fired, 3));

    assert_eq!(h.session().progress.score, 4);
    assert!(h.session().strip.is_empty());
    assert_eq!(h.session().power_ups.rocket_charges(), 0);
    // Perfect clear unlocks a power-up, whose text replaces the rocket's.
    assert!(h.session().power_ups.slow_active(at(h.clock)));
    assert_eq!(h.game.overlay().text(), Some("SLOW TIME!"));
}

#[test]
fn slow_time_stretches_gravity() {
    let mut h = Harness::new(
        MockBoard::blank(),
        StepRng::new(0, 0),
        GameConfig::default(),
    );
    h.start_with(&[E, E, E, E, E, E, E, E, E, R]);

    let config = h.game.config().clone();
    let now = at(h.clock);
    let Session {
        strip,
        shots,
        power_ups,
        ..
    } = h.game.session_mut();
    power_ups.apply(PowerUp::Slow, now, &config, strip, shots.shots_mut());

    let started = h.session().timing.last_step.as_millis();
    h.run_until(started + 1500);
    assert_eq!(h.session().strip.get(9), R);

    h.run_until(started + 2250);
    assert_eq!(h.session().strip.get(8), R);
}
