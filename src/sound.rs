//! Non-blocking sound effects.
//!
//! A sequence is a list of `(frequency, duration)` steps. The sequencer is
//! polled every loop tick and only touches the audio device on step
//! boundaries, so it never holds up LED refresh or button polling.

use embassy_time::{
    Duration,
    Instant,
};

use crate::devices::{
    AudioOutput,
    Waveform,
};

/// One step of a sound sequence. A frequency of 0 is a rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tone {
    pub freq_hz: u32,
    pub duration: Duration,
}

impl Tone {
    pub const fn new(freq_hz: u32, millis: u64) -> Self {
        Self {
            freq_hz,
            duration: Duration::from_millis(millis),
        }
    }

    pub const fn rest(millis: u64) -> Self {
        Self::new(0, millis)
    }
}

// ── Sound effects ───────────────────────────────────────────────────────────

pub const START_JINGLE: &[Tone] = &[
    Tone::new(523, 80),   // C5
    Tone::new(659, 80),   // E5
    Tone::new(784, 120),  // G5
    Tone::rest(40),
    Tone::new(784, 80),   // G5
    Tone::new(988, 80),   // B5
    Tone::new(1046, 160), // C6
];

pub const SHOT: &[Tone] = &[Tone::new(1400, 30), Tone::new(900, 40)];

pub const HIT: &[Tone] = &[Tone::new(1000, 60)];

pub const WRONG: &[Tone] = &[Tone::new(250, 120)];

pub const LEVEL_UP: &[Tone] = &[
    Tone::new(500, 40),
    Tone::new(700, 40),
    Tone::new(900, 40),
    Tone::new(1200, 40),
];

pub const GAME_OVER: &[Tone] = &[
    Tone::new(600, 120),
    Tone::new(450, 120),
    Tone::new(320, 120),
    Tone::new(220, 120),
];

pub const POWER_UP: &[Tone] = &[
    Tone::new(800, 60),
    Tone::new(1100, 60),
    Tone::new(1500, 100),
];

pub const ROCKET: &[Tone] = &[
    Tone::new(400, 40),
    Tone::new(600, 40),
    Tone::new(900, 60),
    Tone::new(1200, 80),
    Tone::rest(40),
    Tone::new(1200, 80),
    Tone::rest(40),
    Tone::new(1200, 80),
];

// ── Sequencer ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct SoundSequencer {
    sequence: Option<&'static [Tone]>,
    index: usize,
    step_deadline: Option<Instant>,
}

impl SoundSequencer {
    pub const fn new() -> Self {
        Self {
            sequence: None,
            index: 0,
            step_deadline: None,
        }
    }

    /// Replaces whatever is playing. The first step starts on the next poll.
    pub fn start(&mut self, sequence: &'static [Tone]) {
        self.sequence = Some(sequence);
        self.index = 0;
        self.step_deadline = None;
    }

    pub const fn is_playing(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn poll(&mut self, now: Instant, audio: &mut impl AudioOutput) {
        let Some(sequence) = self.sequence else {
            return;
        };

        match self.step_deadline {
            None => self.begin_step(sequence, now, audio),
            Some(deadline) if now >= deadline => {
                audio.stop();
                self.index += 1;
                self.begin_step(sequence, now, audio);
            }
            Some(_) => {}
        }
    }

    fn begin_step(&mut self, sequence: &'static [Tone], now: Instant, audio: &mut impl AudioOutput) {
        let Some(tone) = sequence.get(self.index) else {
            audio.stop();
            self.sequence = None;
            self.index = 0;
            self.step_deadline = None;
            return;
        };

        if tone.freq_hz > 0 {
            audio.play_tone(tone.freq_hz, Waveform::Square);
        } else {
            audio.stop();
        }
        self.step_deadline = Some(now + tone.duration);
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Cmd {
        Play(u32),
        Stop,
    }

    #[derive(Default)]
    struct Recorder(Vec<Cmd>);

    impl AudioOutput for Recorder {
        fn play_tone(&mut self, freq_hz: u32, _waveform: Waveform) {
            self.0.push(Cmd::Play(freq_hz));
        }

        fn stop(&mut self) {
            self.0.push(Cmd::Stop);
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn empty_sequence_completes_without_a_tone() {
        let mut seq = SoundSequencer::new();
        let mut audio = Recorder::default();
        seq.start(&[]);
        seq.poll(at(0), &mut audio);
        assert!(!seq.is_playing());
        assert!(!audio.0.iter().any(|c| matches!(c, Cmd::Play(_))));
    }

    #[test]
    fn rest_step_stops_audio_without_playing() {
        const REST: &[Tone] = &[Tone::rest(100)];
        let mut seq = SoundSequencer::new();
        let mut audio = Recorder::default();
        seq.start(REST);
        seq.poll(at(0), &mut audio);
        assert_eq!(audio.0, [Cmd::Stop]);
        seq.poll(at(100), &mut audio);
        assert!(!seq.is_playing());
        assert!(!audio.0.iter().any(|c| matches!(c, Cmd::Play(_))));
    }

    #[test]
    fn tone_plays_for_its_duration_then_advances() {
        const SEQ: &[Tone] = &[Tone::new(440, 50), Tone::new(880, 20)];
        let mut seq = SoundSequencer::new();
        let mut audio = Recorder::default();
        seq.start(SEQ);

        seq.poll(at(1_000), &mut audio);
        assert_eq!(audio.0, [Cmd::Play(440)]);

        seq.poll(at(1_049), &mut audio);
        assert_eq!(audio.0.len(), 1);

        seq.poll(at(1_050), &mut audio);
        assert_eq!(audio.0, [Cmd::Play(440), Cmd::Stop, Cmd::Play(880)]);

        seq.poll(at(1_070), &mut audio);
        assert!(!seq.is_playing());
        assert_eq!(audio.0.last(), Some(&Cmd::Stop));

        let before = audio.0.len();
        seq.poll(at(2_000), &mut audio);
        assert_eq!(audio.0.len(), before);
    }

    #[test]
    fn start_preempts_a_running_sequence() {
        let mut seq = SoundSequencer::new();
        let mut audio = Recorder::default();
        seq.start(GAME_OVER);
        seq.poll(at(0), &mut audio);
        seq.start(HIT);
        seq.poll(at(10), &mut audio);
        assert_eq!(audio.0, [Cmd::Play(600), Cmd::Play(1000)]);
        seq.poll(at(70), &mut audio);
        assert!(!seq.is_playing());
    }
}
