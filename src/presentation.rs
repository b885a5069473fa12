//! Turns simulation state into LED frames and display text.

use core::fmt::Write as _;

use heapless::String;
use palette::{
    Srgb,
    named,
};

use crate::{
    config::STRIP_LEN,
    devices::{
        LedStrip,
        TextDisplay,
    },
    game::GameState,
    session::Progress,
    shots::Shot,
    strip::{
        BlockColor,
        Strip,
    },
};

pub const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);

pub type StatusText = String<96>;
pub type OverlayText = String<24>;

/// Full-strip colour buffer, bottom LED first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pixels: [Srgb<u8>; STRIP_LEN],
}

impl Default for Frame {
    fn default() -> Self {
        Self::filled(BLACK)
    }
}

impl Frame {
    pub const fn filled(color: Srgb<u8>) -> Self {
        Self {
            pixels: [color; STRIP_LEN],
        }
    }

    /// Sets one pixel; returns `false` (and writes nothing) when out of range.
    pub fn set(&mut self, index: usize, color: Srgb<u8>) -> bool {
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<Srgb<u8>> {
        self.pixels.get(index).copied()
    }

    pub fn pixels(&self) -> &[Srgb<u8>; STRIP_LEN] {
        &self.pixels
    }
}

/// Full-brightness colour of a block.
pub const fn base_color(color: BlockColor) -> Srgb<u8> {
    match color {
        BlockColor::Red => named::RED,
        BlockColor::Green => named::LIME,
        BlockColor::Blue => named::BLUE,
    }
}

/// Scales a colour to `percent` brightness.
pub fn dim(color: Srgb<u8>, percent: u8) -> Srgb<u8> {
    let percent = u16::from(percent.min(100));
    let scale = |c: u8| (u16::from(c) * percent / 100) as u8;
    Srgb::new(scale(color.red), scale(color.green), scale(color.blue))
}

/// Blocks, with shots painted over them.
pub fn render_strip(strip: &Strip, shots: &[Shot], brightness: u8) -> Frame {
    let mut frame = Frame::default();
    for (index, cell) in strip.cells().iter().enumerate() {
        if let Some(color) = cell.color() {
            frame.set(index, dim(base_color(color), brightness));
        }
    }
    for shot in shots {
        frame.set(shot.position, dim(base_color(shot.color), brightness));
    }
    frame
}

/// HUD text for the status region.
pub fn status_text(state: GameState, progress: &Progress, rocket_charges: u32) -> StatusText {
    let mut text = StatusText::new();
    match state {
        GameState::Start => {
            write!(text, "Press any button\nto start\n\nHi: {}", progress.high_score).ok();
        }
        GameState::Running => {
            write!(
                text,
                "Score: {}\nLevel: {}\nLives: {}\nHi: {}",
                progress.score, progress.level, progress.lives, progress.high_score
            )
            .ok();
            if rocket_charges > 0 {
                write!(text, "\nRockets: {rocket_charges}").ok();
            }
        }
        GameState::GameOver => {
            write!(
                text,
                "GAME OVER\nScore: {}\nHi: {}\n\nPress any",
                progress.last_score, progress.high_score
            )
            .ok();
        }
    }
    text
}

/// Left edge that centres `len` glyphs of `char_width` pixels in `width`.
pub fn overlay_x(len: usize, width: i32, char_width: i32) -> i32 {
    let text_width = i32::try_from(len).unwrap_or(i32::MAX).saturating_mul(char_width);
    (width.saturating_sub(text_width) / 2).max(0)
}

/// Output side of the game loop. Remembers what the display currently shows
/// so the (slow) panel is only redrawn on change.
#[derive(Debug, Default)]
pub struct Presenter {
    status: Option<StatusText>,
    overlay: OverlayText,
}

impl Presenter {
    pub const fn new() -> Self {
        Self {
            status: None,
            overlay: OverlayText::new(),
        }
    }

    /// Sends a frame to the strip and latches it.
    pub fn show_frame(&mut self, leds: &mut impl LedStrip, frame: &Frame) {
        leds.write_frame(frame);
        leds.flush();
    }

    /// Updates both text regions, redrawing only if something changed.
    pub fn show_text(&mut self, display: &mut impl TextDisplay, status: &str, overlay: Option<&str>) {
        let overlay = overlay.unwrap_or("");
        let mut dirty = false;

        if self.status.as_deref() != Some(status) {
            let mut owned = StatusText::new();
            owned.push_str(status).ok();
            display.set_status(&owned);
            self.status = Some(owned);
            dirty = true;
        }

        if self.overlay.as_str() != overlay {
            self.overlay.clear();
            self.overlay.push_str(overlay).ok();
            let x = overlay_x(
                self.overlay.chars().count(),
                display.width(),
                display.overlay_char_width(),
            );
            display.set_overlay(&self.overlay, x);
            dirty = true;
        }

        if dirty {
            display.redraw();
        }
    }
}
