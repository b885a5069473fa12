//! # strip-shooter
//!
//! Colour-matching shooter on a WS2812 strip, built for the Disobey 2026
//! badge (ESP32-S3).
//!
//! Coloured blocks fall from the far end of the strip towards the player.
//! Three buttons fire red, green or blue shots upward. A shot that reaches a
//! block of its own colour clears the whole same-colour run; a wrong colour
//! costs a life and speeds the fall up. Big clears unlock power-ups.
//!
//! The game core is hardware-agnostic and runs (and is tested) on the host.
//! The badge adapters live behind the `firmware` feature:
//! - **Strip**: WS2812 addressable LEDs via RMT
//! - **Display**: 320×170 ST7789 LCD over SPI with DMA, used for the HUD
//! - **Buzzer**: LEDC square wave
//! - **Buttons**: left / B / A as the red / green / blue fire buttons
//! - **Flash**: four bytes for the persistent high score
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = strip_shooter::init();
//! let resources = strip_shooter::split_resources!(peripherals);
//! let board = strip_shooter::BadgeBoard::new(resources)?;
//! let mut game = strip_shooter::GameController::new(board, rng, GameConfig::default(), Instant::now());
//! loop {
//!     game.step(Instant::now());
//!     Timer::after(LOOP_PERIOD).await;
//! }
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod devices;
pub mod game;
pub mod input;
pub mod persistence;
pub mod power_up;
pub mod presentation;
pub mod session;
pub mod shots;
pub mod sound;
pub mod strip;

pub use config::{
    BUTTON_COUNT,
    GameConfig,
    LOOP_PERIOD,
    MAX_SHOTS,
    STRIP_LEN,
};
pub use devices::{
    AudioOutput,
    Board,
    LedStrip,
    ScoreSlot,
    SlotError,
    TextDisplay,
    Waveform,
};
pub use game::{
    GameController,
    GameOverReason,
    GameState,
};
pub use strip::{
    BlockColor,
    Cell,
    Strip,
};

#[cfg(feature = "firmware")]
mod board;
#[cfg(feature = "firmware")]
mod buttons;
#[cfg(feature = "firmware")]
mod buzzer;
#[cfg(feature = "firmware")]
mod display;
#[cfg(feature = "firmware")]
mod flash;
#[cfg(feature = "firmware")]
mod leds;

#[cfg(feature = "firmware")]
pub use board::{
    BadgeBoard,
    BoardError,
};
#[cfg(feature = "firmware")]
pub use buttons::Buttons;
#[cfg(feature = "firmware")]
pub use buzzer::{
    Buzzer,
    BuzzerError,
};
#[cfg(feature = "firmware")]
pub use display::{
    Display,
    DisplayError,
    Hud,
};
#[cfg(feature = "firmware")]
pub use flash::{
    FlashSlot,
    HIGH_SCORE_OFFSET,
};
#[cfg(feature = "firmware")]
pub use leds::StripLeds;
#[cfg(feature = "firmware")]
pub use firmware::*;

#[cfg(feature = "firmware")]
mod firmware {
    use esp_hal::{
        Blocking,
        assign_resources,
        clock::{
            Clock,
            CpuClock,
        },
        rmt::{
            Rmt,
            Tx,
            TxChannelConfig,
            TxChannelCreator as _,
        },
        rom,
        time::Rate,
    };

    /// StaticCell helper: allocates a value into a `static` exactly once.
    #[macro_export]
    macro_rules! mk_static {
        ($t:ty, $val:expr) => {{
            static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
            #[deny(unused_attributes)]
            let x = STATIC_CELL.uninit().write($val);
            x
        }};
    }

    // ── Pin / peripheral assignments ────────────────────────────────────────

    assign_resources! {
        pub Resources<'d> {
            display: DisplayResources<'d> {
                dc: GPIO15,
                rst: GPIO7,
                sck: GPIO4,
                cs: GPIO6,
                miso: GPIO16,
                mosi: GPIO5,
                spi: SPI2,
                dma: DMA_CH0,
            },
            backlight: BacklightResources<'d> {
                led: GPIO19,
            },
            buttons: ButtonResources<'d> {
                left: GPIO21,
                b: GPIO38,
                a: GPIO13,
            },
            strip: StripResources<'d> {
                io: GPIO9,
                rmt: RMT,
            },
            buzzer: BuzzerResources<'d> {
                pin: GPIO10,
                ledc: LEDC,
            },
            flash: FlashResources<'d> {
                flash: FLASH,
            },
        }
    }

    // ── Board initialisation ────────────────────────────────────────────────

    /// Minimal CPU clock switcher for ESP32-S3.
    ///
    /// Steps through an intermediate frequency before reaching the target,
    /// which is required by the hardware.
    fn set_cpu_clock(cpu_clock_speed: CpuClock) {
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .sysclk_conf()
            .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .cpu_per_conf()
            .modify(|_, w| unsafe {
                let _ = w.pll_freq_sel().set_bit();
                w.cpuperiod_sel().bits(match cpu_clock_speed {
                    CpuClock::_80MHz => 0,
                    CpuClock::_160MHz => 1,
                    CpuClock::_240MHz => 2,
                    _ => panic!("Unsupported CPU clock speed"),
                })
            });

        rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
    }

    /// Initialise the badge hardware and return the raw peripheral set.
    ///
    /// Call this once at the top of `main`, then use [`split_resources!`] to
    /// break the peripherals into typed resource groups.
    #[must_use]
    pub fn init() -> esp_hal::peripherals::Peripherals {
        set_cpu_clock(CpuClock::_160MHz);
        let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
        esp_hal::init(config)
    }

    // ── Resource → peripheral conversions ───────────────────────────────────

    impl<'a> TryFrom<StripResources<'a>> for esp_hal::rmt::Channel<'a, Blocking, Tx> {
        type Error = esp_hal::rmt::Error;

        fn try_from(res: StripResources<'a>) -> Result<Self, Self::Error> {
            let rmt = Rmt::new(res.rmt, Rate::from_mhz(40))?;
            let tx_config = TxChannelConfig::default().with_clk_divider(1);
            rmt.channel0.configure_tx(res.io, tx_config)
        }
    }
}
