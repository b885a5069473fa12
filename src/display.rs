//! ST7789 display driver (320×170 LCD over SPI with DMA) and the text HUD
//! drawn on it.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{
            FONT_6X10,
            FONT_10X20,
        },
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Baseline,
        Text,
    },
};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::Spi,
    time::Rate,
};

use crate::{
    BacklightResources,
    DisplayResources,
    devices::TextDisplay,
    mk_static,
    presentation::{
        OverlayText,
        StatusText,
    },
};

type SpiInterface<'a> = mipidsi::interface::SpiInterface<
    'a,
    ExclusiveDevice<esp_hal::spi::master::SpiDmaBus<'a, Async>, Output<'a>, esp_hal::delay::Delay>,
    Output<'a>,
>;

/// The badge's ST7789 display, ready to draw on with `embedded-graphics`.
pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, mipidsi::models::ST7789, Output<'a>>;

const SCREEN_W: i32 = 320;
const SCREEN_H: u32 = 170;

// HUD layout
const STATUS_ORIGIN: Point = Point::new(8, 8);
const STATUS_H: u32 = 110;
const OVERLAY_Y: i32 = 130;
const OVERLAY_H: u32 = 24;
const OVERLAY_CHAR_W: i32 = 10;

#[derive(Clone, Copy, Debug, defmt::Format)]
pub enum DisplayError {
    Dma,
    Spi,
    Panel,
}

impl DisplayError {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Dma => "DMA buffer setup",
            Self::Spi => "SPI bus setup",
            Self::Panel => "panel write",
        }
    }
}

impl<'a> TryFrom<DisplayResources<'a>> for Display<'a> {
    type Error = DisplayError;

    fn try_from(res: DisplayResources<'a>) -> Result<Self, Self::Error> {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(32000);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).map_err(|_| DisplayError::Dma)?;
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).map_err(|_| DisplayError::Dma)?;

        let mut delay = esp_hal::delay::Delay::new();

        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(
            res.spi,
            esp_hal::spi::master::Config::default().with_frequency(Rate::from_mhz(80)),
        )
        .map_err(|_| DisplayError::Spi)?
        .with_sck(res.sck)
        .with_mosi(res.mosi)
        .with_miso(res.miso)
        .with_dma(res.dma)
        .with_buffers(dma_rx_buf, dma_tx_buf)
        .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let spi_device = ExclusiveDevice::new(spi, cs, delay).map_err(|_| DisplayError::Spi)?;

        let buffer = mk_static!([u8; 32000], [0_u8; 32000]);
        let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

        mipidsi::Builder::new(mipidsi::models::ST7789, di)
            .reset_pin(rst)
            .display_size(170, 320)
            .invert_colors(mipidsi::options::ColorInversion::Inverted)
            .orientation(
                mipidsi::options::Orientation::new().rotate(mipidsi::options::Rotation::Deg90),
            )
            .display_offset(35, 0)
            .init(&mut delay)
            .map_err(|_| DisplayError::Panel)
    }
}

/// Status block in the upper part of the screen and a centred overlay band
/// below it. Text is buffered and only drawn on [`redraw`](TextDisplay::redraw).
pub struct Hud {
    display: Display<'static>,
    _backlight: Output<'static>,
    status: StatusText,
    overlay: OverlayText,
    overlay_x: i32,
    status_dirty: bool,
    overlay_dirty: bool,
}

impl Hud {
    /// Brings the panel up, clears it and turns the backlight on.
    pub fn new(
        display: DisplayResources<'static>,
        backlight: BacklightResources<'static>,
    ) -> Result<Self, DisplayError> {
        let mut display = Display::try_from(display)?;
        display.clear(Rgb565::BLACK).map_err(|_| DisplayError::Panel)?;

        Ok(Self {
            display,
            _backlight: Output::new(backlight.led, Level::High, OutputConfig::default()),
            status: StatusText::new(),
            overlay: OverlayText::new(),
            overlay_x: 0,
            status_dirty: true,
            overlay_dirty: true,
        })
    }

    fn draw_status(&mut self) -> Result<(), DisplayError> {
        Rectangle::new(Point::zero(), Size::new(SCREEN_W as u32, STATUS_H))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
            .draw(&mut self.display)
            .map_err(|_| DisplayError::Panel)?;

        let style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
        Text::with_baseline(&self.status, STATUS_ORIGIN, style, Baseline::Top)
            .draw(&mut self.display)
            .map_err(|_| DisplayError::Panel)?;
        Ok(())
    }

    fn draw_overlay(&mut self) -> Result<(), DisplayError> {
        Rectangle::new(Point::new(0, OVERLAY_Y), Size::new(SCREEN_W as u32, OVERLAY_H))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::BLACK))
            .draw(&mut self.display)
            .map_err(|_| DisplayError::Panel)?;

        if self.overlay.is_empty() {
            return Ok(());
        }
        let style = MonoTextStyle::new(&FONT_10X20, Rgb565::YELLOW);
        Text::with_baseline(
            &self.overlay,
            Point::new(self.overlay_x, OVERLAY_Y + 2),
            style,
            Baseline::Top,
        )
        .draw(&mut self.display)
        .map_err(|_| DisplayError::Panel)?;
        Ok(())
    }
}

impl TextDisplay for Hud {
    fn set_status(&mut self, text: &str) {
        self.status.clear();
        if self.status.push_str(text).is_err() {
            warn!("Status text truncated");
        }
        self.status_dirty = true;
    }

    fn set_overlay(&mut self, text: &str, x: i32) {
        self.overlay.clear();
        if self.overlay.push_str(text).is_err() {
            warn!("Overlay text truncated");
        }
        self.overlay_x = x;
        self.overlay_dirty = true;
    }

    fn redraw(&mut self) {
        if self.status_dirty {
            self.status_dirty = false;
            if let Err(e) = self.draw_status() {
                error!("Status draw failed: {}", e.describe());
            }
        }
        if self.overlay_dirty {
            self.overlay_dirty = false;
            if let Err(e) = self.draw_overlay() {
                error!("Overlay draw failed: {}", e.describe());
            }
        }
    }

    fn width(&self) -> i32 {
        SCREEN_W
    }

    fn overlay_char_width(&self) -> i32 {
        OVERLAY_CHAR_W
    }
}

const _: () = assert!(OVERLAY_Y as u32 + OVERLAY_H <= SCREEN_H);
