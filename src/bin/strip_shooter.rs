//! Strip shooter firmware for the Disobey 2026 badge.
//!
//! Controls:
//! - Left: fire red
//! - B: fire green
//! - A: fire blue
//! - Any of them: start a new game from the title / game-over screen

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{
    Instant,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    rng::Rng,
    timer::timg::TimerGroup,
};
use esp_println as _;
use rand::{
    SeedableRng as _,
    rngs::SmallRng,
};
#[allow(clippy::wildcard_imports)]
use strip_shooter::*;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    let peripherals = strip_shooter::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let board = match BadgeBoard::new(resources) {
        Ok(board) => board,
        Err(e) => defmt::panic!("Board bring-up failed: {}", e),
    };

    let hw_rng = Rng::new();
    let seed = (u64::from(hw_rng.random()) << 32) | u64::from(hw_rng.random());
    let rng = SmallRng::seed_from_u64(seed);

    let mut game = GameController::new(board, rng, GameConfig::default(), Instant::now());
    info!("Strip shooter ready");

    loop {
        game.step(Instant::now());
        Timer::after(LOOP_PERIOD).await;
    }
}
