//! Four-byte high-score slot in the SPI flash.

use embedded_storage::{
    ReadStorage as _,
    Storage as _,
};
use esp_storage::FlashStorage;

use crate::{
    FlashResources,
    devices::{
        ScoreSlot,
        SlotError,
    },
};

/// Start of the default NVS partition, which nothing else on the badge uses.
pub const HIGH_SCORE_OFFSET: u32 = 0x9000;

pub struct FlashSlot {
    storage: FlashStorage<'static>,
}

impl From<FlashResources<'static>> for FlashSlot {
    fn from(res: FlashResources<'static>) -> Self {
        Self {
            storage: FlashStorage::new(res.flash),
        }
    }
}

impl ScoreSlot for FlashSlot {
    fn read(&mut self) -> Result<[u8; 4], SlotError> {
        let mut bytes = [0_u8; 4];
        self.storage
            .read(HIGH_SCORE_OFFSET, &mut bytes)
            .map_err(|_| SlotError::Read)?;
        Ok(bytes)
    }

    fn write(&mut self, bytes: [u8; 4]) -> Result<(), SlotError> {
        self.storage
            .write(HIGH_SCORE_OFFSET, &bytes)
            .map_err(|_| SlotError::Write)
    }
}
