//! Flash-backed store on the nRF52840 internal flash.
//!
//! Storage layout:
//!   - A `sequential-storage` map over the reserved pages with `u8` keys.
//!   - [`KEY_JIGGLE_MODE`](crate::config::KEY_JIGGLE_MODE) holds a `u8`
//!     (the [`ModeStore`] side), [`KEY_BONDS`](crate::config::KEY_BONDS) a
//!     byte blob (the serialized bond table).
//!   - Items are appended; `sequential-storage` handles wear levelling and
//!     garbage collection of stale values.

use super::ModeStore;
use crate::ble::bond_table::TABLE_BYTES_MAX;
use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START};
use crate::error::Error;
use core::ops::Range;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Scratch buffer for one serialized item (key + value + item header).
const ITEM_BUF_SIZE: usize = 32;

/// Scratch buffer for a blob item.
const BLOB_ITEM_BUF_SIZE: usize = TABLE_BYTES_MAX + ITEM_BUF_SIZE;

const fn flash_range() -> Range<u32> {
    STORAGE_START..STORAGE_END
}

/// Key-value store on top of any async NOR flash (the SoftDevice flash
/// driver on the device).
pub struct FlashStore<F> {
    flash: F,
}

impl<F: NorFlash> FlashStore<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Copy the blob stored under `key` into `out`, returning its length.
    pub async fn get_blob(&mut self, key: u8, out: &mut [u8]) -> Result<Option<usize>, Error> {
        let mut buf = [0u8; BLOB_ITEM_BUF_SIZE];
        let item = sequential_storage::map::fetch_item::<u8, &[u8], _>(
            &mut self.flash,
            flash_range(),
            &mut NoCache::new(),
            &mut buf,
            &key,
        )
        .await
        .map_err(|e| {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            Error::Storage
        })?;

        match item {
            Some(data) if data.len() <= out.len() => {
                out[..data.len()].copy_from_slice(data);
                Ok(Some(data.len()))
            }
            Some(data) => {
                error!("Blob {=u8} does not fit ({} bytes)", key, data.len());
                Err(Error::Storage)
            }
            None => Ok(None),
        }
    }

    pub async fn put_blob(&mut self, key: u8, data: &[u8]) -> Result<(), Error> {
        let mut buf = [0u8; BLOB_ITEM_BUF_SIZE];
        sequential_storage::map::store_item::<u8, &[u8], _>(
            &mut self.flash,
            flash_range(),
            &mut NoCache::new(),
            &mut buf,
            &key,
            &data,
        )
        .await
        .map_err(|e| {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            Error::Storage
        })?;

        debug!("Stored blob {=u8} ({} bytes)", key, data.len());
        Ok(())
    }
}

impl<F: NorFlash> ModeStore for FlashStore<F> {
    async fn get_byte(&mut self, key: u8) -> Result<Option<u8>, Error> {
        let mut buf = [0u8; ITEM_BUF_SIZE];
        sequential_storage::map::fetch_item::<u8, u8, _>(
            &mut self.flash,
            flash_range(),
            &mut NoCache::new(),
            &mut buf,
            &key,
        )
        .await
        .map_err(|e| {
            error!("Flash read error: {:?}", defmt::Debug2Format(&e));
            Error::Storage
        })
    }

    async fn put_byte(&mut self, key: u8, value: u8) -> Result<(), Error> {
        let mut buf = [0u8; ITEM_BUF_SIZE];
        sequential_storage::map::store_item::<u8, u8, _>(
            &mut self.flash,
            flash_range(),
            &mut NoCache::new(),
            &mut buf,
            &key,
            &value,
        )
        .await
        .map_err(|e| {
            error!("Flash write error: {:?}", defmt::Debug2Format(&e));
            Error::Storage
        })?;

        debug!("Stored key {=u8} = {=u8}", key, value);
        Ok(())
    }
}
