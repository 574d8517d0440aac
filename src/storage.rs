//! Persistent storage for the active jiggle mode.
//!
//! The store is a tiny byte-valued key-value map. One key
//! ([`KEY_JIGGLE_MODE`]) holds the mode, written on every confirmed mode
//! change and read once at boot. On the device it is backed by the
//! nRF52840's internal flash via `sequential-storage` ([`flash`]).

use crate::config::KEY_JIGGLE_MODE;
use crate::error::Error;
use crate::jiggle::Mode;

#[cfg(feature = "embedded")]
pub mod flash;

/// Byte-valued non-volatile key-value store.
#[allow(async_fn_in_trait)]
pub trait ModeStore {
    /// Read `key`; `Ok(None)` when it was never written.
    async fn get_byte(&mut self, key: u8) -> Result<Option<u8>, Error>;
    async fn put_byte(&mut self, key: u8, value: u8) -> Result<(), Error>;
}

/// Load the persisted mode. Missing, unreadable, or invalid values all
/// yield `Off`.
pub async fn load_mode<S: ModeStore>(store: &mut S) -> Mode {
    match store.get_byte(KEY_JIGGLE_MODE).await {
        Ok(Some(raw)) => {
            let mode = Mode::from_persisted(raw);
            if mode.to_persisted() != raw {
                warn!("Stored mode byte {} is invalid - starting off", raw);
            }
            mode
        }
        Ok(None) => {
            info!("No stored mode");
            Mode::Off
        }
        Err(e) => {
            error!("Mode read failed: {}", e);
            Mode::Off
        }
    }
}

pub async fn save_mode<S: ModeStore>(store: &mut S, mode: Mode) -> Result<(), Error> {
    store.put_byte(KEY_JIGGLE_MODE, mode.to_persisted()).await
}
