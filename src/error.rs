//! Unified error type for ble-jiggler.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Derives `defmt::Format` (behind the `defmt` feature) for on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// A move was requested while no host is connected.
    Disconnected,

    /// The report queue towards the BLE task is full; the move was dropped.
    QueueFull,

    // Storage
    /// Flash read/write/erase failed.
    Storage,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// Advertising could not be started.
    AdvertiseFailed,
    /// Input report notification was rejected.
    NotifyFailed,
    /// GATT server registration failed.
    GattFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
