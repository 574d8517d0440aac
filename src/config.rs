//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Button / click bursts

/// Maximum gap between two presses of the same burst (ms).
pub const DOUBLE_CLICK_MS: u64 = 500;

/// Lockout after an accepted button edge; level changes inside it are bounce (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 30;

// Control loop

/// Idle delay between two control-loop iterations (ms).
pub const LOOP_DELAY_MS: u64 = 10;

/// Hardware watchdog timeout. The loop pets it every iteration (ms).
pub const WATCHDOG_TIMEOUT_MS: u32 = 3_000;

// Movement

/// Slow mode: one wide move per minute.
pub const SLOW_INTERVAL_MS: u64 = 60_000;
pub const SLOW_SPAN: i8 = 50;

/// Fast mode: one small move per second.
pub const FAST_INTERVAL_MS: u64 = 1_000;
pub const FAST_SPAN: i8 = 3;

/// Zigzag mode: quick diagonal strokes.
pub const ZIGZAG_INTERVAL_MS: u64 = 100;
pub const ZIGZAG_MIN_STEP: i8 = 15;
pub const ZIGZAG_MAX_STEP: i8 = 25;

/// Number of zigzag moves spent in each diagonal before rotating.
pub const ZIGZAG_PHASE_LEN: u32 = 5;

// Link supervision

/// Send a zero-length move if nothing was sent for this long (ms).
pub const KEEP_ALIVE_MS: u64 = 30_000;

/// Pause between tearing the BLE session down and starting it again (ms).
pub const RECOVERY_PAUSE_MS: u32 = 100;

/// Back-off before re-trying a failed advertising start (ms).
pub const BLE_ADV_RETRY_MS: u64 = 1_000;

// Status LED blink periods (ms). Off mode keeps the LED dark.

pub const LED_PERIOD_SLOW_MS: u64 = 1_000;
pub const LED_PERIOD_FAST_MS: u64 = 250;
pub const LED_PERIOD_ZIGZAG_MS: u64 = 100;

// BLE identity

/// Name in the advertisement and the GAP device name characteristic.
pub const BLE_DEVICE_NAME: &str = "Wireless Mouse WM126";

/// Device Information Service manufacturer string.
pub const BLE_MANUFACTURER: &str = "Dell";

/// Battery level reported through the Battery Service (%).
pub const BLE_BATTERY_LEVEL: u8 = 100;

/// GAP appearance: HID mouse.
pub const BLE_APPEARANCE_MOUSE: u16 = 0x03C2;

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Logical names only; the concrete `embassy_nrf::peripherals::*` pins are
// bound in `main.rs`.  Adjust for your custom PCB.
//
//   Mode button    → P0.11  (Button 1, active-low, internal pull-up)
//   Status LED     → P0.13  (LED 1, active-low)

// Mode storage

/// Flash page index where mode storage starts (4 KB per page on nRF52840).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;

/// Number of flash pages reserved for mode storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;

/// Store key holding the persisted jiggle mode.
pub const KEY_JIGGLE_MODE: u8 = 0x01;

/// Store key holding the serialized bond table.
pub const KEY_BONDS: u8 = 0x02;

/// Maximum number of bonded hosts kept; the oldest is evicted first.
pub const BLE_MAX_BONDS: usize = 4;
