//! Host-testable core of ble-jiggler.
//!
//! Everything that decides *what* the device does lives here: the click
//! burst counter, the mode state machine, the movement generator, the link
//! supervisor and the status LED pattern. None of it touches hardware
//! directly; the firmware in `main.rs` plugs in the SoftDevice transport,
//! the flash store and the GPIOs through the [`link::Transport`],
//! [`storage::ModeStore`] and `embedded-hal` traits.
//!
//! Usage: `cargo test --lib` (host), `cargo run --release --features embedded`
//! (probe-rs runner, nRF52840).

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod error;
pub mod hid;
pub mod jiggle;
pub mod link;
pub mod storage;
pub mod ui;

pub use controller::{Controller, Tick};
pub use error::{BleError, Error};
pub use jiggle::{Mode, Move};

// Pure BLE helpers (advertising payload, bond records) live next to the
// firmware's BLE code.
#[path = "ble/adv_data.rs"]
mod ble_adv_data_impl;

#[path = "ble/bond_table.rs"]
mod ble_bond_table_impl;

pub mod ble {
    pub mod adv_data {
        pub use crate::ble_adv_data_impl::{
            build, build_scan_response, ADV_PAYLOAD_MAX, HID_SERVICE_UUID,
        };
    }

    pub mod bond_table {
        pub use crate::ble_bond_table_impl::{
            BondRecord, BondTable, SYS_ATTRS_MAX, TABLE_BYTES_MAX,
        };
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
