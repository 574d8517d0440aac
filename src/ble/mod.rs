//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role and
//! presents a HID-over-GATT mouse to the host:
//!
//! 1. **Server** - GATT services (HID, Battery, Device Information).
//! 2. **Security** - just-works pairing with in-RAM bonds.
//! 3. **Peripheral** - session task: advertise, serve the connection,
//!    forward queued input reports as notifications.
//!
//! The control loop talks to the session task only through [`BleMouse`]:
//! commands and reports go over Embassy channels, connectivity comes back
//! through [`LINK_UP`].

pub mod peripheral;
pub mod security;
pub mod server;

use ble_jiggler::hid::MouseReport;
use ble_jiggler::link::Transport;
use ble_jiggler::{Error, Move};
use core::sync::atomic::{AtomicBool, Ordering};
use defmt::{warn, Format};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};

/// Depth of the control-loop → BLE command queue.
pub const COMMAND_QUEUE: usize = 4;

/// Depth of the input report queue.
pub const REPORT_QUEUE: usize = 8;

/// `true` while a host is connected.
pub static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Commands the control loop sends to the session task.
#[derive(Clone, Copy, PartialEq, Eq, Format)]
pub enum BleCommand {
    /// Start advertising (no-op while a session is running).
    Begin,
    /// Stop advertising / drop the host and go idle.
    End,
}

pub type CommandChannel = Channel<CriticalSectionRawMutex, BleCommand, COMMAND_QUEUE>;
pub type ReportChannel = Channel<CriticalSectionRawMutex, MouseReport, REPORT_QUEUE>;

/// [`Transport`] handle for the control loop.
pub struct BleMouse {
    commands: Sender<'static, CriticalSectionRawMutex, BleCommand, COMMAND_QUEUE>,
    reports: Sender<'static, CriticalSectionRawMutex, MouseReport, REPORT_QUEUE>,
}

impl BleMouse {
    pub fn new(
        commands: Sender<'static, CriticalSectionRawMutex, BleCommand, COMMAND_QUEUE>,
        reports: Sender<'static, CriticalSectionRawMutex, MouseReport, REPORT_QUEUE>,
    ) -> Self {
        Self { commands, reports }
    }

    fn command(&self, cmd: BleCommand) {
        // try_send keeps the control loop from blocking on the BLE task.
        if self.commands.try_send(cmd).is_err() {
            warn!("BLE command queue full - dropping {}", cmd);
        }
    }
}

impl Transport for BleMouse {
    fn begin(&mut self) {
        self.command(BleCommand::Begin);
    }

    fn end(&mut self) {
        self.command(BleCommand::End);
    }

    fn is_connected(&self) -> bool {
        LINK_UP.load(Ordering::Acquire)
    }

    fn send_move(&mut self, mv: Move) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::Disconnected);
        }
        self.reports
            .try_send(MouseReport::relative(mv))
            .map_err(|_| Error::QueueFull)
    }
}
