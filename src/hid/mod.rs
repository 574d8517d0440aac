//! HID-over-GATT report types for the virtual mouse.

pub mod mouse;

pub use mouse::{MouseReport, MOUSE_REPORT_DESCRIPTOR, MOUSE_REPORT_ID, MOUSE_REPORT_SIZE};

/// HID Information characteristic value: bcdHID 1.11, country 0,
/// flags = normally connectable.
pub const HID_INFORMATION: [u8; 4] = [0x11, 0x01, 0x00, 0x02];

