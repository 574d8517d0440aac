//! Legacy advertising payload for the HID peripheral.
//!
//! AD structures, in order: flags, complete 16-bit service list (HID),
//! appearance, local name. The name is shortened to whatever fits the
//! 31-byte legacy limit.

use heapless::Vec;

/// Legacy advertising payload limit.
pub const ADV_PAYLOAD_MAX: usize = 31;

const AD_FLAGS: u8 = 0x01;
const AD_UUID16_COMPLETE: u8 = 0x03;
const AD_SHORT_NAME: u8 = 0x08;
const AD_COMPLETE_NAME: u8 = 0x09;
const AD_APPEARANCE: u8 = 0x19;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_GENERAL_DISC_NO_BREDR: u8 = 0x06;

/// HID Service UUID (0x1812).
pub const HID_SERVICE_UUID: u16 = 0x1812;

/// Build the advertising payload announcing a HID device called `name`.
pub fn build(name: &str, appearance: u16) -> Vec<u8, ADV_PAYLOAD_MAX> {
    let mut out: Vec<u8, ADV_PAYLOAD_MAX> = Vec::new();

    let _ = out.extend_from_slice(&[2, AD_FLAGS, FLAGS_GENERAL_DISC_NO_BREDR]);

    let uuid = HID_SERVICE_UUID.to_le_bytes();
    let _ = out.extend_from_slice(&[3, AD_UUID16_COMPLETE, uuid[0], uuid[1]]);

    let app = appearance.to_le_bytes();
    let _ = out.extend_from_slice(&[3, AD_APPEARANCE, app[0], app[1]]);

    // Header takes two bytes; anything that does not fit is cut on a char
    // boundary and announced as a shortened name.
    let room = ADV_PAYLOAD_MAX - out.len() - 2;
    let shown = truncate_utf8(name, room);
    if !shown.is_empty() {
        let kind = if shown.len() == name.len() {
            AD_COMPLETE_NAME
        } else {
            AD_SHORT_NAME
        };
        let _ = out.push(shown.len() as u8 + 1);
        let _ = out.push(kind);
        let _ = out.extend_from_slice(shown.as_bytes());
    }

    out
}

/// Scan response carrying the full name (up to 29 bytes).
pub fn build_scan_response(name: &str) -> Vec<u8, ADV_PAYLOAD_MAX> {
    let mut out: Vec<u8, ADV_PAYLOAD_MAX> = Vec::new();
    let name = truncate_utf8(name, ADV_PAYLOAD_MAX - 2);
    if !name.is_empty() {
        let _ = out.push(name.len() as u8 + 1);
        let _ = out.push(AD_COMPLETE_NAME);
        let _ = out.extend_from_slice(name.as_bytes());
    }
    out
}

fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
