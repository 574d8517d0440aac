//! GATT server - HID-over-GATT mouse plus the Battery and Device
//! Information services hosts expect from a HID peripheral.
//!
//! The `#[nrf_softdevice::gatt_server]` / `gatt_service` macros generate
//! registration, get/set/notify helpers and the event enums.

use ble_jiggler::config;
use ble_jiggler::hid::mouse::MOUSE_REPORT_DESCRIPTOR_LEN;
use ble_jiggler::hid::{HID_INFORMATION, MOUSE_REPORT_DESCRIPTOR, MOUSE_REPORT_SIZE};
use ble_jiggler::{BleError, Error};
use defmt::{debug, info};
use nrf_softdevice::Softdevice;

const MANUFACTURER_LEN: usize = config::BLE_MANUFACTURER.len();

/// HID protocol mode value for Report Protocol.
const PROTOCOL_MODE_REPORT: u8 = 0x01;

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    pub battery_level: u8,
}

#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2a29", read)]
    pub manufacturer_name: [u8; MANUFACTURER_LEN],
}

#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    /// HID Information - version, country code, flags.
    #[characteristic(uuid = "2a4a", read)]
    pub hid_info: [u8; 4],

    /// HID Report Map - the mouse report descriptor.
    #[characteristic(uuid = "2a4b", read)]
    pub report_map: [u8; MOUSE_REPORT_DESCRIPTOR_LEN],

    /// HID Control Point - suspend / exit suspend.
    #[characteristic(uuid = "2a4c", write_without_response)]
    pub control_point: u8,

    /// Protocol Mode - 0 = Boot Protocol, 1 = Report Protocol.
    #[characteristic(uuid = "2a4e", read, write_without_response)]
    pub protocol_mode: u8,

    /// HID Report (Input) - notifications carry the pointer moves.
    /// Report Reference: report ID 1, input.
    #[characteristic(uuid = "2a4d", read, notify)]
    #[descriptor(uuid = "2908", value = [0x01, 0x01])]
    pub input_report: [u8; MOUSE_REPORT_SIZE],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
    pub dis: DeviceInformationService,
    pub hid: HidService,
}

impl Server {
    /// Register all services and load their static values.
    pub fn init(sd: &mut Softdevice) -> Result<Self, Error> {
        let server = Server::new(sd).map_err(|_| BleError::GattFailed)?;

        let mut manufacturer = [0u8; MANUFACTURER_LEN];
        manufacturer.copy_from_slice(config::BLE_MANUFACTURER.as_bytes());

        server
            .bas
            .battery_level_set(&config::BLE_BATTERY_LEVEL)
            .and_then(|_| server.dis.manufacturer_name_set(&manufacturer))
            .and_then(|_| server.hid.hid_info_set(&HID_INFORMATION))
            .and_then(|_| server.hid.report_map_set(&MOUSE_REPORT_DESCRIPTOR))
            .and_then(|_| server.hid.protocol_mode_set(&PROTOCOL_MODE_REPORT))
            .map_err(|_| BleError::GattFailed)?;

        info!("GATT server ready (HID mouse, battery {}%)", config::BLE_BATTERY_LEVEL);
        Ok(server)
    }

    /// Handle host writes. Nothing here feeds back into the control loop.
    pub fn handle(&self, event: ServerEvent) {
        match event {
            ServerEvent::Bas(BatteryServiceEvent::BatteryLevelCccdWrite { notifications }) => {
                debug!("Battery notifications: {}", notifications);
            }
            ServerEvent::Dis(_) => {}
            ServerEvent::Hid(HidServiceEvent::InputReportCccdWrite { notifications }) => {
                info!("Input report notifications: {}", notifications);
            }
            ServerEvent::Hid(HidServiceEvent::ProtocolModeWrite(mode)) => {
                debug!("Host set protocol mode {=u8}", mode);
            }
            ServerEvent::Hid(HidServiceEvent::ControlPointWrite(cmd)) => {
                debug!("Host control point {=u8}", cmd);
            }
        }
    }
}
