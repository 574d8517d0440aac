//! BLE session task - advertising, connection serving, report forwarding.
//!
//! States:
//!
//! ```text
//!   Idle ──Begin──▶ Advertising ──host──▶ Connected
//!    ▲                  │ End                │ End / link loss
//!    └──────────────────┴────────────────────┘
//! ```
//!
//! A lost link drops back to Idle on purpose: the control loop notices the
//! edge and restarts the session with End + Begin.

use super::security::Bonder;
use super::server::Server;
use super::{BleCommand, COMMAND_QUEUE, LINK_UP, REPORT_QUEUE};
use ble_jiggler::ble::adv_data;
use ble_jiggler::config;
use ble_jiggler::hid::MouseReport;
use ble_jiggler::BleError;
use core::sync::atomic::Ordering;
use defmt::{info, warn};
use embassy_futures::select::{select, select3, Either, Either3};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_time::Timer;
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::Softdevice;

type Commands = Receiver<'static, CriticalSectionRawMutex, BleCommand, COMMAND_QUEUE>;
type Reports = Receiver<'static, CriticalSectionRawMutex, MouseReport, REPORT_QUEUE>;

/// Run the session state machine forever.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static Server,
    bonder: &'static Bonder,
    commands: Commands,
    reports: Reports,
) -> ! {
    let adv_data = adv_data::build(config::BLE_DEVICE_NAME, config::BLE_APPEARANCE_MOUSE);
    let scan_data = adv_data::build_scan_response(config::BLE_DEVICE_NAME);

    let adv_config = peripheral::Config {
        interval: config::BLE_ADV_INTERVAL,
        ..Default::default()
    };

    loop {
        wait_for(&commands, BleCommand::Begin).await;
        info!("BLE: advertising as {}", config::BLE_DEVICE_NAME);

        let conn = loop {
            let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
                adv_data: &adv_data,
                scan_data: &scan_data,
            };
            let advertise = peripheral::advertise_pairable(sd, adv, &adv_config, bonder);

            match select(advertise, wait_for(&commands, BleCommand::End)).await {
                Either::First(Ok(conn)) => break Some(conn),
                Either::First(Err(e)) => {
                    warn!("BLE: {} ({})", BleError::AdvertiseFailed, e);
                    Timer::after_millis(config::BLE_ADV_RETRY_MS).await;
                }
                Either::Second(()) => break None,
            }
        };

        let Some(conn) = conn else {
            info!("BLE: session ended before a host connected");
            continue;
        };

        // Moves queued for an earlier connection are stale.
        while reports.try_receive().is_ok() {}
        LINK_UP.store(true, Ordering::Release);

        let served = gatt_server::run(&conn, server, |e| server.handle(e));
        let forwarded = forward_reports(&conn, server, &reports);
        let ended = wait_for(&commands, BleCommand::End);

        match select3(served, forwarded, ended).await {
            Either3::First(_) => info!("BLE: host disconnected"),
            Either3::Second(()) => {}
            Either3::Third(()) => {
                info!("BLE: session ended - dropping host");
                let _ = conn.disconnect();
            }
        }

        LINK_UP.store(false, Ordering::Release);
    }
}

/// Discard commands until `wanted` arrives.
async fn wait_for(commands: &Commands, wanted: BleCommand) {
    while commands.receive().await != wanted {}
}

/// Notify every queued input report to the host.
async fn forward_reports(conn: &Connection, server: &Server, reports: &Reports) {
    loop {
        let report = reports.receive().await;
        let bytes = report.to_bytes();

        // Notifications fail until the host enables the CCCD; keep the value
        // readable in that case.
        if server.hid.input_report_notify(conn, &bytes).is_err() {
            warn!("BLE: {}", BleError::NotifyFailed);
            let _ = server.hid.input_report_set(&bytes);
        }
    }
}
