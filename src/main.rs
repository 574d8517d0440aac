//! ble-jiggler firmware entry point (nRF52840 + S140).
//!
//! Task layout:
//!
//! - `softdevice_task` - SoftDevice event pump (also services flash ops).
//! - `ble_task`        - HID peripheral session (see `ble::peripheral`).
//! - `main`            - the control loop: button → mode → movement, LED,
//!                       link supervision, bond persistence, watchdog.

#![no_std]
#![no_main]

mod ble;

use core::mem;

use ble::security::{self, Bonder};
use ble::server::Server;
use ble::{BleMouse, CommandChannel, ReportChannel};
use ble_jiggler::ble::bond_table::TABLE_BYTES_MAX;
use ble_jiggler::config::{self, KEY_BONDS, LOOP_DELAY_MS, WATCHDOG_TIMEOUT_MS};
use ble_jiggler::link::Transport;
use ble_jiggler::storage::flash::FlashStore;
use ble_jiggler::ui::StatusLed;
use ble_jiggler::Controller;
use defmt::{error, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::wdt::{self, Watchdog};
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Instant, Timer};
use nrf_softdevice::{raw, Softdevice};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

// ═══════════════════════════════════════════════════════════════════════════
// Inter-task plumbing
// ═══════════════════════════════════════════════════════════════════════════

static COMMANDS: CommandChannel = Channel::new();
static REPORTS: ReportChannel = Channel::new();
static SERVER: StaticCell<Server> = StaticCell::new();

/// Watchdog runs off the 32.768 kHz LFCLK.
const WDT_TICKS_PER_SEC: u32 = 32_768;

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server, bonder: &'static Bonder) -> ! {
    ble::peripheral::run(sd, server, bonder, COMMANDS.receiver(), REPORTS.receiver()).await
}

fn softdevice_config() -> nrf_softdevice::Config {
    let name = config::BLE_DEVICE_NAME;
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: name.as_ptr() as _,
            current_len: name.len() as u16,
            max_len: name.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Seed the movement RNG from the SoftDevice entropy pool.
fn movement_rng(sd: &Softdevice) -> ChaCha8Rng {
    let mut seed = [0u8; 32];
    match nrf_softdevice::random_bytes(sd, &mut seed) {
        Ok(()) => ChaCha8Rng::from_seed(seed),
        Err(_) => {
            warn!("SoftDevice entropy not ready - seeding from uptime");
            ChaCha8Rng::seed_from_u64(Instant::now().as_ticks())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Control loop
// ═══════════════════════════════════════════════════════════════════════════

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ble-jiggler starting");

    // The SoftDevice owns interrupt priorities 0, 1 and 4.
    let mut hal_config = embassy_nrf::config::Config::default();
    hal_config.gpiote_interrupt_priority = Priority::P2;
    hal_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(hal_config);

    let mut wdt_config = wdt::Config::default();
    wdt_config.timeout_ticks = WDT_TICKS_PER_SEC * WATCHDOG_TIMEOUT_MS / 1_000;
    wdt_config.action_during_debug_halt = wdt::HaltConfig::PAUSE;
    let (_wdt, [mut wdt_handle]) = match Watchdog::try_new(p.WDT, wdt_config) {
        Ok(x) => x,
        Err(_) => {
            // A watchdog left running by the previous image can't be
            // reconfigured; let it fire.
            warn!("Watchdog already running with another config - waiting for reset");
            loop {
                cortex_m::asm::wfe();
            }
        }
    };

    let sd = Softdevice::enable(&softdevice_config());
    let server = SERVER.init(unwrap!(Server::init(sd)));
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // Flash goes through the SoftDevice, so it is usable once its task runs.
    // Bonds must be in place before the first host can reconnect.
    let mut store = FlashStore::new(nrf_softdevice::Flash::take(sd));
    let mut bond_buf = [0u8; TABLE_BYTES_MAX];
    let bonder = security::bonder();
    match store.get_blob(KEY_BONDS, &mut bond_buf).await {
        Ok(Some(len)) => bonder.restore(&bond_buf[..len]),
        Ok(None) => info!("No stored bonds"),
        Err(e) => warn!("Bond read failed: {}", e),
    }
    unwrap!(spawner.spawn(ble_task(sd, server, bonder)));

    let button = Input::new(p.P0_11, Pull::Up);
    let mut led = StatusLed::new(Output::new(p.P0_13, Level::High, OutputDrive::Standard));

    let mut controller = Controller::boot(&mut store, movement_rng(sd)).await;

    let mut mouse = BleMouse::new(COMMANDS.sender(), REPORTS.sender());
    let mut delay = Delay;
    mouse.begin();

    info!("Control loop running ({} ms period)", LOOP_DELAY_MS);
    loop {
        wdt_handle.pet();

        let now = Instant::now().as_millis();
        let tick = controller
            .tick(now, button.is_high(), &mut mouse, &mut store, &mut delay)
            .await;
        led.show(tick.led_lit);

        if let Some(len) = bonder.take_changes(&mut bond_buf) {
            if let Err(e) = store.put_blob(KEY_BONDS, &bond_buf[..len]).await {
                error!("Could not persist bonds: {}", e);
            }
        }

        Timer::after_millis(LOOP_DELAY_MS).await;
    }
}
