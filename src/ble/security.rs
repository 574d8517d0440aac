//! Just-works pairing and bonding for the HID link.
//!
//! Most hosts refuse HID input from an unencrypted link, so the
//! peripheral advertises as pairable and keeps the resulting long-term keys
//! for reconnects. A bonded host also keeps its CCCD subscriptions across
//! connections and never rewrites them, so the GATT system attributes are
//! saved on disconnect and restored on the next connection.
//!
//! The table lives in RAM and is mirrored to flash by the control loop
//! (see [`Bonder::take_changes`]).

use core::cell::RefCell;

use ble_jiggler::ble::bond_table::{BondRecord, BondTable, SYS_ATTRS_MAX};
use defmt::{info, warn};
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    gatt_server, Address, AddressType, Connection, EncryptionInfo, IdentityKey,
    IdentityResolutionKey, MasterId, SecurityMode,
};
use nrf_softdevice::raw;
use static_cell::StaticCell;

pub struct Bonder {
    table: RefCell<BondTable>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            table: RefCell::new(BondTable::new()),
        }
    }

    /// Load the table read back from flash.
    pub fn restore(&self, data: &[u8]) {
        match BondTable::deserialize(data) {
            Ok(table) => {
                info!("Restored {} bond(s)", table.len());
                *self.table.borrow_mut() = table;
            }
            Err(_) => warn!("Stored bond table unreadable - hosts must pair again"),
        }
    }

    /// Serialize the table into `buf` if it changed since the last call.
    pub fn take_changes(&self, buf: &mut [u8]) -> Option<usize> {
        let mut table = self.table.borrow_mut();
        if !table.take_dirty() {
            return None;
        }
        match table.serialize(buf) {
            Ok(len) => Some(len),
            Err(_) => {
                warn!("Bond table does not fit its buffer");
                None
            }
        }
    }

    fn peer_index(table: &BondTable, conn: &Connection) -> Option<usize> {
        let addr = conn.peer_address();
        table.position(|r| identity(r).is_match(addr))
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let record = BondRecord {
            ediv: master_id.ediv,
            rand: master_id.rand,
            ltk: key.ltk,
            key_flags: key.flags,
            irk: peer_id.irk.as_raw().irk,
            addr_kind: address_kind(peer_id.addr.address_type()),
            addr: peer_id.addr.bytes(),
            ..BondRecord::default()
        };

        let mut table = self.table.borrow_mut();
        table.insert(record);
        info!("Bonded with host ({} stored)", table.len());
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.table
            .borrow()
            .find_key(master_id.ediv, &master_id.rand)
            .map(|r| EncryptionInfo {
                ltk: r.ltk,
                flags: r.key_flags,
            })
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }

    fn save_sys_attrs(&self, conn: &Connection) {
        let mut table = self.table.borrow_mut();
        let Some(index) = Self::peer_index(&table, conn) else {
            return;
        };

        let mut attrs = [0u8; SYS_ATTRS_MAX];
        let len = match gatt_server::get_sys_attrs(conn, &mut attrs) {
            Ok(len) => len,
            Err(_) => {
                warn!("Could not read host CCCD state");
                return;
            }
        };
        if table.set_sys_attrs(index, &attrs[..len]).is_err() {
            warn!("Host CCCD state too large ({} bytes)", len);
        }
    }

    fn load_sys_attrs(&self, conn: &Connection) {
        let table = self.table.borrow();
        let attrs = Self::peer_index(&table, conn)
            .map(|i| table.records()[i].sys_attrs.as_slice())
            .filter(|a| !a.is_empty());

        if gatt_server::set_sys_attrs(conn, attrs).is_err() {
            warn!("Could not restore host CCCD state");
        }
    }
}

fn identity(record: &BondRecord) -> IdentityKey {
    IdentityKey {
        irk: IdentityResolutionKey::from_raw(raw::ble_gap_irk_t { irk: record.irk }),
        addr: Address::new(address_type(record.addr_kind), record.addr),
    }
}

fn address_kind(kind: AddressType) -> u8 {
    match kind {
        AddressType::Public => 0,
        AddressType::RandomStatic => 1,
        AddressType::RandomPrivateResolvable => 2,
        AddressType::RandomPrivateNonResolvable => 3,
        AddressType::Anonymous => 4,
    }
}

fn address_type(kind: u8) -> AddressType {
    match kind {
        0 => AddressType::Public,
        2 => AddressType::RandomPrivateResolvable,
        3 => AddressType::RandomPrivateNonResolvable,
        4 => AddressType::Anonymous,
        _ => AddressType::RandomStatic,
    }
}

/// The single bond table. Call once.
pub fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new())
}
