//! Bonded-host records, kept in a flat byte layout so they survive a reset.
//!
//! Each record holds what the SoftDevice hands over when a host bonds (the
//! master ID, the long-term key and the host's identity) plus the host's
//! GATT system attributes, i.e. its CCCD subscriptions. Restoring those on
//! reconnect is what keeps input report notifications enabled for a host
//! that never rewrites them.
//!
//! Blob layout (little-endian):
//!
//! ```text
//! [version][count]
//! per record: [ediv:2][rand:8][ltk:16][key flags:1][irk:16][addr kind:1]
//!             [addr:6][attrs len:1][attrs...]
//! ```

use crate::config::BLE_MAX_BONDS;
use crate::error::Error;
use heapless::Vec;

/// Upper bound for one host's system attribute blob.
pub const SYS_ATTRS_MAX: usize = 64;

const LAYOUT_VERSION: u8 = 1;
const HEADER_LEN: usize = 2;
const FIXED_LEN: usize = 2 + 8 + 16 + 1 + 16 + 1 + 6 + 1;

/// Size of the largest possible serialized table.
pub const TABLE_BYTES_MAX: usize = HEADER_LEN + BLE_MAX_BONDS * (FIXED_LEN + SYS_ATTRS_MAX);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BondRecord {
    pub ediv: u16,
    pub rand: [u8; 8],
    pub ltk: [u8; 16],
    pub key_flags: u8,
    pub irk: [u8; 16],
    pub addr_kind: u8,
    pub addr: [u8; 6],
    pub sys_attrs: Vec<u8, SYS_ATTRS_MAX>,
}

impl BondRecord {
    fn encoded_len(&self) -> usize {
        FIXED_LEN + self.sys_attrs.len()
    }

    /// Same host identity (address and IRK), regardless of keys.
    fn same_host(&self, other: &BondRecord) -> bool {
        self.addr_kind == other.addr_kind && self.addr == other.addr && self.irk == other.irk
    }

    fn encode(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.ediv.to_le_bytes());
        out[2..10].copy_from_slice(&self.rand);
        out[10..26].copy_from_slice(&self.ltk);
        out[26] = self.key_flags;
        out[27..43].copy_from_slice(&self.irk);
        out[43] = self.addr_kind;
        out[44..50].copy_from_slice(&self.addr);
        out[50] = self.sys_attrs.len() as u8;
        out[FIXED_LEN..self.encoded_len()].copy_from_slice(&self.sys_attrs);
    }

    /// Parse one record; returns it with the number of bytes consumed.
    fn decode(data: &[u8]) -> Option<(Self, usize)> {
        if data.len() < FIXED_LEN {
            return None;
        }
        let attrs_len = data[50] as usize;
        let total = FIXED_LEN + attrs_len;
        if attrs_len > SYS_ATTRS_MAX || data.len() < total {
            return None;
        }

        let mut record = BondRecord {
            ediv: u16::from_le_bytes([data[0], data[1]]),
            key_flags: data[26],
            addr_kind: data[43],
            ..BondRecord::default()
        };
        record.rand.copy_from_slice(&data[2..10]);
        record.ltk.copy_from_slice(&data[10..26]);
        record.irk.copy_from_slice(&data[27..43]);
        record.addr.copy_from_slice(&data[44..50]);
        record.sys_attrs.extend_from_slice(&data[FIXED_LEN..total]).ok()?;
        Some((record, total))
    }
}

/// Bonded hosts, oldest first, with a dirty flag for the flash writer.
#[derive(Clone, Debug, Default)]
pub struct BondTable {
    records: Vec<BondRecord, BLE_MAX_BONDS>,
    dirty: bool,
}

impl BondTable {
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BondRecord] {
        &self.records
    }

    /// Add a freshly bonded host. A host that bonds again replaces its old
    /// record; a full table drops its oldest entry.
    pub fn insert(&mut self, record: BondRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.same_host(&record)) {
            *existing = record;
        } else {
            if self.records.is_full() {
                self.records.remove(0);
            }
            let _ = self.records.push(record);
        }
        self.dirty = true;
    }

    /// Index of the first record matching `pred`.
    pub fn position(&self, pred: impl FnMut(&BondRecord) -> bool) -> Option<usize> {
        self.records.iter().position(pred)
    }

    /// Record whose master ID matches, used to hand the LTK back on
    /// re-encryption.
    pub fn find_key(&self, ediv: u16, rand: &[u8; 8]) -> Option<&BondRecord> {
        self.records
            .iter()
            .find(|r| r.ediv == ediv && &r.rand == rand)
    }

    /// Replace the system attributes of record `index`. Only an actual
    /// change marks the table dirty.
    pub fn set_sys_attrs(&mut self, index: usize, attrs: &[u8]) -> Result<(), Error> {
        let Some(record) = self.records.get_mut(index) else {
            return Ok(());
        };
        if record.sys_attrs.as_slice() == attrs {
            return Ok(());
        }
        let mut fresh = Vec::new();
        fresh.extend_from_slice(attrs).map_err(|_| Error::Storage)?;
        record.sys_attrs = fresh;
        self.dirty = true;
        Ok(())
    }

    /// `true` once after every change.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    pub fn serialize(&self, out: &mut [u8]) -> Result<usize, Error> {
        let total = HEADER_LEN
            + self
                .records
                .iter()
                .map(BondRecord::encoded_len)
                .sum::<usize>();
        if out.len() < total {
            return Err(Error::Storage);
        }

        out[0] = LAYOUT_VERSION;
        out[1] = self.records.len() as u8;
        let mut offset = HEADER_LEN;
        for record in &self.records {
            record.encode(&mut out[offset..]);
            offset += record.encoded_len();
        }
        Ok(offset)
    }

    /// Parse a stored table. Anything malformed is rejected as a whole.
    pub fn deserialize(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_LEN || data[0] != LAYOUT_VERSION {
            return Err(Error::Storage);
        }
        let count = data[1] as usize;
        if count > BLE_MAX_BONDS {
            return Err(Error::Storage);
        }

        let mut table = BondTable::new();
        let mut offset = HEADER_LEN;
        for _ in 0..count {
            let (record, used) = BondRecord::decode(&data[offset..]).ok_or(Error::Storage)?;
            let _ = table.records.push(record);
            offset += used;
        }
        Ok(table)
    }
}
