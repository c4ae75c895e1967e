use std::io::{Read, Seek, SeekFrom};

use pcap_parser::{InterfaceDescriptionBlock, Linktype, PcapHeader};

use super::error::PcapSourceError;
use super::layout;

/// Container format of a capture file, told apart by its first four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Legacy,
    Pcapng,
}

impl CaptureFormat {
    /// Peek at the magic and leave `reader` at offset zero.
    ///
    /// # Errors
    /// `PcapSourceError::Io` when fewer than four bytes can be read or the
    /// reader cannot seek back.
    pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<Self, PcapSourceError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        reader.seek(SeekFrom::Start(0))?;
        if magic == layout::PCAPNG_MAGIC {
            Ok(Self::Pcapng)
        } else {
            Ok(Self::Legacy)
        }
    }
}

/// Link type and clock of one capture interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface {
    pub linktype: Linktype,
    units_per_second: u64,
    offset_seconds: i64,
}

impl Default for Interface {
    fn default() -> Self {
        Self {
            linktype: Linktype::ETHERNET,
            units_per_second: layout::MICROS_PER_SECOND,
            offset_seconds: 0,
        }
    }
}

impl Interface {
    /// Legacy files carry one interface in the global header; the magic
    /// tells microsecond and nanosecond stamps apart.
    pub fn from_legacy_header(header: &PcapHeader) -> Self {
        let units_per_second = if header.is_nanosecond_precision() {
            layout::NANOS_PER_SECOND
        } else {
            layout::MICROS_PER_SECOND
        };
        Self {
            linktype: header.network,
            units_per_second,
            offset_seconds: 0,
        }
    }

    /// An unusable `if_tsresol` falls back to microseconds.
    pub fn from_description(idb: &InterfaceDescriptionBlock<'_>) -> Self {
        Self {
            linktype: idb.linktype,
            units_per_second: idb
                .ts_resolution()
                .filter(|units| *units > 0)
                .unwrap_or(layout::MICROS_PER_SECOND),
            offset_seconds: idb.ts_offset(),
        }
    }

    /// Seconds since the epoch for a PCAPNG 64-bit stamp split in two words.
    pub fn ng_seconds(&self, ts_high: u32, ts_low: u32) -> f64 {
        let units = (u64::from(ts_high) << 32) | u64::from(ts_low);
        let whole = units / self.units_per_second;
        let fraction = units % self.units_per_second;
        self.offset_seconds as f64
            + whole as f64
            + fraction as f64 / self.units_per_second as f64
    }

    /// Seconds since the epoch for a legacy record header.
    pub fn legacy_seconds(&self, ts_sec: u32, ts_fraction: u32) -> f64 {
        f64::from(ts_sec) + f64::from(ts_fraction) / self.units_per_second as f64
    }
}

/// Interfaces of a PCAPNG section, indexed by the id packets refer to.
#[derive(Debug, Default)]
pub struct InterfaceTable {
    interfaces: Vec<Interface>,
}

impl InterfaceTable {
    pub fn push(&mut self, interface: Interface) {
        self.interfaces.push(interface);
    }

    /// A packet naming an undeclared interface is read as Ethernet with
    /// microsecond stamps.
    pub fn get(&self, if_id: u32) -> Interface {
        self.interfaces
            .get(if_id as usize)
            .copied()
            .unwrap_or_default()
    }
}
