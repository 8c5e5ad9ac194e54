// Licensed under the Apache-2.0 license

use crate::checksum;
use crate::error::{Area, FruError};
use crate::field::{
    decode_fields, le_integer, FieldMap, FieldValue, Schema, ENCODING_INTEGER, ENCODING_RAW,
};
use crate::header::OFFSET_UNIT;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use log::debug;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

const PCI_ID_NAMES: [&str; 4] = ["Vendor_ID", "Device_ID", "SubVendor_ID", "SubDevice_ID"];
const PCI_ID_WIDTH: usize = 4;

/// The three type/length encoded info areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    Chassis,
    Board,
    Product,
}

impl AreaKind {
    pub fn area(&self) -> Area {
        match self {
            AreaKind::Chassis => Area::Chassis,
            AreaKind::Board => Area::Board,
            AreaKind::Product => Area::Product,
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            AreaKind::Chassis => Schema::open()
                .fixed("type", 1, ENCODING_INTEGER)
                .typed("part")
                .typed("serial"),
            AreaKind::Board => Schema::open()
                .fixed("language", 1, ENCODING_INTEGER)
                .fixed("date", 3, ENCODING_RAW)
                .typed("manufacturer")
                .typed("product")
                .typed("serial")
                .typed("part")
                .typed("fileid")
                .typed("revision")
                .typed("pcieinfo")
                .typed("uuid"),
            AreaKind::Product => Schema::open()
                .fixed("language", 1, ENCODING_INTEGER)
                .fixed("date", 3, ENCODING_RAW)
                .typed("manufacturer")
                .typed("product")
                .typed("part")
                .typed("version")
                .typed("serial")
                .typed("asset")
                .typed("fileid"),
        }
    }
}

/// A decoded chassis, board or product info area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoArea {
    pub kind: AreaKind,
    pub version: u8,
    pub offset: usize,
    /// Area length in bytes, checksum included.
    pub length: usize,
    pub fields: FieldMap,
    /// Custom fields following the named ones.
    pub extras: Vec<FieldValue>,
}

impl InfoArea {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Manufacturing date in minutes since 1996-01-01 00:00 UTC.
    pub fn manufacture_minutes(&self) -> Option<u32> {
        self.get("date").and_then(FieldValue::as_integer)
    }

    pub fn manufacture_datetime(&self) -> Option<DateTime<Utc>> {
        self.manufacture_minutes().and_then(minutes_to_datetime)
    }
}

impl Serialize for InfoArea {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.extras.len()))?;
        for (key, value) in self.fields.iter() {
            map.serialize_entry(key, value)?;
        }
        for (index, value) in self.extras.iter().enumerate() {
            map.serialize_entry(&format!("extra{}", index + 1), value)?;
        }
        map.end()
    }
}

/// Converts an IPMI manufacturing timestamp to a UTC date.
pub fn minutes_to_datetime(minutes: u32) -> Option<DateTime<Utc>> {
    let epoch = NaiveDate::from_ymd_opt(1996, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let epoch = DateTime::from_naive_utc_and_offset(epoch, Utc);
    epoch.checked_add_signed(TimeDelta::try_minutes(minutes as i64)?)
}

pub fn decode_chassis(buffer: &[u8], offset: usize) -> Result<InfoArea, FruError> {
    decode_info_area(buffer, offset, AreaKind::Chassis)
}

pub fn decode_board(buffer: &[u8], offset: usize) -> Result<InfoArea, FruError> {
    decode_info_area(buffer, offset, AreaKind::Board)
}

pub fn decode_product(buffer: &[u8], offset: usize) -> Result<InfoArea, FruError> {
    decode_info_area(buffer, offset, AreaKind::Product)
}

/// Decodes an info area: version byte, length in 8-byte units, the fields
/// of `kind`'s schema, and a trailing checksum covering the whole area.
pub fn decode_info_area(
    buffer: &[u8],
    offset: usize,
    kind: AreaKind,
) -> Result<InfoArea, FruError> {
    let area = kind.area();
    FruError::ensure(area, buffer, offset, 2)?;
    let version = buffer[offset];
    let length = buffer[offset + 1] as usize * OFFSET_UNIT;
    checksum::validate(buffer, offset, length, 0).map_err(FruError::checksum(area, offset))?;

    // Fields stop short of the trailing checksum byte.
    let window = &buffer[..offset + length.saturating_sub(1)];
    let decoded =
        decode_fields(window, offset + 2, &kind.schema()).map_err(FruError::field(area, offset))?;

    let mut info = InfoArea {
        kind,
        version,
        offset,
        length,
        fields: decoded.fields,
        extras: decoded.extras,
    };

    if let Some(date) = info.fields.get("date").and_then(FieldValue::as_bytes) {
        let minutes = le_integer(date);
        info.fields.replace("date", FieldValue::Integer(minutes));
    }
    if kind == AreaKind::Board {
        if let Some(split) = info.fields.get("pcieinfo").and_then(split_pci_ids) {
            info.fields.replace("pcieinfo", split);
        }
    }

    debug!(
        "{} area at {:#x}: {} bytes, {} fields, {} extras",
        area,
        offset,
        length,
        info.fields.len(),
        info.extras.len()
    );
    Ok(info)
}

/// Splits a non-empty PCIe info field into its four IDs. Each ID is a
/// 4-unit slice of the parent rendering and keeps the parent's variant.
fn split_pci_ids(value: &FieldValue) -> Option<FieldValue> {
    let slice_str = |s: &str, index: usize| -> String {
        s.chars()
            .skip(index * PCI_ID_WIDTH)
            .take(PCI_ID_WIDTH)
            .collect()
    };

    let mut group = FieldMap::new();
    for (index, name) in PCI_ID_NAMES.iter().enumerate() {
        let part = match value {
            FieldValue::Raw(bytes) if !bytes.is_empty() => FieldValue::Raw(
                bytes
                    .iter()
                    .skip(index * PCI_ID_WIDTH)
                    .take(PCI_ID_WIDTH)
                    .copied()
                    .collect(),
            ),
            FieldValue::Hex(s) if !s.is_empty() => FieldValue::Hex(slice_str(s, index)),
            FieldValue::Text(s) if !s.is_empty() => FieldValue::Text(slice_str(s, index)),
            _ => return None,
        };
        group.insert(*name, part);
    }
    Some(FieldValue::Group(group))
}
