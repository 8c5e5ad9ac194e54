// Licensed under the Apache-2.0 license

//! Builders for synthetic FRU images used as test fixtures.
//!
//! The header layout constants and checksum helpers are restated here
//! rather than imported from `fru-common`. `fru-common` pulls this crate in
//! as a dev-dependency, and fixtures built from their own copy of the
//! format do not share mistakes with the decoder under test.

const COMMON_HEADER_LEN: usize = 8;
const OFFSET_UNIT: usize = 8;
const END_OF_FIELDS: u8 = 0xC1;
const MAX_FIELD_LEN: usize = 0x3F;
const MAX_AREA_UNITS: usize = u8::MAX as usize;

pub const ENCODING_HEX: u8 = 0;
pub const ENCODING_TEXT: u8 = 3;

/// Wrapping byte sum of `bytes`.
pub fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte))
}

/// The checksum byte that makes `bytes` sum to zero.
pub fn zero_checksum(bytes: &[u8]) -> u8 {
    0u8.wrapping_sub(byte_sum(bytes))
}

/// Builds a chassis, board or product info area.
#[derive(Debug, Clone, Default)]
pub struct InfoAreaBuilder {
    body: Vec<u8>,
}

impl InfoAreaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends bytes with no type/length prefix, as used by the leading
    /// fixed-width fields (language, date, chassis type).
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Appends a type/length prefixed field. Data beyond 63 bytes is dropped.
    pub fn field(mut self, encoding: u8, data: &[u8]) -> Self {
        let data = &data[..data.len().min(MAX_FIELD_LEN)];
        self.body.push(((encoding & 0x3) << 6) | data.len() as u8);
        self.body.extend_from_slice(data);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.field(ENCODING_TEXT, text.as_bytes())
    }

    /// A binary field, rendered as hex by the decoder.
    pub fn hex(self, data: &[u8]) -> Self {
        self.field(ENCODING_HEX, data)
    }

    /// Terminates the field list, pads to a whole number of units and
    /// appends the area checksum. Returns `None` if the area would exceed
    /// 255 units.
    pub fn build(self) -> Option<Vec<u8>> {
        let mut area = vec![0x01, 0x00];
        area.extend(self.body);
        area.push(END_OF_FIELDS);
        let units = (area.len() + 1).div_ceil(OFFSET_UNIT);
        if units > MAX_AREA_UNITS {
            return None;
        }
        area.resize(units * OFFSET_UNIT - 1, 0);
        area[1] = units as u8;
        area.push(zero_checksum(&area));
        Some(area)
    }
}

/// A multirecord with valid checksums and format version 2. Payloads longer
/// than 255 bytes are truncated.
pub fn record(type_id: u8, end_of_list: bool, payload: &[u8]) -> Vec<u8> {
    let payload = &payload[..payload.len().min(u8::MAX as usize)];
    let format = if end_of_list { 0x82 } else { 0x02 };
    let mut record = vec![type_id, format, payload.len() as u8, zero_checksum(payload)];
    record.push(zero_checksum(&record));
    record.extend_from_slice(payload);
    record
}

/// Lays out a complete image: common header, then internal use, chassis,
/// board, product and multirecord areas in that order.
#[derive(Debug, Clone, Default)]
pub struct FruImageBuilder {
    internal_use: Option<Vec<u8>>,
    chassis: Option<Vec<u8>>,
    board: Option<Vec<u8>>,
    product: Option<Vec<u8>>,
    records: Vec<Vec<u8>>,
}

impl FruImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Internal use data, without the leading version byte.
    pub fn internal_use(mut self, data: &[u8]) -> Self {
        let mut area = vec![0x01];
        area.extend_from_slice(data);
        self.internal_use = Some(area);
        self
    }

    pub fn chassis(mut self, area: Vec<u8>) -> Self {
        self.chassis = Some(area);
        self
    }

    pub fn board(mut self, area: Vec<u8>) -> Self {
        self.board = Some(area);
        self
    }

    pub fn product(mut self, area: Vec<u8>) -> Self {
        self.product = Some(area);
        self
    }

    pub fn record(mut self, record: Vec<u8>) -> Self {
        self.records.push(record);
        self
    }

    /// Returns `None` if an area would start beyond the reach of the
    /// header's one-byte offsets.
    pub fn build(self) -> Option<Vec<u8>> {
        let mut image = vec![0u8; COMMON_HEADER_LEN];
        image[0] = 0x01;

        let areas = [self.internal_use, self.chassis, self.board, self.product];
        for (slot, area) in areas.into_iter().enumerate() {
            let Some(mut area) = area else {
                continue;
            };
            image[slot + 1] = offset_units(image.len())?;
            area.resize(area.len().div_ceil(OFFSET_UNIT) * OFFSET_UNIT, 0);
            image.extend(area);
        }
        if !self.records.is_empty() {
            image[5] = offset_units(image.len())?;
            image.extend(self.records.concat());
        }

        image[7] = zero_checksum(&image[..7]);
        Some(image)
    }
}

fn offset_units(offset: usize) -> Option<u8> {
    u8::try_from(offset / OFFSET_UNIT).ok()
}
