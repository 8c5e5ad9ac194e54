// Licensed under the Apache-2.0 license

use crate::checksum;
use crate::codec::FruCodec;
use crate::error::{Area, FruError};
use crate::field::{decode_fields, FieldMap, Schema, ENCODING_HEX};
use bitfield::bitfield;
use log::trace;
use zerocopy::{FromBytes, Immutable, KnownLayout};

pub const RECORD_HEADER_LEN: usize = 5;

/// Newest record format version a template will accept.
pub const MAX_RECORD_VERSION: u8 = 2;

/// Bytes a template inspects before it can tell whether a record is
/// supported; an unsupported version skips exactly these.
pub const VERSION_ESCAPE_SKIP: usize = 2;

pub const POWER_SUPPLY_TYPE: u8 = 0x00;
pub const DC_OUTPUT_TYPE: u8 = 0x01;
pub const DC_LOAD_TYPE: u8 = 0x02;

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct RecordFormat(u8);
    impl Debug;
    pub u8, version, _: 3, 0;
    pub end_of_list, _: 7;
}

#[repr(C)]
#[derive(Debug, FromBytes, Immutable, KnownLayout)]
struct RecordHeaderRaw {
    type_id: u8,
    format: u8,
    record_length: u8,
    record_checksum: u8,
    header_checksum: u8,
}

/// Outcome of asking one template about the record at an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMatch {
    /// Too few bytes remain for another record header.
    EndOfArea,
    /// The record has a different type id.
    Mismatch,
    /// The record uses an unsupported format version; skip this many bytes
    /// and start over.
    Skip(usize),
    Matched { end_of_list: bool },
}

/// A multirecord layout: the type id it answers to and the schema of its
/// payload. A template without a type id is the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTemplate {
    name: Option<String>,
    type_id: Option<u8>,
    schema: Schema,
}

impl RecordTemplate {
    pub fn new(name: &str, type_id: u8, schema: Schema) -> Self {
        RecordTemplate {
            name: Some(name.to_string()),
            type_id: Some(type_id),
            schema,
        }
    }

    /// Matches any record and consumes it without reporting fields.
    pub fn wildcard() -> Self {
        RecordTemplate {
            name: None,
            type_id: None,
            schema: Schema::closed(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn type_id(&self) -> Option<u8> {
        self.type_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_wildcard(&self) -> bool {
        self.type_id.is_none()
    }

    pub fn match_at(&self, buffer: &[u8], offset: usize) -> TemplateMatch {
        if offset.saturating_add(2) >= buffer.len() {
            return TemplateMatch::EndOfArea;
        }

        let type_id = buffer[offset];
        let format = RecordFormat(buffer[offset + 1]);

        if self.type_id.is_some_and(|expected| expected != type_id) {
            return TemplateMatch::Mismatch;
        }
        if format.version() > MAX_RECORD_VERSION {
            return TemplateMatch::Skip(VERSION_ESCAPE_SKIP);
        }
        TemplateMatch::Matched {
            end_of_list: format.end_of_list(),
        }
    }

    /// Decodes the record at `offset` with this template's schema after
    /// validating the header and payload checksums.
    pub fn decode(&self, buffer: &[u8], offset: usize) -> Result<DecodedRecord, FruError> {
        let area = Area::Multirecord;
        let raw = RecordHeaderRaw::decode_at(buffer, offset).map_err(|_| {
            FruError::BufferTooShort {
                area,
                offset,
                needed: RECORD_HEADER_LEN,
                available: buffer.len(),
            }
        })?;
        checksum::validate(buffer, offset, RECORD_HEADER_LEN, 0)
            .map_err(FruError::checksum(area, offset))?;

        let record_offset = offset + RECORD_HEADER_LEN;
        let record_length = raw.record_length as usize;
        checksum::validate(buffer, record_offset, record_length, raw.record_checksum)
            .map_err(FruError::checksum(area, offset))?;

        let decoded = decode_fields(buffer, record_offset, &self.schema)
            .map_err(FruError::field(area, offset))?;

        let format = RecordFormat(raw.format);
        let record = DecodedRecord {
            name: self.name.clone(),
            type_id: raw.type_id,
            version: format.version(),
            end_of_list: format.end_of_list(),
            header_offset: offset,
            record_offset,
            record_length,
            length: record_length + RECORD_HEADER_LEN,
            fields: decoded.fields,
        };
        trace!("record: {:?}", record);
        Ok(record)
    }
}

/// One decoded multirecord entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub name: Option<String>,
    pub type_id: u8,
    pub version: u8,
    pub end_of_list: bool,
    pub header_offset: usize,
    /// Offset of the payload.
    pub record_offset: usize,
    /// Payload length.
    pub record_length: usize,
    /// Header plus payload.
    pub length: usize,
    pub fields: FieldMap,
}

pub fn power_supply() -> RecordTemplate {
    RecordTemplate::new(
        "PowerSupply_Record",
        POWER_SUPPLY_TYPE,
        Schema::closed()
            .fixed("overall_capacity", 2, ENCODING_HEX)
            .fixed("peak_VA", 2, ENCODING_HEX)
            .fixed("inrush_current", 1, ENCODING_HEX)
            .fixed("inrush_interval", 1, ENCODING_HEX)
            .fixed("input_voltage_range_1_low", 2, ENCODING_HEX)
            .fixed("input_voltage_range_1_high", 2, ENCODING_HEX)
            .fixed("input_voltage_range_2_low", 2, ENCODING_HEX)
            .fixed("input_voltage_range_2_high", 2, ENCODING_HEX)
            .fixed("input_frequency_range_low", 1, ENCODING_HEX)
            .fixed("input_frequency_range_high", 1, ENCODING_HEX)
            .fixed("input_dropout_tolerance", 1, ENCODING_HEX)
            .fixed("binary_flag", 1, ENCODING_HEX)
            .fixed("peak_wattage", 2, ENCODING_HEX)
            .fixed("combined_wattage", 3, ENCODING_HEX)
            .fixed("predictive_fail_tachometer", 1, ENCODING_HEX),
    )
}

pub fn dc_output() -> RecordTemplate {
    RecordTemplate::new(
        "DC_Output_Record",
        DC_OUTPUT_TYPE,
        Schema::closed()
            .fixed("output_number", 1, ENCODING_HEX)
            .fixed("nominal_voltage", 2, ENCODING_HEX)
            .fixed("max_negative_voltage", 2, ENCODING_HEX)
            .fixed("max_positive_voltage", 2, ENCODING_HEX)
            .fixed("ripple/noise pk-pk", 2, ENCODING_HEX)
            .fixed("min_mA", 2, ENCODING_HEX)
            .fixed("max_mA", 2, ENCODING_HEX),
    )
}

pub fn dc_load() -> RecordTemplate {
    RecordTemplate::new(
        "DC_Load_Record",
        DC_LOAD_TYPE,
        Schema::closed()
            .fixed("output_number", 1, ENCODING_HEX)
            .fixed("nominal_voltage", 2, ENCODING_HEX)
            .fixed("min_V", 2, ENCODING_HEX)
            .fixed("max_V", 2, ENCODING_HEX)
            .fixed("ripple/noise pk-pk", 2, ENCODING_HEX)
            .fixed("min_mA", 2, ENCODING_HEX)
            .fixed("max_mA", 2, ENCODING_HEX),
    )
}
