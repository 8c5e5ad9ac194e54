// Licensed under the Apache-2.0 license

use crate::error::FruError;
use crate::record::DecodedRecord;
use crate::registry::{Classification, TemplateRegistry};
use log::{debug, warn};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The records of a multirecord area in the order they appear in the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultirecordArea {
    pub offset: usize,
    pub records: Vec<DecodedRecord>,
}

impl MultirecordArea {
    pub fn iter(&self) -> impl Iterator<Item = &DecodedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last record decoded under `name`.
    pub fn get(&self, name: &str) -> Option<&DecodedRecord> {
        self.records
            .iter()
            .rev()
            .find(|record| record.name.as_deref() == Some(name))
    }

    /// Named records keyed by template name. A later record replaces an
    /// earlier one of the same name but keeps its position.
    pub fn named(&self) -> Vec<(&str, &DecodedRecord)> {
        let mut named: Vec<(&str, &DecodedRecord)> = Vec::new();
        for record in &self.records {
            let Some(name) = record.name.as_deref() else {
                continue;
            };
            match named.iter_mut().find(|(key, _)| *key == name) {
                Some(entry) => entry.1 = record,
                None => named.push((name, record)),
            }
        }
        named
    }
}

impl Serialize for MultirecordArea {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let named = self.named();
        let mut map = serializer.serialize_map(Some(named.len()))?;
        for (name, record) in named {
            map.serialize_entry(name, &record.fields)?;
        }
        map.end()
    }
}

/// Walks the multirecord area starting at `offset`.
///
/// At each position the registry picks the first template that claims the
/// record; the record is decoded and the walk advances by its length. An
/// unsupported format version advances by two bytes and the registry is
/// consulted again from its first template. The walk ends after a record
/// with the end-of-list flag or when no further header fits in the image.
pub fn decode_multirecord(
    buffer: &[u8],
    offset: usize,
    registry: &TemplateRegistry,
) -> Result<MultirecordArea, FruError> {
    let mut area = MultirecordArea {
        offset,
        records: Vec::new(),
    };
    let mut offset = offset;

    loop {
        match registry.classify(buffer, offset) {
            Classification::EndOfArea => {
                debug!("multirecord area ends at {:#x} without end-of-list", offset);
                break;
            }
            Classification::Skip(length) => {
                warn!(
                    "skipping {} bytes at {:#x}: unsupported record format version",
                    length, offset
                );
                offset += length;
            }
            Classification::Record { template, .. } => {
                let record = template.decode(buffer, offset)?;
                if template.is_wildcard() {
                    warn!(
                        "unrecognised record type {:#04x} at {:#x} ({} bytes)",
                        record.type_id, offset, record.length
                    );
                } else {
                    debug!(
                        "record {} at {:#x} ({} bytes)",
                        record.name.as_deref().unwrap_or("-"),
                        offset,
                        record.length
                    );
                }
                offset += record.length;
                let end_of_list = record.end_of_list;
                area.records.push(record);
                if end_of_list {
                    break;
                }
            }
        }
    }

    Ok(area)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::field::FieldValue;
    use crate::record::{DC_LOAD_TYPE, DC_OUTPUT_TYPE, POWER_SUPPLY_TYPE};
    use fru_testing_common::record as build_record;

    fn dc_output_payload(output: u8) -> Vec<u8> {
        let mut payload = vec![output, 0xB0, 0x04];
        payload.resize(13, 0x00);
        payload
    }

    #[test]
    fn test_decode_sequence() {
        let mut image = vec![0u8; 16];
        image.extend(build_record(DC_OUTPUT_TYPE, false, &dc_output_payload(1)));
        image.extend(build_record(DC_LOAD_TYPE, true, &[0x02; 13]));
        // Anything after the end-of-list record is never read.
        image.extend([0xFF; 7]);

        let area = decode_multirecord(&image, 16, &TemplateRegistry::standard()).unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.records[0].header_offset, 16);
        assert_eq!(area.records[1].header_offset, 34);
        assert_eq!(
            area.get("DC_Output_Record")
                .and_then(|r| r.fields.get("nominal_voltage")),
            Some(&FieldValue::Hex("b004".to_string()))
        );
        assert!(area.get("DC_Load_Record").unwrap().end_of_list);
    }

    #[test]
    fn test_unknown_record_goes_through_wildcard() {
        let mut image = build_record(0xC0, false, &[0xDE, 0xAD]);
        image.extend(build_record(DC_LOAD_TYPE, true, &[0x00; 13]));

        let area = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.records[0].name, None);
        assert_eq!(area.records[0].type_id, 0xC0);
        assert_eq!(area.records[1].header_offset, 7);
        assert_eq!(area.named().len(), 1);
    }

    #[test]
    fn test_empty_unknown_record_at_end_of_image() {
        let mut image = build_record(DC_LOAD_TYPE, false, &[0x00; 13]);
        image.extend(build_record(0xC0, true, &[]));

        let area = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.records[1].type_id, 0xC0);
        assert_eq!(area.records[1].record_length, 0);
        assert!(area.records[1].end_of_list);
        assert_eq!(area.records[1].header_offset + area.records[1].length, image.len());
    }

    #[test]
    fn test_unsupported_version_skips_two_bytes() {
        // A power supply header claiming format version 3, then a valid
        // record starting two bytes later.
        let mut image = vec![POWER_SUPPLY_TYPE, 0x03];
        image.extend(build_record(DC_LOAD_TYPE, true, &[0x00; 13]));

        let area = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap();
        assert_eq!(area.len(), 1);
        assert_eq!(area.records[0].name.as_deref(), Some("DC_Load_Record"));
        assert_eq!(area.records[0].header_offset, 2);
    }

    #[test]
    fn test_skip_restarts_from_first_template() {
        // After skipping, a power supply record must be found even though the
        // skip was reported by a later template.
        let mut image = vec![DC_LOAD_TYPE, 0x0F];
        let mut payload = vec![0u8; 24];
        payload[0] = 0x64;
        image.extend(build_record(POWER_SUPPLY_TYPE, true, &payload));

        let area = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap();
        assert_eq!(area.len(), 1);
        assert_eq!(area.records[0].name.as_deref(), Some("PowerSupply_Record"));
    }

    #[test]
    fn test_runs_to_end_of_image_without_end_of_list() {
        let mut image = build_record(DC_LOAD_TYPE, false, &[0x00; 13]);
        image.extend(build_record(DC_LOAD_TYPE, false, &[0x01; 13]));
        image.push(0x00);

        let area = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap();
        assert_eq!(area.len(), 2);
        // The later record wins in the name-keyed view.
        assert_eq!(area.named().len(), 1);
        assert_eq!(
            area.get("DC_Load_Record")
                .and_then(|r| r.fields.get("output_number"))
                .and_then(|v| v.as_str()),
            Some("01")
        );
    }

    #[test]
    fn test_garbage_terminates() {
        let image: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(37) | 0x0C).collect();
        let result = decode_multirecord(&image, 0, &TemplateRegistry::standard());
        // Every byte has version nibble >= 0xC, so each position is skipped.
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_checksum_failure_is_fatal() {
        let mut image = build_record(DC_LOAD_TYPE, true, &[0x00; 13]);
        image[7] = 0x01;
        let err = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap_err();
        assert!(err.is_checksum());
    }

    #[test]
    fn test_serialize_named_view() {
        let mut image = build_record(0xC0, false, &[0x00]);
        image.extend(build_record(DC_LOAD_TYPE, true, &[0x00; 13]));
        let area = decode_multirecord(&image, 0, &TemplateRegistry::standard()).unwrap();
        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["DC_Load_Record"]["min_V"], "0000");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}
