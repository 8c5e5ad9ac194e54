// Licensed under the Apache-2.0 license

use crate::error::FieldError;
use bitfield::bitfield;
use log::trace;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Type/length byte value marking the end of an area's field list.
pub const END_OF_FIELDS: u8 = 0xC1;

pub const ENCODING_HEX: u8 = 0;
pub const ENCODING_TEXT: u8 = 3;
pub const ENCODING_INTEGER: u8 = 4;
pub const ENCODING_RAW: u8 = 5;

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct TypeLength(u8);
    impl Debug;
    pub u8, length, _: 5, 0;
    pub u8, encoding, _: 7, 6;
}

impl TypeLength {
    pub fn is_end_of_fields(&self) -> bool {
        self.0 == END_OF_FIELDS
    }
}

/// How the bytes of a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Text,
    Integer,
    Raw,
}

impl From<u8> for Encoding {
    fn from(value: u8) -> Self {
        match value {
            ENCODING_TEXT => Encoding::Text,
            ENCODING_INTEGER => Encoding::Integer,
            ENCODING_RAW => Encoding::Raw,
            _ => Encoding::Hex,
        }
    }
}

/// One slot of a field schema.
///
/// A slot without a `length` is self-describing: its shape comes from a
/// type/length byte read at the cursor. Unnamed slots are consumed but not
/// reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: Option<String>,
    pub length: Option<u8>,
    pub encoding: Option<u8>,
}

impl FieldSlot {
    pub fn fixed(name: &str, length: u8, encoding: u8) -> Self {
        FieldSlot {
            name: Some(name.to_string()),
            length: Some(length),
            encoding: Some(encoding),
        }
    }

    pub fn typed(name: &str) -> Self {
        FieldSlot {
            name: Some(name.to_string()),
            length: None,
            encoding: None,
        }
    }

    pub fn padding(length: u8, encoding: u8) -> Self {
        FieldSlot {
            name: None,
            length: Some(length),
            encoding: Some(encoding),
        }
    }
}

/// Whether a schema ends with its declared slots or continues with an
/// unbounded list of self-describing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    slots: Vec<FieldSlot>,
    tail: Tail,
}

impl Schema {
    pub fn new(tail: Tail) -> Self {
        Schema {
            slots: Vec::new(),
            tail,
        }
    }

    pub fn closed() -> Self {
        Self::new(Tail::Closed)
    }

    pub fn open() -> Self {
        Self::new(Tail::Open)
    }

    pub fn slot(mut self, slot: FieldSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn fixed(self, name: &str, length: u8, encoding: u8) -> Self {
        self.slot(FieldSlot::fixed(name, length, encoding))
    }

    pub fn typed(self, name: &str) -> Self {
        self.slot(FieldSlot::typed(name))
    }

    pub fn padding(self, length: u8, encoding: u8) -> Self {
        self.slot(FieldSlot::padding(length, encoding))
    }

    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    pub fn tail(&self) -> Tail {
        self.tail
    }
}

/// A decoded leaf (or, for split fields such as `pcieinfo`, a group of
/// leaves).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Raw(Vec<u8>),
    Integer(u32),
    Text(String),
    Hex(String),
    Group(FieldMap),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Hex(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u32> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Group(map) => Some(map),
            _ => None,
        }
    }
}

/// Field name to value, kept in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` unless `name` is already present; the first write
    /// wins. Returns whether the value was stored.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> bool {
        let name = name.into();
        if self.contains_key(&name) {
            return false;
        }
        self.entries.push((name, value));
        true
    }

    /// Replaces the value of an existing entry in place.
    pub(crate) fn replace(&mut self, name: &str, value: FieldValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(key, _)| key == name) {
            entry.1 = value;
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl Serialize for FieldMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Result of running a schema over a window of the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFields {
    pub fields: FieldMap,
    /// Values of the open tail, in order.
    pub extras: Vec<FieldValue>,
    /// Absolute offset just past the last consumed byte.
    pub end: usize,
}

/// Decodes the fields described by `schema` starting at `cursor`.
///
/// `buffer` is the window the fields must fit in; offsets are indices into
/// it. A type/length byte of [`END_OF_FIELDS`] stops the decode wherever it
/// appears. An open tail also stops when the window is exhausted.
pub fn decode_fields(
    buffer: &[u8],
    cursor: usize,
    schema: &Schema,
) -> Result<DecodedFields, FieldError> {
    let mut decoded = DecodedFields {
        end: cursor,
        ..Default::default()
    };
    let mut cursor = cursor;

    for slot in schema.slots() {
        let (length, encoding) = match slot.length {
            Some(length) => (length as usize, Encoding::from(slot.encoding.unwrap_or(0))),
            None => {
                let type_length = read_type_length(buffer, cursor)?;
                cursor += 1;
                if type_length.is_end_of_fields() {
                    decoded.end = cursor;
                    return Ok(decoded);
                }
                (
                    type_length.length() as usize,
                    Encoding::from(type_length.encoding()),
                )
            }
        };

        let value = read_value(buffer, cursor, length, encoding)?;
        trace!(
            "field {:?} at {:#x}: {:?}",
            slot.name.as_deref().unwrap_or("-"),
            cursor,
            value
        );
        cursor += length;
        if let Some(name) = &slot.name {
            decoded.fields.insert(name.clone(), value);
        }
    }

    if schema.tail() == Tail::Open {
        while cursor < buffer.len() {
            let type_length = TypeLength(buffer[cursor]);
            cursor += 1;
            if type_length.is_end_of_fields() {
                break;
            }
            let length = type_length.length() as usize;
            let value = read_value(buffer, cursor, length, type_length.encoding().into())?;
            trace!("extra field at {:#x}: {:?}", cursor, value);
            cursor += length;
            decoded.extras.push(value);
        }
    }

    decoded.end = cursor;
    Ok(decoded)
}

fn read_type_length(buffer: &[u8], offset: usize) -> Result<TypeLength, FieldError> {
    buffer
        .get(offset)
        .map(|&byte| TypeLength(byte))
        .ok_or(FieldError::BufferTooShort {
            offset,
            length: 1,
            available: buffer.len(),
        })
}

fn read_value(
    buffer: &[u8],
    offset: usize,
    length: usize,
    encoding: Encoding,
) -> Result<FieldValue, FieldError> {
    let bytes = offset
        .checked_add(length)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(FieldError::BufferTooShort {
            offset,
            length,
            available: buffer.len(),
        })?;

    let value = match encoding {
        Encoding::Raw => FieldValue::Raw(bytes.to_vec()),
        Encoding::Integer => {
            if !(1..=4).contains(&length) {
                return Err(FieldError::IntegerWidth { offset, length });
            }
            FieldValue::Integer(le_integer(bytes))
        }
        Encoding::Text => FieldValue::Text(decode_text(bytes)),
        Encoding::Hex => FieldValue::Hex(hex::encode(bytes)),
    };
    Ok(value)
}

/// Little-endian integer of up to four bytes.
pub(crate) fn le_integer(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .rev()
        .fold(0u32, |acc, &byte| (acc << 8) | byte as u32)
}

/// 8-bit ASCII + Latin-1 text with NUL padding and surrounding whitespace
/// removed.
fn decode_text(bytes: &[u8]) -> String {
    let text: String = bytes.iter().map(|&byte| byte as char).collect();
    text.trim_matches('\0').trim().to_string()
}
