// Licensed under the Apache-2.0 license

//! Decoder for IPMI Platform Management FRU Information Storage images.
//!
//! The entry point is [`decode_fru`], which turns a raw EEPROM image into a
//! [`FruDocument`]. Vendor record sets are layered on top of the standard
//! multirecord templates through a [`TemplateRegistry`] handed to
//! [`FruDecoder`]; see [`xilinx`] for an example profile.

pub mod area;
pub mod checksum;
pub mod codec;
pub mod document;
pub mod error;
pub mod field;
pub mod header;
pub mod internal;
pub mod multirecord;
pub mod record;
pub mod registry;
pub mod xilinx;

pub use area::{decode_board, decode_chassis, decode_product, AreaKind, InfoArea};
pub use document::{decode_fru, FruDecoder, FruDocument};
pub use error::{Area, FruError};
pub use field::{FieldMap, FieldSlot, FieldValue, Schema, Tail};
pub use header::CommonHeader;
pub use internal::{decode_internal_use, InternalUseArea};
pub use multirecord::{decode_multirecord, MultirecordArea};
pub use record::{DecodedRecord, RecordTemplate};
pub use registry::TemplateRegistry;
