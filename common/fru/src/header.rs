// Licensed under the Apache-2.0 license

use crate::checksum;
use crate::codec::FruCodec;
use crate::error::{Area, FruError};
use log::debug;
use serde::Serialize;
use zerocopy::{FromBytes, Immutable, KnownLayout};

pub const COMMON_HEADER_LEN: usize = 8;

/// Area offsets in the common header are stored in multiples of 8 bytes.
pub const OFFSET_UNIT: usize = 8;

#[repr(C)]
#[derive(Debug, FromBytes, Immutable, KnownLayout)]
struct CommonHeaderRaw {
    version: u8,
    internal_offset: u8,
    chassis_offset: u8,
    board_offset: u8,
    product_offset: u8,
    multirecord_offset: u8,
    _reserved: u8,
    _checksum: u8,
}

/// The decoded 8-byte common header. Offsets are absolute byte positions; 0
/// means the area is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommonHeader {
    pub version: u8,
    pub internal_offset: usize,
    pub chassis_offset: usize,
    pub board_offset: usize,
    pub product_offset: usize,
    pub multirecord_offset: usize,
}

impl CommonHeader {
    pub fn decode(buffer: &[u8]) -> Result<Self, FruError> {
        FruError::ensure(Area::CommonHeader, buffer, 0, COMMON_HEADER_LEN)?;
        checksum::validate(buffer, 0, COMMON_HEADER_LEN, 0)
            .map_err(FruError::checksum(Area::CommonHeader, 0))?;

        let raw = CommonHeaderRaw::decode_at(buffer, 0).map_err(|_| FruError::BufferTooShort {
            area: Area::CommonHeader,
            offset: 0,
            needed: COMMON_HEADER_LEN,
            available: buffer.len(),
        })?;

        let header = CommonHeader {
            version: raw.version,
            internal_offset: raw.internal_offset as usize * OFFSET_UNIT,
            chassis_offset: raw.chassis_offset as usize * OFFSET_UNIT,
            board_offset: raw.board_offset as usize * OFFSET_UNIT,
            product_offset: raw.product_offset as usize * OFFSET_UNIT,
            multirecord_offset: raw.multirecord_offset as usize * OFFSET_UNIT,
        };
        debug!("common header: {:?}", header);
        Ok(header)
    }

    /// Offsets of the areas that are present, in ascending order.
    pub fn areas(&self) -> Vec<(Area, usize)> {
        let mut areas: Vec<(Area, usize)> = [
            (Area::InternalUse, self.internal_offset),
            (Area::Chassis, self.chassis_offset),
            (Area::Board, self.board_offset),
            (Area::Product, self.product_offset),
            (Area::Multirecord, self.multirecord_offset),
        ]
        .into_iter()
        .filter(|&(_, offset)| offset != 0)
        .collect();
        areas.sort_by_key(|&(_, offset)| offset);
        areas
    }

    /// The first present area that starts after `offset`.
    pub fn next_area_after(&self, offset: usize) -> Option<usize> {
        self.areas()
            .into_iter()
            .map(|(_, start)| start)
            .find(|&start| start > offset)
    }
}
