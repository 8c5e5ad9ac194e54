// Licensed under the Apache-2.0 license

use crate::area::{decode_board, decode_chassis, decode_product, InfoArea};
use crate::error::FruError;
use crate::header::CommonHeader;
use crate::internal::{decode_internal_use, InternalUseArea};
use crate::multirecord::{decode_multirecord, MultirecordArea};
use crate::record::RecordTemplate;
use crate::registry::TemplateRegistry;
use log::info;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A fully decoded FRU image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FruDocument {
    header: CommonHeader,
    size: usize,
    internal_use: Option<InternalUseArea>,
    chassis: Option<InfoArea>,
    board: Option<InfoArea>,
    product: Option<InfoArea>,
    multirecord: Option<MultirecordArea>,
}

impl FruDocument {
    pub fn header(&self) -> &CommonHeader {
        &self.header
    }

    /// Size of the decoded image in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn internal_use(&self) -> Option<&InternalUseArea> {
        self.internal_use.as_ref()
    }

    pub fn chassis(&self) -> Option<&InfoArea> {
        self.chassis.as_ref()
    }

    pub fn board(&self) -> Option<&InfoArea> {
        self.board.as_ref()
    }

    pub fn product(&self) -> Option<&InfoArea> {
        self.product.as_ref()
    }

    pub fn multirecord(&self) -> Option<&MultirecordArea> {
        self.multirecord.as_ref()
    }
}

#[derive(Serialize)]
struct CommonSummary {
    version: u8,
    size: usize,
}

impl Serialize for FruDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(
            "common",
            &CommonSummary {
                version: self.header.version,
                size: self.size,
            },
        )?;
        if let Some(internal) = &self.internal_use {
            map.serialize_entry("internal", internal)?;
        }
        if let Some(chassis) = &self.chassis {
            map.serialize_entry("chassis", chassis)?;
        }
        if let Some(board) = &self.board {
            map.serialize_entry("board", board)?;
        }
        if let Some(product) = &self.product {
            map.serialize_entry("product", product)?;
        }
        if let Some(multirecord) = &self.multirecord {
            map.serialize_entry("multirecord", multirecord)?;
        }
        map.end()
    }
}

/// Decodes FRU images against a fixed set of multirecord templates.
///
/// Templates are registered before decoding starts; `decode` borrows the
/// decoder immutably, so one decoder may serve any number of images.
#[derive(Debug, Clone, Default)]
pub struct FruDecoder {
    registry: TemplateRegistry,
}

impl FruDecoder {
    pub fn new(registry: TemplateRegistry) -> Self {
        FruDecoder { registry }
    }

    pub fn register(&mut self, template: RecordTemplate) -> &mut Self {
        self.registry.register(template);
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Decodes every area the common header declares. The first checksum or
    /// bounds failure aborts the whole decode.
    pub fn decode(&self, buffer: &[u8]) -> Result<FruDocument, FruError> {
        let header = CommonHeader::decode(buffer)?;

        let internal_use = match header.internal_offset {
            0 => None,
            offset => {
                let end = header.next_area_after(offset).unwrap_or(buffer.len());
                Some(decode_internal_use(buffer, offset, end)?)
            }
        };
        let chassis = match header.chassis_offset {
            0 => None,
            offset => Some(decode_chassis(buffer, offset)?),
        };
        let board = match header.board_offset {
            0 => None,
            offset => Some(decode_board(buffer, offset)?),
        };
        let product = match header.product_offset {
            0 => None,
            offset => Some(decode_product(buffer, offset)?),
        };
        let multirecord = match header.multirecord_offset {
            0 => None,
            offset => Some(decode_multirecord(buffer, offset, &self.registry)?),
        };

        info!(
            "decoded FRU image of {} bytes: {} areas, {} records",
            buffer.len(),
            header.areas().len(),
            multirecord.as_ref().map_or(0, MultirecordArea::len)
        );

        Ok(FruDocument {
            header,
            size: buffer.len(),
            internal_use,
            chassis,
            board,
            product,
            multirecord,
        })
    }
}

/// Decodes `buffer` with the standard multirecord templates.
pub fn decode_fru(buffer: &[u8]) -> Result<FruDocument, FruError> {
    FruDecoder::default().decode(buffer)
}
