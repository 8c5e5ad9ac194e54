// Licensed under the Apache-2.0 license

use crate::error::{Area, FruError};
use log::debug;
use serde::Serialize;

/// The opaque internal use area. It carries no checksum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternalUseArea {
    #[serde(skip)]
    pub offset: usize,
    #[serde(skip)]
    pub version: u8,
    pub data: Vec<u8>,
}

/// Decodes the internal use area at `offset`, ending before `end`.
pub fn decode_internal_use(
    buffer: &[u8],
    offset: usize,
    end: usize,
) -> Result<InternalUseArea, FruError> {
    FruError::ensure(Area::InternalUse, buffer, offset, 1)?;
    if end > buffer.len() {
        return Err(FruError::BufferTooShort {
            area: Area::InternalUse,
            offset,
            needed: end - offset,
            available: buffer.len(),
        });
    }

    let version = buffer[offset];
    let data = buffer
        .get(offset + 1..end)
        .map(<[u8]>::to_vec)
        .unwrap_or_default();
    debug!(
        "internal use area at {:#x}: version {}, {} bytes",
        offset,
        version,
        data.len()
    );
    Ok(InternalUseArea {
        offset,
        version,
        data,
    })
}
