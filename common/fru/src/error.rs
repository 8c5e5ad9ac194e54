// Licensed under the Apache-2.0 license

use core::fmt;
use thiserror::Error;

/// The region of a FRU image a decoder was working on when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    CommonHeader,
    InternalUse,
    Chassis,
    Board,
    Product,
    Multirecord,
}

impl Area {
    fn as_string(&self) -> &str {
        match *self {
            Area::CommonHeader => "common header",
            Area::InternalUse => "internal use",
            Area::Chassis => "chassis info",
            Area::Board => "board info",
            Area::Product => "product info",
            Area::Multirecord => "multirecord",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    #[error("{length} bytes at offset {offset:#x} do not sum to zero (residue {residue:#04x})")]
    Mismatch {
        offset: usize,
        length: usize,
        residue: u8,
    },
    #[error("range of {length} bytes at offset {offset:#x} exceeds the {available}-byte image")]
    OutOfRange {
        offset: usize,
        length: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field read of {length} bytes at offset {offset:#x} exceeds the {available}-byte window")]
    BufferTooShort {
        offset: usize,
        length: usize,
        available: usize,
    },
    #[error("integer field at offset {offset:#x} is {length} bytes wide (expected 1 to 4)")]
    IntegerWidth { offset: usize, length: usize },
}

/// Fatal decode failures. Every variant names the area and the absolute
/// offset of the area (or record) that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FruError {
    #[error("{area} at offset {offset:#x} failed checksum validation: {source}")]
    Checksum {
        area: Area,
        offset: usize,
        #[source]
        source: ChecksumError,
    },
    #[error("{area} at offset {offset:#x}: {source}")]
    Field {
        area: Area,
        offset: usize,
        #[source]
        source: FieldError,
    },
    #[error("{area} at offset {offset:#x} needs {needed} bytes but the image holds {available}")]
    BufferTooShort {
        area: Area,
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl FruError {
    pub fn area(&self) -> Area {
        match self {
            FruError::Checksum { area, .. }
            | FruError::Field { area, .. }
            | FruError::BufferTooShort { area, .. } => *area,
        }
    }

    pub fn is_checksum(&self) -> bool {
        matches!(
            self,
            FruError::Checksum {
                source: ChecksumError::Mismatch { .. },
                ..
            }
        )
    }

    pub fn is_buffer_too_short(&self) -> bool {
        matches!(
            self,
            FruError::BufferTooShort { .. }
                | FruError::Field {
                    source: FieldError::BufferTooShort { .. },
                    ..
                }
                | FruError::Checksum {
                    source: ChecksumError::OutOfRange { .. },
                    ..
                }
        )
    }

    pub(crate) fn checksum(area: Area, offset: usize) -> impl FnOnce(ChecksumError) -> Self {
        move |source| FruError::Checksum {
            area,
            offset,
            source,
        }
    }

    pub(crate) fn field(area: Area, offset: usize) -> impl FnOnce(FieldError) -> Self {
        move |source| FruError::Field {
            area,
            offset,
            source,
        }
    }

    /// Fails with [`FruError::BufferTooShort`] unless `buffer` holds
    /// `needed` bytes starting at `offset`.
    pub(crate) fn ensure(
        area: Area,
        buffer: &[u8],
        offset: usize,
        needed: usize,
    ) -> Result<(), Self> {
        match offset.checked_add(needed) {
            Some(end) if end <= buffer.len() => Ok(()),
            _ => Err(FruError::BufferTooShort {
                area,
                offset,
                needed,
                available: buffer.len(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_messages_name_area_and_offset() {
        let err = FruError::Checksum {
            area: Area::Board,
            offset: 0x18,
            source: ChecksumError::Mismatch {
                offset: 0x18,
                length: 64,
                residue: 0x01,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("board info"));
        assert!(msg.contains("0x18"));
        assert!(err.is_checksum());
        assert!(!err.is_buffer_too_short());
        assert_eq!(err.area(), Area::Board);
    }

    #[test]
    fn test_ensure() {
        let buffer = [0u8; 8];
        assert!(FruError::ensure(Area::CommonHeader, &buffer, 0, 8).is_ok());
        let err = FruError::ensure(Area::CommonHeader, &buffer, 4, 5).unwrap_err();
        assert!(err.is_buffer_too_short());
        assert!(FruError::ensure(Area::Chassis, &buffer, usize::MAX, 2).is_err());
    }
}
