// Licensed under the Apache-2.0 license

use crate::error::ChecksumError;

/// Wrapping byte sum of `bytes`.
pub fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte))
}

/// The checksum byte that makes `bytes` sum to zero.
pub fn zero_checksum(bytes: &[u8]) -> u8 {
    0u8.wrapping_sub(byte_sum(bytes))
}

/// Validates that `length` bytes starting at `offset`, plus `extra`, sum to
/// zero modulo 256.
///
/// Areas and headers carry their checksum inside the summed range and pass
/// `extra = 0`. Multirecord payloads store their checksum in the record
/// header, so the caller reads it first and passes it as `extra`.
pub fn validate(
    buffer: &[u8],
    offset: usize,
    length: usize,
    extra: u8,
) -> Result<(), ChecksumError> {
    let range = offset
        .checked_add(length)
        .and_then(|end| buffer.get(offset..end))
        .ok_or(ChecksumError::OutOfRange {
            offset,
            length,
            available: buffer.len(),
        })?;

    let residue = byte_sum(range).wrapping_add(extra);
    if residue != 0 {
        return Err(ChecksumError::Mismatch {
            offset,
            length,
            residue,
        });
    }
    Ok(())
}
