// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, KnownLayout};

#[derive(Debug, PartialEq)]
pub enum FruCodecError {
    BufferTooShort,
}

/// Reads fixed-layout structures (common header, record header) out of a
/// FRU image at an absolute offset.
pub trait FruCodec: core::fmt::Debug + Sized {
    /// Copies the structure starting at `offset`. Fails if it does not fit
    /// in `buffer`.
    fn decode_at(buffer: &[u8], offset: usize) -> Result<Self, FruCodecError>;
}

impl<T> FruCodec for T
where
    T: core::fmt::Debug + Sized + FromBytes + Immutable + KnownLayout,
{
    fn decode_at(buffer: &[u8], offset: usize) -> Result<Self, FruCodecError> {
        let tail = buffer.get(offset..).ok_or(FruCodecError::BufferTooShort)?;
        Ok(Self::read_from_prefix(tail)
            .map_err(|_| FruCodecError::BufferTooShort)?
            .0)
    }
}
