//! Deterministic binary codec.
//!
//! Fixed-width primitives are little-endian. Strings, blobs and containers are
//! prefixed with an [`UnsignedInt`] count that is checked against
//! [`CodecConfig::max_num_array_elements`] on both sides. Reflected aggregates
//! are the concatenation of their fields in declaration order.

mod impls;
mod stream;
mod varint;

use std::io::{Read, Write};

use crate::config::CodecConfig;
use crate::error::{FcError, Result};

pub use stream::{Packer, Unpacker};
pub use varint::{read_varint32, write_varint32, SignedInt, UnsignedInt};

use stream::SizeCounter;

/// Types with a binary wire form.
pub trait Pack {
    /// Writes `self` to the stream.
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()>;
}

/// Types that can be read back from their binary wire form.
pub trait Unpack: Sized {
    /// Reads a value from the stream.
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self>;
}

/// Encodes `value` with the default limits.
pub fn pack<T: Pack + ?Sized>(value: &T) -> Result<Vec<u8>> {
    pack_with(value, CodecConfig::default())
}

/// Encodes `value` with explicit limits.
pub fn pack_with<T: Pack + ?Sized>(value: &T, config: CodecConfig) -> Result<Vec<u8>> {
    let mut packer = Packer::with_config(Vec::new(), config);
    value.pack(&mut packer)?;
    Ok(packer.into_inner())
}

/// Encodes `value` into an existing writer.
pub fn pack_into<T: Pack + ?Sized, W: Write>(
    value: &T,
    writer: W,
    config: CodecConfig,
) -> Result<W> {
    let mut packer = Packer::with_config(writer, config);
    value.pack(&mut packer)?;
    Ok(packer.into_inner())
}

/// Size in bytes of the wire form of `value`, without allocating it.
pub fn pack_size<T: Pack + ?Sized>(value: &T) -> Result<usize> {
    let counter = pack_into(value, SizeCounter::default(), CodecConfig::default())?;
    Ok(counter.size)
}

/// Decodes a value from the start of `bytes` with the default limits.
///
/// Bytes after the value are ignored; use [`unpack_exact`] to reject them.
pub fn unpack<T: Unpack>(bytes: &[u8]) -> Result<T> {
    unpack_with(bytes, CodecConfig::default())
}

/// Decodes a value from the start of `bytes` with explicit limits.
pub fn unpack_with<T: Unpack>(bytes: &[u8], config: CodecConfig) -> Result<T> {
    let mut unpacker = Unpacker::with_config(bytes, config);
    T::unpack(&mut unpacker)
}

/// Decodes a value that must span all of `bytes`.
pub fn unpack_exact<T: Unpack>(bytes: &[u8], config: CodecConfig) -> Result<T> {
    let mut unpacker = Unpacker::with_config(bytes, config);
    let value = T::unpack(&mut unpacker)?;
    match unpacker.remaining() {
        0 => Ok(value),
        remaining => Err(FcError::TrailingBytes { remaining }),
    }
}
