//! Variable-length 32-bit integers.
//!
//! Each byte carries seven payload bits, low group first, with the high bit set
//! on every byte except the last. A 32-bit value needs at most five bytes; the
//! fifth byte may only use its low four bits.

use std::fmt;
use std::io::{Read, Write};

use crate::constants::{MAX_VARINT32_BYTES, VARINT_CONTINUATION_BIT, VARINT_PAYLOAD_BITS};
use crate::error::{FcError, Result};
use crate::variant::{FromVariant, ToVariant, Variant};

use super::{Pack, Packer, Unpack, Unpacker};

const LAST_SHIFT: u32 = VARINT_PAYLOAD_BITS * (MAX_VARINT32_BYTES as u32 - 1);
const PAYLOAD_MASK: u8 = !VARINT_CONTINUATION_BIT;

/// Unsigned 32-bit integer with a variable-length wire form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnsignedInt(pub u32);

/// Signed 32-bit integer, zig-zag mapped onto [`UnsignedInt`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedInt(pub i32);

/// Writes `value` in varint form.
pub fn write_varint32<W: Write>(s: &mut Packer<W>, value: u32) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT32_BYTES];
    let mut len = 0;
    let mut v = value;
    loop {
        let mut byte = (v as u8) & PAYLOAD_MASK;
        v >>= VARINT_PAYLOAD_BITS;
        if v != 0 {
            byte |= VARINT_CONTINUATION_BIT;
        }
        buf[len] = byte;
        len += 1;
        if v == 0 {
            break;
        }
    }
    s.write_bytes(&buf[..len])
}

/// Reads a varint, failing with `"<what> out of bounds"` when the encoding
/// does not fit in 32 bits.
pub fn read_varint32<R: Read>(s: &mut Unpacker<R>, what: &'static str) -> Result<u32> {
    let mut value: u32 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = s.read_u8()?;
        if shift > LAST_SHIFT || (shift == LAST_SHIFT && byte & 0xf0 != 0) {
            return Err(FcError::VarintOutOfBounds(what));
        }
        value |= u32::from(byte & PAYLOAD_MASK) << shift;
        shift += VARINT_PAYLOAD_BITS;
        if byte & VARINT_CONTINUATION_BIT == 0 {
            return Ok(value);
        }
    }
}

fn zigzag_encode(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

fn zigzag_decode(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

impl UnsignedInt {
    /// Number of bytes in the wire form.
    pub fn encoded_len(self) -> usize {
        let bits = 32 - self.0.leading_zeros();
        (bits.max(1)).div_ceil(VARINT_PAYLOAD_BITS) as usize
    }
}

impl From<u32> for UnsignedInt {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<UnsignedInt> for u32 {
    fn from(v: UnsignedInt) -> Self {
        v.0
    }
}

impl From<i32> for SignedInt {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

impl From<SignedInt> for i32 {
    fn from(v: SignedInt) -> Self {
        v.0
    }
}

impl fmt::Display for UnsignedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SignedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Pack for UnsignedInt {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        write_varint32(s, self.0)
    }
}

impl Unpack for UnsignedInt {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        read_varint32(s, "unsigned_int").map(Self)
    }
}

impl Pack for SignedInt {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        write_varint32(s, zigzag_encode(self.0))
    }
}

impl Unpack for SignedInt {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        read_varint32(s, "signed_int").map(|v| Self(zigzag_decode(v)))
    }
}

impl ToVariant for UnsignedInt {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Uint64(u64::from(self.0)))
    }
}

impl FromVariant for UnsignedInt {
    fn from_variant(v: &Variant) -> Result<Self> {
        u32::from_variant(v).map(Self)
    }
}

impl ToVariant for SignedInt {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Int64(i64::from(self.0)))
    }
}

impl FromVariant for SignedInt {
    fn from_variant(v: &Variant) -> Result<Self> {
        i32::from_variant(v).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{pack, unpack};
    use test_case::test_case;

    #[test_case(0, &[0x00] ; "zero")]
    #[test_case(127, &[0x7f] ; "one byte max")]
    #[test_case(128, &[0x80, 0x01] ; "two bytes min")]
    #[test_case(300, &[0xac, 0x02] ; "three hundred")]
    #[test_case(u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f] ; "u32 max")]
    fn test_unsigned_encoding(value: u32, expected: &[u8]) {
        let bytes = pack(&UnsignedInt(value)).unwrap();
        assert_eq!(bytes, expected);
        assert_eq!(UnsignedInt(value).encoded_len(), expected.len());
        assert_eq!(unpack::<UnsignedInt>(&bytes).unwrap(), UnsignedInt(value));
    }

    #[test_case(0, &[0x00] ; "zero")]
    #[test_case(-1, &[0x01] ; "minus one")]
    #[test_case(1, &[0x02] ; "one")]
    #[test_case(i32::MAX, &[0xfe, 0xff, 0xff, 0xff, 0x0f] ; "i32 max")]
    #[test_case(i32::MIN, &[0xff, 0xff, 0xff, 0xff, 0x0f] ; "i32 min")]
    fn test_signed_encoding(value: i32, expected: &[u8]) {
        let bytes = pack(&SignedInt(value)).unwrap();
        assert_eq!(bytes, expected);
        assert_eq!(unpack::<SignedInt>(&bytes).unwrap(), SignedInt(value));
    }

    #[test]
    fn test_five_byte_boundary_decodes() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x0f];
        assert_eq!(unpack::<UnsignedInt>(&bytes).unwrap().0, u32::MAX);
        assert_eq!(unpack::<SignedInt>(&bytes).unwrap().0, i32::MIN);
    }

    #[test_case(&[0xff, 0xff, 0xff, 0xff, 0x8f, 0x00] ; "continuation on fifth byte")]
    #[test_case(&[0xff, 0xff, 0xff, 0xff, 0x10, 0x00] ; "magnitude past 32 bits")]
    fn test_overlong_rejected(bytes: &[u8]) {
        let err = unpack::<UnsignedInt>(bytes).unwrap_err();
        assert_eq!(err.to_string(), "unsigned_int out of bounds");

        let err = unpack::<SignedInt>(bytes).unwrap_err();
        assert_eq!(err.to_string(), "signed_int out of bounds");
    }

    #[test]
    fn test_truncated_varint() {
        let err = unpack::<UnsignedInt>(&[0x80, 0x80]).unwrap_err();
        assert!(matches!(err, FcError::UnexpectedEof));
    }

    #[test]
    fn test_zigzag_is_bijective_at_edges() {
        for v in [0, 1, -1, 63, -64, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }
}
