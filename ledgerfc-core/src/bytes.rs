//! Opaque byte blob.

use std::fmt;
use std::io::{Read, Write};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::raw::{Pack, Packer, Unpack, Unpacker};
use crate::variant::{FromVariant, ToVariant, Variant};

/// Length-prefixed byte blob. Its variant form is a lowercase hex string.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bytes(#[serde(with = "hex::serde")] pub Vec<u8>);

impl Bytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Pack for Bytes {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("bytes", self.0.len())?;
        s.write_bytes(&self.0)
    }
}

impl Unpack for Bytes {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        s.read_blob("bytes").map(Self)
    }
}

impl ToVariant for Bytes {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::String(hex::encode(&self.0)))
    }
}

/// Accepts a hex string or a raw blob.
impl FromVariant for Bytes {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_blob().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::raw::{pack, unpack, unpack_with};

    #[test]
    fn test_wire_form_is_length_prefixed() {
        let b = Bytes::new(vec![0xaa, 0xbb]);
        assert_eq!(pack(&b).unwrap(), vec![2, 0xaa, 0xbb]);
        assert_eq!(unpack::<Bytes>(&[2, 0xaa, 0xbb]).unwrap(), b);
    }

    #[test]
    fn test_length_bounded() {
        let config = CodecConfig::new().with_max_array_elements(1);
        assert!(unpack_with::<Bytes>(&[2, 0xaa, 0xbb], config)
            .unwrap_err()
            .is_bound_violation());
    }

    #[test]
    fn test_variant_is_hex() {
        let b = Bytes::from(&b"\x01\xff"[..]);
        assert_eq!(b.to_variant().unwrap(), Variant::from("01ff"));
        assert_eq!(Bytes::from_variant(&Variant::from("01ff")).unwrap(), b);
        assert_eq!(Bytes::from_variant(&Variant::Blob(vec![1, 255])).unwrap(), b);
        assert!(Bytes::from_variant(&Variant::from("xyz")).is_err());
    }

    #[test]
    fn test_serde_hex() {
        let b = Bytes::new(vec![0x12, 0x34]);
        assert_eq!(serde_json::to_string(&b).unwrap(), r#""1234""#);
    }
}
