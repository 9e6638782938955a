//! Checksummed payload wrapper.
//!
//! The wire form is the packed payload followed by a 4-byte check. The check
//! is the first four bytes of `RIPEMD160(pack(data) || suite)` read as a
//! little-endian `u32`; legacy encodings omit the suite.

use std::io::{Read, Write};

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use ledgerfc_core::raw::{self, Pack, Packer, Unpack, Unpacker};
use ledgerfc_core::{FcError, Result};

use crate::hash::ripemd160_parts;

/// Checksum over already-packed payload bytes.
pub fn checksum(packed: &[u8], suite: Option<&str>) -> u32 {
    let digest = ripemd160_parts(&[packed, suite.unwrap_or_default().as_bytes()]);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Compares checksums without early exit.
pub fn verify_checksum(stored: u32, computed: u32) -> Result<()> {
    if bool::from(stored.to_le_bytes().ct_eq(&computed.to_le_bytes())) {
        Ok(())
    } else {
        Err(FcError::ChecksumMismatch { stored, computed })
    }
}

/// A payload and its RIPEMD-160 check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksummedData<T> {
    pub data: T,
    pub check: u32,
}

impl<T: Pack> ChecksummedData<T> {
    /// Computes the check for `data` salted with `suite`.
    pub fn calculate_checksum(data: &T, suite: Option<&str>) -> Result<u32> {
        let packed = Zeroizing::new(raw::pack(data)?);
        Ok(checksum(&packed, suite))
    }

    /// Wraps `data` with a freshly computed check.
    pub fn new(data: T, suite: Option<&str>) -> Result<Self> {
        let check = Self::calculate_checksum(&data, suite)?;
        Ok(Self { data, check })
    }

    /// Recomputes the check and compares it with the stored one.
    pub fn verify(&self, suite: Option<&str>) -> Result<()> {
        verify_checksum(self.check, Self::calculate_checksum(&self.data, suite)?)
    }
}

impl<T: Pack> Pack for ChecksummedData<T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.data.pack(s)?;
        self.check.pack(s)
    }
}

impl<T> ChecksummedData<T> {
    /// Reads the payload with `read_data`, then the check.
    pub fn unpack_with<R: Read>(
        s: &mut Unpacker<R>,
        read_data: impl FnOnce(&mut Unpacker<R>) -> Result<T>,
    ) -> Result<Self> {
        let data = read_data(s)?;
        let check = u32::unpack(s)?;
        Ok(Self { data, check })
    }
}

impl<T: Unpack> Unpack for ChecksummedData<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        Self::unpack_with(s, T::unpack)
    }
}
