//! Owned arbitrary-size unsigned integer.
//!
//! Stored as a big-endian magnitude without leading zero bytes, so zero is
//! the empty buffer. The buffer is zeroized on drop.

use std::fmt;

use ledgerfc_core::Result;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct BigNumber {
    magnitude: Vec<u8>,
}

impl BigNumber {
    /// Builds from big-endian bytes, dropping leading zeros.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        Self {
            magnitude: bytes[start..].to_vec(),
        }
    }

    /// Parses big-endian hex; an odd digit count is read with an implied
    /// leading zero.
    pub fn from_hex(text: &str) -> Result<Self> {
        let mut bytes = if text.len() % 2 == 1 {
            hex::decode(format!("0{text}"))?
        } else {
            hex::decode(text)?
        };
        let number = Self::from_bytes(&bytes);
        bytes.zeroize();
        Ok(number)
    }

    /// Minimal big-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.magnitude.clone()
    }

    /// Uppercase hex of the magnitude; zero prints as `0`.
    pub fn to_hex(&self) -> String {
        if self.magnitude.is_empty() {
            return "0".to_string();
        }
        hex::encode_upper(&self.magnitude)
    }

    /// Size of the magnitude in bytes.
    pub fn size(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }
}

impl PartialEq for BigNumber {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude.ct_eq(&other.magnitude).into()
    }
}

impl Eq for BigNumber {}

impl fmt::Debug for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigNumber")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}
