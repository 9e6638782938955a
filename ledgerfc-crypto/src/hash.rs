//! Digest helpers.
//!
//! RIPEMD-160 checksums canonical key strings; SHA-256 is the signing digest
//! and the WIF checksum.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// RIPEMD-160 output size in bytes.
pub const RIPEMD160_SIZE: usize = 20;

/// SHA-256 output size in bytes.
pub const SHA256_SIZE: usize = 32;

/// Computes SHA-256.
pub fn sha256(input: &[u8]) -> [u8; SHA256_SIZE] {
    Sha256::digest(input).into()
}

/// Computes SHA-256 of SHA-256.
pub fn double_sha256(input: &[u8]) -> [u8; SHA256_SIZE] {
    sha256(&sha256(input))
}

/// Computes RIPEMD-160.
pub fn ripemd160(input: &[u8]) -> [u8; RIPEMD160_SIZE] {
    ripemd160_parts(&[input])
}

/// Computes RIPEMD-160 over the concatenation of `parts`.
pub fn ripemd160_parts(parts: &[&[u8]]) -> [u8; RIPEMD160_SIZE] {
    let mut hasher = Ripemd160::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
