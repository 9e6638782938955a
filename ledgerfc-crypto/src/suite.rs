//! Signature suites.
//!
//! [`Suite`] names the algorithm families a key or signature can belong to.
//! [`CurveSuite`] is the capability set of the ECDSA suites: key generation,
//! public key derivation, compact recoverable signing and public key recovery.

use std::fmt;
use std::str::FromStr;

use ledgerfc_core::{FcError, Result};
use rand::rngs::OsRng;
use tracing::debug;

use crate::keys::{
    K1PrivateKey, K1PublicKey, K1Signature, R1PrivateKey, R1PublicKey, R1Signature,
};

/// Base value of the compact signature header.
pub const COMPACT_HEADER_BASE: u8 = 27;

/// Header offset marking a compressed public key.
pub const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// Size of an uncompressed SEC1 point.
pub const UNCOMPRESSED_POINT_SIZE: usize = 65;

/// Algorithm family of a key or signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suite {
    /// ECDSA over secp256k1.
    K1,
    /// ECDSA over NIST P-256.
    R1,
    /// WebAuthn assertions over P-256.
    WA,
}

impl Suite {
    /// Tag used in canonical strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::K1 => "K1",
            Self::R1 => "R1",
            Self::WA => "WA",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suite {
    type Err = FcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "K1" => Ok(Self::K1),
            "R1" => Ok(Self::R1),
            "WA" => Ok(Self::WA),
            _ => Err(FcError::NoMatchingSuite {
                prefix: s.to_string(),
                data: String::new(),
            }),
        }
    }
}

/// Operations of an ECDSA suite over 32-byte digests.
pub trait CurveSuite {
    const SUITE: Suite;

    type PrivateKey;
    type PublicKey;
    type Signature;

    /// Generates a key from the operating system RNG.
    fn generate() -> Self::PrivateKey;

    /// Derives the compressed public key.
    fn public_key(key: &Self::PrivateKey) -> Result<Self::PublicKey>;

    /// Signs a digest, producing a compact recoverable signature.
    fn sign(key: &Self::PrivateKey, digest: &[u8; 32]) -> Result<Self::Signature>;

    /// Recovers the signer's public key.
    fn recover(signature: &Self::Signature, digest: &[u8; 32]) -> Result<Self::PublicKey>;

    /// Expands a compressed public key to its 65-byte SEC1 form.
    fn to_uncompressed(key: &Self::PublicKey) -> Result<[u8; UNCOMPRESSED_POINT_SIZE]>;
}

fn crypto_err(e: impl fmt::Display) -> FcError {
    FcError::Crypto(e.to_string())
}

/// Reads the recovery id out of a compact header.
pub fn recovery_id_from_header(header: u8) -> Result<u8> {
    let range = COMPACT_HEADER_BASE..COMPACT_HEADER_BASE + 2 * COMPACT_COMPRESSED_FLAG;
    if !range.contains(&header) {
        return Err(FcError::Crypto(format!(
            "invalid compact signature header {header}"
        )));
    }
    let mut v = header - COMPACT_HEADER_BASE;
    if v >= COMPACT_COMPRESSED_FLAG {
        v -= COMPACT_COMPRESSED_FLAG;
    }
    Ok(v)
}

macro_rules! ecdsa_suite {
    (
        $(#[$meta:meta])*
        $name:ident, $suite:ident, $curve:ident,
        $private:ty, $public:ty, $signature:ty
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            fn signing_key(key: &$private) -> Result<$curve::ecdsa::SigningKey> {
                $curve::ecdsa::SigningKey::from_slice(key.as_bytes()).map_err(crypto_err)
            }

            fn compress(key: &$curve::ecdsa::VerifyingKey) -> Result<$public> {
                <$public>::from_slice(key.to_encoded_point(true).as_bytes())
            }
        }

        impl CurveSuite for $name {
            const SUITE: Suite = Suite::$suite;

            type PrivateKey = $private;
            type PublicKey = $public;
            type Signature = $signature;

            fn generate() -> $private {
                let key = $curve::ecdsa::SigningKey::random(&mut OsRng);
                <$private>::from_bytes(key.to_bytes().into())
            }

            fn public_key(key: &$private) -> Result<$public> {
                Self::compress(Self::signing_key(key)?.verifying_key())
            }

            fn sign(key: &$private, digest: &[u8; 32]) -> Result<$signature> {
                let (signature, recovery_id) = Self::signing_key(key)?
                    .sign_prehash_recoverable(digest)
                    .map_err(crypto_err)?;

                let mut compact = [0u8; 65];
                compact[0] =
                    COMPACT_HEADER_BASE + COMPACT_COMPRESSED_FLAG + recovery_id.to_byte();
                compact[1..].copy_from_slice(&signature.to_bytes());
                debug!(suite = stringify!($suite), "Signed digest");
                Ok(<$signature>::from_bytes(compact))
            }

            fn recover(signature: &$signature, digest: &[u8; 32]) -> Result<$public> {
                let compact = signature.as_bytes();
                let recovery_id = k256::ecdsa::RecoveryId::from_byte(
                    recovery_id_from_header(compact[0])?,
                )
                .ok_or_else(|| FcError::Crypto("invalid recovery id".into()))?;
                let signature =
                    $curve::ecdsa::Signature::from_slice(&compact[1..]).map_err(crypto_err)?;

                let key = $curve::ecdsa::VerifyingKey::recover_from_prehash(
                    digest,
                    &signature,
                    recovery_id,
                )
                .map_err(crypto_err)?;
                Self::compress(&key)
            }

            fn to_uncompressed(key: &$public) -> Result<[u8; UNCOMPRESSED_POINT_SIZE]> {
                let point = $curve::ecdsa::VerifyingKey::from_sec1_bytes(key.as_bytes())
                    .map_err(crypto_err)?
                    .to_encoded_point(false);
                point.as_bytes().try_into().map_err(|_| FcError::InvalidLength {
                    expected: UNCOMPRESSED_POINT_SIZE,
                    actual: point.len(),
                })
            }
        }
    };
}

ecdsa_suite!(
    /// ECDSA over secp256k1.
    Secp256k1, K1, k256,
    K1PrivateKey, K1PublicKey, K1Signature
);

ecdsa_suite!(
    /// ECDSA over NIST P-256.
    Secp256r1, R1, p256,
    R1PrivateKey, R1PublicKey, R1Signature
);
