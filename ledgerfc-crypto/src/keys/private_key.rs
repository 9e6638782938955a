//! Private keys.
//!
//! Key material is zeroized on drop, compared in constant time and never
//! printed by `Debug`.

use std::fmt;
use std::io::{Read, Write};

use ledgerfc_core::raw::{Pack, Packer, Unpack, Unpacker};
use ledgerfc_core::{static_variant, FcError, FromVariant, Result, ToVariant, Variant};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{PublicKey, Signature};
use crate::canonical::{KeyFormat, LegacyCodec, LegacyForm};
use crate::suite::{CurveSuite, Secp256k1, Secp256r1, Suite};

/// `PVT_<suite>_...`, with WIF as the legacy form for K1.
pub const PRIVATE_KEY_FORMAT: KeyFormat = KeyFormat {
    base_prefix: "PVT",
    legacy: Some(LegacyForm {
        which: 0,
        prefix: "",
        codec: LegacyCodec::Wif,
    }),
    suites: &["K1", "R1"],
};

/// Scalar size in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

macro_rules! secret_payload {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct $name([u8; PRIVATE_KEY_SIZE]);

        impl $name {
            pub fn from_bytes(bytes: [u8; PRIVATE_KEY_SIZE]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_SIZE] {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0[..].ct_eq(&other.0[..]).into()
            }
        }

        impl Eq for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}([REDACTED])", stringify!($name))
            }
        }

        impl Pack for $name {
            fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
                s.write_bytes(&self.0)
            }
        }

        impl Unpack for $name {
            fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
                s.read_array().map(Self)
            }
        }

        impl ToVariant for $name {
            fn to_variant(&self) -> Result<Variant> {
                Ok(Variant::String(hex::encode(self.0)))
            }
        }

        impl FromVariant for $name {
            fn from_variant(v: &Variant) -> Result<Self> {
                <[u8; PRIVATE_KEY_SIZE]>::from_variant(v).map(Self)
            }
        }
    };
}

secret_payload!(
    /// secp256k1 scalar.
    K1PrivateKey
);

secret_payload!(
    /// P-256 scalar.
    R1PrivateKey
);

static_variant! {
    @packed
    /// A private key of any signing suite.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PrivateKey {
        K1(K1PrivateKey),
        R1(R1PrivateKey),
    }
}

canonical_string!(PrivateKey, PRIVATE_KEY_FORMAT);

impl PrivateKey {
    /// Generates a fresh key for `suite`.
    pub fn generate(suite: Suite) -> Result<Self> {
        let key = match suite {
            Suite::K1 => Self::K1(Secp256k1::generate()),
            Suite::R1 => Self::R1(Secp256r1::generate()),
            Suite::WA => return Err(FcError::UnsupportedSuite(suite.as_str())),
        };
        debug!(suite = %suite, "Generated private key");
        Ok(key)
    }

    pub fn suite(&self) -> Suite {
        match self {
            Self::K1(_) => Suite::K1,
            Self::R1(_) => Suite::R1,
        }
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        match self {
            Self::K1(key) => Secp256k1::public_key(key).map(PublicKey::K1),
            Self::R1(key) => Secp256r1::public_key(key).map(PublicKey::R1),
        }
    }

    /// Signs a 32-byte digest.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature> {
        match self {
            Self::K1(key) => Secp256k1::sign(key, digest).map(Signature::K1),
            Self::R1(key) => Secp256r1::sign(key, digest).map(Signature::R1),
        }
    }
}
