//! Multi-suite key and signature types.
//!
//! Each kind is a closed sum over per-suite payloads. The canonical string
//! form is produced by [`crate::canonical`]; the raw form is `which` followed
//! by the payload.

/// Fixed-size public payload: raw array on the wire, hex in variants.
macro_rules! fixed_payload {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Encoded size in bytes.
            pub const SIZE: usize = $len;

            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> ledgerfc_core::Result<Self> {
                let array: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| ledgerfc_core::FcError::InvalidLength {
                            expected: $len,
                            actual: bytes.len(),
                        })?;
                Ok(Self(array))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl ledgerfc_core::Pack for $name {
            fn pack<W: std::io::Write>(
                &self,
                s: &mut ledgerfc_core::raw::Packer<W>,
            ) -> ledgerfc_core::Result<()> {
                s.write_bytes(&self.0)
            }
        }

        impl ledgerfc_core::Unpack for $name {
            fn unpack<R: std::io::Read>(
                s: &mut ledgerfc_core::raw::Unpacker<R>,
            ) -> ledgerfc_core::Result<Self> {
                s.read_array().map(Self)
            }
        }

        impl ledgerfc_core::ToVariant for $name {
            fn to_variant(&self) -> ledgerfc_core::Result<ledgerfc_core::Variant> {
                ledgerfc_core::ToVariant::to_variant(&self.0)
            }
        }

        impl ledgerfc_core::FromVariant for $name {
            fn from_variant(v: &ledgerfc_core::Variant) -> ledgerfc_core::Result<Self> {
                <[u8; $len] as ledgerfc_core::FromVariant>::from_variant(v).map(Self)
            }
        }
    };
}

/// Implements `Display`, `FromStr` and the string variant form through a
/// [`KeyFormat`](crate::canonical::KeyFormat).
macro_rules! canonical_string {
    ($name:ident, $format:expr) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match crate::canonical::encode(&$format, self) {
                    Ok(text) => f.write_str(&text),
                    Err(_) => Err(std::fmt::Error),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ledgerfc_core::FcError;

            fn from_str(s: &str) -> ledgerfc_core::Result<Self> {
                crate::canonical::decode(&$format, s)
            }
        }

        impl ledgerfc_core::ToVariant for $name {
            fn to_variant(&self) -> ledgerfc_core::Result<ledgerfc_core::Variant> {
                crate::canonical::encode(&$format, self).map(ledgerfc_core::Variant::String)
            }
        }

        impl ledgerfc_core::FromVariant for $name {
            fn from_variant(v: &ledgerfc_core::Variant) -> ledgerfc_core::Result<Self> {
                crate::canonical::decode(&$format, v.as_str()?)
            }
        }
    };
}

mod private_key;
mod public_key;
mod signature;
mod webauthn;

pub use private_key::{K1PrivateKey, PrivateKey, R1PrivateKey, PRIVATE_KEY_FORMAT};
pub use public_key::{K1PublicKey, PublicKey, R1PublicKey, PUBLIC_KEY_FORMAT};
pub use signature::{K1Signature, R1Signature, Signature, SIGNATURE_FORMAT};
pub use webauthn::{UserPresence, WebAuthnPublicKey, WebAuthnSignature};
