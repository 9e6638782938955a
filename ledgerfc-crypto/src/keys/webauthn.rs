//! WebAuthn key and signature payloads.
//!
//! These are carried and encoded like the other suites, but signing and
//! recovery through an authenticator are not implemented here.

use std::io::{Read, Write};

use ledgerfc_core::raw::{Pack, Packer, Unpack, Unpacker};
use ledgerfc_core::{reflect, Bytes, FcError, FromVariant, Result, ToVariant, Variant};

use super::{R1PublicKey, R1Signature};

/// Authenticator user presence level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum UserPresence {
    #[default]
    None = 0,
    Present = 1,
    Verified = 2,
}

impl UserPresence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "USER_PRESENCE_NONE",
            Self::Present => "USER_PRESENCE_PRESENT",
            Self::Verified => "USER_PRESENCE_VERIFIED",
        }
    }
}

impl TryFrom<u8> for UserPresence {
    type Error = FcError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Present),
            2 => Ok(Self::Verified),
            _ => Err(FcError::OutOfRange {
                value: value.to_string(),
                target: "UserPresence",
            }),
        }
    }
}

impl Pack for UserPresence {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_u8(*self as u8)
    }
}

impl Unpack for UserPresence {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        Self::try_from(s.read_u8()?)
    }
}

impl ToVariant for UserPresence {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::from(self.as_str()))
    }
}

impl FromVariant for UserPresence {
    /// Accepts the symbolic name or the numeric value.
    fn from_variant(v: &Variant) -> Result<Self> {
        if let Variant::String(name) = v {
            return [Self::None, Self::Present, Self::Verified]
                .into_iter()
                .find(|candidate| candidate.as_str() == name)
                .ok_or_else(|| FcError::OutOfRange {
                    value: name.clone(),
                    target: "UserPresence",
                });
        }
        Self::try_from(u8::from_variant(v)?)
    }
}

/// A P-256 key registered with a relying party.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WebAuthnPublicKey {
    pub key: R1PublicKey,
    pub user_presence: UserPresence,
    /// Relying party identifier.
    pub rpid: String,
}

reflect!(WebAuthnPublicKey {
    key,
    user_presence,
    rpid,
});

/// An authenticator assertion.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WebAuthnSignature {
    pub compact_signature: R1Signature,
    pub auth_data: Bytes,
    pub client_json: String,
}

reflect!(WebAuthnSignature {
    compact_signature,
    auth_data,
    client_json,
});
