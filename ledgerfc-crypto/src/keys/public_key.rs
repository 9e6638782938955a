//! Public keys.

use ledgerfc_core::{static_variant, FcError, Result};

use super::{Signature, WebAuthnPublicKey};
use crate::canonical::{KeyFormat, LegacyCodec, LegacyForm};
use crate::suite::{CurveSuite, Secp256k1, Secp256r1, Suite, UNCOMPRESSED_POINT_SIZE};

/// `PUB_<suite>_...`, with the legacy `EOS...` form for K1.
pub const PUBLIC_KEY_FORMAT: KeyFormat = KeyFormat {
    base_prefix: "PUB",
    legacy: Some(LegacyForm {
        which: 0,
        prefix: "EOS",
        codec: LegacyCodec::Ripemd160,
    }),
    suites: &["K1", "R1", "WA"],
};

fixed_payload!(
    /// Compressed secp256k1 point.
    K1PublicKey,
    33
);

fixed_payload!(
    /// Compressed P-256 point.
    R1PublicKey,
    33
);

static_variant! {
    @packed
    /// A public key of any supported suite.
    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum PublicKey {
        K1(K1PublicKey),
        R1(R1PublicKey),
        WA(WebAuthnPublicKey),
    }
}

canonical_string!(PublicKey, PUBLIC_KEY_FORMAT);

impl PublicKey {
    pub fn suite(&self) -> Suite {
        match self {
            Self::K1(_) => Suite::K1,
            Self::R1(_) => Suite::R1,
            Self::WA(_) => Suite::WA,
        }
    }

    /// Recovers the signer of `digest`.
    ///
    /// WebAuthn signatures are rejected with [`FcError::UnsupportedSuite`].
    pub fn recover(signature: &Signature, digest: &[u8; 32]) -> Result<Self> {
        match signature {
            Signature::K1(sig) => Secp256k1::recover(sig, digest).map(Self::K1),
            Signature::R1(sig) => Secp256r1::recover(sig, digest).map(Self::R1),
            Signature::WA(_) => Err(FcError::UnsupportedSuite(Suite::WA.as_str())),
        }
    }

    /// True when `signature` over `digest` recovers to this key.
    pub fn verify(&self, signature: &Signature, digest: &[u8; 32]) -> Result<bool> {
        Ok(Self::recover(signature, digest)? == *self)
    }

    /// The 65-byte SEC1 form of the underlying curve point.
    pub fn to_uncompressed(&self) -> Result<[u8; UNCOMPRESSED_POINT_SIZE]> {
        match self {
            Self::K1(key) => Secp256k1::to_uncompressed(key),
            Self::R1(key) => Secp256r1::to_uncompressed(key),
            Self::WA(wa) => Secp256r1::to_uncompressed(&wa.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{PrivateKey, UserPresence};
    use ledgerfc_core::raw::{pack, unpack};
    use ledgerfc_core::{FromVariant, ToVariant, Variant};

    const LEGACY_KEY: &str = "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV";

    #[test]
    fn test_legacy_vector_from_wif() {
        let key: PrivateKey = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3"
            .parse()
            .unwrap();
        assert_eq!(key.public_key().unwrap().to_string(), LEGACY_KEY);
    }

    #[test]
    fn test_r1_vector() {
        let key: PrivateKey = "PVT_R1_iyQmnyPEGvFd8uffnk152WC2WryBjgTrg22fXQryuGL9mU6qW"
            .parse()
            .unwrap();
        assert_eq!(
            key.public_key().unwrap().to_string(),
            "PUB_R1_6EPHFSKVYHBjQgxVGQPrwCxTg7BbZ69H9i4gztN9deKTEXYne4"
        );
    }

    #[test]
    fn test_legacy_and_canonical_k1_agree() {
        let legacy: PublicKey = LEGACY_KEY.parse().unwrap();
        assert_eq!(legacy.suite(), Suite::K1);

        let plain = KeyFormat {
            legacy: None,
            ..PUBLIC_KEY_FORMAT
        };
        let canonical = crate::canonical::encode(&plain, &legacy).unwrap();
        assert!(canonical.starts_with("PUB_K1_"));
        assert_eq!(canonical.parse::<PublicKey>().unwrap(), legacy);
    }

    #[test]
    fn test_corrupted_legacy_key() {
        let mut corrupted = LEGACY_KEY.to_string();
        corrupted.replace_range(10..11, "a");
        assert!(corrupted.parse::<PublicKey>().is_err());

        let flipped = format!("EOS{}", flip_check_bit(&LEGACY_KEY[3..]));
        assert!(matches!(
            flipped.parse::<PublicKey>(),
            Err(FcError::ChecksumMismatch { .. })
        ));
    }

    fn flip_check_bit(text: &str) -> String {
        let split = text.rfind('_').map_or(0, |i| i + 1);
        let (head, data) = text.split_at(split);
        let mut bytes = bs58::decode(data).into_vec().unwrap();
        *bytes.last_mut().unwrap() ^= 0x01;
        format!("{head}{}", bs58::encode(bytes).into_string())
    }

    #[test]
    fn test_flipped_check_in_canonical_key() {
        let text = "PUB_R1_6EPHFSKVYHBjQgxVGQPrwCxTg7BbZ69H9i4gztN9deKTEXYne4";
        match flip_check_bit(text).parse::<PublicKey>() {
            Err(FcError::ChecksumMismatch { stored, computed }) => {
                assert_eq!(stored ^ computed, 0x0100_0000);
            }
            other => panic!("expected a checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_raw_form_is_which_then_point() {
        let key = PublicKey::R1(R1PublicKey::from_bytes([3; 33]));
        let bytes = pack(&key).unwrap();
        assert_eq!(bytes.len(), 34);
        assert_eq!(bytes[0], 1);
        assert_eq!(unpack::<PublicKey>(&bytes).unwrap(), key);
    }

    #[test]
    fn test_webauthn_key_string_roundtrip() {
        let key = PublicKey::WA(WebAuthnPublicKey {
            key: R1PublicKey::from_bytes([2; 33]),
            user_presence: UserPresence::Present,
            rpid: "example.com".into(),
        });
        let text = key.to_string();
        assert!(text.starts_with("PUB_WA_"));
        assert_eq!(text.parse::<PublicKey>().unwrap(), key);
    }

    #[test]
    fn test_variant_form_is_string() {
        let key: PublicKey = LEGACY_KEY.parse().unwrap();
        let v = key.to_variant().unwrap();
        assert_eq!(v, Variant::String(LEGACY_KEY.into()));
        assert_eq!(PublicKey::from_variant(&v).unwrap(), key);
    }

    #[test]
    fn test_wrong_kind_prefix() {
        let err = "PVT_K1_abc".parse::<PublicKey>().unwrap_err();
        assert!(matches!(err, FcError::InvalidKeyPrefix { expected: "PUB", .. }));
    }

    #[test]
    fn test_recover_rejects_webauthn() {
        let sig = Signature::WA(crate::keys::WebAuthnSignature {
            compact_signature: crate::keys::R1Signature::from_bytes([31; 65]),
            auth_data: Default::default(),
            client_json: String::new(),
        });
        assert!(matches!(
            PublicKey::recover(&sig, &[0; 32]),
            Err(FcError::UnsupportedSuite("WA"))
        ));
    }
}
