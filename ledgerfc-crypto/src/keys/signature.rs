//! Signatures.

use ledgerfc_core::{static_variant, Result};

use super::{PublicKey, WebAuthnSignature};
use crate::canonical::KeyFormat;
use crate::suite::Suite;

/// `SIG_<suite>_...`; signatures have no legacy form.
pub const SIGNATURE_FORMAT: KeyFormat = KeyFormat {
    base_prefix: "SIG",
    legacy: None,
    suites: &["K1", "R1", "WA"],
};

fixed_payload!(
    /// Compact recoverable secp256k1 signature `[header, r, s]`.
    K1Signature,
    65
);

fixed_payload!(
    /// Compact recoverable P-256 signature `[header, r, s]`.
    R1Signature,
    65
);

static_variant! {
    @packed
    /// A signature of any supported suite.
    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Signature {
        K1(K1Signature),
        R1(R1Signature),
        WA(WebAuthnSignature),
    }
}

canonical_string!(Signature, SIGNATURE_FORMAT);

impl Signature {
    pub fn suite(&self) -> Suite {
        match self {
            Self::K1(_) => Suite::K1,
            Self::R1(_) => Suite::R1,
            Self::WA(_) => Suite::WA,
        }
    }

    /// Recovers the signer of `digest`. See [`PublicKey::recover`].
    pub fn recover(&self, digest: &[u8; 32]) -> Result<PublicKey> {
        PublicKey::recover(self, digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;
    use crate::keys::PrivateKey;
    use ledgerfc_core::raw::{pack, unpack};
    use ledgerfc_core::{FcError, FromVariant, ToVariant};
    use test_case::test_case;

    #[test]
    fn test_string_roundtrip() {
        let key = PrivateKey::generate(Suite::K1).unwrap();
        let signature = key.sign(&sha256(b"hello")).unwrap();
        let text = signature.to_string();
        assert!(text.starts_with("SIG_K1_"));
        assert_eq!(text.parse::<Signature>().unwrap(), signature);
    }

    #[test]
    fn test_recover_from_parsed_string() {
        let key = PrivateKey::generate(Suite::R1).unwrap();
        let digest = sha256(b"Test Cases");
        let text = key.sign(&digest).unwrap().to_string();
        let parsed: Signature = text.parse().unwrap();
        assert_eq!(parsed.recover(&digest).unwrap(), key.public_key().unwrap());
    }

    #[test]
    fn test_raw_form() {
        let signature = Signature::R1(R1Signature::from_bytes([32; 65]));
        let bytes = pack(&signature).unwrap();
        assert_eq!(bytes.len(), 66);
        assert_eq!(bytes[0], 1);
        assert_eq!(unpack::<Signature>(&bytes).unwrap(), signature);
    }

    #[test]
    fn test_variant_form_is_string() {
        let signature = Signature::K1(K1Signature::from_bytes([31; 65]));
        let v = signature.to_variant().unwrap();
        assert!(v.as_str().unwrap().starts_with("SIG_K1_"));
        assert_eq!(Signature::from_variant(&v).unwrap(), signature);
    }

    fn flip_check_bit(text: &str) -> String {
        let split = text.rfind('_').map_or(0, |i| i + 1);
        let (head, data) = text.split_at(split);
        let mut bytes = bs58::decode(data).into_vec().unwrap();
        *bytes.last_mut().unwrap() ^= 0x01;
        format!("{head}{}", bs58::encode(bytes).into_string())
    }

    #[test_case(Suite::K1 ; "k1")]
    #[test_case(Suite::R1 ; "r1")]
    fn test_flipped_check_in_signature(suite: Suite) {
        let key = PrivateKey::generate(suite).unwrap();
        let text = key.sign(&sha256(b"check")).unwrap().to_string();
        assert!(text.starts_with(&format!("SIG_{suite}_")));
        match flip_check_bit(&text).parse::<Signature>() {
            Err(FcError::ChecksumMismatch { stored, computed }) => {
                assert_eq!(stored ^ computed, 0x0100_0000);
            }
            other => panic!("expected a checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_no_legacy_form() {
        let err = "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV"
            .parse::<Signature>()
            .unwrap_err();
        assert!(matches!(err, FcError::NoDelimiter(_)));
    }

    #[test]
    fn test_bad_header_fails_recovery() {
        let signature = Signature::K1(K1Signature::from_bytes([0; 65]));
        assert!(signature.recover(&[0; 32]).is_err());
    }
}
