//! Canonical string form for multi-suite keys and signatures.
//!
//! ```text
//! <base>_<suite>_<base58(payload || check)>
//! ```
//!
//! `payload || check` is the wire form of a [`ChecksummedData`] whose check
//! is salted with the suite tag. A key kind may also accept one legacy form
//! for a single alternative: an unsalted RIPEMD-160 form behind a literal
//! prefix (`EOS...`), or a Wallet Import Format string with no prefix at all.

use std::io::Write;

use ledgerfc_core::raw::{self, Pack, Packer, Unpacker};
use ledgerfc_core::static_variant::{self, StaticVariant};
use ledgerfc_core::{FcError, Result};
use tracing::debug;
use zeroize::Zeroizing;

use crate::checksum::{verify_checksum, ChecksummedData};
use crate::hash::{double_sha256, sha256};

/// Version byte of a Wallet Import Format private key.
pub const WIF_VERSION: u8 = 0x80;

const CHECK_SIZE: usize = 4;

/// How a legacy string carries its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyCodec {
    /// `prefix || base58(payload || ripemd160(payload)[..4])`.
    Ripemd160,
    /// `base58(0x80 || payload || sha256d(0x80 || payload)[..4])`.
    Wif,
}

/// The legacy encoding accepted for one alternative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyForm {
    /// Alternative index the legacy form stands for.
    pub which: usize,
    /// Literal prefix, possibly empty.
    pub prefix: &'static str,
    pub codec: LegacyCodec,
}

impl LegacyForm {
    /// True when `text` should be read as this legacy form.
    pub fn matches(&self, text: &str) -> bool {
        text.len() > self.prefix.len() && text.starts_with(self.prefix) && !text.contains('_')
    }
}

/// String grammar of one key kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyFormat {
    /// Leading tag such as `PUB`.
    pub base_prefix: &'static str,
    pub legacy: Option<LegacyForm>,
    /// Suite tags indexed by alternative.
    pub suites: &'static [&'static str],
}

impl KeyFormat {
    fn suite(&self, which: usize) -> Result<&'static str> {
        self.suites.get(which).copied().ok_or(FcError::InvalidWhich {
            which: which as u64,
            count: self.suites.len(),
        })
    }

    fn legacy_for(&self, which: usize) -> Option<&LegacyForm> {
        self.legacy.as_ref().filter(|legacy| legacy.which == which)
    }
}

/// The active payload of a key value, packed without its `which` tag.
struct Payload<'a, T>(&'a T);

impl<T: StaticVariant> Pack for Payload<'_, T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        static_variant::pack_payload(self.0, s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders `value` in its canonical string form.
///
/// The alternative named by `format.legacy` is rendered in its legacy form.
pub fn encode<T: StaticVariant>(format: &KeyFormat, value: &T) -> Result<String> {
    let which = value.which();

    if let Some(legacy) = format.legacy_for(which) {
        return match legacy.codec {
            LegacyCodec::Ripemd160 => Ok(format!(
                "{}{}",
                legacy.prefix,
                base58_with_check(value, None)?
            )),
            LegacyCodec::Wif => {
                let payload = Zeroizing::new(raw::pack(&Payload(value))?);
                Ok(encode_wif(&payload))
            }
        };
    }

    let suite = format.suite(which)?;
    Ok(format!(
        "{}_{}_{}",
        format.base_prefix,
        suite,
        base58_with_check(value, Some(suite))?
    ))
}

fn base58_with_check<T: StaticVariant>(value: &T, suite: Option<&str>) -> Result<String> {
    let wrapped = ChecksummedData::new(Payload(value), suite)?;
    let data = Zeroizing::new(raw::pack(&wrapped)?);
    Ok(bs58::encode(data.as_slice()).into_string())
}

fn encode_wif(payload: &[u8]) -> String {
    let mut data = Zeroizing::new(Vec::with_capacity(1 + payload.len() + CHECK_SIZE));
    data.push(WIF_VERSION);
    data.extend_from_slice(payload);
    let digest = double_sha256(&data);
    data.extend_from_slice(&digest[..CHECK_SIZE]);
    bs58::encode(data.as_slice()).into_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parses a canonical or legacy string.
pub fn decode<T: StaticVariant>(format: &KeyFormat, text: &str) -> Result<T> {
    if let Some(legacy) = format.legacy.as_ref().filter(|legacy| legacy.matches(text)) {
        return decode_legacy(legacy, text);
    }

    let (base, rest) = text
        .split_once('_')
        .ok_or_else(|| FcError::NoDelimiter(text.to_string()))?;
    if base != format.base_prefix {
        return Err(FcError::InvalidKeyPrefix {
            expected: format.base_prefix,
            input: text.to_string(),
        });
    }

    let (suite, data) = rest
        .split_once('_')
        .ok_or_else(|| FcError::NoDelimiter(text.to_string()))?;
    if data.is_empty() {
        return Err(FcError::EmptyKeyData(text.to_string()));
    }

    let which = format
        .suites
        .iter()
        .position(|candidate| *candidate == suite)
        .ok_or_else(|| FcError::NoMatchingSuite {
            prefix: suite.to_string(),
            data: data.to_string(),
        })?;

    let bytes = decode_base58(data)?;
    unpack_checked(which, &bytes, Some(suite)).inspect_err(|e| {
        if matches!(e, FcError::ChecksumMismatch { .. }) {
            debug!(suite, "Checksum mismatch in canonical string");
        }
    })
}

fn decode_legacy<T: StaticVariant>(legacy: &LegacyForm, text: &str) -> Result<T> {
    let data = &text[legacy.prefix.len()..];
    let bytes = decode_base58(data)?;

    match legacy.codec {
        LegacyCodec::Ripemd160 => unpack_checked(legacy.which, &bytes, None),
        LegacyCodec::Wif => decode_wif(legacy.which, &bytes),
    }
}

fn decode_wif<T: StaticVariant>(which: usize, bytes: &[u8]) -> Result<T> {
    if bytes.len() <= 1 + CHECK_SIZE {
        return Err(FcError::UnexpectedEof);
    }
    let (body, check) = bytes.split_at(bytes.len() - CHECK_SIZE);
    if body[0] != WIF_VERSION {
        return Err(FcError::Base58(format!(
            "expected WIF version byte 0x{WIF_VERSION:02x}, found 0x{:02x}",
            body[0]
        )));
    }

    let stored = le_u32(check);
    let computed = le_u32(&double_sha256(body));
    // Some wallets emitted a single SHA-256 checksum.
    if verify_checksum(stored, computed).is_err() {
        verify_checksum(stored, le_u32(&sha256(body))).map_err(|_| {
            debug!("Checksum mismatch in WIF string");
            FcError::ChecksumMismatch { stored, computed }
        })?;
    }

    let payload = &body[1..];
    let mut unpacker = Unpacker::new(payload);
    let value = T::unpack_alternative(which, &mut unpacker)?;
    match unpacker.remaining() {
        0 => Ok(value),
        remaining => Err(FcError::TrailingBytes { remaining }),
    }
}

/// Unpacks alternative `which` and its check, rejecting leftovers before the
/// check is verified.
fn unpack_checked<T: StaticVariant>(
    which: usize,
    bytes: &[u8],
    suite: Option<&str>,
) -> Result<T> {
    let mut unpacker = Unpacker::new(bytes);
    let wrapped =
        ChecksummedData::unpack_with(&mut unpacker, |s| T::unpack_alternative(which, s))?;
    if unpacker.remaining() > 0 {
        return Err(FcError::TrailingBytes {
            remaining: unpacker.remaining(),
        });
    }

    ChecksummedData {
        data: Payload(&wrapped.data),
        check: wrapped.check,
    }
    .verify(suite)?;
    Ok(wrapped.data)
}

fn decode_base58(data: &str) -> Result<Zeroizing<Vec<u8>>> {
    bs58::decode(data)
        .into_vec()
        .map(Zeroizing::new)
        .map_err(|e| FcError::Base58(e.to_string()))
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerfc_core::static_variant;

    static_variant! {
        @packed
        #[derive(Debug, Clone, PartialEq, Eq)]
        enum Tagged {
            Short([u8; 2]),
            Long([u8; 3]),
        }
    }

    const FORMAT: KeyFormat = KeyFormat {
        base_prefix: "TST",
        legacy: None,
        suites: &["S", "L"],
    };

    const LEGACY_FORMAT: KeyFormat = KeyFormat {
        base_prefix: "TST",
        legacy: Some(LegacyForm {
            which: 0,
            prefix: "OLD",
            codec: LegacyCodec::Ripemd160,
        }),
        suites: &["S", "L"],
    };

    const WIF_FORMAT: KeyFormat = KeyFormat {
        base_prefix: "TST",
        legacy: Some(LegacyForm {
            which: 1,
            prefix: "",
            codec: LegacyCodec::Wif,
        }),
        suites: &["S", "L"],
    };

    use crate::checksum::checksum;

    fn with_check(payload: &[u8], suite: Option<&str>, extra: &[u8]) -> String {
        let mut data = payload.to_vec();
        data.extend_from_slice(&checksum(payload, suite).to_le_bytes());
        data.extend_from_slice(extra);
        bs58::encode(data).into_string()
    }

    #[test]
    fn test_canonical_roundtrip() {
        let value = Tagged::Long([1, 2, 3]);
        let text = encode(&FORMAT, &value).unwrap();
        assert!(text.starts_with("TST_L_"));
        assert_eq!(decode::<Tagged>(&FORMAT, &text).unwrap(), value);
    }

    #[test]
    fn test_canonical_layout() {
        let text = encode(&FORMAT, &Tagged::Short([9, 9])).unwrap();
        assert_eq!(text, format!("TST_S_{}", with_check(&[9, 9], Some("S"), &[])));
    }

    #[test]
    fn test_legacy_roundtrip_and_detection() {
        let short = Tagged::Short([4, 5]);
        let text = encode(&LEGACY_FORMAT, &short).unwrap();
        assert_eq!(text, format!("OLD{}", with_check(&[4, 5], None, &[])));
        assert_eq!(decode::<Tagged>(&LEGACY_FORMAT, &text).unwrap(), short);

        // The canonical form of the legacy alternative is still accepted.
        let canonical = encode(&FORMAT, &short).unwrap();
        assert_eq!(decode::<Tagged>(&LEGACY_FORMAT, &canonical).unwrap(), short);

        // Other alternatives keep the canonical form.
        let long = encode(&LEGACY_FORMAT, &Tagged::Long([0; 3])).unwrap();
        assert!(long.starts_with("TST_L_"));
    }

    #[test]
    fn test_wif_roundtrip() {
        let value = Tagged::Long([7, 8, 9]);
        let text = encode(&WIF_FORMAT, &value).unwrap();
        assert!(!text.contains('_'));
        let raw = bs58::decode(&text).into_vec().unwrap();
        assert_eq!(raw[0], WIF_VERSION);
        assert_eq!(decode::<Tagged>(&WIF_FORMAT, &text).unwrap(), value);
    }

    #[test]
    fn test_wif_accepts_single_sha256_check() {
        let mut data = vec![WIF_VERSION, 7, 8, 9];
        let digest = sha256(&data);
        data.extend_from_slice(&digest[..4]);
        let text = bs58::encode(data).into_string();
        assert_eq!(
            decode::<Tagged>(&WIF_FORMAT, &text).unwrap(),
            Tagged::Long([7, 8, 9])
        );
    }

    #[test]
    fn test_wif_rejects_bad_version() {
        let mut data = vec![0x81, 7, 8, 9];
        let digest = double_sha256(&data);
        data.extend_from_slice(&digest[..4]);
        let text = bs58::encode(data).into_string();
        assert!(matches!(
            decode::<Tagged>(&WIF_FORMAT, &text),
            Err(FcError::Base58(_))
        ));
    }

    #[test]
    fn test_no_delimiter() {
        assert!(matches!(
            decode::<Tagged>(&FORMAT, "TSTabc"),
            Err(FcError::NoDelimiter(_))
        ));
        assert!(matches!(
            decode::<Tagged>(&FORMAT, "TST_Sabc"),
            Err(FcError::NoDelimiter(_))
        ));
    }

    #[test]
    fn test_wrong_base_prefix() {
        let err = decode::<Tagged>(&FORMAT, "SIG_S_abc").unwrap_err();
        assert!(matches!(err, FcError::InvalidKeyPrefix { expected: "TST", .. }));
    }

    #[test]
    fn test_empty_data() {
        let err = decode::<Tagged>(&FORMAT, "TST_S_").unwrap_err();
        assert!(matches!(err, FcError::EmptyKeyData(_)));
        assert!(err.is_lookup_failure());
    }

    #[test]
    fn test_unknown_suite() {
        let err = decode::<Tagged>(&FORMAT, "TST_XX_abc").unwrap_err();
        assert_eq!(err.to_string(), "no matching suite type for XX_abc");
    }

    #[test]
    fn test_trailing_bytes_checked_before_checksum() {
        let text = format!("TST_S_{}", with_check(&[1, 2], Some("S"), &[0xff]));
        assert!(matches!(
            decode::<Tagged>(&FORMAT, &text),
            Err(FcError::TrailingBytes { remaining: 1 })
        ));
    }

    #[test]
    fn test_checksum_is_suite_salted() {
        // A check salted for the wrong suite fails.
        let text = format!("TST_S_{}", with_check(&[1, 2], Some("L"), &[]));
        assert!(matches!(
            decode::<Tagged>(&FORMAT, &text),
            Err(FcError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_encoded_text_is_checksummed_payload() {
        let value = Tagged::Long([3, 1, 4]);
        let text = encode(&FORMAT, &value).unwrap();
        let bytes = bs58::decode(&text["TST_L_".len()..]).into_vec().unwrap();

        let wrapped = ChecksummedData::new(Payload(&value), Some("L")).unwrap();
        assert_eq!(bytes, raw::pack(&wrapped).unwrap());
        assert_eq!(&bytes[..3], &[3, 1, 4]);
    }

    #[test]
    fn test_flipped_check_byte() {
        let text = encode(&FORMAT, &Tagged::Short([5, 6])).unwrap();
        let mut bytes = bs58::decode(&text["TST_S_".len()..]).into_vec().unwrap();
        *bytes.last_mut().unwrap() ^= 0x01;
        let corrupted = format!("TST_S_{}", bs58::encode(bytes).into_string());
        assert!(matches!(
            decode::<Tagged>(&FORMAT, &corrupted),
            Err(FcError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let text = format!("TST_L_{}", bs58::encode([1u8, 2]).into_string());
        assert!(matches!(
            decode::<Tagged>(&FORMAT, &text),
            Err(FcError::UnexpectedEof)
        ));
    }

    proptest::proptest! {
        #[test]
        fn test_any_payload_roundtrips(
            bytes in proptest::array::uniform3(0u8..),
            legacy in proptest::bool::ANY,
        ) {
            let value = if legacy {
                Tagged::Short([bytes[0], bytes[1]])
            } else {
                Tagged::Long(bytes)
            };
            let format = LEGACY_FORMAT;
            let text = encode(&format, &value).unwrap();
            proptest::prop_assert_eq!(decode::<Tagged>(&format, &text).unwrap(), value);
        }
    }

    #[test]
    fn test_invalid_base58() {
        assert!(matches!(
            decode::<Tagged>(&FORMAT, "TST_S_0OIl"),
            Err(FcError::Base58(_))
        ));
    }
}
