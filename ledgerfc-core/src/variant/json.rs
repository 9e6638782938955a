//! JSON text form of [`Variant`], via `serde_json`.
//!
//! Blobs are written as lowercase hex strings. Parsing never produces a blob:
//! a hex string stays a `String` until [`Variant::as_blob`] or a typed
//! conversion reads it.

use std::cell::Cell;
use std::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tracing::debug;

use crate::config::CodecConfig;
use crate::error::{FcError, Result};

use super::object::ObjectBuilder;
use super::{FromVariant, ToVariant, Variant, VariantObject};

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Variant::Null => serializer.serialize_unit(),
            Variant::Bool(b) => serializer.serialize_bool(*b),
            Variant::Int64(v) => serializer.serialize_i64(*v),
            Variant::Uint64(v) => serializer.serialize_u64(*v),
            Variant::Double(v) => serializer.serialize_f64(*v),
            Variant::String(s) => serializer.serialize_str(s),
            Variant::Blob(b) => serializer.serialize_str(&hex::encode(b)),
            Variant::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Variant::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in object.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for VariantObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Limits applied while a document streams in.
///
/// The first violation is parked in `violation` so the caller can report it
/// instead of the `serde_json` error that carried it out of the parser.
#[derive(Clone, Copy)]
struct Limits<'a> {
    config: &'a CodecConfig,
    depth: usize,
    violation: &'a Cell<Option<FcError>>,
}

impl Limits<'_> {
    fn nested(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn reject<E: de::Error>(&self, err: FcError) -> E {
        let message = err.to_string();
        self.violation.set(Some(err));
        E::custom(message)
    }

    fn check_depth<E: de::Error>(&self) -> std::result::Result<(), E> {
        if self.depth > self.config.max_recursion_depth {
            return Err(self.reject(FcError::RecursionLimit {
                max: self.config.max_recursion_depth,
            }));
        }
        Ok(())
    }

    fn check_count<E: de::Error>(
        &self,
        what: &'static str,
        count: usize,
    ) -> std::result::Result<(), E> {
        self.config
            .check_count(what, count as u64)
            .map(|_| ())
            .map_err(|e| self.reject(e))
    }
}

impl<'de> DeserializeSeed<'de> for Limits<'_> {
    type Value = Variant;

    fn deserialize<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Variant, D::Error> {
        self.check_depth::<D::Error>()?;
        d.deserialize_any(VariantVisitor { limits: Some(self) })
    }
}

/// Builds a [`Variant`]; unbounded unless `limits` is set.
struct VariantVisitor<'a> {
    limits: Option<Limits<'a>>,
}

impl VariantVisitor<'_> {
    fn count<E: de::Error>(
        &self,
        what: &'static str,
        count: usize,
    ) -> std::result::Result<(), E> {
        match &self.limits {
            Some(limits) => limits.check_count(what, count),
            None => Ok(()),
        }
    }
}

impl<'de> Visitor<'de> for VariantVisitor<'_> {
    type Value = Variant;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Variant, E> {
        Ok(Variant::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Variant, E> {
        Ok(Variant::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Variant, D::Error> {
        match self.limits {
            Some(limits) => limits.deserialize(d),
            None => Variant::deserialize(d),
        }
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Variant, E> {
        Ok(Variant::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Variant, E> {
        Ok(Variant::Int64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Variant, E> {
        Ok(Variant::Uint64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Variant, E> {
        Ok(Variant::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Variant, E> {
        Ok(Variant::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Variant, E> {
        Ok(Variant::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Variant, E> {
        Ok(Variant::Blob(v.to_vec()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Variant, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        loop {
            let item = match self.limits {
                Some(limits) => seq.next_element_seed(limits.nested())?,
                None => seq.next_element()?,
            };
            let Some(item) = item else { break };
            items.push(item);
            self.count::<A::Error>("array", items.len())?;
        }
        Ok(Variant::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Variant, A::Error> {
        let mut object = ObjectBuilder::default();
        while let Some(key) = map.next_key::<String>()? {
            let value = match self.limits {
                Some(limits) => map.next_value_seed(limits.nested())?,
                None => map.next_value()?,
            };
            object.insert(key, value);
            self.count::<A::Error>("object", object.len())?;
        }
        Ok(Variant::Object(object.finish()))
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        d.deserialize_any(VariantVisitor { limits: None })
    }
}

impl<'de> Deserialize<'de> for VariantObject {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        match Variant::deserialize(d)? {
            Variant::Object(object) => Ok(object),
            other => Err(de::Error::invalid_type(
                de::Unexpected::Other(other.type_name()),
                &"a JSON object",
            )),
        }
    }
}

impl Variant {
    /// Compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON text.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses JSON text with the default limits.
    pub fn from_json(text: &str) -> Result<Variant> {
        Self::from_json_with(text, &CodecConfig::default())
    }

    /// Parses JSON text, rejecting trees deeper or wider than `config` allows.
    ///
    /// Limits are enforced while the text is read: parsing stops at the first
    /// array or object that grows past `max_num_array_elements` and at the
    /// first value nested past `max_recursion_depth`.
    pub fn from_json_with(text: &str, config: &CodecConfig) -> Result<Variant> {
        let violation = Cell::new(None);
        let limits = Limits {
            config,
            depth: 1,
            violation: &violation,
        };

        let mut deserializer = serde_json::Deserializer::from_str(text);
        let parsed = limits
            .deserialize(&mut deserializer)
            .and_then(|v| deserializer.end().map(|()| v));
        match (parsed, violation.take()) {
            (Ok(v), _) => Ok(v),
            (Err(_), Some(err)) => {
                debug!(error = %err, "Rejected JSON document");
                Err(err)
            }
            (Err(e), None) => Err(e.into()),
        }
    }
}

/// Serializes any convertible value to compact JSON.
pub fn to_json<T: ToVariant + ?Sized>(value: &T) -> Result<String> {
    value.to_variant()?.to_json()
}

/// Serializes any convertible value to indented JSON.
pub fn to_json_pretty<T: ToVariant + ?Sized>(value: &T) -> Result<String> {
    value.to_variant()?.to_json_pretty()
}

/// Parses JSON text into a typed value.
pub fn from_json<T: FromVariant>(text: &str) -> Result<T> {
    from_json_with(text, &CodecConfig::default())
}

/// Parses JSON text into a typed value under explicit limits.
pub fn from_json_with<T: FromVariant>(text: &str, config: &CodecConfig) -> Result<T> {
    T::from_variant(&Variant::from_json_with(text, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scalars_parse_to_matching_cases() {
        let v = Variant::from_json(r#"[null, true, -5, 5, 1.5, "s"]"#).unwrap();
        assert_eq!(
            v,
            Variant::Array(vec![
                Variant::Null,
                Variant::Bool(true),
                Variant::Int64(-5),
                Variant::Uint64(5),
                Variant::Double(1.5),
                Variant::from("s"),
            ])
        );
    }

    #[test]
    fn test_object_key_order_preserved() {
        let text = r#"{"zeta":1,"alpha":2}"#;
        let v = Variant::from_json(text).unwrap();
        assert_eq!(v.to_json().unwrap(), text);
    }

    #[test]
    fn test_blob_serializes_as_hex() {
        let v = Variant::Blob(vec![0, 1, 2]);
        assert_eq!(v.to_json().unwrap(), r#""000102""#);
    }

    #[test]
    fn test_blob_survives_json_text() {
        let v = Variant::Blob(vec![0, 1, 2]);
        let parsed = Variant::from_json(&v.to_json().unwrap()).unwrap();
        assert_eq!(parsed.as_blob().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_depth_limit() {
        let config = CodecConfig::new().with_max_recursion_depth(3);
        assert!(Variant::from_json_with("[[1]]", &config).is_ok());

        let err = Variant::from_json_with("[[[1]]]", &config).unwrap_err();
        assert!(matches!(err, FcError::RecursionLimit { max: 3 }));
    }

    #[test]
    fn test_width_limit() {
        let config = CodecConfig::new().with_max_array_elements(2);
        let err = Variant::from_json_with("[1,2,3]", &config).unwrap_err();
        assert!(err.is_bound_violation());
    }

    #[test]
    fn test_object_width_limit() {
        let config = CodecConfig::new().with_max_array_elements(2);
        assert!(Variant::from_json_with(r#"{"a":1,"b":2}"#, &config).is_ok());

        let err = Variant::from_json_with(r#"{"a":1,"b":2,"c":3}"#, &config).unwrap_err();
        assert!(matches!(
            err,
            FcError::BoundViolation {
                what: "object",
                count: 3,
                max: 2
            }
        ));
    }

    #[test]
    fn test_width_limit_stops_at_first_excess_element() {
        // The rest of the text is malformed; the limit is reported because
        // reading stops before reaching it.
        let config = CodecConfig::new().with_max_array_elements(2);
        let err = Variant::from_json_with("[1,2,3,{oops", &config).unwrap_err();
        assert!(matches!(err, FcError::BoundViolation { count: 3, .. }));
    }

    #[test]
    fn test_nested_width_limit() {
        let config = CodecConfig::new().with_max_array_elements(2);
        let err = Variant::from_json_with(r#"{"a":[1,2,3]}"#, &config).unwrap_err();
        assert!(matches!(err, FcError::BoundViolation { what: "array", .. }));
    }

    #[test]
    fn test_trailing_text_rejected() {
        assert!(matches!(
            Variant::from_json("[1] [2]"),
            Err(FcError::Json(_))
        ));
    }

    #[test]
    fn test_duplicate_keys_keep_last_value() {
        let v = Variant::from_json(r#"{"k":1,"j":2,"k":3}"#).unwrap();
        assert_eq!(v.to_json().unwrap(), r#"{"k":3,"j":2}"#);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Variant::from_json("{not json"),
            Err(FcError::Json(_))
        ));
    }

    #[test]
    fn test_typed_json_helpers() {
        let text = to_json(&vec![1u32, 2]).unwrap();
        assert_eq!(text, "[1,2]");
        assert_eq!(from_json::<Vec<u32>>(&text).unwrap(), vec![1, 2]);
    }

    fn arb_variant() -> impl Strategy<Value = Variant> {
        let leaf = prop_oneof![
            Just(Variant::Null),
            any::<bool>().prop_map(Variant::Bool),
            (i64::MIN..0i64).prop_map(Variant::Int64),
            any::<u64>().prop_map(Variant::Uint64),
            "[a-z0-9 ]{0,12}".prop_map(Variant::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(Variant::Array),
                proptest::collection::vec(("[a-z]{1,6}", inner), 0..6)
                    .prop_map(|entries| Variant::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_json_roundtrip(v in arb_variant()) {
            let text = v.to_json().unwrap();
            prop_assert_eq!(Variant::from_json(&text).unwrap(), v);
        }
    }
}
