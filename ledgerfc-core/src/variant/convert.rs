//! Conversions between typed values and [`Variant`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use crate::constants::MAX_NUM_ARRAY_ELEMENTS;
use crate::error::{FcError, Result};

use super::{Variant, VariantObject};

/// Types with a dynamic [`Variant`] form.
pub trait ToVariant {
    fn to_variant(&self) -> Result<Variant>;
}

/// Types that can be rebuilt from a [`Variant`].
pub trait FromVariant: Sized {
    fn from_variant(v: &Variant) -> Result<Self>;

    /// Value used when a reflected field is missing from its object.
    ///
    /// `None` makes the field mandatory. Only `Option<T>` overrides this.
    fn absent() -> Option<Self> {
        None
    }
}

/// Converts any convertible value to a [`Variant`].
pub fn to_variant<T: ToVariant + ?Sized>(value: &T) -> Result<Variant> {
    value.to_variant()
}

/// Rebuilds a typed value from a [`Variant`].
pub fn from_variant<T: FromVariant>(v: &Variant) -> Result<T> {
    T::from_variant(v)
}

fn check_len(what: &'static str, len: usize) -> Result<()> {
    if len > MAX_NUM_ARRAY_ELEMENTS {
        return Err(FcError::BoundViolation {
            what,
            count: len as u64,
            max: MAX_NUM_ARRAY_ELEMENTS,
        });
    }
    Ok(())
}

fn seq_to_variant<'a, T, I>(what: &'static str, len: usize, items: I) -> Result<Variant>
where
    T: ToVariant + 'a,
    I: Iterator<Item = &'a T>,
{
    check_len(what, len)?;
    items
        .map(ToVariant::to_variant)
        .collect::<Result<Vec<_>>>()
        .map(Variant::Array)
}

fn seq_from_variant<T, C>(what: &'static str, v: &Variant) -> Result<C>
where
    T: FromVariant,
    C: FromIterator<T>,
{
    let items = v.as_array()?;
    check_len(what, items.len())?;
    items.iter().map(T::from_variant).collect()
}

fn pair_to_variant<K: ToVariant, V: ToVariant>(key: &K, value: &V) -> Result<Variant> {
    Ok(Variant::Array(vec![key.to_variant()?, value.to_variant()?]))
}

fn pair_from_variant<K: FromVariant, V: FromVariant>(v: &Variant) -> Result<(K, V)> {
    match v.as_array()? {
        [key, value] => Ok((K::from_variant(key)?, V::from_variant(value)?)),
        _ => Err(FcError::BadCast {
            expected: "[key, value] pair",
            actual: "array",
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCALARS
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! impl_signed {
    ($($ty:ty),+) => {
        $(
            impl ToVariant for $ty {
                fn to_variant(&self) -> Result<Variant> {
                    Ok(Variant::Int64(i64::from(*self)))
                }
            }

            impl FromVariant for $ty {
                fn from_variant(v: &Variant) -> Result<Self> {
                    let wide = v.as_i64()?;
                    <$ty>::try_from(wide).map_err(|_| FcError::OutOfRange {
                        value: wide.to_string(),
                        target: stringify!($ty),
                    })
                }
            }
        )+
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),+) => {
        $(
            impl ToVariant for $ty {
                fn to_variant(&self) -> Result<Variant> {
                    Ok(Variant::Uint64(u64::from(*self)))
                }
            }

            impl FromVariant for $ty {
                fn from_variant(v: &Variant) -> Result<Self> {
                    let wide = v.as_u64()?;
                    <$ty>::try_from(wide).map_err(|_| FcError::OutOfRange {
                        value: wide.to_string(),
                        target: stringify!($ty),
                    })
                }
            }
        )+
    };
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl ToVariant for bool {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Bool(*self))
    }
}

impl FromVariant for bool {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_bool()
    }
}

impl ToVariant for f64 {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Double(*self))
    }
}

impl FromVariant for f64 {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_f64()
    }
}

impl ToVariant for f32 {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Double(f64::from(*self)))
    }
}

impl FromVariant for f32 {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_f64().map(|d| d as f32)
    }
}

impl ToVariant for str {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::String(self.to_owned()))
    }
}

impl ToVariant for String {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::String(self.clone()))
    }
}

impl FromVariant for String {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_string()
    }
}

impl ToVariant for () {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Null)
    }
}

impl FromVariant for () {
    fn from_variant(_v: &Variant) -> Result<Self> {
        Ok(())
    }
}

impl ToVariant for Variant {
    fn to_variant(&self) -> Result<Variant> {
        Ok(self.clone())
    }
}

impl FromVariant for Variant {
    fn from_variant(v: &Variant) -> Result<Self> {
        Ok(v.clone())
    }
}

impl ToVariant for VariantObject {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::Object(self.clone()))
    }
}

impl FromVariant for VariantObject {
    fn from_variant(v: &Variant) -> Result<Self> {
        v.as_object().cloned()
    }
}

/// Fixed byte arrays render as lowercase hex.
impl<const N: usize> ToVariant for [u8; N] {
    fn to_variant(&self) -> Result<Variant> {
        Ok(Variant::String(hex::encode(self)))
    }
}

impl<const N: usize> FromVariant for [u8; N] {
    fn from_variant(v: &Variant) -> Result<Self> {
        let bytes = v.as_blob()?;
        let actual = bytes.len();
        bytes
            .try_into()
            .map_err(|_| FcError::InvalidLength { expected: N, actual })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WRAPPERS
// ═══════════════════════════════════════════════════════════════════════════════

impl<T: ToVariant + ?Sized> ToVariant for &T {
    fn to_variant(&self) -> Result<Variant> {
        (**self).to_variant()
    }
}

impl<T: ToVariant + ?Sized> ToVariant for Box<T> {
    fn to_variant(&self) -> Result<Variant> {
        (**self).to_variant()
    }
}

impl<T: FromVariant> FromVariant for Box<T> {
    fn from_variant(v: &Variant) -> Result<Self> {
        T::from_variant(v).map(Box::new)
    }
}

impl<T: ToVariant> ToVariant for Option<T> {
    fn to_variant(&self) -> Result<Variant> {
        match self {
            Some(value) => value.to_variant(),
            None => Ok(Variant::Null),
        }
    }
}

impl<T: FromVariant> FromVariant for Option<T> {
    fn from_variant(v: &Variant) -> Result<Self> {
        match v {
            Variant::Null => Ok(None),
            other => T::from_variant(other).map(Some),
        }
    }

    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<A: ToVariant, B: ToVariant> ToVariant for (A, B) {
    fn to_variant(&self) -> Result<Variant> {
        pair_to_variant(&self.0, &self.1)
    }
}

impl<A: FromVariant, B: FromVariant> FromVariant for (A, B) {
    fn from_variant(v: &Variant) -> Result<Self> {
        pair_from_variant(v)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTAINERS
// ═══════════════════════════════════════════════════════════════════════════════

impl<T: ToVariant> ToVariant for [T] {
    fn to_variant(&self) -> Result<Variant> {
        seq_to_variant("vector", self.len(), self.iter())
    }
}

impl<T: ToVariant> ToVariant for Vec<T> {
    fn to_variant(&self) -> Result<Variant> {
        self.as_slice().to_variant()
    }
}

impl<T: FromVariant> FromVariant for Vec<T> {
    fn from_variant(v: &Variant) -> Result<Self> {
        seq_from_variant("vector", v)
    }
}

impl<T: ToVariant> ToVariant for VecDeque<T> {
    fn to_variant(&self) -> Result<Variant> {
        seq_to_variant("deque", self.len(), self.iter())
    }
}

impl<T: FromVariant> FromVariant for VecDeque<T> {
    fn from_variant(v: &Variant) -> Result<Self> {
        seq_from_variant("deque", v)
    }
}

impl<T: ToVariant> ToVariant for BTreeSet<T> {
    fn to_variant(&self) -> Result<Variant> {
        seq_to_variant("set", self.len(), self.iter())
    }
}

impl<T: FromVariant + Ord> FromVariant for BTreeSet<T> {
    fn from_variant(v: &Variant) -> Result<Self> {
        seq_from_variant("set", v)
    }
}

impl<T: ToVariant, H> ToVariant for HashSet<T, H> {
    fn to_variant(&self) -> Result<Variant> {
        seq_to_variant("set", self.len(), self.iter())
    }
}

impl<T: FromVariant + Eq + Hash> FromVariant for HashSet<T> {
    fn from_variant(v: &Variant) -> Result<Self> {
        seq_from_variant("set", v)
    }
}

/// Maps become an array of `[key, value]` pairs.
impl<K: ToVariant, V: ToVariant> ToVariant for BTreeMap<K, V> {
    fn to_variant(&self) -> Result<Variant> {
        check_len("map", self.len())?;
        self.iter()
            .map(|(k, v)| pair_to_variant(k, v))
            .collect::<Result<Vec<_>>>()
            .map(Variant::Array)
    }
}

impl<K: FromVariant + Ord, V: FromVariant> FromVariant for BTreeMap<K, V> {
    fn from_variant(v: &Variant) -> Result<Self> {
        let items = v.as_array()?;
        check_len("map", items.len())?;
        items.iter().map(pair_from_variant).collect()
    }
}

impl<K: ToVariant, V: ToVariant, H> ToVariant for HashMap<K, V, H> {
    fn to_variant(&self) -> Result<Variant> {
        check_len("map", self.len())?;
        self.iter()
            .map(|(k, v)| pair_to_variant(k, v))
            .collect::<Result<Vec<_>>>()
            .map(Variant::Array)
    }
}

impl<K: FromVariant + Eq + Hash, V: FromVariant> FromVariant for HashMap<K, V> {
    fn from_variant(v: &Variant) -> Result<Self> {
        let items = v.as_array()?;
        check_len("map", items.len())?;
        items.iter().map(pair_from_variant).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_narrowing_is_checked() {
        assert_eq!(u8::from_variant(&Variant::Uint64(255)).unwrap(), 255);
        let err = u8::from_variant(&Variant::Uint64(256)).unwrap_err();
        assert!(matches!(err, FcError::OutOfRange { target: "u8", .. }));
        assert!(i8::from_variant(&Variant::Int64(-129)).is_err());
        assert_eq!(i32::from_variant(&Variant::from("-12")).unwrap(), -12);
    }

    #[test]
    fn test_option_from_null() {
        assert_eq!(Option::<u32>::from_variant(&Variant::Null).unwrap(), None);
        assert_eq!(
            Option::<u32>::from_variant(&Variant::Uint64(3)).unwrap(),
            Some(3)
        );
        assert_eq!(Option::<u32>::absent(), Some(None));
        assert_eq!(u32::absent(), None);
    }

    #[test]
    fn test_sequence_shape() {
        let v = vec![1u16, 2, 3].to_variant().unwrap();
        assert_eq!(
            v,
            Variant::Array(vec![
                Variant::Uint64(1),
                Variant::Uint64(2),
                Variant::Uint64(3)
            ])
        );
        assert_eq!(Vec::<u16>::from_variant(&v).unwrap(), vec![1, 2, 3]);
        assert!(Vec::<u16>::from_variant(&Variant::from("x")).is_err());
    }

    #[test]
    fn test_map_becomes_pairs() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1i32);
        let v = map.to_variant().unwrap();
        assert_eq!(
            v,
            Variant::Array(vec![Variant::Array(vec![
                Variant::from("a"),
                Variant::Int64(1)
            ])])
        );
        assert_eq!(BTreeMap::<String, i32>::from_variant(&v).unwrap(), map);
    }

    #[test]
    fn test_malformed_pair_rejected() {
        let v = Variant::Array(vec![Variant::Array(vec![Variant::Int64(1)])]);
        assert!(BTreeMap::<i32, i32>::from_variant(&v).is_err());
    }

    #[test]
    fn test_byte_array_hex() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        let v = bytes.to_variant().unwrap();
        assert_eq!(v, Variant::from("deadbeef"));
        assert_eq!(<[u8; 4]>::from_variant(&v).unwrap(), bytes);

        let err = <[u8; 3]>::from_variant(&v).unwrap_err();
        assert!(matches!(err, FcError::InvalidLength { expected: 3, actual: 4 }));
    }
}
