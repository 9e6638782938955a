//! Dynamic value model.
//!
//! A [`Variant`] is a closed tagged union that any reflected type can be
//! converted to and from. It is the bridge between typed data and JSON.

mod convert;
mod json;
mod object;

use std::fmt;

use crate::error::{FcError, Result};

pub use convert::{from_variant, to_variant, FromVariant, ToVariant};
pub use json::{from_json, from_json_with, to_json, to_json_pretty};
pub use object::VariantObject;

/// Dynamically typed value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Variant {
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    String(String),
    Blob(Vec<u8>),
    Array(Vec<Variant>),
    Object(VariantObject),
}

impl Variant {
    /// Name of the active case, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Null => "null",
            Variant::Bool(_) => "bool",
            Variant::Int64(_) => "int64",
            Variant::Uint64(_) => "uint64",
            Variant::Double(_) => "double",
            Variant::String(_) => "string",
            Variant::Blob(_) => "blob",
            Variant::Array(_) => "array",
            Variant::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Variant::Int64(_) | Variant::Uint64(_) | Variant::Double(_)
        )
    }

    fn bad_cast(&self, expected: &'static str) -> FcError {
        FcError::BadCast {
            expected,
            actual: self.type_name(),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Variant::Bool(b) => Ok(*b),
            Variant::Int64(v) => Ok(*v != 0),
            Variant::Uint64(v) => Ok(*v != 0),
            Variant::Double(v) => Ok(*v != 0.0),
            Variant::String(s) if s == "true" => Ok(true),
            Variant::String(s) if s == "false" => Ok(false),
            other => Err(other.bad_cast("bool")),
        }
    }

    /// Signed view of a numeric, boolean or numeric-string variant.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Variant::Int64(v) => Ok(*v),
            Variant::Uint64(v) => i64::try_from(*v).map_err(|_| out_of_range(v, "int64")),
            Variant::Double(v) => double_to_i64(*v),
            Variant::Bool(b) => Ok(i64::from(*b)),
            Variant::String(s) => parse_numeric_str(s, "int64"),
            other => Err(other.bad_cast("int64")),
        }
    }

    /// Unsigned view of a numeric, boolean or numeric-string variant.
    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Variant::Uint64(v) => Ok(*v),
            Variant::Int64(v) => u64::try_from(*v).map_err(|_| out_of_range(v, "uint64")),
            Variant::Double(v) => {
                let i = double_to_i64(*v)?;
                u64::try_from(i).map_err(|_| out_of_range(v, "uint64"))
            }
            Variant::Bool(b) => Ok(u64::from(*b)),
            Variant::String(s) => parse_numeric_str(s, "uint64"),
            other => Err(other.bad_cast("uint64")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Variant::Double(v) => Ok(*v),
            Variant::Int64(v) => Ok(*v as f64),
            Variant::Uint64(v) => Ok(*v as f64),
            Variant::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Variant::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| out_of_range(s, "double")),
            other => Err(other.bad_cast("double")),
        }
    }

    /// Borrowed string, only for `String` variants.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Variant::String(s) => Ok(s),
            other => Err(other.bad_cast("string")),
        }
    }

    /// Text form of a scalar variant. Blobs render as lowercase hex.
    pub fn as_string(&self) -> Result<String> {
        match self {
            Variant::String(s) => Ok(s.clone()),
            Variant::Null => Ok(String::new()),
            Variant::Bool(b) => Ok(b.to_string()),
            Variant::Int64(v) => Ok(v.to_string()),
            Variant::Uint64(v) => Ok(v.to_string()),
            Variant::Double(v) => Ok(v.to_string()),
            Variant::Blob(b) => Ok(hex::encode(b)),
            other => Err(other.bad_cast("string")),
        }
    }

    pub fn as_array(&self) -> Result<&[Variant]> {
        match self {
            Variant::Array(items) => Ok(items),
            other => Err(other.bad_cast("array")),
        }
    }

    pub fn as_object(&self) -> Result<&VariantObject> {
        match self {
            Variant::Object(object) => Ok(object),
            other => Err(other.bad_cast("object")),
        }
    }

    /// Raw bytes of a blob, or the decoded bytes of a hex string.
    pub fn as_blob(&self) -> Result<Vec<u8>> {
        match self {
            Variant::Blob(b) => Ok(b.clone()),
            Variant::String(s) => Ok(hex::decode(s)?),
            other => Err(other.bad_cast("blob")),
        }
    }

    /// Field lookup on an object variant.
    pub fn get(&self, key: &str) -> Option<&Variant> {
        match self {
            Variant::Object(object) => object.get(key),
            _ => None,
        }
    }

    /// Nesting depth: scalars are 1, each array or object level adds one.
    pub fn depth(&self) -> usize {
        match self {
            Variant::Array(items) => 1 + items.iter().map(Variant::depth).max().unwrap_or(0),
            Variant::Object(object) => {
                1 + object.iter().map(|(_, v)| v.depth()).max().unwrap_or(0)
            }
            _ => 1,
        }
    }
}

fn out_of_range(value: impl fmt::Display, target: &'static str) -> FcError {
    FcError::OutOfRange {
        value: value.to_string(),
        target,
    }
}

// Doubles convert only when integral and within range.
fn double_to_i64(v: f64) -> Result<i64> {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Ok(v as i64)
    } else {
        Err(out_of_range(v, "int64"))
    }
}

fn parse_numeric_str<T: std::str::FromStr>(s: &str, target: &'static str) -> Result<T> {
    s.trim().parse::<T>().map_err(|_| out_of_range(s, target))
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{}>", self.type_name()),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $case:ident as $target:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(v: $ty) -> Self {
                    Variant::$case(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_scalar!(
    bool => Bool as bool,
    i8 => Int64 as i64,
    i16 => Int64 as i64,
    i32 => Int64 as i64,
    i64 => Int64 as i64,
    u8 => Uint64 as u64,
    u16 => Uint64 as u64,
    u32 => Uint64 as u64,
    u64 => Uint64 as u64,
    f32 => Double as f64,
    f64 => Double as f64,
    String => String as String,
    VariantObject => Object as VariantObject,
);

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_owned())
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(items: Vec<Variant>) -> Self {
        Variant::Array(items)
    }
}
