//! Structural reflection for aggregate types.
//!
//! A type registered with [`reflect!`](crate::reflect!) exposes its fields in
//! a fixed order through [`Reflect`]. That order drives both the binary wire
//! form and the variant object form, so the codecs never need per-type code.
//!
//! ```
//! use ledgerfc_core::{raw, reflect, variant::ToVariant};
//!
//! #[derive(Debug, PartialEq)]
//! struct Transfer {
//!     from: String,
//!     to: String,
//!     amount: u64,
//!     memo: Option<String>,
//! }
//!
//! reflect!(Transfer { from, to, amount, memo });
//!
//! let t = Transfer {
//!     from: "alice".into(),
//!     to: "bob".into(),
//!     amount: 10,
//!     memo: None,
//! };
//! let bytes = raw::pack(&t).unwrap();
//! assert_eq!(raw::unpack::<Transfer>(&bytes).unwrap(), t);
//! assert_eq!(t.to_variant().unwrap().get("amount").unwrap().as_u64().unwrap(), 10);
//! ```

use std::io::{Read, Write};

use crate::error::{FcError, Result};
use crate::raw::{Pack, Packer, Unpack, Unpacker};
use crate::variant::{FromVariant, ToVariant, Variant, VariantObject};

/// Read side of a reflection walk: receives each field in order.
pub trait FieldVisitor {
    fn visit_field<T: Pack + ToVariant + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<()>;
}

/// Write side of a reflection walk: produces each field in order.
pub trait FieldSource {
    fn next_field<T: Unpack + FromVariant>(&mut self, name: &'static str) -> Result<T>;
}

/// Ordered field descriptor of an aggregate type.
pub trait Reflect: Sized {
    /// Type name, used in error messages.
    const NAME: &'static str;
    /// Field names in declaration order.
    const FIELDS: &'static [&'static str];

    fn visit_fields<V: FieldVisitor>(&self, visitor: &mut V) -> Result<()>;

    fn build_fields<S: FieldSource>(source: &mut S) -> Result<Self>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW CODEC
// ═══════════════════════════════════════════════════════════════════════════════

struct PackFields<'a, W: Write> {
    packer: &'a mut Packer<W>,
}

impl<W: Write> FieldVisitor for PackFields<'_, W> {
    fn visit_field<T: Pack + ToVariant + ?Sized>(
        &mut self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.pack(&mut *self.packer)
    }
}

struct UnpackFields<'a, R: Read> {
    unpacker: &'a mut Unpacker<R>,
}

impl<R: Read> FieldSource for UnpackFields<'_, R> {
    fn next_field<T: Unpack + FromVariant>(&mut self, _name: &'static str) -> Result<T> {
        T::unpack(&mut *self.unpacker)
    }
}

/// Packs every field of `value` in order.
pub fn pack_fields<T: Reflect, W: Write>(value: &T, s: &mut Packer<W>) -> Result<()> {
    value.visit_fields(&mut PackFields { packer: s })
}

/// Unpacks every field of `T` in order.
pub fn unpack_fields<T: Reflect, R: Read>(s: &mut Unpacker<R>) -> Result<T> {
    T::build_fields(&mut UnpackFields { unpacker: s })
}

// ═══════════════════════════════════════════════════════════════════════════════
// VARIANT BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

struct ObjectBuilder {
    object: VariantObject,
}

impl FieldVisitor for ObjectBuilder {
    fn visit_field<T: Pack + ToVariant + ?Sized>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        let v = value.to_variant().map_err(|e| e.in_field(name))?;
        self.object.set(name, v);
        Ok(())
    }
}

struct ObjectReader<'a> {
    type_name: &'static str,
    object: &'a VariantObject,
}

impl FieldSource for ObjectReader<'_> {
    fn next_field<T: Unpack + FromVariant>(&mut self, name: &'static str) -> Result<T> {
        match self.object.get(name) {
            Some(v) => T::from_variant(v).map_err(|e| e.in_field(name)),
            None => T::absent().ok_or(FcError::MissingField {
                type_name: self.type_name,
                field: name,
            }),
        }
    }
}

/// Builds an object whose keys are exactly `T::FIELDS`, in order.
pub fn fields_to_variant<T: Reflect>(value: &T) -> Result<Variant> {
    let mut builder = ObjectBuilder {
        object: VariantObject::with_capacity(T::FIELDS.len()),
    };
    value.visit_fields(&mut builder)?;
    Ok(Variant::Object(builder.object))
}

/// Rebuilds `T` from an object. Unknown keys are ignored.
pub fn fields_from_variant<T: Reflect>(v: &Variant) -> Result<T> {
    let object = v.as_object()?;
    T::build_fields(&mut ObjectReader {
        type_name: T::NAME,
        object,
    })
}

/// Registers an aggregate's fields and derives its codecs.
///
/// `reflect!(Type { a, b, c })` implements [`Reflect`], [`Pack`], [`Unpack`],
/// [`ToVariant`] and [`FromVariant`] for `Type`. The listed order is the wire
/// order and must name every field.
#[macro_export]
macro_rules! reflect {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            const NAME: &'static str = stringify!($ty);
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

            #[allow(unused_variables)]
            fn visit_fields<V: $crate::reflect::FieldVisitor>(
                &self,
                visitor: &mut V,
            ) -> $crate::Result<()> {
                $( visitor.visit_field(stringify!($field), &self.$field)?; )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn build_fields<S: $crate::reflect::FieldSource>(
                source: &mut S,
            ) -> $crate::Result<Self> {
                Ok(Self {
                    $( $field: source.next_field(stringify!($field))?, )*
                })
            }
        }

        impl $crate::raw::Pack for $ty {
            fn pack<W: ::std::io::Write>(
                &self,
                s: &mut $crate::raw::Packer<W>,
            ) -> $crate::Result<()> {
                $crate::reflect::pack_fields(self, s)
            }
        }

        impl $crate::raw::Unpack for $ty {
            fn unpack<R: ::std::io::Read>(
                s: &mut $crate::raw::Unpacker<R>,
            ) -> $crate::Result<Self> {
                $crate::reflect::unpack_fields(s)
            }
        }

        impl $crate::variant::ToVariant for $ty {
            fn to_variant(&self) -> $crate::Result<$crate::variant::Variant> {
                $crate::reflect::fields_to_variant(self)
            }
        }

        impl $crate::variant::FromVariant for $ty {
            fn from_variant(v: &$crate::variant::Variant) -> $crate::Result<Self> {
                $crate::reflect::fields_from_variant(v)
            }
        }
    };
}
