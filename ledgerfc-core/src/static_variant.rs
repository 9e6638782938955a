//! Closed tagged sum types.
//!
//! [`static_variant!`](crate::static_variant!) turns an enum of single-payload
//! tuple variants into a sum type whose wire form is `which` followed by the
//! active payload, and whose variant form is the pair `[which, payload]`.
//! Ordering and equality come from `derive`, which compares the discriminant
//! first and only compiles when every payload supports it.

use std::io::{Read, Write};

use tracing::debug;

use crate::error::{FcError, Result};
use crate::raw::{Pack, Packer, UnsignedInt, Unpack, Unpacker};
use crate::variant::{ToVariant, Variant};

/// Receives the active alternative of a sum type.
pub trait AlternativeVisitor {
    type Output;

    fn visit<T: Pack + ToVariant>(self, which: usize, value: &T) -> Self::Output;
}

/// A closed, ordered set of alternatives with one active at a time.
pub trait StaticVariant: Sized {
    /// Number of alternatives.
    const COUNT: usize;
    /// Alternative names in declaration order.
    const NAMES: &'static [&'static str];

    /// Zero-based index of the active alternative.
    fn which(&self) -> usize;

    /// Calls `visitor` with the active payload.
    fn visit<V: AlternativeVisitor>(&self, visitor: V) -> V::Output;

    /// Unpacks the payload of alternative `which`.
    fn unpack_alternative<R: Read>(which: usize, s: &mut Unpacker<R>) -> Result<Self>;

    /// Converts `v` into the payload of alternative `which`.
    fn alternative_from_variant(which: usize, v: &Variant) -> Result<Self>;

    /// Name of the active alternative.
    fn name(&self) -> &'static str {
        Self::NAMES.get(self.which()).copied().unwrap_or_default()
    }
}

fn invalid_which<T: StaticVariant>(which: u64) -> FcError {
    FcError::InvalidWhich {
        which,
        count: T::COUNT,
    }
}

struct PackAlternative<'a, W: Write> {
    packer: &'a mut Packer<W>,
}

impl<W: Write> AlternativeVisitor for PackAlternative<'_, W> {
    type Output = Result<()>;

    fn visit<T: Pack + ToVariant>(self, _which: usize, value: &T) -> Result<()> {
        value.pack(self.packer)
    }
}

struct VariantAlternative;

impl AlternativeVisitor for VariantAlternative {
    type Output = Result<Variant>;

    fn visit<T: Pack + ToVariant>(self, which: usize, value: &T) -> Result<Variant> {
        Ok(Variant::Array(vec![
            Variant::Uint64(which as u64),
            value.to_variant()?,
        ]))
    }
}

/// Packs `which` then the active payload.
pub fn pack_variant<T: StaticVariant, W: Write>(value: &T, s: &mut Packer<W>) -> Result<()> {
    let which = value.which();
    let tag = u32::try_from(which).map_err(|_| invalid_which::<T>(which as u64))?;
    UnsignedInt(tag).pack(s)?;
    value.visit(PackAlternative { packer: s })
}

/// Packs the active payload alone, without `which`.
pub fn pack_payload<T: StaticVariant, W: Write>(value: &T, s: &mut Packer<W>) -> Result<()> {
    value.visit(PackAlternative { packer: s })
}

/// Reads `which`, rejects it if out of range, then reads that payload.
pub fn unpack_variant<T: StaticVariant, R: Read>(s: &mut Unpacker<R>) -> Result<T> {
    let which = UnsignedInt::unpack(s)?.0;
    if which as usize >= T::COUNT {
        debug!(which, count = T::COUNT, "Rejected static_variant index");
        return Err(invalid_which::<T>(u64::from(which)));
    }
    T::unpack_alternative(which as usize, s)
}

/// Variant form `[which, payload]`.
pub fn variant_form<T: StaticVariant>(value: &T) -> Result<Variant> {
    value.visit(VariantAlternative)
}

/// Parses the variant form `[which, payload]`.
pub fn from_variant_form<T: StaticVariant>(v: &Variant) -> Result<T> {
    let [which, payload] = v.as_array()? else {
        return Err(FcError::BadCast {
            expected: "[which, value] pair",
            actual: v.type_name(),
        });
    };
    let which = which.as_u64()?;
    if which >= T::COUNT as u64 {
        return Err(invalid_which::<T>(which));
    }
    T::alternative_from_variant(which as usize, payload)
}

/// Declares a closed sum type.
///
/// ```
/// use ledgerfc_core::{raw, static_variant, static_variant::StaticVariant};
///
/// static_variant! {
///     #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
///     pub enum Amount {
///         Small(u8),
///         Large(u64),
///     }
/// }
///
/// let a = Amount::from(300u64);
/// assert_eq!(a.which(), 1);
/// assert_eq!(raw::pack(&a).unwrap()[0], 1);
/// assert!(Amount::Small(255) < Amount::Large(0));
/// ```
///
/// Payload types must be distinct, since each gets a `From` impl. The
/// `@packed` form omits the generated `ToVariant`/`FromVariant` so the type
/// can supply its own.
#[macro_export]
macro_rules! static_variant {
    (@core
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($alt:ident($payload:ty)),+ $(,)? }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($alt($payload)),+
        }

        impl $crate::static_variant::StaticVariant for $name {
            const COUNT: usize = [$(stringify!($alt)),+].len();
            const NAMES: &'static [&'static str] = &[$(stringify!($alt)),+];

            fn which(&self) -> usize {
                #[allow(dead_code)]
                enum Which { $($alt),+ }
                match self {
                    $( Self::$alt(_) => Which::$alt as usize, )+
                }
            }

            fn visit<V: $crate::static_variant::AlternativeVisitor>(
                &self,
                visitor: V,
            ) -> V::Output {
                let which = self.which();
                match self {
                    $( Self::$alt(value) => visitor.visit(which, value), )+
                }
            }

            fn unpack_alternative<R: ::std::io::Read>(
                which: usize,
                s: &mut $crate::raw::Unpacker<R>,
            ) -> $crate::Result<Self> {
                #[allow(dead_code)]
                enum Which { $($alt),+ }
                $(
                    if which == Which::$alt as usize {
                        return <$payload as $crate::raw::Unpack>::unpack(s).map(Self::$alt);
                    }
                )+
                Err($crate::FcError::InvalidWhich {
                    which: which as u64,
                    count: <Self as $crate::static_variant::StaticVariant>::COUNT,
                })
            }

            fn alternative_from_variant(
                which: usize,
                v: &$crate::variant::Variant,
            ) -> $crate::Result<Self> {
                #[allow(dead_code)]
                enum Which { $($alt),+ }
                $(
                    if which == Which::$alt as usize {
                        return <$payload as $crate::variant::FromVariant>::from_variant(v)
                            .map(Self::$alt);
                    }
                )+
                Err($crate::FcError::InvalidWhich {
                    which: which as u64,
                    count: <Self as $crate::static_variant::StaticVariant>::COUNT,
                })
            }
        }

        $(
            impl From<$payload> for $name {
                fn from(value: $payload) -> Self {
                    Self::$alt(value)
                }
            }
        )+

        impl $crate::raw::Pack for $name {
            fn pack<W: ::std::io::Write>(
                &self,
                s: &mut $crate::raw::Packer<W>,
            ) -> $crate::Result<()> {
                $crate::static_variant::pack_variant(self, s)
            }
        }

        impl $crate::raw::Unpack for $name {
            fn unpack<R: ::std::io::Read>(
                s: &mut $crate::raw::Unpacker<R>,
            ) -> $crate::Result<Self> {
                $crate::static_variant::unpack_variant(s)
            }
        }
    };

    (@packed
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($alt:ident($payload:ty)),+ $(,)? }
    ) => {
        $crate::static_variant! {
            @core
            $(#[$meta])*
            $vis enum $name { $($alt($payload)),+ }
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($alt:ident($payload:ty)),+ $(,)? }
    ) => {
        $crate::static_variant! {
            @core
            $(#[$meta])*
            $vis enum $name { $($alt($payload)),+ }
        }

        impl $crate::variant::ToVariant for $name {
            fn to_variant(&self) -> $crate::Result<$crate::variant::Variant> {
                $crate::static_variant::variant_form(self)
            }
        }

        impl $crate::variant::FromVariant for $name {
            fn from_variant(v: &$crate::variant::Variant) -> $crate::Result<Self> {
                $crate::static_variant::from_variant_form(v)
            }
        }
    };
}
