//! Raw codec implementations for primitives and standard containers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::io::{Read, Write};

use crate::error::{FcError, Result};

use super::{Pack, Packer, Unpack, Unpacker};

// ═══════════════════════════════════════════════════════════════════════════════
// PRIMITIVES
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! impl_fixed_width {
    ($($ty:ty),+) => {
        $(
            impl Pack for $ty {
                fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
                    s.write_bytes(&self.to_le_bytes())
                }
            }

            impl Unpack for $ty {
                fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
                    Ok(<$ty>::from_le_bytes(s.read_array()?))
                }
            }
        )+
    };
}

impl_fixed_width!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Pack for bool {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_u8(u8::from(*self))
    }
}

impl Unpack for bool {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        match s.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FcError::InvalidBool(other)),
        }
    }
}

impl Pack for () {
    fn pack<W: Write>(&self, _s: &mut Packer<W>) -> Result<()> {
        Ok(())
    }
}

impl Unpack for () {
    fn unpack<R: Read>(_s: &mut Unpacker<R>) -> Result<Self> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRINGS
// ═══════════════════════════════════════════════════════════════════════════════

impl Pack for str {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("string", self.len())?;
        s.write_bytes(self.as_bytes())
    }
}

impl Pack for String {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.as_str().pack(s)
    }
}

impl Unpack for String {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let bytes = s.read_blob("string")?;
        Ok(String::from_utf8(bytes)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WRAPPERS
// ═══════════════════════════════════════════════════════════════════════════════

impl<T: Pack + ?Sized> Pack for &T {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        (**self).pack(s)
    }
}

impl<T: Pack + ?Sized> Pack for Box<T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        (**self).pack(s)
    }
}

impl<T: Unpack> Unpack for Box<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        T::unpack(s).map(Box::new)
    }
}

impl<T: Pack> Pack for Option<T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        match self {
            Some(value) => {
                true.pack(s)?;
                value.pack(s)
            }
            None => false.pack(s),
        }
    }
}

impl<T: Unpack> Unpack for Option<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        if bool::unpack(s)? {
            T::unpack(s).map(Some)
        } else {
            Ok(None)
        }
    }
}

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Pack),+> Pack for ($($name,)+) {
            #[allow(non_snake_case)]
            fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
                let ($($name,)+) = self;
                $($name.pack(s)?;)+
                Ok(())
            }
        }

        impl<$($name: Unpack),+> Unpack for ($($name,)+) {
            fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
                Ok(($($name::unpack(s)?,)+))
            }
        }
    };
}

impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);

// ═══════════════════════════════════════════════════════════════════════════════
// SEQUENCES
// ═══════════════════════════════════════════════════════════════════════════════

impl<T: Pack> Pack for [T] {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("vector", self.len())?;
        self.iter().try_for_each(|item| item.pack(s))
    }
}

impl<T: Pack> Pack for Vec<T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.as_slice().pack(s)
    }
}

impl<T: Unpack> Unpack for Vec<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let count = s.read_count("vector")?;
        (0..count).map(|_| T::unpack(s)).collect()
    }
}

impl<T: Pack> Pack for VecDeque<T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("deque", self.len())?;
        self.iter().try_for_each(|item| item.pack(s))
    }
}

impl<T: Unpack> Unpack for VecDeque<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let count = s.read_count("deque")?;
        (0..count).map(|_| T::unpack(s)).collect()
    }
}

/// Fixed-size arrays carry no length prefix.
impl<T: Pack, const N: usize> Pack for [T; N] {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        self.iter().try_for_each(|item| item.pack(s))
    }
}

impl<T: Unpack, const N: usize> Unpack for [T; N] {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let items = (0..N).map(|_| T::unpack(s)).collect::<Result<Vec<T>>>()?;
        items.try_into().map_err(|items: Vec<T>| FcError::InvalidLength {
            expected: N,
            actual: items.len(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SETS AND MAPS
// ═══════════════════════════════════════════════════════════════════════════════

impl<T: Pack> Pack for BTreeSet<T> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("set", self.len())?;
        self.iter().try_for_each(|item| item.pack(s))
    }
}

impl<T: Unpack + Ord> Unpack for BTreeSet<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let count = s.read_count("set")?;
        (0..count).map(|_| T::unpack(s)).collect()
    }
}

impl<T: Pack, H> Pack for HashSet<T, H> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("set", self.len())?;
        self.iter().try_for_each(|item| item.pack(s))
    }
}

impl<T: Unpack + Eq + Hash> Unpack for HashSet<T> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let count = s.read_count("set")?;
        (0..count).map(|_| T::unpack(s)).collect()
    }
}

impl<K: Pack, V: Pack> Pack for BTreeMap<K, V> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("map", self.len())?;
        for (key, value) in self {
            key.pack(s)?;
            value.pack(s)?;
        }
        Ok(())
    }
}

impl<K: Unpack + Ord, V: Unpack> Unpack for BTreeMap<K, V> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let count = s.read_count("map")?;
        (0..count).map(|_| <(K, V)>::unpack(s)).collect()
    }
}

impl<K: Pack, V: Pack, H> Pack for HashMap<K, V, H> {
    fn pack<W: Write>(&self, s: &mut Packer<W>) -> Result<()> {
        s.write_count("map", self.len())?;
        for (key, value) in self {
            key.pack(s)?;
            value.pack(s)?;
        }
        Ok(())
    }
}

impl<K: Unpack + Eq + Hash, V: Unpack> Unpack for HashMap<K, V> {
    fn unpack<R: Read>(s: &mut Unpacker<R>) -> Result<Self> {
        let count = s.read_count("map")?;
        (0..count).map(|_| <(K, V)>::unpack(s)).collect()
    }
}
