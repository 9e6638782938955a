//! # LedgerFC Core
//!
//! Serialization foundation for distributed-ledger software.
//!
//! - **Variant**: dynamic value model and its JSON form
//! - **Reflection**: ordered field descriptors registered with [`reflect!`]
//! - **Raw codec**: deterministic little-endian binary format with varints
//! - **Static variants**: closed tagged sum types via [`static_variant!`]
//! - **Time**: microsecond and second time points with ISO-8601 variant forms
//!
//! Every count read from the wire is bounded by [`CodecConfig`] before any
//! allocation happens.
//!
//! ## Example
//!
//! ```rust
//! use ledgerfc_core::{raw, reflect, Variant};
//!
//! #[derive(Debug, PartialEq)]
//! struct Account {
//!     name: String,
//!     balance: u64,
//! }
//!
//! reflect!(Account { name, balance });
//!
//! let acct = Account { name: "alice".into(), balance: 5 };
//! let json = ledgerfc_core::variant::to_json(&acct).unwrap();
//! assert_eq!(json, r#"{"name":"alice","balance":5}"#);
//!
//! let bytes = raw::pack(&acct).unwrap();
//! assert_eq!(raw::unpack::<Account>(&bytes).unwrap(), acct);
//! # let _ = Variant::Null;
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

pub mod bytes;
pub mod config;
pub mod constants;
pub mod error;
pub mod raw;
pub mod reflect;
pub mod static_variant;
pub mod time;
pub mod variant;

// Re-export commonly used items at crate root
pub use bytes::Bytes;
pub use config::CodecConfig;
pub use constants::*;
pub use error::{FcError, Result};
pub use raw::{Pack, SignedInt, Unpack, UnsignedInt};
pub use reflect::Reflect;
pub use static_variant::StaticVariant;
pub use time::{Microseconds, TimePoint, TimePointSec};
pub use variant::{FromVariant, ToVariant, Variant, VariantObject};
