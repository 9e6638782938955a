//! # LedgerFC Crypto
//!
//! Multi-suite keys and signatures with a canonical checksummed text form.
//!
//! ## Text form
//!
//! | Kind        | Canonical          | Legacy           |
//! |-------------|--------------------|------------------|
//! | Public key  | `PUB_K1_...`       | `EOS...` (K1)    |
//! | Private key | `PVT_R1_...`       | WIF `5...` (K1)  |
//! | Signature   | `SIG_K1_...`       | none             |
//!
//! The payload is base58 of the packed key followed by a 4-byte RIPEMD-160
//! check salted with the suite tag.
//!
//! ## Example
//!
//! ```rust
//! use ledgerfc_crypto::{hash, PrivateKey, PublicKey, Suite};
//!
//! let key = PrivateKey::generate(Suite::K1).unwrap();
//! let digest = hash::sha256(b"hello");
//! let signature = key.sign(&digest).unwrap();
//!
//! let public: PublicKey = key.public_key().unwrap().to_string().parse().unwrap();
//! assert_eq!(PublicKey::recover(&signature, &digest).unwrap(), public);
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

pub mod bignum;
pub mod canonical;
pub mod checksum;
pub mod hash;
pub mod keys;
pub mod suite;

// Re-export commonly used items at crate root
pub use bignum::BigNumber;
pub use canonical::{KeyFormat, LegacyCodec, LegacyForm};
pub use checksum::ChecksummedData;
pub use keys::{
    K1PrivateKey, K1PublicKey, K1Signature, PrivateKey, PublicKey, R1PrivateKey, R1PublicKey,
    R1Signature, Signature, UserPresence, WebAuthnPublicKey, WebAuthnSignature,
};
pub use suite::{CurveSuite, Secp256k1, Secp256r1, Suite};
