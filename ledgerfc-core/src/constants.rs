//! Wire-format constants for LedgerFC.
//!
//! These values are part of the binary format. Changing any of them changes
//! which byte streams are accepted.

// ═══════════════════════════════════════════════════════════════════════════════
// DECODE LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default upper bound on every element count or byte length read from the wire.
///
/// Applied to sequences, maps, sets, strings and blobs before anything is
/// allocated. Callers can lower or raise it per codec via
/// [`CodecConfig`](crate::config::CodecConfig).
pub const MAX_NUM_ARRAY_ELEMENTS: usize = 1024 * 1024;

/// Default maximum nesting depth of a parsed [`Variant`](crate::variant::Variant).
pub const MAX_RECURSION_DEPTH: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// VARINT LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Payload bits carried by each varint byte.
pub const VARINT_PAYLOAD_BITS: u32 = 7;

/// Continuation flag of a varint byte.
pub const VARINT_CONTINUATION_BIT: u8 = 0x80;

/// Longest valid encoding of a 32-bit varint.
pub const MAX_VARINT32_BYTES: usize = 5;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment variable overriding [`MAX_NUM_ARRAY_ELEMENTS`].
pub const ENV_MAX_ARRAY_ELEMENTS: &str = "LEDGERFC_MAX_ARRAY_ELEMENTS";

/// Environment variable overriding [`MAX_RECURSION_DEPTH`].
pub const ENV_MAX_RECURSION_DEPTH: &str = "LEDGERFC_MAX_RECURSION_DEPTH";
