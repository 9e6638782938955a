//! Error types for LedgerFC.
//!
//! Every codec, conversion and key-encoding failure is reported through
//! [`FcError`]. Nothing in the library logs and continues: an error aborts the
//! operation that raised it and the partially built value is dropped.

use thiserror::Error;

/// Result type alias using `FcError`.
pub type Result<T> = std::result::Result<T, FcError>;

/// Main error type for all LedgerFC operations.
#[derive(Debug, Error)]
pub enum FcError {
    // ═══════════════════════════════════════════════════════════════════════════
    // FORMAT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// The input ended before the value was complete.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A varint used more bytes or bits than its 32-bit width allows.
    #[error("{0} out of bounds")]
    VarintOutOfBounds(&'static str),

    /// A tagged union discriminant outside `[0, count)`.
    #[error("invalid static_variant index {which}: only {count} alternatives")]
    InvalidWhich { which: u64, count: usize },

    /// Input remained after a value that must consume it completely.
    #[error("decoded length too long: {remaining} trailing bytes")]
    TrailingBytes { remaining: usize },

    /// Stored checksum does not match the recomputed one.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// A boolean byte other than 0 or 1.
    #[error("invalid bool value: {0}")]
    InvalidBool(u8),

    /// A string that is not valid UTF-8.
    #[error("invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A fixed-size value of the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Invalid base58 text.
    #[error("invalid base58 encoding: {0}")]
    Base58(String),

    /// Invalid hex text.
    #[error("invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Underlying reader or writer failure.
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // BOUND VIOLATIONS
    // ═══════════════════════════════════════════════════════════════════════════
    /// A count or length above the configured array limit.
    #[error("{what} size {count} exceeds maximum of {max} elements")]
    BoundViolation {
        what: &'static str,
        count: u64,
        max: usize,
    },

    /// A variant nested deeper than the configured depth.
    #[error("variant nesting exceeds maximum depth of {max}")]
    RecursionLimit { max: usize },

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP FAILURES
    // ═══════════════════════════════════════════════════════════════════════════
    /// A canonical key string without the `_` separator.
    #[error("no delimiter in data, cannot determine suite type: {0}")]
    NoDelimiter(String),

    /// A canonical key string with a suite tag but no payload.
    #[error("data only has suite type prefix: {0}")]
    EmptyKeyData(String),

    /// A canonical key string with the wrong base prefix.
    #[error("invalid key prefix in '{input}': expected {expected}")]
    InvalidKeyPrefix { expected: &'static str, input: String },

    /// A suite tag that is not in the key kind's suite table.
    #[error("no matching suite type for {prefix}_{data}")]
    NoMatchingSuite { prefix: String, data: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONVERSION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// A variant of the wrong shape for the requested type.
    #[error("bad cast: expected {expected}, found {actual}")]
    BadCast {
        expected: &'static str,
        actual: &'static str,
    },

    /// A numeric value that does not fit the requested type.
    #[error("value {value} out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// A reflected field absent from the source object.
    #[error("missing field '{field}' for {type_name}")]
    MissingField {
        type_name: &'static str,
        field: &'static str,
    },

    /// A reflected field whose value failed to convert.
    #[error("invalid field '{field}': {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<FcError>,
    },

    /// JSON text error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unparseable ISO-8601 time.
    #[error("invalid time '{0}'")]
    InvalidTime(String),

    /// Unparseable duration string.
    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Curve operation failed (bad point, bad scalar, failed recovery).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// The operation has no implementation for the given suite.
    #[error("operation not supported for suite {0}")]
    UnsupportedSuite(&'static str),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for FcError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FcError::UnexpectedEof
        } else {
            FcError::Io(err)
        }
    }
}

impl FcError {
    /// Wraps a conversion error with the name of the field it came from.
    pub fn in_field(self, field: &'static str) -> Self {
        FcError::Field {
            field,
            source: Box::new(self),
        }
    }

    /// Returns true if the input bytes or text are malformed.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            FcError::UnexpectedEof
                | FcError::VarintOutOfBounds(_)
                | FcError::InvalidWhich { .. }
                | FcError::TrailingBytes { .. }
                | FcError::ChecksumMismatch { .. }
                | FcError::InvalidBool(_)
                | FcError::InvalidUtf8(_)
                | FcError::InvalidLength { .. }
                | FcError::Base58(_)
                | FcError::Hex(_)
        )
    }

    /// Returns true if a decoded count exceeded a configured limit.
    pub fn is_bound_violation(&self) -> bool {
        matches!(
            self,
            FcError::BoundViolation { .. } | FcError::RecursionLimit { .. }
        )
    }

    /// Returns true if a canonical key string could not be matched to a suite.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            FcError::NoDelimiter(_)
                | FcError::EmptyKeyData(_)
                | FcError::InvalidKeyPrefix { .. }
                | FcError::NoMatchingSuite { .. }
        )
    }

    /// Returns the innermost error, looking through field wrappers.
    pub fn root_cause(&self) -> &FcError {
        match self {
            FcError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_message() {
        let err = FcError::VarintOutOfBounds("unsigned_int");
        assert_eq!(err.to_string(), "unsigned_int out of bounds");
    }

    #[test]
    fn test_no_matching_suite_message() {
        let err = FcError::NoMatchingSuite {
            prefix: "XX".into(),
            data: "abc".into(),
        };
        assert_eq!(err.to_string(), "no matching suite type for XX_abc");
    }

    #[test]
    fn test_error_classification() {
        assert!(FcError::UnexpectedEof.is_format_error());
        assert!(FcError::TrailingBytes { remaining: 1 }.is_format_error());
        assert!(!FcError::UnexpectedEof.is_bound_violation());

        let bound = FcError::BoundViolation {
            what: "vector",
            count: 10,
            max: 5,
        };
        assert!(bound.is_bound_violation());
        assert!(!bound.is_format_error());

        assert!(FcError::NoDelimiter("abc".into()).is_lookup_failure());
        assert!(!FcError::Crypto("bad".into()).is_lookup_failure());
    }

    #[test]
    fn test_io_eof_maps_to_unexpected_eof() {
        let io = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(matches!(FcError::from(io), FcError::UnexpectedEof));

        let io = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert!(matches!(FcError::from(io), FcError::Io(_)));
    }

    #[test]
    fn test_field_wrapper_root_cause() {
        let err = FcError::InvalidBool(7).in_field("flag").in_field("outer");
        assert!(err.to_string().contains("outer"));
        assert!(matches!(err.root_cause(), FcError::InvalidBool(7)));
    }
}
