//! Errors from parameter validation.

use thiserror::Error;

/// Why a set of sign-in parameters was rejected before rendering.
///
/// These fail the call synchronously; a request with invalid params is
/// never transmitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// A required field is empty or absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A timestamp field is not valid RFC 3339.
    #[error("Field {field} is not a valid RFC 3339 timestamp: {value}")]
    InvalidTimestamp {
        /// Which field failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// `expiration_time` is not strictly after `issued_at`.
    #[error("expirationTime {expiration} is not after issuedAt {issued_at}")]
    InvalidTimeRange {
        /// The issued-at timestamp.
        issued_at: String,
        /// The expiration timestamp.
        expiration: String,
    },

    /// The request's expiration time has already passed.
    #[error("Request expired at {0}")]
    Expired(String),

    /// The request's not-before time has not been reached yet.
    #[error("Request not valid before {0}")]
    NotYetValid(String),
}
