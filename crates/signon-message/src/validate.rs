//! Parameter validation: required fields and temporal consistency.

use crate::errors::FormatError;
use chrono::{DateTime, Utc};
use signon_types::AuthRequestParams;

/// Validate `params` against the current wall clock.
///
/// # Errors
///
/// See [`validate_at`].
pub fn validate(params: &AuthRequestParams) -> Result<(), FormatError> {
    validate_at(params, Utc::now())
}

/// Validate `params` as of `now`.
///
/// Checks that required fields are present, timestamps parse as RFC 3339,
/// `expiration_time` (if set) is strictly after `issued_at`, the request is
/// not already expired, and `now` is not before `not_before`.
///
/// # Errors
///
/// `FormatError` naming the first violated constraint.
pub fn validate_at(params: &AuthRequestParams, now: DateTime<Utc>) -> Result<(), FormatError> {
    require_field("domain", &params.domain)?;
    require_field("chainId", &params.chain_id)?;
    require_field("aud", &params.aud)?;
    require_field("nonce", &params.nonce)?;
    require_field("issuedAt", &params.issued_at)?;

    let issued_at = parse_timestamp("issuedAt", &params.issued_at)?;

    if let Some(raw) = &params.expiration_time {
        let expiration = parse_timestamp("expirationTime", raw)?;
        if expiration <= issued_at {
            return Err(FormatError::InvalidTimeRange {
                issued_at: params.issued_at.clone(),
                expiration: raw.clone(),
            });
        }
        if expiration <= now {
            return Err(FormatError::Expired(raw.clone()));
        }
    }

    if let Some(raw) = &params.not_before {
        let not_before = parse_timestamp("notBefore", raw)?;
        if now < not_before {
            return Err(FormatError::NotYetValid(raw.clone()));
        }
    }

    Ok(())
}

fn require_field(name: &'static str, value: &str) -> Result<(), FormatError> {
    if value.trim().is_empty() {
        return Err(FormatError::MissingField(name));
    }
    Ok(())
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, FormatError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| FormatError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}
