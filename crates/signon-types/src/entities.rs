//! # Core Domain Entities
//!
//! Defines the entities that flow through the auth protocol:
//!
//! - **Identity**: `Account` (chain-qualified address)
//! - **Request**: `RequestId`, `AuthRequestParams`
//! - **Proof**: `CacaoSignature`
//! - **Outcome**: `VerificationOutcome`, `AuthFailure`

use crate::errors::AccountError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A chain-qualified blockchain account claiming to be the signer.
///
/// Follows the CAIP-10 shape `namespace:reference:address`, e.g.
/// `eip155:1:0x724d0D2DaD3fbB0C168f947B87Fa5DBe36F1A8bf`.
///
/// Serialized on the wire as the single colon-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Account {
    /// CAIP-2 chain identifier, e.g. `eip155:1`.
    chain_id: String,
    /// The on-chain address, e.g. `0x724d…A8bf`.
    address: String,
}

impl Account {
    /// Create an account from a CAIP-2 chain id and an address.
    ///
    /// # Errors
    ///
    /// Returns `AccountError` if either part is empty or the chain id is
    /// not of the form `namespace:reference`.
    pub fn new(chain_id: impl Into<String>, address: impl Into<String>) -> Result<Self, AccountError> {
        let chain_id = chain_id.into();
        let address = address.into();

        let mut parts = chain_id.split(':');
        let namespace = parts.next().unwrap_or_default();
        let reference = parts.next().unwrap_or_default();
        if namespace.is_empty() || reference.is_empty() || parts.next().is_some() {
            return Err(AccountError::InvalidChainId(chain_id));
        }
        if address.is_empty() {
            return Err(AccountError::EmptyAddress);
        }

        Ok(Self { chain_id, address })
    }

    /// The CAIP-2 chain identifier (`eip155:1`).
    #[must_use]
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The chain reference part of the chain id (`1` for `eip155:1`).
    #[must_use]
    pub fn chain_reference(&self) -> &str {
        self.chain_id.split(':').nth(1).unwrap_or_default()
    }

    /// The raw address part.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Compare an address against this account's, ignoring hex casing.
    ///
    /// Ethereum addresses are routinely mixed-case (EIP-55 checksums), so
    /// equality of the recovered signer is case-insensitive.
    #[must_use]
    pub fn matches_address(&self, other: &str) -> bool {
        self.address.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.address)
    }
}

impl FromStr for Account {
    type Err = AccountError;

    /// Parse `namespace:reference:address`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let namespace = parts.next().unwrap_or_default();
        let reference = parts.next().unwrap_or_default();
        let address = parts
            .next()
            .ok_or_else(|| AccountError::InvalidAccountString(s.to_string()))?;
        Self::new(format!("{namespace}:{reference}"), address)
    }
}

impl TryFrom<String> for Account {
    type Error = AccountError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Account> for String {
    fn from(account: Account) -> Self {
        account.to_string()
    }
}

/// Unique identifier correlating a request to its eventual response.
///
/// Derived from the outgoing payload (see [`crate::wire::derive_request_id`]),
/// so both sides compute the same id without coordination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Parameters of a sign-in request.
///
/// Constructed by the requester and rendered into the canonical sign-in
/// message on both sides. Timestamps are RFC 3339 strings.
///
/// Invariants (enforced by the formatter's `validate`):
/// - `nonce` is unique per request
/// - `expiration_time`, if present, is strictly after `issued_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequestParams {
    /// CAIP-2 chain identifier, e.g. `eip155:1`.
    pub chain_id: String,
    /// The domain requesting the sign-in, e.g. `example.com`.
    pub domain: String,
    /// Audience URI the sign-in is bound to.
    pub aud: String,
    /// Optional human-readable statement shown to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    /// Single-use random value preventing replay.
    pub nonce: String,
    /// RFC 3339 timestamp the request was issued at.
    pub issued_at: String,
    /// Optional RFC 3339 expiry; must be strictly after `issued_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    /// Optional RFC 3339 not-valid-before bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    /// Optional requester-chosen correlation id rendered into the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Resource URIs the sign-in grants access to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

/// A signature over the canonical sign-in message, paired with the scheme
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacaoSignature {
    /// Signature scheme tag, e.g. `eip191`.
    pub t: String,
    /// Hex-encoded signature bytes (65 bytes `r || s || v` for `eip191`).
    pub s: String,
}

impl CacaoSignature {
    /// Convenience constructor for an EIP-191 personal-sign signature.
    #[must_use]
    pub fn eip191(signature_hex: impl Into<String>) -> Self {
        Self {
            t: "eip191".to_string(),
            s: signature_hex.into(),
        }
    }
}

/// Why a sign-in exchange ended without a verified account.
///
/// These are protocol outcomes, not call errors: the requesting application
/// must always be able to tell a user decline apart from a cryptographic
/// mismatch apart from a deadline expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// The user explicitly declined to sign.
    #[error("User rejected the sign-in request")]
    UserRejected,

    /// The signature did not verify against the claimed account.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// No response arrived before the configured deadline.
    #[error("Sign-in request expired")]
    Expired,

    /// The counterparty reported the request as malformed.
    #[error("Malformed sign-in exchange")]
    Malformed,
}

/// Terminal result of a sign-in exchange, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The signature verified; the account is proven to be under the
    /// responder's control.
    Success(Account),
    /// The exchange ended without proof, for the given reason.
    Failure(AuthFailure),
}

impl VerificationOutcome {
    /// Whether this outcome is a verified success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
