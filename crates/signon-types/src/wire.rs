//! # Wire Messages
//!
//! The payloads exchanged over the relay topic. Both sides must produce
//! bit-exact shapes: the requester re-derives the canonical sign-in message
//! from the same parameters the responder signed, so field names here are a
//! compatibility contract.

use crate::entities::{Account, AuthRequestParams, CacaoSignature, RequestId};
use crate::errors::WireError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// A message carried over a paired relay topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireMessage {
    /// A sign-in request from the requester to the responder.
    #[serde(rename_all = "camelCase")]
    AuthRequest {
        /// Correlation id, derived from `params`.
        id: RequestId,
        /// The sign-in parameters to render and sign.
        params: AuthRequestParams,
    },

    /// The responder's answer to a sign-in request.
    #[serde(rename_all = "camelCase")]
    AuthResponse {
        /// Correlation id of the request being answered.
        id: RequestId,
        /// Approve / reject / protocol error.
        payload: AuthResponsePayload,
    },
}

impl WireMessage {
    /// Serialize to the relay byte representation.
    ///
    /// # Errors
    ///
    /// Returns `WireError::Decode` if serialization fails (only possible
    /// with non-string map keys, which these types do not have).
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from relay bytes.
    ///
    /// # Errors
    ///
    /// Returns `WireError::Decode` on malformed input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// The approved arm of a response.
///
/// Carries the claimed account (`iss`) alongside the signature: the
/// requester re-renders the canonical message from its own stored params
/// plus this claimed account, since the account address is part of the
/// rendered message and cannot be bootstrapped from recovery alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedResponse {
    /// The account the responder claims to control.
    pub iss: Account,
    /// Signature over the canonical sign-in message.
    pub signature: CacaoSignature,
}

/// Tagged response payload: `{"approved": {...}}`, `{"rejected": true}` or
/// `{"error": "..."}` for protocol-level rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthResponsePayload {
    /// The user approved and signed.
    Approved {
        /// The claimed account and its signature.
        approved: ApprovedResponse,
    },
    /// The user declined to sign.
    Rejected {
        /// Always `true`; present so the arm has a stable JSON shape.
        rejected: bool,
    },
    /// Protocol-level rejection (e.g. the request failed validation on the
    /// responder side). Never surfaced to the responder's application.
    Error {
        /// Machine-readable reason tag.
        error: String,
    },
}

impl AuthResponsePayload {
    /// Build an approved payload.
    #[must_use]
    pub fn approved(iss: Account, signature: CacaoSignature) -> Self {
        Self::Approved {
            approved: ApprovedResponse { iss, signature },
        }
    }

    /// Build a user-rejection payload.
    #[must_use]
    pub fn rejected() -> Self {
        Self::Rejected { rejected: true }
    }

    /// Build a protocol-level error payload.
    #[must_use]
    pub fn protocol_error(reason: impl Into<String>) -> Self {
        Self::Error {
            error: reason.into(),
        }
    }
}

/// Derive the correlation id for a request from its outgoing payload.
///
/// First 8 bytes (big-endian) of `Keccak256(canonical JSON of params)`.
/// Deterministic: the same params always map to the same id, which is why
/// nonce uniqueness doubles as request-id uniqueness.
#[must_use]
pub fn derive_request_id(params: &AuthRequestParams) -> RequestId {
    // serde_json emits struct fields in declaration order, so this byte
    // stream is canonical for a given params value.
    let encoded = serde_json::to_vec(params).unwrap_or_default();

    let mut hasher = Keccak256::new();
    hasher.update(&encoded);
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    RequestId(u64::from_be_bytes(prefix))
}
