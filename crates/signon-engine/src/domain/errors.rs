//! Error taxonomy for the engine and its store.

use crate::ports::outbound::{PairingError, StorageError, TransportError};
use signon_crypto::SignerError;
use signon_message::FormatError;
use signon_types::{RequestId, WireError};
use thiserror::Error;

/// Request store integrity violations. Programmer/protocol errors,
/// surfaced not swallowed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A live or terminal entry already exists under this id. Deterministic
    /// hash collisions fail loudly rather than silently overwrite.
    #[error("Duplicate request id: {0}")]
    DuplicateRequest(RequestId),

    /// No live entry under this id (never created, or already terminal).
    #[error("Unknown or completed request id: {0}")]
    UnknownRequest(RequestId),
}

/// Errors failing an engine call synchronously.
///
/// Protocol-level outcomes (user rejection, signature mismatch, expiry)
/// are NOT here: those arrive as
/// [`signon_types::VerificationOutcome::Failure`] on the event bus.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Relay send/receive failure. Retryable by the caller; the engine
    /// does not auto-retry.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Parameters failed validation; nothing was transmitted.
    #[error("Invalid request parameters: {0}")]
    Format(#[from] FormatError),

    /// The pairing handshake failed.
    #[error("Pairing failed: {0}")]
    Pairing(#[from] PairingError),

    /// Encoding an outgoing wire message failed.
    #[error("Wire codec error: {0}")]
    Wire(#[from] WireError),

    /// The key-value storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Signing the canonical message failed (responder approve path).
    #[error("Signing failed: {0}")]
    Signer(#[from] SignerError),

    /// A request with this id is already outstanding.
    #[error("Duplicate request id: {0}")]
    DuplicateRequest(RequestId),

    /// The id does not name a live request.
    #[error("Unknown or completed request id: {0}")]
    UnknownRequest(RequestId),

    /// Responder operation attempted without a configured account.
    #[error("No responder account configured")]
    NoResponderAccount,

    /// Send attempted before any pairing established a topic.
    #[error("Not paired with a counterparty")]
    NotPaired,
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateRequest(id) => Self::DuplicateRequest(id),
            StoreError::UnknownRequest(id) => Self::UnknownRequest(id),
        }
    }
}
