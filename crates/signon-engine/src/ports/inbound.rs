//! # Inbound Port (Driving Port / API)
//!
//! The public surface of the auth protocol engine.

use crate::domain::errors::AuthError;
use crate::ports::outbound::PairingUri;
use async_trait::async_trait;
use signon_types::{AuthRequestParams, CacaoSignature, RequestId};

/// Primary auth protocol API.
///
/// All operations are asynchronous: they involve relay round trips and
/// internally await transport readiness. Completion of an exchange is
/// observed through the event bus, not through these calls.
#[async_trait]
pub trait AuthProtocolApi: Send + Sync {
    /// Issue a sign-in request (requester side).
    ///
    /// Validates `params`, allocates the request id, sends over the
    /// paired topic and arms the response deadline. When no pairing
    /// exists yet, one is created and its URI returned for out-of-band
    /// delivery to the counterparty.
    ///
    /// # Errors
    ///
    /// `AuthError::Format` on invalid params (nothing transmitted),
    /// `AuthError::DuplicateRequest` on an id collision,
    /// `AuthError::Transport` if the send fails (the store entry is
    /// rolled back).
    async fn request(
        &self,
        params: AuthRequestParams,
    ) -> Result<(RequestId, Option<PairingUri>), AuthError>;

    /// Accept a counterparty's pairing URI (responder side) and start
    /// listening for requests on the shared topic.
    ///
    /// # Errors
    ///
    /// `AuthError::Pairing` on a malformed URI or failed handshake.
    async fn pair(&self, uri: &PairingUri) -> Result<(), AuthError>;

    /// Approve an incoming request with a caller-produced signature
    /// (responder side). The engine does not verify it; verification is
    /// the requester's responsibility.
    ///
    /// # Errors
    ///
    /// `AuthError::UnknownRequest` if `id` names no inbound request,
    /// `AuthError::NoResponderAccount` without a configured account,
    /// `AuthError::Transport` if the send fails.
    async fn respond(&self, id: RequestId, signature: CacaoSignature) -> Result<(), AuthError>;

    /// Decline an incoming request (responder side).
    ///
    /// # Errors
    ///
    /// As for [`AuthProtocolApi::respond`].
    async fn reject(&self, id: RequestId) -> Result<(), AuthError>;

    /// Cancel an in-flight request before its deadline (requester side).
    /// Transitions to the `Cancelled` terminal state; no outcome event is
    /// emitted, and a response arriving later is dropped.
    ///
    /// # Errors
    ///
    /// `AuthError::UnknownRequest` if `id` names no live request.
    async fn cancel(&self, id: RequestId) -> Result<(), AuthError>;
}
