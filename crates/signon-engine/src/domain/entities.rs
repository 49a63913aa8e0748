//! Request lifecycle entities.

use signon_types::{AuthRequestParams, RequestId};

/// Lifecycle of an outstanding request on the requesting side.
///
/// ```text
/// Sent ──► Delivered ──► Responded
///   │          │
///   └──────────┴────────► TimedOut / Cancelled
/// ```
///
/// `Responded`, `TimedOut` and `Cancelled` are terminal; terminal entries
/// are evicted from the store immediately after the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Created, not yet acknowledged by the relay.
    Sent,
    /// The relay acknowledged the publish.
    Delivered,
    /// A response arrived and was consumed.
    Responded,
    /// The response deadline elapsed.
    TimedOut,
    /// The caller cancelled before a response arrived.
    Cancelled,
}

impl RequestState {
    /// Whether this state admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Responded | Self::TimedOut | Self::Cancelled)
    }
}

/// An outstanding request owned by the requester's store for the duration
/// of the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    /// Correlation id, derived from the outgoing payload.
    pub id: RequestId,
    /// The original parameters; the canonical message is always re-rendered
    /// from these, never from anything received over the wire.
    pub params: AuthRequestParams,
    /// Current lifecycle state.
    pub state: RequestState,
}

impl PendingRequest {
    /// Create a fresh entry in `Sent` state.
    #[must_use]
    pub fn new(id: RequestId, params: AuthRequestParams) -> Self {
        Self {
            id,
            params,
            state: RequestState::Sent,
        }
    }
}

/// Key under which a pending request's params are persisted in the
/// key-value storage port.
#[must_use]
pub fn storage_key(id: RequestId) -> String {
    format!("signon/request/{id}")
}
