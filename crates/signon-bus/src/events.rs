//! Auth protocol events and subscription filters.

use signon_types::{AuthRequestParams, RequestId, VerificationOutcome};

/// Events delivered to the owning application.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A valid sign-in request arrived (responder side). This is the only
    /// way the application learns of a request; there is no polling API.
    IncomingRequest {
        /// Correlation id of the request.
        id: RequestId,
        /// The canonical message the user is asked to sign.
        message: String,
        /// The raw parameters, for inspection before deciding.
        params: AuthRequestParams,
    },

    /// A sign-in exchange reached a terminal outcome (requester side).
    ResponseOutcome {
        /// Correlation id of the request.
        id: RequestId,
        /// The definitive result.
        outcome: VerificationOutcome,
    },
}

impl AuthEvent {
    /// The topic an event belongs to, for filtering.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::IncomingRequest { .. } => EventTopic::IncomingRequest,
            Self::ResponseOutcome { .. } => EventTopic::ResponseOutcome,
        }
    }

    /// The request id the event concerns.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::IncomingRequest { id, .. } | Self::ResponseOutcome { id, .. } => *id,
        }
    }
}

/// Coarse event categories for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTopic {
    /// Inbound sign-in requests (responder side).
    IncomingRequest,
    /// Terminal exchange outcomes (requester side).
    ResponseOutcome,
}

/// Which events a subscription wants to see.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to match; empty means all.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Match every event.
    #[must_use]
    pub fn all() -> Self {
        Self { topics: Vec::new() }
    }

    /// Match only the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether an event passes this filter.
    #[must_use]
    pub fn matches(&self, event: &AuthEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}
