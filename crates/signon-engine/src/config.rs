//! Engine configuration.

use signon_types::Account;
use std::time::Duration;

/// Tunables for an [`crate::service::AuthEngine`] instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long the requester waits for a response before the exchange is
    /// marked expired. A configuration option, not a protocol constant.
    pub response_timeout: Duration,

    /// The account this engine responds as (responder/wallet side).
    /// Requester-only engines leave this unset; incoming requests are then
    /// auto-rejected at the protocol level.
    pub responder_account: Option<Account>,
}

impl EngineConfig {
    /// Responder-side configuration with the default timeout.
    #[must_use]
    pub fn responder(account: Account) -> Self {
        Self {
            responder_account: Some(account),
            ..Self::default()
        }
    }

    /// Override the response timeout.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(300),
            responder_account: None,
        }
    }
}
