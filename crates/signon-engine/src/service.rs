//! # Auth Engine Service
//!
//! Wires the domain layer to the outbound ports and implements the
//! inbound [`AuthProtocolApi`]. One engine instance serves one party:
//! configure a responder account to act as the wallet side, leave it
//! unset to act as the requesting application.
//!
//! Completion is event-driven: the engine spawns a listener per paired
//! topic that decodes relay payloads and drives the request store, and a
//! deadline task per outgoing request. Terminal outcomes surface on the
//! event bus, never as return values of the API calls.

use crate::config::EngineConfig;
use crate::domain::entities::storage_key;
use crate::domain::errors::AuthError;
use crate::domain::store::RequestStore;
use crate::ports::inbound::AuthProtocolApi;
use crate::ports::outbound::{KeyValueStorage, PairingGateway, PairingUri, RelayTransport, Topic};
use async_trait::async_trait;
use parking_lot::Mutex;
use signon_bus::{AuthEvent, EventFilter, EventPublisher, EventStream, InMemoryEventBus, Subscription};
use signon_crypto::{sign_message, verify_message};
use signon_message::{render_message, validate};
use signon_types::{
    derive_request_id, AuthFailure, AuthRequestParams, AuthResponsePayload, CacaoSignature,
    RequestId, VerificationOutcome, WireMessage,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reason tag sent back when an engine without a responder account
/// receives a request.
const REASON_NO_RESPONDER: &str = "noResponderAccount";
/// Reason tag sent back when an incoming request fails validation.
const REASON_MALFORMED: &str = "malformedRequest";

/// The auth protocol engine.
///
/// Owns the request store, the paired topic, and the relay listener.
/// Dropping the engine aborts the listener; in-flight deadline tasks
/// finish on their own.
pub struct AuthEngine {
    inner: Arc<EngineInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

struct EngineInner {
    transport: Arc<dyn RelayTransport>,
    pairing: Arc<dyn PairingGateway>,
    storage: Arc<dyn KeyValueStorage>,
    bus: InMemoryEventBus,
    store: RequestStore,
    /// Incoming requests awaiting an approve/reject decision
    /// (responder side).
    inbound: Mutex<HashMap<RequestId, AuthRequestParams>>,
    /// The shared relay topic, set by the first pairing.
    topic: Mutex<Option<Topic>>,
    config: EngineConfig,
}

impl AuthEngine {
    /// Create an engine over the given gateways.
    #[must_use]
    pub fn new(
        transport: Arc<dyn RelayTransport>,
        pairing: Arc<dyn PairingGateway>,
        storage: Arc<dyn KeyValueStorage>,
        config: EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                transport,
                pairing,
                storage,
                bus: InMemoryEventBus::new(),
                store: RequestStore::new(),
                inbound: Mutex::new(HashMap::new()),
                topic: Mutex::new(None),
                config,
            }),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to engine events. The subscription unregisters on drop.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.inner.bus.subscribe(filter)
    }

    /// Subscribe and wrap the subscription as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.inner.bus.event_stream(filter)
    }

    /// The paired relay topic, if one is established.
    #[must_use]
    pub fn topic(&self) -> Option<Topic> {
        self.inner.topic.lock().clone()
    }

    /// Sign and approve an incoming request in one step (responder side).
    ///
    /// Renders the canonical message for the configured account, signs it
    /// with `private_key` (raw 32-byte secp256k1 scalar) and sends the
    /// approval.
    ///
    /// # Errors
    ///
    /// As for [`AuthProtocolApi::respond`], plus `AuthError::Signer` when
    /// the key material is rejected.
    pub async fn approve(&self, id: RequestId, private_key: &[u8]) -> Result<(), AuthError> {
        let account = self
            .inner
            .config
            .responder_account
            .clone()
            .ok_or(AuthError::NoResponderAccount)?;

        let params = self
            .inner
            .inbound
            .lock()
            .get(&id)
            .cloned()
            .ok_or(AuthError::UnknownRequest(id))?;

        let message = render_message(&params, account.address());
        let signature = sign_message(&message, private_key)?;
        self.respond(id, signature).await
    }

    /// Spawn (or replace) the relay listener for `topic`.
    fn start_listener(&self, topic: Topic) -> Result<(), AuthError> {
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let rx = inner.transport.subscribe(&topic).await;
            let mut rx = match rx {
                Ok(rx) => rx,
                Err(e) => {
                    warn!(topic = %topic, error = %e, "Relay subscription failed; listener exiting");
                    return;
                }
            };
            debug!(topic = %topic, "Relay listener started");
            while let Some(payload) = rx.recv().await {
                inner.handle_payload(&topic, payload).await;
            }
            debug!(topic = %topic, "Relay listener stopped");
        });

        if let Some(old) = self.listener.lock().replace(handle) {
            old.abort();
        }
        Ok(())
    }

    /// The topic to send on, or `NotPaired`.
    fn require_topic(&self) -> Result<Topic, AuthError> {
        self.inner.topic.lock().clone().ok_or(AuthError::NotPaired)
    }
}

impl Drop for AuthEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl AuthProtocolApi for AuthEngine {
    async fn request(
        &self,
        params: AuthRequestParams,
    ) -> Result<(RequestId, Option<PairingUri>), AuthError> {
        validate(&params)?;

        // Reuse the existing pairing, or mint one and hand back its URI.
        let existing = self.inner.topic.lock().clone();
        let (topic, new_uri) = match existing {
            Some(topic) => (topic, None),
            None => {
                let (topic, uri) = self.inner.pairing.create().await?;
                *self.inner.topic.lock() = Some(topic.clone());
                (topic, Some(uri))
            }
        };
        if new_uri.is_some() {
            self.start_listener(topic.clone())?;
        }

        let id = derive_request_id(&params);
        self.inner.store.create(id, params.clone())?;

        // Persist the pending params so a sent request can be recognized
        // after restart. Best-effort; the in-memory store is authoritative.
        let encoded = serde_json::to_vec(&params).unwrap_or_default();
        if let Err(e) = self.inner.storage.set(&storage_key(id), encoded).await {
            warn!(request_id = %id, error = %e, "Failed to persist pending request");
        }

        let message = WireMessage::AuthRequest { id, params };
        let payload = message.to_bytes()?;

        self.inner.transport.ready().await?;
        if let Err(e) = self.inner.transport.publish(&topic, payload).await {
            // Nothing went out; roll the request back entirely.
            self.inner.store.evict(id);
            if let Err(del) = self.inner.storage.delete(&storage_key(id)).await {
                warn!(request_id = %id, error = %del, "Rollback cleanup failed");
            }
            return Err(e.into());
        }

        // Publish returning Ok is the relay's delivery acknowledgment.
        if let Err(e) = self.inner.store.mark_delivered(id) {
            warn!(request_id = %id, error = %e, "Delivered transition failed");
        }

        info!(request_id = %id, topic = %topic, "Sign-in request sent");

        // Arm the response deadline.
        let inner = self.inner.clone();
        let timeout = self.inner.config.response_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            inner.expire(id).await;
        });

        Ok((id, new_uri))
    }

    async fn pair(&self, uri: &PairingUri) -> Result<(), AuthError> {
        let topic = self.inner.pairing.pair(uri).await?;
        info!(topic = %topic, "Paired with counterparty");
        *self.inner.topic.lock() = Some(topic.clone());
        self.start_listener(topic)
    }

    async fn respond(&self, id: RequestId, signature: CacaoSignature) -> Result<(), AuthError> {
        let account = self
            .inner
            .config
            .responder_account
            .clone()
            .ok_or(AuthError::NoResponderAccount)?;

        let params = self
            .inner
            .inbound
            .lock()
            .remove(&id)
            .ok_or(AuthError::UnknownRequest(id))?;

        let payload = AuthResponsePayload::approved(account, signature);
        if let Err(e) = self.inner.send_response(id, payload).await {
            // The decision was not transmitted; let the caller retry.
            self.inner.inbound.lock().insert(id, params);
            return Err(e);
        }
        info!(request_id = %id, "Sign-in request approved");
        Ok(())
    }

    async fn reject(&self, id: RequestId) -> Result<(), AuthError> {
        let params = self
            .inner
            .inbound
            .lock()
            .remove(&id)
            .ok_or(AuthError::UnknownRequest(id))?;

        if let Err(e) = self.inner.send_response(id, AuthResponsePayload::rejected()).await {
            self.inner.inbound.lock().insert(id, params);
            return Err(e);
        }
        info!(request_id = %id, "Sign-in request rejected");
        Ok(())
    }

    async fn cancel(&self, id: RequestId) -> Result<(), AuthError> {
        self.inner.store.mark_cancelled(id)?;
        self.inner.store.evict(id);
        if let Err(e) = self.inner.storage.delete(&storage_key(id)).await {
            warn!(request_id = %id, error = %e, "Cancel cleanup failed");
        }
        info!(request_id = %id, "Sign-in request cancelled");
        Ok(())
    }
}

impl EngineInner {
    /// Encode and publish a response payload on the paired topic.
    async fn send_response(
        &self,
        id: RequestId,
        payload: AuthResponsePayload,
    ) -> Result<(), AuthError> {
        let topic = self.topic.lock().clone().ok_or(AuthError::NotPaired)?;
        let message = WireMessage::AuthResponse { id, payload };
        let bytes = message.to_bytes()?;
        self.transport.ready().await?;
        self.transport.publish(&topic, bytes).await?;
        Ok(())
    }

    /// Dispatch one relay payload. Undecodable bytes are logged and
    /// dropped; a pub/sub topic may carry unrelated traffic.
    async fn handle_payload(self: &Arc<Self>, topic: &Topic, payload: Vec<u8>) {
        let message = match WireMessage::from_bytes(&payload) {
            Ok(message) => message,
            Err(e) => {
                debug!(topic = %topic, error = %e, "Dropping undecodable relay payload");
                return;
            }
        };

        match message {
            WireMessage::AuthRequest { id, params } => self.handle_request(id, params).await,
            WireMessage::AuthResponse { id, payload } => self.handle_response(id, payload).await,
        }
    }

    /// Responder side: an incoming sign-in request.
    async fn handle_request(self: &Arc<Self>, id: RequestId, params: AuthRequestParams) {
        let Some(account) = self.config.responder_account.clone() else {
            debug!(request_id = %id, "No responder account; declining at protocol level");
            let reply = AuthResponsePayload::protocol_error(REASON_NO_RESPONDER);
            if let Err(e) = self.send_response(id, reply).await {
                warn!(request_id = %id, error = %e, "Failed to send protocol decline");
            }
            return;
        };

        if let Err(e) = validate(&params) {
            debug!(request_id = %id, error = %e, "Incoming request failed validation");
            let reply = AuthResponsePayload::protocol_error(REASON_MALFORMED);
            if let Err(e) = self.send_response(id, reply).await {
                warn!(request_id = %id, error = %e, "Failed to send protocol decline");
            }
            return;
        }

        let message = render_message(&params, account.address());
        self.inbound.lock().insert(id, params.clone());

        info!(request_id = %id, domain = %params.domain, "Incoming sign-in request");
        self.bus
            .publish(AuthEvent::IncomingRequest {
                id,
                message,
                params,
            })
            .await;
    }

    /// Requester side: a response to one of our requests.
    async fn handle_response(self: &Arc<Self>, id: RequestId, payload: AuthResponsePayload) {
        // At-most-once: the transition fails for unknown ids, duplicates,
        // and responses losing the race against timeout or cancel.
        let entry = match self.store.mark_responded(id) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(request_id = %id, error = %e, "Dropping late or unknown response");
                return;
            }
        };
        self.store.evict(id);
        if let Err(e) = self.storage.delete(&storage_key(id)).await {
            warn!(request_id = %id, error = %e, "Completion cleanup failed");
        }

        let outcome = match payload {
            AuthResponsePayload::Approved { approved } => {
                // Re-render from our own stored params; never trust a
                // message echoed over the wire.
                let message = render_message(&entry.params, approved.iss.address());
                match verify_message(&message, &approved.signature, &approved.iss) {
                    Ok(true) => VerificationOutcome::Success(approved.iss),
                    Ok(false) => {
                        VerificationOutcome::Failure(AuthFailure::SignatureVerificationFailed)
                    }
                    Err(e) => {
                        debug!(request_id = %id, error = %e, "Signature verification could not run");
                        VerificationOutcome::Failure(AuthFailure::SignatureVerificationFailed)
                    }
                }
            }
            AuthResponsePayload::Rejected { .. } => {
                VerificationOutcome::Failure(AuthFailure::UserRejected)
            }
            AuthResponsePayload::Error { error } => {
                debug!(request_id = %id, reason = %error, "Counterparty reported a protocol error");
                VerificationOutcome::Failure(AuthFailure::Malformed)
            }
        };

        info!(request_id = %id, success = outcome.is_success(), "Sign-in exchange completed");
        self.bus.publish(AuthEvent::ResponseOutcome { id, outcome }).await;
    }

    /// Deadline task body: expire the request unless a response won.
    async fn expire(self: &Arc<Self>, id: RequestId) {
        if self.store.mark_timed_out(id).is_err() {
            // Completed or cancelled first.
            return;
        }
        self.store.evict(id);
        if let Err(e) = self.storage.delete(&storage_key(id)).await {
            warn!(request_id = %id, error = %e, "Expiry cleanup failed");
        }

        info!(request_id = %id, "Sign-in request expired");
        self.bus
            .publish(AuthEvent::ResponseOutcome {
                id,
                outcome: VerificationOutcome::Failure(AuthFailure::Expired),
            })
            .await;
    }
}
