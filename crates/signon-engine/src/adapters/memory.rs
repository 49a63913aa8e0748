//! In-memory implementations of the outbound ports.
//!
//! `InMemoryRelay` carries messages between engines in the same process.
//! Like a real relay, it never echoes a publish back to the publishing
//! client: each engine holds its own [`InMemoryRelay::client`] handle.

use crate::ports::outbound::{
    KeyValueStorage, PairingError, PairingGateway, PairingUri, RelayTransport, StorageError, Topic,
    TransportError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

const SUBSCRIBER_BUFFER: usize = 64;

struct RelayShared {
    /// topic -> (client id, sender) per subscriber.
    topics: Mutex<HashMap<String, Vec<(u64, mpsc::Sender<Vec<u8>>)>>>,
    /// topic -> (publisher id, payload) retained until a peer subscribes,
    /// mirroring a relay's mailbox for offline counterparties.
    mailbox: Mutex<HashMap<String, Vec<(u64, Vec<u8>)>>>,
    next_client_id: AtomicU64,
}

/// An in-process relay hub. Hand each participant its own client handle.
#[derive(Clone)]
pub struct InMemoryRelay {
    shared: Arc<RelayShared>,
}

impl InMemoryRelay {
    /// Create an empty relay hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RelayShared {
                topics: Mutex::new(HashMap::new()),
                mailbox: Mutex::new(HashMap::new()),
                next_client_id: AtomicU64::new(0),
            }),
        }
    }

    /// Create a client handle for one participant.
    #[must_use]
    pub fn client(&self) -> InMemoryRelayClient {
        InMemoryRelayClient {
            shared: self.shared.clone(),
            client_id: self.shared.next_client_id.fetch_add(1, Ordering::SeqCst),
        }
    }
}

impl Default for InMemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// One participant's view of the [`InMemoryRelay`].
pub struct InMemoryRelayClient {
    shared: Arc<RelayShared>,
    client_id: u64,
}

#[async_trait]
impl RelayTransport for InMemoryRelayClient {
    async fn ready(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn subscribe(&self, topic: &Topic) -> Result<mpsc::Receiver<Vec<u8>>, TransportError> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);

        // Drain retained messages from other publishers first.
        let backlog: Vec<Vec<u8>> = {
            let mut mailbox = self.shared.mailbox.lock();
            match mailbox.get_mut(&topic.0) {
                Some(retained) => {
                    let (mine, theirs): (Vec<_>, Vec<_>) = retained
                        .drain(..)
                        .partition(|(publisher, _)| *publisher == self.client_id);
                    *retained = mine;
                    theirs.into_iter().map(|(_, payload)| payload).collect()
                }
                None => Vec::new(),
            }
        };
        for payload in backlog {
            tx.send(payload)
                .await
                .map_err(|e| TransportError::SubscribeFailed(e.to_string()))?;
        }

        self.shared
            .topics
            .lock()
            .entry(topic.0.clone())
            .or_default()
            .push((self.client_id, tx));
        debug!(topic = %topic, client = self.client_id, "Subscribed to topic");
        Ok(rx)
    }

    async fn publish(&self, topic: &Topic, payload: Vec<u8>) -> Result<(), TransportError> {
        // Collect peers under the lock; send outside it.
        let peers: Vec<mpsc::Sender<Vec<u8>>> = {
            let mut topics = self.shared.topics.lock();
            let subscribers = topics.entry(topic.0.clone()).or_default();
            subscribers.retain(|(_, tx)| !tx.is_closed());
            subscribers
                .iter()
                .filter(|(id, _)| *id != self.client_id)
                .map(|(_, tx)| tx.clone())
                .collect()
        };

        if peers.is_empty() {
            // No counterparty yet; retain until one subscribes.
            self.shared
                .mailbox
                .lock()
                .entry(topic.0.clone())
                .or_default()
                .push((self.client_id, payload));
            return Ok(());
        }

        for tx in peers {
            tx.send(payload.clone())
                .await
                .map_err(|e| TransportError::PublishFailed(e.to_string()))?;
        }
        Ok(())
    }
}

/// Pairing over plain URIs of the form `signon:{topic}@1`.
///
/// Stands in for the symmetric-key handshake; the engines only need the
/// resulting topic handle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPairing;

impl InMemoryPairing {
    /// Create the pairing gateway.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PairingGateway for InMemoryPairing {
    async fn create(&self) -> Result<(Topic, PairingUri), PairingError> {
        let topic = Topic(Uuid::new_v4().simple().to_string());
        let uri = PairingUri(format!("signon:{topic}@1"));
        Ok((topic, uri))
    }

    async fn pair(&self, uri: &PairingUri) -> Result<Topic, PairingError> {
        let rest = uri
            .0
            .strip_prefix("signon:")
            .ok_or_else(|| PairingError::InvalidUri(uri.0.clone()))?;
        let topic = rest.split('@').next().unwrap_or_default();
        if topic.is_empty() {
            return Err(PairingError::InvalidUri(uri.0.clone()));
        }
        Ok(Topic(topic.to_string()))
    }
}

/// Key-value storage over a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
