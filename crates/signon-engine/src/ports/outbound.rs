//! # Outbound Ports (Driven Ports / SPI)
//!
//! Gateways the engine consumes. The relay, the pairing handshake and the
//! keychain are external collaborators; the engine only sees these traits.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// A relay topic both parties publish and subscribe on after pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(pub String);

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pairing URI handed out-of-band to the counterparty (QR code, link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingUri(pub String);

impl fmt::Display for PairingUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error from relay operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The relay connection is not (yet) established.
    #[error("Relay not connected")]
    NotConnected,

    /// Publishing to a topic failed.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// Subscribing to a topic failed.
    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),
}

/// The relay transport: an opaque publish/subscribe channel keyed by topic.
///
/// The engine treats topic determination as already resolved and never
/// manages socket reconnection. Implementations must be thread-safe.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Resolve once the transport is ready to carry messages.
    ///
    /// The engine awaits this internally before every publish, so callers
    /// need no "wait for connected" discipline of their own.
    ///
    /// # Errors
    ///
    /// `TransportError::NotConnected` if readiness cannot be established.
    async fn ready(&self) -> Result<(), TransportError>;

    /// Subscribe to a topic, receiving its inbound payloads as a stream.
    ///
    /// # Errors
    ///
    /// `TransportError::SubscribeFailed` on registration failure.
    async fn subscribe(&self, topic: &Topic) -> Result<mpsc::Receiver<Vec<u8>>, TransportError>;

    /// Publish a payload to a topic. Returning `Ok` is the relay's
    /// delivery acknowledgment.
    ///
    /// # Errors
    ///
    /// `TransportError::PublishFailed` if the relay did not accept it.
    async fn publish(&self, topic: &Topic, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Error from the pairing handshake.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PairingError {
    /// The URI does not parse as a pairing URI.
    #[error("Invalid pairing URI: {0}")]
    InvalidUri(String),

    /// The handshake failed.
    #[error("Pairing handshake failed: {0}")]
    HandshakeFailed(String),
}

/// Establishes the shared encryption context and topic between two parties.
///
/// The engine only needs the resulting topic handle, not the handshake
/// mechanics.
#[async_trait]
pub trait PairingGateway: Send + Sync {
    /// Create a new pairing, yielding the shared topic and the URI to hand
    /// to the counterparty out-of-band.
    ///
    /// # Errors
    ///
    /// `PairingError::HandshakeFailed` if the pairing cannot be created.
    async fn create(&self) -> Result<(Topic, PairingUri), PairingError>;

    /// Accept a counterparty's pairing URI, yielding the shared topic.
    ///
    /// # Errors
    ///
    /// `PairingError::InvalidUri` on malformed input.
    async fn pair(&self, uri: &PairingUri) -> Result<Topic, PairingError>;
}

/// Error from the key-value storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Opaque key-value store for protocol-persisted material (e.g. pending
/// request params surviving a process restart).
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Fetch a value.
    ///
    /// # Errors
    ///
    /// `StorageError::Backend` on store failure.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a value.
    ///
    /// # Errors
    ///
    /// `StorageError::Backend` on store failure.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// `StorageError::Backend` on store failure.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
