//! # Auth Protocol Engine
//!
//! Orchestrates decentralized sign-in exchanges over a paired relay topic:
//! issues requests, dispatches incoming requests to the owning application,
//! accepts approve/reject decisions, verifies signatures against the
//! claimed account, and emits terminal outcomes on the event bus.
//!
//! ## Architecture
//!
//! Hexagonal layout:
//! - **Domain Layer** (`domain/`): request lifecycle entities and the
//!   request store, no I/O
//! - **Ports Layer** (`ports/`): inbound API trait and outbound gateway
//!   traits (relay transport, pairing, key storage)
//! - **Service Layer** (`service.rs`): the engine wiring domain logic to
//!   ports
//! - **Adapters** (`adapters/`): in-memory implementations for single
//!   process use and tests
//!
//! ## Failure discrimination
//!
//! Structural errors (bad params, duplicate ids) fail the call; protocol
//! outcomes (user rejection, verification failure, expiry) are delivered
//! asynchronously as typed [`signon_types::VerificationOutcome`] values and
//! are never thrown across the async boundary.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::{InMemoryPairing, InMemoryRelay, InMemoryStorage};
pub use config::EngineConfig;
pub use domain::entities::{PendingRequest, RequestState};
pub use domain::errors::{AuthError, StoreError};
pub use domain::store::RequestStore;
pub use ports::inbound::AuthProtocolApi;
pub use ports::outbound::{
    KeyValueStorage, PairingError, PairingGateway, PairingUri, RelayTransport, StorageError, Topic,
    TransportError,
};
pub use service::AuthEngine;
