//! # Signon Bus - Auth Protocol Event Delivery
//!
//! Decouples protocol completion from caller polling: the engine publishes
//! `incoming request` and `response outcome` events, and the owning
//! application consumes them through scoped subscription handles.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Auth Engine  │    publish()       │ Application  │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery Guarantees
//!
//! - Each terminal outcome is published once, in the order outcomes are
//!   determined; every live subscriber sees it at most once.
//! - Subscriptions are scoped handles: dropping one unregisters it, so no
//!   listener outlives its owner.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{AuthEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
