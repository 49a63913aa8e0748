//! The publishing side of the event bus.

use crate::events::{AuthEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event, returning the number of subscribers that received it.
    async fn publish(&self, event: AuthEvent) -> usize;

    /// Total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory event bus over `tokio::sync::broadcast`.
///
/// One bus per engine instance; subscribers register through
/// [`InMemoryEventBus::subscribe`] and are cleaned up on drop.
pub struct InMemoryEventBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<AuthEvent>,

    /// Live subscription count (decremented by `Subscription::drop`).
    live_subscriptions: Arc<AtomicUsize>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given per-subscriber capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            live_subscriptions: Arc::new(AtomicUsize::new(0)),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// The returned [`Subscription`] is a scoped resource: dropping it
    /// unregisters the subscriber.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        self.live_subscriptions.fetch_add(1, Ordering::SeqCst);
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(receiver, filter, self.live_subscriptions.clone())
    }

    /// Subscribe and wrap the subscription as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.live_subscriptions.load(Ordering::SeqCst)
    }

    /// The per-subscriber channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: AuthEvent) -> usize {
        let topic = event.topic();
        let id = event.request_id();

        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(topic = ?topic, request_id = %id, receivers = receiver_count, "Event published");
                receiver_count
            }
            Err(e) => {
                warn!(topic = ?topic, request_id = %id, error = %e, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
