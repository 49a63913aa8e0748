//! The subscription side of the event bus.

use crate::events::{AuthEvent, EventFilter};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A scoped subscription handle.
///
/// Dropping the handle unregisters the subscriber; no listener outlives
/// its owner.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<AuthEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Live-subscription counter, decremented on drop.
    live_subscriptions: Arc<AtomicUsize>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<AuthEvent>,
        filter: EventFilter,
        live_subscriptions: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            receiver,
            filter,
            live_subscriptions,
        }
    }

    /// Receive the next event matching the filter.
    ///
    /// Returns `None` when the bus is dropped. A lagged subscriber skips
    /// the missed events and keeps receiving.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Receive the next matching event without blocking.
    ///
    /// # Errors
    ///
    /// `SubscriptionError::Closed` when the bus is gone.
    pub fn try_recv(&mut self) -> Result<Option<AuthEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// The filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live_subscriptions.fetch_sub(1, Ordering::SeqCst);
        debug!("Subscription dropped");
    }
}

/// `Stream` adapter over a [`Subscription`] for use with combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Wrap a subscription as a stream.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// The filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for EventStream {
    type Item = AuthEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}
