//! The request store: the only mutable shared state in the core.
//!
//! All transitions run under one mutex held across the full
//! lookup-then-check-then-mutate sequence, so two racing responses (or a
//! response racing the timeout) can never both complete the same request.

use super::entities::{PendingRequest, RequestState};
use super::errors::StoreError;
use parking_lot::Mutex;
use signon_types::{AuthRequestParams, RequestId};
use std::collections::HashMap;

/// Tracks outstanding requests by id on the requesting side.
#[derive(Debug, Default)]
pub struct RequestStore {
    entries: Mutex<HashMap<RequestId, PendingRequest>>,
}

impl RequestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entry in `Sent` state.
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateRequest` if any entry (live or terminal but
    /// not yet evicted) exists under `id`; collisions fail loudly.
    pub fn create(&self, id: RequestId, params: AuthRequestParams) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(&id) {
            return Err(StoreError::DuplicateRequest(id));
        }
        entries.insert(id, PendingRequest::new(id, params));
        Ok(())
    }

    /// Mark the relay publish as acknowledged.
    ///
    /// # Errors
    ///
    /// `StoreError::UnknownRequest` if the entry is missing or terminal.
    pub fn mark_delivered(&self, id: RequestId) -> Result<(), StoreError> {
        self.transition(id, RequestState::Delivered).map(|_| ())
    }

    /// Consume the entry for an arriving response (at-most-once): the
    /// transition fails if the entry is missing or already terminal, so a
    /// second response for the same id is rejected, not overwritten.
    ///
    /// # Errors
    ///
    /// `StoreError::UnknownRequest` as above.
    pub fn mark_responded(&self, id: RequestId) -> Result<PendingRequest, StoreError> {
        self.transition(id, RequestState::Responded)
    }

    /// Expire the entry after the response deadline.
    ///
    /// # Errors
    ///
    /// `StoreError::UnknownRequest` if the request already completed; the
    /// caller treats that as "the response won the race".
    pub fn mark_timed_out(&self, id: RequestId) -> Result<PendingRequest, StoreError> {
        self.transition(id, RequestState::TimedOut)
    }

    /// Cancel the entry on caller request.
    ///
    /// # Errors
    ///
    /// `StoreError::UnknownRequest` if missing or terminal.
    pub fn mark_cancelled(&self, id: RequestId) -> Result<PendingRequest, StoreError> {
        self.transition(id, RequestState::Cancelled)
    }

    /// Remove an entry, returning it if present.
    pub fn evict(&self, id: RequestId) -> Option<PendingRequest> {
        self.entries.lock().remove(&id)
    }

    /// Whether a live (non-terminal) entry exists under `id`.
    #[must_use]
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.entries
            .lock()
            .get(&id)
            .is_some_and(|e| !e.state.is_terminal())
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Atomic lookup-check-mutate under the store lock.
    fn transition(&self, id: RequestId, to: RequestState) -> Result<PendingRequest, StoreError> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(&id).ok_or(StoreError::UnknownRequest(id))?;
        if entry.state.is_terminal() {
            return Err(StoreError::UnknownRequest(id));
        }
        entry.state = to;
        Ok(entry.clone())
    }
}
