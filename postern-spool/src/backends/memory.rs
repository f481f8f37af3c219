use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use postern_common::Envelope;

use crate::{SpoolError, store::BackingStore, types::SpooledMessageId};

/// In-memory backing store implementation
///
/// Envelopes are kept in a `HashMap` behind an `RwLock`. Cloning the store
/// shares the underlying map. Bodies are reference counted, so storing an
/// envelope does not copy its data.
///
/// An optional capacity bounds the number of stored messages; once reached,
/// `persist` fails with [`SpoolError::Internal`] until something is deleted.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackingStore {
    pub(crate) messages: Arc<RwLock<HashMap<SpooledMessageId, Envelope>>>,
    capacity: Option<usize>,
}

impl MemoryBackingStore {
    /// Create a new empty memory-backed store with unlimited capacity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new memory-backed store holding at most `capacity` messages
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Get the current number of messages in the store
    ///
    /// Recovers gracefully if the lock is poisoned by accessing the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the configured capacity (None = unlimited)
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[async_trait]
impl BackingStore for MemoryBackingStore {
    async fn persist(&self, envelope: &Envelope) -> crate::Result<SpooledMessageId> {
        let id = SpooledMessageId::generate();

        let mut messages = self.messages.write()?;
        if let Some(cap) = self.capacity
            && messages.len() >= cap
        {
            return Err(SpoolError::Internal(format!(
                "Memory spool capacity exceeded: {}/{cap} messages",
                messages.len(),
            )));
        }

        if messages.contains_key(&id) {
            return Err(SpoolError::AlreadyExists(id));
        }
        messages.insert(id.clone(), envelope.clone());

        Ok(id)
    }

    async fn list(&self) -> crate::Result<Vec<SpooledMessageId>> {
        let mut ids: Vec<_> = self.messages.read()?.keys().cloned().collect();
        ids.sort();

        Ok(ids)
    }

    async fn read(&self, id: &SpooledMessageId) -> crate::Result<Envelope> {
        self.messages
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| SpoolError::NotFound(id.clone()))
    }

    async fn delete(&self, id: &SpooledMessageId) -> crate::Result<()> {
        self.messages
            .write()?
            .remove(id)
            .ok_or_else(|| SpoolError::NotFound(id.clone()))?;
        Ok(())
    }
}
