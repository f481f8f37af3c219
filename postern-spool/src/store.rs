use async_trait::async_trait;
use postern_common::Envelope;

use crate::SpooledMessageId;

/// Durable storage for accepted envelopes
///
/// `persist` must be all-or-nothing: when it returns an error nothing may be
/// visible through `list` or `read`.
#[async_trait]
pub trait BackingStore: Send + Sync + std::fmt::Debug {
    /// Persist the envelope (sender, recipients and body, verbatim) and return
    /// the id it was stored under
    ///
    /// # Errors
    /// If the envelope could not be stored
    async fn persist(&self, envelope: &Envelope) -> crate::Result<SpooledMessageId>;

    /// List every stored message, oldest first
    ///
    /// # Errors
    /// If the store cannot be enumerated
    async fn list(&self) -> crate::Result<Vec<SpooledMessageId>>;

    /// Read a stored envelope back, body included
    ///
    /// # Errors
    /// [`crate::SpoolError::NotFound`] if there is no such message, or any
    /// error reading it
    async fn read(&self, id: &SpooledMessageId) -> crate::Result<Envelope>;

    /// Remove a stored message
    ///
    /// # Errors
    /// [`crate::SpoolError::NotFound`] if there is no such message, or any
    /// error removing it
    async fn delete(&self, id: &SpooledMessageId) -> crate::Result<()>;
}
