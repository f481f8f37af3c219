use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("An envelope needs at least one recipient")]
    NoRecipients,
}

/// A fully received message: the `MAIL FROM` sender, every `RCPT TO`
/// recipient in the order given, and the raw `DATA` body.
///
/// Recipients are kept exactly as received, duplicates included. The body is
/// not part of the serialised form; stores keep it alongside the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    sender: String,
    recipients: Vec<String>,
    #[serde(skip, default = "empty_body")]
    body: Arc<[u8]>,
}

fn empty_body() -> Arc<[u8]> {
    Arc::from(Vec::new())
}

impl Envelope {
    /// Create a new [`Envelope`]
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::NoRecipients`] if `recipients` is empty
    pub fn new(
        sender: impl Into<String>,
        recipients: Vec<String>,
        body: impl Into<Arc<[u8]>>,
    ) -> Result<Self, EnvelopeError> {
        if recipients.is_empty() {
            return Err(EnvelopeError::NoRecipients);
        }

        Ok(Self {
            sender: sender.into(),
            recipients,
            body: body.into(),
        })
    }

    /// Returns the sender for this message
    #[inline]
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the recipients for this message, in the order they were given
    #[inline]
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// Returns the raw message body
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns a shared handle to the raw message body
    #[inline]
    #[must_use]
    pub fn body_shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.body)
    }

    /// Replace the body, used by stores that keep it apart from the metadata
    #[must_use]
    pub fn with_body(self, body: impl Into<Arc<[u8]>>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }
}
