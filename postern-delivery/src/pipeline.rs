//! Recipient validation and atomic hand-off to the message store.
//!
//! [`DeliveryPipeline::accept`] is called once per fully received message.
//! Recipients are checked in envelope order and the first failure ends the
//! attempt; the store is only called when every recipient is a known local
//! account, and then exactly once with the envelope as received.

use std::sync::Arc;

use postern_common::{AddressError, Envelope, LocalPart, address, incoming, internal, outgoing};
use postern_spool::BackingStore;

use crate::{
    directory::Directory,
    error::{AcceptError, Accepted},
};

/// Result of validating a single recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(LocalPart),
    UnknownLocalPart(LocalPart),
    MalformedAddress(AddressError),
}

impl ValidationOutcome {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    fn into_result(self) -> Result<LocalPart, AcceptError> {
        match self {
            Self::Valid(local_part) => Ok(local_part),
            Self::UnknownLocalPart(local_part) => Err(AcceptError::UnknownRecipient(local_part)),
            Self::MalformedAddress(err) => Err(err.into()),
        }
    }
}

/// Validates every recipient of an envelope against a [`Directory`] and
/// persists accepted envelopes to a [`BackingStore`].
///
/// Holds no state of its own between calls; clones share the collaborators
/// and may be used concurrently from independent connections.
#[derive(Debug, Clone)]
pub struct DeliveryPipeline {
    directory: Arc<dyn Directory>,
    store: Arc<dyn BackingStore>,
}

impl DeliveryPipeline {
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>, store: Arc<dyn BackingStore>) -> Self {
        Self { directory, store }
    }

    /// The store accepted envelopes are persisted to
    #[must_use]
    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    /// Resolve and look up a single recipient address
    pub async fn check_recipient(&self, recipient: &str) -> ValidationOutcome {
        let local_part = match address::resolve(recipient) {
            Ok(local_part) => local_part,
            Err(err) => return ValidationOutcome::MalformedAddress(err),
        };

        if self.directory.is_known(&local_part).await {
            ValidationOutcome::Valid(local_part)
        } else {
            ValidationOutcome::UnknownLocalPart(local_part)
        }
    }

    /// Accept an envelope for local delivery
    ///
    /// # Errors
    ///
    /// - [`AcceptError::MalformedRecipient`] for the first recipient without a
    ///   usable local-part
    /// - [`AcceptError::UnknownRecipient`] for the first recipient whose
    ///   local-part is not a local account
    /// - [`AcceptError::StoreFailure`] if every recipient was valid but the
    ///   store could not persist the envelope
    ///
    /// Nothing is persisted when an error is returned.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(sender = %envelope.sender(), recipients = envelope.recipients().len())
    )]
    pub async fn accept(&self, envelope: Envelope) -> Result<Accepted, AcceptError> {
        incoming!(
            "Accepting {} bytes from {} for {:?}",
            envelope.body().len(),
            envelope.sender(),
            envelope.recipients()
        );

        for recipient in envelope.recipients() {
            if let Err(err) = self.check_recipient(recipient).await.into_result() {
                internal!(level = INFO, "Rejected envelope from {}: {err}", envelope.sender());
                return Err(err);
            }
        }

        let id = self.store.persist(&envelope).await.map_err(|err| {
            tracing::warn!("Failed to store message from {}: {err}", envelope.sender());
            AcceptError::StoreFailure(err)
        })?;

        internal!(
            level = INFO,
            "Accepted message {id} from {} for {} recipient(s), {} bytes",
            envelope.sender(),
            envelope.recipients().len(),
            envelope.body().len()
        );

        let accepted = Accepted { id };
        outgoing!("{:?}", accepted.reply());

        Ok(accepted)
    }
}
