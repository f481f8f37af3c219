//! Typed outcomes of an acceptance attempt.
//!
//! Rejections are split by who is at fault:
//! - client input errors (malformed or unknown recipient) are permanent and
//!   map to 5xx replies
//! - store failures are infrastructure errors, temporary, and map to 4xx so
//!   the sender retries

use std::borrow::Cow;

use postern_common::{AddressError, LocalPart, Status};
use postern_spool::{SpoolError, SpooledMessageId};
use thiserror::Error;

/// Why an envelope was not accepted.
#[derive(Debug, Error)]
pub enum AcceptError {
    /// A recipient could not be reduced to a local-part.
    #[error("Malformed recipient {address:?}: {source}")]
    MalformedRecipient {
        address: String,
        #[source]
        source: AddressError,
    },

    /// A recipient's local-part does not name a local account.
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(LocalPart),

    /// Every recipient was valid but the store failed to persist the message.
    #[error("Failed to store message: {0}")]
    StoreFailure(#[from] SpoolError),
}

impl From<AddressError> for AcceptError {
    fn from(source: AddressError) -> Self {
        Self::MalformedRecipient {
            address: source.address().to_owned(),
            source,
        }
    }
}

impl AcceptError {
    /// Returns `true` if the sender should not retry this message as is.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecipient { .. } | Self::UnknownRecipient(_)
        )
    }

    /// Returns `true` if the failure is on our side and a retry may succeed.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::StoreFailure(_))
    }

    /// The SMTP reply code for this rejection
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::MalformedRecipient { .. } => Status::MailboxNameNotAllowed,
            Self::UnknownRecipient(_) => Status::Error,
            Self::StoreFailure(_) => Status::ActionUnavailable,
        }
    }

    /// The full SMTP reply for this rejection. Store internals are not
    /// exposed to the client.
    #[must_use]
    pub fn reply(&self) -> (Status, Cow<'static, str>) {
        let text = match self {
            Self::MalformedRecipient { address, .. } => {
                Cow::Owned(format!("Malformed recipient address: {address}"))
            }
            Self::UnknownRecipient(local_part) => {
                Cow::Owned(format!("No such user here: {local_part}"))
            }
            Self::StoreFailure(_) => Cow::Borrowed("Local error in processing, please try again later"),
        };

        (self.status(), text)
    }
}

/// A successfully accepted and stored envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub id: SpooledMessageId,
}

impl Accepted {
    #[must_use]
    pub fn reply(&self) -> (Status, Cow<'static, str>) {
        (Status::Ok, Cow::Owned(format!("Ok: queued as {}", self.id)))
    }
}

/// Terminal outcome of one acceptance attempt
pub type AcceptanceResult = Result<Accepted, AcceptError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use postern_common::address::resolve;

    use super::*;

    #[test]
    fn classification() {
        let malformed = AcceptError::from(resolve("@corp.com").unwrap_err());
        assert!(malformed.is_permanent());
        assert!(!malformed.is_temporary());
        assert_eq!(malformed.status(), Status::MailboxNameNotAllowed);

        let unknown = AcceptError::UnknownRecipient(resolve("dave@corp.com").unwrap());
        assert!(unknown.is_permanent());
        assert_eq!(unknown.status(), Status::Error);

        let store = AcceptError::from(SpoolError::Internal("disk full".into()));
        assert!(store.is_temporary());
        assert!(!store.is_permanent());
        assert!(store.status().is_temporary());
    }

    #[test]
    fn malformed_keeps_source() {
        let err = AcceptError::from(resolve("postmaster").unwrap_err());
        assert!(matches!(
            &err,
            AcceptError::MalformedRecipient { address, .. } if address == "postmaster"
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn replies() {
        let unknown = AcceptError::UnknownRecipient(resolve("dave@corp.com").unwrap());
        let (status, text) = unknown.reply();
        assert_eq!(status, Status::Error);
        assert_eq!(text, "No such user here: dave");

        let store = AcceptError::from(SpoolError::Internal("secret detail".into()));
        let (status, text) = store.reply();
        assert_eq!(u32::from(status), 451);
        assert!(!text.contains("secret"));

        let id = SpooledMessageId::generate();
        let (status, text) = Accepted { id: id.clone() }.reply();
        assert_eq!(status, Status::Ok);
        assert_eq!(text, format!("Ok: queued as {id}"));
    }
}
