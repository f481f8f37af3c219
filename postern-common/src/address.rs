//! Recipient address resolution.
//!
//! A mailbox such as `bob@corp.com` is reduced to its local-part (`bob`),
//! which is the key used to look the account up in the local directory. The
//! domain is discarded and nothing is normalised: `Bob@corp.com` and
//! `bob@corp.com` resolve to different local-parts.

use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error;

/// Errors produced when a mailbox address cannot be reduced to a local-part.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address has no `@` separating local-part and domain.
    #[error("Missing '@' in address: {0:?}")]
    MissingAt(String),

    /// Nothing precedes the first `@`.
    #[error("Empty local-part in address: {0:?}")]
    EmptyLocalPart(String),
}

impl AddressError {
    /// The raw address that failed to resolve
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::MissingAt(address) | Self::EmptyLocalPart(address) => address,
        }
    }
}

/// The local-part of a mailbox address, used as the directory lookup key.
///
/// Only [`resolve`] constructs one, so it is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocalPart(String);

impl LocalPart {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for LocalPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocalPart {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve a mailbox address to its local-part.
///
/// The address is split on the first `@`; everything after it is ignored,
/// including any further `@` characters.
///
/// # Errors
///
/// - [`AddressError::MissingAt`] if the address contains no `@` (this
///   includes the empty string)
/// - [`AddressError::EmptyLocalPart`] if the `@` is the first character
pub fn resolve(address: &str) -> Result<LocalPart, AddressError> {
    let Some((local, _domain)) = address.split_once('@') else {
        return Err(AddressError::MissingAt(address.to_owned()));
    };

    if local.is_empty() {
        return Err(AddressError::EmptyLocalPart(address.to_owned()));
    }

    Ok(LocalPart(local.to_owned()))
}
