//! Durable storage for accepted envelopes.
//!
//! [`BackingStore`] is the contract the acceptance pipeline persists through.
//! [`FileBackingStore`] keeps messages on disk, [`MemoryBackingStore`] and
//! [`TestBackingStore`] keep them in memory.

pub mod backends;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use backends::{FileBackingStore, FileBackingStoreBuilder, MemoryBackingStore, TestBackingStore};
pub use config::SpoolConfig;
pub use error::{Result, SerializationError, SpoolError, ValidationError};
pub use store::BackingStore;
pub use types::SpooledMessageId;
