//! Backing store implementations
//!
//! - `memory`: in-memory storage for tests and transient use
//! - `test`: memory storage with call counting and failure injection
//! - `file`: file-based storage for production use

pub mod file;
pub mod memory;

pub use file::{FileBackingStore, FileBackingStoreBuilder};
pub use memory::MemoryBackingStore;
pub use test::TestBackingStore;
