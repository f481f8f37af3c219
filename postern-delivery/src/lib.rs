//! The acceptance boundary: decides whether a fully received envelope is
//! deliverable to local accounts and, if so, stores it exactly once.

pub mod directory;
pub mod error;
pub mod pipeline;

pub use directory::{Directory, DirectoryConfig, StaticDirectory};
pub use error::{AcceptError, Accepted, AcceptanceResult};
pub use pipeline::{DeliveryPipeline, ValidationOutcome};
