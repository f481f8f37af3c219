//! Types shared by every postern crate: the [`envelope::Envelope`] handed to
//! the acceptance pipeline, recipient [`address`] resolution, SMTP reply
//! [`status`] codes and [`logging`].

pub mod address;
pub mod envelope;
pub mod logging;
pub mod status;

pub use address::{AddressError, LocalPart};
pub use envelope::{Envelope, EnvelopeError};
pub use status::Status;
pub use tracing;
