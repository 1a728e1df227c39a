//! # External Capability Traits
//!
//! Defines the contract between the sync core and the capabilities it
//! consumes but does not implement itself.
//!
//! ## Overview
//!
//! The core orchestrates *what* gets transferred and in what order; the
//! actual byte movement is delegated to a [`RemoteTransport`](remote::RemoteTransport)
//! implementation. Keeping the transport behind a trait means the driver can
//! be exercised in tests with an in-memory double and shipped against
//! OpenSSH (see `provider-ssh`) without either side knowing about the other.
//!
//! ## Error Handling
//!
//! All capability traits use [`BridgeError`](error::BridgeError). Concrete
//! implementations convert their own error types into `BridgeError` at the
//! seam and keep richer detail in their own crates.
//!
//! ## Thread Safety
//!
//! Capability traits require `Send + Sync` so a single implementation can be
//! shared across async tasks behind an `Arc`.

pub mod error;
pub mod remote;

pub use error::BridgeError;
pub use remote::RemoteTransport;
