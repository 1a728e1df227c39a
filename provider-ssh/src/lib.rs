//! # OpenSSH Transport Provider
//!
//! Implements the `RemoteTransport` trait over the OpenSSH client tools.
//!
//! ## Overview
//!
//! This module provides:
//! - Remote directory creation via `ssh <host> mkdir -p`
//! - Recursive unit transfer via `scp -r`
//! - Remote path quoting for names with spaces and quotes
//! - Pass-through of extra OpenSSH options (timeouts, identities)
//!
//! Authentication and host resolution are deliberately left to the
//! operator's ssh configuration.

pub mod connector;
pub mod error;

pub use connector::SshTransport;
pub use error::{Result, SshError};
