//! Relay Core
//!
//! Core types and abstractions for relaying CodePipeline action state changes
//! to a Bitbucket Server build-status endpoint.
//!
//! This crate contains:
//! - Domain types: events, execution detail, build-status reports, credentials
//! - Status mapping from pipeline action states to build states
//! - The error taxonomy shared by the client and the handler
//! - Deployment descriptor: the event rule and permissions the handler needs

pub mod deploy;
pub mod domain;
pub mod error;

pub use error::{ErrorKind, RelayError};
