//! Core domain types
//!
//! These types describe one relay invocation end to end: the incoming action
//! event, the execution detail it resolves to, the credential used to
//! authenticate, and the report sent to the source-control server.

pub mod build_status;
pub mod credential;
pub mod event;
pub mod execution;
