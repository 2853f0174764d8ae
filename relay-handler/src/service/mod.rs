//! Service layer
//!
//! Services contain the business logic of the handler. They sit on top of
//! the repositories and the build-status client, and [`StatusRelay`] sequences
//! them for one event.
//!
//! All services are trait-based to enable testing and dependency injection.

mod credentials;
mod relay;
mod reporter;
mod resolver;

// Re-export traits
pub use credentials::CredentialProvider;
pub use reporter::StatusReporter;
pub use resolver::ExecutionResolver;

// Re-export implementations
pub use credentials::CachedCredentialProvider;
pub use relay::{Delivery, HandlerFailure, HandlerState, StatusRelay};
pub use reporter::BitbucketStatusReporter;
pub use resolver::StandardExecutionResolver;
