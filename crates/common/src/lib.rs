//! Shared value types for the pharmacy orchestrator.
//!
//! Holds the single error value produced by every workflow, the service
//! address table, and the identifier type used to correlate records across
//! the downstream services.

pub mod error;
pub mod locator;
pub mod types;

pub use error::{ErrorKind, OrchestrationError, Result};
pub use locator::{ServiceEndpoint, ServiceLocator, ServiceName};
pub use types::Identifier;
