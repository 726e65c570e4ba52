//! Single chokepoint for every remote call made by the orchestrator.
//!
//! Transport failures and upstream error bodies are normalized into
//! [`OrchestrationError`] here, so the workflows only ever see one error
//! vocabulary.

pub mod gateway;
pub mod http;
pub mod memory;
pub mod request;

pub use common::{OrchestrationError, Result};
pub use gateway::{OutboundGateway, interpret_response};
pub use http::HttpGateway;
pub use memory::{InMemoryGateway, StubResponse};
pub use request::{Method, OutboundRequest};
