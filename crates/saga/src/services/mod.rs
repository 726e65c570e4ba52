//! Typed clients for the downstream services.
//!
//! Each client resolves its service address through the [`ServiceLocator`]
//! on every call, sends the request through the shared gateway and validates
//! the response against the collaborator's contract types.

pub mod catalog;
pub mod identity;
pub mod prescriptions;

use common::{OrchestrationError, Result, ServiceName};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use catalog::{CatalogClient, ProductSnapshot};
pub use identity::{IdentityClient, UserProfile};
pub use prescriptions::{PrescribedProduct, PrescriptionRecord, PrescriptionsClient};

/// Decodes a response body into a contract type.
///
/// A body that does not match the contract is an internal error.
pub(crate) fn decode<T: DeserializeOwned>(service: ServiceName, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(%service, error = %e, "response does not match contract");
        OrchestrationError::internal(format!("Respuesta inválida de {service}: {e}"))
    })
}
