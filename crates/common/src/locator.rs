//! Resolution of logical service names to base addresses.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::OrchestrationError;

/// The downstream services the orchestrator coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    /// Users, authentication and purchase records.
    IdentityPurchases,
    /// Products, stock and offers.
    Catalog,
    /// Prescriptions and doctors.
    Prescriptions,
}

impl ServiceName {
    /// Returns the logical name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::IdentityPurchases => "usuarios_y_autenticacion_y_compras",
            ServiceName::Catalog => "productos_y_ofertas",
            ServiceName::Prescriptions => "recetas_y_medicos",
        }
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved service address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub name: ServiceName,
    pub base_address: String,
}

impl ServiceEndpoint {
    /// Joins `path` onto the base address.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_address.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Immutable table of service addresses.
///
/// Built once from configuration and handed to each workflow; cloning shares
/// the table.
#[derive(Debug, Clone, Default)]
pub struct ServiceLocator {
    addresses: Arc<HashMap<ServiceName, String>>,
}

impl ServiceLocator {
    /// Creates a locator from `(service, base address)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (ServiceName, String)>) -> Self {
        Self {
            addresses: Arc::new(entries.into_iter().collect()),
        }
    }

    /// Resolves a service to its endpoint.
    ///
    /// An unconfigured service is an internal error: the workflow cannot
    /// proceed and the caller is not at fault.
    pub fn resolve(&self, name: ServiceName) -> Result<ServiceEndpoint, OrchestrationError> {
        self.addresses
            .get(&name)
            .map(|base| ServiceEndpoint {
                name,
                base_address: base.clone(),
            })
            .ok_or_else(|| {
                OrchestrationError::internal(format!("Servicio no configurado: {name}"))
            })
    }
}
