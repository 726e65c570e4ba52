//! Application configuration loaded from environment variables.

use std::time::Duration;

use common::{ServiceLocator, ServiceName};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `URL_USUARIOS_COMPRAS`: identity/purchases service (default: `http://localhost:8081`)
/// - `URL_PRODUCTOS_OFERTAS`: catalog service (default: `http://localhost:8082`)
/// - `URL_RECETAS_MEDICOS`: prescriptions service (default: `http://localhost:8083`)
/// - `OUTBOUND_TIMEOUT_SECS`: per-call timeout for downstream requests (default: `10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub users_url: String,
    pub products_url: String,
    pub prescriptions_url: String,
    pub outbound_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            users_url: lookup("URL_USUARIOS_COMPRAS").unwrap_or(defaults.users_url),
            products_url: lookup("URL_PRODUCTOS_OFERTAS").unwrap_or(defaults.products_url),
            prescriptions_url: lookup("URL_RECETAS_MEDICOS").unwrap_or(defaults.prescriptions_url),
            outbound_timeout: lookup("OUTBOUND_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.outbound_timeout),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the service address table injected into every workflow.
    pub fn service_locator(&self) -> ServiceLocator {
        ServiceLocator::new([
            (ServiceName::IdentityPurchases, self.users_url.clone()),
            (ServiceName::Catalog, self.products_url.clone()),
            (ServiceName::Prescriptions, self.prescriptions_url.clone()),
        ])
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            users_url: "http://localhost:8081".to_string(),
            products_url: "http://localhost:8082".to_string(),
            prescriptions_url: "http://localhost:8083".to_string(),
            outbound_timeout: Duration::from_secs(10),
        }
    }
}
