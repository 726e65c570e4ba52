//! Client for the catalog/inventory service.

use common::{Identifier, Result, ServiceLocator, ServiceName};
use gateway::{OutboundGateway, OutboundRequest};
use serde::Deserialize;
use serde_json::{Number, Value, json};

use super::decode;

/// A product as served by `GET /api/productos/{id}`. Fetched fresh per call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSnapshot {
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub precio: Option<f64>,
    /// Kept as served; some catalogs report whole units as floats.
    #[serde(default)]
    pub stock: Option<Number>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub requiere_receta: Option<bool>,
}

impl ProductSnapshot {
    /// Available stock in whole units, truncating fractional values. A
    /// missing value counts as none.
    pub fn stock(&self) -> i64 {
        self.stock
            .as_ref()
            .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
            .unwrap_or(0)
    }

    pub fn requires_prescription(&self) -> bool {
        self.requiere_receta.unwrap_or(false)
    }

    /// Name for user-facing messages, falling back to the product id.
    pub fn display_name(&self, fallback: &Identifier) -> String {
        self.nombre.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Client for products, stock and offers.
#[derive(Debug, Clone)]
pub struct CatalogClient<G> {
    gateway: G,
    locator: ServiceLocator,
}

impl<G: OutboundGateway> CatalogClient<G> {
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self { gateway, locator }
    }

    /// `GET /api/productos/{id}`
    pub async fn product(&self, product_id: &Identifier, token: &str) -> Result<ProductSnapshot> {
        let endpoint = self.locator.resolve(ServiceName::Catalog)?;
        let body = self
            .gateway
            .call(
                OutboundRequest::get(endpoint.url(&format!("/api/productos/{product_id}")))
                    .authorization(token),
            )
            .await?;
        decode(endpoint.name, body)
    }

    /// `PUT /api/productos/{id}` with the new absolute stock.
    pub async fn update_stock(
        &self,
        product_id: &Identifier,
        stock: i64,
        token: &str,
    ) -> Result<Value> {
        let endpoint = self.locator.resolve(ServiceName::Catalog)?;
        self.gateway
            .call(
                OutboundRequest::put(endpoint.url(&format!("/api/productos/{product_id}")))
                    .authorization(token)
                    .json(json!({ "stock": stock })),
            )
            .await
    }
}
