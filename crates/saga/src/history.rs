//! Enriched purchase history.

use std::time::Instant;

use common::{Identifier, OrchestrationError, Result, ServiceLocator};
use futures_util::future::join_all;
use gateway::OutboundGateway;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::services::{CatalogClient, IdentityClient};
use crate::steps;

/// Placeholder error for a product whose details could not be fetched.
pub const PRODUCT_UNAVAILABLE: &str = "Producto no disponible";

/// The caller's purchases, each with a `productos_detalle` list.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseHistory {
    pub compras: Vec<Value>,
}

/// Joins purchase records with live catalog data.
///
/// Unlike the other workflows this one degrades instead of failing: a product
/// that cannot be fetched becomes a placeholder line and the rest of the batch
/// is still returned. Only the purchase list itself is required.
#[derive(Debug, Clone)]
pub struct PurchaseHistoryEnricher<G> {
    identity: IdentityClient<G>,
    catalog: CatalogClient<G>,
}

impl<G: OutboundGateway + Clone> PurchaseHistoryEnricher<G> {
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self {
            identity: IdentityClient::new(gateway.clone(), locator.clone()),
            catalog: CatalogClient::new(gateway, locator),
        }
    }

    /// Lists the caller's purchases with product details.
    #[tracing::instrument(skip(self, token), fields(workflow = steps::WORKFLOW_HISTORY))]
    pub async fn list_purchases_detailed(&self, token: &str) -> Result<PurchaseHistory> {
        let started = Instant::now();
        let result = self.run(token).await;

        if let Err(e) = &result {
            tracing::warn!(status = e.status_code, error = %e, "purchase history unavailable");
        }
        metrics::histogram!("workflow_duration_seconds", "workflow" => steps::WORKFLOW_HISTORY)
            .record(started.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, token: &str) -> Result<PurchaseHistory> {
        let purchases = match self.identity.my_purchases(token).await? {
            Value::Array(items) => items,
            other => {
                tracing::warn!(response = %other, "purchase list is not a list, treating as empty");
                Vec::new()
            }
        };

        let mut compras = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            compras.push(self.enrich(purchase, token).await);
        }

        Ok(PurchaseHistory { compras })
    }

    async fn enrich(&self, purchase: Value, token: &str) -> Value {
        let Value::Object(mut record) = purchase else {
            return purchase;
        };

        let product_ids = array_field(&record, "productos");
        let quantities = array_field(&record, "cantidades");

        // Lines are fetched concurrently; join_all keeps input order.
        let lines = join_all(
            product_ids
                .into_iter()
                .zip(quantities)
                .map(|(product_id, quantity)| self.line(product_id, quantity, token)),
        )
        .await;

        record.insert("productos_detalle".to_string(), Value::Array(lines));
        Value::Object(record)
    }

    async fn line(&self, raw_id: Value, quantity: Value, token: &str) -> Value {
        let fetched = match serde_json::from_value::<Identifier>(raw_id.clone()) {
            Ok(product_id) => self.catalog.product(&product_id, token).await,
            Err(e) => Err(OrchestrationError::validation(format!(
                "Identificador de producto inválido: {e}"
            ))),
        };

        match fetched {
            Ok(product) => json!({
                "producto_id": raw_id,
                "cantidad": quantity,
                "nombre": product.nombre,
                "precio": product.precio,
                "tipo": product.tipo,
                "stock": product.stock,
            }),
            Err(e) => {
                metrics::counter!("purchase_history_degraded_items_total").increment(1);
                tracing::warn!(product_id = %raw_id, error = %e, "product detail unavailable");
                json!({
                    "producto_id": raw_id,
                    "cantidad": quantity,
                    "error": PRODUCT_UNAVAILABLE,
                })
            }
        }
    }
}

fn array_field(record: &Map<String, Value>, key: &str) -> Vec<Value> {
    record
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{IDENTITY, TOKEN, locator, product, product_url, script_product};
    use gateway::{InMemoryGateway, Method, StubResponse};
    use metrics_exporter_prometheus::PrometheusBuilder;

    async fn setup(purchases: Value) -> (PurchaseHistoryEnricher<InMemoryGateway>, InMemoryGateway) {
        let gateway = InMemoryGateway::new();
        gateway
            .respond(
                Method::GET,
                format!("{IDENTITY}/api/compras/me"),
                StubResponse::ok(purchases),
            )
            .await;
        (
            PurchaseHistoryEnricher::new(gateway.clone(), locator()),
            gateway,
        )
    }

    #[tokio::test]
    async fn test_enriches_each_line_in_order() {
        let (enricher, gateway) = setup(json!([
            { "id": "c1", "productos": ["p1", "p2"], "cantidades": [1, 3] }
        ]))
        .await;
        script_product(&gateway, "p1", product("p1", "Paracetamol", 10, false)).await;
        script_product(&gateway, "p2", product("p2", "Ibuprofeno", 6, false)).await;

        let history = enricher.list_purchases_detailed(TOKEN).await.unwrap();

        let lines = history.compras[0]["productos_detalle"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["producto_id"], "p1");
        assert_eq!(lines[0]["nombre"], "Paracetamol");
        assert_eq!(lines[1]["producto_id"], "p2");
        assert_eq!(lines[1]["cantidad"], 3);
        assert_eq!(lines[1]["stock"], 6);
        assert_eq!(history.compras[0]["id"], "c1");
    }

    #[tokio::test]
    async fn test_failed_product_degrades_without_failing() {
        let (enricher, gateway) = setup(json!([
            { "id": "c1", "productos": ["p1", "p3"], "cantidades": [1, 2] }
        ]))
        .await;
        script_product(&gateway, "p1", product("p1", "Paracetamol", 10, false)).await;
        gateway
            .respond(Method::GET, product_url("p3"), StubResponse::Unavailable)
            .await;

        let history = enricher.list_purchases_detailed(TOKEN).await.unwrap();

        let lines = history.compras[0]["productos_detalle"].as_array().unwrap();
        assert_eq!(lines[0]["nombre"], "Paracetamol");
        assert_eq!(
            lines[1],
            json!({ "producto_id": "p3", "cantidad": 2, "error": PRODUCT_UNAVAILABLE })
        );
    }

    #[tokio::test]
    async fn test_non_list_response_is_empty() {
        let (enricher, _) = setup(json!({ "message": "sin compras" })).await;

        let history = enricher.list_purchases_detailed(TOKEN).await.unwrap();

        assert!(history.compras.is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_lengths_are_zipped() {
        let (enricher, gateway) = setup(json!([
            { "id": "c1", "productos": ["p1", "p2"], "cantidades": [1] }
        ]))
        .await;
        script_product(&gateway, "p1", product("p1", "Paracetamol", 10, false)).await;

        let history = enricher.list_purchases_detailed(TOKEN).await.unwrap();

        let lines = history.compras[0]["productos_detalle"].as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(gateway.calls_to(Method::GET, &product_url("p2")).await.is_empty());
    }

    #[tokio::test]
    async fn test_purchase_list_failure_is_returned() {
        let gateway = InMemoryGateway::new();
        gateway
            .respond(
                Method::GET,
                format!("{IDENTITY}/api/compras/me"),
                StubResponse::Timeout,
            )
            .await;
        let enricher = PurchaseHistoryEnricher::new(gateway, locator());

        let err = enricher.list_purchases_detailed(TOKEN).await.unwrap_err();
        assert_eq!(err.status_code, 504);
    }

    #[tokio::test]
    async fn test_invalid_product_id_degrades() {
        let (enricher, gateway) = setup(json!([
            { "id": "c1", "productos": [null], "cantidades": [1] }
        ]))
        .await;

        let history = enricher.list_purchases_detailed(TOKEN).await.unwrap();

        let lines = history.compras[0]["productos_detalle"].as_array().unwrap();
        assert_eq!(lines[0]["error"], PRODUCT_UNAVAILABLE);
        assert_eq!(gateway.call_count().await, 1);
    }

    #[test]
    fn test_duration_recorded_when_purchase_list_fails() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let err = metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let gateway = InMemoryGateway::new();
                gateway
                    .respond(
                        Method::GET,
                        format!("{IDENTITY}/api/compras/me"),
                        StubResponse::Timeout,
                    )
                    .await;
                PurchaseHistoryEnricher::new(gateway, locator())
                    .list_purchases_detailed(TOKEN)
                    .await
                    .unwrap_err()
            })
        });

        assert_eq!(err.status_code, 504);
        assert!(
            handle
                .render()
                .contains(r#"workflow_duration_seconds_count{workflow="list_purchases_detailed"} 1"#)
        );
    }
}
