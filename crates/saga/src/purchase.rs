//! Purchase registration saga.

use std::collections::HashSet;
use std::time::Instant;

use common::{Identifier, OrchestrationError, Result, ServiceLocator};
use gateway::OutboundGateway;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::services::{CatalogClient, IdentityClient, PrescriptionsClient, ProductSnapshot};
use crate::steps;

const LENGTH_MISMATCH: &str = "Se requiere arrays de productos y cantidades del mismo tamaño";
const MISSING_NATIONAL_ID: &str = "No se pudo obtener el DNI del usuario";

/// Input of [`PurchaseOrchestrator::register_purchase`].
///
/// `productos` and `cantidades` are index-aligned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default, rename = "productos")]
    pub product_ids: Vec<Identifier>,
    #[serde(default, rename = "cantidades")]
    pub quantities: Vec<u32>,
    /// Extra fields merged into the purchase record.
    #[serde(default, rename = "datos_adicionales")]
    pub additional_fields: Option<Map<String, Value>>,
}

/// One (product, quantity) pairing with the snapshot used to validate it.
#[derive(Debug, Clone)]
pub struct PurchaseLineItem {
    pub product_id: Identifier,
    pub quantity: u32,
    pub snapshot: ProductSnapshot,
}

/// Product line attached to a registered purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    pub producto_id: Identifier,
    pub cantidad: u32,
    pub nombre: Option<String>,
    pub precio: Option<f64>,
    pub tipo: Option<String>,
    pub requiere_receta: bool,
}

impl From<&PurchaseLineItem> for ProductDetail {
    fn from(item: &PurchaseLineItem) -> Self {
        Self {
            producto_id: item.product_id.clone(),
            cantidad: item.quantity,
            nombre: item.snapshot.nombre.clone(),
            precio: item.snapshot.precio,
            tipo: item.snapshot.tipo.clone(),
            requiere_receta: item.snapshot.requires_prescription(),
        }
    }
}

/// The created purchase record plus product details, index-aligned with the
/// request.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResult {
    #[serde(flatten)]
    pub record: Map<String, Value>,
    pub productos_detalle: Vec<ProductDetail>,
}

/// Registers purchases across the identity, prescriptions and catalog
/// services.
///
/// Steps run strictly in order and the first error aborts the workflow.
/// Stock decrements are independent writes: if one fails, earlier ones are
/// not rolled back.
#[derive(Debug, Clone)]
pub struct PurchaseOrchestrator<G> {
    identity: IdentityClient<G>,
    prescriptions: PrescriptionsClient<G>,
    catalog: CatalogClient<G>,
}

impl<G: OutboundGateway + Clone> PurchaseOrchestrator<G> {
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self {
            identity: IdentityClient::new(gateway.clone(), locator.clone()),
            prescriptions: PrescriptionsClient::new(gateway.clone(), locator.clone()),
            catalog: CatalogClient::new(gateway, locator),
        }
    }

    /// Validates and registers a purchase for the caller identified by `token`.
    #[tracing::instrument(skip(self, token), fields(workflow = steps::WORKFLOW_PURCHASE))]
    pub async fn register_purchase(
        &self,
        request: &PurchaseRequest,
        token: &str,
    ) -> Result<PurchaseResult> {
        let started = Instant::now();
        let result = self.run(request, token).await;

        match &result {
            Ok(_) => {
                metrics::counter!("purchases_registered_total").increment(1);
                tracing::info!("purchase registered");
            }
            Err(e) => {
                metrics::counter!(
                    "purchase_rejections_total",
                    "reason" => e.kind.as_str()
                )
                .increment(1);
                tracing::warn!(status = e.status_code, error = %e, "purchase rejected");
            }
        }
        metrics::histogram!("workflow_duration_seconds", "workflow" => steps::WORKFLOW_PURCHASE)
            .record(started.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, request: &PurchaseRequest, token: &str) -> Result<PurchaseResult> {
        if request.product_ids.is_empty() || request.product_ids.len() != request.quantities.len()
        {
            return Err(OrchestrationError::validation(LENGTH_MISMATCH));
        }

        tracing::info!(step = steps::STEP_RESOLVE_CALLER, "saga step started");
        let caller = self.identity.me(token).await?;
        let national_id = caller
            .national_id()
            .cloned()
            .ok_or_else(|| OrchestrationError::validation(MISSING_NATIONAL_ID))?;

        tracing::info!(step = steps::STEP_COLLECT_COVERAGE, "saga step started");
        let covered: HashSet<Identifier> = self
            .prescriptions
            .validated_for_patient(&national_id, token)
            .await?
            .into_iter()
            .flat_map(|record| record.productos)
            .filter_map(|product| product.id)
            .collect();

        tracing::info!(step = steps::STEP_CHECK_STOCK, "saga step started");
        let mut line_items = Vec::with_capacity(request.product_ids.len());
        let mut pending_check = Vec::new();
        for (product_id, &quantity) in request.product_ids.iter().zip(&request.quantities) {
            let snapshot = self.catalog.product(product_id, token).await?;
            if snapshot.stock() < i64::from(quantity) {
                return Err(OrchestrationError::validation(format!(
                    "Stock insuficiente para el producto '{}'. Disponible: {}, Solicitado: {}",
                    snapshot.display_name(product_id),
                    snapshot.stock(),
                    quantity
                )));
            }
            if snapshot.requires_prescription() {
                pending_check.push(line_items.len());
            }
            line_items.push(PurchaseLineItem {
                product_id: product_id.clone(),
                quantity,
                snapshot,
            });
        }

        tracing::info!(step = steps::STEP_CHECK_COVERAGE, "saga step started");
        let uncovered: Vec<String> = pending_check
            .iter()
            .filter_map(|&index| line_items.get(index))
            .filter(|item| !covered.contains(&item.product_id))
            .map(|item| item.snapshot.display_name(&item.product_id))
            .collect();
        if !uncovered.is_empty() {
            return Err(OrchestrationError::validation_with_details(
                format!(
                    "Los siguientes productos requieren receta médica validada: {}",
                    uncovered.join(", ")
                ),
                json!({ "productos_sin_receta": uncovered }),
            ));
        }

        tracing::info!(step = steps::STEP_DECREMENT_STOCK, "saga step started");
        for item in &line_items {
            let new_stock = item.snapshot.stock() - i64::from(item.quantity);
            self.catalog
                .update_stock(&item.product_id, new_stock, token)
                .await?;
        }

        tracing::info!(step = steps::STEP_SUBMIT_PURCHASE, "saga step started");
        let mut purchase = Map::new();
        purchase.insert(
            "usuarioId".to_string(),
            caller.id.clone().unwrap_or(Value::Null),
        );
        purchase.insert(
            "productos".to_string(),
            Value::Array(
                line_items
                    .iter()
                    .map(|item| json!(item.product_id))
                    .collect(),
            ),
        );
        purchase.insert(
            "cantidades".to_string(),
            Value::Array(line_items.iter().map(|item| json!(item.quantity)).collect()),
        );
        if let Some(extra) = &request.additional_fields {
            purchase.extend(extra.clone());
        }
        let mut record = self.identity.create_purchase(purchase, token).await?;
        record.remove("productos_detalle");

        Ok(PurchaseResult {
            record,
            productos_detalle: line_items.iter().map(ProductDetail::from).collect(),
        })
    }
}
