//! Prescription validation saga.

use std::time::Instant;

use common::{OrchestrationError, Result, ServiceLocator};
use gateway::OutboundGateway;
use serde::Serialize;
use serde_json::Value;

use crate::services::{CatalogClient, IdentityClient, PrescriptionsClient};
use crate::steps;

pub use crate::services::prescriptions::STATUS_VALIDATED;

const VALIDATED_MESSAGE: &str = "Receta validada y actualizada exitosamente";

/// Summary of the checks performed before the transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationChecks {
    pub productos_validados: usize,
    pub medico_valido: bool,
    pub paciente_valido: bool,
}

/// Result of [`PrescriptionValidator::validate_prescription`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub mensaje: String,
    pub receta: Value,
    pub validaciones: ValidationChecks,
}

/// Validates a prescription against the catalog and the caller before
/// applying a status transition.
#[derive(Debug, Clone)]
pub struct PrescriptionValidator<G> {
    prescriptions: PrescriptionsClient<G>,
    catalog: CatalogClient<G>,
    identity: IdentityClient<G>,
}

impl<G: OutboundGateway + Clone> PrescriptionValidator<G> {
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self {
            prescriptions: PrescriptionsClient::new(gateway.clone(), locator.clone()),
            catalog: CatalogClient::new(gateway.clone(), locator.clone()),
            identity: IdentityClient::new(gateway, locator),
        }
    }

    /// Checks every prescribed product and the patient, then pushes
    /// `new_status` to the prescriptions service.
    #[tracing::instrument(skip(self, token), fields(workflow = steps::WORKFLOW_PRESCRIPTION))]
    pub async fn validate_prescription(
        &self,
        prescription_id: &str,
        new_status: &str,
        token: &str,
    ) -> Result<ValidationResult> {
        let started = Instant::now();
        let result = self.run(prescription_id, new_status, token).await;

        match &result {
            Ok(_) => {
                metrics::counter!("prescriptions_validated_total").increment(1);
                tracing::info!("prescription validated");
            }
            Err(e) => {
                tracing::warn!(status = e.status_code, error = %e, "prescription validation failed");
            }
        }
        metrics::histogram!(
            "workflow_duration_seconds",
            "workflow" => steps::WORKFLOW_PRESCRIPTION
        )
        .record(started.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        prescription_id: &str,
        new_status: &str,
        token: &str,
    ) -> Result<ValidationResult> {
        tracing::info!(step = steps::STEP_FETCH_PRESCRIPTION, "saga step started");
        let record = self.prescriptions.get(prescription_id, token).await?;

        tracing::info!(step = steps::STEP_VERIFY_PRODUCTS, "saga step started");
        for prescribed in &record.productos {
            let shown_id = prescribed
                .id
                .as_ref()
                .map_or_else(|| "null".to_string(), ToString::to_string);
            let not_found = || {
                OrchestrationError::validation(format!(
                    "El producto con ID {shown_id} mencionado en la receta no existe"
                ))
            };

            let product_id = prescribed.id.as_ref().ok_or_else(not_found)?;
            let authoritative = self
                .catalog
                .product(product_id, token)
                .await
                .map_err(|e| {
                    tracing::warn!(product_id = %shown_id, error = %e, "prescribed product lookup failed");
                    not_found()
                })?;

            if authoritative.nombre != prescribed.nombre {
                return Err(OrchestrationError::validation(format!(
                    "Nombre del producto con ID {shown_id} no coincide: '{}' vs '{}'",
                    prescribed.nombre.as_deref().unwrap_or_default(),
                    authoritative.nombre.as_deref().unwrap_or_default()
                )));
            }
        }

        tracing::info!(step = steps::STEP_VERIFY_PATIENT, "saga step started");
        let caller = self.identity.me(token).await?;
        let caller_id = caller.dni.as_ref().map(|d| d.as_key());
        let patient_id = record.patient_national_id().map(|d| d.as_key());
        if caller_id.is_none() || caller_id != patient_id {
            return Err(OrchestrationError::validation(format!(
                "El DNI del usuario autenticado ({}) no coincide con el paciente de la receta ({})",
                caller_id.as_deref().unwrap_or_default(),
                patient_id.as_deref().unwrap_or_default()
            )));
        }

        tracing::info!(step = steps::STEP_APPLY_TRANSITION, "saga step started");
        let updated = self
            .prescriptions
            .transition(prescription_id, new_status, token)
            .await?;

        Ok(ValidationResult {
            mensaje: VALIDATED_MESSAGE.to_string(),
            receta: updated,
            // No doctor registry lookup is made; both flags are fixed.
            validaciones: ValidationChecks {
                productos_validados: record.productos.len(),
                medico_valido: true,
                paciente_valido: true,
            },
        })
    }
}
