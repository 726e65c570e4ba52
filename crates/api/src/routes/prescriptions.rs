//! Prescription validation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use gateway::OutboundGateway;
use saga::{STATUS_VALIDATED, ValidationResult};

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::routes::AppState;

/// PUT /api/orchestrator/recetas/validar/{id}: validate a prescription and
/// mark it as validated.
#[tracing::instrument(skip_all)]
pub async fn validate<G: OutboundGateway + Clone + 'static>(
    State(state): State<Arc<AppState<G>>>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> Result<Json<ValidationResult>, ApiError> {
    tracing::info!(prescription_id = %id, "prescription validation requested");
    let result = state
        .prescriptions
        .validate_prescription(&id, STATUS_VALIDATED, &token)
        .await?;
    Ok(Json(result))
}
