//! Purchase registration and history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use gateway::OutboundGateway;
use saga::{PurchaseHistory, PurchaseRequest, PurchaseResult};

use crate::auth::BearerToken;
use crate::error::ApiError;
use crate::routes::AppState;

/// POST /api/orchestrator/compras: register a purchase.
#[tracing::instrument(skip_all)]
pub async fn create<G: OutboundGateway + Clone + 'static>(
    State(state): State<Arc<AppState<G>>>,
    BearerToken(token): BearerToken,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PurchaseResult>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let result = state.purchases.register_purchase(&request, &token).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/orchestrator/compras/me: list the caller's purchases with
/// product details.
#[tracing::instrument(skip_all)]
pub async fn list_mine<G: OutboundGateway + Clone + 'static>(
    State(state): State<Arc<AppState<G>>>,
    BearerToken(token): BearerToken,
) -> Result<Json<PurchaseHistory>, ApiError> {
    let history = state.history.list_purchases_detailed(&token).await?;
    Ok(Json(history))
}
