//! HTTP boundary for the pharmacy orchestrator.
//!
//! Exposes the purchase, purchase-history and prescription workflows under
//! `/api/orchestrator`, with structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use common::OrchestrationError;
use gateway::{HttpGateway, OutboundGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<G: OutboundGateway + Clone + 'static>(
    state: Arc<AppState<G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let orchestrator = Router::new()
        .route("/echo", get(routes::health::check))
        .route("/compras", post(routes::purchases::create::<G>))
        .route("/compras/me", get(routes::purchases::list_mine::<G>))
        .route(
            "/recetas/validar/{id}",
            put(routes::prescriptions::validate::<G>),
        )
        .with_state(state);

    Router::new()
        .nest("/api/orchestrator", orchestrator)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the production state: a reqwest gateway with the configured
/// timeout and the configured service addresses.
pub fn create_default_state(
    config: &Config,
) -> Result<Arc<AppState<HttpGateway>>, OrchestrationError> {
    let gateway = HttpGateway::new(config.outbound_timeout)?;
    Ok(Arc::new(AppState::new(gateway, config.service_locator())))
}
