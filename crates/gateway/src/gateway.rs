use async_trait::async_trait;
use common::{OrchestrationError, Result};
use serde_json::{Map, Value};

use crate::request::OutboundRequest;

/// Core trait for outbound call implementations.
///
/// Every remote call the workflows make goes through `call`. Implementations
/// must map transport failures and error responses to [`OrchestrationError`]:
///
/// - timeout: 504
/// - connection failure: 503
/// - response status >= 400: the upstream status, with the parsed body (or
///   the raw text) as details
/// - success with an undecodable body: 500
/// - empty body: an empty JSON object
#[async_trait]
pub trait OutboundGateway: Send + Sync {
    /// Dispatches `request` and returns the decoded JSON body.
    async fn call(&self, request: OutboundRequest) -> Result<Value>;
}

/// Turns a received status and body into the gateway result.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<Value> {
    let text = String::from_utf8_lossy(body);

    if status >= 400 {
        let error_data = if body.is_empty() {
            Value::Object(Map::new())
        } else {
            match serde_json::from_slice::<Value>(body) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::error!(status, error = %e, "error response body is not JSON");
                    serde_json::json!({ "error": text })
                }
            }
        };

        let reason = match error_data.get("error") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => text.to_string(),
        };

        return Err(OrchestrationError::upstream(
            status,
            format!("Error en microservicio: {reason}"),
            Some(error_data),
        ));
    }

    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(status, body = %text, "response body is not JSON");
        OrchestrationError::internal(format!("Error en petición al microservicio: {e}"))
    })
}
