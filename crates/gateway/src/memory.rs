use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrchestrationError, Result};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::gateway::{OutboundGateway, interpret_response};
use crate::request::{Method, OutboundRequest};

/// A scripted response for [`InMemoryGateway`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// A JSON body with the given status.
    Json { status: u16, body: Value },
    /// A raw (possibly non-JSON) body with the given status.
    Raw { status: u16, body: String },
    /// The call times out.
    Timeout,
    /// The service cannot be reached.
    Unavailable,
}

impl StubResponse {
    /// A 200 response with a JSON body.
    pub fn ok(body: Value) -> Self {
        StubResponse::Json { status: 200, body }
    }

    /// A JSON response with an arbitrary status.
    pub fn status(status: u16, body: Value) -> Self {
        StubResponse::Json { status, body }
    }
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    routes: HashMap<(Method, String), StubResponse>,
    calls: Vec<OutboundRequest>,
}

/// In-memory gateway for testing.
///
/// Responses are scripted per `(method, url)`; query parameters are not part
/// of the key. Every call is recorded. Scripted bodies go through the same
/// response interpretation as the HTTP implementation, so error normalization
/// is identical. Unscripted routes answer 404.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryGateway {
    /// Creates a gateway with no scripted routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for `method url`, replacing any previous one.
    pub async fn respond(&self, method: Method, url: impl Into<String>, response: StubResponse) {
        self.state
            .write()
            .await
            .routes
            .insert((method, url.into()), response);
    }

    /// Returns every recorded call in dispatch order.
    pub async fn calls(&self) -> Vec<OutboundRequest> {
        self.state.read().await.calls.clone()
    }

    /// Returns the number of recorded calls.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls.len()
    }

    /// Returns the recorded calls matching `method url`.
    pub async fn calls_to(&self, method: Method, url: &str) -> Vec<OutboundRequest> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.method == method && c.url == url)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OutboundGateway for InMemoryGateway {
    async fn call(&self, request: OutboundRequest) -> Result<Value> {
        tracing::debug!(method = %request.method, url = %request.url, "in-memory outbound request");

        let mut state = self.state.write().await;
        let response = state
            .routes
            .get(&(request.method.clone(), request.url.clone()))
            .cloned();
        state.calls.push(request);
        drop(state);

        match response {
            Some(StubResponse::Json { status, body }) => {
                interpret_response(status, body.to_string().as_bytes())
            }
            Some(StubResponse::Raw { status, body }) => interpret_response(status, body.as_bytes()),
            Some(StubResponse::Timeout) => Err(OrchestrationError::timeout()),
            Some(StubResponse::Unavailable) => Err(OrchestrationError::unavailable()),
            None => interpret_response(404, br#"{"error":"Not Found"}"#),
        }
    }
}
