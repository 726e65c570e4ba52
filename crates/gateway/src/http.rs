use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::{OrchestrationError, Result};
use reqwest::Client;
use serde_json::Value;

use crate::gateway::{OutboundGateway, interpret_response};
use crate::request::OutboundRequest;

/// reqwest-backed gateway implementation.
///
/// Every call carries the configured timeout. Nothing is retried: timeouts and
/// connection failures surface immediately as 504 and 503.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    /// Creates a gateway whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            OrchestrationError::internal(format!("No se pudo crear el cliente HTTP: {e}"))
        })?;
        Ok(Self { client })
    }

    async fn dispatch(&self, request: &OutboundRequest) -> Result<Value> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(request, &e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(request, &e))?;

        tracing::debug!(
            status,
            body = %String::from_utf8_lossy(&body),
            "outbound response"
        );
        if status >= 400 {
            tracing::error!(
                method = %request.method,
                url = %request.url,
                status,
                body = %String::from_utf8_lossy(&body),
                "outbound error response"
            );
        }

        interpret_response(status, &body)
    }
}

#[async_trait]
impl OutboundGateway for HttpGateway {
    async fn call(&self, request: OutboundRequest) -> Result<Value> {
        tracing::info!(
            method = %request.method,
            url = %request.url,
            headers = ?request.redacted_headers(),
            params = ?request.query,
            json = ?request.body,
            "outbound request"
        );
        let started = Instant::now();

        let result = self.dispatch(&request).await;

        let outcome = match &result {
            Ok(_) => "success".to_string(),
            Err(e) => e.status_code.to_string(),
        };
        metrics::counter!(
            "outbound_requests_total",
            "method" => request.method.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("outbound_request_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        result
    }
}

fn transport_error(request: &OutboundRequest, err: &reqwest::Error) -> OrchestrationError {
    if err.is_timeout() {
        tracing::error!(method = %request.method, url = %request.url, "outbound timeout");
        OrchestrationError::timeout()
    } else if err.is_connect() {
        tracing::error!(method = %request.method, url = %request.url, "outbound connection error");
        OrchestrationError::unavailable()
    } else {
        tracing::error!(method = %request.method, url = %request.url, error = %err, "unexpected outbound error");
        OrchestrationError::internal(format!("Error en petición al microservicio: {err}"))
    }
}
