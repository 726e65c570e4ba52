//! Integration tests for the reqwest gateway against a local stub server.

use std::collections::HashMap;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use common::ErrorKind;
use gateway::{HttpGateway, OutboundGateway, OutboundRequest};
use serde_json::{Value, json};

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/ok", get(|| async { Json(json!({ "id": 1, "nombre": "Paracetamol" })) }))
        .route(
            "/echo",
            put(
                |headers: HeaderMap,
                 Query(params): Query<HashMap<String, String>>,
                 Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({ "auth": auth, "params": params, "body": body }))
                },
            ),
        )
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/not-json", get(|| async { "plain text" }))
        .route(
            "/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Producto no encontrado" })),
                )
            }),
        )
        .route(
            "/crash",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "late": true }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway() -> HttpGateway {
    HttpGateway::new(Duration::from_millis(300)).unwrap()
}

#[tokio::test]
async fn test_success_json() {
    let base = spawn_stub().await;
    let value = gateway()
        .call(OutboundRequest::get(format!("{base}/ok")))
        .await
        .unwrap();
    assert_eq!(value["nombre"], "Paracetamol");
}

#[tokio::test]
async fn test_headers_params_and_body_are_sent() {
    let base = spawn_stub().await;
    let value = gateway()
        .call(
            OutboundRequest::put(format!("{base}/echo"))
                .authorization("Bearer tok")
                .query("dni", "12345678")
                .json(json!({ "stock": 4 })),
        )
        .await
        .unwrap();

    assert_eq!(value["auth"], "Bearer tok");
    assert_eq!(value["params"]["dni"], "12345678");
    assert_eq!(value["body"]["stock"], 4);
}

#[tokio::test]
async fn test_empty_body_is_empty_map() {
    let base = spawn_stub().await;
    let value = gateway()
        .call(OutboundRequest::get(format!("{base}/empty")))
        .await
        .unwrap();
    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn test_unparsable_success_body_is_500() {
    let base = spawn_stub().await;
    let err = gateway()
        .call(OutboundRequest::get(format!("{base}/not-json")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 500);
    assert_eq!(err.kind, ErrorKind::Internal);
}

#[tokio::test]
async fn test_upstream_error_status_is_passed_through() {
    let base = spawn_stub().await;
    let err = gateway()
        .call(OutboundRequest::get(format!("{base}/missing")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 404);
    assert_eq!(err.message, "Error en microservicio: Producto no encontrado");
    assert_eq!(err.details, Some(json!({ "error": "Producto no encontrado" })));
}

#[tokio::test]
async fn test_upstream_raw_error_text() {
    let base = spawn_stub().await;
    let err = gateway()
        .call(OutboundRequest::get(format!("{base}/crash")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 500);
    assert_eq!(err.kind, ErrorKind::Upstream);
    assert_eq!(err.details, Some(json!({ "error": "boom" })));
}

#[tokio::test]
async fn test_timeout_is_504() {
    let base = spawn_stub().await;
    let err = gateway()
        .call(OutboundRequest::get(format!("{base}/slow")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 504);
    assert!(err.details.is_none());
}

#[tokio::test]
async fn test_connection_refused_is_503() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway()
        .call(OutboundRequest::get(format!("http://{addr}/ok")))
        .await
        .unwrap_err();
    assert_eq!(err.status_code, 503);
}
