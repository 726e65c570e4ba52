//! Shared test fixtures for the workflow unit tests.

use common::{ServiceLocator, ServiceName};
use gateway::{InMemoryGateway, Method, StubResponse};
use serde_json::{Value, json};

pub const IDENTITY: &str = "http://usuarios";
pub const CATALOG: &str = "http://productos";
pub const RECETAS: &str = "http://recetas";
pub const TOKEN: &str = "Bearer test-token";

pub fn locator() -> ServiceLocator {
    ServiceLocator::new([
        (ServiceName::IdentityPurchases, IDENTITY.to_string()),
        (ServiceName::Catalog, CATALOG.to_string()),
        (ServiceName::Prescriptions, RECETAS.to_string()),
    ])
}

pub fn product(id: impl Into<Value>, nombre: &str, stock: i64, requiere_receta: bool) -> Value {
    json!({
        "id": id.into(),
        "nombre": nombre,
        "precio": 12.5,
        "stock": stock,
        "tipo": "medicamento",
        "requiere_receta": requiere_receta,
    })
}

pub fn product_url(id: &str) -> String {
    format!("{CATALOG}/api/productos/{id}")
}

pub async fn script_caller(gateway: &InMemoryGateway, user: Value) {
    gateway
        .respond(
            Method::GET,
            format!("{IDENTITY}/api/user/me"),
            StubResponse::ok(user),
        )
        .await;
}

pub async fn script_product(gateway: &InMemoryGateway, id: &str, body: Value) {
    gateway
        .respond(Method::GET, product_url(id), StubResponse::ok(body))
        .await;
}
