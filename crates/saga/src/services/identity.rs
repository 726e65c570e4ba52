//! Client for the identity/purchases service.

use common::{Identifier, Result, ServiceLocator, ServiceName};
use gateway::{OutboundGateway, OutboundRequest};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::decode;

/// The authenticated caller as reported by `GET /api/user/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    /// Forwarded verbatim as `usuarioId` when registering purchases.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub dni: Option<Identifier>,
}

impl UserProfile {
    /// Returns the caller's national id, ignoring blank values.
    pub fn national_id(&self) -> Option<&Identifier> {
        self.dni.as_ref().filter(|dni| !dni.is_blank())
    }
}

/// Client for users, authentication and purchase records.
#[derive(Debug, Clone)]
pub struct IdentityClient<G> {
    gateway: G,
    locator: ServiceLocator,
}

impl<G: OutboundGateway> IdentityClient<G> {
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self { gateway, locator }
    }

    /// `GET /api/user/me`
    pub async fn me(&self, token: &str) -> Result<UserProfile> {
        let endpoint = self.locator.resolve(ServiceName::IdentityPurchases)?;
        let body = self
            .gateway
            .call(OutboundRequest::get(endpoint.url("/api/user/me")).authorization(token))
            .await?;
        decode(endpoint.name, body)
    }

    /// `POST /api/compras`, returning the created purchase record.
    pub async fn create_purchase(
        &self,
        purchase: Map<String, Value>,
        token: &str,
    ) -> Result<Map<String, Value>> {
        let endpoint = self.locator.resolve(ServiceName::IdentityPurchases)?;
        let body = self
            .gateway
            .call(
                OutboundRequest::post(endpoint.url("/api/compras"))
                    .authorization(token)
                    .json(Value::Object(purchase)),
            )
            .await?;
        decode(endpoint.name, body)
    }

    /// `GET /api/compras/me`, returned as received.
    pub async fn my_purchases(&self, token: &str) -> Result<Value> {
        let endpoint = self.locator.resolve(ServiceName::IdentityPurchases)?;
        self.gateway
            .call(OutboundRequest::get(endpoint.url("/api/compras/me")).authorization(token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{IDENTITY, TOKEN, locator};
    use gateway::{InMemoryGateway, Method, StubResponse};
    use serde_json::json;

    #[tokio::test]
    async fn test_me_forwards_token_and_decodes_profile() {
        let gateway = InMemoryGateway::new();
        gateway
            .respond(
                Method::GET,
                format!("{IDENTITY}/api/user/me"),
                StubResponse::ok(json!({ "id": 9, "dni": 12345678, "nombre": "Ana" })),
            )
            .await;
        let client = IdentityClient::new(gateway.clone(), locator());

        let profile = client.me(TOKEN).await.unwrap();

        assert_eq!(profile.national_id(), Some(&Identifier::from("12345678")));
        assert_eq!(profile.id, Some(json!(9)));
        assert_eq!(gateway.calls().await[0].header_value("Authorization"), Some(TOKEN));
    }

    #[tokio::test]
    async fn test_blank_national_id_is_absent() {
        let profile: UserProfile = serde_json::from_value(json!({ "id": 1, "dni": "" })).unwrap();
        assert!(profile.national_id().is_none());

        let profile: UserProfile = serde_json::from_value(json!({ "id": 1, "dni": null })).unwrap();
        assert!(profile.national_id().is_none());
    }

    #[tokio::test]
    async fn test_create_purchase_rejects_non_object_record() {
        let gateway = InMemoryGateway::new();
        gateway
            .respond(
                Method::POST,
                format!("{IDENTITY}/api/compras"),
                StubResponse::ok(json!([1, 2])),
            )
            .await;
        let client = IdentityClient::new(gateway, locator());

        let err = client.create_purchase(Map::new(), TOKEN).await.unwrap_err();
        assert_eq!(err.status_code, 500);
    }
}
