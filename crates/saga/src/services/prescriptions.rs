//! Client for the prescriptions service.

use common::{Identifier, Result, ServiceLocator, ServiceName};
use gateway::{OutboundGateway, OutboundRequest};
use serde::Deserialize;
use serde_json::{Value, json};

use super::decode;

/// Status of a prescription that has been validated.
pub const STATUS_VALIDATED: &str = "validada";

/// Page size used when collecting a patient's validated prescriptions. Only
/// the first page is read.
pub const COVERAGE_PAGE_SIZE: u32 = 100;

/// A product line on a prescription.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescribedProduct {
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// A prescription as served by the prescriptions service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescriptionRecord {
    #[serde(default, rename = "pacienteDNI")]
    pub patient_dni: Option<Identifier>,
    /// Lowercase spelling still written by older prescription records.
    #[serde(default, rename = "pacientedni")]
    pub patient_dni_legacy: Option<Identifier>,
    #[serde(default)]
    pub productos: Vec<PrescribedProduct>,
}

impl PrescriptionRecord {
    /// The patient's national id, preferring `pacienteDNI` unless it is
    /// absent or blank.
    pub fn patient_national_id(&self) -> Option<&Identifier> {
        [&self.patient_dni, &self.patient_dni_legacy]
            .into_iter()
            .flatten()
            .find(|dni| !dni.is_blank())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PrescriptionPage {
    #[serde(default)]
    items: Vec<PrescriptionRecord>,
}

/// Client for prescriptions and doctors.
#[derive(Debug, Clone)]
pub struct PrescriptionsClient<G> {
    gateway: G,
    locator: ServiceLocator,
}

impl<G: OutboundGateway> PrescriptionsClient<G> {
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self { gateway, locator }
    }

    /// `GET /api/recetas/filter`: the first page of a patient's validated
    /// prescriptions.
    pub async fn validated_for_patient(
        &self,
        national_id: &Identifier,
        token: &str,
    ) -> Result<Vec<PrescriptionRecord>> {
        let endpoint = self.locator.resolve(ServiceName::Prescriptions)?;
        let body = self
            .gateway
            .call(
                OutboundRequest::get(endpoint.url("/api/recetas/filter"))
                    .authorization(token)
                    .query("dni", national_id)
                    .query("estado", STATUS_VALIDATED)
                    .query("page", 1)
                    .query("pagesize", COVERAGE_PAGE_SIZE),
            )
            .await?;
        let page: PrescriptionPage = decode(endpoint.name, body)?;
        Ok(page.items)
    }

    /// `GET /api/recetas/{id}`
    pub async fn get(&self, prescription_id: &str, token: &str) -> Result<PrescriptionRecord> {
        let endpoint = self.locator.resolve(ServiceName::Prescriptions)?;
        let body = self
            .gateway
            .call(
                OutboundRequest::get(endpoint.url(&format!("/api/recetas/{prescription_id}")))
                    .authorization(token),
            )
            .await?;
        decode(endpoint.name, body)
    }

    /// `PUT /api/recetas/{id}/validar`, returning the updated prescription.
    pub async fn transition(
        &self,
        prescription_id: &str,
        new_status: &str,
        token: &str,
    ) -> Result<Value> {
        let endpoint = self.locator.resolve(ServiceName::Prescriptions)?;
        self.gateway
            .call(
                OutboundRequest::put(
                    endpoint.url(&format!("/api/recetas/{prescription_id}/validar")),
                )
                .authorization(token)
                .json(json!({ "estadovalidacion": new_status })),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{RECETAS, TOKEN, locator};
    use gateway::{InMemoryGateway, Method, StubResponse};

    #[tokio::test]
    async fn test_filter_query_parameters() {
        let gateway = InMemoryGateway::new();
        gateway
            .respond(
                Method::GET,
                format!("{RECETAS}/api/recetas/filter"),
                StubResponse::ok(json!({
                    "page": 1,
                    "pagesize": 100,
                    "total": 1,
                    "items": [{ "pacienteDNI": "12345678", "productos": [{ "id": 3, "nombre": "X" }] }]
                })),
            )
            .await;
        let client = PrescriptionsClient::new(gateway.clone(), locator());

        let items = client
            .validated_for_patient(&Identifier::from(12345678), TOKEN)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].productos[0].id, Some(Identifier::from("3")));

        let call = &gateway.calls().await[0];
        assert_eq!(call.query_value("dni"), Some("12345678"));
        assert_eq!(call.query_value("estado"), Some("validada"));
        assert_eq!(call.query_value("page"), Some("1"));
        assert_eq!(call.query_value("pagesize"), Some("100"));
    }

    #[test]
    fn test_lowercase_patient_field_alias() {
        let record: PrescriptionRecord =
            serde_json::from_value(json!({ "pacientedni": 87654321 })).unwrap();
        assert_eq!(
            record.patient_national_id(),
            Some(&Identifier::from("87654321"))
        );
        assert!(record.productos.is_empty());
    }

    #[test]
    fn test_both_patient_fields_present() {
        let record: PrescriptionRecord = serde_json::from_value(json!({
            "pacienteDNI": "12345678",
            "pacientedni": "99999999"
        }))
        .unwrap();
        assert_eq!(
            record.patient_national_id(),
            Some(&Identifier::from("12345678"))
        );
    }

    #[test]
    fn test_blank_primary_patient_field_falls_back() {
        for primary in [json!(null), json!(""), json!("   ")] {
            let record: PrescriptionRecord = serde_json::from_value(json!({
                "pacienteDNI": primary,
                "pacientedni": "12345678"
            }))
            .unwrap();
            assert_eq!(
                record.patient_national_id(),
                Some(&Identifier::from("12345678")),
                "primary = {primary}"
            );
        }

        let record: PrescriptionRecord =
            serde_json::from_value(json!({ "pacienteDNI": null })).unwrap();
        assert_eq!(record.patient_national_id(), None);
    }

    #[tokio::test]
    async fn test_transition_body() {
        let gateway = InMemoryGateway::new();
        let url = format!("{RECETAS}/api/recetas/r1/validar");
        gateway
            .respond(Method::PUT, url.clone(), StubResponse::ok(json!({ "ok": true })))
            .await;
        let client = PrescriptionsClient::new(gateway.clone(), locator());

        client.transition("r1", STATUS_VALIDATED, TOKEN).await.unwrap();

        let calls = gateway.calls_to(Method::PUT, &url).await;
        assert_eq!(calls[0].body, Some(json!({ "estadovalidacion": "validada" })));
    }
}
