pub mod health;
pub mod metrics;
pub mod prescriptions;
pub mod purchases;

use common::ServiceLocator;
use gateway::OutboundGateway;
use saga::{PrescriptionValidator, PurchaseHistoryEnricher, PurchaseOrchestrator};

/// Shared application state accessible from all handlers.
pub struct AppState<G> {
    pub purchases: PurchaseOrchestrator<G>,
    pub prescriptions: PrescriptionValidator<G>,
    pub history: PurchaseHistoryEnricher<G>,
}

impl<G: OutboundGateway + Clone> AppState<G> {
    /// Builds every workflow over the same gateway and service table.
    pub fn new(gateway: G, locator: ServiceLocator) -> Self {
        Self {
            purchases: PurchaseOrchestrator::new(gateway.clone(), locator.clone()),
            prescriptions: PrescriptionValidator::new(gateway.clone(), locator.clone()),
            history: PurchaseHistoryEnricher::new(gateway, locator),
        }
    }
}
