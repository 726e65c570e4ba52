//! Orchestration workflows for the pharmacy platform.
//!
//! This crate stitches the identity/purchases, catalog and prescriptions
//! services into three business workflows:
//! 1. Register a purchase (fail fast, no compensation)
//! 2. Validate a prescription's state transition (fail fast)
//! 3. List the caller's purchases with live product data (best effort)
//!
//! Every remote call goes through a [`gateway::OutboundGateway`]; every
//! failure is a [`common::OrchestrationError`].

pub mod history;
pub mod prescription;
pub mod purchase;
pub mod services;
pub mod steps;

#[cfg(test)]
mod fixtures;

pub use history::{PRODUCT_UNAVAILABLE, PurchaseHistory, PurchaseHistoryEnricher};
pub use prescription::{PrescriptionValidator, STATUS_VALIDATED, ValidationChecks, ValidationResult};
pub use purchase::{
    ProductDetail, PurchaseLineItem, PurchaseOrchestrator, PurchaseRequest, PurchaseResult,
};
pub use services::{CatalogClient, IdentityClient, PrescriptionsClient, ProductSnapshot};
