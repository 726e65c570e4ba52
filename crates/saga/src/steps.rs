//! Workflow and step names used in logs and metrics.

/// Workflow identifier for purchase registration.
pub const WORKFLOW_PURCHASE: &str = "register_purchase";

/// Workflow identifier for prescription validation.
pub const WORKFLOW_PRESCRIPTION: &str = "validate_prescription";

/// Workflow identifier for the enriched purchase history.
pub const WORKFLOW_HISTORY: &str = "list_purchases_detailed";

pub const STEP_RESOLVE_CALLER: &str = "resolve_caller";
pub const STEP_COLLECT_COVERAGE: &str = "collect_prescription_coverage";
pub const STEP_CHECK_STOCK: &str = "check_stock";
pub const STEP_CHECK_COVERAGE: &str = "check_coverage";
pub const STEP_DECREMENT_STOCK: &str = "decrement_stock";
pub const STEP_SUBMIT_PURCHASE: &str = "submit_purchase";

pub const STEP_FETCH_PRESCRIPTION: &str = "fetch_prescription";
pub const STEP_VERIFY_PRODUCTS: &str = "verify_products";
pub const STEP_VERIFY_PATIENT: &str = "verify_patient";
pub const STEP_APPLY_TRANSITION: &str = "apply_transition";
