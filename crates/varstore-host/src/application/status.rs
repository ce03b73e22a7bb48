//! Read-only status snapshot for external polling.

use serde_json::json;

use crate::infrastructure::storage::store::VariableStore;

/// Builds the polling snapshot as JSON: every stored section keyed by its
/// own name, with the reserved `Variables` section under `variables`.
///
/// The shape is stable for pollers: `variables` is always present, and
/// values appear in their natural JSON form (`None` as null, sequences as
/// arrays, mappings as objects with stringified keys where needed).
pub fn status_report(store: &VariableStore) -> serde_json::Value {
    serde_json::to_value(store.status()).unwrap_or_else(|_| json!({}))
}
