//! Selection-update request handling
//!
//! Transport-agnostic: the host's HTTP server hands over the raw body and
//! writes back whatever [`selection_update_reply`] returns.

use crate::error::RequestError;
use crate::registry::SelectionRegistry;
use contact_sheet_core::SelectionUpdateResponse;
use serde_json::{Map, Value};

/// Validate a request body and queue its selection
///
/// Body shape: `{ "node_id": string | number, "selection": [int, ...] }`.
/// A missing `selection` clears the pending selection.
///
/// # Errors
/// [`RequestError`] describing the first problem found
pub fn handle_selection_update(
    registry: &SelectionRegistry,
    body: &[u8],
) -> Result<SelectionUpdateResponse, RequestError> {
    let data: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "invalid JSON payload for contact sheet selection");
        RequestError::InvalidJson(e.to_string())
    })?;
    let Value::Object(data) = data else {
        return Err(RequestError::InvalidJson("expected a JSON object".into()));
    };

    let node_id = node_id(&data).ok_or(RequestError::MissingNodeId)?;
    let selection = match data.get("selection") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(as_index)
            .collect::<Option<Vec<i64>>>()
            .ok_or(RequestError::SelectionContainsNonInt)?,
        Some(_) => return Err(RequestError::SelectionMustBeList),
    };

    let sanitized = registry.queue_pending_selection(&node_id, &selection);
    tracing::info!(
        node_id = %node_id,
        raw = ?selection,
        sanitized = ?sanitized,
        "received UI selection"
    );
    Ok(SelectionUpdateResponse::sanitized(sanitized))
}

/// Status code and JSON body for a request
#[must_use]
pub fn selection_update_reply(registry: &SelectionRegistry, body: &[u8]) -> (u16, Value) {
    match handle_selection_update(registry, body) {
        Ok(response) => (
            200,
            serde_json::to_value(&response).unwrap_or_else(|_| Value::Object(Map::new())),
        ),
        Err(e) => (e.status(), e.body()),
    }
}

fn node_id(data: &Map<String, Value>) -> Option<String> {
    match data.get("node_id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer coercion: integers, finite floats (truncated), numeric strings and booleans
#[allow(clippy::cast_possible_truncation)]
fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
