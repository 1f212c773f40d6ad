//! Authoritative per-node selection registry
//!
//! Between runs every node carries two selections: `active` (what the last
//! run forwarded) and an optional `pending` uploaded from the widget. A run
//! promotes `pending` to `active` and consumes it.
//!
//! The registry is safe to share between the request handler and node
//! execution; each operation holds a single map shard lock for its duration.

use async_trait::async_trait;
use contact_sheet_core::{
    PersistError, SelectionBackend, SelectionUpdateRequest, SelectionUpdateResponse,
};
use dashmap::DashMap;
use serde::Serialize;

/// Selection lifecycle and preview cache of one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeSelectionState {
    /// Selection forwarded by the last run
    pub active: Vec<usize>,
    /// Selection queued for the next run
    pub pending: Option<Vec<usize>>,
    /// Batch size seen by the last run
    pub last_batch_size: usize,
    /// Signature of the cached previews
    pub preview_token: Option<String>,
    /// Encoded previews of the last batch
    pub preview_data: Vec<String>,
}

/// Previews cached for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPreview {
    /// Signature the previews were encoded for
    pub token: Option<String>,
    /// Encoded previews
    pub data: Vec<String>,
}

/// Unique, sorted, in-range indices
#[must_use]
pub fn sanitize_selection(selection: &[i64], batch_size: usize) -> Vec<usize> {
    let sanitized: Vec<usize> =
        contact_sheet_core::sanitize(selection.iter().copied(), batch_size)
            .into_iter()
            .collect();
    if !sanitized.is_empty() && sanitized.len() < selection.len() {
        tracing::debug!(
            incoming = ?selection,
            sanitized = ?sanitized,
            batch_size,
            "selection pruned to in-range values"
        );
    }
    sanitized
}

fn full_batch(batch_size: usize) -> Vec<usize> {
    (0..batch_size).collect()
}

fn widen(indices: &[usize]) -> Vec<i64> {
    indices.iter().filter_map(|&i| i64::try_from(i).ok()).collect()
}

/// Concurrent map of node id to [`NodeSelectionState`]
#[derive(Debug, Default)]
pub struct SelectionRegistry {
    nodes: DashMap<String, NodeSelectionState>,
}

impl SelectionRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the state of a node
    ///
    /// An empty active selection defaults to the whole batch, so the first
    /// run forwards every image.
    pub fn get_state(&self, node_id: &str, batch_size: usize) -> NodeSelectionState {
        let mut state = self.nodes.entry(node_id.to_string()).or_default();
        if state.active.is_empty() {
            tracing::debug!(node_id, batch_size, "initialising default selection to full batch");
        }
        let active = sanitize_selection(&widen(&state.active), batch_size);
        state.active = if active.is_empty() {
            full_batch(batch_size)
        } else {
            active
        };
        state.last_batch_size = batch_size;
        state.clone()
    }

    /// Resolve the selection a run forwards
    ///
    /// Returns `(output, next)`. A pending selection wins when it still
    /// addresses part of the batch; one that sanitizes to nothing is dropped
    /// as stale. Pending is consumed and `output` becomes the new active set.
    pub fn resolve_selection_for_execution(
        &self,
        node_id: &str,
        batch_size: usize,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut state = self.nodes.entry(node_id.to_string()).or_default();

        let active = sanitize_selection(&widen(&state.active), batch_size);
        let active = if active.is_empty() {
            full_batch(batch_size)
        } else {
            active
        };

        let pending = match state.pending.take() {
            Some(original) => {
                let pending = sanitize_selection(&widen(&original), batch_size);
                if pending.is_empty() {
                    tracing::info!(
                        node_id,
                        original = ?original,
                        batch_size,
                        "dropping stale pending selection"
                    );
                    None
                } else {
                    Some(pending)
                }
            }
            None => None,
        };

        let output = pending.unwrap_or(active);
        state.active.clone_from(&output);
        state.last_batch_size = batch_size;

        tracing::debug!(node_id, output = ?output, batch_size, "resolved selection for execution");
        let next = state.active.clone();
        (output, next)
    }

    /// Store a selection uploaded from the widget
    ///
    /// The effective batch size is the larger of the last known size and what
    /// the selection itself implies. Returns the sanitized selection.
    pub fn queue_pending_selection(&self, node_id: &str, selection: &[i64]) -> Vec<usize> {
        let mut state = self.nodes.entry(node_id.to_string()).or_default();

        let inferred = selection
            .iter()
            .copied()
            .max()
            .filter(|&highest| highest >= 0)
            .and_then(|highest| usize::try_from(highest).ok())
            .map_or(0, |highest| highest.saturating_add(1));
        let batch_size = state.last_batch_size.max(inferred);
        let sanitized = sanitize_selection(selection, batch_size);

        if !selection.is_empty() && sanitized.is_empty() {
            tracing::warn!(
                node_id,
                incoming = ?selection,
                last_batch_size = state.last_batch_size,
                inferred,
                "discarding selection outside batch bounds"
            );
            state.pending = None;
        } else if selection.is_empty() {
            tracing::info!(node_id, "clearing pending selection");
            state.pending = Some(Vec::new());
        } else {
            tracing::info!(
                node_id,
                sanitized = ?sanitized,
                incoming = ?selection,
                batch_size,
                "queued pending selection"
            );
            state.pending = Some(sanitized.clone());
        }
        sanitized
    }

    /// Copy of a node's state, if it exists
    #[must_use]
    pub fn inspect_state(&self, node_id: &str) -> Option<NodeSelectionState> {
        self.nodes.get(node_id).map(|state| state.clone())
    }

    /// Forget every node
    pub fn reset(&self) {
        self.nodes.clear();
        tracing::debug!("cleared all contact sheet selection state");
    }

    /// Cached previews of a node, if any were stored
    #[must_use]
    pub fn preview_cache(&self, node_id: &str) -> Option<CachedPreview> {
        let state = self.nodes.get(node_id)?;
        if state.preview_data.is_empty() {
            return None;
        }
        Some(CachedPreview {
            token: state.preview_token.clone(),
            data: state.preview_data.clone(),
        })
    }

    /// Store previews for reuse by later runs
    pub fn update_preview_cache(&self, node_id: &str, token: String, data: Vec<String>) {
        let mut state = self.nodes.entry(node_id.to_string()).or_default();
        state.preview_token = Some(token);
        state.preview_data = data;
    }

    /// Number of known nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is known
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl SelectionBackend for SelectionRegistry {
    async fn update_selection(
        &self,
        request: SelectionUpdateRequest,
    ) -> Result<SelectionUpdateResponse, PersistError> {
        let sanitized = self.queue_pending_selection(&request.node_id, &widen(&request.selection));
        Ok(SelectionUpdateResponse::sanitized(sanitized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn state_defaults_to_full_batch() {
        let registry = SelectionRegistry::new();
        let state = registry.get_state("node-a", 4);
        assert_eq!(state.active, vec![0, 1, 2, 3]);
        assert_eq!(state.pending, None);
        assert_eq!(state.last_batch_size, 4);
    }

    #[test]
    fn pending_selection_promoted_on_next_run() {
        let registry = SelectionRegistry::new();
        let (first, _) = registry.resolve_selection_for_execution("node-b", 5);
        assert_eq!(first, vec![0, 1, 2, 3, 4]);

        registry.queue_pending_selection("node-b", &[4, 1, 99]);
        let (output, next) = registry.resolve_selection_for_execution("node-b", 5);
        assert_eq!(output, vec![1, 4]);
        assert_eq!(next, vec![1, 4]);
        assert_eq!(registry.inspect_state("node-b").unwrap().pending, None);
    }

    #[test]
    fn queue_infers_batch_size_from_selection() {
        let registry = SelectionRegistry::new();
        assert_eq!(registry.queue_pending_selection("n", &[7, 2, 2]), vec![2, 7]);
        assert_eq!(registry.inspect_state("n").unwrap().pending, Some(vec![2, 7]));
    }

    #[test]
    fn empty_selection_queues_an_empty_pending() {
        let registry = SelectionRegistry::new();
        registry.resolve_selection_for_execution("n", 3);
        assert!(registry.queue_pending_selection("n", &[]).is_empty());
        assert_eq!(registry.inspect_state("n").unwrap().pending, Some(Vec::new()));

        // empty pending is stale on resolution; active survives
        let (output, _) = registry.resolve_selection_for_execution("n", 3);
        assert_eq!(output, vec![0, 1, 2]);
    }

    #[test]
    fn negative_only_selection_clears_pending() {
        let registry = SelectionRegistry::new();
        registry.queue_pending_selection("n", &[1]);
        assert!(registry.queue_pending_selection("n", &[-1, -4]).is_empty());
        assert_eq!(registry.inspect_state("n").unwrap().pending, None);
    }

    #[test]
    fn pending_outside_shrunk_batch_is_dropped() {
        let registry = SelectionRegistry::new();
        registry.resolve_selection_for_execution("n", 6);
        registry.queue_pending_selection("n", &[5]);
        let (output, next) = registry.resolve_selection_for_execution("n", 2);
        assert_eq!(output, vec![0, 1]);
        assert_eq!(next, vec![0, 1]);
    }

    #[test]
    fn preview_cache_round_trip() {
        let registry = SelectionRegistry::new();
        assert!(registry.preview_cache("n").is_none());

        registry.update_preview_cache("n", "sig".into(), vec!["data:a".into()]);
        let cached = registry.preview_cache("n").unwrap();
        assert_eq!(cached.token.as_deref(), Some("sig"));
        assert_eq!(cached.data, vec!["data:a".to_string()]);

        registry.update_preview_cache("n", "sig2".into(), Vec::new());
        assert!(registry.preview_cache("n").is_none());
    }

    #[test]
    fn reset_forgets_everything() {
        let registry = SelectionRegistry::new();
        registry.get_state("a", 1);
        registry.get_state("b", 1);
        assert_eq!(registry.len(), 2);
        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.inspect_state("a").is_none());
    }

    #[tokio::test]
    async fn backend_trait_answers_with_sanitized_selection() {
        let registry = SelectionRegistry::new();
        registry.resolve_selection_for_execution("9", 3);
        let response = registry
            .update_selection(SelectionUpdateRequest {
                node_id: "9".into(),
                selection: vec![2, 0],
            })
            .await
            .unwrap();
        assert_eq!(response.selection, Some(vec![0, 2]));
    }
}
