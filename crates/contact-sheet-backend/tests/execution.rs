use contact_sheet_backend::{
    handle_selection_update, BackendError, ContactSheetNode, ImageBatch, PreviewSource,
    SelectionRegistry, FALLBACK_NODE_ID,
};
use contact_sheet_core::{SelectionState, SheetConfig, TargetId};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingPreviews {
    calls: AtomicUsize,
    fail: bool,
}

impl PreviewSource for CountingPreviews {
    fn encode(&self, _batch: &ImageBatch, index: usize) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BackendError::PreviewEncoding {
                index,
                reason: "unsupported channels".into(),
            });
        }
        Ok(format!("data:image/png;base64,{index}"))
    }
}

fn batch(n: usize, seed: f32) -> ImageBatch {
    let samples: Vec<f32> = (0..n * 8 * 8 * 3)
        .map(|i| ((i % 97) as f32 * 0.01 + seed).fract())
        .collect();
    ImageBatch::new([n, 8, 8, 3], samples).unwrap()
}

fn node(previews: Arc<CountingPreviews>) -> ContactSheetNode {
    ContactSheetNode::new(
        Arc::new(SelectionRegistry::new()),
        previews,
        &SheetConfig::new(),
    )
}

#[test]
fn execute_uses_previous_selection() {
    let node = node(Arc::new(CountingPreviews::default()));
    let images = batch(3, 0.0);

    let first = node.execute(Some("node-c"), &images, 0);
    assert_eq!(first.selected.len(), 3);

    node.registry().queue_pending_selection("node-c", &[2]);
    let second = node.execute(Some("node-c"), &images, 0);

    assert_eq!(second.selected.len(), 1);
    assert_eq!(second.selected.image(0), images.image(2));
    assert_eq!(second.ui.selected_active, vec![2]);
    assert_eq!(second.ui.selected_next, Some(vec![2]));
    assert_eq!(second.ui.batch_size, Some(3));
}

#[test]
fn previews_are_reused_while_batch_is_unchanged() {
    let previews = Arc::new(CountingPreviews::default());
    let node = node(previews.clone());

    let first = node.execute(Some("n"), &batch(2, 0.0), 0);
    assert_eq!(previews.calls.load(Ordering::SeqCst), 2);
    node.execute(Some("n"), &batch(2, 0.0), 0);
    assert_eq!(previews.calls.load(Ordering::SeqCst), 2);

    let changed = node.execute(Some("n"), &batch(2, 0.5), 0);
    assert_eq!(previews.calls.load(Ordering::SeqCst), 4);
    assert_eq!(first.ui.images, changed.ui.images);
}

#[test]
fn encode_failure_yields_no_previews() {
    let previews = Arc::new(CountingPreviews {
        fail: true,
        ..CountingPreviews::default()
    });
    let node = node(previews);
    let output = node.execute(Some("n"), &batch(2, 0.0), 0);
    assert!(output.ui.images.is_empty());
    assert_eq!(output.selected.len(), 2);
    assert!(node.registry().preview_cache("n").is_none());
}

#[test]
fn columns_are_clamped() {
    let node = node(Arc::new(CountingPreviews::default()));
    assert_eq!(node.execute(Some("n"), &batch(1, 0.0), -3).ui.columns, 0);
    assert_eq!(node.execute(Some("n"), &batch(1, 0.0), 40).ui.columns, 12);
    assert_eq!(node.execute(Some("n"), &batch(1, 0.0), 4).ui.columns, 4);
}

#[test]
fn missing_context_shares_fallback_id() {
    let node = node(Arc::new(CountingPreviews::default()));
    node.execute(None, &batch(2, 0.0), 0);
    assert!(node.registry().inspect_state(FALLBACK_NODE_ID).is_some());
}

#[test]
fn fingerprint_follows_pending_then_active() {
    let node = node(Arc::new(CountingPreviews::default()));
    assert_eq!(node.fingerprint_inputs(Some("n"), Some(2)), None);

    node.execute(Some("n"), &batch(3, 0.0), 2);
    assert_eq!(node.fingerprint_inputs(Some("n"), Some(2)), Some(vec![0, 1, 2, 3, 2]));

    node.registry().queue_pending_selection("n", &[1]);
    assert_eq!(node.fingerprint_inputs(Some("n"), None), Some(vec![1, 3, 0]));
}

#[test]
fn ui_payload_feeds_the_sheet() {
    let node = node(Arc::new(CountingPreviews::default()));
    node.execute(Some("7"), &batch(4, 0.0), 2);
    handle_selection_update(node.registry(), br#"{"node_id":"7","selection":[3,1]}"#).unwrap();
    let output = node.execute(Some("7"), &batch(4, 0.0), 2);

    let payload = output.ui_payload();
    assert_eq!(payload["contact_sheet"][0]["selected_active"], serde_json::json!([1, 3]));
    assert_eq!(payload["contact_sheet"][0]["columns"], 2);

    let update: contact_sheet_core::BatchUpdate =
        serde_json::from_value(payload["contact_sheet"][0].clone()).unwrap();
    let mut state = SelectionState::new(TargetId::new("7"));
    state.on_batch_update(update);
    assert_eq!(state.len(), 4);
    assert_eq!(state.pending_sorted(), vec![1, 3]);
}
