use contact_sheet_core::prelude::*;
use contact_sheet_core::{Point, SelectionUpdateResponse};
use pretty_assertions::assert_eq;

fn images(n: usize) -> Vec<ImageRef> {
    (0..n).map(|i| ImageRef::new(format!("img-{i}"))).collect()
}

#[test]
fn press_on_third_tile_persists_it() {
    let config = SheetConfig::new();
    let mut state = SelectionState::new(TargetId::new("42"));
    state.on_batch_update(BatchUpdate::new(images(4)).with_columns(2).with_pending([]));

    let layout = TileLayout::compute(state.len(), state.columns(), 256.0, &config);
    assert_eq!((layout.columns(), layout.rows()), (2, 2));

    let mut resolver = PointerResolver::new(config.tolerance());
    resolver.set_render_origin(40.0);
    let tile = layout.tile(2).unwrap().rect;
    let event = PointerEvent::press(tile.x + 5.0, tile.y + 5.0 + 40.0);

    let outcome = resolver.handle(&event, &HostContext::default(), &layout);
    assert!(outcome.handled);
    let PointerAction::Toggle(index) = outcome.action else {
        panic!("expected a toggle, got {:?}", outcome.action);
    };
    let request = state.toggle(index).unwrap();
    assert_eq!(request.node_id, "42");
    assert_eq!(request.selection, vec![2]);
}

#[test]
fn empty_batch_reports_min_height_and_ignores_pointer() {
    let config = SheetConfig::new();
    let mut state = SelectionState::new(TargetId::new("42"));
    state.on_batch_update(BatchUpdate::new(Vec::new()));

    let layout = TileLayout::compute(state.len(), state.columns(), 256.0, &config);
    assert_eq!(layout.height(), config.min_height);
    assert!(layout.is_empty());

    let resolver = PointerResolver::new(config.tolerance());
    let ctx = HostContext::new(Point::new(0.0, 0.0), Point::new(256.0, 80.0));
    for event in [PointerEvent::press(10.0, 10.0), PointerEvent::moved(10.0, 10.0)] {
        assert!(!resolver.handle(&event, &ctx, &layout).handled);
    }
}

#[test]
fn backend_sanitized_selection_overrides_local() {
    let mut state = SelectionState::new(TargetId::new("42"));
    state.on_batch_update(BatchUpdate::new(images(4)).with_pending([]));
    let request = state.toggle(2).unwrap();

    let mirror = state.apply_persist_response(
        &request.selection,
        &SelectionUpdateResponse::sanitized(vec![1, 2]),
    );
    assert_eq!(mirror, Some(vec![1, 2]));
    assert_eq!(state.pending_sorted(), vec![1, 2]);
}

#[test]
fn smaller_batch_drops_stale_indices() {
    let mut state = SelectionState::new(TargetId::new("42"));
    state.on_batch_update(BatchUpdate::new(images(8)).with_active([6, 7]));
    state.toggle(5).unwrap();

    state.on_batch_update(BatchUpdate::new(images(3)).with_active([1, 6]).with_pending([2, 5]));
    assert_eq!(state.active().iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(state.pending_sorted(), vec![2]);
}
