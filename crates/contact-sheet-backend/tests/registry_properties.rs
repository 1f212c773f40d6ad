use contact_sheet_backend::{sanitize_selection, SelectionRegistry};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_resolved_selection_is_in_range_and_non_empty(
        batch_size in 1usize..32,
        queued in prop::option::of(prop::collection::vec(-8i64..64, 0..16)),
    ) {
        let registry = SelectionRegistry::new();
        registry.resolve_selection_for_execution("n", batch_size);
        if let Some(selection) = &queued {
            registry.queue_pending_selection("n", selection);
        }

        let (output, next) = registry.resolve_selection_for_execution("n", batch_size);
        prop_assert!(!output.is_empty());
        prop_assert!(output.iter().all(|&i| i < batch_size));
        prop_assert!(output.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(&output, &next);
        prop_assert_eq!(registry.inspect_state("n").unwrap().pending, None);
    }

    #[test]
    fn prop_sanitize_is_idempotent(
        selection in prop::collection::vec(-8i64..64, 0..16),
        batch_size in 0usize..40,
    ) {
        let once = sanitize_selection(&selection, batch_size);
        let widened: Vec<i64> = once.iter().map(|&i| i as i64).collect();
        prop_assert_eq!(sanitize_selection(&widened, batch_size), once);
    }
}
