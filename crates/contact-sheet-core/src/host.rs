//! Host-facing collaborator traits
//!
//! The host owns the canvas, the node's property bag and the redraw loop.
//! The sheet talks to it only through these seams.

use crate::error::HostError;
use crate::types::{Point, Raster, Rect};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    /// Opaque color from RGB
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 255)
    }
}

/// Draw call sink
pub trait Painter {
    /// Filled rectangle
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Rectangle outline
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);
    /// Text anchored at its baseline start
    fn text(&mut self, at: Point, text: &str, color: Color);
    /// Image scaled into `rect`
    fn blit(&mut self, rect: Rect, raster: &Raster);
}

/// Redraw and resize requests
pub trait HostSignals: Send + Sync {
    /// Ask the host to redraw the node
    fn mark_dirty(&self);
    /// Report the height the widget wants for its current width
    fn request_resize(&self, height: f64);
}

/// Per-node key/value bag the host persists with its graph
///
/// Mutations are bracketed by change hooks so the host can record undo
/// state. Hooks may fail; the mutation happens regardless.
pub trait PropertyStore: Send {
    /// Called before a property changes
    ///
    /// # Errors
    /// Host-specific; logged by the caller, never propagated
    fn before_change(&mut self, key: &str) -> Result<(), HostError>;

    /// Write the selection array
    fn set_selection(&mut self, key: &str, selection: &[usize]);

    /// Read back the selection array
    fn selection(&self, key: &str) -> Option<Vec<usize>>;

    /// Called after a property changed
    ///
    /// # Errors
    /// Host-specific; logged by the caller, never propagated
    fn after_change(&mut self, key: &str) -> Result<(), HostError>;
}

/// Write `selection` under `key`, bracketed by both hooks
///
/// Both hooks always run, in order, even when the first one fails.
pub fn mirror_selection(store: &mut dyn PropertyStore, key: &str, selection: &[usize]) {
    if let Err(e) = store.before_change(key) {
        tracing::warn!(key, error = %e, "before-change hook failed");
    }
    store.set_selection(key, selection);
    if let Err(e) = store.after_change(key) {
        tracing::warn!(key, error = %e, "after-change hook failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{mock, Sequence};

    mock! {
        Store {}

        impl PropertyStore for Store {
            fn before_change(&mut self, key: &str) -> Result<(), HostError>;
            fn set_selection(&mut self, key: &str, selection: &[usize]);
            fn selection(&self, key: &str) -> Option<Vec<usize>>;
            fn after_change(&mut self, key: &str) -> Result<(), HostError>;
        }
    }

    #[test]
    fn hooks_bracket_the_write() {
        let mut seq = Sequence::new();
        let mut store = MockStore::new();
        store
            .expect_before_change()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_set_selection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|key, sel| {
                assert_eq!(key, "sel");
                assert_eq!(sel, [1, 2]);
            });
        store
            .expect_after_change()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        mirror_selection(&mut store, "sel", &[1, 2]);
    }

    #[test]
    fn failing_hook_does_not_skip_the_rest() {
        let mut store = MockStore::new();
        store.expect_before_change().times(1).returning(|_| {
            Err(HostError::HookFailed {
                hook: "before",
                reason: "graph locked".into(),
            })
        });
        store.expect_set_selection().times(1).return_const(());
        store.expect_after_change().times(1).returning(|_| {
            Err(HostError::HookFailed {
                hook: "after",
                reason: "graph locked".into(),
            })
        });

        mirror_selection(&mut store, "sel", &[]);
    }
}
