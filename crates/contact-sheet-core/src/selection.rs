//! Two-phase selection state for one contact sheet
//!
//! A sheet tracks two index sets over the current batch:
//! - `active`: what the last completed run forwarded
//! - `pending`: what the next run will forward, edited by the operator
//!
//! Both sets only ever hold indices below the batch length. A batch update
//! replaces everything; toggles only touch `pending`.

use crate::error::SheetError;
use crate::types::{
    BatchGeneration, BatchUpdate, ImageRef, SelectionUpdateRequest, SelectionUpdateResponse,
    TargetId,
};
use std::collections::BTreeSet;

/// Macro-state of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetPhase {
    /// No non-empty batch has arrived yet
    #[default]
    Empty,
    /// At least one non-empty batch has been shown
    Loaded,
}

/// Keep only indices in `[0, len)`, deduplicated and ordered
#[must_use]
pub fn sanitize<I>(indices: I, len: usize) -> BTreeSet<usize>
where
    I: IntoIterator,
    I::Item: TryInto<usize>,
{
    indices
        .into_iter()
        .filter_map(|idx| TryInto::<usize>::try_into(idx).ok())
        .filter(|&idx| idx < len)
        .collect()
}

/// Selection state of one target
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    target: TargetId,
    images: Vec<ImageRef>,
    active: BTreeSet<usize>,
    pending: BTreeSet<usize>,
    columns: u32,
    generation: BatchGeneration,
    phase: SheetPhase,
}

impl SelectionState {
    /// Create an empty state for a target
    #[inline]
    #[must_use]
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Replace the batch and both selections
    ///
    /// `pending` comes from the backend's value when it sent one, otherwise it
    /// starts as a copy of `active`. Returns the new batch generation.
    pub fn on_batch_update(&mut self, update: BatchUpdate) -> BatchGeneration {
        let BatchUpdate {
            images,
            selected_active,
            selected_next,
            columns,
            ..
        } = update;

        let len = images.len();
        self.active = sanitize(selected_active, len);
        self.pending = match selected_next {
            Some(next) => sanitize(next, len),
            None => self.active.clone(),
        };
        self.images = images;
        self.columns = columns;
        self.generation = self.generation.next();
        if len > 0 {
            self.phase = SheetPhase::Loaded;
        }

        tracing::debug!(
            target_id = %self.target,
            generation = %self.generation,
            images = len,
            active = ?self.active,
            pending = ?self.pending,
            "batch update applied"
        );

        self.generation
    }

    /// Flip membership of `index` in `pending`
    ///
    /// Returns the persistence request for the new pending set. Every toggle
    /// produces a request of its own; nothing is queued behind an in-flight one.
    ///
    /// # Errors
    /// `SheetError::IndexOutOfRange` when `index` does not address the batch;
    /// state is left untouched.
    pub fn toggle(&mut self, index: usize) -> Result<SelectionUpdateRequest, SheetError> {
        let len = self.images.len();
        if index >= len {
            return Err(SheetError::IndexOutOfRange { index, len });
        }

        if !self.pending.remove(&index) {
            self.pending.insert(index);
        }

        tracing::debug!(target_id = %self.target, index, pending = ?self.pending, "toggled");
        Ok(self.persist_request())
    }

    /// Request body describing the current pending set
    #[must_use]
    pub fn persist_request(&self) -> SelectionUpdateRequest {
        SelectionUpdateRequest {
            node_id: self.target.0.clone(),
            selection: self.pending_sorted(),
        }
    }

    /// Reconcile with the backend's answer to a persistence request
    ///
    /// When the backend returns a selection that differs from `sent`, it
    /// replaces `pending` (still clipped to the batch) and the new sorted
    /// array is returned so the caller can refresh the host mirror.
    /// Responses are applied in arrival order.
    pub fn apply_persist_response(
        &mut self,
        sent: &[usize],
        response: &SelectionUpdateResponse,
    ) -> Option<Vec<usize>> {
        let authoritative = response.selection.as_ref()?;
        if authoritative.as_slice() == sent {
            return None;
        }

        self.pending = sanitize(authoritative.iter().copied(), self.images.len());
        tracing::info!(
            target_id = %self.target,
            sent = ?sent,
            sanitized = ?authoritative,
            "backend overrode pending selection"
        );
        Some(self.pending_sorted())
    }

    /// Re-clip both sets to the current batch; idempotent
    pub fn ensure_selection_visible(&mut self) {
        let len = self.images.len();
        self.active.retain(|&idx| idx < len);
        self.pending.retain(|&idx| idx < len);
    }

    /// Drop the batch and both sets (widget disposal)
    pub fn clear(&mut self) {
        self.images.clear();
        self.active.clear();
        self.pending.clear();
    }

    /// Target identity
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    /// Current images
    #[inline]
    #[must_use]
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Batch length
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the batch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Active selection
    #[inline]
    #[must_use]
    pub fn active(&self) -> &BTreeSet<usize> {
        &self.active
    }

    /// Pending selection
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &BTreeSet<usize> {
        &self.pending
    }

    /// Pending selection as a sorted array
    #[inline]
    #[must_use]
    pub fn pending_sorted(&self) -> Vec<usize> {
        self.pending.iter().copied().collect()
    }

    /// Configured columns of the current batch (0 = auto)
    #[inline]
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Generation of the current batch
    #[inline]
    #[must_use]
    pub fn generation(&self) -> BatchGeneration {
        self.generation
    }

    /// Macro-state
    #[inline]
    #[must_use]
    pub fn phase(&self) -> SheetPhase {
        self.phase
    }
}
