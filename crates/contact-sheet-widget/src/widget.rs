//! Contact sheet widget
//!
//! Composes the selection state, layout and pointer resolver behind typed
//! callbacks the host adapter invokes:
//! - [`ContactSheetWidget::on_batch_update`] after every run
//! - [`ContactSheetWidget::on_pointer_event`] for presses and moves
//! - [`ContactSheetWidget::draw`] / [`ContactSheetWidget::compute_size`] from the redraw loop
//!
//! Thumbnail loads and persistence requests run as spawned tasks. Callbacks
//! return immediately with provisional state; completions re-check the batch
//! generation and the widget's liveness before touching anything.

use contact_sheet_core::{
    mirror_selection, render, BatchGeneration, BatchUpdate, HostContext, HostSignals,
    ImageLoader, Painter, PointerAction, PointerEvent, PointerOutcome, PointerResolver,
    PropertyStore, SelectionBackend, SelectionState, SheetConfig, SheetError, TargetId,
    ThumbnailSet, ThumbnailStatus, TileLayout,
};
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Handle to a spawned thumbnail load or persistence request
pub type TaskHandle = JoinHandle<Result<(), SheetError>>;

/// External collaborators of one widget
pub struct Collaborators {
    /// Thumbnail source
    pub loader: Arc<dyn ImageLoader>,
    /// Selection persistence
    pub backend: Arc<dyn SelectionBackend>,
    /// Redraw / resize requests
    pub signals: Arc<dyn HostSignals>,
    /// Node property bag for the mirrored selection
    pub store: Box<dyn PropertyStore>,
}

struct WidgetInner {
    state: SelectionState,
    layout: TileLayout,
    thumbnails: ThumbnailSet,
    resolver: PointerResolver,
    hover: Option<usize>,
    width: f64,
    store: Box<dyn PropertyStore>,
    alive: bool,
}

impl WidgetInner {
    fn relayout(&mut self, width: f64, config: &SheetConfig) {
        self.width = width;
        self.layout = TileLayout::compute(self.state.len(), self.state.columns(), width, config);
        self.resolver.set_size(self.layout.width(), self.layout.height());
    }
}

/// One contact sheet bound to one host node
pub struct ContactSheetWidget {
    target: TargetId,
    config: SheetConfig,
    inner: Arc<Mutex<WidgetInner>>,
    loader: Arc<dyn ImageLoader>,
    backend: Arc<dyn SelectionBackend>,
    signals: Arc<dyn HostSignals>,
    runtime: Handle,
}

impl std::fmt::Debug for ContactSheetWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactSheetWidget")
            .field("target", &self.target)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

impl ContactSheetWidget {
    /// Create a widget; async work is spawned on `runtime`
    ///
    /// # Errors
    /// `SheetError::Config` when the configuration is invalid
    pub fn new(
        target: TargetId,
        config: SheetConfig,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> Result<Self, SheetError> {
        config.validate()?;

        let Collaborators {
            loader,
            backend,
            signals,
            store,
        } = collaborators;

        let inner = WidgetInner {
            state: SelectionState::new(target.clone()),
            layout: TileLayout::empty(config.default_width, &config),
            thumbnails: ThumbnailSet::default(),
            resolver: PointerResolver::new(config.tolerance()),
            hover: None,
            width: config.default_width,
            store,
            alive: true,
        };

        tracing::debug!(target_id = %target, "contact sheet widget created");

        Ok(Self {
            target,
            config,
            inner: Arc::new(Mutex::new(inner)),
            loader,
            backend,
            signals,
            runtime,
        })
    }

    /// Apply the results of a finished run
    ///
    /// Replaces the batch and both selections, recomputes the layout and
    /// starts loading thumbnails. Returns the load task, or `None` for an
    /// empty batch (which clears all bitmaps).
    pub fn on_batch_update(&self, update: BatchUpdate) -> Option<TaskHandle> {
        let (generation, images, height) = {
            let mut inner = self.inner.lock();
            if !inner.alive {
                tracing::debug!(target_id = %self.target, "batch update after dispose ignored");
                return None;
            }
            let generation = inner.state.on_batch_update(update);
            let width = inner.width;
            inner.relayout(width, &self.config);
            inner.hover = None;

            let images = inner.state.images().to_vec();
            if images.is_empty() {
                inner.thumbnails.clear();
            } else {
                inner.thumbnails = ThumbnailSet::loading(generation, images.len());
            }
            (generation, images, inner.layout.height())
        };

        self.signals.request_resize(height);
        self.signals.mark_dirty();

        if images.is_empty() {
            return None;
        }

        let weak = Arc::downgrade(&self.inner);
        let loader = Arc::clone(&self.loader);
        let signals = Arc::clone(&self.signals);
        let target = self.target.clone();

        Some(self.runtime.spawn(async move {
            let results = join_all(images.iter().map(|image| loader.load(image))).await;
            apply_thumbnails(&weak, &target, generation, results, signals.as_ref())
        }))
    }

    /// Flip `index` in the pending selection and persist it
    ///
    /// The host mirror is written immediately; the request is sent in the
    /// background and its response reconciled when it arrives, unless a
    /// newer batch has replaced the one it was made against. Every call
    /// issues its own request.
    ///
    /// # Errors
    /// `SheetError::IndexOutOfRange` for an index outside the batch,
    /// `SheetError::Disposed` after [`dispose`](Self::dispose)
    pub fn toggle(&self, index: usize) -> Result<TaskHandle, SheetError> {
        let (request, generation) = {
            let mut inner = self.inner.lock();
            if !inner.alive {
                return Err(SheetError::Disposed);
            }
            let request = inner.state.toggle(index)?;
            mirror_selection(
                inner.store.as_mut(),
                &self.config.property_key,
                &request.selection,
            );
            (request, inner.state.generation())
        };
        self.signals.mark_dirty();

        let weak = Arc::downgrade(&self.inner);
        let backend = Arc::clone(&self.backend);
        let signals = Arc::clone(&self.signals);
        let key = self.config.property_key.clone();
        let target = self.target.clone();

        Ok(self.runtime.spawn(async move {
            let sent = request.selection.clone();
            let response = match backend.update_selection(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        target_id = %target,
                        selection = ?sent,
                        error = %e,
                        "selection persistence failed; keeping local selection"
                    );
                    return Err(SheetError::from(e));
                }
            };

            let Some(inner) = weak.upgrade() else {
                tracing::debug!(target_id = %target, "persistence response after drop discarded");
                return Err(SheetError::Disposed);
            };
            let mut inner = inner.lock();
            if !inner.alive {
                tracing::debug!(
                    target_id = %target,
                    "persistence response after dispose discarded"
                );
                return Err(SheetError::Disposed);
            }
            if inner.state.generation() != generation {
                tracing::debug!(
                    target_id = %target,
                    %generation,
                    current = %inner.state.generation(),
                    "persistence response for superseded batch discarded"
                );
                return Ok(());
            }
            if let Some(sanitized) = inner.state.apply_persist_response(&sent, &response) {
                mirror_selection(inner.store.as_mut(), &key, &sanitized);
                drop(inner);
                signals.mark_dirty();
            }
            Ok(())
        }))
    }

    /// Route a pointer event
    ///
    /// A handled outcome means the host should stop propagating the event.
    /// Toggle failures are logged; the event still counts as handled.
    pub fn on_pointer_event(&self, event: &PointerEvent, ctx: &HostContext) -> PointerOutcome {
        let (outcome, redraw) = {
            let mut inner = self.inner.lock();
            if !inner.alive {
                return PointerOutcome {
                    handled: false,
                    action: PointerAction::ClearHover,
                    resolved: None,
                };
            }
            inner.state.ensure_selection_visible();
            let outcome = inner.resolver.handle(event, ctx, &inner.layout);
            let hover = match outcome.action {
                PointerAction::Hover(index) => Some(index),
                PointerAction::Toggle(_) => inner.hover,
                PointerAction::ClearHover => None,
            };
            let redraw = hover != inner.hover;
            inner.hover = hover;
            (outcome, redraw)
        };

        if let PointerAction::Toggle(index) = outcome.action {
            if let Err(e) = self.toggle(index) {
                tracing::warn!(target_id = %self.target, index, error = %e, "toggle rejected");
            }
        } else if redraw {
            self.signals.mark_dirty();
        }
        outcome
    }

    /// Draw the sheet at `widget_y` inside the node, `width` wide
    ///
    /// A width change relayouts first and asks the host for the new height.
    pub fn draw(&self, painter: &mut dyn Painter, widget_y: f64, width: f64) {
        let resized = {
            let mut inner = self.inner.lock();
            if !inner.alive {
                return;
            }
            let resized = if (width - inner.width).abs() > f64::EPSILON {
                inner.relayout(width, &self.config);
                Some(inner.layout.height())
            } else {
                None
            };
            inner.resolver.set_render_origin(widget_y);
            inner.state.ensure_selection_visible();
            render(
                &inner.state,
                &inner.layout,
                &inner.thumbnails,
                inner.hover,
                widget_y,
                painter,
            );
            resized
        };
        if let Some(height) = resized {
            self.signals.request_resize(height);
        }
    }

    /// Size the widget wants at `width`
    pub fn compute_size(&self, width: f64) -> (f64, f64) {
        let mut inner = self.inner.lock();
        let stale = inner.layout.len() != inner.state.len();
        if (width - inner.width).abs() > f64::EPSILON || stale {
            inner.relayout(width, &self.config);
        }
        (inner.layout.width(), inner.layout.height())
    }

    /// Host changed the widget width; relayout and report the new height
    pub fn resize(&self, width: f64) {
        let height = {
            let mut inner = self.inner.lock();
            if !inner.alive {
                return;
            }
            inner.relayout(width, &self.config);
            inner.layout.height()
        };
        self.signals.request_resize(height);
        self.signals.mark_dirty();
    }

    /// Release local state; in-flight work is left to finish and is ignored
    pub fn dispose(&self) {
        let mut inner = self.inner.lock();
        inner.alive = false;
        inner.state.clear();
        inner.thumbnails.clear();
        inner.layout = TileLayout::empty(inner.width, &self.config);
        inner.hover = None;
        tracing::debug!(target_id = %self.target, "contact sheet widget disposed");
    }

    /// Target this widget edits
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetId {
        &self.target
    }

    /// Whether [`dispose`](Self::dispose) has not been called
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.lock().alive
    }

    /// Active selection
    #[must_use]
    pub fn active(&self) -> BTreeSet<usize> {
        self.inner.lock().state.active().clone()
    }

    /// Pending selection, sorted
    #[must_use]
    pub fn pending(&self) -> Vec<usize> {
        self.inner.lock().state.pending_sorted()
    }

    /// Hovered tile
    #[must_use]
    pub fn hover(&self) -> Option<usize> {
        self.inner.lock().hover
    }

    /// Current batch generation
    #[must_use]
    pub fn generation(&self) -> BatchGeneration {
        self.inner.lock().state.generation()
    }

    /// Thumbnail load status
    #[must_use]
    pub fn thumbnail_status(&self) -> ThumbnailStatus {
        self.inner.lock().thumbnails.status()
    }

    /// Number of thumbnails available for drawing
    #[must_use]
    pub fn loaded_thumbnails(&self) -> usize {
        self.inner.lock().thumbnails.loaded()
    }

    /// Current layout
    #[must_use]
    pub fn layout(&self) -> TileLayout {
        self.inner.lock().layout.clone()
    }
}

fn apply_thumbnails(
    weak: &Weak<Mutex<WidgetInner>>,
    target: &TargetId,
    generation: BatchGeneration,
    results: Vec<Result<contact_sheet_core::Raster, contact_sheet_core::ThumbnailError>>,
    signals: &dyn HostSignals,
) -> Result<(), SheetError> {
    let Some(inner) = weak.upgrade() else {
        tracing::debug!(target_id = %target, %generation, "thumbnails after drop discarded");
        return Err(SheetError::Disposed);
    };
    let mut inner = inner.lock();
    if !inner.alive {
        tracing::debug!(target_id = %target, %generation, "thumbnails after dispose discarded");
        return Err(SheetError::Disposed);
    }
    if !inner.thumbnails.apply(generation, results) {
        tracing::debug!(
            target_id = %target,
            %generation,
            current = %inner.state.generation(),
            "stale thumbnails discarded"
        );
        return Ok(());
    }
    tracing::debug!(
        target_id = %target,
        %generation,
        loaded = inner.thumbnails.loaded(),
        "thumbnails ready"
    );
    drop(inner);
    signals.mark_dirty();
    Ok(())
}
