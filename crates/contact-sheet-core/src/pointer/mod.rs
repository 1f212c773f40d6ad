//! Pointer resolution
//!
//! Turns a raw host pointer event into a tile index without knowing which
//! coordinate space the host used.
//!
//! # Algorithm
//! 1. Build candidates in a fixed order: the raw position as-is, the raw
//!    position minus the node origin, then one per drag surface (canvas space
//!    minus the node origin). Surfaces with a degenerate scale produce no
//!    candidate at all.
//! 2. Judge each candidate against the plausibility envelope: the tile
//!    bounding box grown by the layout tolerance, or the cached widget size
//!    when there are no tiles.
//! 3. Take the first plausible candidate, else the first finite one, else a
//!    synthesized baseline.
//! 4. Hit-test the chosen position against the tiles in index order.
//! 5. A press on a tile toggles it; a move on a tile hovers it; anything
//!    else clears hover and is left to the host.

mod transform;

pub use transform::{DragSurface, InverseFn, TransformProvider};

use crate::layout::TileLayout;
use crate::types::{Point, Rect};
use std::sync::Arc;

/// Pointer event discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Button pressed
    Press,
    /// Pointer moved
    Move,
}

/// Raw pointer event as supplied by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Event kind
    pub kind: PointerKind,
    /// Position in an unknown coordinate space
    pub position: Point,
}

impl PointerEvent {
    /// Press at `(x, y)`
    #[inline]
    #[must_use]
    pub fn press(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Press,
            position: Point::new(x, y),
        }
    }

    /// Move to `(x, y)`
    #[inline]
    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Move,
            position: Point::new(x, y),
        }
    }
}

/// Host state accompanying a pointer event
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    /// Node origin in canvas space
    pub node_origin: Point,
    /// Node size, used when no widget width is cached yet
    pub node_size: Point,
    /// Drag surfaces in priority order (own, parent, application)
    pub surfaces: Vec<Arc<dyn TransformProvider>>,
}

impl HostContext {
    /// Context for a node at `origin`
    #[must_use]
    pub fn new(node_origin: Point, node_size: Point) -> Self {
        Self {
            node_origin,
            node_size,
            surfaces: Vec::new(),
        }
    }

    /// Append a drag surface; order is priority
    #[must_use]
    pub fn with_surface(mut self, surface: Arc<dyn TransformProvider>) -> Self {
        self.surfaces.push(surface);
        self
    }
}

/// Which transform produced a candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Raw position taken as widget-local
    Local,
    /// Raw position minus node origin
    NodeRelative,
    /// Drag surface inverse, then minus node origin
    Surface(String),
    /// Synthesized when nothing else was usable
    Baseline,
}

impl CandidateSource {
    /// Label used in logs
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::NodeRelative => "node-relative",
            Self::Surface(label) => label,
            Self::Baseline => "baseline",
        }
    }
}

/// One candidate interpretation of a pointer position
#[derive(Debug, Clone, PartialEq)]
pub struct PointerCandidate {
    /// Producing transform
    pub source: CandidateSource,
    /// Widget-local position (y relative to the node)
    pub local: Point,
    /// `local.y - last_widget_y`
    pub relative_y: f64,
    /// Local x inside the envelope
    pub within_x: bool,
    /// Relative y inside the envelope
    pub within_y: bool,
}

impl PointerCandidate {
    /// Inside the envelope on both axes
    #[inline]
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.within_x && self.within_y
    }

    /// Neither coordinate is NaN or infinite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.local.x.is_finite() && self.relative_y.is_finite()
    }
}

/// How confidently a position was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A candidate fell inside the envelope
    Plausible,
    /// No candidate was plausible; first finite one used
    Fallback,
    /// Nothing usable; zero coordinate synthesized
    Baseline,
}

/// Chosen widget-local position
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPointer {
    /// Producing transform
    pub source: CandidateSource,
    /// Widget-local x
    pub x: f64,
    /// Y relative to the widget's render origin
    pub relative_y: f64,
    /// Confidence
    pub resolution: Resolution,
}

/// Effect a pointer event should have on the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Toggle pending membership of the tile
    Toggle(usize),
    /// Highlight the tile
    Hover(usize),
    /// Remove any highlight
    ClearHover,
}

/// Result of handling one pointer event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerOutcome {
    /// Event consumed; the host should stop propagating it
    pub handled: bool,
    /// Effect on the sheet
    pub action: PointerAction,
    /// Chosen position, absent when short-circuited
    pub resolved: Option<ResolvedPointer>,
}

impl PointerOutcome {
    fn unhandled(resolved: Option<ResolvedPointer>) -> Self {
        Self {
            handled: false,
            action: PointerAction::ClearHover,
            resolved,
        }
    }
}

/// Resolves pointer events for one widget
///
/// Holds the widget's last render origin and cached size, both refreshed by
/// the widget on every draw.
#[derive(Debug, Clone, Default)]
pub struct PointerResolver {
    last_widget_y: f64,
    cached_width: f64,
    cached_height: f64,
    tolerance: f64,
}

impl PointerResolver {
    /// Create a resolver with the given envelope margin
    #[inline]
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Record where the widget was last drawn inside the node
    #[inline]
    pub fn set_render_origin(&mut self, widget_y: f64) {
        self.last_widget_y = widget_y;
    }

    /// Record the widget's last drawn size
    #[inline]
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.cached_width = width;
        self.cached_height = height;
    }

    /// Last render origin
    #[inline]
    #[must_use]
    pub fn last_widget_y(&self) -> f64 {
        self.last_widget_y
    }

    /// Envelope used to judge candidates
    #[must_use]
    pub fn envelope(&self, layout: &TileLayout, ctx: &HostContext) -> Rect {
        if let Some(bounds) = layout.bounds() {
            return bounds.expand(layout.tolerance());
        }
        let width = if self.cached_width > 0.0 {
            self.cached_width
        } else {
            ctx.node_size.x.max(0.0)
        };
        Rect::new(0.0, 0.0, width, self.cached_height.max(0.0)).expand(self.tolerance)
    }

    /// All candidate interpretations, in priority order
    #[must_use]
    pub fn candidates(
        &self,
        raw: Point,
        ctx: &HostContext,
        envelope: &Rect,
    ) -> Vec<PointerCandidate> {
        let mut out = Vec::with_capacity(2 + ctx.surfaces.len());
        out.push(self.candidate(CandidateSource::Local, raw, envelope));
        out.push(self.candidate(
            CandidateSource::NodeRelative,
            raw - ctx.node_origin,
            envelope,
        ));
        for surface in &ctx.surfaces {
            match surface.to_canvas(raw) {
                Some(canvas) => out.push(self.candidate(
                    CandidateSource::Surface(surface.label().to_string()),
                    canvas - ctx.node_origin,
                    envelope,
                )),
                None => tracing::trace!(surface = surface.label(), "skipping degenerate surface"),
            }
        }
        out
    }

    fn candidate(
        &self,
        source: CandidateSource,
        local: Point,
        envelope: &Rect,
    ) -> PointerCandidate {
        let relative_y = local.y - self.last_widget_y;
        PointerCandidate {
            source,
            local,
            relative_y,
            within_x: envelope.contains_x(local.x),
            within_y: envelope.contains_y(relative_y),
        }
    }

    /// Pick one candidate; never fails
    #[must_use]
    pub fn choose(&self, candidates: &[PointerCandidate]) -> ResolvedPointer {
        if let Some(c) = candidates.iter().find(|c| c.is_plausible()) {
            return resolved(c, Resolution::Plausible);
        }
        if let Some(c) = candidates.iter().find(|c| c.is_finite()) {
            tracing::debug!(
                candidate = c.source.label(),
                tried = candidates.len(),
                "no plausible pointer transform; using first finite"
            );
            return resolved(c, Resolution::Fallback);
        }
        tracing::debug!(tried = candidates.len(), "no finite pointer transform; using baseline");
        ResolvedPointer {
            source: CandidateSource::Baseline,
            x: 0.0,
            relative_y: 0.0,
            resolution: Resolution::Baseline,
        }
    }

    /// Choose a widget-local position for `event`
    #[must_use]
    pub fn resolve(
        &self,
        event: &PointerEvent,
        ctx: &HostContext,
        layout: &TileLayout,
    ) -> ResolvedPointer {
        let envelope = self.envelope(layout, ctx);
        let candidates = self.candidates(event.position, ctx, &envelope);
        self.choose(&candidates)
    }

    /// Resolve, hit-test and decide the effect of `event`
    #[must_use]
    pub fn handle(
        &self,
        event: &PointerEvent,
        ctx: &HostContext,
        layout: &TileLayout,
    ) -> PointerOutcome {
        if layout.is_empty() {
            return PointerOutcome::unhandled(None);
        }

        let resolved = self.resolve(event, ctx, layout);
        let Some(index) = layout.hit_test(resolved.x, resolved.relative_y) else {
            return PointerOutcome::unhandled(Some(resolved));
        };

        tracing::trace!(
            index,
            candidate = resolved.source.label(),
            kind = ?event.kind,
            "pointer hit"
        );

        let action = match event.kind {
            PointerKind::Press => PointerAction::Toggle(index),
            PointerKind::Move => PointerAction::Hover(index),
        };
        PointerOutcome {
            handled: true,
            action,
            resolved: Some(resolved),
        }
    }
}

fn resolved(candidate: &PointerCandidate, resolution: Resolution) -> ResolvedPointer {
    ResolvedPointer {
        source: candidate.source.clone(),
        x: candidate.local.x,
        relative_y: candidate.relative_y,
        resolution,
    }
}
