//! Draw-call emission for the contact sheet
//!
//! The host provides the drawing primitives; this module decides what to draw
//! from the selection state, the layout and whatever thumbnails have arrived.

use crate::error::ThumbnailError;
use crate::host::{Color, Painter};
use crate::layout::TileLayout;
use crate::selection::SelectionState;
use crate::types::{BatchGeneration, Point, Raster, Rect};

const BACKGROUND: Color = Color::rgb(0x22, 0x22, 0x22);
const PLACEHOLDER: Color = Color::rgb(0x3a, 0x3a, 0x3a);
const LABEL: Color = Color::rgb(0xcc, 0xcc, 0xcc);
const PENDING: Color = Color::rgb(0x4c, 0xaf, 0x50);
const ACTIVE: Color = Color::rgb(0x21, 0x96, 0xf3);
const HOVER: Color = Color::rgb(0xff, 0xff, 0xff);

/// Load status of a thumbnail set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailStatus {
    /// Nothing requested
    #[default]
    Idle,
    /// Loads in flight
    Loading,
    /// Loads finished, at least one succeeded
    Ready,
    /// Every load failed; the set was cleared
    Failed,
}

/// Decoded thumbnails for one batch generation
#[derive(Debug, Clone, Default)]
pub struct ThumbnailSet {
    generation: BatchGeneration,
    slots: Vec<Option<Raster>>,
    status: ThumbnailStatus,
}

impl ThumbnailSet {
    /// Start loading `len` thumbnails for `generation`
    #[must_use]
    pub fn loading(generation: BatchGeneration, len: usize) -> Self {
        Self {
            generation,
            slots: vec![None; len],
            status: ThumbnailStatus::Loading,
        }
    }

    /// Store load results
    ///
    /// Returns `false`, leaving the set untouched, when `generation` is not
    /// the one this set is waiting for. Failed images keep an empty slot;
    /// if every image failed the set is cleared.
    pub fn apply(
        &mut self,
        generation: BatchGeneration,
        results: Vec<Result<Raster, ThumbnailError>>,
    ) -> bool {
        if generation != self.generation || self.status != ThumbnailStatus::Loading {
            return false;
        }

        let total = results.len();
        let mut failed = 0;
        self.slots = results
            .into_iter()
            .map(|result| match result {
                Ok(raster) => Some(raster),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(generation = %generation, error = %e, "thumbnail unavailable");
                    None
                }
            })
            .collect();

        if total > 0 && failed == total {
            self.clear();
            self.status = ThumbnailStatus::Failed;
        } else {
            self.status = ThumbnailStatus::Ready;
        }
        true
    }

    /// Drop every bitmap
    pub fn clear(&mut self) {
        self.slots.clear();
        self.status = ThumbnailStatus::Idle;
    }

    /// Bitmap for `index`, if loaded
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Raster> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of loaded bitmaps
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Generation this set belongs to
    #[inline]
    #[must_use]
    pub fn generation(&self) -> BatchGeneration {
        self.generation
    }

    /// Load status
    #[inline]
    #[must_use]
    pub fn status(&self) -> ThumbnailStatus {
        self.status
    }
}

/// Draw the sheet with its top edge at `origin_y`
pub fn render(
    state: &SelectionState,
    layout: &TileLayout,
    thumbnails: &ThumbnailSet,
    hover: Option<usize>,
    origin_y: f64,
    painter: &mut dyn Painter,
) {
    let area = Rect::new(0.0, origin_y, layout.width(), layout.height());
    painter.fill_rect(area, BACKGROUND);

    let caption_at = Point::new(layout.origin().x, origin_y + layout.height() - 2.0);
    if layout.is_empty() {
        painter.text(caption_at, "no images", LABEL);
        return;
    }

    for tile in layout.tiles() {
        let rect = tile.rect.translate(0.0, origin_y);
        match thumbnails.get(tile.index) {
            Some(raster) => painter.blit(rect, raster),
            None => {
                painter.fill_rect(rect, PLACEHOLDER);
                let label = Point::new(rect.x + 4.0, rect.y + 14.0);
                painter.text(label, &tile.index.to_string(), LABEL);
            }
        }
        if state.active().contains(&tile.index) {
            painter.stroke_rect(rect.expand(1.0), ACTIVE, 1.0);
        }
        if state.pending().contains(&tile.index) {
            painter.stroke_rect(rect, PENDING, 3.0);
        }
        if hover == Some(tile.index) {
            painter.stroke_rect(rect, HOVER, 1.0);
        }
    }

    let caption = format!("{}/{} queued", state.pending().len(), state.len());
    painter.text(caption_at, &caption, LABEL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::types::{BatchUpdate, ImageRef, TargetId};

    #[derive(Default)]
    struct Recorder {
        fills: usize,
        strokes: Vec<Color>,
        texts: Vec<String>,
        blits: usize,
    }

    impl Painter for Recorder {
        fn fill_rect(&mut self, _rect: Rect, _color: Color) {
            self.fills += 1;
        }
        fn stroke_rect(&mut self, _rect: Rect, color: Color, _line_width: f64) {
            self.strokes.push(color);
        }
        fn text(&mut self, _at: Point, text: &str, _color: Color) {
            self.texts.push(text.to_string());
        }
        fn blit(&mut self, _rect: Rect, _raster: &Raster) {
            self.blits += 1;
        }
    }

    fn raster() -> Raster {
        Raster::new(1, 1, vec![0, 0, 0, 255])
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut set = ThumbnailSet::loading(BatchGeneration(2), 1);
        assert!(!set.apply(BatchGeneration(1), vec![Ok(raster())]));
        assert_eq!(set.loaded(), 0);
        assert!(set.apply(BatchGeneration(2), vec![Ok(raster())]));
        assert_eq!(set.loaded(), 1);
    }

    #[test]
    fn partial_failure_keeps_other_slots() {
        let mut set = ThumbnailSet::loading(BatchGeneration(1), 2);
        let err = ThumbnailError::Fetch {
            image: "b".into(),
            reason: "404".into(),
        };
        set.apply(BatchGeneration(1), vec![Ok(raster()), Err(err)]);
        assert_eq!(set.status(), ThumbnailStatus::Ready);
        assert!(set.get(0).is_some());
        assert!(set.get(1).is_none());
    }

    #[test]
    fn total_failure_clears() {
        let mut set = ThumbnailSet::loading(BatchGeneration(1), 1);
        let err = ThumbnailError::Decode {
            image: "a".into(),
            reason: "truncated".into(),
        };
        set.apply(BatchGeneration(1), vec![Err(err)]);
        assert_eq!(set.status(), ThumbnailStatus::Failed);
        assert_eq!(set.loaded(), 0);
    }

    #[test]
    fn renders_placeholders_and_selection() {
        let config = SheetConfig::new();
        let mut state = SelectionState::new(TargetId::new("1"));
        state.on_batch_update(
            BatchUpdate::new(vec![ImageRef::new("a"), ImageRef::new("b")])
                .with_active([0])
                .with_pending([1]),
        );
        let layout = TileLayout::compute(state.len(), 0, 200.0, &config);
        let mut thumbs = ThumbnailSet::loading(state.generation(), 2);
        thumbs.apply(state.generation(), vec![Ok(raster())]);

        let mut painter = Recorder::default();
        render(&state, &layout, &thumbs, Some(0), 0.0, &mut painter);

        assert_eq!(painter.blits, 1);
        // background + one placeholder
        assert_eq!(painter.fills, 2);
        assert_eq!(painter.strokes, vec![ACTIVE, HOVER, PENDING]);
        assert_eq!(painter.texts, vec!["1".to_string(), "1/2 queued".to_string()]);
    }

    #[test]
    fn empty_sheet_draws_caption_only() {
        let config = SheetConfig::new();
        let state = SelectionState::new(TargetId::new("1"));
        let layout = TileLayout::compute(0, 0, 200.0, &config);
        let mut painter = Recorder::default();
        render(&state, &layout, &ThumbnailSet::default(), None, 10.0, &mut painter);
        assert_eq!(painter.fills, 1);
        assert_eq!(painter.texts, vec!["no images".to_string()]);
    }
}
