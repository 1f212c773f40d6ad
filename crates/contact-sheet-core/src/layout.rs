//! Tile layout for the contact sheet grid
//!
//! Square tiles, row-major, in widget-local coordinates with `y = 0` at the
//! top of the widget. Recomputed on every resize or batch change.

use crate::config::SheetConfig;
use crate::types::{Point, Rect};

/// Smallest tile edge the layout will produce
const MIN_TILE: f64 = 1.0;

/// One positioned tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Image index
    pub index: usize,
    /// Tile rectangle
    pub rect: Rect,
}

/// Number of grid columns for `n` images
///
/// `configured` of 0 means auto (`ceil(sqrt(n))`). The result is clamped to
/// `[1, n]`, and to `max_columns` when configured explicitly.
#[must_use]
pub fn column_count(n: usize, configured: u32, max_columns: u32) -> usize {
    if n == 0 {
        return 1;
    }
    let wanted = if configured > 0 {
        configured.min(max_columns.max(1)) as usize
    } else {
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let auto = (n as f64).sqrt().ceil() as usize;
        auto
    };
    wanted.clamp(1, n)
}

/// Computed grid
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayout {
    tiles: Vec<Tile>,
    columns: usize,
    rows: usize,
    origin: Point,
    width: f64,
    height: f64,
    tolerance: f64,
}

impl TileLayout {
    /// Layout with no tiles
    #[must_use]
    pub fn empty(width: f64, config: &SheetConfig) -> Self {
        Self {
            tiles: Vec::new(),
            columns: 0,
            rows: 0,
            origin: Point::new(config.padding, config.padding),
            width: effective_width(width, config),
            height: config.min_height,
            tolerance: config.tolerance(),
        }
    }

    /// Lay out `n` tiles across `width`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(n: usize, configured_columns: u32, width: f64, config: &SheetConfig) -> Self {
        if n == 0 {
            return Self::empty(width, config);
        }

        let width = effective_width(width, config);
        let columns = column_count(n, configured_columns, config.max_columns);
        let rows = n.div_ceil(columns);
        let cols_f = columns as f64;
        let inner = width - 2.0 * config.padding - (cols_f - 1.0) * config.gap;
        let edge = (inner / cols_f).max(MIN_TILE);
        let step = edge + config.gap;

        let tiles = (0..n)
            .map(|index| {
                let row = (index / columns) as f64;
                let col = (index % columns) as f64;
                Tile {
                    index,
                    rect: Rect::new(
                        config.padding + col * step,
                        config.padding + row * step,
                        edge,
                        edge,
                    ),
                }
            })
            .collect();

        let rows_f = rows as f64;
        let grid_height = rows_f * edge + (rows_f - 1.0) * config.gap;
        let height = (2.0 * config.padding + grid_height).max(config.min_height);

        Self {
            tiles,
            columns,
            rows,
            origin: Point::new(config.padding, config.padding),
            width,
            height,
            tolerance: config.tolerance(),
        }
    }

    /// Tiles in index order
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether there are no tiles
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Column count (0 when empty)
    #[inline]
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Row count (0 when empty)
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Top-left corner of the grid area
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Width the layout was computed for
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height the widget should report to the host
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Envelope margin around the tiles
    #[inline]
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Bounding box of all tiles
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let mut tiles = self.tiles.iter();
        let first = tiles.next()?.rect;
        Some(tiles.fold(first, |acc, tile| acc.union(&tile.rect)))
    }

    /// Tile rectangle by index
    #[inline]
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// First tile containing `(x, y)`, edges inclusive
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        self.tiles
            .iter()
            .find(|tile| tile.rect.contains(x, y))
            .map(|tile| tile.index)
    }
}

fn effective_width(width: f64, config: &SheetConfig) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        config.default_width
    }
}
