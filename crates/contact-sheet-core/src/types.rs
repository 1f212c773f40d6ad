//! Core types for contact sheets
//!
//! Defines the fundamental values shared by every layer:
//! - Target and image identities
//! - Batch generations for discarding stale completions
//! - Widget-local geometry (points and rectangles)
//! - Wire payloads exchanged with the backend

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity of one editable contact sheet (one host node)
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    /// Create a target id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque image reference (URI or data URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    /// Create an image reference
    #[inline]
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Borrow the underlying URI
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Monotonic tag of one batch update
///
/// Every asynchronous completion carries the generation it was started for,
/// and is dropped if the sheet has moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BatchGeneration(pub u64);

impl BatchGeneration {
    /// The generation after this one
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for BatchGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle in widget-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a rectangle
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment on both axes
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_x(x) && self.contains_y(y)
    }

    /// Inclusive containment on the horizontal axis
    #[inline]
    #[must_use]
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x <= self.right()
    }

    /// Inclusive containment on the vertical axis
    #[inline]
    #[must_use]
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.y && y <= self.bottom()
    }

    /// Grow by `margin` on every side
    #[inline]
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Smallest rectangle covering both
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Interiors intersect (shared edges do not count)
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Move by `(dx, dy)`
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Decoded raster handle produced by the image loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Pixel data, layout owned by the loader
    pub pixels: Arc<[u8]>,
}

impl Raster {
    /// Create a raster
    #[inline]
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }
}

/// Batch update delivered to the sheet after a pipeline run
///
/// Field names follow the UI payload the backend emits, so the struct can be
/// deserialized straight from it. Indices are signed on the wire; anything
/// outside the batch is dropped on arrival.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchUpdate {
    /// Ordered image references
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// Selection forwarded by the run that just finished
    #[serde(default)]
    pub selected_active: Vec<i64>,
    /// Selection queued for the next run, if the backend has one
    #[serde(default)]
    pub selected_next: Option<Vec<i64>>,
    /// Configured columns (0 = auto)
    #[serde(default)]
    pub columns: u32,
    /// Batch size reported by the backend, informational
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl BatchUpdate {
    /// Create an update for the given images with no prior selection
    #[must_use]
    pub fn new(images: impl IntoIterator<Item = ImageRef>) -> Self {
        Self {
            images: images.into_iter().collect(),
            ..Self::default()
        }
    }

    /// With active selection
    #[must_use]
    pub fn with_active(mut self, active: impl IntoIterator<Item = i64>) -> Self {
        self.selected_active = active.into_iter().collect();
        self
    }

    /// With pending selection
    #[must_use]
    pub fn with_pending(mut self, pending: impl IntoIterator<Item = i64>) -> Self {
        self.selected_next = Some(pending.into_iter().collect());
        self
    }

    /// With configured columns
    #[must_use]
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns;
        self
    }
}

/// Body of a selection-update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionUpdateRequest {
    /// Target the selection belongs to
    pub node_id: String,
    /// Sorted pending indices
    pub selection: Vec<usize>,
}

/// Body of a selection-update response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionUpdateResponse {
    /// Sanitized selection, authoritative when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Vec<usize>>,
}

impl SelectionUpdateResponse {
    /// Response carrying a sanitized selection
    #[inline]
    #[must_use]
    pub fn sanitized(selection: Vec<usize>) -> Self {
        Self {
            selection: Some(selection),
        }
    }
}
