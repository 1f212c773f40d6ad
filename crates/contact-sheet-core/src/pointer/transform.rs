//! Coordinate transform providers
//!
//! The host may report a pointer position in widget space, in canvas space,
//! or in the space of one of several drag surfaces (the node's own canvas,
//! a parent graph's canvas, the application canvas). Each drag surface is a
//! named provider that maps a raw position back into canvas space.

use crate::types::Point;
use std::fmt;
use std::sync::Arc;

/// Native inverse transform exposed by some drag surfaces
pub type InverseFn = Arc<dyn Fn(Point) -> Point + Send + Sync>;

/// Maps a raw host position into canvas space
pub trait TransformProvider: Send + Sync + fmt::Debug {
    /// Stable name used in candidate labels and logs
    fn label(&self) -> &str;

    /// Canvas-space position, or `None` when the transform is degenerate
    fn to_canvas(&self, raw: Point) -> Option<Point>;
}

/// Scale + offset drag surface
#[derive(Clone)]
pub struct DragSurface {
    label: String,
    scale: f64,
    offset: Point,
    view_offset: Point,
    extra_offset: Option<Point>,
    native_inverse: Option<InverseFn>,
}

impl DragSurface {
    /// Create a surface with a primary offset
    #[must_use]
    pub fn new(label: impl Into<String>, scale: f64, offset: Point) -> Self {
        Self {
            label: label.into(),
            scale,
            offset,
            view_offset: Point::ZERO,
            extra_offset: None,
            native_inverse: None,
        }
    }

    /// With view offset
    #[inline]
    #[must_use]
    pub fn with_view_offset(mut self, view_offset: Point) -> Self {
        self.view_offset = view_offset;
        self
    }

    /// With a third offset vector
    #[inline]
    #[must_use]
    pub fn with_extra_offset(mut self, extra: Point) -> Self {
        self.extra_offset = Some(extra);
        self
    }

    /// With the surface's own inverse routine
    #[inline]
    #[must_use]
    pub fn with_native_inverse(mut self, inverse: InverseFn) -> Self {
        self.native_inverse = Some(inverse);
        self
    }

    /// Scale factor
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sum of all offset vectors
    #[must_use]
    pub fn offset_total(&self) -> Point {
        self.offset + self.view_offset + self.extra_offset.unwrap_or(Point::ZERO)
    }

    /// A zero, negative or non-finite scale cannot be inverted
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !self.scale.is_finite() || self.scale <= f64::EPSILON
    }
}

impl fmt::Debug for DragSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSurface")
            .field("label", &self.label)
            .field("scale", &self.scale)
            .field("offset", &self.offset)
            .field("view_offset", &self.view_offset)
            .field("extra_offset", &self.extra_offset)
            .field("native_inverse", &self.native_inverse.is_some())
            .finish()
    }
}

impl TransformProvider for DragSurface {
    fn label(&self) -> &str {
        &self.label
    }

    fn to_canvas(&self, raw: Point) -> Option<Point> {
        if self.is_degenerate() {
            return None;
        }
        if let Some(inverse) = &self.native_inverse {
            return Some(inverse(raw));
        }
        let total = self.offset_total();
        Some(Point::new(
            (raw.x - total.x) / self.scale,
            (raw.y - total.y) / self.scale,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_inverse_sums_offsets() {
        let surface = DragSurface::new("canvas", 2.0, Point::new(10.0, 0.0))
            .with_view_offset(Point::new(0.0, 20.0))
            .with_extra_offset(Point::new(2.0, 2.0));
        assert_eq!(surface.offset_total(), Point::new(12.0, 22.0));
        assert_eq!(
            surface.to_canvas(Point::new(52.0, 62.0)),
            Some(Point::new(20.0, 20.0))
        );
    }

    #[test]
    fn native_inverse_takes_precedence() {
        let surface = DragSurface::new("canvas", 2.0, Point::ZERO)
            .with_native_inverse(Arc::new(|p| Point::new(p.x + 1.0, p.y + 1.0)));
        assert_eq!(
            surface.to_canvas(Point::new(1.0, 1.0)),
            Some(Point::new(2.0, 2.0))
        );
    }

    #[test]
    fn degenerate_scale_yields_nothing() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let surface = DragSurface::new("broken", scale, Point::ZERO);
            assert!(surface.is_degenerate());
            assert!(surface.to_canvas(Point::new(5.0, 5.0)).is_none());
        }
    }
}
