//! Core types for scrollstage.
//!
//! These types define the foundation that everything builds on.
//! They flow through the event hub and the animation controllers.

// =============================================================================
// Cleanup
// =============================================================================

/// A teardown closure returned by registration functions.
///
/// Call it to remove the listener/observer it belongs to. Safe to call
/// exactly once; registration sites that hand these out never require
/// the caller to invoke them in any particular order.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned rectangle in CSS pixels, viewport-relative.
///
/// `top`/`left` may be negative (content scrolled past the viewport edge).
/// Geometry is always queried live from the owning host - never cached -
/// so a `Rect` is a snapshot, not an identity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The empty rect at the origin.
    pub const ZERO: Self = Self {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Right edge (left + width).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (top + height).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical center.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if the rect has zero (or degenerate) area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Move the rect by a delta without changing its size.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Grow each edge outward by the given amount.
    ///
    /// Negative values shrink the rect; width/height are clamped at zero
    /// so a fully collapsed rect never reports a negative extent.
    pub fn expand(&self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            left: self.left - left,
            top: self.top - top,
            width: (self.width + left + right).max(0.0),
            height: (self.height + top + bottom).max(0.0),
        }
    }

    /// Compute the intersection of two rects.
    ///
    /// Returns `None` when they do not overlap. Edge-touching rects
    /// (zero-area overlap) also return `None`.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.left.max(other.left);
        let y1 = self.top.max(other.top);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Some(Rect {
                left: x1,
                top: y1,
                width: x2 - x1,
                height: y2 - y1,
            })
        } else {
            None
        }
    }

    /// Check if a point lies inside the rect (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

// =============================================================================
// Scroll events
// =============================================================================

/// Where a scroll event originated.
///
/// `Native` is the host's own scrolling surface; `Virtual` is the
/// inertial scroll engine re-emitting smoothed positions. Consumers
/// almost never branch on this - the whole point of the bridge is that
/// both arrive on the same stream - but diagnostics and tests do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSource {
    Native,
    Virtual,
}

/// A single scroll notification: the current offset plus its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Vertical scroll offset in CSS pixels.
    pub offset: f64,
    /// Which scrolling surface produced the event.
    pub source: ScrollSource,
}

impl ScrollEvent {
    /// Create a new scroll event.
    pub const fn new(offset: f64, source: ScrollSource) -> Self {
        Self { offset, source }
    }

    /// Shorthand for a native-source event.
    pub const fn native(offset: f64) -> Self {
        Self::new(offset, ScrollSource::Native)
    }
}

// =============================================================================
// Tests
// =============================================================================
