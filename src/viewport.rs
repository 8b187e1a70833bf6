//! Viewport State - host-reported viewport dimensions
//!
//! The host pushes the viewport size in via [`set_viewport_size`]; everything
//! else reads it through signals or the plain getters. Setting an unchanged
//! size is a no-op, so resize handlers only fire on real changes.

use spark_signals::{signal, Signal};

use crate::events;
use crate::types::Rect;

thread_local! {
    static WIDTH: Signal<f64> = signal(0.0);
    static HEIGHT: Signal<f64> = signal(0.0);
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Update the viewport dimensions.
///
/// Dispatches a resize notification through the event hub when either
/// dimension actually changed.
pub fn set_viewport_size(width: f64, height: f64) {
    let changed = WIDTH.with(|w| {
        HEIGHT.with(|h| {
            let changed = w.get() != width || h.get() != height;
            if changed {
                w.set(width);
                h.set(height);
            }
            changed
        })
    });

    if changed {
        events::dispatch_resize();
    }
}

/// Current viewport width.
pub fn viewport_width() -> f64 {
    WIDTH.with(|w| w.get())
}

/// Current viewport height.
pub fn viewport_height() -> f64 {
    HEIGHT.with(|h| h.get())
}

/// Signal tracking the viewport width.
pub fn width_signal() -> Signal<f64> {
    WIDTH.with(|w| w.clone())
}

/// Signal tracking the viewport height.
pub fn height_signal() -> Signal<f64> {
    HEIGHT.with(|h| h.clone())
}

/// The viewport as a rectangle anchored at the origin.
pub fn viewport_rect() -> Rect {
    Rect::new(0.0, 0.0, viewport_width(), viewport_height())
}

/// Reset the viewport to zero size without dispatching (for testing).
pub fn reset_viewport_state() {
    WIDTH.with(|w| w.set(0.0));
    HEIGHT.with(|h| h.set(0.0));
}

// =============================================================================
// TESTS
// =============================================================================
