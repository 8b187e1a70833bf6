//! Carousel Controller - stepped horizontal scrolling
//!
//! Drives a card rail that moves one card per button press. The step is
//! the card width plus the gap between cards, so each press lands the
//! rail on a card boundary. Edge state (whether each arrow is enabled)
//! derives from the rail's scrollable extent and recomputes on movement
//! and on viewport resize; the right edge uses a small epsilon so
//! subpixel layout never strands an enabled arrow at the end of the rail.
//!
//! Presses glide rather than jump: a press starts a short eased tween
//! that the host advances with [`Carousel::step`] once per frame.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use spark_signals::{signal, Signal};

use crate::events;
use crate::frame;
use crate::motion::easing::Easing;
use crate::types::Cleanup;

/// Card width, in pixels.
pub const CARD_WIDTH: f64 = 336.0;
/// Gap between cards, in pixels.
pub const CARD_GAP: f64 = 20.0;
/// Distance one press moves the rail.
pub const SCROLL_STEP: f64 = CARD_WIDTH + CARD_GAP;

/// Slack on the right-edge comparison, in pixels.
const EDGE_EPSILON: f64 = 1.0;
/// Glide length for one press, in seconds.
const GLIDE_DURATION: f64 = 0.4;
const GLIDE_EASE: Easing = Easing::CubicInOut;

/// Measured extent of the rail.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarouselExtent {
    /// Total content width.
    pub scroll_width: f64,
    /// Visible width.
    pub client_width: f64,
}

impl CarouselExtent {
    pub fn new(scroll_width: f64, client_width: f64) -> Self {
        Self {
            scroll_width,
            client_width,
        }
    }

    /// Largest reachable offset.
    pub fn max_offset(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }
}

#[derive(Clone, Copy)]
struct Glide {
    from: f64,
    to: f64,
    started_at: Instant,
}

struct CarouselInner {
    extent: Box<dyn Fn() -> CarouselExtent>,
    offset: Signal<f64>,
    can_left: Signal<bool>,
    can_right: Signal<bool>,
    glide: Cell<Option<Glide>>,
}

impl CarouselInner {
    fn recompute_edges(&self) {
        let extent = (self.extent)();
        let max = extent.max_offset();

        if self.offset.get() > max {
            self.glide.set(None);
            self.offset.set(max);
        }

        let offset = self.offset.get();
        let can_left = offset > 0.0;
        let can_right = offset < max - EDGE_EPSILON;

        if self.can_left.get() != can_left {
            self.can_left.set(can_left);
        }
        if self.can_right.get() != can_right {
            self.can_right.set(can_right);
        }
    }
}

/// Stepped card rail with eased movement and reactive edge state.
pub struct Carousel {
    inner: Rc<CarouselInner>,
    cleanup: Option<Cleanup>,
}

impl Carousel {
    /// Mounts the carousel over an extent provider. The provider is read
    /// whenever edges are recomputed, so it should reflect live layout.
    pub fn mount(extent: impl Fn() -> CarouselExtent + 'static) -> Self {
        let inner = Rc::new(CarouselInner {
            extent: Box::new(extent),
            offset: signal(0.0),
            can_left: signal(false),
            can_right: signal(false),
            glide: Cell::new(None),
        });
        inner.recompute_edges();

        let resize_inner = inner.clone();
        let cleanup: Cleanup = Box::new(events::on_resize(move || {
            resize_inner.recompute_edges();
        }));

        Self {
            inner,
            cleanup: Some(cleanup),
        }
    }

    pub fn offset(&self) -> f64 {
        self.inner.offset.get()
    }

    pub fn can_scroll_left(&self) -> bool {
        self.inner.can_left.get()
    }

    pub fn can_scroll_right(&self) -> bool {
        self.inner.can_right.get()
    }

    pub fn offset_signal(&self) -> Signal<f64> {
        self.inner.offset.clone()
    }

    pub fn can_scroll_left_signal(&self) -> Signal<bool> {
        self.inner.can_left.clone()
    }

    pub fn can_scroll_right_signal(&self) -> Signal<bool> {
        self.inner.can_right.clone()
    }

    /// One card to the right.
    pub fn scroll_next(&self) {
        self.glide_to(self.inner.offset.get() + SCROLL_STEP);
    }

    /// One card back to the left.
    pub fn scroll_prev(&self) {
        self.glide_to(self.inner.offset.get() - SCROLL_STEP);
    }

    fn glide_to(&self, target: f64) {
        let max = (self.inner.extent)().max_offset();
        let target = target.clamp(0.0, max);
        let from = self.inner.offset.get();
        if target == from {
            return;
        }
        self.inner.glide.set(Some(Glide {
            from,
            to: target,
            started_at: frame::now(),
        }));
    }

    /// Advances an active glide. Returns `true` while movement continues.
    pub fn step(&self, now: Instant) -> bool {
        let Some(glide) = self.inner.glide.get() else {
            return false;
        };

        let elapsed = now.saturating_duration_since(glide.started_at).as_secs_f64();
        let progress = if GLIDE_DURATION <= 0.0 {
            1.0
        } else {
            (elapsed / GLIDE_DURATION).clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            self.inner.offset.set(glide.to);
            self.inner.glide.set(None);
        } else {
            let eased = GLIDE_EASE.evaluate(progress);
            self.inner.offset.set(glide.from + (glide.to - glide.from) * eased);
        }
        self.inner.recompute_edges();
        self.inner.glide.get().is_some()
    }

    pub fn is_gliding(&self) -> bool {
        self.inner.glide.get().is_some()
    }

    /// Jumps straight to an offset, canceling any glide.
    pub fn set_offset(&self, value: f64) {
        let max = (self.inner.extent)().max_offset();
        self.inner.glide.set(None);
        self.inner.offset.set(value.clamp(0.0, max));
        self.inner.recompute_edges();
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for Carousel {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport;
    use std::time::Duration;

    fn setup() -> Instant {
        events::reset_events();
        frame::reset_frame_state();
        viewport::reset_viewport_state();

        let t0 = Instant::now();
        frame::advance(t0);
        t0
    }

    fn extent_cell(scroll_width: f64, client_width: f64) -> Rc<Cell<CarouselExtent>> {
        Rc::new(Cell::new(CarouselExtent::new(scroll_width, client_width)))
    }

    fn mount_with(extent: &Rc<Cell<CarouselExtent>>) -> Carousel {
        let provider = extent.clone();
        Carousel::mount(move || provider.get())
    }

    fn finish_glide(carousel: &Carousel, start: Instant) {
        carousel.step(start + Duration::from_secs_f64(GLIDE_DURATION + 0.05));
    }

    #[test]
    fn test_constants() {
        assert_eq!(CARD_WIDTH, 336.0);
        assert_eq!(CARD_GAP, 20.0);
        assert_eq!(SCROLL_STEP, 356.0);
    }

    #[test]
    fn test_edges_at_the_start_of_the_rail() {
        setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);

        assert_eq!(carousel.offset(), 0.0);
        assert!(!carousel.can_scroll_left());
        assert!(carousel.can_scroll_right());
    }

    #[test]
    fn test_press_glides_one_step() {
        let t0 = setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);

        carousel.scroll_next();
        assert!(carousel.is_gliding());
        // Movement happens in step, not in the press
        assert_eq!(carousel.offset(), 0.0);

        // CubicInOut midpoint: half the distance at half the time
        assert!(carousel.step(t0 + Duration::from_secs_f64(0.2)));
        assert!((carousel.offset() - 178.0).abs() < 1e-9);

        assert!(!carousel.step(t0 + Duration::from_secs_f64(0.45)));
        assert_eq!(carousel.offset(), 356.0);
        assert!(carousel.can_scroll_left());
        assert!(carousel.can_scroll_right());
    }

    #[test]
    fn test_stepping_to_the_end_clamps_and_disables_right() {
        let t0 = setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);

        // 2000 - 800 leaves 1200 reachable; four presses overshoot to
        // 1424 and clamp
        for _ in 0..4 {
            carousel.scroll_next();
            finish_glide(&carousel, t0);
        }
        assert_eq!(carousel.offset(), 1200.0);
        assert!(carousel.can_scroll_left());
        assert!(!carousel.can_scroll_right());

        // Pressing at the end is a no-op
        carousel.scroll_next();
        assert!(!carousel.is_gliding());
    }

    #[test]
    fn test_prev_returns_along_the_rail() {
        let t0 = setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);

        carousel.set_offset(712.0);
        carousel.scroll_prev();
        finish_glide(&carousel, t0);
        assert_eq!(carousel.offset(), 356.0);

        carousel.scroll_prev();
        finish_glide(&carousel, t0);
        assert_eq!(carousel.offset(), 0.0);
        assert!(!carousel.can_scroll_left());

        carousel.scroll_prev();
        assert!(!carousel.is_gliding());
    }

    #[test]
    fn test_rail_narrower_than_viewport_disables_both_arrows() {
        setup();
        let extent = extent_cell(600.0, 800.0);
        let carousel = mount_with(&extent);

        assert!(!carousel.can_scroll_left());
        assert!(!carousel.can_scroll_right());

        carousel.scroll_next();
        assert!(!carousel.is_gliding());
        assert_eq!(carousel.offset(), 0.0);
    }

    #[test]
    fn test_resize_recomputes_edges_and_clamps_offset() {
        setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);

        carousel.set_offset(1200.0);
        assert!(!carousel.can_scroll_right());

        // Cards removed, the rail shrinks under the current offset
        extent.set(CarouselExtent::new(1000.0, 800.0));
        viewport::set_viewport_size(1280.0, 720.0);

        assert_eq!(carousel.offset(), 200.0);
        assert!(carousel.can_scroll_left());
        assert!(!carousel.can_scroll_right());
    }

    #[test]
    fn test_new_press_retargets_from_current_position() {
        let t0 = setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);

        carousel.scroll_next();
        carousel.step(t0 + Duration::from_secs_f64(0.2));
        let mid = carousel.offset();
        assert!((mid - 178.0).abs() < 1e-9);

        // Pressing mid-glide starts a fresh step from where the rail is
        carousel.scroll_next();
        finish_glide(&carousel, t0 + Duration::from_secs_f64(0.2));
        assert!((carousel.offset() - (mid + SCROLL_STEP)).abs() < 1e-9);
    }

    #[test]
    fn test_unmount_releases_the_resize_hook() {
        setup();
        let extent = extent_cell(2000.0, 800.0);
        let carousel = mount_with(&extent);
        let can_right = carousel.can_scroll_right_signal();

        carousel.unmount();
        extent.set(CarouselExtent::new(600.0, 800.0));
        viewport::set_viewport_size(1280.0, 720.0);

        // Stale but untouched: nothing recomputes after unmount
        assert!(can_right.get());
    }
}
