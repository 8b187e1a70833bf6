//! Video Scale Controller - proximity-driven emphasis
//!
//! Scales a media element up (and tightens its corner radius) as it
//! approaches the vertical center of the viewport. The mapping runs on a
//! window measured from the element's center to the viewport's center:
//! far away the element rests at its reduced size, inside the window it
//! interpolates, and past the center it locks at full size until the
//! element has retreated a comfortable distance. The lock keeps the
//! element from pulsing while the visitor scrolls back and forth around
//! the center.
//!
//! Geometry changes (media loading in, late layout) refresh the scroll
//! engine's measurements rather than this controller; the per-event
//! evaluation picks the new numbers up on the next scroll.

use std::cell::Cell;
use std::rc::Rc;

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::document::{self, ElementId};
use crate::events;
use crate::frame::{self, TimerHandle};
use crate::scroll::GeometryHandle;
use crate::types::Cleanup;
use crate::viewport;

/// Resting scale, applied outside the engagement window.
pub const SCALE_MIN: f64 = 0.95;
/// Full scale, reached at the near edge of the window.
pub const SCALE_MAX: f64 = 1.0;
/// Resting corner radius, in pixels.
pub const RADIUS_MAX: f64 = 24.0;
/// Corner radius at full scale, in pixels.
pub const RADIUS_MIN: f64 = 8.0;

/// Far edge of the engagement window, as a fraction of viewport height.
const WINDOW_FAR: f64 = 0.8;
/// Near edge of the engagement window, as a fraction of viewport height.
const WINDOW_NEAR: f64 = 0.2;
/// Distance past which a locked element unlocks, as a fraction of
/// viewport height.
const RELEASE_DISTANCE: f64 = 0.3;

/// Delay before the post-mount geometry refresh, in milliseconds.
const GEOMETRY_SETTLE_MS: u64 = 100;

struct ScaleState {
    element: ElementId,
    scale: Signal<f64>,
    radius: Signal<f64>,
    locked: Cell<bool>,
}

impl ScaleState {
    /// Re-derive scale and radius from the element's current distance to
    /// the viewport center. Unmeasurable elements keep their last values.
    fn evaluate(&self) {
        let Some(rect) = document::rect_of(self.element) else {
            return;
        };
        let vh = viewport::viewport_height();
        let distance = rect.center_y() - vh / 2.0;

        if distance < 0.0 {
            self.locked.set(true);
        } else if distance > vh * RELEASE_DISTANCE {
            self.locked.set(false);
        }

        if self.locked.get() {
            self.apply(SCALE_MAX, RADIUS_MIN);
            return;
        }

        if distance > vh * WINDOW_FAR {
            self.apply(SCALE_MIN, RADIUS_MAX);
        } else if distance >= vh * WINDOW_NEAR {
            let progress = 1.0 - distance / (vh * WINDOW_FAR);
            let scale =
                (SCALE_MIN + progress * (SCALE_MAX - SCALE_MIN)).clamp(SCALE_MIN, SCALE_MAX);
            let radius =
                (RADIUS_MAX - progress * (RADIUS_MAX - RADIUS_MIN)).clamp(RADIUS_MIN, RADIUS_MAX);
            self.apply(scale, radius);
        } else {
            self.apply(SCALE_MAX, RADIUS_MIN);
        }
    }

    fn apply(&self, scale: f64, radius: f64) {
        if self.scale.get() != scale {
            self.scale.set(scale);
        }
        if self.radius.get() != radius {
            self.radius.set(radius);
        }
    }
}

/// Scroll-proximity scale for a media element.
///
/// Evaluates once at mount, then on every scroll event. Media load on the
/// watched element and a short post-mount timer both refresh the scroll
/// engine's geometry through the supplied handle, so virtual scrolling
/// stays measured while the media settles.
pub struct VideoScale {
    state: Rc<ScaleState>,
    cleanups: Vec<Cleanup>,
    settle_timer: Option<TimerHandle>,
}

impl VideoScale {
    pub fn mount(element: ElementId, geometry: GeometryHandle) -> Self {
        let state = Rc::new(ScaleState {
            element,
            scale: signal(SCALE_MIN),
            radius: signal(RADIUS_MAX),
            locked: Cell::new(false),
        });

        if !document::is_attached(element) {
            debug!(?element, "scale target missing, controller stays inert");
            return Self {
                state,
                cleanups: Vec::new(),
                settle_timer: None,
            };
        }

        state.evaluate();

        let mut cleanups: Vec<Cleanup> = Vec::new();

        let scroll_state = state.clone();
        cleanups.push(Box::new(events::on_scroll(move |_event| {
            scroll_state.evaluate();
        })));

        let media_geometry = geometry;
        cleanups.push(Box::new(events::on_media_load(move |loaded| {
            if loaded == element {
                media_geometry.refresh();
            }
        })));

        let timer_geometry = geometry;
        let settle_timer = Some(frame::set_timeout(
            std::time::Duration::from_millis(GEOMETRY_SETTLE_MS),
            move || timer_geometry.refresh(),
        ));

        Self {
            state,
            cleanups,
            settle_timer,
        }
    }

    /// Current scale factor, in `[SCALE_MIN, SCALE_MAX]`.
    pub fn scale(&self) -> f64 {
        self.state.scale.get()
    }

    /// Current corner radius, in pixels.
    pub fn radius(&self) -> f64 {
        self.state.radius.get()
    }

    pub fn scale_signal(&self) -> Signal<f64> {
        self.state.scale.clone()
    }

    pub fn radius_signal(&self) -> Signal<f64> {
        self.state.radius.clone()
    }

    /// Whether the element is held at full size by the center lock.
    pub fn is_locked(&self) -> bool {
        self.state.locked.get()
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(timer) = self.settle_timer.take() {
            frame::clear_timeout(timer);
        }
        for cleanup in self.cleanups.drain(..) {
            cleanup();
        }
    }
}

impl Drop for VideoScale {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================
