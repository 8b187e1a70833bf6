//! Count-Up Controller - animated number reveal
//!
//! Counts from zero to a target value once the element scrolls into view.
//! Intermediate values are eased (cubic-out) and floored to whole numbers
//! so the display never shows fractional counts; the final sample is the
//! exact target, never a float neighbor of it.

use std::time::Instant;

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::document::{self, ElementId};
use crate::motion::easing::Easing;
use crate::trigger::{self, TriggerOptions};
use crate::types::Cleanup;

/// Visibility ratio at which the count starts.
pub const COUNT_THRESHOLD: f64 = 0.3;

/// Fire-once count from zero to a target.
///
/// # Example
///
/// ```
/// use scrollstage::{document, viewport};
/// use scrollstage::motion::CountUp;
/// use scrollstage::types::Rect;
///
/// viewport::set_viewport_size(1280.0, 1000.0);
/// let stat = document::create_element();
/// document::set_rect_provider(stat, || Rect::new(0.0, 400.0, 200.0, 80.0));
///
/// let count = CountUp::mount(stat, 150.0, CountUp::DEFAULT_DURATION);
/// assert!(!count.has_started());
/// ```
pub struct CountUp {
    target: f64,
    duration: f64,
    started: Signal<Option<Instant>>,
    stop_trigger: Option<Cleanup>,
}

impl CountUp {
    /// Default count duration, in seconds.
    pub const DEFAULT_DURATION: f64 = 2.0;

    pub fn mount(element: ElementId, target: f64, duration_secs: f64) -> Self {
        let started: Signal<Option<Instant>> = signal(None);

        let stop_trigger = if document::is_attached(element) {
            let started = started.clone();
            Some(Box::new(trigger::observe(
                element,
                TriggerOptions::fire_once(COUNT_THRESHOLD),
                move |entry| {
                    if entry.visible && started.get().is_none() {
                        started.set(Some(entry.time));
                    }
                },
            )) as Cleanup)
        } else {
            debug!(?element, "count-up target missing, controller stays inert");
            None
        };

        Self {
            target,
            duration: duration_secs,
            started,
            stop_trigger,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn has_started(&self) -> bool {
        self.started.get().is_some()
    }

    /// The value to display at `now`: zero before the start, floored
    /// eased values while counting, and the exact target at the end.
    pub fn value(&self, now: Instant) -> f64 {
        let Some(start) = self.started.get() else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        if self.duration <= 0.0 || elapsed >= self.duration {
            return self.target;
        }
        let progress = Easing::CubicOut.evaluate(elapsed / self.duration);
        (progress * self.target).floor()
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        match self.started.get() {
            Some(start) => now.saturating_duration_since(start).as_secs_f64() >= self.duration,
            None => false,
        }
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(stop) = self.stop_trigger.take() {
            stop();
        }
    }
}

impl Drop for CountUp {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================
