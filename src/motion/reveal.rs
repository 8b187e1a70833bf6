//! Fade Reveal - single-element entrance
//!
//! The plainest entrance in the set: one element fades in and rises to
//! rest when it becomes visible. Blocks that animate as a unit (logo
//! rows, closing captions) use this instead of a per-word stagger.

use std::time::Instant;

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::document::{self, ElementId};
use crate::motion::easing::Easing;
use crate::motion::stagger::REVEAL_THRESHOLD;
use crate::trigger::{self, TriggerOptions};
use crate::types::Cleanup;

/// Rise distance, in pixels.
pub const REVEAL_Y: f64 = 30.0;
/// Entrance duration, in seconds.
pub const REVEAL_DURATION: f64 = 0.4;

/// One-shot fade-and-rise for a whole element.
pub struct FadeReveal {
    started: Signal<Option<Instant>>,
    stop_trigger: Option<Cleanup>,
}

impl FadeReveal {
    pub fn mount(element: ElementId) -> Self {
        let started: Signal<Option<Instant>> = signal(None);

        let stop_trigger = if document::is_attached(element) {
            let started = started.clone();
            Some(Box::new(trigger::observe(
                element,
                TriggerOptions::fire_once(REVEAL_THRESHOLD),
                move |entry| {
                    if entry.visible && started.get().is_none() {
                        started.set(Some(entry.time));
                    }
                },
            )) as Cleanup)
        } else {
            debug!(?element, "reveal target missing, controller stays inert");
            None
        };

        Self {
            started,
            stop_trigger,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started.get().is_some()
    }

    fn progress(&self, now: Instant) -> f64 {
        let Some(start) = self.started.get() else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        (elapsed / REVEAL_DURATION).clamp(0.0, 1.0)
    }

    /// Opacity at `now`, eased from 0 to 1.
    pub fn opacity(&self, now: Instant) -> f64 {
        Easing::CubicOut.evaluate(self.progress(now))
    }

    /// Upward offset remaining at `now`, from [`REVEAL_Y`] down to 0.
    pub fn y_offset(&self, now: Instant) -> f64 {
        REVEAL_Y * (1.0 - Easing::CubicOut.evaluate(self.progress(now)))
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
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

impl Drop for FadeReveal {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================
