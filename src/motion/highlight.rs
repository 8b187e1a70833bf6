//! Highlight Controllers - emphasis sweeps over text
//!
//! Two patterns share this module:
//!
//! - [`HighlightReveal`]: a standalone swipe (the tilted marker stroke
//!   behind a phrase) that plays once when half the element is visible.
//! - [`StaggerThenHighlight`]: a word stagger followed, after the words
//!   have landed plus a beat, by the highlight turning on. The handoff
//!   runs on a timer armed when the element enters the viewport; tearing
//!   the controller down before the timer fires suppresses the highlight
//!   entirely.

use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;
use std::time::{Duration, Instant};

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::document::{self, ElementId};
use crate::frame::{self, TimerHandle};
use crate::motion::spec::AnimationSpec;
use crate::motion::stagger::RevealTimeline;
use crate::motion::text;
use crate::trigger::{self, TriggerOptions};
use crate::types::Cleanup;

/// Visibility ratio at which highlight sweeps start.
pub const HIGHLIGHT_THRESHOLD: f64 = 0.5;

/// Default sweep duration, in seconds.
pub const SWEEP_DURATION: f64 = 0.2;

// =============================================================================
// STANDALONE SWEEP
// =============================================================================

/// A one-shot highlight swipe, armed at 50% visibility.
///
/// [`progress`] is the horizontal reveal fraction; hosts typically apply
/// it as a scale-x on the highlight stroke.
///
/// [`progress`]: HighlightReveal::progress
pub struct HighlightReveal {
    duration: f64,
    started: Signal<Option<Instant>>,
    stop_trigger: Option<Cleanup>,
}

impl HighlightReveal {
    pub fn mount(element: ElementId, duration_secs: f64) -> Self {
        let started: Signal<Option<Instant>> = signal(None);

        let stop_trigger = if document::is_attached(element) {
            let started = started.clone();
            Some(Box::new(trigger::observe(
                element,
                TriggerOptions::fire_once(HIGHLIGHT_THRESHOLD),
                move |entry| {
                    if entry.visible && started.get().is_none() {
                        started.set(Some(entry.time));
                    }
                },
            )) as Cleanup)
        } else {
            debug!(?element, "highlight target missing, controller stays inert");
            None
        };

        Self {
            duration: duration_secs,
            started,
            stop_trigger,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started.get().is_some()
    }

    /// Sweep progress at `now`, linear in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        let Some(start) = self.started.get() else {
            return 0.0;
        };
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        (elapsed / self.duration).clamp(0.0, 1.0)
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

impl Drop for HighlightReveal {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// STAGGER THEN HIGHLIGHT
// =============================================================================

/// Configuration for [`StaggerThenHighlight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightOptions {
    /// Stagger parameters for the word reveal.
    pub stagger: AnimationSpec,
    /// Beat between the stagger finishing and the highlight turning on,
    /// in seconds.
    pub highlight_delay: f64,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            stagger: AnimationSpec {
                stagger_delay: 0.03,
                duration: 0.5,
                ..AnimationSpec::default()
            },
            highlight_delay: 0.3,
        }
    }
}

/// Word stagger with a delayed highlight handoff.
///
/// Words reveal with a tight stagger; once the whole run has played out
/// plus `highlight_delay`, the words inside the highlight phrase switch
/// on. The highlight state is a signal, so hosts can subscribe instead of
/// polling.
pub struct StaggerThenHighlight {
    words: Vec<String>,
    highlight: Option<Range<usize>>,
    timeline: RevealTimeline,
    highlight_on: Signal<bool>,
    highlight_timer: Rc<Cell<Option<TimerHandle>>>,
    stop_trigger: Option<Cleanup>,
}

impl StaggerThenHighlight {
    pub fn mount(
        element: ElementId,
        content: &str,
        highlight_phrase: &str,
        options: HighlightOptions,
    ) -> Self {
        let words = text::split_words(content);
        let highlight = text::highlight_range(&words, highlight_phrase);
        let timeline = RevealTimeline::new(options.stagger);
        let highlight_on: Signal<bool> = signal(false);
        let highlight_timer: Rc<Cell<Option<TimerHandle>>> = Rc::new(Cell::new(None));

        let stop_trigger = if document::is_attached(element) {
            let handoff =
                options.stagger.total_duration(words.len()) + options.highlight_delay;
            let callback_timeline = timeline.clone();
            let callback_highlight = highlight_on.clone();
            let callback_timer = highlight_timer.clone();

            Some(Box::new(trigger::observe(
                element,
                TriggerOptions::fire_once(crate::motion::stagger::REVEAL_THRESHOLD),
                move |entry| {
                    if !entry.visible {
                        return;
                    }
                    callback_timeline.start(entry.time);
                    let on = callback_highlight.clone();
                    callback_timer.set(Some(frame::set_timeout(
                        Duration::from_secs_f64(handoff),
                        move || {
                            on.set(true);
                        },
                    )));
                },
            )) as Cleanup)
        } else {
            debug!(?element, "highlight target missing, controller stays inert");
            None
        };

        Self {
            words,
            highlight,
            timeline,
            highlight_on,
            highlight_timer,
            stop_trigger,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Word indices covered by the highlight phrase, if it was found.
    pub fn highlight_range(&self) -> Option<&Range<usize>> {
        self.highlight.as_ref()
    }

    pub fn is_highlighted_word(&self, index: usize) -> bool {
        self.highlight
            .as_ref()
            .is_some_and(|range| range.contains(&index))
    }

    pub fn has_started(&self) -> bool {
        self.timeline.started_at().is_some()
    }

    pub fn unit_opacity(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_opacity(index, now)
    }

    pub fn unit_y_offset(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_y_offset(index, now)
    }

    /// Whether the highlight is currently on.
    pub fn highlight_active(&self) -> bool {
        self.highlight_on.get()
    }

    /// Signal form of [`highlight_active`](Self::highlight_active).
    pub fn highlight_signal(&self) -> Signal<bool> {
        self.highlight_on.clone()
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(timer) = self.highlight_timer.take() {
            frame::clear_timeout(timer);
        }
        if let Some(stop) = self.stop_trigger.take() {
            stop();
        }
    }
}

impl Drop for StaggerThenHighlight {
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
    use crate::types::{Rect, ScrollEvent};
    use crate::{events, frame, viewport};

    fn setup() -> Instant {
        trigger::reset_triggers();
        document::reset_document();
        events::reset_events();
        frame::reset_frame_state();
        viewport::reset_viewport_state();

        viewport::set_viewport_size(1280.0, 1000.0);
        let t0 = Instant::now();
        frame::advance(t0);
        t0
    }

    fn create_target(top: f64) -> (ElementId, Rc<Cell<f64>>) {
        let id = document::create_element();
        let top_cell = Rc::new(Cell::new(top));
        let provider_top = top_cell.clone();
        document::set_rect_provider(id, move || {
            Rect::new(0.0, provider_top.get(), 800.0, 200.0)
        });
        (id, top_cell)
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_constants() {
        assert_eq!(HIGHLIGHT_THRESHOLD, 0.5);
        assert_eq!(SWEEP_DURATION, 0.2);

        let options = HighlightOptions::default();
        assert_eq!(options.stagger.stagger_delay, 0.03);
        assert_eq!(options.stagger.duration, 0.5);
        assert_eq!(options.highlight_delay, 0.3);
    }

    #[test]
    fn test_sweep_requires_half_visibility() {
        let t0 = setup();
        // 80 of 200 px visible: ratio 0.4, short of the 0.5 threshold
        let (element, top) = create_target(920.0);
        let sweep = HighlightReveal::mount(element, SWEEP_DURATION);

        frame::advance(t0 + secs(0.016));
        assert!(!sweep.has_started());

        // 120 of 200 px: ratio 0.6
        top.set(880.0);
        events::dispatch_scroll(ScrollEvent::native(40.0));
        frame::advance(t0 + secs(0.032));
        assert!(sweep.has_started());
    }

    #[test]
    fn test_sweep_progress_is_linear() {
        let t0 = setup();
        let (element, _top) = create_target(400.0);
        let sweep = HighlightReveal::mount(element, 0.2);

        let start = t0 + secs(0.016);
        frame::advance(start);

        assert_eq!(sweep.progress(start), 0.0);
        assert!((sweep.progress(start + secs(0.1)) - 0.5).abs() < 1e-9);
        assert_eq!(sweep.progress(start + secs(0.3)), 1.0);
        assert!(sweep.is_complete(start + secs(0.2)));
    }

    #[test]
    fn test_composite_words_then_highlight() {
        let t0 = setup();
        let (element, _top) = create_target(400.0);
        let composite = StaggerThenHighlight::mount(
            element,
            "Build for the long term",
            "long term",
            HighlightOptions::default(),
        );
        assert_eq!(composite.highlight_range(), Some(&(3..5)));
        assert!(composite.is_highlighted_word(4));
        assert!(!composite.is_highlighted_word(0));

        let start = t0 + secs(0.016);
        frame::advance(start);
        assert!(composite.has_started());
        assert!(!composite.highlight_active());

        // Words animate on the shared timeline
        assert!(composite.unit_opacity(0, start + secs(0.25)) > 0.0);

        // Handoff: 5 words * 0.03 + 0.5, plus the 0.3 beat = 0.95
        frame::advance(start + secs(0.90));
        assert!(!composite.highlight_active());

        frame::advance(start + secs(0.96));
        assert!(composite.highlight_active());
    }

    #[test]
    fn test_teardown_before_handoff_suppresses_highlight() {
        let t0 = setup();
        let (element, _top) = create_target(400.0);
        let composite = StaggerThenHighlight::mount(
            element,
            "Build for the long term",
            "long term",
            HighlightOptions::default(),
        );

        let start = t0 + secs(0.016);
        frame::advance(start);
        assert!(composite.has_started());

        let highlight = composite.highlight_signal();
        composite.unmount();

        // Well past the handoff: the canceled timer never fires
        frame::advance(start + secs(5.0));
        assert!(!highlight.get());
    }

    #[test]
    fn test_composite_without_phrase_match() {
        let t0 = setup();
        let (element, _top) = create_target(400.0);
        let composite = StaggerThenHighlight::mount(
            element,
            "no emphasis here",
            "absent",
            HighlightOptions::default(),
        );
        assert_eq!(composite.highlight_range(), None);
        assert!(!composite.is_highlighted_word(0));

        // The timeline still runs; the highlight just covers nothing
        let start = t0 + secs(0.016);
        frame::advance(start);
        assert!(composite.has_started());
    }

    #[test]
    fn test_composite_missing_element_is_inert() {
        let t0 = setup();
        let element = document::create_element();
        document::remove_element(element);

        let composite = StaggerThenHighlight::mount(
            element,
            "never shown",
            "never",
            HighlightOptions::default(),
        );
        assert_eq!(trigger::watcher_count(), 0);

        frame::advance(t0 + secs(10.0));
        assert!(!composite.has_started());
        assert!(!composite.highlight_active());
    }
}
