//! Stagger Controllers - word and line reveal animations
//!
//! # Architecture
//!
//! A stagger controller arms a fire-once viewport trigger on its element.
//! When the element becomes 30% visible the timeline starts, anchored to
//! the trigger's timestamp; after that the controller is pure state. Hosts
//! sample per-unit opacity and y-offset every frame and paint; nothing here
//! pushes frames.
//!
//! Units animate `stagger_delay` apart, each easing from transparent and
//! `y_offset` pixels low up to its resting position over `duration`.
//! Scrolling away after the start does not rewind anything; the trigger
//! has already disconnected.

use std::time::Instant;

use spark_signals::{signal, Signal};
use tracing::debug;

use crate::document::{self, ElementId};
use crate::motion::spec::AnimationSpec;
use crate::motion::text;
use crate::trigger::{self, TriggerOptions};
use crate::types::Cleanup;

/// Visibility ratio at which reveal animations start.
pub const REVEAL_THRESHOLD: f64 = 0.3;

// =============================================================================
// TIMELINE
// =============================================================================

/// Shared stagger math: a start anchor plus per-unit progress sampling.
#[derive(Clone)]
pub(crate) struct RevealTimeline {
    spec: AnimationSpec,
    started: Signal<Option<Instant>>,
}

impl RevealTimeline {
    pub(crate) fn new(spec: AnimationSpec) -> Self {
        Self {
            spec,
            started: signal(None),
        }
    }

    /// Anchor the timeline. First write wins.
    pub(crate) fn start(&self, time: Instant) {
        if self.started.get().is_none() {
            self.started.set(Some(time));
        }
    }

    pub(crate) fn started_at(&self) -> Option<Instant> {
        self.started.get()
    }

    pub(crate) fn spec(&self) -> &AnimationSpec {
        &self.spec
    }

    /// Raw (pre-easing) progress of unit `index` at `now`, in `[0, 1]`.
    pub(crate) fn unit_progress(&self, index: usize, now: Instant) -> f64 {
        let Some(start) = self.started.get() else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        let local = elapsed - self.spec.unit_delay(index);
        if self.spec.duration <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        (local / self.spec.duration).clamp(0.0, 1.0)
    }

    pub(crate) fn unit_opacity(&self, index: usize, now: Instant) -> f64 {
        self.spec.ease.evaluate(self.unit_progress(index, now))
    }

    pub(crate) fn unit_y_offset(&self, index: usize, now: Instant) -> f64 {
        self.spec.y_offset * (1.0 - self.spec.ease.evaluate(self.unit_progress(index, now)))
    }

    pub(crate) fn is_complete(&self, count: usize, now: Instant) -> bool {
        if self.started.get().is_none() {
            return false;
        }
        if count == 0 {
            return true;
        }
        self.unit_progress(count - 1, now) >= 1.0
    }
}

/// Arm a fire-once trigger that starts the timeline on first visibility.
/// Missing elements leave the controller inert.
fn arm_trigger(element: ElementId, timeline: &RevealTimeline, what: &'static str) -> Option<Cleanup> {
    if !document::is_attached(element) {
        debug!(?element, "{what} target missing, controller stays inert");
        return None;
    }
    let timeline = timeline.clone();
    Some(Box::new(trigger::observe(
        element,
        TriggerOptions::fire_once(REVEAL_THRESHOLD),
        move |entry| {
            if entry.visible {
                timeline.start(entry.time);
            }
        },
    )))
}

// =============================================================================
// WORD STAGGER
// =============================================================================

/// Word-by-word reveal, armed by viewport entry.
///
/// # Example
///
/// ```
/// use scrollstage::{document, viewport};
/// use scrollstage::motion::{AnimationSpec, WordStagger};
/// use scrollstage::types::Rect;
///
/// viewport::set_viewport_size(1280.0, 1000.0);
/// let headline = document::create_element();
/// document::set_rect_provider(headline, || Rect::new(0.0, 400.0, 800.0, 120.0));
///
/// let stagger = WordStagger::mount(headline, "We build things", AnimationSpec::default());
/// assert_eq!(stagger.words().len(), 3);
/// assert!(!stagger.has_started());
/// ```
pub struct WordStagger {
    words: Vec<String>,
    timeline: RevealTimeline,
    stop_trigger: Option<Cleanup>,
}

impl WordStagger {
    pub fn mount(element: ElementId, content: &str, spec: AnimationSpec) -> Self {
        let timeline = RevealTimeline::new(spec);
        let stop_trigger = arm_trigger(element, &timeline, "word stagger");
        Self {
            words: text::split_words(content),
            timeline,
            stop_trigger,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn spec(&self) -> &AnimationSpec {
        self.timeline.spec()
    }

    pub fn has_started(&self) -> bool {
        self.timeline.started_at().is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.timeline.started_at()
    }

    /// Raw progress of one word, before easing.
    pub fn unit_progress(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_progress(index, now)
    }

    /// Opacity of one word at `now`, eased, in `[0, 1]`.
    pub fn unit_opacity(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_opacity(index, now)
    }

    /// Pixels below the resting position for one word at `now`.
    pub fn unit_y_offset(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_y_offset(index, now)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.timeline.is_complete(self.words.len(), now)
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

impl Drop for WordStagger {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// LINE STAGGER
// =============================================================================

/// Line-by-line reveal. Same timeline as [`WordStagger`], bigger units,
/// wider default stagger (see [`AnimationSpec::lines`]).
pub struct LineStagger {
    lines: Vec<String>,
    timeline: RevealTimeline,
    stop_trigger: Option<Cleanup>,
}

impl LineStagger {
    /// Mount over pre-split lines.
    pub fn mount(element: ElementId, lines: Vec<String>, spec: AnimationSpec) -> Self {
        let timeline = RevealTimeline::new(spec);
        let stop_trigger = arm_trigger(element, &timeline, "line stagger");
        Self {
            lines,
            timeline,
            stop_trigger,
        }
    }

    /// Mount over running text, wrapped to a display width.
    pub fn mount_wrapped(
        element: ElementId,
        content: &str,
        max_width: usize,
        spec: AnimationSpec,
    ) -> Self {
        Self::mount(element, text::split_lines(content, max_width), spec)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn spec(&self) -> &AnimationSpec {
        self.timeline.spec()
    }

    pub fn has_started(&self) -> bool {
        self.timeline.started_at().is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.timeline.started_at()
    }

    pub fn unit_progress(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_progress(index, now)
    }

    pub fn unit_opacity(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_opacity(index, now)
    }

    pub fn unit_y_offset(&self, index: usize, now: Instant) -> f64 {
        self.timeline.unit_y_offset(index, now)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.timeline.is_complete(self.lines.len(), now)
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

impl Drop for LineStagger {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================
