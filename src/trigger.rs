//! Viewport Trigger - visibility watching for elements
//!
//! # Architecture
//!
//! [`observe`] registers a watcher for an element. Each evaluation pass
//! intersects the element's rect with the viewport (optionally grown by a
//! root margin), derives a visibility ratio, and invokes the callback when
//! the visible/hidden state changes. The first delivery reports the initial
//! state, visible or not.
//!
//! Evaluation is frame-coalesced: scroll, resize, and mutation events mark
//! a pass pending, and the next frame runs one pass over all watchers. The
//! global listeners are wired when the first watcher registers and torn
//! down when the last one leaves.
//!
//! Watchers whose element has no geometry yet are skipped entirely; their
//! initial delivery happens on the first pass that can measure them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use crate::document::{self, ElementId};
use crate::events;
use crate::frame;
use crate::types::{Cleanup, Rect};
use crate::viewport;

// =============================================================================
// OPTIONS
// =============================================================================

/// One edge of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    /// Absolute pixels. Positive grows the root outward.
    Px(f64),
    /// Percentage of the viewport dimension on that axis.
    Percent(f64),
}

impl MarginValue {
    fn parse(part: &str) -> Result<Self, RootMarginError> {
        if let Some(number) = part.strip_suffix("px") {
            number
                .parse::<f64>()
                .map(MarginValue::Px)
                .map_err(|_| RootMarginError::InvalidComponent(part.to_string()))
        } else if let Some(number) = part.strip_suffix('%') {
            number
                .parse::<f64>()
                .map(MarginValue::Percent)
                .map_err(|_| RootMarginError::InvalidComponent(part.to_string()))
        } else if part == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(RootMarginError::InvalidComponent(part.to_string()))
        }
    }

    fn resolve(self, basis: f64) -> f64 {
        match self {
            MarginValue::Px(value) => value,
            MarginValue::Percent(percent) => percent / 100.0 * basis,
        }
    }
}

/// Margin applied to the viewport before intersection, CSS-style.
///
/// Positive values grow the root (elements trigger before they are truly
/// on screen), negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

/// Error parsing a root margin string.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RootMarginError {
    #[error("root margin needs 1 to 4 values, got {0}")]
    WrongValueCount(usize),
    #[error("invalid margin component: {0:?}")]
    InvalidComponent(String),
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: MarginValue::Px(0.0),
        right: MarginValue::Px(0.0),
        bottom: MarginValue::Px(0.0),
        left: MarginValue::Px(0.0),
    };

    /// Parse CSS margin shorthand: 1 to 4 space-separated values, each
    /// `<number>px`, `<number>%`, or a bare `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use scrollstage::trigger::{MarginValue, RootMargin};
    ///
    /// let margin = RootMargin::parse("0 0 200px 0").unwrap();
    /// assert_eq!(margin.bottom, MarginValue::Px(200.0));
    /// ```
    pub fn parse(input: &str) -> Result<Self, RootMarginError> {
        let values = input
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [all] => Ok(Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            other => Err(RootMarginError::WrongValueCount(other.len())),
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Configuration for [`observe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerOptions {
    /// Minimum visible ratio to count as visible. At the default of zero,
    /// any overlap at all counts.
    pub threshold: f64,
    /// Margin applied to the viewport before intersecting.
    pub root_margin: RootMargin,
    /// Disconnect automatically after the first visible delivery.
    pub once: bool,
}

impl TriggerOptions {
    /// Options for the common enter-animation case: trigger at a ratio,
    /// fire once, disconnect.
    pub fn fire_once(threshold: f64) -> Self {
        Self {
            threshold,
            once: true,
            ..Self::default()
        }
    }
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::ZERO,
            once: false,
        }
    }
}

// =============================================================================
// ENTRIES
// =============================================================================

/// Snapshot delivered to a trigger callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEntry {
    /// Whether the element now counts as visible under the threshold.
    pub visible: bool,
    /// Fraction of the element's area inside the (margin-adjusted) viewport.
    pub ratio: f64,
    /// Timestamp of the evaluation pass that produced this entry.
    pub time: Instant,
}

// =============================================================================
// WATCHER REGISTRY
// =============================================================================

struct Watcher {
    element: ElementId,
    options: TriggerOptions,
    callback: Rc<dyn Fn(TriggerEntry)>,
    last_visible: Option<bool>,
}

thread_local! {
    static WATCHERS: RefCell<HashMap<usize, Watcher>> = RefCell::new(HashMap::new());
    static NEXT_ID: Cell<usize> = Cell::new(0);
    static PASS_PENDING: Cell<bool> = Cell::new(false);
    static WIRING: RefCell<Vec<Cleanup>> = RefCell::new(Vec::new());
}

/// Watch an element's visibility.
///
/// The callback fires on the next frame with the initial state, then again
/// whenever visibility flips. Returns a cleanup function that stops
/// watching.
///
/// # Example
///
/// ```
/// use scrollstage::{document, trigger, viewport};
/// use scrollstage::trigger::TriggerOptions;
/// use scrollstage::types::Rect;
///
/// viewport::set_viewport_size(1280.0, 1000.0);
/// let target = document::create_element();
/// document::set_rect_provider(target, || Rect::new(0.0, 400.0, 300.0, 200.0));
///
/// let stop = trigger::observe(target, TriggerOptions::default(), |entry| {
///     println!("visible: {} ({:.0}%)", entry.visible, entry.ratio * 100.0);
/// });
///
/// // Later
/// stop();
/// ```
pub fn observe<F>(element: ElementId, options: TriggerOptions, callback: F) -> impl FnOnce()
where
    F: Fn(TriggerEntry) + 'static,
{
    let id = WATCHERS.with(|watchers| {
        let mut watchers = watchers.borrow_mut();
        let id = NEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        watchers.insert(
            id,
            Watcher {
                element,
                options,
                callback: Rc::new(callback),
                last_visible: None,
            },
        );
        id
    });

    ensure_wired();
    schedule_pass();

    move || remove_watcher(id)
}

/// Number of active watchers (for testing).
pub fn watcher_count() -> usize {
    WATCHERS.with(|watchers| watchers.borrow().len())
}

/// Drop all watchers and detach global listeners (for testing).
pub fn reset_triggers() {
    WATCHERS.with(|watchers| watchers.borrow_mut().clear());
    unwire();
    PASS_PENDING.with(|pending| pending.set(false));
    NEXT_ID.with(|next| next.set(0));
}

fn remove_watcher(id: usize) {
    let empty = WATCHERS.with(|watchers| {
        let mut watchers = watchers.borrow_mut();
        watchers.remove(&id);
        watchers.is_empty()
    });
    if empty {
        unwire();
    }
}

// =============================================================================
// GLOBAL WIRING
// =============================================================================

/// First watcher wires the shared listeners; last one out unwires them.
fn ensure_wired() {
    WIRING.with(|wiring| {
        let mut wiring = wiring.borrow_mut();
        if !wiring.is_empty() {
            return;
        }
        wiring.push(Box::new(events::on_scroll(|_| schedule_pass())));
        wiring.push(Box::new(events::on_resize(schedule_pass)));
        wiring.push(Box::new(document::on_mutation(schedule_pass)));
    });
}

fn unwire() {
    let cleanups: Vec<Cleanup> = WIRING.with(|wiring| wiring.borrow_mut().drain(..).collect());
    for cleanup in cleanups {
        cleanup();
    }
}

fn schedule_pass() {
    let already_pending = PASS_PENDING.with(|pending| pending.replace(true));
    if already_pending {
        return;
    }
    frame::request_frame(|now| {
        PASS_PENDING.with(|pending| pending.set(false));
        run_pass(now);
    });
}

// =============================================================================
// EVALUATION
// =============================================================================

fn run_pass(now: Instant) {
    let ids: Vec<usize> = WATCHERS.with(|watchers| watchers.borrow().keys().copied().collect());

    for id in ids {
        // Re-fetch per id: an earlier callback may have removed this watcher.
        let snapshot = WATCHERS.with(|watchers| {
            watchers
                .borrow()
                .get(&id)
                .map(|w| (w.element, w.options, w.last_visible))
        });
        let Some((element, options, last_visible)) = snapshot else {
            continue;
        };

        let Some(target) = document::rect_of(element) else {
            continue;
        };

        let ratio = intersection_ratio(&target, &options.root_margin);
        let visible = if options.threshold == 0.0 {
            ratio > 0.0
        } else {
            ratio >= options.threshold
        };

        if last_visible == Some(visible) {
            continue;
        }

        let callback = WATCHERS.with(|watchers| {
            watchers.borrow_mut().get_mut(&id).map(|w| {
                w.last_visible = Some(visible);
                w.callback.clone()
            })
        });
        if let Some(callback) = callback {
            callback(TriggerEntry {
                visible,
                ratio,
                time: now,
            });
            if options.once && visible {
                remove_watcher(id);
            }
        }
    }
}

fn intersection_ratio(target: &Rect, margin: &RootMargin) -> f64 {
    let vw = viewport::viewport_width();
    let vh = viewport::viewport_height();
    let root = viewport::viewport_rect().expand(
        margin.top.resolve(vh),
        margin.right.resolve(vw),
        margin.bottom.resolve(vh),
        margin.left.resolve(vw),
    );

    if target.is_empty() {
        // Zero-area targets count as fully visible while inside the root
        return if root.contains_point(target.left, target.top) {
            1.0
        } else {
            0.0
        };
    }

    match target.intersect(&root) {
        Some(overlap) => overlap.area() / target.area(),
        None => 0.0,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScrollEvent;
    use std::time::Duration;

    fn setup() -> Instant {
        reset_triggers();
        crate::document::reset_document();
        crate::events::reset_events();
        crate::frame::reset_frame_state();
        crate::viewport::reset_viewport_state();

        viewport::set_viewport_size(1280.0, 1000.0);
        let t0 = Instant::now();
        frame::advance(t0);
        t0
    }

    fn create_target(top: f64, height: f64) -> (ElementId, Rc<Cell<f64>>) {
        let id = document::create_element();
        let top_cell = Rc::new(Cell::new(top));
        let provider_top = top_cell.clone();
        document::set_rect_provider(id, move || {
            Rect::new(100.0, provider_top.get(), 300.0, height)
        });
        (id, top_cell)
    }

    fn collect_entries(
        element: ElementId,
        options: TriggerOptions,
    ) -> (Rc<RefCell<Vec<TriggerEntry>>>, impl FnOnce()) {
        let entries = Rc::new(RefCell::new(Vec::new()));
        let sink = entries.clone();
        let stop = observe(element, options, move |entry| {
            sink.borrow_mut().push(entry);
        });
        (entries, stop)
    }

    fn scroll_to(top_cell: &Rc<Cell<f64>>, top: f64) {
        top_cell.set(top);
        events::dispatch_scroll(ScrollEvent::native(0.0));
    }

    #[test]
    fn test_default_options() {
        let options = TriggerOptions::default();
        assert_eq!(options.threshold, 0.0);
        assert_eq!(options.root_margin, RootMargin::ZERO);
        assert!(!options.once);

        let once = TriggerOptions::fire_once(0.3);
        assert_eq!(once.threshold, 0.3);
        assert!(once.once);
    }

    #[test]
    fn test_initial_state_delivered_on_next_frame() {
        let t0 = setup();
        let (target, _) = create_target(400.0, 200.0);
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        // Deferred to the next pass
        assert!(entries.borrow().is_empty());

        frame::advance(t0 + Duration::from_millis(16));
        let entries = entries.borrow();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].visible);
        assert_eq!(entries[0].ratio, 1.0);
        assert_eq!(entries[0].time, t0 + Duration::from_millis(16));
    }

    #[test]
    fn test_initial_state_for_offscreen_target() {
        let t0 = setup();
        let (target, _) = create_target(2000.0, 200.0);
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        frame::advance(t0 + Duration::from_millis(16));
        let entries = entries.borrow();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].visible);
        assert_eq!(entries[0].ratio, 0.0);
    }

    #[test]
    fn test_no_redelivery_while_state_holds() {
        let t0 = setup();
        let (target, top) = create_target(400.0, 200.0);
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        frame::advance(t0 + Duration::from_millis(16));
        assert_eq!(entries.borrow().len(), 1);

        // Still visible after a small scroll: no new entry
        scroll_to(&top, 350.0);
        frame::advance(t0 + Duration::from_millis(32));
        assert_eq!(entries.borrow().len(), 1);
    }

    #[test]
    fn test_delivery_on_each_visibility_flip() {
        let t0 = setup();
        let (target, top) = create_target(2000.0, 200.0);
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        frame::advance(t0 + Duration::from_millis(16));
        scroll_to(&top, 400.0);
        frame::advance(t0 + Duration::from_millis(32));
        scroll_to(&top, -500.0);
        frame::advance(t0 + Duration::from_millis(48));

        let entries = entries.borrow();
        let states: Vec<bool> = entries.iter().map(|e| e.visible).collect();
        assert_eq!(states, vec![false, true, false]);
    }

    #[test]
    fn test_threshold_gates_visibility() {
        let t0 = setup();
        // 1000 tall target with only its top 100 on screen: ratio 0.1
        let (target, top) = create_target(900.0, 1000.0);
        let options = TriggerOptions {
            threshold: 0.3,
            ..TriggerOptions::default()
        };
        let (entries, _stop) = collect_entries(target, options);

        frame::advance(t0 + Duration::from_millis(16));
        {
            let entries = entries.borrow();
            assert_eq!(entries.len(), 1);
            assert!(!entries[0].visible);
            assert_eq!(entries[0].ratio, 0.1);
        }

        // Half on screen: 0.5 >= 0.3
        scroll_to(&top, 500.0);
        frame::advance(t0 + Duration::from_millis(32));
        let entries = entries.borrow();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].visible);
        assert_eq!(entries[1].ratio, 0.5);
    }

    #[test]
    fn test_zero_threshold_counts_any_overlap() {
        let t0 = setup();
        let (target, _) = create_target(999.5, 100.0);
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        frame::advance(t0 + Duration::from_millis(16));
        let entries = entries.borrow();
        assert!(entries[0].visible);
        assert!(entries[0].ratio > 0.0 && entries[0].ratio < 0.01);
    }

    #[test]
    fn test_fire_once_disconnects_after_visible() {
        let t0 = setup();
        let (target, top) = create_target(2000.0, 200.0);
        let (entries, _stop) = collect_entries(target, TriggerOptions::fire_once(0.3));

        // Initial hidden delivery does not consume the trigger
        frame::advance(t0 + Duration::from_millis(16));
        assert_eq!(entries.borrow().len(), 1);
        assert_eq!(watcher_count(), 1);

        scroll_to(&top, 400.0);
        frame::advance(t0 + Duration::from_millis(32));
        assert_eq!(entries.borrow().len(), 2);
        assert!(entries.borrow()[1].visible);
        assert_eq!(watcher_count(), 0);

        // Leaving and re-entering delivers nothing more
        scroll_to(&top, 2000.0);
        frame::advance(t0 + Duration::from_millis(48));
        scroll_to(&top, 400.0);
        frame::advance(t0 + Duration::from_millis(64));
        assert_eq!(entries.borrow().len(), 2);
    }

    #[test]
    fn test_cleanup_stops_delivery() {
        let t0 = setup();
        let (target, top) = create_target(400.0, 200.0);
        let (entries, stop) = collect_entries(target, TriggerOptions::default());

        frame::advance(t0 + Duration::from_millis(16));
        assert_eq!(entries.borrow().len(), 1);

        stop();
        assert_eq!(watcher_count(), 0);

        scroll_to(&top, 2000.0);
        frame::advance(t0 + Duration::from_millis(32));
        assert_eq!(entries.borrow().len(), 1);
    }

    #[test]
    fn test_last_watcher_unwires_global_listeners() {
        setup();
        let (target, _) = create_target(400.0, 200.0);

        let stop_a = observe(target, TriggerOptions::default(), |_| {});
        let stop_b = observe(target, TriggerOptions::default(), |_| {});
        assert_eq!(events::scroll_handler_count(), 1);

        stop_a();
        assert_eq!(events::scroll_handler_count(), 1);

        stop_b();
        assert_eq!(events::scroll_handler_count(), 0);
    }

    #[test]
    fn test_unmeasurable_target_waits_for_geometry() {
        let t0 = setup();
        let target = document::create_element();
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        // No geometry yet: no delivery at all
        frame::advance(t0 + Duration::from_millis(16));
        assert!(entries.borrow().is_empty());

        // Geometry arrives and the host flags the change
        document::set_rect_provider(target, || Rect::new(0.0, 100.0, 300.0, 200.0));
        document::notify_subtree_changed();
        frame::advance(t0 + Duration::from_millis(32));

        let entries = entries.borrow();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].visible);
    }

    #[test]
    fn test_zero_area_target_uses_point_containment() {
        let t0 = setup();
        let target = document::create_element();
        let top = Rc::new(Cell::new(500.0));
        let provider_top = top.clone();
        document::set_rect_provider(target, move || {
            Rect::new(100.0, provider_top.get(), 0.0, 0.0)
        });
        let (entries, _stop) = collect_entries(target, TriggerOptions::default());

        frame::advance(t0 + Duration::from_millis(16));
        {
            let entries = entries.borrow();
            assert_eq!(entries.len(), 1);
            assert!(entries[0].visible);
            assert_eq!(entries[0].ratio, 1.0);
        }

        scroll_to(&top, 1500.0);
        frame::advance(t0 + Duration::from_millis(32));
        let entries = entries.borrow();
        assert_eq!(entries.len(), 2);
        assert!(!entries[1].visible);
        assert_eq!(entries[1].ratio, 0.0);
    }

    // -------------------------------------------------------------------------
    // Root margin tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_root_margin_parse_shorthand() {
        let one = RootMargin::parse("10px").unwrap();
        assert_eq!(one.top, MarginValue::Px(10.0));
        assert_eq!(one.right, MarginValue::Px(10.0));
        assert_eq!(one.bottom, MarginValue::Px(10.0));
        assert_eq!(one.left, MarginValue::Px(10.0));

        let two = RootMargin::parse("10px 20%").unwrap();
        assert_eq!(two.top, MarginValue::Px(10.0));
        assert_eq!(two.right, MarginValue::Percent(20.0));
        assert_eq!(two.bottom, MarginValue::Px(10.0));
        assert_eq!(two.left, MarginValue::Percent(20.0));

        let three = RootMargin::parse("10px 20px 30px").unwrap();
        assert_eq!(three.top, MarginValue::Px(10.0));
        assert_eq!(three.right, MarginValue::Px(20.0));
        assert_eq!(three.bottom, MarginValue::Px(30.0));
        assert_eq!(three.left, MarginValue::Px(20.0));

        let four = RootMargin::parse("1px 2px 3px 4px").unwrap();
        assert_eq!(four.left, MarginValue::Px(4.0));

        let zero = RootMargin::parse("0").unwrap();
        assert_eq!(zero, RootMargin::ZERO);

        let negative = RootMargin::parse("-50px").unwrap();
        assert_eq!(negative.top, MarginValue::Px(-50.0));
    }

    #[test]
    fn test_root_margin_parse_errors() {
        assert_eq!(
            RootMargin::parse(""),
            Err(RootMarginError::WrongValueCount(0))
        );
        assert_eq!(
            RootMargin::parse("1px 2px 3px 4px 5px"),
            Err(RootMarginError::WrongValueCount(5))
        );
        assert!(matches!(
            RootMargin::parse("10"),
            Err(RootMarginError::InvalidComponent(_))
        ));
        assert!(matches!(
            RootMargin::parse("10em"),
            Err(RootMarginError::InvalidComponent(_))
        ));
    }

    #[test]
    fn test_root_margin_extends_trigger_zone() {
        let t0 = setup();
        // Just below the viewport bottom
        let (target, _) = create_target(1100.0, 200.0);
        let options = TriggerOptions {
            root_margin: RootMargin::parse("0 0 200px 0").unwrap(),
            ..TriggerOptions::default()
        };
        let (entries, _stop) = collect_entries(target, options);

        frame::advance(t0 + Duration::from_millis(16));
        assert!(entries.borrow()[0].visible);
    }

    #[test]
    fn test_percent_margin_resolves_against_viewport() {
        let t0 = setup();
        // Viewport height 1000: a 10% bottom margin reaches to 1100
        let (target, _) = create_target(1050.0, 200.0);
        let options = TriggerOptions {
            root_margin: RootMargin::parse("0 0 10% 0").unwrap(),
            ..TriggerOptions::default()
        };
        let (entries, _stop) = collect_entries(target, options);

        frame::advance(t0 + Duration::from_millis(16));
        assert!(entries.borrow()[0].visible);
    }
}
