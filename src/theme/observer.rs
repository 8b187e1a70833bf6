//! Theme Observer - resolves the active section theme
//!
//! # Architecture
//!
//! A horizontal trigger line sits at 70% of the viewport height. On every
//! evaluation the observer walks the registered sections in document order
//! and activates the theme of the LAST section whose top edge is at or
//! above that line. Scrolling down, each section takes over as its top
//! crosses the line; scrolling up, the previous section takes back over as
//! the later one drops below it.
//!
//! When no section qualifies (scrolled above the first section, or no
//! measurable sections yet) the current theme is retained rather than
//! cleared, so the chrome never flashes back to a default mid-page.
//!
//! Evaluation timing:
//! - mount: synchronous, so the first paint already has the right theme
//! - scroll: coalesced to one evaluation per frame
//! - document mutation: synchronous, sections may have just appeared

use std::cell::Cell;
use std::rc::Rc;

use crate::document;
use crate::events;
use crate::frame::{self, FrameRequest};
use crate::theme;
use crate::types::Cleanup;
use crate::viewport;

/// Fraction of the viewport height where the section trigger line sits.
pub const SECTION_TRIGGER_RATIO: f64 = 0.7;

// =============================================================================
// OBSERVER
// =============================================================================

/// Watches scroll and document changes and keeps the active theme current.
///
/// Only one writer of the theme store exists, and this is it. Unmounting
/// (or dropping) detaches all listeners and clears the active theme.
///
/// # Example
///
/// ```
/// use scrollstage::{document, theme, viewport};
/// use scrollstage::theme::{SectionTheme, ThemeObserver};
/// use scrollstage::types::Rect;
///
/// viewport::set_viewport_size(1280.0, 1000.0);
/// let hero = document::create_element();
/// document::set_rect_provider(hero, || Rect::new(0.0, 0.0, 1280.0, 1000.0));
/// document::register_section(hero, SectionTheme::Dark);
///
/// let observer = ThemeObserver::mount();
/// assert_eq!(theme::active_theme(), Some(SectionTheme::Dark));
///
/// observer.unmount();
/// assert_eq!(theme::active_theme(), None);
/// ```
pub struct ThemeObserver {
    cleanups: Vec<Cleanup>,
    pending: Rc<Cell<Option<FrameRequest>>>,
}

impl ThemeObserver {
    /// Start observing. Evaluates once immediately.
    pub fn mount() -> Self {
        evaluate();

        let pending: Rc<Cell<Option<FrameRequest>>> = Rc::new(Cell::new(None));
        let mut cleanups: Vec<Cleanup> = Vec::new();

        let scroll_pending = pending.clone();
        cleanups.push(Box::new(events::on_scroll(move |_| {
            schedule(&scroll_pending);
        })));

        cleanups.push(Box::new(document::on_mutation(evaluate)));

        Self { cleanups, pending }
    }

    /// Stop observing, cancel any pending evaluation, and clear the
    /// active theme.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(request) = self.pending.take() {
            frame::cancel_frame(request);
        }
        for cleanup in self.cleanups.drain(..) {
            cleanup();
        }
        theme::clear_active_theme();
    }
}

impl Drop for ThemeObserver {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Coalesce scroll bursts: at most one evaluation per frame pass.
fn schedule(pending: &Rc<Cell<Option<FrameRequest>>>) {
    if pending.get().is_some() {
        return;
    }
    let slot = pending.clone();
    let request = frame::request_frame(move |_| {
        slot.set(None);
        evaluate();
    });
    pending.set(Some(request));
}

fn evaluate() {
    let trigger = viewport::viewport_height() * SECTION_TRIGGER_RATIO;

    // Last section whose top has crossed the trigger line wins. Sections
    // without geometry are skipped. No qualifier means keep what we have.
    let mut active = None;
    for (id, section_theme) in document::sections() {
        let Some(rect) = document::rect_of(id) else {
            continue;
        };
        if rect.top <= trigger {
            active = Some(section_theme);
        }
    }

    if let Some(section_theme) = active {
        theme::set_active_theme(section_theme);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementId;
    use crate::theme::{active_theme, SectionTheme};
    use crate::types::{Rect, ScrollEvent};
    use std::time::{Duration, Instant};

    fn setup() -> Instant {
        crate::document::reset_document();
        crate::events::reset_events();
        crate::frame::reset_frame_state();
        crate::viewport::reset_viewport_state();
        crate::theme::reset_theme_state();

        viewport::set_viewport_size(1280.0, 1000.0);
        let t0 = Instant::now();
        frame::advance(t0);
        t0
    }

    /// Section with a movable top edge. Viewport-relative, 900 tall.
    fn create_section(top: f64, section_theme: SectionTheme) -> (ElementId, Rc<Cell<f64>>) {
        let id = document::create_element();
        let top_cell = Rc::new(Cell::new(top));
        let provider_top = top_cell.clone();
        document::set_rect_provider(id, move || {
            Rect::new(0.0, provider_top.get(), 1280.0, 900.0)
        });
        document::register_section(id, section_theme);
        (id, top_cell)
    }

    #[test]
    fn test_constants() {
        assert_eq!(SECTION_TRIGGER_RATIO, 0.7);
    }

    #[test]
    fn test_mount_evaluates_synchronously() {
        setup();
        create_section(0.0, SectionTheme::Dark);

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), Some(SectionTheme::Dark));
    }

    #[test]
    fn test_no_sections_leaves_theme_unset() {
        setup();

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), None);
    }

    #[test]
    fn test_section_below_trigger_line_does_not_qualify() {
        setup();
        // Trigger line at 700; this section's top is below it
        create_section(750.0, SectionTheme::Green);

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), None);
    }

    #[test]
    fn test_last_qualifying_section_wins() {
        setup();
        // Viewport 1000 tall, trigger at 700. First two qualify, third not.
        create_section(-600.0, SectionTheme::Light);
        create_section(0.0, SectionTheme::Dark);
        create_section(750.0, SectionTheme::Green);

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), Some(SectionTheme::Dark));
    }

    #[test]
    fn test_scroll_evaluations_are_frame_coalesced() {
        let t0 = setup();
        let (_, dark_top) = create_section(0.0, SectionTheme::Dark);
        let calls = Rc::new(Cell::new(0));

        // Second section counts its geometry reads
        let green = document::create_element();
        let green_top = Rc::new(Cell::new(800.0));
        let provider_top = green_top.clone();
        let provider_calls = calls.clone();
        document::set_rect_provider(green, move || {
            provider_calls.set(provider_calls.get() + 1);
            Rect::new(0.0, provider_top.get(), 1280.0, 900.0)
        });
        document::register_section(green, SectionTheme::Green);

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), Some(SectionTheme::Dark));
        let after_mount = calls.get();

        // Page scrolls down: both sections move up, second now qualifies
        dark_top.set(-800.0);
        green_top.set(0.0);
        events::dispatch_scroll(ScrollEvent::native(800.0));
        events::dispatch_scroll(ScrollEvent::native(810.0));
        events::dispatch_scroll(ScrollEvent::native(820.0));

        // Not evaluated yet: still the old theme, no geometry reads
        assert_eq!(active_theme(), Some(SectionTheme::Dark));
        assert_eq!(calls.get(), after_mount);

        // One frame pass, one evaluation
        frame::advance(t0 + Duration::from_millis(16));
        assert_eq!(active_theme(), Some(SectionTheme::Green));
        assert_eq!(calls.get(), after_mount + 1);
    }

    #[test]
    fn test_mutation_reevaluates_synchronously() {
        setup();
        create_section(0.0, SectionTheme::Dark);

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), Some(SectionTheme::Dark));

        // A later section appears already past the trigger line;
        // registration raises a mutation, no frame needed
        create_section(100.0, SectionTheme::Green);
        assert_eq!(active_theme(), Some(SectionTheme::Green));
    }

    #[test]
    fn test_theme_retained_when_nothing_qualifies() {
        let t0 = setup();
        let (_, top) = create_section(0.0, SectionTheme::Dark);

        let _observer = ThemeObserver::mount();
        assert_eq!(active_theme(), Some(SectionTheme::Dark));

        // Scrolled back above the section: nothing qualifies, theme stays
        top.set(900.0);
        events::dispatch_scroll(ScrollEvent::native(0.0));
        frame::advance(t0 + Duration::from_millis(16));
        assert_eq!(active_theme(), Some(SectionTheme::Dark));
    }

    #[test]
    fn test_unmount_clears_theme_and_cancels_pending() {
        let t0 = setup();
        let (_, top) = create_section(0.0, SectionTheme::Dark);

        let observer = ThemeObserver::mount();
        assert_eq!(active_theme(), Some(SectionTheme::Dark));

        // A scroll evaluation is pending when the observer unmounts
        top.set(100.0);
        events::dispatch_scroll(ScrollEvent::native(50.0));
        observer.unmount();
        assert_eq!(active_theme(), None);

        // The pending evaluation was canceled, not just outrun
        frame::advance(t0 + Duration::from_millis(16));
        assert_eq!(active_theme(), None);
    }

    #[test]
    fn test_drop_detaches_listeners() {
        setup();
        create_section(0.0, SectionTheme::Dark);

        {
            let _observer = ThemeObserver::mount();
            assert_eq!(active_theme(), Some(SectionTheme::Dark));
        }

        assert_eq!(active_theme(), None);
        assert_eq!(events::scroll_handler_count(), 0);
    }
}
