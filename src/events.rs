//! Event Hub - host event ingestion and fan-out
//!
//! The host feeds raw events in through the `dispatch_*` functions and
//! engine code subscribes with the `on_*` functions. Handlers are plain
//! callbacks; each registration returns a cleanup closure that removes it.
//!
//! Dispatch is synchronous fan-out over a snapshot of the handler list, so
//! a handler may register or remove handlers (including itself) without
//! affecting the current dispatch. Consumers that want per-frame coalescing
//! do it themselves via [`crate::frame::request_frame`].
//!
//! The most recent scroll event is also mirrored into a signal for
//! reactive consumers, see [`last_scroll_event`].

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::document::ElementId;
use crate::types::ScrollEvent;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

type ScrollHandler = Rc<dyn Fn(ScrollEvent)>;
type ResizeHandler = Rc<dyn Fn()>;
type MediaLoadHandler = Rc<dyn Fn(ElementId)>;

struct EventHub {
    scroll_handlers: Vec<(usize, ScrollHandler)>,
    resize_handlers: Vec<(usize, ResizeHandler)>,
    media_load_handlers: Vec<(usize, MediaLoadHandler)>,
    next_id: usize,
}

impl EventHub {
    fn new() -> Self {
        Self {
            scroll_handlers: Vec::new(),
            resize_handlers: Vec::new(),
            media_load_handlers: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static HUB: RefCell<EventHub> = RefCell::new(EventHub::new());

    /// Most recent scroll event, unified across native and virtual sources.
    static LAST_SCROLL: Signal<Option<ScrollEvent>> = signal(None);
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Subscribe to unified scroll events.
///
/// Fires for every dispatched scroll event, native or virtual. Returns a
/// cleanup function that removes the handler.
///
/// # Example
///
/// ```
/// use scrollstage::events;
///
/// let unsubscribe = events::on_scroll(|event| {
///     println!("scrolled to {}", event.offset);
/// });
///
/// // Later
/// unsubscribe();
/// ```
pub fn on_scroll<F>(handler: F) -> impl FnOnce()
where
    F: Fn(ScrollEvent) + 'static,
{
    let id = HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        let id = hub.next_id();
        hub.scroll_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        HUB.with(|hub| {
            hub.borrow_mut().scroll_handlers.retain(|(i, _)| *i != id);
        });
    }
}

/// Subscribe to viewport resize notifications.
pub fn on_resize<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    let id = HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        let id = hub.next_id();
        hub.resize_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        HUB.with(|hub| {
            hub.borrow_mut().resize_handlers.retain(|(i, _)| *i != id);
        });
    }
}

/// Subscribe to media load notifications (images or videos that finished
/// loading and may have changed document geometry).
pub fn on_media_load<F>(handler: F) -> impl FnOnce()
where
    F: Fn(ElementId) + 'static,
{
    let id = HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        let id = hub.next_id();
        hub.media_load_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        HUB.with(|hub| {
            hub.borrow_mut()
                .media_load_handlers
                .retain(|(i, _)| *i != id);
        });
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a scroll event to all scroll handlers.
///
/// Called by the host for native scroll input and by the scroll bridge for
/// virtual engine frames. Handlers run synchronously in registration order.
pub fn dispatch_scroll(event: ScrollEvent) {
    LAST_SCROLL.with(|s| s.set(Some(event)));

    let handlers: Vec<ScrollHandler> = HUB.with(|hub| {
        hub.borrow()
            .scroll_handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect()
    });

    for handler in handlers {
        handler(event);
    }
}

/// Dispatch a media load notification for an element.
pub fn dispatch_media_load(element: ElementId) {
    let handlers: Vec<MediaLoadHandler> = HUB.with(|hub| {
        hub.borrow()
            .media_load_handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect()
    });

    for handler in handlers {
        handler(element);
    }
}

/// Dispatch a resize notification. Fired by the viewport module when the
/// host reports a new size.
pub(crate) fn dispatch_resize() {
    let handlers: Vec<ResizeHandler> = HUB.with(|hub| {
        hub.borrow()
            .resize_handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect()
    });

    for handler in handlers {
        handler();
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// The most recent scroll event, if any has been dispatched.
pub fn last_scroll_event() -> Option<ScrollEvent> {
    LAST_SCROLL.with(|s| s.get())
}

/// Signal holding the most recent scroll event, for reactive consumers.
pub fn scroll_signal() -> Signal<Option<ScrollEvent>> {
    LAST_SCROLL.with(|s| s.clone())
}

/// Number of registered scroll handlers (for testing).
pub fn scroll_handler_count() -> usize {
    HUB.with(|hub| hub.borrow().scroll_handlers.len())
}

/// Reset all handlers and the last scroll event (for testing).
pub fn reset_events() {
    HUB.with(|hub| {
        let mut hub = hub.borrow_mut();
        hub.scroll_handlers.clear();
        hub.resize_handlers.clear();
        hub.media_load_handlers.clear();
        hub.next_id = 0;
    });
    LAST_SCROLL.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================
