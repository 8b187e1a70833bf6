//! Document Model - the host page as the engine sees it
//!
//! The engine is headless: it never touches a real DOM. Instead the host
//! registers opaque [`ElementId`]s and attaches rect providers (closures
//! reporting current viewport-relative geometry). Consumers query geometry
//! through [`rect_of`] and never cache it, so layout changes on the host
//! side are picked up on the next read.
//!
//! Structural changes (a section appearing, an element leaving) raise
//! mutation notifications. Geometry changes do not; hosts signal those
//! through resize or media-load events on the hub, and scroll-driven
//! consumers re-read geometry every frame anyway.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::theme::SectionTheme;
use crate::types::Rect;

// =============================================================================
// ELEMENT IDENTITY
// =============================================================================

/// Opaque handle for a host element.
///
/// Allocated by [`create_element`]; stays unique for the life of the
/// document state (ids are never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

// =============================================================================
// DOCUMENT STATE
// =============================================================================

type RectProvider = Box<dyn Fn() -> Rect>;
type MutationHandler = Rc<dyn Fn()>;

struct DocumentState {
    alive: HashSet<ElementId>,
    providers: HashMap<ElementId, RectProvider>,
    /// Theme sections in document order (registration order).
    sections: Vec<(ElementId, SectionTheme)>,
    mutation_handlers: Vec<(usize, MutationHandler)>,
    next_element: u64,
    next_handler: usize,
}

impl DocumentState {
    fn new() -> Self {
        Self {
            alive: HashSet::new(),
            providers: HashMap::new(),
            sections: Vec::new(),
            mutation_handlers: Vec::new(),
            next_element: 0,
            next_handler: 0,
        }
    }
}

thread_local! {
    static DOCUMENT: RefCell<DocumentState> = RefCell::new(DocumentState::new());
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// Register a new element and return its handle.
pub fn create_element() -> ElementId {
    DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        let id = ElementId(doc.next_element);
        doc.next_element += 1;
        doc.alive.insert(id);
        id
    })
}

/// Whether the element is still part of the document.
pub fn is_attached(id: ElementId) -> bool {
    DOCUMENT.with(|doc| doc.borrow().alive.contains(&id))
}

/// Attach a geometry provider for an element.
///
/// The provider reports the element's current viewport-relative rect and is
/// re-invoked on every [`rect_of`] call. Attaching to a removed element is
/// a no-op.
pub fn set_rect_provider<F>(id: ElementId, provider: F)
where
    F: Fn() -> Rect + 'static,
{
    DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        if !doc.alive.contains(&id) {
            debug!(?id, "rect provider for detached element ignored");
            return;
        }
        doc.providers.insert(id, Box::new(provider));
    });
}

/// Current geometry of an element, or `None` if it has been removed or
/// never reported geometry.
pub fn rect_of(id: ElementId) -> Option<Rect> {
    DOCUMENT.with(|doc| {
        let doc = doc.borrow();
        if !doc.alive.contains(&id) {
            return None;
        }
        doc.providers.get(&id).map(|provider| provider())
    })
}

/// Remove an element from the document.
///
/// Strips its provider and any section registration, then raises a
/// mutation notification. Removing an already-removed element is a no-op.
pub fn remove_element(id: ElementId) {
    let removed = DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        if !doc.alive.remove(&id) {
            return false;
        }
        doc.providers.remove(&id);
        doc.sections.retain(|(section, _)| *section != id);
        true
    });

    if removed {
        notify_subtree_changed();
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Mark an element as a theme section.
///
/// Sections are kept in registration order, which stands in for document
/// order when the active theme is resolved. Re-registering an element
/// updates its theme in place without changing its position. Raises a
/// mutation notification.
pub fn register_section(id: ElementId, theme: SectionTheme) {
    let registered = DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        if !doc.alive.contains(&id) {
            debug!(?id, "section registration for detached element ignored");
            return false;
        }
        if let Some(entry) = doc.sections.iter_mut().find(|(section, _)| *section == id) {
            entry.1 = theme;
        } else {
            doc.sections.push((id, theme));
        }
        true
    });

    if registered {
        notify_subtree_changed();
    }
}

/// All registered sections in document order.
pub fn sections() -> Vec<(ElementId, SectionTheme)> {
    DOCUMENT.with(|doc| doc.borrow().sections.clone())
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Subscribe to document structure changes. Returns a cleanup function.
pub fn on_mutation<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    let id = DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        let id = doc.next_handler;
        doc.next_handler += 1;
        doc.mutation_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        DOCUMENT.with(|doc| {
            doc.borrow_mut()
                .mutation_handlers
                .retain(|(i, _)| *i != id);
        });
    }
}

/// Raise a mutation notification.
///
/// Fired automatically by [`register_section`] and [`remove_element`];
/// hosts call it directly when they restructure content the engine cannot
/// see (swapping children, reordering lists).
pub fn notify_subtree_changed() {
    let handlers: Vec<MutationHandler> = DOCUMENT.with(|doc| {
        doc.borrow()
            .mutation_handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect()
    });

    for handler in handlers {
        handler();
    }
}

// =============================================================================
// RESET
// =============================================================================

/// Drop all elements, sections, and handlers (for testing).
pub fn reset_document() {
    DOCUMENT.with(|doc| {
        *doc.borrow_mut() = DocumentState::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
