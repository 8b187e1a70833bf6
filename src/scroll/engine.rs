//! Scroll Engine - virtual scroll position animation
//!
//! A scroll engine owns the virtual scroll position while smooth scrolling
//! is active. The bridge steps it once per frame; each step that moves the
//! position is published as a virtual scroll event, so consumers never need
//! to care whether the host or the engine produced a scroll.
//!
//! [`InertialEngine`] is the stock implementation: an exponential approach
//! that covers a fixed fraction of the remaining distance per frame, with a
//! final snap once the remainder drops under a pixel fraction.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

// =============================================================================
// ENGINE TRAIT
// =============================================================================

/// A virtual scroll position animator.
pub trait ScrollEngine {
    /// Begin animating toward `target`. Targets are clamped to the
    /// scrollable range.
    fn scroll_to(&mut self, target: f64);

    /// Advance one frame. Returns the new offset while the position is
    /// moving (including the final settling step), `None` when idle.
    fn step(&mut self, now: Instant) -> Option<f64>;

    /// Current virtual offset.
    fn offset(&self) -> f64;

    /// Re-read the scrollable extent and re-clamp. Called after layout
    /// changes: resize, media load, late hydration.
    fn recompute_geometry(&mut self);
}

// =============================================================================
// INERTIAL ENGINE
// =============================================================================

/// Fraction of the remaining distance covered per frame.
pub const SCROLL_LERP: f64 = 0.1;

/// Remaining distance below which the engine snaps to the target.
const SETTLE_EPSILON: f64 = 0.1;

/// Exponential-approach scroll engine.
///
/// The scrollable limit comes from a provider closure so the engine can
/// re-measure after layout changes without owning any layout itself.
///
/// # Example
///
/// ```
/// use std::time::Instant;
/// use scrollstage::scroll::{InertialEngine, ScrollEngine, SCROLL_LERP};
///
/// let mut engine = InertialEngine::new(|| 5000.0);
/// engine.scroll_to(1000.0);
///
/// let first = engine.step(Instant::now()).unwrap();
/// assert!((first - 1000.0 * SCROLL_LERP).abs() < 1e-9);
///
/// while engine.step(Instant::now()).is_some() {}
/// assert_eq!(engine.offset(), 1000.0);
/// ```
pub struct InertialEngine {
    current: f64,
    target: f64,
    limit: f64,
    limit_provider: Box<dyn Fn() -> f64>,
    moving: bool,
}

impl InertialEngine {
    /// Create an engine at offset zero. The provider reports the maximum
    /// scrollable offset (content height minus viewport height).
    pub fn new<F>(limit_provider: F) -> Self
    where
        F: Fn() -> f64 + 'static,
    {
        let limit = limit_provider().max(0.0);
        Self {
            current: 0.0,
            target: 0.0,
            limit,
            limit_provider: Box::new(limit_provider),
            moving: false,
        }
    }
}

impl ScrollEngine for InertialEngine {
    fn scroll_to(&mut self, target: f64) {
        self.target = target.clamp(0.0, self.limit);
        if self.target != self.current {
            self.moving = true;
        }
    }

    fn step(&mut self, _now: Instant) -> Option<f64> {
        if !self.moving {
            return None;
        }

        let remaining = self.target - self.current;
        if remaining.abs() <= SETTLE_EPSILON {
            self.current = self.target;
            self.moving = false;
        } else {
            self.current += remaining * SCROLL_LERP;
        }
        Some(self.current)
    }

    fn offset(&self) -> f64 {
        self.current
    }

    fn recompute_geometry(&mut self) {
        self.limit = (self.limit_provider)().max(0.0);
        self.target = self.target.clamp(0.0, self.limit);
        if self.current > self.limit {
            // Content shrank under us: snap, do not animate
            self.current = self.limit;
        }
        if self.target == self.current {
            self.moving = false;
        }
    }
}

// =============================================================================
// ENGINE SLOT
// =============================================================================

type SharedEngine = Rc<RefCell<Box<dyn ScrollEngine>>>;

thread_local! {
    static ENGINE: RefCell<Option<SharedEngine>> = RefCell::new(None);
}

/// Install an engine into the global slot. Returns `false` if one is
/// already installed.
pub(crate) fn install_engine(engine: Box<dyn ScrollEngine>) -> bool {
    ENGINE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(Rc::new(RefCell::new(engine)));
        true
    })
}

/// Remove the installed engine, if any.
pub(crate) fn clear_engine() {
    ENGINE.with(|slot| {
        *slot.borrow_mut() = None;
    });
}

/// Run `f` against the installed engine. `None` when no engine is loaded.
pub(crate) fn with_engine<T>(f: impl FnOnce(&mut dyn ScrollEngine) -> T) -> Option<T> {
    // Clone the handle out so `f` may dispatch events that reach back here.
    let engine = ENGINE.with(|slot| slot.borrow().clone());
    engine.map(|engine| {
        let mut engine = engine.borrow_mut();
        f(&mut **engine)
    })
}

/// Whether a virtual scroll engine is currently installed.
pub fn engine_installed() -> bool {
    ENGINE.with(|slot| slot.borrow().is_some())
}

/// Current virtual scroll offset, `None` without an engine.
pub fn current_offset() -> Option<f64> {
    with_engine(|engine| engine.offset())
}

/// Clear the engine slot (for testing).
pub fn reset_scroll_engine() {
    clear_engine();
}

// =============================================================================
// GEOMETRY HANDLE
// =============================================================================

/// Hook for asking the scroll engine to re-measure its extent.
///
/// Controllers that change layout (media that finishes loading, content
/// that resizes itself) hold one of these. The [`disconnected`] variant
/// swallows refreshes, so controllers work unchanged when smooth scrolling
/// never loads; [`shared`] consults the live engine slot on every call.
///
/// [`disconnected`]: GeometryHandle::disconnected
/// [`shared`]: GeometryHandle::shared
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryHandle {
    connected: bool,
}

impl GeometryHandle {
    /// A handle that ignores refreshes.
    pub fn disconnected() -> Self {
        Self { connected: false }
    }

    /// A handle that forwards refreshes to whatever engine is installed
    /// at call time.
    pub fn shared() -> Self {
        Self { connected: true }
    }

    /// Ask the engine to re-measure. No-op when disconnected or when no
    /// engine is installed.
    pub fn refresh(&self) {
        if self.connected {
            with_engine(|engine| engine.recompute_geometry());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
