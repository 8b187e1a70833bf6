//! Scroll Bridge - unifies native and virtual scrolling
//!
//! # Architecture
//!
//! The bridge owns the lifecycle of the virtual scroll engine. Hosts mount
//! it early; the engine itself typically arrives later (it is loaded
//! lazily on the web). Until then the page scrolls natively and
//! [`ScrollBridge::scroll_to`] degrades to an instant native jump.
//!
//! Once [`ScrollBridge::engine_loaded`] installs an engine, the bridge:
//!
//! - steps the engine once per frame and publishes every moving step as a
//!   virtual scroll event, so scroll consumers see one unified stream
//! - re-measures scroll geometry on resize, on media loads, and at a few
//!   fixed delays after load, because layout keeps shifting while fonts,
//!   images, and late content settle
//!
//! Unmounting stops the frame loop, cancels the re-measure timers, and
//! clears the global engine slot, leaving the page native-only again.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::events;
use crate::frame::{self, TimerHandle};
use crate::scroll::engine::{self, ScrollEngine};
use crate::types::{Cleanup, ScrollEvent, ScrollSource};

/// Delays after engine load at which geometry is re-measured.
const RECOMPUTE_DELAYS_MS: [u64; 3] = [100, 500, 1000];

/// Errors mounting the bridge or installing an engine.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("a scroll bridge is already mounted")]
    AlreadyMounted,
    #[error("a scroll engine is already installed")]
    EngineAlreadyInstalled,
}

thread_local! {
    static BRIDGE_ACTIVE: Cell<bool> = Cell::new(false);
}

// =============================================================================
// BRIDGE
// =============================================================================

/// Owner of the virtual scroll engine lifecycle. At most one may be
/// mounted at a time.
pub struct ScrollBridge {
    active: bool,
    running: Rc<Cell<bool>>,
    cleanups: Vec<Cleanup>,
    recompute_timers: Vec<TimerHandle>,
}

impl ScrollBridge {
    /// Mount the bridge. Fails if another bridge is already mounted.
    pub fn mount() -> Result<Self, BridgeError> {
        let already = BRIDGE_ACTIVE.with(|active| active.replace(true));
        if already {
            return Err(BridgeError::AlreadyMounted);
        }

        Ok(Self {
            active: true,
            running: Rc::new(Cell::new(false)),
            cleanups: Vec::new(),
            recompute_timers: Vec::new(),
        })
    }

    /// Install the lazily loaded engine and start driving it.
    ///
    /// Fails if an engine is already installed (the slot is global and
    /// exclusive).
    pub fn engine_loaded(&mut self, scroll_engine: Box<dyn ScrollEngine>) -> Result<(), BridgeError> {
        if !engine::install_engine(scroll_engine) {
            return Err(BridgeError::EngineAlreadyInstalled);
        }

        self.cleanups.push(Box::new(events::on_resize(|| {
            engine::with_engine(|e| e.recompute_geometry());
        })));
        self.cleanups.push(Box::new(events::on_media_load(|_| {
            engine::with_engine(|e| e.recompute_geometry());
        })));

        // Layout keeps settling after load; re-measure a few times on a
        // fixed schedule to catch late shifts
        for delay in RECOMPUTE_DELAYS_MS {
            self.recompute_timers
                .push(frame::set_timeout(Duration::from_millis(delay), || {
                    engine::with_engine(|e| e.recompute_geometry());
                }));
        }

        self.running.set(true);
        schedule_engine_tick(self.running.clone());
        Ok(())
    }

    /// Scroll to an absolute offset.
    ///
    /// With an engine installed this animates; without one it degrades to
    /// an instant native jump, reported through the event hub so scroll
    /// consumers stay in sync either way.
    pub fn scroll_to(&self, target: f64) {
        let handled = engine::with_engine(|e| e.scroll_to(target)).is_some();
        if !handled {
            debug!(target, "no scroll engine loaded, jumping natively");
            events::dispatch_scroll(ScrollEvent::native(target.max(0.0)));
        }
    }

    /// Whether an engine is currently installed.
    pub fn has_engine(&self) -> bool {
        engine::engine_installed()
    }

    /// Unmount: stop the frame loop, cancel timers, drop the engine.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        self.running.set(false);
        for timer in self.recompute_timers.drain(..) {
            frame::clear_timeout(timer);
        }
        for cleanup in self.cleanups.drain(..) {
            cleanup();
        }
        engine::clear_engine();
        BRIDGE_ACTIVE.with(|active| active.set(false));
    }
}

impl Drop for ScrollBridge {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Self-rescheduling frame loop. One step per frame while `running`; a
/// cleared flag lets the pending callback die quietly.
fn schedule_engine_tick(running: Rc<Cell<bool>>) {
    frame::request_frame(move |now| {
        if !running.get() {
            return;
        }
        let stepped = engine::with_engine(|e| e.step(now)).flatten();
        if let Some(offset) = stepped {
            events::dispatch_scroll(ScrollEvent::new(offset, ScrollSource::Virtual));
        }
        schedule_engine_tick(running);
    });
}

/// Release the bridge mount flag (for testing).
pub fn reset_bridge_state() {
    BRIDGE_ACTIVE.with(|active| active.set(false));
}

// =============================================================================
// TESTS
// =============================================================================
