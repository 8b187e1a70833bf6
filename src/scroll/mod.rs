//! Scroll Pipeline - unified native and virtual scrolling
//!
//! Native scroll comes straight from the host through the event hub. When
//! smooth scrolling is wanted, the [`bridge::ScrollBridge`] installs a
//! [`engine::ScrollEngine`] and republishes its per-frame steps on the same
//! channel, so scroll consumers never distinguish the two.

pub mod bridge;
pub mod engine;

pub use bridge::{reset_bridge_state, BridgeError, ScrollBridge};
pub use engine::{
    current_offset, engine_installed, reset_scroll_engine, GeometryHandle, InertialEngine,
    ScrollEngine, SCROLL_LERP,
};
