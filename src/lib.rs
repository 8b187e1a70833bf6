//! # scrollstage
//!
//! Scroll-driven orchestration for reactive hosts.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! The host owns rendering and real input; this crate owns everything
//! between a scroll event and the values the host paints with. The host
//! registers elements with rect providers, feeds in scroll, resize and
//! media events, and advances the frame clock once per frame. Native and
//! virtual scrolling land in one unified stream, so triggers and
//! controllers never care which one is active:
//!
//! ```text
//! host events → unified scroll stream → triggers → controllers → signals → host render
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Rect, ScrollEvent, Cleanup)
//! - [`document`] - Element registry, rect providers, section index
//! - [`scroll`] - Scroll bridge with a pluggable smooth-scroll engine
//! - [`trigger`] - Visibility triggers over the unified scroll stream
//! - [`theme`] - Scroll-position driven section theming
//! - [`motion`] - Animation controllers (staggers, counters, carousel, ...)

pub mod document;
pub mod events;
pub mod frame;
pub mod motion;
pub mod scroll;
pub mod theme;
pub mod trigger;
pub mod types;
pub mod viewport;

// Re-export commonly used items
pub use types::*;

pub use document::{
    create_element, is_attached, notify_subtree_changed, on_mutation, rect_of,
    register_section, remove_element, reset_document, sections, set_rect_provider, ElementId,
};

pub use events::{
    dispatch_media_load, dispatch_scroll, last_scroll_event, on_media_load, on_resize,
    on_scroll, reset_events, scroll_signal,
};

pub use frame::{
    advance, cancel_frame, clear_interval, clear_timeout, now, request_frame,
    reset_frame_state, set_interval, set_timeout, FrameRequest, TimerHandle,
};

pub use viewport::{
    height_signal, reset_viewport_state, set_viewport_size, viewport_height, viewport_rect,
    viewport_width, width_signal,
};

pub use scroll::{
    current_offset, engine_installed, reset_bridge_state, reset_scroll_engine, BridgeError,
    GeometryHandle, InertialEngine, ScrollBridge, ScrollEngine,
};

pub use trigger::{
    observe, reset_triggers, RootMargin, RootMarginError, TriggerEntry, TriggerOptions,
};

pub use theme::{
    active_theme, reset_theme_state, theme_signal, ParseThemeError, SectionTheme, ThemeObserver,
};

pub use motion::{
    // Text entrances
    FadeReveal, LineStagger, WordStagger,
    // Emphasis
    CountUp, HighlightReveal, StaggerThenHighlight,
    // Media
    HoverCrossfade, MediaCommand, MediaError, PlaybackPhase, VideoScale,
    // Rails and slides
    Carousel, CarouselExtent, Rotator,
    // Shared parameters
    AnimationSpec, Easing,
};
