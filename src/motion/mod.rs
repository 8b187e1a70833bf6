//! Motion Controllers - scroll-driven animation state machines
//!
//! Each controller owns the state for one animation pattern: it mounts
//! against a document element, wires itself to triggers or events, and
//! exposes pure sampling functions (or signals) the host reads every frame
//! to drive actual rendering. Controllers never render anything themselves.
//!
//! All controllers follow the same lifecycle: `mount` wires listeners and
//! returns the controller; `unmount` (or drop) detaches everything. A
//! controller mounted on a missing element stays inert instead of failing.

pub mod carousel;
pub mod countup;
pub mod crossfade;
pub mod easing;
pub mod highlight;
pub mod reveal;
pub mod rotator;
pub mod scale;
pub mod spec;
pub mod stagger;
pub mod text;

pub use carousel::{Carousel, CarouselExtent, CARD_GAP, CARD_WIDTH, SCROLL_STEP};
pub use countup::CountUp;
pub use crossfade::{HoverCrossfade, MediaCommand, MediaError, PlaybackPhase};
pub use easing::Easing;
pub use highlight::{HighlightOptions, HighlightReveal, StaggerThenHighlight};
pub use reveal::FadeReveal;
pub use rotator::Rotator;
pub use scale::VideoScale;
pub use spec::AnimationSpec;
pub use stagger::{LineStagger, WordStagger, REVEAL_THRESHOLD};
