//! Hover Crossfade - poster/video swap with async playback
//!
//! Models the hover preview pattern: a poster image sits on top of a
//! video, pointer enter fades the video in and starts playback, pointer
//! leave fades the poster back and rewinds. Starting playback is
//! asynchronous on real media backends and may settle after the pointer
//! has already left, so the controller tracks a pending phase and a
//! deferred-leave flag instead of assuming commands take effect
//! immediately.
//!
//! The controller itself never touches media; it emits [`MediaCommand`]s
//! into a host-supplied sink and is told how the play attempt settled via
//! [`HoverCrossfade::play_settled`].

use std::cell::Cell;

use spark_signals::{signal, Signal};
use thiserror::Error;
use tracing::{debug, warn};

// =============================================================================
// TYPES
// =============================================================================

/// Where the video element is in its playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Paused at the start, poster showing.
    Idle,
    /// A play command was issued and has not settled yet.
    Pending,
    /// Playback is running.
    Playing,
}

/// Command for the host's media backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCommand {
    Play,
    Pause,
    SeekToStart,
}

/// How a play attempt failed.
///
/// Interruption is the ordinary hover-out race and logs at debug; the
/// other classes indicate something actually wrong with the media or the
/// host's autoplay policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("playback start interrupted")]
    Interrupted,
    #[error("playback not allowed by media policy")]
    NotAllowed,
    #[error("media could not be decoded")]
    Decode,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Pointer-driven poster/video crossfade.
///
/// Opacity follows the pointer immediately; playback follows it through
/// the async settle protocol. A leave that arrives while a play attempt
/// is still pending is remembered and applied when the attempt settles,
/// so the video never keeps playing under the poster.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use scrollstage::motion::{HoverCrossfade, MediaCommand, PlaybackPhase};
///
/// let commands: Rc<RefCell<Vec<MediaCommand>>> = Rc::new(RefCell::new(Vec::new()));
/// let sink = commands.clone();
/// let crossfade = HoverCrossfade::new(move |command| sink.borrow_mut().push(command));
///
/// crossfade.pointer_enter();
/// assert_eq!(crossfade.phase(), PlaybackPhase::Pending);
/// assert_eq!(crossfade.video_opacity(), 1.0);
///
/// crossfade.play_settled(Ok(()));
/// assert_eq!(crossfade.phase(), PlaybackPhase::Playing);
/// assert_eq!(*commands.borrow(), vec![MediaCommand::Play]);
/// ```
pub struct HoverCrossfade {
    hovered: Signal<bool>,
    phase: Signal<PlaybackPhase>,
    leave_pending: Cell<bool>,
    sink: Box<dyn Fn(MediaCommand)>,
}

impl HoverCrossfade {
    pub fn new(sink: impl Fn(MediaCommand) + 'static) -> Self {
        Self {
            hovered: signal(false),
            phase: signal(PlaybackPhase::Idle),
            leave_pending: Cell::new(false),
            sink: Box::new(sink),
        }
    }

    /// Pointer entered the media area.
    pub fn pointer_enter(&self) {
        self.hovered.set(true);
        self.leave_pending.set(false);

        if self.phase.get() == PlaybackPhase::Idle {
            self.phase.set(PlaybackPhase::Pending);
            (self.sink)(MediaCommand::Play);
        }
    }

    /// Pointer left the media area.
    pub fn pointer_leave(&self) {
        self.hovered.set(false);

        match self.phase.get() {
            PlaybackPhase::Pending => {
                // Let the in-flight play settle first, then undo it
                self.leave_pending.set(true);
            }
            PlaybackPhase::Playing => {
                (self.sink)(MediaCommand::Pause);
                (self.sink)(MediaCommand::SeekToStart);
                self.phase.set(PlaybackPhase::Idle);
            }
            PlaybackPhase::Idle => {
                (self.sink)(MediaCommand::Pause);
                (self.sink)(MediaCommand::SeekToStart);
            }
        }
    }

    /// The host reports how the pending play attempt settled.
    pub fn play_settled(&self, result: Result<(), MediaError>) {
        match result {
            Ok(()) => {
                if self.leave_pending.replace(false) {
                    (self.sink)(MediaCommand::Pause);
                    (self.sink)(MediaCommand::SeekToStart);
                    self.phase.set(PlaybackPhase::Idle);
                } else {
                    self.phase.set(PlaybackPhase::Playing);
                }
            }
            Err(error) => {
                match error {
                    MediaError::Interrupted => debug!(%error, "play attempt interrupted"),
                    MediaError::NotAllowed | MediaError::Decode => {
                        warn!(%error, "play attempt failed")
                    }
                }
                if self.leave_pending.replace(false) {
                    // Nothing ever played, only the position needs resetting
                    (self.sink)(MediaCommand::SeekToStart);
                }
                self.phase.set(PlaybackPhase::Idle);
            }
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered.get()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase.get()
    }

    /// Video layer opacity. Tracks the pointer directly so the fade never
    /// waits on playback.
    pub fn video_opacity(&self) -> f64 {
        if self.hovered.get() { 1.0 } else { 0.0 }
    }

    /// Poster layer opacity, the complement of the video's.
    pub fn poster_opacity(&self) -> f64 {
        1.0 - self.video_opacity()
    }

    pub fn hovered_signal(&self) -> Signal<bool> {
        self.hovered.clone()
    }

    pub fn phase_signal(&self) -> Signal<PlaybackPhase> {
        self.phase.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
