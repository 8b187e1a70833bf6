//! Frame Scheduler - host-driven animation clock
//!
//! The engine never spins its own loop. The host calls [`advance`] once per
//! animation frame with the current time, and everything scheduled in here
//! runs inside that call:
//!
//! - Frame callbacks: one-shot, run on the next `advance` after registration.
//!   Callbacks registered *during* a pass wait for the following pass, so a
//!   self-rescheduling callback runs exactly once per frame.
//! - Timeouts: one-shot, run on the first `advance` at or past their due time.
//! - Intervals: repeating, re-armed relative to the pass that fired them, so
//!   a long gap between frames fires each interval at most once (no burst
//!   catch-up).
//!
//! Within a pass the order is: frame callbacks, then due timeouts (by due
//! time), then due intervals. Canceling a not-yet-run entry from inside a
//! callback prevents it from running, even in the same pass.
//!
//! Time is whatever the host says it is. [`now`] reports the instant of the
//! most recent `advance`; between calls, time stands still. Tests drive this
//! with fabricated instants instead of sleeping.

use std::cell::RefCell;
use std::cell::RefMut;
use std::rc::Rc;
use std::time::{Duration, Instant};

// =============================================================================
// HANDLES
// =============================================================================

/// Handle for a pending frame callback. Pass to [`cancel_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(usize);

/// Handle for a pending timeout or interval.
///
/// Pass to [`clear_timeout`] / [`clear_interval`]. Clearing an entry that
/// already ran (or was already cleared) is a safe no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(usize);

// =============================================================================
// SCHEDULER STATE
// =============================================================================

struct TimeoutEntry {
    id: usize,
    due: Instant,
    callback: Box<dyn FnOnce()>,
}

struct IntervalEntry {
    id: usize,
    due: Instant,
    period: Duration,
    callback: Rc<RefCell<dyn FnMut()>>,
}

struct FrameScheduler {
    now: Option<Instant>,
    frame_callbacks: Vec<(usize, Box<dyn FnOnce(Instant)>)>,
    timeouts: Vec<TimeoutEntry>,
    intervals: Vec<IntervalEntry>,
    next_id: usize,
}

impl FrameScheduler {
    fn new() -> Self {
        Self {
            now: None,
            frame_callbacks: Vec::new(),
            timeouts: Vec::new(),
            intervals: Vec::new(),
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
    static SCHEDULER: RefCell<FrameScheduler> = RefCell::new(FrameScheduler::new());
}

fn with_scheduler<T>(f: impl FnOnce(RefMut<'_, FrameScheduler>) -> T) -> T {
    SCHEDULER.with(|s| f(s.borrow_mut()))
}

// =============================================================================
// PUBLIC API - TIME
// =============================================================================

/// The engine's current time: the instant of the most recent [`advance`].
///
/// Before the first `advance`, anchors to the wall clock once and holds
/// there, so schedules created during setup stay internally consistent.
pub fn now() -> Instant {
    with_scheduler(|mut s| {
        if let Some(now) = s.now {
            now
        } else {
            let anchor = Instant::now();
            s.now = Some(anchor);
            anchor
        }
    })
}

// =============================================================================
// PUBLIC API - SCHEDULING
// =============================================================================

/// Schedule a callback for the next frame pass.
///
/// The callback receives the pass's timestamp. Runs once; re-register from
/// inside the callback to tick every frame.
pub fn request_frame<F>(callback: F) -> FrameRequest
where
    F: FnOnce(Instant) + 'static,
{
    with_scheduler(|mut s| {
        let id = s.next_id();
        s.frame_callbacks.push((id, Box::new(callback)));
        FrameRequest(id)
    })
}

/// Cancel a pending frame callback. No-op if it already ran.
pub fn cancel_frame(request: FrameRequest) {
    with_scheduler(|mut s| {
        s.frame_callbacks.retain(|(id, _)| *id != request.0);
    });
}

/// Schedule a one-shot callback `delay` after the current engine time.
pub fn set_timeout<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + 'static,
{
    let due = now() + delay;
    with_scheduler(|mut s| {
        let id = s.next_id();
        s.timeouts.push(TimeoutEntry {
            id,
            due,
            callback: Box::new(callback),
        });
        TimerHandle(id)
    })
}

/// Cancel a pending timeout. No-op if it already fired.
pub fn clear_timeout(handle: TimerHandle) {
    with_scheduler(|mut s| {
        s.timeouts.retain(|t| t.id != handle.0);
    });
}

/// Schedule a repeating callback every `period`, starting one period from
/// the current engine time.
pub fn set_interval<F>(period: Duration, callback: F) -> TimerHandle
where
    F: FnMut() + 'static,
{
    let due = now() + period;
    with_scheduler(|mut s| {
        let id = s.next_id();
        s.intervals.push(IntervalEntry {
            id,
            due,
            period,
            callback: Rc::new(RefCell::new(callback)),
        });
        TimerHandle(id)
    })
}

/// Stop a repeating interval. No-op if already stopped.
pub fn clear_interval(handle: TimerHandle) {
    with_scheduler(|mut s| {
        s.intervals.retain(|i| i.id != handle.0);
    });
}

// =============================================================================
// PUBLIC API - THE PUMP
// =============================================================================

/// Run one frame pass at the given time.
///
/// The host calls this once per animation frame. `now` must be monotonic
/// across calls; passing an earlier instant simply finds nothing new due.
///
/// Must not be called re-entrantly from inside a scheduled callback.
pub fn advance(now: Instant) {
    with_scheduler(|mut s| s.now = Some(now));

    run_frame_callbacks(now);
    run_due_timeouts(now);
    run_due_intervals(now);
}

fn run_frame_callbacks(now: Instant) {
    // Snapshot ids first: callbacks registered during this pass run next
    // frame, and a cancel from inside a callback still takes effect.
    let ids: Vec<usize> = with_scheduler(|s| s.frame_callbacks.iter().map(|(id, _)| *id).collect());

    for id in ids {
        let callback = with_scheduler(|mut s| {
            s.frame_callbacks
                .iter()
                .position(|(i, _)| *i == id)
                .map(|pos| s.frame_callbacks.remove(pos).1)
        });
        if let Some(callback) = callback {
            callback(now);
        }
    }
}

fn run_due_timeouts(now: Instant) {
    let mut due: Vec<(Instant, usize)> = with_scheduler(|s| {
        s.timeouts
            .iter()
            .filter(|t| t.due <= now)
            .map(|t| (t.due, t.id))
            .collect()
    });
    due.sort_by_key(|(due, _)| *due);

    for (_, id) in due {
        let callback = with_scheduler(|mut s| {
            s.timeouts
                .iter()
                .position(|t| t.id == id)
                .map(|pos| s.timeouts.remove(pos).callback)
        });
        if let Some(callback) = callback {
            callback();
        }
    }
}

fn run_due_intervals(now: Instant) {
    let mut due: Vec<(Instant, usize)> = with_scheduler(|s| {
        s.intervals
            .iter()
            .filter(|i| i.due <= now)
            .map(|i| (i.due, i.id))
            .collect()
    });
    due.sort_by_key(|(due, _)| *due);

    for (_, id) in due {
        // Re-arm before running so the callback can clear its own interval.
        let callback = with_scheduler(|mut s| {
            s.intervals.iter_mut().find(|i| i.id == id).map(|entry| {
                entry.due = now + entry.period;
                entry.callback.clone()
            })
        });
        if let Some(callback) = callback {
            (callback.borrow_mut())();
        }
    }
}

// =============================================================================
// PUBLIC API - INTROSPECTION / RESET
// =============================================================================

/// Number of callbacks waiting for the next frame pass.
pub fn pending_frame_callbacks() -> usize {
    with_scheduler(|s| s.frame_callbacks.len())
}

/// Number of scheduled timeouts and intervals still pending.
pub fn pending_timers() -> usize {
    with_scheduler(|s| s.timeouts.len() + s.intervals.len())
}

/// Drop all scheduled work and forget the clock (for testing).
pub fn reset_frame_state() {
    with_scheduler(|mut s| {
        s.now = None;
        s.frame_callbacks.clear();
        s.timeouts.clear();
        s.intervals.clear();
        s.next_id = 0;
    });
}

// =============================================================================
// TESTS
// =============================================================================
