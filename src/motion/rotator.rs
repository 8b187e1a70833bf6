//! Rotator Controller - timed slide cycling
//!
//! Cycles an index over a fixed set of slides on an interval, wrapping at
//! the end. The index is a signal so hosts re-render on change, and the
//! progress fraction is available as a derived value for progress bars
//! that span the slide set.

use std::time::Duration;

use spark_signals::{derived, signal, Derived, Signal};

use crate::frame::{self, TimerHandle};

/// Interval-driven index over `len` slides.
pub struct Rotator {
    index: Signal<usize>,
    len: usize,
    timer: Option<TimerHandle>,
}

impl Rotator {
    /// Starts rotating `len` slides every `period`. Zero or one slide
    /// needs no timer; the index just stays put.
    pub fn mount(len: usize, period: Duration) -> Self {
        let index: Signal<usize> = signal(0);

        let timer = if len > 1 {
            let tick_index = index.clone();
            Some(frame::set_interval(period, move || {
                tick_index.set((tick_index.get() + 1) % len);
            }))
        } else {
            None
        };

        Self { index, len, timer }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index.get()
    }

    pub fn index_signal(&self) -> Signal<usize> {
        self.index.clone()
    }

    /// Jumps to a slide, clamping to the last one. The interval keeps its
    /// cadence and advances from here.
    pub fn set_index(&self, value: usize) {
        if self.len == 0 {
            return;
        }
        let value = value.min(self.len - 1);
        if self.index.get() != value {
            self.index.set(value);
        }
    }

    /// Steps to the next slide, wrapping.
    pub fn advance(&self) {
        if self.len == 0 {
            return;
        }
        self.index.set((self.index.get() + 1) % self.len);
    }

    /// Position of the current slide in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.len <= 1 {
            return 0.0;
        }
        self.index.get() as f64 / (self.len - 1) as f64
    }

    /// Derived form of [`fraction`](Self::fraction), recomputed whenever
    /// the index signal changes.
    pub fn create_fraction_derived(&self) -> Derived<f64> {
        let index = self.index.clone();
        let len = self.len;
        derived(move || {
            if len <= 1 {
                return 0.0;
            }
            index.get() as f64 / (len - 1) as f64
        })
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(timer) = self.timer.take() {
            frame::clear_interval(timer);
        }
    }
}

impl Drop for Rotator {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================
