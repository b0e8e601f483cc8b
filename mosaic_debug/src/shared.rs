// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sink handle shared between the composition thread and its owner.
//!
//! The composer takes ownership of its sink and moves it onto the
//! composition thread. Wrapping the real sink in a [`SharedSink`] and keeping
//! a clone lets the caller read it back once the composer has shut down.

use std::sync::Arc;

use mosaic_core::trace::{
    FrameSummary, PhaseBeginEvent, PhaseEndEvent, PresentEvent, SlotLatchedEvent,
    TickBeginEvent, TraceSink,
};
use parking_lot::{Mutex, MutexGuard};

/// A cloneable [`TraceSink`] that forwards every event to one inner sink.
#[derive(Debug, Default)]
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedSink<S> {
    /// Wraps `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Locks the inner sink.
    ///
    /// Holding the guard stalls the composition loop at its next event.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.inner.lock()
    }

    /// Returns the inner sink if this is the last handle.
    pub fn try_into_inner(self) -> Result<S, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<S: TraceSink> TraceSink for SharedSink<S> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.inner.lock().on_tick_begin(e);
    }

    fn on_slot_latched(&mut self, e: &SlotLatchedEvent) {
        self.inner.lock().on_slot_latched(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.inner.lock().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.inner.lock().on_phase_end(e);
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.inner.lock().on_present(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.inner.lock().on_frame_summary(s);
    }
}
