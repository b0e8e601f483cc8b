// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use mosaic_core::time::{HostTime, Timebase};
use mosaic_core::trace::{
    FrameSummary, PhaseBeginEvent, PhaseEndEvent, PresentEvent, SlotLatchedEvent,
    TickBeginEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
    timebase: Timebase,
    slot_events: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .field("slot_events", &self.slot_events)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), timebase)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self {
            writer,
            timebase,
            slot_events: true,
        }
    }

    /// Skips the per-slot latch lines, which dominate output with many
    /// inputs.
    #[must_use]
    pub fn without_slot_events(mut self) -> Self {
        self.slot_events = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} pts={:.1}µs now={:.1}µs",
            e.frame_index,
            self.host_us(e.presentation_time),
            self.host_us(e.now),
        );
    }

    fn on_slot_latched(&mut self, e: &SlotLatchedEvent) {
        if !self.slot_events {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[latch] frame={} slot={} frames={} at {:.1}µs",
            e.frame_index,
            e.slot,
            e.frames,
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        let _ = writeln!(
            self.writer,
            "[present] frame={} pts={:.1}µs at {:.1}µs",
            e.frame_index,
            self.host_us(e.presentation_time),
            self.host_us(e.presented_at),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} slots={} latched={} collect={:.1}µs \
             render={:.1}µs present={:.1}µs",
            s.frame_index,
            s.slots,
            s.frames_latched,
            self.ticks_to_us(s.collect_ticks),
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.present_ticks),
        );
    }
}
