// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the composition loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! composition loop calls at each stage of a tick. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] collects phase timestamps during a tick and produces
//! a [`FrameSummary`] at the end.
//!
//! Timestamps are [`HostTime`] nanoseconds measured from the start of the
//! composition thread, which is a different timeline from the presentation
//! timestamps the [`OutputClock`](crate::timing::OutputClock) assigns.

use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a composition tick is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Waiting on every input slot and latching their frames.
    Collect,
    /// Issuing the tile draws for the output frame.
    Render,
    /// Stamping the presentation time and swapping buffers.
    Present,
}

impl PhaseKind {
    /// All phases in tick order.
    pub const ALL: [Self; 3] = [Self::Collect, Self::Render, Self::Present];

    /// Short lowercase name, used by text and JSON exporters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Render => "render",
            Self::Present => "present",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Collect => 0,
            Self::Render => 1,
            Self::Present => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the composition loop starts a new tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickBeginEvent {
    /// Monotonic output frame counter.
    pub frame_index: u64,
    /// Presentation timestamp this tick will stamp on its output frame.
    pub presentation_time: HostTime,
    /// Host time when the tick started.
    pub now: HostTime,
}

/// Emitted once per slot per tick after the slot's frames have been latched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotLatchedEvent {
    /// Output frame counter.
    pub frame_index: u64,
    /// Index of the input slot.
    pub slot: u32,
    /// Number of producer frames consumed (latched) for this tick.
    pub frames: u32,
    /// Host time when the last latch completed.
    pub timestamp: HostTime,
}

/// Marks the beginning of a tick phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Output frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a tick phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Output frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after the output buffer has been swapped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresentEvent {
    /// Output frame counter.
    pub frame_index: u64,
    /// Presentation timestamp attached to the frame.
    pub presentation_time: HostTime,
    /// Host time when the swap returned.
    pub presented_at: HostTime,
}

/// Per-tick timing summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSummary {
    /// Output frame counter.
    pub frame_index: u64,
    /// Presentation timestamp attached to the frame.
    pub presentation_time: HostTime,
    /// Host time when the tick started.
    pub started_at: HostTime,
    /// Number of slots that latched at least one frame.
    pub slots: u32,
    /// Total producer frames latched across all slots.
    pub frames_latched: u32,
    /// Collect phase duration in ticks (0 if not measured).
    pub collect_ticks: u64,
    /// Render phase duration in ticks (0 if not measured).
    pub render_ticks: u64,
    /// Present phase duration in ticks (0 if not measured).
    pub present_ticks: u64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the composition loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a tick starts.
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        _ = e;
    }

    /// Called after a slot has latched its frames for this tick.
    fn on_slot_latched(&mut self, e: &SlotLatchedEvent) {
        _ = e;
    }

    /// Called at the beginning of a tick phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a tick phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after the output buffer swap.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called with a per-tick timing summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer from an optional sink.
    #[inline]
    #[must_use]
    pub fn from_option(sink: Option<&'a mut dyn TraceSink>) -> Self {
        match sink {
            Some(sink) => Self::new(sink),
            None => Self::none(),
        }
    }

    /// Emits a [`TickBeginEvent`].
    #[inline]
    pub fn tick_begin(&mut self, e: &TickBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SlotLatchedEvent`].
    #[inline]
    pub fn slot_latched(&mut self, e: &SlotLatchedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_slot_latched(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_present(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a tick and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    tick: TickBeginEvent,
    phase_starts: [Option<HostTime>; 3],
    phase_ends: [Option<HostTime>; 3],
    slots: u32,
    frames_latched: u32,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given tick.
    #[must_use]
    pub fn new(tick: &TickBeginEvent) -> Self {
        Self {
            tick: *tick,
            phase_starts: [None; 3],
            phase_ends: [None; 3],
            slots: 0,
            frames_latched: 0,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase.index()] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase.index()] = Some(t);
    }

    /// Accounts for one slot having latched `frames` producer frames.
    pub fn slot_latched(&mut self, frames: u32) {
        if frames > 0 {
            self.slots = self.slots.saturating_add(1);
        }
        self.frames_latched = self.frames_latched.saturating_add(frames);
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.tick.frame_index,
            presentation_time: self.tick.presentation_time,
            started_at: self.tick.now,
            slots: self.slots,
            frames_latched: self.frames_latched,
            collect_ticks: self.phase_duration(PhaseKind::Collect),
            render_ticks: self.phase_duration(PhaseKind::Render),
            present_ticks: self.phase_duration(PhaseKind::Present),
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> TickBeginEvent {
        TickBeginEvent {
            frame_index: 42,
            presentation_time: HostTime(42 * 33_333_333),
            now: HostTime(1_000_000),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_tick_begin(&sample_tick());
        sink.on_slot_latched(&SlotLatchedEvent {
            frame_index: 42,
            slot: 3,
            frames: 2,
            timestamp: HostTime(1_000_500),
        });
        sink.on_frame_summary(&FrameSummaryBuilder::new(&sample_tick()).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.tick_begin(&sample_tick());
        tracer.present(&PresentEvent {
            frame_index: 42,
            presentation_time: HostTime(0),
            presented_at: HostTime(0),
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(&sample_tick());

        builder.phase_begin(PhaseKind::Collect, HostTime(1_000_000));
        builder.slot_latched(1);
        builder.slot_latched(3);
        builder.slot_latched(0);
        builder.phase_end(PhaseKind::Collect, HostTime(1_004_000));
        builder.phase_begin(PhaseKind::Render, HostTime(1_004_000));
        builder.phase_end(PhaseKind::Render, HostTime(1_005_500));
        builder.phase_begin(PhaseKind::Present, HostTime(1_005_500));
        builder.phase_end(PhaseKind::Present, HostTime(1_005_550));

        let summary = builder.finish();
        assert_eq!(summary.collect_ticks, 4000);
        assert_eq!(summary.render_ticks, 1500);
        assert_eq!(summary.present_ticks, 50);
        assert_eq!(summary.slots, 2);
        assert_eq!(summary.frames_latched, 4);
        assert_eq!(summary.frame_index, 42);
        assert_eq!(summary.started_at, HostTime(1_000_000));
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let summary = FrameSummaryBuilder::new(&sample_tick()).finish();
        assert_eq!(summary.collect_ticks, 0);
        assert_eq!(summary.render_ticks, 0);
        assert_eq!(summary.present_ticks, 0);
        assert_eq!(summary.frames_latched, 0);
    }

    #[test]
    fn phase_names_are_stable() {
        let names: [&str; 3] = PhaseKind::ALL.map(PhaseKind::name);
        assert_eq!(names, ["collect", "render", "present"]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            slots: Vec<(u32, u32)>,
        }
        impl TraceSink for RecordingSink {
            fn on_slot_latched(&mut self, e: &SlotLatchedEvent) {
                self.slots.push((e.slot, e.frames));
            }
        }

        let mut sink = RecordingSink { slots: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.slot_latched(&SlotLatchedEvent {
            frame_index: 0,
            slot: 1,
            frames: 2,
            timestamp: HostTime(10),
        });
        drop(tracer);
        assert_eq!(sink.slots, &[(1, 2)]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_from_option_dispatches_only_with_sink() {
        struct CountingSink(u32);
        impl TraceSink for CountingSink {
            fn on_tick_begin(&mut self, _e: &TickBeginEvent) {
                self.0 += 1;
            }
        }

        let mut sink = CountingSink(0);
        let mut tracer = Tracer::from_option(Some(&mut sink as &mut dyn TraceSink));
        tracer.tick_begin(&sample_tick());
        drop(tracer);
        assert_eq!(sink.0, 1);

        let mut silent = Tracer::from_option(None);
        silent.tick_begin(&sample_tick());
    }
}
