// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use mosaic_core::time::HostTime;
use mosaic_core::trace::{
    FrameSummary, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent, SlotLatchedEvent,
    TickBeginEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK_BEGIN: u8 = 1;
const TAG_SLOT_LATCHED: u8 = 2;
const TAG_PHASE_BEGIN: u8 = 3;
const TAG_PHASE_END: u8 = 4;
const TAG_PRESENT: u8 = 5;
const TAG_FRAME_SUMMARY: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.ticks());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Collect => 0,
            PhaseKind::Render => 1,
            PhaseKind::Present => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.write_u8(TAG_TICK_BEGIN);
        self.write_u64(e.frame_index);
        self.write_time(e.presentation_time);
        self.write_time(e.now);
    }

    fn on_slot_latched(&mut self, e: &SlotLatchedEvent) {
        self.write_u8(TAG_SLOT_LATCHED);
        self.write_u64(e.frame_index);
        self.write_u32(e.slot);
        self.write_u32(e.frames);
        self.write_time(e.timestamp);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_time(e.timestamp);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_time(e.timestamp);
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.write_u8(TAG_PRESENT);
        self.write_u64(e.frame_index);
        self.write_time(e.presentation_time);
        self.write_time(e.presented_at);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_time(s.presentation_time);
        self.write_time(s.started_at);
        self.write_u32(s.slots);
        self.write_u32(s.frames_latched);
        self.write_u64(s.collect_ticks);
        self.write_u64(s.render_ticks);
        self.write_u64(s.present_ticks);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`TickBeginEvent`].
    TickBegin(TickBeginEvent),
    /// A [`SlotLatchedEvent`].
    SlotLatched(SlotLatchedEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

impl RecordedEvent {
    /// Output frame counter the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::TickBegin(e) => e.frame_index,
            Self::SlotLatched(e) => e.frame_index,
            Self::PhaseBegin(e) => e.frame_index,
            Self::PhaseEnd(e) => e.frame_index,
            Self::Present(e) => e.frame_index,
            Self::FrameSummary(s) => s.frame_index,
        }
    }

    /// Replays the event into another sink.
    pub fn replay(&self, sink: &mut dyn TraceSink) {
        match self {
            Self::TickBegin(e) => sink.on_tick_begin(e),
            Self::SlotLatched(e) => sink.on_slot_latched(e),
            Self::PhaseBegin(e) => sink.on_phase_begin(e),
            Self::PhaseEnd(e) => sink.on_phase_end(e),
            Self::Present(e) => sink.on_present(e),
            Self::FrameSummary(s) => sink.on_frame_summary(s),
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        match self.read_u8()? {
            0 => Some(PhaseKind::Collect),
            1 => Some(PhaseKind::Render),
            2 => Some(PhaseKind::Present),
            _ => None,
        }
    }

    fn decode_tick_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickBegin(TickBeginEvent {
            frame_index: self.read_u64()?,
            presentation_time: self.read_time()?,
            now: self.read_time()?,
        }))
    }

    fn decode_slot_latched(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotLatched(SlotLatchedEvent {
            frame_index: self.read_u64()?,
            slot: self.read_u32()?,
            frames: self.read_u32()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_present(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Present(PresentEvent {
            frame_index: self.read_u64()?,
            presentation_time: self.read_time()?,
            presented_at: self.read_time()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            presentation_time: self.read_time()?,
            started_at: self.read_time()?,
            slots: self.read_u32()?,
            frames_latched: self.read_u32()?,
            collect_ticks: self.read_u64()?,
            render_ticks: self.read_u64()?,
            present_ticks: self.read_u64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_TICK_BEGIN => self.decode_tick_begin(),
            TAG_SLOT_LATCHED => self.decode_slot_latched(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_PRESENT => self.decode_present(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
