// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Phases land on thread 0 as begin/end pairs. Slot latches are instant
//! events on thread `slot + 1`, so each input gets its own track.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use mosaic_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

const LOOP_TID: u32 = 0;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .map(|recorded| to_trace_event(recorded, timebase))
        .collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_trace_event(recorded: RecordedEvent, timebase: Timebase) -> Value {
    match recorded {
        RecordedEvent::TickBegin(e) => json!({
            "ph": "i",
            "name": "Tick",
            "cat": "Loop",
            "ts": ticks_to_us(e.now.ticks(), timebase),
            "pid": 0,
            "tid": LOOP_TID,
            "s": "g",
            "args": {
                "frame_index": e.frame_index,
                "pts_us": ticks_to_us(e.presentation_time.ticks(), timebase),
            }
        }),
        RecordedEvent::SlotLatched(e) => json!({
            "ph": "i",
            "name": "Latch",
            "cat": "Slot",
            "ts": ticks_to_us(e.timestamp.ticks(), timebase),
            "pid": 0,
            "tid": e.slot.saturating_add(1),
            "s": "t",
            "args": {
                "frame_index": e.frame_index,
                "slot": e.slot,
                "frames": e.frames,
            }
        }),
        RecordedEvent::PhaseBegin(e) => json!({
            "ph": "B",
            "name": e.phase.name(),
            "cat": "Frame",
            "ts": ticks_to_us(e.timestamp.ticks(), timebase),
            "pid": 0,
            "tid": LOOP_TID,
            "args": {
                "frame_index": e.frame_index,
            }
        }),
        RecordedEvent::PhaseEnd(e) => json!({
            "ph": "E",
            "name": e.phase.name(),
            "cat": "Frame",
            "ts": ticks_to_us(e.timestamp.ticks(), timebase),
            "pid": 0,
            "tid": LOOP_TID,
            "args": {
                "frame_index": e.frame_index,
            }
        }),
        RecordedEvent::Present(e) => json!({
            "ph": "i",
            "name": "Present",
            "cat": "Frame",
            "ts": ticks_to_us(e.presented_at.ticks(), timebase),
            "pid": 0,
            "tid": LOOP_TID,
            "s": "t",
            "args": {
                "frame_index": e.frame_index,
                "pts_us": ticks_to_us(e.presentation_time.ticks(), timebase),
            }
        }),
        RecordedEvent::FrameSummary(s) => json!({
            "ph": "i",
            "name": "FrameSummary",
            "cat": "Summary",
            "ts": ticks_to_us(s.started_at.ticks(), timebase),
            "pid": 0,
            "tid": LOOP_TID,
            "s": "g",
            "args": {
                "frame_index": s.frame_index,
                "slots": s.slots,
                "frames_latched": s.frames_latched,
                "collect_us": ticks_to_us(s.collect_ticks, timebase),
                "render_us": ticks_to_us(s.render_ticks, timebase),
                "present_us": ticks_to_us(s.present_ticks, timebase),
            }
        }),
    }
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
