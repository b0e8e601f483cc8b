// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for frame-rate-synchronized multi-surface compositing.
//!
//! `mosaic_core` holds the platform-independent pieces of the compositor: the
//! tile layout that places N input streams on one output frame, the output
//! clock that stamps every composed frame, and the small vocabulary types
//! shared by the render plan, the runtime and the backends. It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! A composition loop turns N independently clocked producer streams into
//! one fixed-rate output stream:
//!
//! ```text
//!   producer 0 ─► InputSlot 0 ─┐
//!   producer 1 ─► InputSlot 1 ─┤   (await every slot, index order)
//!        ⋮                     ├──► RenderPlan ──► GpuBackend::draw()
//!   producer N ─► InputSlot N ─┘         ▲                 │
//!                                        │                 ▼
//!                           TileLayout ──┘      set_presentation_time(OutputClock)
//!                                                          │
//!                                                          ▼
//!                                                   swap_buffers()
//! ```
//!
//! **[`layout`]**: Deterministic tile grid for N inputs on a `width × height`
//! output. Cells in the last grid column pair are widened so every row is
//! fully covered.
//!
//! **[`timing`]**: [`OutputClock`](timing::OutputClock), the pacing authority
//! that advances the presentation timestamp by a fixed interval per tick.
//!
//! **[`time`]**: Nanosecond host time, durations and timebase conversion.
//!
//! **[`surface`]**: Surface sizes and opaque texture handles.
//!
//! **[`transform`]**: Column-major 4×4 matrices for the composite rotation
//! and per-input texture transforms.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! composition-loop instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod layout;
pub mod surface;
pub mod time;
pub mod timing;
pub mod trace;
pub mod transform;
