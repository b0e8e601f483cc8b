// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input slots: one per source stream.
//!
//! An [`InputSlot`] owns the texture a producer renders into and the
//! [`FrameGate`] that counts that producer's queued frames. The producer side
//! only ever sees the slot's [`SlotNotifier`], which the backend calls once
//! per queued frame.

use std::sync::Arc;
use std::time::Duration;

use mosaic_core::surface::{SurfaceSize, TextureHandle};
use mosaic_core::transform::Mat4;
use mosaic_render::{FrameListener, GpuBackend};
use tracing::{debug, trace};

use crate::gate::FrameGate;

/// Outcome of [`InputSlot::await_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAwait {
    /// At least one frame was latched; `frames` counts how many were
    /// consumed to catch up with the producer.
    Latched {
        /// Producer frames consumed this tick.
        frames: u32,
    },
    /// The slot's gate was released; the composition loop should stop.
    Released,
}

/// Producer-side handle forwarding frame notifications to a slot's gate.
///
/// Runs on the producer's callback thread. Blocks when the slot already
/// holds a full backlog.
#[derive(Clone, Debug)]
pub struct SlotNotifier {
    slot: u32,
    gate: Arc<FrameGate>,
}

impl FrameListener for SlotNotifier {
    fn on_frame_available(&self) {
        match self.gate.signal() {
            Ok(pending) => trace!(slot = self.slot, pending, "frame available"),
            Err(_) => trace!(slot = self.slot, "frame ignored, gate released"),
        }
    }
}

/// One input stream of the composite.
#[derive(Debug)]
pub struct InputSlot {
    index: u32,
    texture: TextureHandle,
    size: SurfaceSize,
    gate: Arc<FrameGate>,
    transform: Mat4,
    frames_latched: u64,
}

impl InputSlot {
    /// Creates a slot bound to `texture`.
    ///
    /// The texture is fixed for the slot's lifetime.
    #[must_use]
    pub fn new(
        index: u32,
        texture: TextureHandle,
        size: SurfaceSize,
        gate_capacity: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            index,
            texture,
            size,
            gate: Arc::new(FrameGate::with_poll_interval(gate_capacity, poll_interval)),
            transform: Mat4::IDENTITY,
            frames_latched: 0,
        }
    }

    /// Returns the listener to register with this slot's producer surface.
    #[must_use]
    pub fn notifier(&self) -> SlotNotifier {
        SlotNotifier {
            slot: self.index,
            gate: Arc::clone(&self.gate),
        }
    }

    /// Blocks until the producer has queued a frame, then latches frames
    /// until the slot has caught up with the producer.
    ///
    /// After `Ok(FrameAwait::Latched { .. })` the slot's texture holds the
    /// most recent frame and [`transform`](Self::transform) is that frame's
    /// texture transform.
    pub fn await_frame<B: GpuBackend>(&mut self, backend: &mut B) -> Result<FrameAwait, B::Error> {
        let mut frames = 0_u32;
        loop {
            let Ok(remaining) = self.gate.wait() else {
                // Frames latched before the release still count.
                self.frames_latched += u64::from(frames);
                return Ok(FrameAwait::Released);
            };
            self.transform = backend.latch_frame(self.texture)?;
            frames += 1;
            if remaining == 0 {
                break;
            }
        }
        if frames > 1 {
            debug!(slot = self.index, frames, "drained producer backlog");
        }
        self.frames_latched += u64::from(frames);
        Ok(FrameAwait::Latched { frames })
    }

    /// Releases the slot's gate, unblocking both the producer and the loop.
    pub fn release(&self) {
        self.gate.release();
    }

    /// Slot index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Texture this slot latches into.
    #[must_use]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Input surface size.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Texture transform of the most recently latched frame.
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Total frames latched over the slot's lifetime.
    #[must_use]
    pub fn frames_latched(&self) -> u64 {
        self.frames_latched
    }

    /// The slot's gate.
    #[must_use]
    pub fn gate(&self) -> &Arc<FrameGate> {
        &self.gate
    }
}
