// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output surface that records presented frames.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use mosaic_core::surface::SurfaceSize;
use mosaic_core::time::HostTime;
use parking_lot::{Condvar, Mutex};

use crate::producer::Rgba;

/// One presented output frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentedFrame {
    /// Zero-based index of the frame in presentation order.
    pub frame_index: u64,
    /// Timestamp the frame was presented with.
    pub presentation_time: HostTime,
    /// Frame size.
    pub size: SurfaceSize,
    /// Row-major RGBA8 pixels, row 0 at the top.
    pub pixels: Vec<Rgba>,
}

impl PresentedFrame {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width() || y >= self.size.height() {
            return None;
        }
        let index = y as usize * self.size.width() as usize + x as usize;
        self.pixels.get(index).copied()
    }
}

#[derive(Debug, Default)]
struct OutputState {
    frames: VecDeque<PresentedFrame>,
    presentation_times: Vec<HostTime>,
    latches: u64,
}

#[derive(Debug)]
struct OutputInner {
    size: SurfaceSize,
    retain: usize,
    state: Mutex<OutputState>,
    presented: Condvar,
}

/// Shared handle to the headless output surface.
///
/// Clones refer to the same surface. Pixels are retained for the most recent
/// frames only; timestamps are kept for every frame.
#[derive(Clone, Debug)]
pub struct HeadlessOutput {
    inner: Arc<OutputInner>,
}

impl HeadlessOutput {
    /// Default number of frames whose pixels are retained.
    pub const DEFAULT_RETAIN: usize = 64;

    /// Creates an output surface of `size`.
    #[must_use]
    pub fn new(size: SurfaceSize) -> Self {
        Self::with_retention(size, Self::DEFAULT_RETAIN)
    }

    /// Creates an output surface keeping the pixels of the last `retain`
    /// frames (at least one).
    #[must_use]
    pub fn with_retention(size: SurfaceSize, retain: usize) -> Self {
        Self {
            inner: Arc::new(OutputInner {
                size,
                retain: retain.max(1),
                state: Mutex::new(OutputState::default()),
                presented: Condvar::new(),
            }),
        }
    }

    /// Surface size.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.inner.size
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.inner.state.lock().presentation_times.len() as u64
    }

    /// Timestamps of every presented frame, in order.
    #[must_use]
    pub fn presentation_times(&self) -> Vec<HostTime> {
        self.inner.state.lock().presentation_times.clone()
    }

    /// Retained frames, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<PresentedFrame> {
        self.inner.state.lock().frames.iter().cloned().collect()
    }

    /// The most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<PresentedFrame> {
        self.inner.state.lock().frames.back().cloned()
    }

    /// Producer frames latched into input textures so far.
    #[must_use]
    pub fn latches(&self) -> u64 {
        self.inner.state.lock().latches
    }

    /// Blocks until at least `count` frames have been presented or `timeout`
    /// elapses. Returns whether the count was reached.
    pub fn wait_for_frames(&self, count: u64, timeout: Duration) -> bool {
        let mut state = self.inner.state.lock();
        let reached = |s: &OutputState| s.presentation_times.len() as u64 >= count;
        if reached(&*state) {
            return true;
        }
        let result = self
            .inner
            .presented
            .wait_while_for(&mut state, |s| !reached(&*s), timeout);
        !result.timed_out() || reached(&*state)
    }

    pub(crate) fn record_latch(&self) {
        self.inner.state.lock().latches += 1;
    }

    pub(crate) fn present(&self, presentation_time: HostTime, pixels: Vec<Rgba>) -> u64 {
        let mut state = self.inner.state.lock();
        let frame_index = state.presentation_times.len() as u64;
        state.presentation_times.push(presentation_time);
        if state.frames.len() == self.inner.retain {
            let _ = state.frames.pop_front();
        }
        state.frames.push_back(PresentedFrame {
            frame_index,
            presentation_time,
            size: self.inner.size,
            pixels,
        });
        drop(state);
        self.inner.presented.notify_all();
        frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn size() -> SurfaceSize {
        SurfaceSize::new(2, 1).unwrap()
    }

    #[test]
    fn retention_keeps_latest_pixels_and_all_timestamps() {
        let output = HeadlessOutput::with_retention(size(), 2);
        for i in 0..5_u8 {
            output.present(HostTime(u64::from(i) * 10), vec![[i; 4]; 2]);
        }
        assert_eq!(output.frame_count(), 5);
        assert_eq!(output.presentation_times().len(), 5);
        let frames = output.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].frame_index, 3);
        assert_eq!(output.last_frame().unwrap().pixel(1, 0), Some([4; 4]));
        assert_eq!(frames[1].pixel(2, 0), None);
    }

    #[test]
    fn wait_for_frames_wakes_on_present() {
        let output = HeadlessOutput::new(size());
        assert!(!output.wait_for_frames(1, Duration::from_millis(5)));

        let presenter = {
            let output = output.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                output.present(HostTime::ZERO, vec![[0; 4]; 2]);
            })
        };
        assert!(output.wait_for_frames(1, Duration::from_secs(5)));
        presenter.join().unwrap();
    }
}
