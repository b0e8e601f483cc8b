// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output pacing.
//!
//! The composition loop, not the producers, is the pacing authority: every
//! tick presents exactly one frame stamped with [`OutputClock::now`], then
//! advances the clock by one fixed interval. Independent input rates are
//! normalized to this single output rate.

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::time::{Duration, HostTime};

const NANOS_PER_SECOND: f64 = 1e9;

/// Returned when a frame rate cannot drive an output clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidFrameRate(pub f32);

impl fmt::Display for InvalidFrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame rate {} must be finite and positive", self.0)
    }
}

impl core::error::Error for InvalidFrameRate {}

/// Converts a frame rate into a per-frame interval in nanoseconds.
///
/// The interval is `round(1e9 / fps)`, and never shorter than one nanosecond.
pub fn frame_interval(fps: f32) -> Result<Duration, InvalidFrameRate> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(InvalidFrameRate(fps));
    }
    let nanos = (NANOS_PER_SECOND / f64::from(fps)).round();
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "nanos is positive and saturates at u64::MAX for tiny rates"
    )]
    let nanos = nanos as u64;
    Ok(Duration(nanos.max(1)))
}

/// Fixed-rate presentation clock for the output stream.
///
/// Starts at [`HostTime::ZERO`] and advances by exactly one interval per
/// presented frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputClock {
    interval: Duration,
    next: HostTime,
    frame_index: u64,
}

impl OutputClock {
    /// Creates a clock ticking at `fps` frames per second.
    pub fn from_fps(fps: f32) -> Result<Self, InvalidFrameRate> {
        Ok(Self::with_interval(frame_interval(fps)?))
    }

    /// Creates a clock with an explicit interval.
    #[must_use]
    pub const fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next: HostTime::ZERO,
            frame_index: 0,
        }
    }

    /// The fixed interval between presented frames.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Presentation timestamp for the frame currently being composed.
    #[must_use]
    pub const fn now(&self) -> HostTime {
        self.next
    }

    /// Index of the frame currently being composed.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Moves to the next frame and returns its timestamp.
    pub fn advance(&mut self) -> HostTime {
        self.next = self.next.saturating_add(self.interval);
        self.frame_index = self.frame_index.saturating_add(1);
        self.next
    }
}
