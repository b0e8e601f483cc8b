// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU reference backend for mosaic.
//!
//! [`HeadlessBackend`] implements [`GpuBackend`](mosaic_render::GpuBackend)
//! with a software framebuffer, so the composition loop can run without a
//! GPU:
//!
//! - [`HeadlessProducer`] stands in for a producer surface. Submitting a frame
//!   queues it and fires the slot's frame listener, exactly like a decoder or
//!   camera delivering a buffer.
//! - [`HeadlessOutput`] is the output surface. It records every presented
//!   frame with its presentation timestamp and can be inspected from any
//!   thread.
//! - [`FaultToggles`] injects failures into individual backend operations.
//!
//! Rasterization follows the GPU path: each tile is a full-viewport quad
//! transformed by the composite MVP, sampled with nearest filtering through
//! the frame's texture transform. Output row 0 is the top of the frame and
//! texture coordinate `t = 0` is the bottom of a texture, as in GL.

mod backend;
mod error;
mod faults;
mod output;
mod producer;
mod queue;
mod raster;

pub use backend::HeadlessBackend;
pub use error::HeadlessError;
pub use faults::FaultToggles;
pub use output::{HeadlessOutput, PresentedFrame};
pub use producer::{FrameContents, HeadlessProducer, Rgba};
