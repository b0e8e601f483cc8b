// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-plan definitions and the GPU backend contract for mosaic.
//!
//! This crate sits between [`mosaic_core`]'s layout and timing types and the
//! backend that owns the GPU context. It defines:
//!
//! - [`TileDraw`]: one textured quad, drawn into one tile viewport
//! - [`RenderPlan`]: everything the backend needs to draw one output frame
//! - [`ClearColor`]: the color the output is cleared to before tiles are drawn
//! - [`GpuBackend`]: the operations the composition loop needs from a GPU
//!   context
//! - [`FrameListener`]: the callback a producer surface invokes when it has
//!   queued a new frame

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod backend;
mod plan;

pub use backend::{FrameListener, GpuBackend};
pub use plan::{ClearColor, RenderPlan, TileDraw};
