// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for GPU integrations.
//!
//! The composition loop never talks to a graphics API directly. Everything it
//! needs from the GPU context goes through [`GpuBackend`]:
//!
//! - **Setup**: bind the output surface ([`make_current`]), build the tile
//!   shader ([`compile_program`]), allocate one external texture per input
//!   ([`create_texture`]) and wrap it in a producer-facing surface
//!   ([`create_input_surface`]).
//! - **Per tick**: latch queued producer frames into their textures
//!   ([`latch_frame`]), draw the [`RenderPlan`] ([`draw`]), stamp the output
//!   frame ([`set_presentation_time`]) and present it ([`swap_buffers`]).
//!
//! A backend value is created on the composition thread and never leaves it,
//! so `GpuBackend` does not require `Send`. The producer surfaces it hands
//! out do cross threads, and their frame callbacks arrive on producer threads
//! through [`FrameListener`].
//!
//! [`make_current`]: GpuBackend::make_current
//! [`compile_program`]: GpuBackend::compile_program
//! [`create_texture`]: GpuBackend::create_texture
//! [`create_input_surface`]: GpuBackend::create_input_surface
//! [`latch_frame`]: GpuBackend::latch_frame
//! [`draw`]: GpuBackend::draw
//! [`set_presentation_time`]: GpuBackend::set_presentation_time
//! [`swap_buffers`]: GpuBackend::swap_buffers

use alloc::sync::Arc;

use mosaic_core::surface::{SurfaceSize, TextureHandle};
use mosaic_core::time::HostTime;
use mosaic_core::transform::Mat4;

use crate::plan::RenderPlan;

/// Receives "a new frame is queued" notifications from a producer surface.
///
/// Called on whichever thread the producer delivers callbacks on. One call
/// corresponds to exactly one queued frame.
pub trait FrameListener: Send + Sync {
    /// A producer has queued one new frame.
    fn on_frame_available(&self);
}

impl<F> FrameListener for F
where
    F: Fn() + Send + Sync,
{
    fn on_frame_available(&self) {
        self();
    }
}

/// Operations the composition loop needs from a GPU context.
///
/// Every operation is fallible. The loop treats a setup error as fatal to
/// construction and a per-tick error as fatal to the loop.
pub trait GpuBackend {
    /// Backend-specific error.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Producer-facing surface returned for each input.
    ///
    /// Handed to producers on other threads, so it must be cheap to clone and
    /// `Send`.
    type ProducerSurface: Clone + Send + 'static;

    /// Binds the output surface to the current thread.
    fn make_current(&mut self) -> Result<(), Self::Error>;

    /// Compiles and links the tile shader program.
    fn compile_program(&mut self) -> Result<(), Self::Error>;

    /// Allocates one external texture for an input stream.
    fn create_texture(&mut self) -> Result<TextureHandle, Self::Error>;

    /// Creates the producer surface feeding `texture`.
    ///
    /// `listener` must be invoked once for every frame a producer queues.
    fn create_input_surface(
        &mut self,
        texture: TextureHandle,
        size: SurfaceSize,
        listener: Arc<dyn FrameListener>,
    ) -> Result<Self::ProducerSurface, Self::Error>;

    /// Consumes the oldest queued frame into `texture`.
    ///
    /// Returns the texture-coordinate transform that accompanies that frame.
    fn latch_frame(&mut self, texture: TextureHandle) -> Result<Mat4, Self::Error>;

    /// Clears the output and draws every tile in `plan`.
    fn draw(&mut self, plan: &RenderPlan) -> Result<(), Self::Error>;

    /// Attaches a presentation timestamp to the frame about to be swapped.
    fn set_presentation_time(&mut self, time: HostTime) -> Result<(), Self::Error>;

    /// Presents the drawn frame.
    fn swap_buffers(&mut self) -> Result<(), Self::Error>;
}
