// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`GpuBackend`] implementation over a software framebuffer.

use std::sync::Arc;

use mosaic_core::surface::{SurfaceSize, TextureHandle};
use mosaic_core::time::HostTime;
use mosaic_core::transform::Mat4;
use mosaic_render::{FrameListener, GpuBackend, RenderPlan};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::HeadlessError;
use crate::faults::FaultToggles;
use crate::output::HeadlessOutput;
use crate::producer::{FrameContents, HeadlessProducer, Rgba, SharedQueue};
use crate::queue::BufferQueue;
use crate::raster::{self, TextureView};

#[derive(Debug)]
struct Texture {
    size: Option<SurfaceSize>,
    queue: Option<SharedQueue>,
    contents: Option<FrameContents>,
    transform: Mat4,
}

/// CPU implementation of [`GpuBackend`].
///
/// Created on the composition thread by the composer's backend factory:
///
/// ```rust,ignore
/// let output = HeadlessOutput::new(SurfaceSize::new(640, 360)?);
/// let target = output.clone();
/// let composer = VideoComposer::spawn(config, move |_| HeadlessBackend::new(target))?;
/// ```
#[derive(Debug)]
pub struct HeadlessBackend {
    output: HeadlessOutput,
    faults: FaultToggles,
    queue_capacity: usize,
    current: bool,
    program: bool,
    textures: Vec<Texture>,
    framebuffer: Vec<Rgba>,
    pending_time: Option<HostTime>,
    frames_drawn: u64,
    frames_swapped: u64,
}

impl HeadlessBackend {
    /// Creates a backend presenting into `output`.
    pub fn new(output: HeadlessOutput) -> Result<Self, HeadlessError> {
        Self::with_faults(output, FaultToggles::default())
    }

    /// Creates a backend with injected failures.
    pub fn with_faults(output: HeadlessOutput, faults: FaultToggles) -> Result<Self, HeadlessError> {
        if faults.fail_context {
            return Err(HeadlessError::ContextCreation);
        }
        if faults.any() {
            debug!(?faults, "headless backend created with fault injection");
        }
        let pixels = usize::try_from(output.size().area()).unwrap_or(usize::MAX);
        Ok(Self {
            output,
            faults,
            queue_capacity: BufferQueue::<()>::DEFAULT_CAPACITY,
            current: false,
            program: false,
            textures: Vec::new(),
            framebuffer: vec![[0; 4]; pixels],
            pending_time: None,
            frames_drawn: 0,
            frames_swapped: 0,
        })
    }

    /// Sets how many buffers each producer queue holds before recycling.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Handle to the output surface.
    #[must_use]
    pub fn output(&self) -> &HeadlessOutput {
        &self.output
    }

    fn texture_mut(&mut self, handle: TextureHandle) -> Result<&mut Texture, HeadlessError> {
        // Handles start at 1; 0 is never a valid texture.
        handle
            .0
            .checked_sub(1)
            .and_then(|i| self.textures.get_mut(i as usize))
            .ok_or(HeadlessError::UnknownTexture(handle))
    }
}

impl GpuBackend for HeadlessBackend {
    type Error = HeadlessError;
    type ProducerSurface = HeadlessProducer;

    fn make_current(&mut self) -> Result<(), HeadlessError> {
        if self.faults.fail_make_current {
            return Err(HeadlessError::MakeCurrent);
        }
        self.current = true;
        Ok(())
    }

    fn compile_program(&mut self) -> Result<(), HeadlessError> {
        if self.faults.fail_program {
            return Err(HeadlessError::ProgramLink);
        }
        self.program = true;
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureHandle, HeadlessError> {
        let index = u32::try_from(self.textures.len()).unwrap_or(u32::MAX);
        if self.faults.fail_texture_at == Some(index) {
            return Err(HeadlessError::TextureAllocation(index));
        }
        self.textures.push(Texture {
            size: None,
            queue: None,
            contents: None,
            transform: Mat4::IDENTITY,
        });
        Ok(TextureHandle(index + 1))
    }

    fn create_input_surface(
        &mut self,
        texture: TextureHandle,
        size: SurfaceSize,
        listener: Arc<dyn FrameListener>,
    ) -> Result<HeadlessProducer, HeadlessError> {
        let capacity = self.queue_capacity;
        let slot = self.texture_mut(texture)?;
        if slot.queue.is_some() {
            return Err(HeadlessError::SurfaceExists(texture));
        }
        let queue: SharedQueue = Arc::new(Mutex::new(BufferQueue::with_capacity(capacity)));
        slot.size = Some(size);
        slot.queue = Some(Arc::clone(&queue));
        Ok(HeadlessProducer::new(texture, size, queue, listener))
    }

    fn latch_frame(&mut self, texture: TextureHandle) -> Result<Mat4, HeadlessError> {
        let slot = self.texture_mut(texture)?;
        let frame = slot.queue.as_ref().and_then(|q| q.lock().pop());
        match frame {
            Some(frame) => {
                slot.contents = Some(frame.contents);
                slot.transform = frame.transform;
            }
            // Nothing queued: the texture keeps its current contents.
            None => trace!(texture = texture.0, "latch with empty buffer queue"),
        }
        let transform = slot.transform;
        self.output.record_latch();
        Ok(transform)
    }

    fn draw(&mut self, plan: &RenderPlan) -> Result<(), HeadlessError> {
        if !self.current {
            return Err(HeadlessError::NotCurrent);
        }
        if !self.program {
            return Err(HeadlessError::NoProgram);
        }
        if self
            .faults
            .fail_draw_after
            .is_some_and(|n| self.frames_drawn >= n)
        {
            return Err(HeadlessError::Draw(self.frames_drawn));
        }

        let output = self.output.size();
        let inverse_mvp = plan.mvp.transpose();
        raster::clear(&mut self.framebuffer, plan.clear_color.to_rgba8());
        for draw in &plan.draws {
            let slot = draw
                .texture
                .0
                .checked_sub(1)
                .and_then(|i| self.textures.get(i as usize))
                .ok_or(HeadlessError::UnknownTexture(draw.texture))?;
            let view = TextureView {
                contents: slot.contents.as_ref(),
                size: slot.size.unwrap_or(output),
            };
            raster::draw_tile(&mut self.framebuffer, output, draw, &inverse_mvp, view);
        }
        self.frames_drawn += 1;
        Ok(())
    }

    fn set_presentation_time(&mut self, time: HostTime) -> Result<(), HeadlessError> {
        self.pending_time = Some(time);
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), HeadlessError> {
        if self
            .faults
            .fail_swap_after
            .is_some_and(|n| self.frames_swapped >= n)
        {
            return Err(HeadlessError::Swap(self.frames_swapped));
        }
        let time = self
            .pending_time
            .take()
            .ok_or(HeadlessError::MissingPresentationTime)?;
        let index = self.output.present(time, self.framebuffer.clone());
        trace!(index, pts = time.ticks(), "headless frame presented");
        self.frames_swapped += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::layout::TileRect;
    use mosaic_render::{ClearColor, TileDraw};
    use std::sync::atomic::{AtomicU32, Ordering};

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    fn backend(w: u32, h: u32) -> HeadlessBackend {
        let mut b = HeadlessBackend::new(HeadlessOutput::new(SurfaceSize::new(w, h).unwrap())).unwrap();
        b.make_current().unwrap();
        b.compile_program().unwrap();
        b
    }

    fn counting_listener() -> (Arc<dyn FrameListener>, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let listener: Arc<dyn FrameListener> = Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (listener, count)
    }

    #[test]
    fn textures_are_numbered_from_one() {
        let mut b = backend(4, 4);
        assert_eq!(b.create_texture(), Ok(TextureHandle(1)));
        assert_eq!(b.create_texture(), Ok(TextureHandle(2)));
        assert_eq!(
            b.latch_frame(TextureHandle(0)),
            Err(HeadlessError::UnknownTexture(TextureHandle(0)))
        );
    }

    #[test]
    fn second_surface_for_a_texture_is_rejected() {
        let mut b = backend(4, 4);
        let t = b.create_texture().unwrap();
        let size = SurfaceSize::new(4, 4).unwrap();
        let (listener, _) = counting_listener();
        b.create_input_surface(t, size, Arc::clone(&listener)).unwrap();
        assert_eq!(
            b.create_input_surface(t, size, listener).unwrap_err(),
            HeadlessError::SurfaceExists(t)
        );
    }

    #[test]
    fn latch_consumes_oldest_frame_and_reports_its_transform() {
        let mut b = backend(2, 1);
        let t = b.create_texture().unwrap();
        let (listener, notified) = counting_listener();
        let producer = b
            .create_input_surface(t, SurfaceSize::new(2, 1).unwrap(), listener)
            .unwrap();

        let scale = Mat4::from_scale(0.5, 1.0, 1.0);
        producer.submit_solid(RED);
        producer
            .submit_with_transform(FrameContents::Solid(BLUE), scale)
            .unwrap();
        assert_eq!(notified.load(Ordering::SeqCst), 2);

        assert_eq!(b.latch_frame(t), Ok(Mat4::IDENTITY));
        assert_eq!(b.latch_frame(t), Ok(scale));
        // Empty queue keeps the latest frame.
        assert_eq!(b.latch_frame(t), Ok(scale));
        assert_eq!(b.output().latches(), 3);
        assert_eq!(producer.queued(), 0);
    }

    #[test]
    fn draw_and_swap_present_a_frame() {
        let mut b = backend(2, 1);
        let t0 = b.create_texture().unwrap();
        let t1 = b.create_texture().unwrap();
        let size = SurfaceSize::new(2, 1).unwrap();
        let (l0, _) = counting_listener();
        let (l1, _) = counting_listener();
        b.create_input_surface(t0, size, l0).unwrap().submit_solid(RED);
        b.create_input_surface(t1, size, l1).unwrap().submit_solid(BLUE);
        b.latch_frame(t0).unwrap();
        b.latch_frame(t1).unwrap();

        let mut plan = RenderPlan::with_capacity(2, Mat4::IDENTITY, ClearColor::KEY_GREEN);
        plan.reset(0, HostTime(5));
        for (slot, texture) in [t0, t1].into_iter().enumerate() {
            let slot = u32::try_from(slot).unwrap();
            plan.push(TileDraw {
                slot,
                texture,
                viewport: TileRect::new(slot, 0, 1, 1),
                texture_transform: Mat4::IDENTITY,
            });
        }
        b.draw(&plan).unwrap();
        assert_eq!(b.swap_buffers(), Err(HeadlessError::MissingPresentationTime));
        b.set_presentation_time(HostTime(5)).unwrap();
        b.swap_buffers().unwrap();

        let frame = b.output().last_frame().unwrap();
        assert_eq!(frame.presentation_time, HostTime(5));
        assert_eq!(frame.pixels, [RED, BLUE]);
    }

    #[test]
    fn draw_requires_context_and_program() {
        let mut b = HeadlessBackend::new(HeadlessOutput::new(SurfaceSize::new(1, 1).unwrap())).unwrap();
        let plan = RenderPlan::with_capacity(0, Mat4::IDENTITY, ClearColor::default());
        assert_eq!(b.draw(&plan), Err(HeadlessError::NotCurrent));
        b.make_current().unwrap();
        assert_eq!(b.draw(&plan), Err(HeadlessError::NoProgram));
    }

    #[test]
    fn faults_fire_at_the_configured_step() {
        let output = HeadlessOutput::new(SurfaceSize::new(1, 1).unwrap());
        let err = HeadlessBackend::with_faults(
            output.clone(),
            FaultToggles {
                fail_context: true,
                ..FaultToggles::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, HeadlessError::ContextCreation);

        let mut b = HeadlessBackend::with_faults(
            output,
            FaultToggles {
                fail_texture_at: Some(1),
                fail_draw_after: Some(0),
                ..FaultToggles::default()
            },
        )
        .unwrap();
        b.make_current().unwrap();
        b.compile_program().unwrap();
        assert!(b.create_texture().is_ok());
        assert_eq!(b.create_texture(), Err(HeadlessError::TextureAllocation(1)));
        let plan = RenderPlan::with_capacity(0, Mat4::IDENTITY, ClearColor::default());
        assert_eq!(b.draw(&plan), Err(HeadlessError::Draw(0)));
    }
}
