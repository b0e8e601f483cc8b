// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Call-recording backend for unit tests.

use std::sync::Arc;

use mosaic_core::surface::{SurfaceSize, TextureHandle};
use mosaic_core::time::HostTime;
use mosaic_core::transform::Mat4;
use mosaic_render::{FrameListener, GpuBackend, RenderPlan};
use parking_lot::Mutex;
use thiserror::Error;

use crate::gate::FrameGate;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MockEvent {
    MakeCurrent,
    CompileProgram,
    CreateTexture(TextureHandle),
    CreateInputSurface(TextureHandle),
    Latch(TextureHandle),
    Draw(u64, Mat4),
    SetPresentationTime(HostTime),
    Swap,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("mock backend failure")]
pub(crate) struct MockError;

/// Shared so tests can read the log after the backend moved to another thread.
pub(crate) type EventLog = Arc<Mutex<Vec<MockEvent>>>;

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    pub(crate) events: EventLog,
    pub(crate) next_texture: u32,
    /// Transforms returned by successive latches, identity once exhausted.
    pub(crate) transforms: Vec<Mat4>,
    pub(crate) fail_latch: bool,
    /// Released right after each successful latch.
    pub(crate) release_on_latch: Option<Arc<FrameGate>>,
    pub(crate) fail_draw: bool,
}

impl MockBackend {
    pub(crate) fn with_log(events: EventLog) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub(crate) fn log(&self) -> Vec<MockEvent> {
        self.events.lock().clone()
    }

    pub(crate) fn latches(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, MockEvent::Latch(_)))
            .count()
    }

    fn record(&self, event: MockEvent) {
        self.events.lock().push(event);
    }
}

impl GpuBackend for MockBackend {
    type Error = MockError;
    type ProducerSurface = Arc<dyn FrameListener>;

    fn make_current(&mut self) -> Result<(), MockError> {
        self.record(MockEvent::MakeCurrent);
        Ok(())
    }

    fn compile_program(&mut self) -> Result<(), MockError> {
        self.record(MockEvent::CompileProgram);
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureHandle, MockError> {
        self.next_texture += 1;
        let texture = TextureHandle(self.next_texture);
        self.record(MockEvent::CreateTexture(texture));
        Ok(texture)
    }

    fn create_input_surface(
        &mut self,
        texture: TextureHandle,
        _size: SurfaceSize,
        listener: Arc<dyn FrameListener>,
    ) -> Result<Arc<dyn FrameListener>, MockError> {
        self.record(MockEvent::CreateInputSurface(texture));
        Ok(listener)
    }

    fn latch_frame(&mut self, texture: TextureHandle) -> Result<Mat4, MockError> {
        if self.fail_latch {
            return Err(MockError);
        }
        self.record(MockEvent::Latch(texture));
        if let Some(gate) = &self.release_on_latch {
            gate.release();
        }
        if self.transforms.is_empty() {
            Ok(Mat4::IDENTITY)
        } else {
            Ok(self.transforms.remove(0))
        }
    }

    fn draw(&mut self, plan: &RenderPlan) -> Result<(), MockError> {
        if self.fail_draw {
            return Err(MockError);
        }
        self.record(MockEvent::Draw(plan.frame_index, plan.mvp));
        Ok(())
    }

    fn set_presentation_time(&mut self, time: HostTime) -> Result<(), MockError> {
        self.record(MockEvent::SetPresentationTime(time));
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), MockError> {
        self.record(MockEvent::Swap);
        Ok(())
    }
}
