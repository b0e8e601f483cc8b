// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated producer surfaces.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mosaic_core::surface::{SurfaceSize, TextureHandle};
use mosaic_core::transform::Mat4;
use mosaic_render::FrameListener;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::HeadlessError;
use crate::queue::BufferQueue;

/// One RGBA8 pixel.
pub type Rgba = [u8; 4];

/// Pixel contents of one producer frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameContents {
    /// Every pixel has the same color.
    Solid(Rgba),
    /// Row-major pixels, row 0 at the top, sized to the surface.
    Pixels(Arc<[Rgba]>),
}

#[derive(Clone, Debug)]
pub(crate) struct ProducerFrame {
    pub(crate) contents: FrameContents,
    pub(crate) transform: Mat4,
}

pub(crate) type SharedQueue = Arc<Mutex<BufferQueue<ProducerFrame>>>;

/// Producer-facing input surface.
///
/// Cheap to clone and safe to use from any thread. Each submit queues one
/// frame and notifies the composition loop; the call blocks while the slot
/// already holds a full backlog.
#[derive(Clone)]
pub struct HeadlessProducer {
    texture: TextureHandle,
    size: SurfaceSize,
    queue: SharedQueue,
    listener: Arc<dyn FrameListener>,
    submitted: Arc<AtomicU64>,
}

impl fmt::Debug for HeadlessProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessProducer")
            .field("texture", &self.texture)
            .field("size", &self.size)
            .field("submitted", &self.submitted())
            .finish_non_exhaustive()
    }
}

impl HeadlessProducer {
    pub(crate) fn new(
        texture: TextureHandle,
        size: SurfaceSize,
        queue: SharedQueue,
        listener: Arc<dyn FrameListener>,
    ) -> Self {
        Self {
            texture,
            size,
            queue,
            listener,
            submitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queues a single-color frame with an identity texture transform.
    pub fn submit_solid(&self, rgba: Rgba) {
        self.enqueue(ProducerFrame {
            contents: FrameContents::Solid(rgba),
            transform: Mat4::IDENTITY,
        });
    }

    /// Queues a frame of row-major pixels with an identity texture transform.
    pub fn submit(&self, pixels: impl Into<Arc<[Rgba]>>) -> Result<(), HeadlessError> {
        self.submit_with_transform(FrameContents::Pixels(pixels.into()), Mat4::IDENTITY)
    }

    /// Queues a frame together with the texture transform it must be
    /// sampled through.
    pub fn submit_with_transform(
        &self,
        contents: FrameContents,
        transform: Mat4,
    ) -> Result<(), HeadlessError> {
        if let FrameContents::Pixels(pixels) = &contents {
            let expected = usize::try_from(self.size.area()).unwrap_or(usize::MAX);
            if pixels.len() != expected {
                return Err(HeadlessError::SizeMismatch {
                    expected,
                    actual: pixels.len(),
                });
            }
        }
        self.enqueue(ProducerFrame {
            contents,
            transform,
        });
        Ok(())
    }

    fn enqueue(&self, frame: ProducerFrame) {
        let recycled = self.queue.lock().push(frame);
        if recycled {
            trace!(texture = self.texture.0, "producer recycled its oldest buffer");
        }
        self.submitted.fetch_add(1, Ordering::Relaxed);
        self.listener.on_frame_available();
    }

    /// Texture this surface feeds.
    #[must_use]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Surface size.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Frames submitted through this surface (and its clones).
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Frames currently queued and not yet latched.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Buffers recycled because the queue overflowed.
    #[must_use]
    pub fn recycled(&self) -> u64 {
        self.queue.lock().dropped()
    }
}
