// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use mosaic_core::surface::TextureHandle;
use thiserror::Error;

/// Errors reported by [`HeadlessBackend`](crate::HeadlessBackend) and
/// [`HeadlessProducer`](crate::HeadlessProducer).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum HeadlessError {
    /// Injected context creation failure.
    #[error("simulated context creation failure")]
    ContextCreation,
    /// Injected failure binding the output surface.
    #[error("simulated failure binding the output surface")]
    MakeCurrent,
    /// Injected shader link failure.
    #[error("simulated shader program link failure")]
    ProgramLink,
    /// Injected texture allocation failure.
    #[error("simulated allocation failure for texture #{0}")]
    TextureAllocation(u32),
    /// The texture was never allocated by this backend.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),
    /// The texture already feeds a producer surface.
    #[error("texture {0:?} already has a producer surface")]
    SurfaceExists(TextureHandle),
    /// A submitted frame does not match the surface size.
    #[error("frame holds {actual} pixels but the surface holds {expected}")]
    SizeMismatch {
        /// Pixels the surface expects.
        expected: usize,
        /// Pixels submitted.
        actual: usize,
    },
    /// A draw was issued before the output surface was made current.
    #[error("no output surface is current")]
    NotCurrent,
    /// A draw was issued before the program was compiled.
    #[error("no shader program is bound")]
    NoProgram,
    /// Injected draw failure.
    #[error("simulated draw failure at frame {0}")]
    Draw(u64),
    /// Injected swap failure.
    #[error("simulated swap failure at frame {0}")]
    Swap(u64),
    /// The frame was swapped without a presentation timestamp.
    #[error("swap without a presentation timestamp")]
    MissingPresentationTime,
}
