// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the composition runtime.

use std::error::Error as StdError;
use std::fmt;

use mosaic_core::layout::LayoutError;
use mosaic_core::surface::InvalidSurfaceSize;
use mosaic_core::timing::InvalidFrameRate;
use thiserror::Error;

/// Returned by blocking gate operations once the gate has been released.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("frame gate released")]
pub struct GateReleased;

/// Returned by the non-blocking gate operations.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateError {
    /// The gate already holds `capacity` pending frames.
    #[error("frame gate is full")]
    Full,
    /// No frame is pending.
    #[error("frame gate is empty")]
    Empty,
    /// The gate has been released.
    #[error("frame gate released")]
    Released,
}

impl From<GateReleased> for GateError {
    fn from(_: GateReleased) -> Self {
        Self::Released
    }
}

/// A composer configuration field failed validation.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Output width or height is zero.
    #[error("output size {width}x{height} must be positive in both dimensions")]
    InvalidSize {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Frame rate is not finite or not positive.
    #[error("fps {0} must be finite and positive")]
    InvalidFps(f32),
    /// Rotation is not finite.
    #[error("rotation {0} degrees must be finite")]
    InvalidRotation(f32),
    /// Zero input instances.
    #[error("at least one input instance is required")]
    NoInstances,
    /// Gate capacity is zero.
    #[error("gate capacity must be at least 1")]
    ZeroGateCapacity,
    /// Gate poll interval is zero.
    #[error("gate poll interval must be non-zero")]
    ZeroPollInterval,
}

/// The backend step that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendStage {
    /// Creating the GPU context.
    CreateContext,
    /// Binding the output surface.
    MakeCurrent,
    /// Compiling the tile shader program.
    CompileProgram,
    /// Allocating an input texture.
    CreateTexture,
    /// Creating a producer surface.
    CreateInputSurface,
    /// Latching a producer frame.
    LatchFrame,
    /// Drawing the output frame.
    Draw,
    /// Stamping the presentation time.
    SetPresentationTime,
    /// Presenting the output frame.
    SwapBuffers,
}

impl BackendStage {
    /// Returns `true` for stages that run during setup.
    #[must_use]
    pub const fn is_setup(self) -> bool {
        matches!(
            self,
            Self::CreateContext
                | Self::MakeCurrent
                | Self::CompileProgram
                | Self::CreateTexture
                | Self::CreateInputSurface
        )
    }
}

impl fmt::Display for BackendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateContext => "create context",
            Self::MakeCurrent => "make current",
            Self::CompileProgram => "compile program",
            Self::CreateTexture => "create texture",
            Self::CreateInputSurface => "create input surface",
            Self::LatchFrame => "latch frame",
            Self::Draw => "draw",
            Self::SetPresentationTime => "set presentation time",
            Self::SwapBuffers => "swap buffers",
        };
        f.write_str(name)
    }
}

/// Errors produced while setting up or running a composer.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Invalid configuration.
    #[error("invalid composer configuration: {0}")]
    Config(#[from] ConfigError),

    /// The tile layout could not be computed.
    #[error("tile layout: {0}")]
    Layout(#[from] LayoutError),

    /// The output clock rejected the frame rate.
    #[error("output clock: {0}")]
    Clock(#[from] InvalidFrameRate),

    /// An input surface size was rejected.
    #[error(transparent)]
    InvalidSurfaceSize(#[from] InvalidSurfaceSize),

    /// A backend operation failed.
    #[error("backend failed to {stage}: {source}")]
    Backend {
        /// Which step failed.
        stage: BackendStage,
        /// The backend's error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The composition thread could not be spawned.
    #[error("failed to spawn composition thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The composition thread exited before reporting setup.
    #[error("composition thread exited before setup completed")]
    SetupAborted,

    /// The composition thread panicked.
    #[error("composition thread panicked")]
    ThreadPanicked,
}

impl ComposeError {
    /// Wraps a backend error with the stage it came from.
    pub fn backend<E>(stage: BackendStage, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Backend {
            stage,
            source: Box::new(source),
        }
    }

    /// Returns the failing backend stage, if this is a backend error.
    #[must_use]
    pub fn backend_stage(&self) -> Option<BackendStage> {
        match self {
            Self::Backend { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
