// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-rate composition of N independently clocked video streams.
//!
//! `mosaic_compositor` is the runtime half of mosaic. It owns the thread that
//! drives a [`GpuBackend`](mosaic_render::GpuBackend), the per-input
//! [`FrameGate`]s that pace producers against that thread, and the tick loop
//! that turns N input streams into one tiled output stream.
//!
//! ```rust,ignore
//! let config = ComposerConfig::new(1920, 1080, 30.0, 4).with_rotation(90.0);
//! let composer = VideoComposer::spawn(config, |cfg| MyBackend::new(cfg))?;
//!
//! // Hand each producer its surface; every queued frame signals the slot.
//! for (i, surface) in composer.input_surfaces().iter().enumerate() {
//!     start_producer(i, surface.clone());
//! }
//!
//! // ... later
//! let report = composer.shutdown()?;
//! ```
//!
//! - [`gate`]: bounded counting rendezvous between one producer and the loop.
//! - [`slot`]: an input stream's texture, gate and latest texture transform.
//! - [`composer`]: the composition thread and its lifecycle.
//! - [`config`]: composer parameters and validation.
//! - [`error`]: error types.
//!
//! # Logging
//!
//! The runtime logs through [`tracing`]. Setup and shutdown are logged at
//! `info`, backlog drains at `debug`, per-frame detail at `trace`, and fatal
//! backend failures at `error`.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): dispatches loop events to the
//!   [`TraceSink`](mosaic_core::trace::TraceSink) given to
//!   [`VideoComposer::spawn_traced`].
//! - `serde` (disabled by default): `Serialize`/`Deserialize` for
//!   [`ComposerConfig`].

pub mod composer;
pub mod config;
pub mod error;
pub mod gate;
pub mod slot;

#[cfg(test)]
mod testing;

pub use composer::{ComposerReport, ComposerState, VideoComposer};
pub use config::ComposerConfig;
pub use error::{BackendStage, ComposeError, ConfigError, GateError, GateReleased};
pub use gate::FrameGate;
pub use slot::{FrameAwait, InputSlot, SlotNotifier};
