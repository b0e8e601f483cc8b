// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: the tile draws for one output frame.

use alloc::vec::Vec;

use mosaic_core::layout::TileRect;
use mosaic_core::surface::TextureHandle;
use mosaic_core::time::HostTime;
use mosaic_core::transform::Mat4;

/// RGBA clear color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearColor {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl ClearColor {
    /// Fully transparent green, the compositor's default background.
    ///
    /// Any pixel not covered by a tile keeps this color, which makes coverage
    /// gaps easy to spot.
    pub const KEY_GREEN: Self = Self::new(0.0, 1.0, 0.0, 0.0);

    /// Creates a clear color from its components.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Converts to 8-bit RGBA, clamping out-of-range components.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| {
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "value is clamped to 0..=255 before the cast"
            )]
            let v = (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            v
        })
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::KEY_GREEN
    }
}

/// One textured quad drawn into one tile of the output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileDraw {
    /// Index of the input slot this tile shows.
    pub slot: u32,
    /// Texture holding the slot's most recently latched frame.
    pub texture: TextureHandle,
    /// Output viewport, in pixels.
    pub viewport: TileRect,
    /// Texture-coordinate transform reported when the frame was latched.
    pub texture_transform: Mat4,
}

/// Everything a backend needs to draw one output frame.
///
/// Rebuilt every tick. Draws are in slot index order and their viewports
/// partition the output exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    /// Output frame counter.
    pub frame_index: u64,
    /// Timestamp the frame will be presented with.
    pub presentation_time: HostTime,
    /// Composite model-view-projection matrix shared by every tile.
    pub mvp: Mat4,
    /// Color the output is cleared to before drawing.
    pub clear_color: ClearColor,
    /// Tile draws in slot order.
    pub draws: Vec<TileDraw>,
}

impl RenderPlan {
    /// Creates an empty plan with room for `tiles` draws.
    #[must_use]
    pub fn with_capacity(tiles: usize, mvp: Mat4, clear_color: ClearColor) -> Self {
        Self {
            frame_index: 0,
            presentation_time: HostTime::ZERO,
            mvp,
            clear_color,
            draws: Vec::with_capacity(tiles),
        }
    }

    /// Clears the draws and restamps the plan for a new frame.
    pub fn reset(&mut self, frame_index: u64, presentation_time: HostTime) {
        self.frame_index = frame_index;
        self.presentation_time = presentation_time;
        self.draws.clear();
    }

    /// Appends a tile draw.
    pub fn push(&mut self, draw: TileDraw) {
        self.draws.push(draw);
    }

    /// Total pixel area covered by the draws.
    #[must_use]
    pub fn covered_area(&self) -> u64 {
        self.draws.iter().map(|d| d.viewport.area()).sum()
    }
}
