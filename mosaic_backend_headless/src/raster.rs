// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software rasterization of tile draws.

use mosaic_core::surface::SurfaceSize;
use mosaic_core::transform::Mat4;
use mosaic_render::TileDraw;

use crate::producer::{FrameContents, Rgba};

/// Pixels sampled from a texture that has never latched a frame.
const EMPTY_TEXEL: Rgba = [0, 0, 0, 0];

/// Tolerance for pixel centers that land exactly on a quad edge after
/// rotation.
const EDGE_EPSILON: f32 = 1e-5;

/// A texture as seen by the rasterizer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextureView<'a> {
    pub(crate) contents: Option<&'a FrameContents>,
    pub(crate) size: SurfaceSize,
}

impl TextureView<'_> {
    /// Nearest-neighbour sample at texture coordinates `(s, t)`, with `t = 0`
    /// at the bottom row. Coordinates are clamped to the edge.
    fn sample(&self, s: f32, t: f32) -> Rgba {
        match self.contents {
            None => EMPTY_TEXEL,
            Some(FrameContents::Solid(c)) => *c,
            Some(FrameContents::Pixels(pixels)) => {
                let w = self.size.width();
                let h = self.size.height();
                let col = texel_index(s, w);
                let row = texel_index(1.0 - t, h);
                let index = row as usize * w as usize + col as usize;
                pixels.get(index).copied().unwrap_or(EMPTY_TEXEL)
            }
        }
    }
}

fn texel_index(coord: f32, extent: u32) -> u32 {
    let scaled = (coord * extent as f32).floor();
    if scaled.is_nan() || scaled < 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "scaled is non-negative; values past the edge are clamped below"
    )]
    let index = scaled as u32;
    index.min(extent - 1)
}

/// Fills the whole framebuffer with `color`.
pub(crate) fn clear(framebuffer: &mut [Rgba], color: Rgba) {
    framebuffer.fill(color);
}

/// Draws one tile: a full-viewport quad transformed by `mvp`, textured
/// through the draw's texture transform.
///
/// `inverse_mvp` must be the inverse of the composite MVP.
pub(crate) fn draw_tile(
    framebuffer: &mut [Rgba],
    output: SurfaceSize,
    draw: &TileDraw,
    inverse_mvp: &Mat4,
    texture: TextureView<'_>,
) {
    let vp = draw.viewport;
    let x_end = vp.x1().min(output.width());
    let y_end = vp.y1().min(output.height());
    let vw = vp.width as f32;
    let vh = vp.height as f32;
    let stride = output.width() as usize;

    for py in vp.y..y_end {
        // Viewport-local normalized device coordinates, +y up.
        let ny = 1.0 - ((py - vp.y) as f32 + 0.5) / vh * 2.0;
        for px in vp.x..x_end {
            let nx = ((px - vp.x) as f32 + 0.5) / vw * 2.0 - 1.0;
            let [qx, qy, _, _] = inverse_mvp.transform_point([nx, ny, 0.0, 1.0]);
            if qx.abs() > 1.0 + EDGE_EPSILON || qy.abs() > 1.0 + EDGE_EPSILON {
                continue;
            }
            let u = (qx + 1.0) * 0.5;
            let v = (qy + 1.0) * 0.5;
            let [s, t, _, _] = draw.texture_transform.transform_point([u, v, 0.0, 1.0]);
            framebuffer[py as usize * stride + px as usize] = texture.sample(s, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::layout::TileRect;
    use mosaic_core::surface::TextureHandle;
    use std::sync::Arc;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];
    const CLEAR: Rgba = [0, 255, 0, 0];

    fn size(w: u32, h: u32) -> SurfaceSize {
        SurfaceSize::new(w, h).unwrap()
    }

    fn draw(viewport: TileRect, texture_transform: Mat4) -> TileDraw {
        TileDraw {
            slot: 0,
            texture: TextureHandle(1),
            viewport,
            texture_transform,
        }
    }

    /// 4×2 texture: left half red, right half blue.
    fn halves() -> FrameContents {
        FrameContents::Pixels(Arc::from(vec![RED, RED, BLUE, BLUE, RED, RED, BLUE, BLUE]))
    }

    fn render(mvp: Mat4, texture_transform: Mat4, contents: &FrameContents) -> Vec<Rgba> {
        let out = size(4, 2);
        let mut fb = vec![[0; 4]; 8];
        clear(&mut fb, CLEAR);
        draw_tile(
            &mut fb,
            out,
            &draw(TileRect::new(0, 0, 4, 2), texture_transform),
            &mvp.transpose(),
            TextureView {
                contents: Some(contents),
                size: out,
            },
        );
        fb
    }

    #[test]
    fn identity_copies_texture() {
        let fb = render(Mat4::IDENTITY, Mat4::IDENTITY, &halves());
        assert_eq!(&fb[..4], &[RED, RED, BLUE, BLUE]);
        assert_eq!(&fb[4..], &[RED, RED, BLUE, BLUE]);
    }

    #[test]
    fn half_turn_mirrors_both_axes() {
        let fb = render(Mat4::from_rotation_z_degrees(180.0), Mat4::IDENTITY, &halves());
        assert_eq!(&fb[..4], &[BLUE, BLUE, RED, RED]);
    }

    #[test]
    fn texture_transform_flips_horizontally() {
        let flip = Mat4::from_translation(1.0, 0.0, 0.0) * Mat4::from_scale(-1.0, 1.0, 1.0);
        let fb = render(Mat4::IDENTITY, flip, &halves());
        assert_eq!(&fb[..4], &[BLUE, BLUE, RED, RED]);
    }

    #[test]
    fn draw_stays_inside_viewport() {
        let out = size(4, 2);
        let mut fb = vec![CLEAR; 8];
        let solid = FrameContents::Solid(RED);
        draw_tile(
            &mut fb,
            out,
            &draw(TileRect::new(2, 1, 2, 1), Mat4::IDENTITY),
            &Mat4::IDENTITY,
            TextureView {
                contents: Some(&solid),
                size: size(2, 1),
            },
        );
        assert_eq!(fb, [CLEAR, CLEAR, CLEAR, CLEAR, CLEAR, CLEAR, RED, RED]);
    }

    #[test]
    fn unlatched_texture_is_transparent_black() {
        let out = size(1, 1);
        let mut fb = vec![CLEAR];
        draw_tile(
            &mut fb,
            out,
            &draw(TileRect::new(0, 0, 1, 1), Mat4::IDENTITY),
            &Mat4::IDENTITY,
            TextureView {
                contents: None,
                size: out,
            },
        );
        assert_eq!(fb, [EMPTY_TEXEL]);
    }

    #[test]
    fn texel_index_clamps() {
        assert_eq!(texel_index(-0.5, 4), 0);
        assert_eq!(texel_index(1.0, 4), 3);
        assert_eq!(texel_index(0.49, 4), 1);
        assert_eq!(texel_index(f32::NAN, 4), 0);
    }
}
