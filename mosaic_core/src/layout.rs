// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile-grid layout for N input streams on one output frame.
//!
//! [`TileLayout`] assigns each input index one rectangular tile of the
//! output. The layout is a pure function of `(instances, width, height)`:
//! computing it twice always yields the same rectangles.
//!
//! # Grid shape
//!
//! ```text
//! grid_cols = ceil(sqrt(N))
//! grid_rows = ceil(N / grid_cols)
//! extra     = grid_cols * grid_rows - N
//! ```
//!
//! Cells are filled left-to-right, top-to-bottom. While `extra > 0`, the cell
//! that lands in column `grid_cols - 2` is widened to span the last two
//! columns, consuming one unit of `extra`. Every row therefore ends flush with
//! the right edge, e.g. for N = 7 (3×3 grid, two extra cells):
//!
//! ```text
//! ┌───┬───────┐
//! │ 0 │   1   │
//! ├───┼───────┤
//! │ 2 │   3   │
//! ├───┼───┬───┤
//! │ 4 │ 5 │ 6 │
//! └───┴───┴───┘
//! ```
//!
//! # Pixel snapping
//!
//! Grid line `i` of `n` over an extent `e` sits at `floor(i * e / n)`. A tile
//! starts on its first grid line and ends on the grid line after its last
//! cell, so neighbours share edges exactly and the last line is the output
//! edge itself. The union of all tiles covers `[0, width) × [0, height)` with
//! no gaps and no overdraw.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::surface::SurfaceSize;

/// Input counts offered by the surrounding application's presets.
///
/// Any count `>= 1` is accepted; these are the configurations the layout is
/// exercised with most.
pub const PRESET_INSTANCE_COUNTS: [u32; 5] = [1, 4, 8, 15, 24];

/// An integer pixel rectangle with a top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TileRect {
    /// Creates a rectangle from origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn x1(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn y1(&self) -> u32 {
        self.y + self.height
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the pixel at `(px, py)` lies inside this tile.
    #[inline]
    #[must_use]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x1() && py >= self.y && py < self.y1()
    }

    /// Converts to a [`kurbo::Rect`] in output pixel space.
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x1()),
            f64::from(self.y1()),
        )
    }
}

impl From<TileRect> for Rect {
    fn from(tile: TileRect) -> Self {
        tile.to_rect()
    }
}

/// Reasons a layout cannot be computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// At least one input stream is required.
    NoInstances,
    /// The output is too small to give every grid cell at least one pixel.
    OutputTooSmall {
        /// Output size that was requested.
        size: SurfaceSize,
        /// Grid columns the instance count needs.
        grid_cols: u32,
        /// Grid rows the instance count needs.
        grid_rows: u32,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoInstances => f.write_str("tile layout needs at least one instance"),
            Self::OutputTooSmall {
                size,
                grid_cols,
                grid_rows,
            } => write!(
                f,
                "output {}x{} is too small for a {grid_cols}x{grid_rows} tile grid",
                size.width(),
                size.height()
            ),
        }
    }
}

impl core::error::Error for LayoutError {}

/// The tile rectangles for one `(instances, size)` configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayout {
    size: SurfaceSize,
    grid_cols: u32,
    grid_rows: u32,
    extra: u32,
    tiles: Vec<TileRect>,
}

impl TileLayout {
    /// Computes the layout for `instances` inputs on an output of `size`.
    pub fn new(instances: u32, size: SurfaceSize) -> Result<Self, LayoutError> {
        if instances == 0 {
            return Err(LayoutError::NoInstances);
        }
        let (grid_cols, grid_rows, extra) = grid_shape(instances);
        if size.width() < grid_cols || size.height() < grid_rows {
            return Err(LayoutError::OutputTooSmall {
                size,
                grid_cols,
                grid_rows,
            });
        }

        let mut tiles = Vec::with_capacity(instances as usize);
        let mut remaining_extra = extra;
        let (mut row, mut col) = (0_u32, 0_u32);
        for _ in 0..instances {
            let span = if remaining_extra > 0 && col + 2 == grid_cols {
                remaining_extra -= 1;
                2
            } else {
                1
            };

            let x0 = grid_line(col, grid_cols, size.width());
            let x1 = grid_line(col + span, grid_cols, size.width());
            let y0 = grid_line(row, grid_rows, size.height());
            let y1 = grid_line(row + 1, grid_rows, size.height());
            tiles.push(TileRect::new(x0, y0, x1 - x0, y1 - y0));

            col += span;
            if col == grid_cols {
                col = 0;
                row += 1;
            }
        }

        Ok(Self {
            size,
            grid_cols,
            grid_rows,
            extra,
            tiles,
        })
    }

    /// Output size the layout was computed for.
    #[must_use]
    pub const fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn grid_cols(&self) -> u32 {
        self.grid_cols
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn grid_rows(&self) -> u32 {
        self.grid_rows
    }

    /// Number of grid cells absorbed by widened tiles.
    #[must_use]
    pub const fn extra_cells(&self) -> u32 {
        self.extra
    }

    /// Number of tiles (equal to the instance count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always `false`; a layout has at least one tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile for input `index`, if in range.
    #[must_use]
    pub fn tile(&self, index: usize) -> Option<TileRect> {
        self.tiles.get(index).copied()
    }

    /// All tiles in input index order.
    #[must_use]
    pub fn tiles(&self) -> &[TileRect] {
        &self.tiles
    }
}

/// `(cols, rows, extra)` for `instances >= 1`, computed without floating
/// point.
///
/// `cols * rows` can reach `2^32`, so `extra` is derived from the cells used
/// in the last row instead of from that product.
fn grid_shape(instances: u32) -> (u32, u32, u32) {
    let root = instances.isqrt();
    let cols = if root * root == instances {
        root
    } else {
        root + 1
    };
    let rows = instances.div_ceil(cols);
    let last_row = instances - (rows - 1) * cols;
    (cols, rows, cols - last_row)
}

/// Pixel position of grid line `index` out of `count` across `extent`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "index <= count, so the quotient never exceeds extent"
)]
fn grid_line(index: u32, count: u32, extent: u32) -> u32 {
    (u64::from(index) * u64::from(extent) / u64::from(count)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(instances: u32, width: u32, height: u32) -> TileLayout {
        TileLayout::new(instances, SurfaceSize::new(width, height).unwrap()).unwrap()
    }

    /// Checks that the tiles cover the output exactly once.
    fn assert_exact_cover(layout: &TileLayout) {
        let size = layout.size();
        let bounds = Rect::new(0.0, 0.0, f64::from(size.width()), f64::from(size.height()));
        let mut total = 0_u64;
        for (i, a) in layout.tiles().iter().enumerate() {
            assert!(a.width > 0 && a.height > 0, "tile {i} is empty: {a:?}");
            assert!(
                a.x1() <= size.width() && a.y1() <= size.height(),
                "tile {i} leaves the output: {a:?}"
            );
            assert_eq!(bounds.intersect(a.to_rect()).area(), a.to_rect().area());
            for (j, b) in layout.tiles().iter().enumerate().skip(i + 1) {
                let overlap = a.to_rect().intersect(b.to_rect());
                assert!(
                    overlap.area() == 0.0,
                    "tiles {i} and {j} overlap: {a:?} {b:?}"
                );
            }
            total += a.area();
        }
        assert_eq!(total, size.area(), "tiles must cover the whole output");
    }

    #[test]
    fn four_way_grid_is_quadrants() {
        let l = layout(4, 1920, 1080);
        assert_eq!((l.grid_cols(), l.grid_rows(), l.extra_cells()), (2, 2, 0));
        assert_eq!(
            l.tiles(),
            &[
                TileRect::new(0, 0, 960, 540),
                TileRect::new(960, 0, 960, 540),
                TileRect::new(0, 540, 960, 540),
                TileRect::new(960, 540, 960, 540),
            ]
        );
    }

    #[test]
    fn fifteen_way_grid_has_one_widened_tile() {
        let l = layout(15, 1920, 1080);
        assert_eq!((l.grid_cols(), l.grid_rows(), l.extra_cells()), (4, 4, 1));
        assert_eq!(l.len(), 15);

        let widened: Vec<_> = l.tiles().iter().filter(|t| t.width == 960).collect();
        assert_eq!(widened, [&TileRect::new(960, 0, 960, 270)]);
        assert_eq!(
            l.tiles()
                .iter()
                .filter(|t| t.width == 480 && t.height == 270)
                .count(),
            14
        );
        assert_exact_cover(&l);
    }

    #[test]
    fn single_instance_fills_output() {
        let l = layout(1, 1280, 720);
        assert_eq!(l.tiles(), &[TileRect::new(0, 0, 1280, 720)]);
    }

    #[test]
    fn seven_instances_widen_first_two_rows() {
        let l = layout(7, 300, 300);
        assert_eq!((l.grid_cols(), l.grid_rows(), l.extra_cells()), (3, 3, 2));
        assert_eq!(l.tile(1), Some(TileRect::new(100, 0, 200, 100)));
        assert_eq!(l.tile(3), Some(TileRect::new(100, 100, 200, 100)));
        assert_eq!(l.tile(6), Some(TileRect::new(200, 200, 100, 100)));
        assert_exact_cover(&l);
    }

    #[test]
    fn preset_counts_cover_exactly() {
        for n in PRESET_INSTANCE_COUNTS {
            let l = layout(n, 1920, 1080);
            assert_eq!(l.len(), n as usize);
            assert_exact_cover(&l);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        for n in PRESET_INSTANCE_COUNTS {
            assert_eq!(layout(n, 1921, 1079), layout(n, 1921, 1079));
        }
    }

    #[test]
    fn arbitrary_counts_cover_exactly() {
        for n in 1..=100_u32 {
            for (w, h) in [(n, n), (n + 7, 3 * n + 1), (1920, 1080), (1001, 997)] {
                let l = layout(n, w, h);
                assert_eq!(l.len(), n as usize, "n={n} {w}x{h}");
                assert_exact_cover(&l);
            }
        }
    }

    #[test]
    fn rejects_degenerate_requests() {
        let size = SurfaceSize::new(4, 4).unwrap();
        assert_eq!(TileLayout::new(0, size), Err(LayoutError::NoInstances));
        assert_eq!(
            TileLayout::new(24, size),
            Err(LayoutError::OutputTooSmall {
                size,
                grid_cols: 5,
                grid_rows: 5,
            })
        );
    }

    #[test]
    fn grid_shape_matches_definition() {
        for n in 1..=200_u32 {
            let (cols, rows, extra) = grid_shape(n);
            assert!(cols * cols >= n && (cols - 1) * (cols - 1) < n, "cols for {n}");
            assert_eq!(rows, n.div_ceil(cols), "rows for {n}");
            assert_eq!(extra, cols * rows - n, "extra for {n}");
        }
    }

    #[test]
    fn grid_shape_does_not_overflow_near_u32_max() {
        assert_eq!(grid_shape(u32::MAX), (65_536, 65_536, 1));
        assert_eq!(grid_shape(65_535 * 65_535), (65_535, 65_535, 0));
        assert_eq!(grid_shape(65_535 * 65_535 + 1), (65_536, 65_535, 65_534));
    }

    #[test]
    fn tile_rect_contains_is_half_open() {
        let t = TileRect::new(10, 20, 5, 5);
        assert!(t.contains(10, 20));
        assert!(t.contains(14, 24));
        assert!(!t.contains(15, 24));
        assert!(!t.contains(14, 25));
    }
}
