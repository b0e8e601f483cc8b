// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface sizes and texture identification.
//!
//! [`TextureHandle`] is a lightweight handle identifying a GPU texture that an
//! input slot renders into. Backends assign these; core treats them as opaque.
//!
//! [`SurfaceSize`] is a validated, strictly positive pixel size.

use core::fmt;

/// Opaque identifier for a backend-owned texture.
///
/// Assigned once when the composition loop allocates its input textures and
/// never reassigned afterwards.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureHandle(pub u32);

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureHandle({})", self.0)
    }
}

/// A pixel size with both dimensions greater than zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    width: u32,
    height: u32,
}

impl SurfaceSize {
    /// Creates a size, rejecting zero dimensions.
    pub const fn new(width: u32, height: u32) -> Result<Self, InvalidSurfaceSize> {
        if width == 0 || height == 0 {
            return Err(InvalidSurfaceSize {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self { width, height })
    }

    /// Creates a size from signed dimensions, rejecting zero or negative
    /// values.
    pub fn from_signed(width: i32, height: i32) -> Result<Self, InvalidSurfaceSize> {
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Self::new(w, h),
            _ => Err(InvalidSurfaceSize {
                width: i64::from(width),
                height: i64::from(height),
            }),
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(self) -> u32 {
        self.height
    }

    /// Number of pixels covered by this size.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Returned when a surface is requested with a zero or negative dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSurfaceSize {
    /// The rejected width.
    pub width: i64,
    /// The rejected height.
    pub height: i64,
}

impl fmt::Display for InvalidSurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid surface resolution {}x{}: both dimensions must be positive",
            self.width, self.height
        )
    }
}

impl core::error::Error for InvalidSurfaceSize {}
