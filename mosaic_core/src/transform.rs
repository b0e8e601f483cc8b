// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 matrix for GPU uniforms.
//!
//! Two matrices take part in every tile draw: the composite MVP (a Z rotation
//! applied to the whole output) and the per-input texture transform reported
//! by the producer surface when a frame is latched. Both are uploaded as 16
//! column-major floats, so [`Mat4`] stores exactly that.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 matrix stored as `[[f32; 4]; 4]`.
///
/// Each inner array is one *column*, matching the layout expected by
/// `glUniformMatrix4fv` with `transpose = false`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from 16 column-major floats.
    ///
    /// This is the layout platform texture APIs report transforms in.
    #[inline]
    #[must_use]
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self {
            cols: [
                [m[0], m[1], m[2], m[3]],
                [m[4], m[5], m[6], m[7]],
                [m[8], m[9], m[10], m[11]],
                [m[12], m[13], m[14], m[15]],
            ],
        }
    }

    /// Returns 16 column-major floats, ready for uniform upload.
    #[inline]
    #[must_use]
    pub const fn to_cols_array(&self) -> [f32; 16] {
        let c = &self.cols;
        [
            c[0][0], c[0][1], c[0][2], c[0][3], c[1][0], c[1][1], c[1][2], c[1][3], c[2][0],
            c[2][1], c[2][2], c[2][3], c[3][0], c[3][1], c[3][2], c[3][3],
        ]
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a counter-clockwise rotation around the Z axis.
    #[must_use]
    pub fn from_rotation_z_degrees(degrees: f32) -> Self {
        let radians = f64::from(degrees).to_radians();
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        #[expect(
            clippy::cast_possible_truncation,
            reason = "trigonometry is done in f64 and narrowed for GPU upload"
        )]
        let (s, c) = (s as f32, c as f32);
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns the transpose. For a pure rotation this is its inverse.
    #[must_use]
    pub const fn transpose(&self) -> Self {
        let c = &self.cols;
        Self {
            cols: [
                [c[0][0], c[1][0], c[2][0], c[3][0]],
                [c[0][1], c[1][1], c[2][1], c[3][1]],
                [c[0][2], c[1][2], c[2][2], c[3][2]],
                [c[0][3], c[1][3], c[2][3], c[3][3]],
            ],
        }
    }

    /// Multiplies a column vector: `self * v`.
    #[must_use]
    pub fn transform_point(&self, v: [f32; 4]) -> [f32; 4] {
        let c = &self.cols;
        let mut out = [0.0_f32; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = c[0][i] * v[0] + c[1][i] * v[1] + c[2][i] * v[2] + c[3][i] * v[3];
        }
        out
    }

    /// Returns `true` if every element is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Mat4 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f32; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn approx(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPS)
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Mat4::default(), Mat4::IDENTITY);
        assert_eq!(Mat4::IDENTITY * Mat4::IDENTITY, Mat4::IDENTITY);
    }

    #[test]
    fn cols_array_layout() {
        let t = Mat4::from_translation(1.0, 2.0, 3.0);
        let arr = t.to_cols_array();
        assert_eq!(&arr[12..16], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(Mat4::from_cols_array(arr), t);
    }

    #[test]
    fn rotation_ninety_degrees_turns_x_into_y() {
        let r = Mat4::from_rotation_z_degrees(90.0);
        assert!(approx(r.transform_point([1.0, 0.0, 0.0, 1.0]), [0.0, 1.0, 0.0, 1.0]));
        let back = r.transpose().transform_point([0.0, 1.0, 0.0, 1.0]);
        assert!(approx(back, [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn zero_rotation_is_identity() {
        assert_eq!(Mat4::from_rotation_z_degrees(0.0), Mat4::IDENTITY);
    }

    #[test]
    fn scale_then_translate() {
        let m = Mat4::from_translation(0.5, 0.0, 0.0) * Mat4::from_scale(2.0, 3.0, 1.0);
        assert!(approx(m.transform_point([1.0, 1.0, 0.0, 1.0]), [2.5, 3.0, 0.0, 1.0]));
    }

    #[test]
    fn non_finite_detected() {
        let mut m = Mat4::IDENTITY;
        assert!(m.is_finite());
        m.cols[3][1] = f32::NAN;
        assert!(!m.is_finite());
    }
}
