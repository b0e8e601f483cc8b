// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Failure injection for [`HeadlessBackend`](crate::HeadlessBackend).
///
/// Every toggle defaults to off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaultToggles {
    /// Context creation fails.
    pub fail_context: bool,
    /// Binding the output surface fails.
    pub fail_make_current: bool,
    /// Program compilation fails.
    pub fail_program: bool,
    /// Allocating the texture with this zero-based index fails.
    pub fail_texture_at: Option<u32>,
    /// Drawing fails once this many frames have been drawn.
    pub fail_draw_after: Option<u64>,
    /// Swapping fails once this many frames have been presented.
    pub fail_swap_after: Option<u64>,
}

impl FaultToggles {
    /// No injected failures.
    pub const NONE: Self = Self {
        fail_context: false,
        fail_make_current: false,
        fail_program: false,
        fail_texture_at: None,
        fail_draw_after: None,
        fail_swap_after: None,
    };

    /// Returns `true` if any toggle is set.
    #[must_use]
    pub fn any(&self) -> bool {
        *self != Self::NONE
    }
}
