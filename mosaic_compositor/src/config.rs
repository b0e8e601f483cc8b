// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composer configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::gate::{DEFAULT_GATE_CAPACITY, DEFAULT_POLL_INTERVAL};

/// Instance counts the tiling was tuned for.
///
/// Any count of at least one is accepted; these are the grids the layout was
/// designed around (1×1, 2×2, 3×3 with one wide tile, 4×4 with one wide tile,
/// 5×5 with one wide tile).
pub use mosaic_core::layout::PRESET_INSTANCE_COUNTS as SUPPORTED_INSTANCE_COUNTS;

/// Default composition thread name.
pub const DEFAULT_THREAD_NAME: &str = "mosaic-composer";

/// Parameters for a [`VideoComposer`](crate::VideoComposer).
///
/// Every input surface has the same size as the output.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComposerConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: f32,
    /// Counter-clockwise rotation applied to the composite, in degrees.
    pub rotation_degrees: f32,
    /// Number of input streams.
    pub instances: u32,
    /// Per-input backlog bound.
    pub gate_capacity: u32,
    /// Re-poll period for blocked gate callers.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub poll_interval: Duration,
    /// Name of the composition thread.
    pub thread_name: String,
}

impl ComposerConfig {
    /// Creates a configuration with default tunables.
    #[must_use]
    pub fn new(width: u32, height: u32, fps: f32, instances: u32) -> Self {
        Self {
            width,
            height,
            fps,
            rotation_degrees: 0.0,
            instances,
            gate_capacity: DEFAULT_GATE_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }

    /// Sets the composite rotation.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    /// Sets the per-input backlog bound.
    #[must_use]
    pub fn with_gate_capacity(mut self, capacity: u32) -> Self {
        self.gate_capacity = capacity;
        self
    }

    /// Sets the gate re-poll period.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the composition thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Whether `instances` is one of [`SUPPORTED_INSTANCE_COUNTS`].
    #[must_use]
    pub fn is_preset_instance_count(&self) -> bool {
        SUPPORTED_INSTANCE_COUNTS.contains(&self.instances)
    }

    /// Checks every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        if !self.rotation_degrees.is_finite() {
            return Err(ConfigError::InvalidRotation(self.rotation_degrees));
        }
        if self.instances == 0 {
            return Err(ConfigError::NoInstances);
        }
        if self.gate_capacity == 0 {
            return Err(ConfigError::ZeroGateCapacity);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::new(1920, 1080, 30.0, 4)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        s.serialize_u64(ms)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tunables() {
        let config = ComposerConfig::new(1280, 720, 30.0, 8);
        assert_eq!(config.gate_capacity, 10);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.rotation_degrees, 0.0);
        assert_eq!(config.thread_name, "mosaic-composer");
        assert!(config.is_preset_instance_count());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn invalid_fields_are_named() {
        let base = ComposerConfig::default();
        assert_eq!(
            ComposerConfig { width: 0, ..base.clone() }.validate(),
            Err(ConfigError::InvalidSize {
                width: 0,
                height: 1080
            })
        );
        assert_eq!(
            ComposerConfig { fps: 0.0, ..base.clone() }.validate(),
            Err(ConfigError::InvalidFps(0.0))
        );
        assert!(matches!(
            ComposerConfig { fps: f32::NAN, ..base.clone() }.validate(),
            Err(ConfigError::InvalidFps(_))
        ));
        assert!(matches!(
            base.clone().with_rotation(f32::INFINITY).validate(),
            Err(ConfigError::InvalidRotation(_))
        ));
        assert_eq!(
            ComposerConfig { instances: 0, ..base.clone() }.validate(),
            Err(ConfigError::NoInstances)
        );
        assert_eq!(
            base.clone().with_gate_capacity(0).validate(),
            Err(ConfigError::ZeroGateCapacity)
        );
        assert_eq!(
            base.with_poll_interval(Duration::ZERO).validate(),
            Err(ConfigError::ZeroPollInterval)
        );
    }

    #[test]
    fn non_preset_counts_are_accepted() {
        let config = ComposerConfig::new(640, 480, 24.0, 7);
        assert!(!config.is_preset_instance_count());
        assert_eq!(config.validate(), Ok(()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_milliseconds_and_defaults() {
        let config: ComposerConfig =
            serde_json::from_str(r#"{"width":640,"height":360,"fps":24.0,"instances":15,"poll_interval":5}"#)
                .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.gate_capacity, 10);
        assert_eq!(config.instances, 15);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["poll_interval"], 5);
        assert_eq!(json["thread_name"], "mosaic-composer");
    }
}
