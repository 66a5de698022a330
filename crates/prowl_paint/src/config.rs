//! Canvas configuration
//!
//! Every field has a default, so a TOML document only needs the keys it
//! changes:
//!
//! ```toml
//! pixel_ratio = 2.0
//! antialias = false
//! ```

use prowl_core::{CanvasError, Result};
use serde::{Deserialize, Serialize};

/// Construction parameters for a [`Canvas`](crate::Canvas)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Logical-to-device scale; every frame starts from `scale(pixel_ratio)`
    pub pixel_ratio: f32,
    /// Bézier flattening tolerance
    pub tessellation_tolerance: f32,
    /// Target length of one arc segment
    pub round_min_distance: f32,
    /// Widen strokes and outline fills for shader anti-aliasing
    pub antialias: bool,
    pub initial_vertex_capacity: usize,
    pub initial_index_capacity: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            tessellation_tolerance: 0.25,
            round_min_distance: 3.0,
            antialias: true,
            initial_vertex_capacity: 4096,
            initial_index_capacity: 8192,
        }
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl CanvasConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: CanvasConfig =
            toml::from_str(source).map_err(|e| CanvasError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CanvasError::Config(e.to_string()))
    }

    /// Reject values no canvas can work with
    pub fn validate(&self) -> Result<()> {
        if !positive(self.pixel_ratio) {
            return Err(CanvasError::InvalidPixelRatio(self.pixel_ratio));
        }
        if !positive(self.tessellation_tolerance) {
            return Err(CanvasError::InvalidTolerance(self.tessellation_tolerance));
        }
        if !positive(self.round_min_distance) {
            return Err(CanvasError::InvalidSegmentDistance(self.round_min_distance));
        }
        Ok(())
    }

    /// Stroke widening used for anti-aliasing, in device pixels
    pub fn aa_pixel_width(&self) -> f32 {
        if self.antialias {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CanvasConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CanvasConfig::from_toml_str("pixel_ratio = 2.0\nantialias = false\n").unwrap();
        assert_eq!(config.pixel_ratio, 2.0);
        assert!(!config.antialias);
        assert_eq!(config.round_min_distance, 3.0);
        assert_eq!(config.initial_index_capacity, 8192);
    }

    #[test]
    fn test_rejects_bad_pixel_ratio() {
        for ratio in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = CanvasConfig {
                pixel_ratio: ratio,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(CanvasError::InvalidPixelRatio(_))));
        }
    }

    #[test]
    fn test_rejects_bad_flattening() {
        let config = CanvasConfig {
            tessellation_tolerance: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(CanvasError::InvalidTolerance(0.0)));

        let config = CanvasConfig {
            round_min_distance: -3.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(CanvasError::InvalidSegmentDistance(-3.0)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = CanvasConfig::from_toml_str("pixel_ratio = \"big\"").unwrap_err();
        assert!(matches!(err, CanvasError::Config(_)));

        let err = CanvasConfig::from_toml_str("pixel_ratio = -2.0").unwrap_err();
        assert_eq!(err, CanvasError::InvalidPixelRatio(-2.0));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CanvasConfig {
            pixel_ratio: 1.5,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(CanvasConfig::from_toml_str(&text).unwrap(), config);
    }
}
