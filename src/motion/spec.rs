//! Animation Spec - configurable stagger parameters
//!
//! The knobs content editors can turn. Deserialized from page config in
//! camelCase with every field optional, so a config can override a single
//! value and inherit the rest.

use serde::{Deserialize, Serialize};

use crate::motion::easing::Easing;

/// Parameters for staggered reveal animations.
///
/// Units (words, lines) start `stagger_delay` seconds apart, each fading
/// in over `duration` seconds while rising from `y_offset` pixels below
/// its resting position.
///
/// # Example
///
/// ```
/// use scrollstage::motion::AnimationSpec;
///
/// let spec: AnimationSpec = serde_json::from_str(r#"{"staggerDelay": 0.08}"#).unwrap();
/// assert_eq!(spec.stagger_delay, 0.08);
/// assert_eq!(spec.duration, 0.4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationSpec {
    /// Delay between consecutive units, in seconds.
    pub stagger_delay: f64,
    /// Duration of each unit's animation, in seconds.
    pub duration: f64,
    /// Easing applied to each unit.
    pub ease: Easing,
    /// Starting offset below the resting position, in pixels.
    pub y_offset: f64,
    /// Delay before the first unit starts, in seconds.
    pub initial_delay: f64,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            stagger_delay: 0.05,
            duration: 0.4,
            ease: Easing::CubicOut,
            y_offset: 20.0,
            initial_delay: 0.0,
        }
    }
}

impl AnimationSpec {
    /// House defaults for line-by-line reveals: a wider stagger, since
    /// lines are bigger units than words.
    pub fn lines() -> Self {
        Self {
            stagger_delay: 0.1,
            ..Self::default()
        }
    }

    /// Seconds after start at which unit `index` begins animating.
    pub fn unit_delay(&self, index: usize) -> f64 {
        self.initial_delay + index as f64 * self.stagger_delay
    }

    /// Seconds from start until a sequence of `count` units has fully
    /// played out, counting one full stagger slot per unit plus one
    /// trailing duration.
    pub fn total_duration(&self, count: usize) -> f64 {
        self.initial_delay + self.stagger_delay * count as f64 + self.duration
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = AnimationSpec::default();
        assert_eq!(spec.stagger_delay, 0.05);
        assert_eq!(spec.duration, 0.4);
        assert_eq!(spec.ease, Easing::CubicOut);
        assert_eq!(spec.y_offset, 20.0);
        assert_eq!(spec.initial_delay, 0.0);

        let lines = AnimationSpec::lines();
        assert_eq!(lines.stagger_delay, 0.1);
        assert_eq!(lines.duration, 0.4);
    }

    #[test]
    fn test_unit_delay() {
        let spec = AnimationSpec::default();
        assert_eq!(spec.unit_delay(0), 0.0);
        assert_eq!(spec.unit_delay(4), 0.2);

        let delayed = AnimationSpec {
            initial_delay: 1.0,
            ..AnimationSpec::default()
        };
        assert_eq!(delayed.unit_delay(0), 1.0);
        assert_eq!(delayed.unit_delay(2), 1.1);
    }

    #[test]
    fn test_total_duration() {
        let spec = AnimationSpec {
            stagger_delay: 0.03,
            duration: 0.5,
            ..AnimationSpec::default()
        };
        // 10 units: 0.3 of stagger slots plus the trailing duration
        assert!((spec.total_duration(10) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_partial_config_inherits_defaults() {
        let spec: AnimationSpec =
            serde_json::from_str(r#"{"duration": 1.2, "ease": "power3.out"}"#).unwrap();
        assert_eq!(spec.duration, 1.2);
        assert_eq!(spec.ease, Easing::QuartOut);
        assert_eq!(spec.stagger_delay, 0.05);
        assert_eq!(spec.y_offset, 20.0);
    }

    #[test]
    fn test_round_trip() {
        let spec = AnimationSpec {
            stagger_delay: 0.07,
            duration: 0.6,
            ease: Easing::ExpoOut,
            y_offset: 32.0,
            initial_delay: 0.25,
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: AnimationSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
