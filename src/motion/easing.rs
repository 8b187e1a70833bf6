//! Easing curves for motion controllers.

use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized animation progress.
///
/// Serialized in snake_case. The web-tooling names for the power family
/// (`power1.out`, `power2.out`, `power3.out`) are accepted as aliases so
/// configs authored against those tools keep working.
///
/// # Example
///
/// ```
/// use scrollstage::motion::Easing;
///
/// let ease = Easing::CubicOut;
/// assert_eq!(ease.evaluate(0.0), 0.0);
/// assert_eq!(ease.evaluate(1.0), 1.0);
/// assert_eq!(ease.evaluate(0.5), 0.875);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Quadratic ease-out.
    #[serde(alias = "power1.out")]
    QuadOut,
    /// Cubic ease-out. The house default for reveals.
    #[default]
    #[serde(alias = "power2.out")]
    CubicOut,
    /// Quartic ease-out.
    #[serde(alias = "power3.out")]
    QuartOut,
    /// Cubic ease on both ends, for position glides.
    CubicInOut,
    /// Exponential ease-out, very fast start.
    ExpoOut,
}

impl Easing {
    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    pub fn evaluate(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t).powi(2),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
