//! Easing curves for interpolators.

use keyframe::{ease, functions};
use serde::{Deserialize, Serialize};

/// Easing function type for animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EaseType {
    /// Constant speed interpolation
    #[default]
    Linear,
    /// Slow start, fast end
    EaseIn,
    /// Fast start, slow end
    EaseOut,
    /// Slow start and end, fast middle
    EaseInOut,
    /// Quadratic ease out
    QuadOut,
    /// Cubic ease out
    CubicOut,
}

impl EaseType {
    /// Map normalized time (0.0 to 1.0) onto eased progress.
    ///
    /// Linear is computed directly so it stays exact; the curves go through
    /// the keyframe crate.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if *self == EaseType::Linear {
            return t;
        }
        let t = t as f64;
        let result = match self {
            EaseType::Linear => t,
            EaseType::EaseIn => ease(functions::EaseIn, 0.0, 1.0, t),
            EaseType::EaseOut => ease(functions::EaseOut, 0.0, 1.0, t),
            EaseType::EaseInOut => ease(functions::EaseInOut, 0.0, 1.0, t),
            EaseType::QuadOut => ease(functions::EaseOutQuad, 0.0, 1.0, t),
            EaseType::CubicOut => ease(functions::EaseOutCubic, 0.0, 1.0, t),
        };
        result as f32
    }
}

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
