//! Time-based value animation.
//!
//! [`Interpolator`] animates one [`Property`] over a fixed duration and
//! [`InterpolatorController`] advances every running interpolator once per
//! frame.

mod controller;
mod easing;
mod interpolator;
mod property;

pub use controller::{InterpolatorController, InterpolatorId};
pub use easing::{lerp, EaseType};
pub use interpolator::Interpolator;
pub use property::Property;
