//! Time-based animation of a single numeric attribute.

use std::fmt;

use super::easing::{lerp, EaseType};
use super::property::Property;
use crate::error::AnimationError;

type CompletionCallback = Box<dyn FnOnce()>;

/// Animates one [`Property`] from `start` to `end` over `duration` seconds.
///
/// Once elapsed time reaches the duration the property is set to `end`
/// exactly and the completion callback (if any) runs once. Further calls to
/// [`advance`](Self::advance) do nothing.
pub struct Interpolator {
    target: Property,
    start: f32,
    end: f32,
    /// Total duration (seconds), always > 0
    duration: f32,
    /// Elapsed time (seconds)
    elapsed: f32,
    easing: EaseType,
    on_complete: Option<CompletionCallback>,
    finished: bool,
}

impl Interpolator {
    /// Create an interpolator from explicit start and end values.
    ///
    /// Fails with [`AnimationError::InvalidDuration`] unless `duration > 0`.
    pub fn new(target: Property, start: f32, end: f32, duration: f32) -> Result<Self, AnimationError> {
        // Written so NaN is rejected too
        if !(duration > 0.0) {
            return Err(AnimationError::InvalidDuration(duration));
        }
        Ok(Self {
            target,
            start,
            end,
            duration,
            elapsed: 0.0,
            easing: EaseType::Linear,
            on_complete: None,
            finished: false,
        })
    }

    /// Animate from the property's current value to `end`.
    pub fn towards(target: Property, end: f32, duration: f32) -> Result<Self, AnimationError> {
        let start = target.get();
        Self::new(target, start, end, duration)
    }

    /// Use a non-linear easing curve.
    pub fn with_easing(mut self, easing: EaseType) -> Self {
        self.easing = easing;
        self
    }

    /// Register the callback fired when the animation finishes.
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Advance by `dt` seconds.
    ///
    /// Returns `true` while the animation is still in progress, `false` once
    /// complete.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.finished {
            return false;
        }

        self.elapsed += dt.max(0.0);

        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.target.set(self.end);
            self.finished = true;
            log::trace!("{} reached {}", self.target.name(), self.end);
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            return false;
        }

        let t = self.easing.apply(self.elapsed / self.duration);
        self.target.set(lerp(self.start, self.end, t));
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Normalized progress in [0, 1].
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Remaining animation time in seconds.
    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }

    pub fn target(&self) -> &Property {
        &self.target
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpolator")
            .field("target", &self.target)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("easing", &self.easing)
            .field("finished", &self.finished)
            .finish()
    }
}
