//! Bounded camera that seeks a target position at a fixed speed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// Per-axis distance within which [`Camera::nearest_point_to`] matches a
/// waypoint.
pub const POINT_TOLERANCE: f32 = 5.0;

/// Camera construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Minimum world-space corner the camera position may reach
    pub min_bounds: Vec2,
    /// Maximum world-space corner the camera position may reach
    pub max_bounds: Vec2,
    /// Seek speed in world units per second
    pub speed: f32,
    /// Render scale (screen pixels per world unit)
    pub zoom: f32,
    /// Viewport size in screen pixels
    pub viewport: Vec2,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_bounds: Vec2::ZERO,
            max_bounds: Vec2::new(1000.0, 1000.0),
            speed: 100.0,
            zoom: 1.0,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

/// A named world-space waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPoint {
    pub id: String,
    pub position: Vec2,
}

/// Camera with a current position and a seek target, both kept inside
/// `[min_bounds, max_bounds]`.
///
/// The world is drawn with the camera position at the centre of the
/// viewport: `screen = (world - position) * zoom + viewport / 2`.
#[derive(Debug, Clone)]
pub struct Camera {
    min_bounds: Vec2,
    max_bounds: Vec2,
    position: Vec2,
    target: Vec2,
    speed: f32,
    zoom: f32,
    viewport: Vec2,
    /// Waypoints in registration order
    points: Vec<CameraPoint>,
}

fn validate_bounds(min: Vec2, max: Vec2) -> Result<(), CameraError> {
    for (axis, lo, hi) in [('x', min.x, max.x), ('y', min.y, max.y)] {
        // `!(lo <= hi)` also rejects NaN
        if !(lo <= hi) {
            return Err(CameraError::InvalidBounds {
                axis,
                min: lo,
                max: hi,
            });
        }
    }
    Ok(())
}

/// Move `current` toward `target` by at most `step`, landing exactly on the
/// target when it is within reach.
fn approach(current: f32, target: f32, step: f32) -> f32 {
    let remaining = target - current;
    if remaining.abs() <= step {
        target
    } else {
        current + step.copysign(remaining)
    }
}

impl Camera {
    /// Create a camera positioned at `min_bounds`.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        if !(config.speed > 0.0) {
            return Err(CameraError::InvalidSpeed(config.speed));
        }
        if !(config.zoom > 0.0) {
            return Err(CameraError::InvalidZoom(config.zoom));
        }
        validate_bounds(config.min_bounds, config.max_bounds)?;

        Ok(Self {
            min_bounds: config.min_bounds,
            max_bounds: config.max_bounds,
            position: config.min_bounds,
            target: config.min_bounds,
            speed: config.speed,
            zoom: config.zoom,
            viewport: config.viewport,
            points: Vec::new(),
        })
    }

    fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min_bounds, self.max_bounds)
    }

    /// Set a new seek target (clamped). The current position is unchanged;
    /// subsequent ticks move toward it.
    pub fn set_target(&mut self, x: f32, y: f32) -> Vec2 {
        self.target = self.clamp(Vec2::new(x, y));
        self.target
    }

    /// Jump to a position (clamped). The target follows so no motion remains.
    pub fn set_position(&mut self, x: f32, y: f32) -> Vec2 {
        self.position = self.clamp(Vec2::new(x, y));
        self.target = self.position;
        self.position
    }

    /// Replace the bounds, re-clamping position, target and waypoints.
    pub fn set_bounds(&mut self, min: Vec2, max: Vec2) -> Result<(), CameraError> {
        validate_bounds(min, max)?;
        self.min_bounds = min;
        self.max_bounds = max;
        self.position = self.clamp(self.position);
        self.target = self.clamp(self.target);
        for i in 0..self.points.len() {
            self.points[i].position = self.clamp(self.points[i].position);
        }
        Ok(())
    }

    /// Move toward the target by at most `speed * dt` on each axis.
    pub fn tick(&mut self, dt: f32) {
        let step = self.speed * dt.max(0.0);
        self.position = Vec2::new(
            approach(self.position.x, self.target.x, step),
            approach(self.position.y, self.target.y, step),
        );
    }

    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }

    /// Register a waypoint (clamped), replacing any point with the same id in
    /// place.
    pub fn add_point(&mut self, id: impl Into<String>, x: f32, y: f32) {
        let id = id.into();
        let position = self.clamp(Vec2::new(x, y));
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(existing) => existing.position = position,
            None => self.points.push(CameraPoint { id, position }),
        }
    }

    /// Register a batch of waypoints in order, as [`add_point`](Self::add_point)
    /// would one by one.
    pub fn with_points(mut self, points: impl IntoIterator<Item = CameraPoint>) -> Self {
        for point in points {
            self.add_point(point.id, point.position.x, point.position.y);
        }
        self
    }

    /// Remove a waypoint. Unknown ids are ignored.
    pub fn remove_point(&mut self, id: &str) -> Option<CameraPoint> {
        let index = self.points.iter().position(|p| p.id == id)?;
        Some(self.points.remove(index))
    }

    pub fn point(&self, id: &str) -> Option<Vec2> {
        self.points.iter().find(|p| p.id == id).map(|p| p.position)
    }

    /// Waypoints in registration order.
    pub fn points(&self) -> &[CameraPoint] {
        &self.points
    }

    /// First registered waypoint within [`POINT_TOLERANCE`] of `(x, y)` on
    /// both axes.
    pub fn nearest_point_to(&self, x: f32, y: f32) -> Option<&CameraPoint> {
        self.points.iter().find(|p| {
            (p.position.x - x).abs() <= POINT_TOLERANCE
                && (p.position.y - y).abs() <= POINT_TOLERANCE
        })
    }

    /// Jump straight to a waypoint. Returns `false` if it does not exist.
    pub fn snap_to_point(&mut self, id: &str) -> bool {
        match self.point(id) {
            Some(p) => {
                self.set_position(p.x, p.y);
                true
            }
            None => false,
        }
    }

    /// Seek toward a waypoint. Returns `false` if it does not exist.
    pub fn focus_point(&mut self, id: &str) -> bool {
        match self.point(id) {
            Some(p) => {
                self.set_target(p.x, p.y);
                true
            }
            None => false,
        }
    }

    /// Map a screen-space pointer position to the world point drawn there.
    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Vec2 {
        (Vec2::new(sx, sy) - self.viewport * 0.5) / self.zoom + self.position
    }

    /// Inverse of [`screen_to_world`](Self::screen_to_world).
    pub fn world_to_screen(&self, wx: f32, wy: f32) -> Vec2 {
        (Vec2::new(wx, wy) - self.position) * self.zoom + self.viewport * 0.5
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.min_bounds, self.max_bounds)
    }
}
