//! Transition direction and its numeric encoding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// How the incoming scene enters: cross-fade or a slide from one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Fade,
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn is_slide(&self) -> bool {
        *self != Direction::Fade
    }

    /// Where the incoming scene starts, off-screen on the side it comes from.
    ///
    /// Screen y grows downward, so "up" is negative.
    pub fn entry_offset(&self, viewport: Vec2) -> Vec2 {
        match self {
            Direction::Fade => Vec2::ZERO,
            Direction::Up => Vec2::new(0.0, -viewport.y),
            Direction::Right => Vec2::new(viewport.x, 0.0),
            Direction::Down => Vec2::new(0.0, viewport.y),
            Direction::Left => Vec2::new(-viewport.x, 0.0),
        }
    }

    /// Where the outgoing scene ends: the opposite side.
    pub fn exit_offset(&self, viewport: Vec2) -> Vec2 {
        -self.entry_offset(viewport)
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Direction::Fade => 0,
            Direction::Up => 1,
            Direction::Right => 2,
            Direction::Down => 3,
            Direction::Left => 4,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = TransitionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Fade),
            1 => Ok(Direction::Up),
            2 => Ok(Direction::Right),
            3 => Ok(Direction::Down),
            4 => Ok(Direction::Left),
            other => Err(TransitionError::InvalidDirection(other)),
        }
    }
}
