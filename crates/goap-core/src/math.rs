use core::ops::{Add, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::State;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Read a position from the `x`/`y` facts of `state`.
    pub fn from_state(state: &State) -> Option<Vec2> {
        Self::from_state_keys(state, "x", "y")
    }

    pub fn from_state_keys(state: &State, x_key: &str, y_key: &str) -> Option<Vec2> {
        let x = state.get_int(x_key)?;
        let y = state.get_int(y_key)?;
        Some(Vec2::new(x as f32, y as f32))
    }

    /// Coordinates truncated toward zero, the way positions are stored as facts.
    pub fn truncated(self) -> (i64, i64) {
        (self.x.trunc() as i64, self.y.trunc() as i64)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Self::Output {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Vec2::new(0.0, 0.0).distance(Vec2::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn from_state_needs_both_coordinates() {
        let state = State::new().with("x", 2).with("y", -3);
        assert_eq!(Vec2::from_state(&state), Some(Vec2::new(2.0, -3.0)));
        assert_eq!(Vec2::from_state(&State::new().with("x", 2)), None);
    }

    #[test]
    fn truncated_rounds_toward_zero() {
        assert_eq!(Vec2::new(2.9, -1.7).truncated(), (2, -1));
    }
}
