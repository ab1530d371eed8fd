//! Brickstorm - collision core for a brick-breaker arena
//!
//! Core modules:
//! - `sim`: Deterministic collision detection and resolution (broad-phase grid,
//!   circle/rectangle geometry, gameplay rules, typed events)
//! - `config`: Data-driven tuning for damage and probe modifiers

pub mod config;
pub mod sim;

pub use config::{ConfigError, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Default spatial grid cell size (a small multiple of the brick height)
    pub const DEFAULT_CELL_SIZE: f32 = 64.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_SPEED: f32 = 300.0;
    pub const BALL_DAMAGE: f32 = 1.0;

    /// Projectile defaults (fired from the paddle)
    pub const PROJECTILE_RADIUS: f32 = 3.0;
    pub const PROJECTILE_DAMAGE: f32 = 1.0;

    /// Bomb defaults
    pub const BOMB_RADIUS: f32 = 6.0;
    pub const BOMB_DAMAGE: f32 = 2.0;
    pub const BOMB_SPLASH_RADIUS: f32 = 48.0;

    /// Brick defaults
    pub const BRICK_WIDTH: f32 = 48.0;
    pub const BRICK_HEIGHT: f32 = 20.0;

    /// Damage a hazard deals to the paddle
    pub const HAZARD_DAMAGE: f32 = 1.0;

    /// Fraction of ball speed converted to sideways deflection at the paddle edge
    pub const PADDLE_ENGLISH: f32 = 0.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
