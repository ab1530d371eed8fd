//! Capability contracts for everything the collision core touches
//!
//! The core never owns gameplay entities. It reads extents and flags through
//! these traits and mutates integrity or velocity through them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, Rect};
use super::groups::CollisionGroup;
use super::shield::DeflectorShield;

/// Stable entity identifier used in events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Anything with an extent that can take part in a frame's collisions
pub trait Collidable {
    fn id(&self) -> EntityId;

    /// Current extent. `None` excludes the entity from this frame.
    fn bounds(&self) -> Option<Rect>;

    fn is_active(&self) -> bool;
}

/// Outcome of one `take_damage` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// This call crossed integrity to zero. False if it was already destroyed.
    pub just_destroyed: bool,
    /// Center captured before destruction
    pub center: Vec2,
}

/// Something that can be hit and destroyed
pub trait Target: Collidable {
    fn is_indestructible(&self) -> bool;

    fn take_damage(&mut self, amount: f32) -> DamageOutcome;
}

/// Probe categories. Modifiers and base damage are looked up per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    Ball,
    Projectile,
    Bomb,
}

/// A moving circle that hits targets (ball, projectile, bomb)
pub trait Probe: Collidable {
    fn kind(&self) -> ProbeKind;

    fn circle(&self) -> Circle;

    fn velocity(&self) -> Vec2;

    /// Base damage before critical multipliers
    fn damage(&self) -> f32;

    /// React to a solid contact with the given surface normal
    fn bounce(&mut self, normal: Vec2);

    /// Flip vertical direction (paddle contact)
    fn reverse_y(&mut self);

    /// Add sideways velocity without changing speed (paddle english)
    fn deflect(&mut self, _lateral: f32) {}

    /// Whether a previously started piercing timer is still running
    fn piercing_active(&self) -> bool;

    fn start_piercing(&mut self, duration: f32);
}

/// Participant in generic group-pair dispatch
pub trait Participant: Collidable {
    fn collision_group(&self) -> CollisionGroup;

    /// Called once per overlapping pair, symmetrically for both sides
    fn on_collision(&mut self, _other: CollisionGroup, _other_bounds: Rect) {}
}

/// Capability query for boss-like targets with a rotating deflector
pub trait Shielded: Target {
    fn deflector_shield(&self) -> Option<&DeflectorShield>;

    /// Remaining integrity as a percentage of maximum
    fn integrity_percent(&self) -> f32;
}

/// Mutable integrity shared by destructible entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Integrity {
    pub current: f32,
    pub max: f32,
    pub indestructible: bool,
}

impl Integrity {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            indestructible: false,
        }
    }

    pub fn indestructible() -> Self {
        Self {
            current: 1.0,
            max: 1.0,
            indestructible: true,
        }
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        !self.indestructible && self.current <= 0.0
    }

    /// Subtract `amount`, clamping at zero. Returns true only on the call that
    /// crosses from alive to destroyed.
    pub fn apply(&mut self, amount: f32) -> bool {
        if self.indestructible || self.is_destroyed() {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.current <= 0.0
    }

    pub fn percent(&self) -> f32 {
        if self.indestructible || self.max <= 0.0 {
            100.0
        } else {
            (self.current / self.max * 100.0).clamp(0.0, 100.0)
        }
    }
}
