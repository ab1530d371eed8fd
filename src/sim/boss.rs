//! Data-driven boss behavior
//!
//! Each boss is a behavior record plus ability flags. Collision code asks for
//! capabilities (`deflector_shield()`), never for the concrete boss kind.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Collidable, DamageOutcome, EntityId, Integrity, Shielded, Target};
use super::geometry::Rect;
use super::shield::DeflectorShield;

bitflags! {
    /// Abilities a boss profile enables
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AbilityFlags: u8 {
        /// Rotating shield segments that reflect probes
        const DEFLECTOR_SHIELD = 1 << 0;
        /// Periodically throws hazards at the paddle
        const THROWER = 1 << 1;
        /// Throws two hazards in a spread instead of one
        const SPREAD_THROW = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossKind {
    Warden,
    Juggler,
    Sentinel,
}

/// Behavior record selected by kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    pub kind: BossKind,
    /// Horizontal patrol speed (read by the movement system, not the collision core)
    pub move_speed: f32,
    /// Seconds between hazard throws
    pub throw_interval: f32,
    pub abilities: AbilityFlags,
    pub max_integrity: f32,
}

impl BossProfile {
    pub fn preset(kind: BossKind) -> Self {
        match kind {
            BossKind::Warden => Self {
                kind,
                move_speed: 40.0,
                throw_interval: 0.0,
                abilities: AbilityFlags::DEFLECTOR_SHIELD,
                max_integrity: 30.0,
            },
            BossKind::Juggler => Self {
                kind,
                move_speed: 80.0,
                throw_interval: 2.0,
                abilities: AbilityFlags::THROWER | AbilityFlags::SPREAD_THROW,
                max_integrity: 20.0,
            },
            BossKind::Sentinel => Self {
                kind,
                move_speed: 25.0,
                throw_interval: 3.5,
                abilities: AbilityFlags::DEFLECTOR_SHIELD | AbilityFlags::THROWER,
                max_integrity: 45.0,
            },
        }
    }

    pub fn has(&self, ability: AbilityFlags) -> bool {
        self.abilities.contains(ability)
    }
}

/// Hazard thrown by a boss this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Hazard fall speed
const HAZARD_SPEED: f32 = 160.0;
/// Sideways component of a spread throw
const SPREAD_SPEED: f32 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub profile: BossProfile,
    pub body: Rect,
    pub integrity: Integrity,
    pub shield: Option<DeflectorShield>,
    throw_timer: f32,
}

impl Boss {
    /// Spawn a boss centered at `center`. The shield is created only if the
    /// profile grants it.
    pub fn spawn(id: EntityId, profile: BossProfile, center: Vec2, size: Vec2) -> Self {
        let body = Rect::from_center(center, size);
        let shield = profile.has(AbilityFlags::DEFLECTOR_SHIELD).then(|| {
            let radius = size.length() / 2.0 + 16.0;
            DeflectorShield::new(center, radius, 8.0, 4, 0.35).with_angular_velocity(1.2)
        });
        log::info!("Boss {:?} spawned ({:?})", profile.kind, profile.abilities);
        Self {
            id,
            profile,
            body,
            integrity: Integrity::new(profile.max_integrity),
            shield,
            throw_timer: profile.throw_interval,
        }
    }

    /// Run every enabled ability for one timestep
    pub fn update(&mut self, dt: f32) -> Vec<HazardSpawn> {
        if self.integrity.is_destroyed() {
            return Vec::new();
        }
        let mut spawns = Vec::new();
        for ability in self.profile.abilities.iter() {
            if ability == AbilityFlags::DEFLECTOR_SHIELD {
                self.update_shield(dt);
            } else if ability == AbilityFlags::THROWER {
                self.update_thrower(dt, &mut spawns);
            }
        }
        spawns
    }

    fn update_shield(&mut self, dt: f32) {
        if let Some(shield) = &mut self.shield {
            shield.center = self.body.center();
            shield.rotate(dt);
        }
    }

    fn update_thrower(&mut self, dt: f32, spawns: &mut Vec<HazardSpawn>) {
        if self.profile.throw_interval <= 0.0 {
            return;
        }
        self.throw_timer -= dt;
        if self.throw_timer > 0.0 {
            return;
        }
        self.throw_timer += self.profile.throw_interval;

        let origin = Vec2::new(self.body.center().x, self.body.max().y);
        if self.profile.has(AbilityFlags::SPREAD_THROW) {
            for side in [-1.0, 1.0] {
                spawns.push(HazardSpawn {
                    position: origin,
                    velocity: Vec2::new(side * SPREAD_SPEED, HAZARD_SPEED),
                });
            }
        } else {
            spawns.push(HazardSpawn {
                position: origin,
                velocity: Vec2::new(0.0, HAZARD_SPEED),
            });
        }
    }
}

impl Collidable for Boss {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Option<Rect> {
        self.is_active().then_some(self.body)
    }

    fn is_active(&self) -> bool {
        !self.integrity.is_destroyed()
    }
}

impl Target for Boss {
    fn is_indestructible(&self) -> bool {
        self.integrity.indestructible
    }

    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        let center = self.body.center();
        DamageOutcome {
            just_destroyed: self.integrity.apply(amount),
            center,
        }
    }
}

impl Shielded for Boss {
    fn deflector_shield(&self) -> Option<&DeflectorShield> {
        self.shield.as_ref()
    }

    fn integrity_percent(&self) -> f32 {
        self.integrity.percent()
    }
}
