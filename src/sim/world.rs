//! Concrete gameplay entities and a fixed-timestep world
//!
//! The collision core only sees the capability traits; this module supplies
//! one set of types implementing them, owns their storage, and steps a whole
//! frame (movement, boss abilities, collision, cleanup).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, BossKind, BossProfile};
use super::entity::{Collidable, DamageOutcome, EntityId, Integrity, Participant, Probe, ProbeKind, Target};
use super::events::{EventBus, ParticipantDamagedEvent};
use super::geometry::{Circle, Rect, reflect};
use super::groups::{CollisionGroup, GroupRegistry};
use super::pipeline::{CollisionPipeline, Frame, FrameReport};
use crate::config::Tuning;
use crate::consts::*;

/// Side length of a thrown hazard
pub const HAZARD_SIZE: f32 = 10.0;

/// A moving circular probe: ball, projectile or bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: EntityId,
    pub kind: ProbeKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub active: bool,
    /// Seconds of piercing left
    pub piercing_timer: f32,
}

impl Ball {
    pub fn new(id: EntityId, kind: ProbeKind, pos: Vec2, vel: Vec2, damage: f32) -> Self {
        let radius = match kind {
            ProbeKind::Ball => BALL_RADIUS,
            ProbeKind::Projectile => PROJECTILE_RADIUS,
            ProbeKind::Bomb => BOMB_RADIUS,
        };
        Self {
            id,
            kind,
            pos,
            vel,
            radius,
            damage,
            active: true,
            piercing_timer: 0.0,
        }
    }

    /// Integrate position and count down piercing
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.piercing_timer = (self.piercing_timer - dt).max(0.0);
    }

    /// Bounce off the arena's left, right and top walls. Falling out of the
    /// bottom deactivates the probe.
    pub fn confine(&mut self, arena: &Rect) {
        let (min, max) = (arena.min(), arena.max());
        if self.pos.x - self.radius < min.x && self.vel.x < 0.0 {
            self.pos.x = min.x + self.radius;
            self.vel.x = -self.vel.x;
        } else if self.pos.x + self.radius > max.x && self.vel.x > 0.0 {
            self.pos.x = max.x - self.radius;
            self.vel.x = -self.vel.x;
        }
        if self.pos.y - self.radius < min.y && self.vel.y < 0.0 {
            self.pos.y = min.y + self.radius;
            self.vel.y = -self.vel.y;
        }
        if self.pos.y - self.radius > max.y {
            log::debug!("{:?} {:?} left the arena", self.kind, self.id);
            self.active = false;
        }
    }
}

impl Collidable for Ball {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Option<Rect> {
        self.active.then(|| self.circle().bounds())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Probe for Ball {
    fn kind(&self) -> ProbeKind {
        self.kind
    }

    fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn damage(&self) -> f32 {
        self.damage
    }

    fn bounce(&mut self, normal: Vec2) {
        match self.kind {
            ProbeKind::Ball => {
                // Already moving away: leave it
                if self.vel.dot(normal) < 0.0 {
                    self.vel = reflect(self.vel, normal);
                }
            }
            ProbeKind::Projectile | ProbeKind::Bomb => self.active = false,
        }
    }

    fn reverse_y(&mut self) {
        self.vel.y = -self.vel.y;
    }

    fn deflect(&mut self, lateral: f32) {
        let speed = self.vel.length();
        let bent = Vec2::new(self.vel.x + lateral * speed, self.vel.y);
        self.vel = bent.normalize_or_zero() * speed;
    }

    fn piercing_active(&self) -> bool {
        self.piercing_timer > 0.0
    }

    fn start_piercing(&mut self, duration: f32) {
        self.piercing_timer = self.piercing_timer.max(duration);
    }
}

/// Static rectangular target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: EntityId,
    pub rect: Rect,
    pub integrity: Integrity,
}

impl Collidable for Brick {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Option<Rect> {
        self.is_active().then_some(self.rect)
    }

    fn is_active(&self) -> bool {
        !self.integrity.is_destroyed()
    }
}

impl Target for Brick {
    fn is_indestructible(&self) -> bool {
        self.integrity.indestructible
    }

    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        DamageOutcome {
            just_destroyed: self.integrity.apply(amount),
            center: self.rect.center(),
        }
    }
}

/// Generic dispatch participant: the paddle and boss hazards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: EntityId,
    pub group: CollisionGroup,
    pub rect: Rect,
    pub vel: Vec2,
    pub active: bool,
    pub integrity: Option<Integrity>,
    /// Overlaps seen through the collision callback
    pub contacts: u32,
}

impl Actor {
    pub fn new(id: EntityId, group: CollisionGroup, rect: Rect) -> Self {
        Self {
            id,
            group,
            rect,
            vel: Vec2::ZERO,
            active: true,
            integrity: None,
            contacts: 0,
        }
    }

    pub fn with_integrity(mut self, max: f32) -> Self {
        self.integrity = Some(Integrity::new(max));
        self
    }
}

impl Collidable for Actor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Option<Rect> {
        self.is_active().then_some(self.rect)
    }

    fn is_active(&self) -> bool {
        self.active && !self.integrity.is_some_and(|i| i.is_destroyed())
    }
}

impl Participant for Actor {
    fn collision_group(&self) -> CollisionGroup {
        self.group
    }

    fn on_collision(&mut self, _other: CollisionGroup, _other_bounds: Rect) {
        self.contacts += 1;
    }
}

/// Paddle-vs-hazard rule: the paddle loses integrity, the hazard is consumed
pub fn standard_registry(hazard_damage: f32) -> GroupRegistry<Actor> {
    let mut registry = GroupRegistry::new();
    registry.register(
        CollisionGroup::Paddle,
        CollisionGroup::Hazard,
        move |paddle: &mut Actor, hazard: &mut Actor, bus: &mut EventBus| {
            hazard.active = false;
            if let Some(integrity) = &mut paddle.integrity {
                integrity.apply(hazard_damage);
                bus.damaged.publish(ParticipantDamagedEvent {
                    participant: paddle.id,
                    percent: integrity.percent(),
                });
            }
        },
    );
    registry
}

/// Everything one arena needs to run frames
#[derive(Debug)]
pub struct World {
    pub arena: Rect,
    pub probes: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub bosses: Vec<Boss>,
    /// Paddle and hazards
    pub actors: Vec<Actor>,
    pub events: EventBus,
    pub time_ticks: u64,
    pipeline: CollisionPipeline,
    registry: GroupRegistry<Actor>,
    next_id: u32,
}

impl World {
    pub fn new(tuning: Tuning, arena: Rect) -> Self {
        let registry = standard_registry(tuning.hazard_damage);
        Self {
            arena,
            probes: Vec::new(),
            bricks: Vec::new(),
            bosses: Vec::new(),
            actors: Vec::new(),
            events: EventBus::new(),
            time_ticks: 0,
            pipeline: CollisionPipeline::new(tuning),
            registry,
            next_id: 1,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        self.pipeline.tuning()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Spawn a probe with the tuned base damage for its kind
    pub fn spawn_probe(&mut self, kind: ProbeKind, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let damage = self.pipeline.tuning().probe(kind).base_damage;
        self.probes.push(Ball::new(id, kind, pos, vel, damage));
        id
    }

    pub fn add_brick(&mut self, rect: Rect, integrity: f32) -> EntityId {
        let id = self.next_entity_id();
        self.bricks.push(Brick {
            id,
            rect,
            integrity: Integrity::new(integrity),
        });
        id
    }

    pub fn add_wall(&mut self, rect: Rect) -> EntityId {
        let id = self.next_entity_id();
        self.bricks.push(Brick {
            id,
            rect,
            integrity: Integrity::indestructible(),
        });
        id
    }

    /// Lay a `cols` x `rows` block of standard bricks from `origin`
    pub fn lay_bricks(&mut self, origin: Vec2, cols: u32, rows: u32, integrity: f32) {
        for row in 0..rows {
            for col in 0..cols {
                let x = origin.x + col as f32 * BRICK_WIDTH;
                let y = origin.y + row as f32 * BRICK_HEIGHT;
                self.add_brick(Rect::new(x, y, BRICK_WIDTH, BRICK_HEIGHT), integrity);
            }
        }
    }

    pub fn spawn_paddle(&mut self, rect: Rect, integrity: f32) -> EntityId {
        let id = self.next_entity_id();
        self.actors
            .push(Actor::new(id, CollisionGroup::Paddle, rect).with_integrity(integrity));
        id
    }

    pub fn spawn_boss(&mut self, kind: BossKind, center: Vec2, size: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.bosses
            .push(Boss::spawn(id, BossProfile::preset(kind), center, size));
        id
    }

    pub fn paddle(&self) -> Option<&Actor> {
        self.actors
            .iter()
            .find(|a| a.group == CollisionGroup::Paddle && a.is_active())
    }

    pub fn paddle_mut(&mut self) -> Option<&mut Actor> {
        self.actors
            .iter_mut()
            .find(|a| a.group == CollisionGroup::Paddle && a.is_active())
    }

    /// Bricks that can still be destroyed
    pub fn bricks_remaining(&self) -> usize {
        self.bricks
            .iter()
            .filter(|b| b.is_active() && !b.is_indestructible())
            .count()
    }

    /// Advance one fixed timestep
    pub fn step(&mut self, dt: f32) -> FrameReport {
        self.time_ticks += 1;

        for probe in &mut self.probes {
            probe.advance(dt);
            probe.confine(&self.arena);
        }

        let mut spawns = Vec::new();
        for boss in &mut self.bosses {
            spawns.extend(boss.update(dt));
        }
        for spawn in spawns {
            let id = self.next_entity_id();
            let rect = Rect::from_center(spawn.position, Vec2::splat(HAZARD_SIZE));
            let mut hazard = Actor::new(id, CollisionGroup::Hazard, rect);
            hazard.vel = spawn.velocity;
            self.actors.push(hazard);
        }

        let arena = self.arena;
        for actor in &mut self.actors {
            if actor.group != CollisionGroup::Hazard {
                continue;
            }
            actor.rect = actor.rect.translated(actor.vel * dt);
            if actor.rect.min().y > arena.max().y {
                actor.active = false;
            }
        }

        let paddle = self.paddle().and_then(|p| p.bounds());
        let report = self.pipeline.run_frame(
            Frame {
                probes: &mut self.probes,
                targets: &mut self.bricks,
                bosses: &mut self.bosses,
                participants: &mut self.actors,
                paddle,
            },
            &self.registry,
            &mut self.events,
        );

        self.probes.retain(|p| p.active);
        self.bricks.retain(|b| b.is_active());
        // Keep a destroyed paddle around so its state stays inspectable
        self.actors
            .retain(|a| a.group == CollisionGroup::Paddle || a.is_active());

        report
    }
}
