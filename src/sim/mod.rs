//! Deterministic collision simulation
//!
//! Everything here runs single-threaded to completion within a frame:
//! - Broad phase through a uniform grid rebuilt every frame
//! - Seeded RNG only
//! - Handlers and observers run synchronously, in a stable order

pub mod arc;
pub mod boss;
pub mod entity;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod groups;
pub mod pipeline;
pub mod shield;
pub mod world;

pub use arc::ArcSegment;
pub use boss::{AbilityFlags, Boss, BossKind, BossProfile, HazardSpawn};
pub use entity::{
    Collidable, DamageOutcome, EntityId, Integrity, Participant, Probe, ProbeKind, Shielded, Target,
};
pub use events::{
    Channel, CollisionEvent, DestroyedEvent, EventBus, HitEvent, ParticipantDamagedEvent,
    SplashDamageEvent, SubscriptionId,
};
pub use geometry::{Circle, CollisionResult, Rect, circle_rect_test, distance, normalize_or, reflect};
pub use grid::{CellKey, CellRange, SpatialGrid};
pub use groups::{CandidateStrategy, CollisionGroup, GroupPair, GroupRegistry, PairHandler};
pub use pipeline::{CollisionPipeline, Frame, FrameReport, IndexKey, ProbeOutcome};
pub use shield::{DeflectorShield, ShieldContact};
pub use world::{Actor, Ball, Brick, World, standard_registry};
