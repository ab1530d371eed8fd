//! Typed event channels
//!
//! One channel per event kind, so payloads are checked at compile time.
//! Publishing calls subscribers in subscription order, then buffers the event
//! for consumers that prefer to drain once per frame (scoring, tests).
//! Nothing in the collision core subscribes to its own events.

use glam::Vec2;

use super::entity::EntityId;
use super::geometry::Rect;

/// A probe struck a target (damage is 0 for indestructible targets)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub target: EntityId,
    pub damage: f32,
    pub is_critical: bool,
    pub position: Vec2,
}

/// A target's integrity crossed to zero on this hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyedEvent {
    pub target: EntityId,
    /// Center captured at destruction time
    pub position: Vec2,
    pub is_critical: bool,
}

/// Area damage applied around a primary hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplashDamageEvent {
    pub target: EntityId,
    pub damage: f32,
    pub position: Vec2,
}

/// A non-probe participant (boss, paddle) lost integrity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticipantDamagedEvent {
    pub participant: EntityId,
    /// Remaining integrity, 0-100
    pub percent: f32,
}

/// Two dispatch participants overlap (always emitted, handler or not)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub bounds_a: Rect,
    pub bounds_b: Rect,
}

/// Handle returned by [`Channel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Subscriber<E> = Box<dyn FnMut(&E)>;

/// Publish/subscribe channel for a single event type
pub struct Channel<E> {
    subscribers: Vec<(SubscriptionId, Subscriber<E>)>,
    pending: Vec<E>,
    next_id: u32,
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            pending: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> std::fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<E> Channel<E> {
    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: E) {
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
        self.pending.push(event);
    }

    /// Events published since the last drain
    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, E> {
        self.pending.drain(..)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// All outbound channels of the collision core
#[derive(Debug, Default)]
pub struct EventBus {
    pub hit: Channel<HitEvent>,
    pub destroyed: Channel<DestroyedEvent>,
    pub splash: Channel<SplashDamageEvent>,
    pub damaged: Channel<ParticipantDamagedEvent>,
    pub collision: Channel<CollisionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop buffered events on every channel (subscribers stay)
    pub fn clear(&mut self) {
        self.hit.clear();
        self.destroyed.clear();
        self.splash.clear();
        self.damaged.clear();
        self.collision.clear();
    }
}
