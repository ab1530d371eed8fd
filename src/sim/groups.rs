//! Collision groups and pair handler registry
//!
//! Handlers are keyed by an unordered pair of groups and configured once at
//! setup. The registry is read-only while a frame resolves.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::events::EventBus;

/// Closed set of collision categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollisionGroup {
    Ball,
    Projectile,
    Bomb,
    Brick,
    Paddle,
    BossBody,
    BossShield,
    Hazard,
}

/// How a group gathers candidates during generic dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStrategy {
    /// Query the spatial index around the participant
    SpatialIndex,
    /// Scan every other participant directly
    Pairwise,
}

impl CollisionGroup {
    pub const ALL: [CollisionGroup; 8] = [
        CollisionGroup::Ball,
        CollisionGroup::Projectile,
        CollisionGroup::Bomb,
        CollisionGroup::Brick,
        CollisionGroup::Paddle,
        CollisionGroup::BossBody,
        CollisionGroup::BossShield,
        CollisionGroup::Hazard,
    ];

    /// Probe-like groups are numerous and query the grid; the rest are few
    /// enough that a direct scan is cheaper.
    pub fn strategy(self) -> CandidateStrategy {
        match self {
            CollisionGroup::Ball | CollisionGroup::Projectile | CollisionGroup::Bomb => {
                CandidateStrategy::SpatialIndex
            }
            _ => CandidateStrategy::Pairwise,
        }
    }
}

/// Unordered pair of groups: `GroupPair::new(a, b) == GroupPair::new(b, a)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupPair(CollisionGroup, CollisionGroup);

impl GroupPair {
    pub fn new(a: CollisionGroup, b: CollisionGroup) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn groups(&self) -> (CollisionGroup, CollisionGroup) {
        (self.0, self.1)
    }
}

/// Gameplay rule for an overlapping pair. Arguments arrive in the order the
/// groups were given to [`GroupRegistry::register`].
pub type PairHandler<X> = Box<dyn Fn(&mut X, &mut X, &mut EventBus)>;

struct Binding<X> {
    /// Group the handler expects as its first argument
    first: CollisionGroup,
    handler: PairHandler<X>,
}

/// Handler bindings keyed by unordered group pairs
pub struct GroupRegistry<X> {
    bindings: FxHashMap<GroupPair, Binding<X>>,
}

impl<X> Default for GroupRegistry<X> {
    fn default() -> Self {
        Self {
            bindings: FxHashMap::default(),
        }
    }
}

impl<X> std::fmt::Debug for GroupRegistry<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("pairs", &self.registered_pairs())
            .finish()
    }
}

impl<X> GroupRegistry<X> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to the pair (a, b). A later registration for the same
    /// unordered pair replaces the earlier one.
    pub fn register(
        &mut self,
        a: CollisionGroup,
        b: CollisionGroup,
        handler: impl Fn(&mut X, &mut X, &mut EventBus) + 'static,
    ) {
        let pair = GroupPair::new(a, b);
        let replaced = self
            .bindings
            .insert(
                pair,
                Binding {
                    first: a,
                    handler: Box::new(handler),
                },
            )
            .is_some();
        if replaced {
            log::warn!("Collision handler for {:?} <-> {:?} replaced", a, b);
        } else {
            log::info!("Collision handler registered: {:?} <-> {:?}", a, b);
        }
    }

    /// Handler bound to the pair, with the group it expects first
    pub fn handler_for(&self, a: CollisionGroup, b: CollisionGroup) -> Option<(CollisionGroup, &PairHandler<X>)> {
        self.bindings
            .get(&GroupPair::new(a, b))
            .map(|binding| (binding.first, &binding.handler))
    }

    pub fn is_registered(&self, a: CollisionGroup, b: CollisionGroup) -> bool {
        self.bindings.contains_key(&GroupPair::new(a, b))
    }

    /// Registered pairs in a stable order
    pub fn registered_pairs(&self) -> Vec<GroupPair> {
        let mut pairs: Vec<_> = self.bindings.keys().copied().collect();
        pairs.sort_by_key(|p| p.groups());
        pairs
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run the handler for an overlapping pair, if one is bound.
    ///
    /// Swaps the arguments when needed so the handler sees the groups in its
    /// registration order. Returns whether a handler ran.
    pub fn invoke(
        &self,
        a: &mut X,
        group_a: CollisionGroup,
        b: &mut X,
        group_b: CollisionGroup,
        bus: &mut EventBus,
    ) -> bool {
        let Some((first, handler)) = self.handler_for(group_a, group_b) else {
            return false;
        };
        if first == group_a {
            handler(a, b, bus);
        } else {
            handler(b, a, bus);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Tag(&'static str);

    #[test]
    fn test_pair_is_unordered() {
        assert_eq!(
            GroupPair::new(CollisionGroup::Paddle, CollisionGroup::Hazard),
            GroupPair::new(CollisionGroup::Hazard, CollisionGroup::Paddle)
        );
        assert_eq!(
            GroupPair::new(CollisionGroup::Hazard, CollisionGroup::Paddle).groups(),
            (CollisionGroup::Paddle, CollisionGroup::Hazard)
        );
    }

    #[test]
    fn test_handler_sees_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry: GroupRegistry<Tag> = GroupRegistry::new();
        let s = Rc::clone(&seen);
        registry.register(CollisionGroup::Paddle, CollisionGroup::Hazard, move |a, b, _| {
            s.borrow_mut().push((a.0, b.0));
        });

        let mut bus = EventBus::new();
        let mut hazard = Tag("hazard");
        let mut paddle = Tag("paddle");
        // Called hazard-first, handler still receives paddle first
        assert!(registry.invoke(
            &mut hazard,
            CollisionGroup::Hazard,
            &mut paddle,
            CollisionGroup::Paddle,
            &mut bus
        ));
        assert_eq!(*seen.borrow(), vec![("paddle", "hazard")]);
    }

    #[test]
    fn test_last_registration_wins() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry: GroupRegistry<Tag> = GroupRegistry::new();
        let c1 = Rc::clone(&calls);
        registry.register(CollisionGroup::Brick, CollisionGroup::Projectile, move |_, _, _| {
            c1.borrow_mut().push(1)
        });
        let c2 = Rc::clone(&calls);
        registry.register(CollisionGroup::Projectile, CollisionGroup::Brick, move |_, _, _| {
            c2.borrow_mut().push(2)
        });
        assert_eq!(registry.len(), 1);

        let mut bus = EventBus::new();
        registry.invoke(
            &mut Tag("p"),
            CollisionGroup::Projectile,
            &mut Tag("b"),
            CollisionGroup::Brick,
            &mut bus,
        );
        assert_eq!(*calls.borrow(), vec![2]);

        let (first, _) = registry
            .handler_for(CollisionGroup::Brick, CollisionGroup::Projectile)
            .expect("bound");
        assert_eq!(first, CollisionGroup::Projectile);
    }

    #[test]
    fn test_unregistered_pair_runs_nothing() {
        let registry: GroupRegistry<Tag> = GroupRegistry::new();
        let mut bus = EventBus::new();
        assert!(!registry.is_registered(CollisionGroup::Ball, CollisionGroup::Hazard));
        assert!(!registry.invoke(
            &mut Tag("a"),
            CollisionGroup::Ball,
            &mut Tag("b"),
            CollisionGroup::Hazard,
            &mut bus
        ));
    }

    #[test]
    fn test_strategy_split() {
        assert_eq!(CollisionGroup::Projectile.strategy(), CandidateStrategy::SpatialIndex);
        assert_eq!(CollisionGroup::Paddle.strategy(), CandidateStrategy::Pairwise);
        assert_eq!(
            CollisionGroup::ALL
                .iter()
                .filter(|g| g.strategy() == CandidateStrategy::SpatialIndex)
                .count(),
            3
        );
    }
}
