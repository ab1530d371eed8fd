//! Collision resolution pipeline
//!
//! Per frame: clear the grid, reinsert every active target and dispatch
//! participant, run each probe against its broad-phase candidates, then run
//! generic group-pair dispatch. Everything runs to completion on the calling
//! thread.
//!
//! Candidate order within one query is cell-enumeration order. Two equally
//! near targets resolve in whatever order the grid yields them.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Collidable, Participant, Probe, ProbeKind, Shielded, Target};
use super::events::{
    CollisionEvent, DestroyedEvent, EventBus, HitEvent, ParticipantDamagedEvent,
    SplashDamageEvent,
};
use super::geometry::{Circle, Rect, circle_rect_test};
use super::grid::SpatialGrid;
use super::groups::{CandidateStrategy, GroupRegistry};
use crate::config::{Modifiers, Splash, Tuning};
use crate::consts::PADDLE_ENGLISH;

/// What the spatial index stores: an index into the frame's target or
/// participant slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Target(usize),
    Participant(usize),
}

/// Everything one frame resolves. Slices are borrowed for the frame only.
pub struct Frame<'a, P, T, B, X> {
    pub probes: &'a mut [P],
    pub targets: &'a mut [T],
    pub bosses: &'a mut [B],
    pub participants: &'a mut [X],
    /// Paddle extent for ball returns
    pub paddle: Option<Rect>,
}

/// Result of resolving one probe against one set of candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Narrow-phase contacts that were resolved
    pub contacts: usize,
    /// Targets destroyed by the primary hits and their splash
    pub destroyed: usize,
    /// Whether the probe bounced (and stopped evaluating candidates)
    pub bounced: bool,
}

impl ProbeOutcome {
    fn absorb(&mut self, other: ProbeOutcome) {
        self.contacts += other.contacts;
        self.destroyed += other.destroyed;
        self.bounced |= other.bounced;
    }
}

/// Frame summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub probes: usize,
    pub contacts: usize,
    pub destroyed: usize,
    /// Participant pairs dispatched this frame
    pub pairs: usize,
}

/// Frame orchestrator. Owns the spatial index and the roll RNG; the event
/// bus and handler registry are passed in.
#[derive(Debug)]
pub struct CollisionPipeline {
    grid: SpatialGrid<IndexKey>,
    tuning: Tuning,
    rng: Pcg32,
    scratch: Vec<IndexKey>,
}

impl CollisionPipeline {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            grid: SpatialGrid::new(tuning.cell_size),
            rng: Pcg32::seed_from_u64(tuning.seed),
            tuning,
            scratch: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn grid(&self) -> &SpatialGrid<IndexKey> {
        &self.grid
    }

    /// Resolve one whole frame in the fixed order: index, probes, dispatch
    pub fn run_frame<P, T, B, X>(
        &mut self,
        frame: Frame<'_, P, T, B, X>,
        registry: &GroupRegistry<X>,
        bus: &mut EventBus,
    ) -> FrameReport
    where
        P: Probe,
        T: Target,
        B: Shielded,
        X: Participant,
    {
        let Frame {
            probes,
            targets,
            bosses,
            participants,
            paddle,
        } = frame;

        self.rebuild_index(targets, participants);

        let mut report = FrameReport::default();
        for probe in probes.iter_mut() {
            if !probe.is_active() || probe.bounds().is_none() {
                continue;
            }
            report.probes += 1;

            let mut outcome = self.resolve_probe(probe, targets, bus);
            for boss in bosses.iter_mut() {
                if outcome.bounced || !probe.is_active() {
                    break;
                }
                outcome.absorb(self.resolve_boss(probe, boss, bus));
            }
            if let Some(paddle) = paddle {
                if probe.is_active() && self.resolve_paddle(probe, &paddle) {
                    outcome.contacts += 1;
                }
            }

            report.contacts += outcome.contacts;
            report.destroyed += outcome.destroyed;
        }

        report.pairs = self.dispatch(participants, registry, bus);

        log::debug!(
            "Frame: {} probes, {} contacts, {} destroyed, {} pairs (grid {} entities)",
            report.probes,
            report.contacts,
            report.destroyed,
            report.pairs,
            self.grid.len()
        );
        report
    }

    /// Clear the grid and insert every active target and participant.
    ///
    /// Probe and dispatch passes index into the same slices given here.
    pub fn rebuild_index<T: Target, X: Participant>(&mut self, targets: &[T], participants: &[X]) {
        self.grid.clear();
        for (i, target) in targets.iter().enumerate() {
            if target.is_active() {
                self.grid.insert(IndexKey::Target(i), target.bounds());
            }
        }
        for (i, participant) in participants.iter().enumerate() {
            if participant.is_active() {
                self.grid.insert(IndexKey::Participant(i), participant.bounds());
            }
        }
    }

    /// Run one probe against its broad-phase candidates.
    ///
    /// Candidates are gathered once before any damage is applied. The probe
    /// keeps going only while it pierces targets it actually destroys; the
    /// first bounce ends the pass.
    pub fn resolve_probe<P: Probe, T: Target>(
        &mut self,
        probe: &mut P,
        targets: &mut [T],
        bus: &mut EventBus,
    ) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::default();
        let circle = probe.circle();
        let modifiers = self.tuning.probe(probe.kind()).modifiers;

        let mut candidates = std::mem::take(&mut self.scratch);
        self.grid.query_into(&circle.bounds(), &mut candidates);

        for &key in &candidates {
            let IndexKey::Target(index) = key else {
                continue;
            };
            let Some(target) = targets.get_mut(index) else {
                continue;
            };
            if !target.is_active() {
                continue;
            }
            let Some(bounds) = target.bounds() else {
                continue;
            };
            let contact = circle_rect_test(&circle, &bounds);
            if !contact.collided {
                continue;
            }
            outcome.contacts += 1;

            if target.is_indestructible() {
                probe.bounce(contact.normal);
                bus.hit.publish(HitEvent {
                    target: target.id(),
                    damage: 0.0,
                    is_critical: false,
                    position: bounds.center(),
                });
                log::trace!("Probe {:?} bounced off indestructible {:?}", probe.id(), target.id());
                outcome.bounced = true;
                break;
            }

            let piercing = self.roll_piercing(probe, &modifiers);
            let (damage, is_critical) = self.roll_damage(probe.damage(), &modifiers);

            let result = target.take_damage(damage);
            bus.hit.publish(HitEvent {
                target: target.id(),
                damage,
                is_critical,
                position: result.center,
            });
            if result.just_destroyed {
                outcome.destroyed += 1;
                bus.destroyed.publish(DestroyedEvent {
                    target: target.id(),
                    position: result.center,
                    is_critical,
                });
            }
            log::trace!(
                "Probe {:?} hit {:?} for {} (crit={}, pierce={}, destroyed={})",
                probe.id(),
                target.id(),
                damage,
                is_critical,
                piercing,
                result.just_destroyed
            );

            if let Some(splash) = modifiers.splash {
                if self.roll(splash.chance) {
                    outcome.destroyed += self.apply_splash(index, result.center, &splash, targets, bus);
                }
            }

            // Piercing only carries through a target this hit destroyed
            if !(piercing && result.just_destroyed) {
                probe.bounce(contact.normal);
                outcome.bounced = true;
                break;
            }
        }

        self.scratch = candidates;
        outcome
    }

    /// Damage every other destructible target within the splash radius of
    /// `center`. Splash never triggers further splash. Returns how many
    /// targets it destroyed.
    pub fn apply_splash<T: Target>(
        &mut self,
        origin: usize,
        center: Vec2,
        splash: &Splash,
        targets: &mut [T],
        bus: &mut EventBus,
    ) -> usize {
        let area = Circle::new(center, splash.radius());
        let victims = self.grid.query_circle(center, area.radius);
        let mut destroyed = 0;

        for key in victims {
            let IndexKey::Target(index) = key else {
                continue;
            };
            if index == origin {
                continue;
            }
            let Some(target) = targets.get_mut(index) else {
                continue;
            };
            if !target.is_active() || target.is_indestructible() {
                continue;
            }
            let Some(bounds) = target.bounds() else {
                continue;
            };
            if !circle_rect_test(&area, &bounds).collided {
                continue;
            }

            let result = target.take_damage(splash.damage);
            bus.splash.publish(SplashDamageEvent {
                target: target.id(),
                damage: splash.damage,
                position: result.center,
            });
            bus.hit.publish(HitEvent {
                target: target.id(),
                damage: splash.damage,
                is_critical: false,
                position: result.center,
            });
            if result.just_destroyed {
                destroyed += 1;
                bus.destroyed.publish(DestroyedEvent {
                    target: target.id(),
                    position: result.center,
                    is_critical: false,
                });
            }
        }
        destroyed
    }

    /// Run one probe against a boss.
    ///
    /// A deflector shield is tested first; a segment hit reflects the probe
    /// across the radial normal and the body takes nothing. Otherwise the body
    /// rectangle takes the hit and the probe always bounces.
    pub fn resolve_boss<P: Probe, B: Shielded>(
        &mut self,
        probe: &mut P,
        boss: &mut B,
        bus: &mut EventBus,
    ) -> ProbeOutcome {
        let mut outcome = ProbeOutcome::default();
        if !boss.is_active() {
            return outcome;
        }
        let circle = probe.circle();
        let velocity = probe.velocity();

        // A probe already leaving the struck surface was reflected on an earlier frame
        if let Some(contact) = boss
            .deflector_shield()
            .and_then(|s| s.contact(&circle))
            .filter(|c| velocity.dot(c.normal) < 0.0)
        {
            log::trace!(
                "Probe {:?} deflected by shield segment {} of {:?}",
                probe.id(),
                contact.segment,
                boss.id()
            );
            probe.bounce(contact.normal);
            outcome.contacts = 1;
            outcome.bounced = true;
            return outcome;
        }

        let Some(bounds) = boss.bounds() else {
            return outcome;
        };
        let contact = circle_rect_test(&circle, &bounds);
        if !contact.collided {
            return outcome;
        }
        outcome.contacts = 1;
        outcome.bounced = true;

        if boss.is_indestructible() {
            probe.bounce(contact.normal);
            bus.hit.publish(HitEvent {
                target: boss.id(),
                damage: 0.0,
                is_critical: false,
                position: bounds.center(),
            });
            return outcome;
        }

        let modifiers = self.tuning.probe(probe.kind()).modifiers;
        let (damage, is_critical) = self.roll_damage(probe.damage(), &modifiers);
        let result = boss.take_damage(damage);

        bus.hit.publish(HitEvent {
            target: boss.id(),
            damage,
            is_critical,
            position: result.center,
        });
        bus.damaged.publish(ParticipantDamagedEvent {
            participant: boss.id(),
            percent: boss.integrity_percent(),
        });
        if result.just_destroyed {
            outcome.destroyed = 1;
            bus.destroyed.publish(DestroyedEvent {
                target: boss.id(),
                position: result.center,
                is_critical,
            });
            log::info!("Boss {:?} destroyed", boss.id());
        }

        probe.bounce(contact.normal);
        outcome
    }

    /// Return a ball off the paddle. Top-face contacts flip vertical velocity
    /// and add sideways english from the hit offset; side contacts reflect.
    /// Only balls moving into the paddle are affected.
    pub fn resolve_paddle<P: Probe>(&mut self, probe: &mut P, paddle: &Rect) -> bool {
        if probe.kind() != ProbeKind::Ball {
            return false;
        }
        let circle = probe.circle();
        let contact = circle_rect_test(&circle, paddle);
        if !contact.collided || probe.velocity().dot(contact.normal) >= 0.0 {
            return false;
        }

        if contact.normal.y < 0.0 && contact.normal.x.abs() < f32::EPSILON {
            let half_width = (paddle.w / 2.0).max(f32::EPSILON);
            let offset = ((circle.center.x - paddle.center().x) / half_width).clamp(-1.0, 1.0);
            probe.reverse_y();
            probe.deflect(offset * PADDLE_ENGLISH);
        } else {
            probe.bounce(contact.normal);
        }
        true
    }

    /// Generic group-pair dispatch over participants.
    ///
    /// Pairs are collected up front, sorted and deduplicated, so the grid and
    /// the direct scan produce the same pairing. Each overlapping pair runs
    /// its registered handler (if any), then both participants' own
    /// callbacks, then a collision notification. Returns how many pairs were
    /// dispatched; pairs whose side an earlier handler consumed are skipped.
    pub fn dispatch<X: Participant>(
        &mut self,
        participants: &mut [X],
        registry: &GroupRegistry<X>,
        bus: &mut EventBus,
    ) -> usize {
        let pairs = self.overlapping_pairs(participants);
        let mut dispatched = 0;

        for &(i, j) in &pairs {
            let (a, b) = pair_mut(participants, i, j);
            // An earlier handler may have consumed one side
            if !a.is_active() || !b.is_active() {
                continue;
            }
            let (Some(bounds_a), Some(bounds_b)) = (a.bounds(), b.bounds()) else {
                continue;
            };
            let group_a = a.collision_group();
            let group_b = b.collision_group();

            let handled = registry.invoke(a, group_a, b, group_b, bus);
            a.on_collision(group_b, bounds_b);
            b.on_collision(group_a, bounds_a);
            bus.collision.publish(CollisionEvent {
                a: a.id(),
                b: b.id(),
                bounds_a,
                bounds_b,
            });
            log::trace!(
                "Dispatch {:?} <-> {:?} (handler: {})",
                group_a,
                group_b,
                handled
            );
            dispatched += 1;
        }
        dispatched
    }

    /// Sorted, deduplicated `(i, j)` pairs (i < j) of overlapping participants
    pub fn overlapping_pairs<X: Participant>(&mut self, participants: &[X]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        let mut candidates = std::mem::take(&mut self.scratch);

        for (i, a) in participants.iter().enumerate() {
            if !a.is_active() {
                continue;
            }
            let Some(bounds_a) = a.bounds() else {
                continue;
            };

            let mut consider = |j: usize| {
                if j == i {
                    return;
                }
                let b = &participants[j];
                if !b.is_active() {
                    return;
                }
                if let Some(bounds_b) = b.bounds() {
                    if bounds_a.overlaps(&bounds_b) {
                        pairs.push((i.min(j), i.max(j)));
                    }
                }
            };

            match a.collision_group().strategy() {
                CandidateStrategy::SpatialIndex => {
                    self.grid.query_into(&bounds_a, &mut candidates);
                    for &key in &candidates {
                        if let IndexKey::Participant(j) = key {
                            if j < participants.len() {
                                consider(j);
                            }
                        }
                    }
                }
                CandidateStrategy::Pairwise => {
                    for j in 0..participants.len() {
                        consider(j);
                    }
                }
            }
        }

        self.scratch = candidates;
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Piercing is on if a timer is already running, or a fresh roll
    /// succeeds. A successful roll with a duration starts the timer.
    fn roll_piercing<P: Probe>(&mut self, probe: &mut P, modifiers: &Modifiers) -> bool {
        if probe.piercing_active() {
            return true;
        }
        let Some(piercing) = modifiers.piercing else {
            return false;
        };
        if !self.roll(piercing.chance) {
            return false;
        }
        if piercing.duration > 0.0 {
            probe.start_piercing(piercing.duration);
        }
        true
    }

    fn roll_damage(&mut self, base: f32, modifiers: &Modifiers) -> (f32, bool) {
        match modifiers.critical {
            Some(critical) if self.roll(critical.chance) => (base * critical.multiplier, true),
            _ => (base, false),
        }
    }

    /// Zero never fires (and consumes no randomness); one always fires
    fn roll(&mut self, chance: f32) -> bool {
        chance > 0.0 && self.rng.random::<f32>() < chance
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<X>(items: &mut [X], i: usize, j: usize) -> (&mut X, &mut X) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
