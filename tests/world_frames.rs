//! Whole-frame scenarios driven through `World::step`

use glam::Vec2;

use brickstorm::config::{Piercing, Tuning};
use brickstorm::consts::SIM_DT;
use brickstorm::polar_to_cartesian;
use brickstorm::sim::{BossKind, Collidable, DeflectorShield, ProbeKind, Rect, World};

fn arena() -> Rect {
    Rect::new(0.0, 0.0, 640.0, 480.0)
}

fn run(world: &mut World, frames: u32) {
    for _ in 0..frames {
        world.step(SIM_DT);
    }
}

#[test]
fn test_ball_destroys_brick_and_bounces() {
    let mut world = World::new(Tuning::default(), arena());
    world.add_brick(Rect::new(300.0, 100.0, 40.0, 20.0), 1.0);
    world.spawn_probe(ProbeKind::Ball, Vec2::new(320.0, 135.0), Vec2::new(0.0, -300.0));

    run(&mut world, 10);

    assert_eq!(world.bricks_remaining(), 0);
    assert_eq!(world.events.destroyed.pending().len(), 1);
    assert_eq!(world.probes.len(), 1);
    assert!(world.probes[0].vel.y > 0.0, "ball should be heading back down");
}

#[test]
fn test_piercing_timer_carries_through_column() {
    let mut tuning = Tuning::default();
    tuning.ball.modifiers.piercing = Some(Piercing {
        chance: 1.0,
        duration: 1.0,
    });
    let mut world = World::new(tuning, arena());
    for y in [100.0, 70.0, 40.0] {
        world.add_brick(Rect::new(300.0, y, 40.0, 20.0), 1.0);
    }
    world.spawn_probe(ProbeKind::Ball, Vec2::new(320.0, 135.0), Vec2::new(0.0, -300.0));

    run(&mut world, 60);

    assert_eq!(world.bricks_remaining(), 0);
    assert_eq!(world.events.destroyed.pending().len(), 3);
    // Passed through all three, then came back off the top wall
    assert!(world.probes[0].vel.y > 0.0);
}

#[test]
fn test_wall_stops_piercing_ball() {
    let mut tuning = Tuning::default();
    tuning.ball.modifiers.piercing = Some(Piercing {
        chance: 1.0,
        duration: 5.0,
    });
    let mut world = World::new(tuning, arena());
    let wall = world.add_wall(Rect::new(300.0, 100.0, 40.0, 20.0));
    world.spawn_probe(ProbeKind::Ball, Vec2::new(320.0, 135.0), Vec2::new(0.0, -300.0));

    run(&mut world, 10);

    assert_eq!(world.bricks.len(), 1);
    assert!(world.probes[0].vel.y > 0.0);
    let hits = world.events.hit.pending();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.target == wall && h.damage == 0.0));
    assert!(world.events.destroyed.pending().is_empty());
}

#[test]
fn test_bomb_splash_clears_neighbours() {
    let mut world = World::new(Tuning::default(), arena());
    // Three 48-wide bricks side by side; the bomb strikes the middle one
    world.lay_bricks(Vec2::new(200.0, 100.0), 3, 1, 1.0);
    world.spawn_probe(ProbeKind::Bomb, Vec2::new(272.0, 135.0), Vec2::new(0.0, -240.0));

    run(&mut world, 10);

    assert_eq!(world.bricks_remaining(), 0);
    assert_eq!(world.events.splash.pending().len(), 2);
    assert_eq!(world.events.destroyed.pending().len(), 3);
    // Bombs are consumed by the detonation
    assert!(world.probes.is_empty());
}

#[test]
fn test_projectile_consumed_on_first_hit() {
    let mut world = World::new(Tuning::default(), arena());
    world.add_brick(Rect::new(300.0, 100.0, 40.0, 20.0), 3.0);
    world.spawn_probe(ProbeKind::Projectile, Vec2::new(320.0, 130.0), Vec2::new(0.0, -500.0));

    run(&mut world, 10);

    assert!(world.probes.is_empty());
    assert_eq!(world.bricks[0].integrity.current, 2.0);
}

#[test]
fn test_boss_shield_deflects_ball_without_damage() {
    let mut world = World::new(Tuning::default(), arena());
    let center = Vec2::new(320.0, 150.0);
    world.spawn_boss(BossKind::Warden, center, Vec2::new(40.0, 40.0));
    if let Some(shield) = world.bosses[0].shield.as_mut() {
        shield.angular_velocity = 0.0;
        shield.rotation = 0.0;
    }
    let start = center + polar_to_cartesian(80.0, std::f32::consts::FRAC_PI_4);
    let inward = -polar_to_cartesian(300.0, std::f32::consts::FRAC_PI_4);
    world.spawn_probe(ProbeKind::Ball, start, inward);

    run(&mut world, 30);

    let boss = &world.bosses[0];
    assert_eq!(boss.integrity.current, boss.integrity.max);
    assert!(world.events.hit.pending().is_empty());
    let ball = &world.probes[0];
    assert!(ball.vel.dot(ball.pos - center) > 0.0, "ball should be moving away");
}

#[test]
fn test_boss_shield_holds_ball_inside_ring() {
    let mut world = World::new(Tuning::default(), arena());
    let center = Vec2::new(320.0, 200.0);
    world.spawn_boss(BossKind::Warden, center, Vec2::new(40.0, 40.0));
    world.bosses[0].shield = Some(DeflectorShield::new(center, 80.0, 10.0, 4, 0.2));
    let angle = std::f32::consts::FRAC_PI_4;
    world.spawn_probe(
        ProbeKind::Ball,
        center + polar_to_cartesian(60.0, angle),
        polar_to_cartesian(300.0, angle),
    );

    run(&mut world, 10);

    let ball = &world.probes[0];
    let offset = ball.pos - center;
    assert!(offset.length() < 75.0, "ball crossed the shield: r={}", offset.length());
    assert!(ball.vel.dot(offset) < 0.0, "ball should be heading back inward");
    assert!(world.events.hit.pending().is_empty());
}

#[test]
fn test_boss_hazards_damage_paddle() {
    let mut world = World::new(Tuning::default(), arena());
    world.spawn_boss(BossKind::Juggler, Vec2::new(320.0, 100.0), Vec2::new(40.0, 40.0));
    let paddle = world.spawn_paddle(Rect::new(0.0, 440.0, 640.0, 12.0), 5.0);

    // First spread throw lands at 2s and reaches the paddle about 2s later
    run(&mut world, 500);

    let damaged: Vec<_> = world
        .events
        .damaged
        .pending()
        .iter()
        .filter(|e| e.participant == paddle)
        .copied()
        .collect();
    assert_eq!(damaged.len(), 2);
    let percent = world
        .paddle()
        .and_then(|p| p.integrity)
        .map(|i| i.percent())
        .unwrap_or_default();
    assert!((percent - 60.0).abs() < 1e-3);
}

#[test]
fn test_paddle_returns_ball() {
    let mut world = World::new(Tuning::default(), arena());
    world.spawn_paddle(Rect::new(280.0, 440.0, 80.0, 12.0), 3.0);
    world.spawn_probe(ProbeKind::Ball, Vec2::new(330.0, 420.0), Vec2::new(0.0, 300.0));

    run(&mut world, 10);

    let ball = &world.probes[0];
    assert!(ball.vel.y < 0.0);
    // Struck right of center: deflected right, speed kept
    assert!(ball.vel.x > 0.0);
    assert!((ball.vel.length() - 300.0).abs() < 1e-2);
    assert!(ball.is_active());
}
