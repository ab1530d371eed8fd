//! Brickstorm headless demo
//!
//! Lays out a brick field, launches a ball (plus projectiles and a bomb),
//! optionally spawns a boss, and runs fixed-timestep frames with a paddle that
//! tracks the ball. Prints a summary of what the collision core resolved.

use std::cell::Cell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use glam::Vec2;

use brickstorm::consts::*;
use brickstorm::sim::{BossKind, ProbeKind, Rect, World};
use brickstorm::{ConfigError, Tuning};

#[derive(Parser)]
#[command(version, about = "Headless brick-breaker collision demo")]
struct Cli {
    /// Seed for modifier rolls (overrides the tuning file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of fixed timesteps to simulate
    #[arg(long, default_value_t = 1200)]
    frames: u32,

    /// JSON tuning file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Spawn a shielded, hazard-throwing boss above the bricks
    #[arg(long)]
    boss: bool,
}

const ARENA_WIDTH: f32 = 640.0;
const ARENA_HEIGHT: f32 = 480.0;
const PADDLE_WIDTH: f32 = 96.0;
const PADDLE_SPEED: f32 = 420.0;

fn load_tuning(cli: &Cli) -> Result<Tuning, ConfigError> {
    let mut tuning = match &cli.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    if let Some(seed) = cli.seed {
        tuning.seed = seed;
    }
    tuning.validate()?;
    Ok(tuning)
}

fn build_world(tuning: Tuning, with_boss: bool) -> World {
    let mut world = World::new(tuning, Rect::new(0.0, 0.0, ARENA_WIDTH, ARENA_HEIGHT));

    world.lay_bricks(Vec2::new(32.0, 120.0), 12, 5, 2.0);
    world.add_wall(Rect::new(0.0, 230.0, 96.0, 12.0));
    world.add_wall(Rect::new(ARENA_WIDTH - 96.0, 230.0, 96.0, 12.0));
    world.spawn_paddle(
        Rect::new(
            (ARENA_WIDTH - PADDLE_WIDTH) / 2.0,
            ARENA_HEIGHT - 32.0,
            PADDLE_WIDTH,
            12.0,
        ),
        5.0,
    );
    if with_boss {
        world.spawn_boss(
            BossKind::Sentinel,
            Vec2::new(ARENA_WIDTH / 2.0, 60.0),
            Vec2::new(64.0, 32.0),
        );
    }

    let launch = Vec2::new(0.35, -1.0).normalize() * BALL_SPEED;
    world.spawn_probe(ProbeKind::Ball, Vec2::new(ARENA_WIDTH / 2.0, 380.0), launch);
    for x in [200.0, 440.0] {
        world.spawn_probe(ProbeKind::Projectile, Vec2::new(x, 420.0), Vec2::new(0.0, -500.0));
    }
    world.spawn_probe(ProbeKind::Bomb, Vec2::new(320.0, 420.0), Vec2::new(0.0, -240.0));
    world
}

/// Slide the paddle toward the first live ball
fn steer_paddle(world: &mut World, dt: f32) {
    let Some(target_x) = world
        .probes
        .iter()
        .find(|p| p.kind == ProbeKind::Ball)
        .map(|b| b.pos.x)
    else {
        return;
    };
    let arena = world.arena;
    if let Some(paddle) = world.paddle_mut() {
        let dx = (target_x - paddle.rect.center().x).clamp(-PADDLE_SPEED * dt, PADDLE_SPEED * dt);
        paddle.rect.x = (paddle.rect.x + dx).clamp(arena.x, arena.max().x - paddle.rect.w);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let tuning = match load_tuning(&cli) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("Failed to load tuning: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Brickstorm starting (seed {}, {} frames)", tuning.seed, cli.frames);

    let mut world = build_world(tuning, cli.boss);

    let crits = Rc::new(Cell::new(0u32));
    let c = Rc::clone(&crits);
    world.events.hit.subscribe(move |hit| {
        if hit.is_critical {
            c.set(c.get() + 1);
        }
    });

    let mut destroyed = 0;
    let mut contacts = 0;
    for _ in 0..cli.frames {
        steer_paddle(&mut world, SIM_DT);
        let report = world.step(SIM_DT);
        destroyed += report.destroyed;
        contacts += report.contacts;

        for event in world.events.destroyed.drain() {
            log::debug!("{:?} destroyed at {:?}", event.target, event.position);
        }
        world.events.clear();

        if world.probes.is_empty() || world.bricks_remaining() == 0 {
            break;
        }
    }

    log::info!(
        "Done after {} ticks: {} contacts, {} destroyed, {} crits, {} bricks left",
        world.time_ticks,
        contacts,
        destroyed,
        crits.get(),
        world.bricks_remaining()
    );
    if let Some(paddle) = world.paddle() {
        let percent = paddle.integrity.map(|i| i.percent()).unwrap_or(100.0);
        log::info!("Paddle integrity {:.0}%", percent);
    }
    ExitCode::SUCCESS
}
