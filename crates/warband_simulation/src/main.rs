//! Headless skirmish
//!
//! Игрок стоит в центре, вокруг: по агенту каждого архетипа.
//! Без рендера: раз в секунду печатаем, кто что думает.

use std::sync::Arc;

use bevy::prelude::*;
use warband_simulation::config::{AttackKind, AttackPattern, TurretParams};
use warband_simulation::{
    create_headless_app, debug, init_logger, run_ticks, spawn_agent, AgentSpawn, Archetype, EnemyStats,
    PlayerAdversary,
};

fn stats(name: &str) -> EnemyStats {
    EnemyStats {
        name: name.to_string(),
        ..Default::default()
    }
}

fn main() {
    init_logger();
    let seed = 42;
    println!("Starting warband headless skirmish (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let world = app.world_mut();

    world.spawn((PlayerAdversary, Transform::from_xyz(0.0, 0.0, 0.0)));

    let rusher = Arc::new(EnemyStats {
        behavior_tags: vec!["CanBlock".to_string()],
        ..stats("Grunt")
    });
    let shooter = Arc::new(EnemyStats {
        preferred_range: 6.0,
        retreat_range: 3.0,
        ..stats("Gunner")
    });
    let turret = Arc::new(EnemyStats {
        turret: TurretParams {
            scan_speed: 60.0,
            lock_on_duration: 0.8,
        },
        attacks: vec![AttackPattern {
            name: "Beam".to_string(),
            kind: AttackKind::Laser,
            ..Default::default()
        }],
        ..stats("Sentry")
    });
    let stalker = Arc::new(stats("Shade"));

    // Все смотрят на игрока (иначе первые секунды уйдут на поиск)
    let roster = [
        (rusher.clone(), Archetype::Rusher, Vec2::new(6.0, 0.0)),
        (shooter, Archetype::Shooter, Vec2::new(-6.0, 1.0)),
        (rusher, Archetype::Rusher, Vec2::new(0.0, 7.0)),
        (turret, Archetype::Turret, Vec2::new(4.0, 4.0)),
        (stalker, Archetype::Stalker, Vec2::new(-5.0, -5.0)),
    ];
    for (agent_stats, archetype, position) in roster {
        spawn_agent(world, AgentSpawn::new(agent_stats, archetype).at(position).facing(-position));
    }

    // 10 секунд по 60 тиков
    for second in 1..=10 {
        run_ticks(&mut app, 60);

        println!("--- t = {}s ---", second);
        for info in debug::inspect_all(app.world_mut()) {
            println!("  {:?} {}", info.entity, info.summary());
        }
    }

    println!("Simulation complete!");
}
