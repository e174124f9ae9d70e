//! Warband Simulation Core
//!
//! Combat AI на Bevy 0.16: восприятие, иерархические FSM по архетипам,
//! токены атаки, боссы, страх и аффиксы.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = решения и правила боя (этот crate)
//! - Host = рендер, снаряды, звук (читает `AgentIntent`, пишет `DamageRequest`/`WeaponFired`)

use bevy::ecs::event::Events;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod debug;
pub mod error;
pub mod logger;
pub mod perception;
pub mod physics;
pub mod spatial;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AttackDirector, AttackDirectorPlugin, Brain, Fear, StateId};
pub use combat::{
    acquire_agent, release_agent, spawn_agent, AgentDied, AgentIntent, AgentSpawn, BossController, CombatBody,
    CombatPlugin, DamageRequest, DamageTaken, PhaseChanged,
};
pub use components::*;
pub use config::{CombatAiConfig, EnemyStats};
pub use error::{AgentSetupError, ConfigError};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use perception::{Perception, PerceptionPlugin, ThreatSensor, WeaponFired};

/// Фазы одного тика (FixedUpdate), строго по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarbandSet {
    /// Respawn, spatial snapshot
    Sync,
    /// Vision, hearing, память, угрозы, спад страха
    Sense,
    /// DamageRequest → тела
    Resolve,
    /// Аффиксы, фазы босса, страх от событий
    React,
    /// Brain tick
    Decide,
    /// Движение, melee хитбоксы
    Act,
    /// Release, reclaim токенов
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct WarbandPlugin {
    pub seed: u64,
    pub config: CombatAiConfig,
    /// None = без Director (атаковать могут все сразу)
    pub director: Option<AttackDirector>,
}

impl Default for WarbandPlugin {
    fn default() -> Self {
        Self {
            seed: 42,
            config: CombatAiConfig::default(),
            director: Some(AttackDirector::default()),
        }
    }
}

impl Plugin for WarbandPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                WarbandSet::Sync,
                WarbandSet::Sense,
                WarbandSet::Resolve,
                WarbandSet::React,
                WarbandSet::Decide,
                WarbandSet::Act,
                WarbandSet::Cleanup,
            )
                .chain(),
        );

        app.insert_resource(Time::<Fixed>::from_hz(self.config.tick_rate))
            .insert_resource(self.config.clone())
            .insert_resource(spatial::SpatialProvider::default())
            .add_systems(FixedUpdate, spatial::sync_spatial_index.in_set(WarbandSet::Sync).after(combat::lifecycle::respawn_agents))
            .add_systems(
                FixedUpdate,
                (physics::integrate_motion, physics::resolve_agent_overlap)
                    .chain()
                    .in_set(WarbandSet::Act),
            )
            .add_plugins((CombatPlugin, PerceptionPlugin, AIPlugin));

        // Детерминистичный RNG (seed по умолчанию), тесты могут поставить свой заранее
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(self.seed));
        }

        if let Some(director) = &self.director {
            ai::install_director(app.world_mut(), director.clone());
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(WarbandPlugin {
            seed,
            ..Default::default()
        });

    app
}

/// Один фиксированный тик напрямую (без wall clock): Time<Fixed> сдвигается на `dt`.
///
/// `FixedUpdate` без `First`/`FixedPostUpdate`: буферы событий крутим сами,
/// иначе они растут всё время жизни App.
pub fn step(app: &mut App, dt: f32) {
    let world = app.world_mut();
    update_events(world);
    world
        .resource_mut::<Time<Fixed>>()
        .advance_by(Duration::from_secs_f32(dt));
    world.run_schedule(FixedUpdate);
}

/// Double buffer: событие, записанное в тике N, читается до конца тика N+1
fn update_events(world: &mut World) {
    fn swap<T: Event>(world: &mut World) {
        if let Some(mut events) = world.get_resource_mut::<Events<T>>() {
            events.update();
        }
    }

    swap::<DamageRequest>(world);
    swap::<DamageTaken>(world);
    swap::<combat::AttackLanded>(world);
    swap::<combat::PoiseBroken>(world);
    swap::<AgentDied>(world);
    swap::<PhaseChanged>(world);
    swap::<combat::ReleaseAgent>(world);
    swap::<combat::RespawnAgent>(world);
    swap::<AgentIntent>(world);
    swap::<WeaponFired>(world);
}

/// `n` тиков по 1/tick_rate
pub fn run_ticks(app: &mut App, n: usize) {
    let dt = (1.0 / app.world().resource::<CombatAiConfig>().tick_rate) as f32;
    for _ in 0..n {
        step(app, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot() -> WeaponFired {
        WeaponFired {
            shooter: None,
            position: Vec2::ZERO,
            noise_radius: 10.0,
        }
    }

    #[test]
    fn test_step_keeps_event_for_one_tick_then_drops_it() {
        let mut app = create_headless_app(1);
        app.world_mut().send_event(shot());

        step(&mut app, 1.0 / 60.0);
        assert_eq!(app.world().resource::<Events<WeaponFired>>().len(), 1);

        step(&mut app, 1.0 / 60.0);
        assert!(app.world().resource::<Events<WeaponFired>>().is_empty());
    }

    #[test]
    fn test_event_buffers_stay_bounded_over_long_runs() {
        let mut app = create_headless_app(1);
        for _ in 0..600 {
            app.world_mut().send_event(shot());
            step(&mut app, 1.0 / 60.0);
        }
        assert!(app.world().resource::<Events<WeaponFired>>().len() <= 2);
    }
}
