//! Perception: vision, faction scan, hearing, memory, threat sensor.
//!
//! Порядок в `WarbandSet::Sense`:
//! 1. hear_weapon_fire: event-driven, каждый тик
//! 2. update_vision: throttled 5 Hz
//! 3. decay_memory: каждый тик, + пересчёт дистанции
//! 4. scan_threats: throttled 5 Hz

use bevy::prelude::*;

pub mod belief;
pub mod hearing;
pub mod threat;
pub mod vision;

pub use belief::{Perception, TargetBelief, TargetKind, TrackedLookup};
pub use hearing::WeaponFired;
pub use threat::ThreatSensor;
pub use vision::{run_vision_cycle, AgentView, Observer, VisionOutcome};

use crate::combat::CombatBody;
use crate::components::{Agent, AiDisabled, StatBlock};
use crate::config::CombatAiConfig;
use crate::physics::Motor;
use crate::spatial::{planar, SpatialProvider};
use crate::WarbandSet;

pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WeaponFired>();

        app.add_systems(
            FixedUpdate,
            (hear_weapon_fire, update_vision, decay_memory, scan_threats)
                .chain()
                .in_set(WarbandSet::Sense),
        );
    }
}

/// Система: выстрелы игрока → hearing
pub fn hear_weapon_fire(
    mut shots: EventReader<WeaponFired>,
    mut listeners: Query<(&Transform, &StatBlock, &CombatBody, &mut Perception), Without<AiDisabled>>,
) {
    let shots: Vec<WeaponFired> = shots.read().cloned().collect();
    if shots.is_empty() {
        return;
    }

    for (transform, stat_block, body, mut perception) in listeners.iter_mut() {
        let Some(stats) = stat_block.get() else { continue };
        if !body.is_alive() {
            continue;
        }

        for shot in &shots {
            hearing::hear_weapon_fire(&mut perception, planar(transform), stats, shot);
        }
    }
}

/// Система: vision + faction scan (5 Hz на агента)
pub fn update_vision(
    config: Res<CombatAiConfig>,
    time: Res<Time<Fixed>>,
    spatial: Res<SpatialProvider>,
    mut observers: Query<
        (Entity, &Transform, &Agent, &StatBlock, &CombatBody, &Motor, &mut Perception),
        Without<AiDisabled>,
    >,
    others: Query<(&Agent, &CombatBody), Without<AiDisabled>>,
) {
    let delta = time.delta_secs();
    let spatial = spatial.get();

    for (entity, transform, agent, stat_block, body, motor, mut perception) in observers.iter_mut() {
        let Some(stats) = stat_block.get() else { continue };
        if !body.is_alive() {
            continue;
        }
        if !perception.tick_vision_timer(delta, config.perception_interval) {
            continue;
        }

        let observer = Observer {
            entity,
            position: planar(transform),
            facing: motor.facing,
            faction: agent.faction,
        };

        let had_target = perception.has_target();
        let outcome = run_vision_cycle(&mut perception, observer, stats, spatial, |other| {
            others.get(other).ok().map(|(a, b)| AgentView {
                faction: a.faction,
                alive: b.is_alive(),
            })
        });

        if !had_target && outcome != VisionOutcome::Nothing {
            crate::log(&format!("👁 {:?} ({}) spotted {:?}", entity, stats.name, outcome));
        }
    }
}

/// Система: memory decay + distance (каждый тик)
pub fn decay_memory(
    time: Res<Time<Fixed>>,
    mut agents: Query<(&Transform, &StatBlock, &CombatBody, &mut Perception), Without<AiDisabled>>,
    targets: Query<(&Transform, &CombatBody), Without<AiDisabled>>,
) {
    let delta = time.delta_secs();

    for (transform, stat_block, body, mut perception) in agents.iter_mut() {
        let Some(stats) = stat_block.get() else { continue };
        if !body.is_alive() {
            continue;
        }

        // Weak reference: Entity с чужой generation просто не найдётся
        let tracked = match perception.tracked() {
            None => TrackedLookup::NotTracking,
            Some(target) => match targets.get(target) {
                Ok((t, b)) if b.is_alive() => TrackedLookup::Alive(planar(t)),
                _ => TrackedLookup::Lost,
            },
        };

        perception.decay(delta, tracked, stats.memory_duration);
        perception.refresh_distance(planar(transform));
    }
}

/// Система: ThreatSensor scan (5 Hz на агента)
pub fn scan_threats(
    config: Res<CombatAiConfig>,
    time: Res<Time<Fixed>>,
    spatial: Res<SpatialProvider>,
    mut sensors: Query<(&Transform, &StatBlock, &CombatBody, &mut ThreatSensor), Without<AiDisabled>>,
) {
    let delta = time.delta_secs();

    for (transform, stat_block, body, mut sensor) in sensors.iter_mut() {
        let Some(stats) = stat_block.get() else { continue };
        if !body.is_alive() {
            continue;
        }
        if !sensor.tick_scan_timer(delta, config.threat_scan_interval) {
            continue;
        }

        sensor.scan(planar(transform), stats.threat_detection_radius, spatial.get());
    }
}
