//! Agent lifecycle: spawn factory + pool hooks.
//!
//! Pool (переиспользование entity) живёт на стороне host. Ядро даёт два hook'а:
//! - `ReleaseAgent`: отписать эффекты, вернуть токен, заморозить Brain;
//! - `RespawnAgent`: всё заново из конфига, Brain пересобирает граф.

use bevy::prelude::*;
use std::sync::Arc;

use super::affix::AffixSet;
use super::boss::BossController;
use super::events::{ReleaseAgent, RespawnAgent};
use super::CombatBody;
use crate::ai::director::AttackDirector;
use crate::ai::fear::Fear;
use crate::ai::Brain;
use crate::components::{Agent, AiDisabled, Archetype, FactionId, StatBlock};
use crate::config::{AffixDef, BossPhase, EnemyStats};
use crate::error::AgentSetupError;
use crate::perception::{Perception, ThreatSensor};
use crate::physics::Motor;
use crate::spatial::Collider;

/// Параметры спавна одного агента
#[derive(Debug, Clone)]
pub struct AgentSpawn {
    pub stats: Option<Arc<EnemyStats>>,
    pub archetype: Archetype,
    pub faction: FactionId,
    pub position: Vec2,
    pub facing: Vec2,
    pub boss_phases: Vec<BossPhase>,
    pub affixes: Vec<AffixDef>,
}

impl AgentSpawn {
    pub fn new(stats: Arc<EnemyStats>, archetype: Archetype) -> Self {
        Self {
            stats: Some(stats),
            archetype,
            faction: 1,
            position: Vec2::ZERO,
            facing: Vec2::NEG_Y,
            boss_phases: Vec::new(),
            affixes: Vec::new(),
        }
    }

    /// Агент без stat block (будет выключен)
    pub fn unconfigured(archetype: Archetype) -> Self {
        Self {
            stats: None,
            ..Self::new(Arc::new(EnemyStats::default()), archetype)
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn facing(mut self, facing: Vec2) -> Self {
        self.facing = facing;
        self
    }

    pub fn faction(mut self, faction: FactionId) -> Self {
        self.faction = faction;
        self
    }

    pub fn boss(mut self, phases: Vec<BossPhase>) -> Self {
        self.boss_phases = phases;
        self
    }

    pub fn affix(mut self, affix: AffixDef) -> Self {
        self.affixes.push(affix);
        self
    }
}

/// Почему агента нельзя включить (None = всё ок)
fn config_problem(stat_block: &StatBlock, phases: &[BossPhase]) -> Option<String> {
    let Some(stats) = stat_block.get() else {
        return Some("no stat block assigned".to_string());
    };
    if let Err(err) = stats.validate() {
        return Some(err.to_string());
    }
    phases.iter().find_map(|p| p.validate().err()).map(|err| err.to_string())
}

/// Фабрика агента. Битый конфиг не паникует: `log_error` + `AiDisabled`.
pub fn spawn_agent(world: &mut World, spawn: AgentSpawn) -> Entity {
    let stat_block = StatBlock(spawn.stats);
    let problem = config_problem(&stat_block, &spawn.boss_phases);

    let mut body = stat_block.get().map(CombatBody::from_stats).unwrap_or_default();
    let mut affixes = AffixSet::default();
    for def in spawn.affixes {
        affixes.apply(def, &mut body);
    }

    let mut entity = world.spawn((
        Agent {
            faction: spawn.faction,
            archetype: spawn.archetype,
        },
        Transform::from_xyz(spawn.position.x, spawn.position.y, 0.0),
        Motor::with_facing(spawn.facing),
        Brain::new(spawn.position),
        body,
        affixes,
    ));
    if !spawn.boss_phases.is_empty() {
        entity.insert(BossController::new(spawn.boss_phases));
    }
    let id = entity.id();
    let name = stat_block.name().to_string();
    entity.insert(stat_block);

    match problem {
        Some(problem) => {
            crate::log_error(&format!("❌ {:?} ({}): {}, AI disabled", id, name, problem));
            world.entity_mut(id).insert(AiDisabled);
        }
        None => crate::log(&format!(
            "🧟 Spawned {:?} ({}, {}) at ({:.1}, {:.1})",
            id,
            name,
            spawn.archetype.as_str(),
            spawn.position.x,
            spawn.position.y
        )),
    }

    id
}

/// Вернуть агента из pool в точку `position`.
///
/// Проверяет entity/body/config сразу, сам сброс: в `respawn_agents` на следующем тике.
pub fn acquire_agent(world: &mut World, entity: Entity, position: Vec2) -> Result<(), AgentSetupError> {
    let entity_ref = world
        .get_entity(entity)
        .map_err(|_| AgentSetupError::MissingEntity(entity))?;
    if !entity_ref.contains::<CombatBody>() {
        return Err(AgentSetupError::MissingBody(entity));
    }
    let stats = entity_ref
        .get::<StatBlock>()
        .and_then(|s| s.0.clone())
        .ok_or(AgentSetupError::MissingStats(entity))?;
    stats.validate()?;

    world.send_event(RespawnAgent { entity, position });
    Ok(())
}

/// Вернуть агента в pool (host решил убрать живого агента)
pub fn release_agent(world: &mut World, entity: Entity) -> Result<(), AgentSetupError> {
    let entity_ref = world
        .get_entity(entity)
        .map_err(|_| AgentSetupError::MissingEntity(entity))?;
    if !entity_ref.contains::<CombatBody>() {
        return Err(AgentSetupError::MissingBody(entity));
    }

    world.send_event(ReleaseAgent { entity });
    Ok(())
}

/// Система: агенты, заспавненные host'ом в обход `spawn_agent`, тоже проходят проверку конфига
pub fn disable_unconfigured_agents(
    mut commands: Commands,
    added: Query<(Entity, &StatBlock, Option<&BossController>), (Added<Agent>, Without<AiDisabled>)>,
) {
    for (entity, stat_block, boss) in added.iter() {
        let phases = boss.map_or(&[][..], |b| b.phases());
        if let Some(problem) = config_problem(stat_block, phases) {
            crate::log_error(&format!("❌ {:?} ({}): {}, AI disabled", entity, stat_block.name(), problem));
            commands.entity(entity).insert(AiDisabled);
        }
    }
}

/// Система: release hook. Идемпотентна.
pub fn release_agents(
    mut releases: EventReader<ReleaseAgent>,
    mut director: Option<ResMut<AttackDirector>>,
    mut agents: Query<(&mut CombatBody, &mut Brain, &mut Motor, &mut Collider, Option<&mut AffixSet>)>,
) {
    for event in releases.read() {
        let Ok((mut body, mut brain, mut motor, mut collider, affixes)) = agents.get_mut(event.entity) else {
            continue;
        };

        if let Some(director) = director.as_deref_mut() {
            director.release(event.entity);
        }
        if let Some(mut affixes) = affixes {
            affixes.clear();
        }
        body.on_release();
        brain.release();
        motor.halt();
        collider.enabled = false;

        crate::log(&format!("📦 {:?} released to pool", event.entity));
    }
}

/// Система: acquire hook
#[allow(clippy::type_complexity)]
pub fn respawn_agents(
    mut respawns: EventReader<RespawnAgent>,
    mut agents: Query<
        (
            &StatBlock,
            &mut Transform,
            &mut CombatBody,
            &mut Brain,
            &mut Motor,
            &mut Collider,
            &mut Perception,
            &mut ThreatSensor,
            &mut Fear,
            Option<&mut BossController>,
            Option<&mut AffixSet>,
        ),
        Without<AiDisabled>,
    >,
) {
    for event in respawns.read() {
        let Ok((
            stat_block,
            mut transform,
            mut body,
            mut brain,
            mut motor,
            mut collider,
            mut perception,
            mut threat,
            mut fear,
            boss,
            affixes,
        )) = agents.get_mut(event.entity)
        else {
            continue;
        };
        let Some(stats) = stat_block.get() else { continue };

        body.on_acquire(stats);
        if let Some(mut affixes) = affixes {
            affixes.reapply(&mut body);
        }
        if let Some(mut boss) = boss {
            boss.reset();
        }

        transform.translation.x = event.position.x;
        transform.translation.y = event.position.y;
        *motor = Motor::with_facing(motor.facing);
        collider.enabled = true;
        perception.reset();
        threat.reset();
        fear.reset();
        brain.request_rebuild(event.position);

        crate::log(&format!(
            "♻️ {:?} ({}) respawned at ({:.1}, {:.1})",
            event.entity, stats.name, event.position.x, event.position.y
        ));
    }
}
