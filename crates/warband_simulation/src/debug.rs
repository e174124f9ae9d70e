//! Debug overlay data: что сейчас думает агент.
//!
//! Host рисует это над головой агента (state, токен, фаза босса, аффиксы).

use bevy::prelude::*;

use crate::ai::{AttackDirector, Brain, Fear};
use crate::combat::{AffixSet, BossController, CombatBody};
use crate::components::{Agent, AiDisabled, StatBlock};
use crate::perception::Perception;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentDebugInfo {
    pub entity: Entity,
    pub config: String,
    /// "Engage/Telegraph", "Scan", "<none>" до первого тика
    pub state: String,
    pub health: f32,
    pub max_health: f32,
    pub poise: f32,
    pub has_target: bool,
    pub holds_token: bool,
    pub fear: f32,
    /// -1 = до первой фазы, None = не босс
    pub boss_phase: Option<i32>,
    pub affixes: Vec<String>,
    pub disabled: bool,
}

impl AgentDebugInfo {
    /// Одна строка для overlay / логов
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} [{}] hp {:.0}/{:.0}",
            self.config, self.state, self.health, self.max_health
        );
        if self.holds_token {
            line.push_str(" ⚔");
        }
        if let Some(phase) = self.boss_phase {
            line.push_str(&format!(" phase {}", phase));
        }
        if !self.affixes.is_empty() {
            line.push_str(&format!(" ({})", self.affixes.join(", ")));
        }
        if self.disabled {
            line.push_str(" DISABLED");
        }
        line
    }
}

/// Снимок состояния агента. None если entity нет или это не агент.
pub fn inspect_agent(world: &World, entity: Entity) -> Option<AgentDebugInfo> {
    let entity_ref = world.get_entity(entity).ok()?;
    entity_ref.get::<Agent>()?;
    let body = entity_ref.get::<CombatBody>()?;

    let holds_token = world
        .get_resource::<AttackDirector>()
        .is_some_and(|director| director.holds(entity));

    Some(AgentDebugInfo {
        entity,
        config: entity_ref
            .get::<StatBlock>()
            .map_or_else(|| "<unconfigured>".to_string(), |s| s.name().to_string()),
        state: entity_ref
            .get::<Brain>()
            .map_or_else(|| "<none>".to_string(), |b| b.state_label()),
        health: body.health(),
        max_health: body.max_health(),
        poise: body.poise(),
        has_target: entity_ref.get::<Perception>().is_some_and(|p| p.has_target()),
        holds_token,
        fear: entity_ref.get::<Fear>().map_or(0.0, |f| f.value),
        boss_phase: entity_ref.get::<BossController>().map(|b| b.current_phase()),
        affixes: entity_ref.get::<AffixSet>().map(|a| a.labels()).unwrap_or_default(),
        disabled: entity_ref.contains::<AiDisabled>(),
    })
}

/// Все агенты, в порядке Entity
pub fn inspect_all(world: &mut World) -> Vec<AgentDebugInfo> {
    let mut entities: Vec<Entity> = world
        .query_filtered::<Entity, With<Agent>>()
        .iter(world)
        .collect();
    entities.sort();
    entities
        .into_iter()
        .filter_map(|entity| inspect_agent(world, entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{spawn_agent, AgentSpawn};
    use crate::components::Archetype;
    use crate::config::EnemyStats;
    use std::sync::Arc;

    #[test]
    fn test_inspect_fresh_agent() {
        let mut world = World::new();
        let stats = Arc::new(EnemyStats {
            name: "Grunt".to_string(),
            ..Default::default()
        });
        let entity = spawn_agent(&mut world, AgentSpawn::new(stats, Archetype::Rusher));

        let info = inspect_agent(&world, entity).unwrap();
        assert_eq!(info.config, "Grunt");
        assert_eq!(info.state, "<none>");
        assert!(!info.holds_token);
        assert_eq!(info.boss_phase, None);
        assert!(!info.disabled);
        assert!(info.summary().starts_with("Grunt [<none>]"));
    }

    #[test]
    fn test_inspect_non_agent_is_none() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        assert!(inspect_agent(&world, entity).is_none());
    }
}
