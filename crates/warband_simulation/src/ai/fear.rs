//! Fear accumulator.
//!
//! Источники: смерть союзника в радиусе слышимости, собственный poise break.
//! Пассивно спадает. Порог превышен → Brain уводит агента во Flee.

use bevy::prelude::*;

use crate::combat::{AgentDied, CombatBody, PoiseBroken};
use crate::components::{Agent, AiDisabled, StatBlock};
use crate::spatial::planar;

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Fear {
    pub value: f32,
    /// Выставляет Brain при входе во Flee, снимает Flee при выходе
    pub is_fleeing: bool,
}

impl Fear {
    /// Мёртвые не боятся, отрицательный страх игнорируем
    pub fn add(&mut self, amount: f32, alive: bool) {
        if !alive || amount <= 0.0 {
            return;
        }
        self.value += amount;
    }

    pub fn decay(&mut self, dt: f32, rate: f32) {
        if self.value > 0.0 {
            self.value = (self.value - rate * dt).max(0.0);
        }
    }

    /// Порог 0 = бесстрашный
    pub fn should_flee(&self, threshold: f32) -> bool {
        !self.is_fleeing && threshold > 0.0 && self.value >= threshold
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.is_fleeing = false;
    }
}

/// Система: пассивный спад страха
pub fn decay_fear(
    time: Res<Time<Fixed>>,
    mut agents: Query<(&StatBlock, &CombatBody, &mut Fear), Without<AiDisabled>>,
) {
    let delta = time.delta_secs();

    for (stat_block, body, mut fear) in agents.iter_mut() {
        let Some(stats) = stat_block.get() else { continue };
        if !body.is_alive() {
            continue;
        }
        fear.decay(delta, stats.fear_decay_rate);
    }
}

/// Система: смерти союзников и собственный poise break → страх
pub fn accumulate_fear(
    mut deaths: EventReader<AgentDied>,
    mut poise_breaks: EventReader<PoiseBroken>,
    mut agents: Query<(Entity, &Agent, &Transform, &StatBlock, &CombatBody, &mut Fear), Without<AiDisabled>>,
) {
    let deaths: Vec<AgentDied> = deaths.read().cloned().collect();
    let broken: Vec<Entity> = poise_breaks.read().map(|e| e.entity).collect();
    if deaths.is_empty() && broken.is_empty() {
        return;
    }

    for (entity, agent, transform, stat_block, body, mut fear) in agents.iter_mut() {
        let Some(stats) = stat_block.get() else { continue };
        let alive = body.is_alive();
        let position = planar(transform);

        for death in &deaths {
            if death.entity == entity || death.faction != agent.faction {
                continue;
            }
            if position.distance(death.position) <= stats.hearing_range {
                fear.add(stats.fear_from_ally_death, alive);
            }
        }

        if broken.contains(&entity) {
            fear.add(stats.fear_from_poise_broken, alive);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fear_decays_to_zero_not_below() {
        let mut fear = Fear::default();
        fear.add(10.0, true);

        fear.decay(1.0, 5.0);
        assert_eq!(fear.value, 5.0);

        fear.decay(10.0, 5.0);
        assert_eq!(fear.value, 0.0);
    }

    #[test]
    fn test_dead_or_negative_fear_is_ignored() {
        let mut fear = Fear::default();
        fear.add(30.0, false);
        fear.add(-5.0, true);
        fear.add(0.0, true);
        assert_eq!(fear.value, 0.0);
    }

    #[test]
    fn test_should_flee_respects_threshold_and_state() {
        let mut fear = Fear::default();
        fear.add(50.0, true);

        assert!(fear.should_flee(50.0));
        assert!(!fear.should_flee(60.0));
        // Бесстрашный архетип
        assert!(!fear.should_flee(0.0));

        fear.is_fleeing = true;
        assert!(!fear.should_flee(50.0));

        fear.reset();
        assert_eq!(fear, Fear::default());
    }
}
