//! Brain tick system.

use bevy::prelude::*;

use crate::ai::brain::{Brain, BrainInputs};
use crate::ai::director::{AttackDirector, TokenBroker};
use crate::ai::fear::Fear;
use crate::combat::{AgentIntent, BossController, CombatBody};
use crate::components::{Agent, AiDisabled, StatBlock};
use crate::config::CombatAiConfig;
use crate::perception::{Perception, ThreatSensor};
use crate::physics::Motor;
use crate::spatial::{planar, SpatialProvider};
use crate::DeterministicRng;

/// Система: один тик решения для каждого живого агента.
///
/// Агенты обходятся в порядке Entity (детерминизм: порядок выдачи токенов
/// и потребления RNG не зависит от порядка archetype storage).
/// Intents буферизуются и отправляются одним батчем в конце.
pub fn tick_brains(
    time: Res<Time<Fixed>>,
    config: Res<CombatAiConfig>,
    spatial: Res<SpatialProvider>,
    mut rng: ResMut<DeterministicRng>,
    mut director: Option<ResMut<AttackDirector>>,
    mut agents: Query<
        (
            Entity,
            &Agent,
            &StatBlock,
            &Transform,
            &mut Brain,
            &mut CombatBody,
            &mut Motor,
            &Perception,
            &ThreatSensor,
            &mut Fear,
            Option<&mut BossController>,
        ),
        Without<AiDisabled>,
    >,
    mut intent_writer: EventWriter<AgentIntent>,
) {
    let delta = time.delta_secs();
    let spatial = spatial.get();

    let mut order: Vec<Entity> = agents.iter().map(|item| item.0).collect();
    order.sort();

    let mut intents: Vec<AgentIntent> = Vec::new();

    for entity in order {
        let Ok((_, agent, stat_block, transform, mut brain, mut body, mut motor, perception, threat, mut fear, boss)) =
            agents.get_mut(entity)
        else {
            continue;
        };
        let Some(stats) = stat_block.get() else { continue };

        // Мёртвые и лежащие в pool заморожены
        if !body.is_alive() || brain.is_released() {
            continue;
        }

        let inputs = BrainInputs {
            entity,
            archetype: agent.archetype,
            stats,
            config: &config,
            position: planar(transform),
            body: &mut body,
            motor: &mut motor,
            perception,
            threat,
            fear: &mut fear,
            boss: boss.map(|b| b.into_inner()),
            tokens: TokenBroker::new(director.as_deref_mut()),
            spatial,
            rng: &mut rng.rng,
            intents: &mut intents,
        };
        brain.tick(inputs, delta);
    }

    if !intents.is_empty() {
        intent_writer.write_batch(intents);
    }
}
