//! Damage application.
//!
//! DamageRequest → CombatBody::apply_damage → DamageTaken / PoiseBroken / AgentDied.
//! Пороги фаз босса проверяются после каждого попадания, до следующего запроса.
//! Смерть сразу выключает коллайдер и движение, затем ReleaseAgent (pool hook).

use bevy::prelude::*;

use super::boss::{advance_phase, BossController};
use super::events::{AgentDied, AgentIntent, DamageRequest, DamageTaken, PhaseChanged, PoiseBroken, ReleaseAgent};
use super::CombatBody;
use crate::ai::Brain;
use crate::components::{Agent, StatBlock};
use crate::physics::Motor;
use crate::spatial::{planar, Collider};

const DEFAULT_HIT_FLASH: f32 = 0.1;

/// Система: применить все DamageRequest, адресованные агентам.
///
/// Запросы к не-агентам (игрок) пропускаются: их читает host.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&Agent, &Transform, &StatBlock, &mut CombatBody, &mut Motor, &mut Collider)>,
    mut bosses: Query<(&mut BossController, Option<&mut Brain>)>,
    mut taken_events: EventWriter<DamageTaken>,
    mut poise_events: EventWriter<PoiseBroken>,
    mut death_events: EventWriter<AgentDied>,
    mut release_events: EventWriter<ReleaseAgent>,
    mut intents: EventWriter<AgentIntent>,
    mut phase_events: EventWriter<PhaseChanged>,
) {
    for request in requests.read() {
        let Ok((agent, transform, stat_block, mut body, mut motor, mut collider)) = targets.get_mut(request.target) else {
            continue;
        };

        let hit_flash = stat_block.get().map_or(DEFAULT_HIT_FLASH, |s| s.hit_flash_duration);
        let Some(outcome) = body.apply_damage(
            request.amount,
            request.knockback_direction,
            request.knockback_force,
            hit_flash,
        ) else {
            continue;
        };

        motor.apply_impulse(outcome.impulse);
        if hit_flash > 0.0 {
            intents.write(AgentIntent::HitFlash {
                agent: request.target,
                duration: hit_flash,
            });
        }

        if outcome.poise_broken {
            poise_events.write(PoiseBroken { entity: request.target });
        }

        taken_events.write(DamageTaken {
            entity: request.target,
            source: request.source,
            amount: outcome.applied,
            remaining_health: outcome.remaining_health,
        });

        if let Ok((mut boss, brain)) = bosses.get_mut(request.target) {
            let brain = brain.map(|b| b.into_inner());
            if let Some(changed) = advance_phase(request.target, &mut boss, &mut body, brain) {
                phase_events.write(changed);
            }
        }

        if outcome.died {
            motor.halt();
            collider.enabled = false;

            crate::log_info(&format!(
                "💀 {:?} ({}) killed by {:?}",
                request.target,
                stat_block.name(),
                request.source
            ));

            death_events.write(AgentDied {
                entity: request.target,
                killer: request.source,
                position: planar(transform),
                faction: agent.faction,
                archetype: agent.archetype,
                config: stat_block.name().to_string(),
            });
            release_events.write(ReleaseAgent { entity: request.target });
        }
    }
}

/// Система: hit flash + cooldown'ы атак
pub fn tick_bodies(time: Res<Time<Fixed>>, mut bodies: Query<&mut CombatBody>) {
    let delta = time.delta_secs();
    for mut body in bodies.iter_mut() {
        if body.is_alive() {
            body.tick(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyStats;
    use bevy::ecs::event::Events;

    fn setup() -> (App, Entity) {
        let mut app = App::new();
        app.add_event::<DamageRequest>()
            .add_event::<DamageTaken>()
            .add_event::<PoiseBroken>()
            .add_event::<AgentDied>()
            .add_event::<ReleaseAgent>()
            .add_event::<AgentIntent>()
            .add_event::<PhaseChanged>()
            .add_systems(Update, apply_damage_requests);

        let stats = EnemyStats::default();
        let entity = app
            .world_mut()
            .spawn((
                Agent {
                    faction: 1,
                    archetype: Default::default(),
                },
                StatBlock::new(std::sync::Arc::new(stats.clone())),
                CombatBody::from_stats(&stats),
            ))
            .id();
        (app, entity)
    }

    fn hit(app: &mut App, target: Entity, amount: f32) {
        app.world_mut().send_event(DamageRequest {
            target,
            source: None,
            amount,
            knockback_direction: Vec2::X,
            knockback_force: 2.0,
        });
        app.update();
    }

    #[test]
    fn test_request_damages_body_and_pushes() {
        let (mut app, entity) = setup();
        hit(&mut app, entity, 25.0);

        let body = app.world().get::<CombatBody>(entity).unwrap();
        assert_eq!(body.health(), 75.0);
        let motor = app.world().get::<Motor>(entity).unwrap();
        assert_eq!(motor.knockback, Vec2::new(2.0, 0.0));

        let events = app.world().resource::<Events<DamageTaken>>();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_lethal_request_kills_and_releases() {
        let (mut app, entity) = setup();
        hit(&mut app, entity, 500.0);

        assert!(!app.world().get::<CombatBody>(entity).unwrap().is_alive());
        assert!(!app.world().get::<Collider>(entity).unwrap().enabled);
        assert_eq!(app.world().resource::<Events<AgentDied>>().len(), 1);
        assert_eq!(app.world().resource::<Events<ReleaseAgent>>().len(), 1);

        // Труп больше не умирает
        hit(&mut app, entity, 500.0);
        let deaths = app.world().resource::<Events<AgentDied>>();
        let mut reader = deaths.get_cursor();
        assert_eq!(reader.read(deaths).count(), 1);
    }
}
