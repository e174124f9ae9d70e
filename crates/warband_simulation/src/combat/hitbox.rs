//! Melee hitbox.
//!
//! Хитбокс не живёт как entity: MeleeStrike intent → один overlap-запрос в том же
//! тике → DamageRequest на каждую задетую цель.

use bevy::prelude::*;

use super::events::{AgentIntent, AttackLanded, DamageRequest};
use super::CombatBody;
use crate::components::Agent;
use crate::config::{AttackPattern, HitboxShapeKind};
use crate::spatial::{QueryShape, SpatialProvider, SpatialQuery, SpatialHit, MASK_AGENT_HITBOX};

/// Готовая к запросу форма хитбокса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitboxShape {
    pub center: Vec2,
    pub shape: QueryShape,
}

impl HitboxShape {
    /// center = origin + facing × offset (box сдвигается ещё на half-length)
    pub fn resolve(pattern: &AttackPattern, origin: Vec2, facing: Vec2) -> Self {
        let forward = facing.normalize_or(Vec2::NEG_Y);
        let base = origin + forward * pattern.hitbox_offset;

        match pattern.shape {
            HitboxShapeKind::Circle => Self {
                center: base,
                shape: QueryShape::Circle {
                    radius: pattern.hitbox_radius,
                },
            },
            HitboxShapeKind::Box => Self {
                center: base + forward * pattern.hitbox_length,
                shape: QueryShape::Box {
                    half_width: pattern.hitbox_radius,
                    half_length: pattern.hitbox_length,
                    forward,
                },
            },
            HitboxShapeKind::Cone => Self {
                center: base,
                shape: QueryShape::Cone {
                    radius: pattern.hitbox_radius,
                    forward,
                    half_angle: pattern.hitbox_angle,
                },
            },
        }
    }

    pub fn overlap(&self, spatial: &dyn SpatialQuery) -> Vec<SpatialHit> {
        spatial.overlap(&self.shape, self.center, MASK_AGENT_HITBOX)
    }
}

/// Система: MeleeStrike → DamageRequest + AttackLanded.
///
/// Союзники (та же фракция) и мёртвые не задеваются. Adversary-слой бьётся всегда.
pub fn resolve_melee_strikes(
    mut intents: EventReader<AgentIntent>,
    spatial: Res<SpatialProvider>,
    agents: Query<(&Agent, &CombatBody)>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut landed: EventWriter<AttackLanded>,
) {
    for intent in intents.read() {
        let AgentIntent::MeleeStrike {
            agent,
            origin,
            facing,
            pattern,
            damage,
        } = intent
        else {
            continue;
        };

        let attacker_faction = agents.get(*agent).ok().map(|(a, _)| a.faction);
        let hitbox = HitboxShape::resolve(pattern, *origin, *facing);
        let mut hits = 0;

        for hit in hitbox.overlap(spatial.get()) {
            if hit.entity == *agent {
                continue;
            }
            if let Ok((target_agent, target_body)) = agents.get(hit.entity) {
                if !target_body.is_alive() || Some(target_agent.faction) == attacker_faction {
                    continue;
                }
            }

            let direction = (hit.position - *origin).normalize_or(*facing);
            damage_requests.write(DamageRequest {
                target: hit.entity,
                source: Some(*agent),
                amount: *damage,
                knockback_direction: direction,
                knockback_force: pattern.knockback,
            });
            landed.write(AttackLanded {
                attacker: *agent,
                target: hit.entity,
                amount: *damage,
            });
            hits += 1;
        }

        if hits > 0 {
            crate::log(&format!("⚔️ {:?} '{}' hit {} target(s) for {:.1}", agent, pattern.name, hits, damage));
        }
    }
}
