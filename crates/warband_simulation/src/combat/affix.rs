//! Affixes: runtime-модификаторы элитных агентов.
//!
//! `apply` сразу умножает статы и добавляет теги; спецэффект регистрируется как
//! hook (явная подписка с `HookId`). Release hook отписывает всё (`clear`),
//! acquire hook подписывает заново (`reapply`).

use bevy::prelude::*;

use super::events::{AgentDied, AttackLanded, DamageRequest, DamageTaken};
use super::CombatBody;
use crate::config::{AffixDef, AffixEffect, CombatAiConfig};
use crate::spatial::{nearest, planar, QueryShape, SpatialProvider, LAYER_ADVERSARY};

/// Множитель скорости у Berserk
const BERSERK_SPEED_MULTIPLIER: f32 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AffixHook {
    ExplodeOnDeath { radius: f32, damage: f32 },
    Vampiric { fraction: f32 },
    Regen { per_second: f32 },
    Berserk { threshold: f32, damage_multiplier: f32, triggered: bool },
    Reflect { fraction: f32 },
}

impl AffixHook {
    fn from_def(def: &AffixDef) -> Option<Self> {
        match def.effect {
            AffixEffect::None => None,
            AffixEffect::ExplosiveOnDeath => Some(Self::ExplodeOnDeath {
                radius: def.effect_value,
                damage: def.effect_secondary,
            }),
            AffixEffect::VampiricOnHit => Some(Self::Vampiric {
                fraction: def.effect_value,
            }),
            AffixEffect::ShieldRegen => Some(Self::Regen {
                per_second: def.effect_value,
            }),
            AffixEffect::BerserkOnLowHp => Some(Self::Berserk {
                threshold: def.effect_value,
                damage_multiplier: def.effect_secondary,
                triggered: false,
            }),
            AffixEffect::ReflectOnHit => Some(Self::Reflect {
                fraction: def.effect_value,
            }),
        }
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct AffixSet {
    defs: Vec<AffixDef>,
    hooks: Vec<(HookId, AffixHook)>,
    next_id: u32,
}

impl AffixSet {
    /// Статы + теги + подписка на эффект
    pub fn apply(&mut self, def: AffixDef, body: &mut CombatBody) -> Option<HookId> {
        let hook = Self::apply_stats(&def, body);
        self.defs.push(def);
        hook.map(|h| self.subscribe(h))
    }

    fn apply_stats(def: &AffixDef, body: &mut CombatBody) -> Option<AffixHook> {
        body.apply_affix_multipliers(def.hp_multiplier, def.damage_multiplier, def.speed_multiplier);
        for tag in &def.add_behavior_tags {
            body.add_tag(tag.clone());
        }
        AffixHook::from_def(def)
    }

    pub fn subscribe(&mut self, hook: AffixHook) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, hook));
        id
    }

    pub fn unsubscribe(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(h, _)| *h != id);
        self.hooks.len() != before
    }

    /// Release hook: отписать все эффекты (defs остаются для respawn)
    pub fn clear(&mut self) {
        self.hooks.clear();
    }

    /// Acquire hook: body уже сброшен из конфига, применяем affixes заново
    pub fn reapply(&mut self, body: &mut CombatBody) {
        self.hooks.clear();
        let defs = std::mem::take(&mut self.defs);
        for def in defs {
            self.apply(def, body);
        }
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn hooks(&self) -> impl Iterator<Item = &AffixHook> {
        self.hooks.iter().map(|(_, h)| h)
    }

    pub fn labels(&self) -> Vec<String> {
        self.defs.iter().map(|d| d.display_label().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Система: ShieldRegen
pub fn regenerate_shields(time: Res<Time<Fixed>>, mut agents: Query<(&mut CombatBody, &AffixSet)>) {
    let delta = time.delta_secs();

    for (mut body, affixes) in agents.iter_mut() {
        if !body.is_alive() {
            continue;
        }
        for hook in affixes.hooks() {
            if let AffixHook::Regen { per_second } = hook {
                body.heal(per_second * delta);
            }
        }
    }
}

/// Система: Berserk срабатывает один раз за жизнь
pub fn trigger_berserk(mut agents: Query<(Entity, &mut CombatBody, &mut AffixSet)>) {
    for (entity, mut body, mut affixes) in agents.iter_mut() {
        if !body.is_alive() {
            continue;
        }
        let ratio = body.health_ratio();

        for (_, hook) in affixes.hooks.iter_mut() {
            let AffixHook::Berserk {
                threshold,
                damage_multiplier,
                triggered,
            } = hook
            else {
                continue;
            };
            if *triggered || ratio > *threshold {
                continue;
            }

            *triggered = true;
            body.apply_affix_multipliers(1.0, *damage_multiplier, BERSERK_SPEED_MULTIPLIER);
            crate::log(&format!("🔥 {:?} goes berserk at {:.0}% HP", entity, ratio * 100.0));
        }
    }
}

/// Система: Vampiric лечит атакующего по AttackLanded
pub fn vampiric_heal(mut landed: EventReader<AttackLanded>, mut agents: Query<(&mut CombatBody, &AffixSet)>) {
    for event in landed.read() {
        let Ok((mut body, affixes)) = agents.get_mut(event.attacker) else {
            continue;
        };
        for hook in affixes.hooks() {
            if let AffixHook::Vampiric { fraction } = hook {
                body.heal(fraction * event.amount);
            }
        }
    }
}

/// Система: Reflect возвращает долю урона ближайшему adversary
pub fn reflect_damage(
    config: Res<CombatAiConfig>,
    spatial: Res<SpatialProvider>,
    mut taken: EventReader<DamageTaken>,
    agents: Query<(&Transform, &CombatBody, &AffixSet)>,
    mut requests: EventWriter<DamageRequest>,
) {
    for event in taken.read() {
        let Ok((transform, body, affixes)) = agents.get(event.entity) else {
            continue;
        };
        if !body.is_alive() {
            continue;
        }

        for hook in affixes.hooks() {
            let AffixHook::Reflect { fraction } = hook else { continue };
            let position = planar(transform);
            let hits = spatial.get().overlap(
                &QueryShape::Circle {
                    radius: config.reflect_search_radius,
                },
                position,
                LAYER_ADVERSARY,
            );
            let Some(target) = nearest(&hits, position) else { continue };

            requests.write(DamageRequest {
                target: target.entity,
                source: Some(event.entity),
                amount: fraction * event.amount,
                knockback_direction: target.position - position,
                knockback_force: 0.0,
            });
        }
    }
}

/// Система: ExplosiveOnDeath
pub fn explode_on_death(
    config: Res<CombatAiConfig>,
    spatial: Res<SpatialProvider>,
    mut deaths: EventReader<AgentDied>,
    agents: Query<&AffixSet>,
    mut requests: EventWriter<DamageRequest>,
) {
    for death in deaths.read() {
        let Ok(affixes) = agents.get(death.entity) else {
            continue;
        };

        for hook in affixes.hooks() {
            let AffixHook::ExplodeOnDeath { radius, damage } = *hook else {
                continue;
            };
            let hits = spatial
                .get()
                .overlap(&QueryShape::Circle { radius }, death.position, LAYER_ADVERSARY);

            crate::log(&format!(
                "💥 {:?} exploded, {} adversary(ies) in radius {:.1}",
                death.entity,
                hits.len(),
                radius
            ));

            for hit in hits {
                requests.write(DamageRequest {
                    target: hit.entity,
                    source: Some(death.entity),
                    amount: damage,
                    knockback_direction: hit.position - death.position,
                    knockback_force: config.explosion_knockback,
                });
            }
        }
    }
}
