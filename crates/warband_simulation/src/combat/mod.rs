//! Combat: тело агента, урон, боссы, аффиксы, pool hooks.
//!
//! ECS ответственность:
//! - Game state: health, poise, флаги, набор атак
//! - Combat rules: block reduction, poise break, смерть, фазы босса
//! - Events: DamageTaken, AgentDied, PoiseBroken, PhaseChanged, AttackLanded
//!
//! Host ответственность:
//! - Снаряды и лазеры (AgentIntent::FireProjectile / FireLaser)
//! - Урон по игроку (DamageRequest с target = игрок)
//! - Визуал (HitFlash, SetAlpha, tint фазы)

use bevy::prelude::*;

pub mod affix;
pub mod attacks;
pub mod body;
pub mod boss;
pub mod damage;
pub mod events;
pub mod hitbox;
pub mod lifecycle;

pub use affix::{AffixHook, AffixSet, HookId};
pub use attacks::AttackSet;
pub use body::{CombatBody, DamageOutcome};
pub use boss::BossController;
pub use events::{
    AgentDied, AgentIntent, AttackLanded, DamageRequest, DamageTaken, PhaseChanged, PoiseBroken, ReleaseAgent,
    RespawnAgent,
};
pub use hitbox::HitboxShape;
pub use lifecycle::{acquire_agent, release_agent, spawn_agent, AgentSpawn};

use crate::WarbandSet;

/// Combat Plugin
///
/// Порядок выполнения:
/// 1. Sync: respawn (acquire hook), проверка конфига новых агентов
/// 2. Resolve: DamageRequest → тела (и пороги фаз босса), hit flash / cooldown'ы
/// 3. React: аффиксы
/// 4. Act: melee хитбоксы
/// 5. Cleanup: release hook
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageRequest>()
            .add_event::<DamageTaken>()
            .add_event::<AttackLanded>()
            .add_event::<PoiseBroken>()
            .add_event::<AgentDied>()
            .add_event::<PhaseChanged>()
            .add_event::<ReleaseAgent>()
            .add_event::<RespawnAgent>()
            .add_event::<AgentIntent>();

        app.add_systems(
            FixedUpdate,
            (lifecycle::respawn_agents, lifecycle::disable_unconfigured_agents)
                .chain()
                .in_set(WarbandSet::Sync),
        )
        .add_systems(
            FixedUpdate,
            (damage::apply_damage_requests, damage::tick_bodies)
                .chain()
                .in_set(WarbandSet::Resolve),
        )
        .add_systems(
            FixedUpdate,
            (
                affix::explode_on_death,
                affix::reflect_damage,
                affix::vampiric_heal,
                affix::trigger_berserk,
                affix::regenerate_shields,
            )
                .chain()
                .in_set(WarbandSet::React),
        )
        .add_systems(FixedUpdate, hitbox::resolve_melee_strikes.in_set(WarbandSet::Act))
        .add_systems(FixedUpdate, lifecycle::release_agents.in_set(WarbandSet::Cleanup));
    }
}
