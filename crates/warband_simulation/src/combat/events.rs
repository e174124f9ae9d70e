//! Combat events.
//!
//! Межагентные эффекты ходят только через события: у каждого CombatBody
//! единственный writer: система урона.

use bevy::prelude::*;

use crate::components::{Archetype, FactionId};
use crate::config::AttackPattern;

/// Запрос урона. Цель-агент обрабатывается `apply_damage_requests`,
/// остальные цели (игрок, разрушаемые объекты): на стороне host.
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub source: Option<Entity>,
    pub amount: f32,
    pub knockback_direction: Vec2,
    pub knockback_force: f32,
}

/// Урон прошёл (после block reduction)
#[derive(Event, Debug, Clone)]
pub struct DamageTaken {
    pub entity: Entity,
    pub source: Option<Entity>,
    pub amount: f32,
    pub remaining_health: f32,
}

/// Удар атакующего реально нанёс урон (vampiric и прочие on-hit эффекты)
#[derive(Event, Debug, Clone)]
pub struct AttackLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: f32,
}

#[derive(Event, Debug, Clone)]
pub struct PoiseBroken {
    pub entity: Entity,
}

/// Смерть агента (broadcast: fear союзников, explosive affix, host)
#[derive(Event, Debug, Clone)]
pub struct AgentDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    pub position: Vec2,
    pub faction: FactionId,
    pub archetype: Archetype,
    /// `EnemyStats::name`
    pub config: String,
}

#[derive(Event, Debug, Clone)]
pub struct PhaseChanged {
    pub entity: Entity,
    pub index: usize,
    pub phase: String,
    pub tint: Option<[f32; 4]>,
    pub spawn_on_transition: Option<String>,
}

/// Pool hook: вернуть агента в pool (после смерти или по решению host)
#[derive(Event, Debug, Clone, Copy)]
pub struct ReleaseAgent {
    pub entity: Entity,
}

/// Pool hook: агент снова в игре в точке `position`
#[derive(Event, Debug, Clone, Copy)]
pub struct RespawnAgent {
    pub entity: Entity,
    pub position: Vec2,
}

/// Намерения агента, которые исполняет host (или `resolve_melee_strikes` для melee)
#[derive(Event, Debug, Clone)]
pub enum AgentIntent {
    /// Windup начался: host показывает телеграф
    TelegraphStarted {
        agent: Entity,
        attack: String,
        duration: f32,
    },
    /// Melee удар: хитбокс проверяется в том же тике
    MeleeStrike {
        agent: Entity,
        origin: Vec2,
        facing: Vec2,
        pattern: AttackPattern,
        /// pattern.damage × damage multiplier
        damage: f32,
    },
    /// Один снаряд (spawn/lifetime: host)
    FireProjectile {
        agent: Entity,
        origin: Vec2,
        direction: Vec2,
        speed: f32,
        damage: f32,
        knockback: f32,
        lifetime: f32,
    },
    FireLaser {
        agent: Entity,
        origin: Vec2,
        direction: Vec2,
        range: f32,
        width: f32,
        duration: f32,
        damage: f32,
    },
    /// Прозрачность (stealth)
    SetAlpha { agent: Entity, alpha: f32 },
    HitFlash { agent: Entity, duration: f32 },
}

impl AgentIntent {
    pub fn agent(&self) -> Entity {
        match self {
            AgentIntent::TelegraphStarted { agent, .. }
            | AgentIntent::MeleeStrike { agent, .. }
            | AgentIntent::FireProjectile { agent, .. }
            | AgentIntent::FireLaser { agent, .. }
            | AgentIntent::SetAlpha { agent, .. }
            | AgentIntent::HitFlash { agent, .. } => *agent,
        }
    }
}
