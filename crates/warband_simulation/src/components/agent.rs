//! Базовые компоненты агента: Agent, StatBlock, AiDisabled, PlayerAdversary

use bevy::prelude::*;
use std::sync::Arc;

use crate::ai::fear::Fear;
use crate::config::EnemyStats;
use crate::perception::{Perception, ThreatSensor};
use crate::physics::Motor;
use crate::spatial::{Collider, LAYER_ADVERSARY};

/// Stable ID фракции. Агенты разных фракций охотятся друг на друга.
pub type FactionId = u32;

/// Какой граф состояний строит Brain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, serde::Serialize, serde::Deserialize)]
pub enum Archetype {
    /// Melee: Idle → Chase → Engage
    #[default]
    Rusher,
    /// Ranged: Chase → Shoot ↔ Retreat
    Shooter,
    /// Стационарный: Scan → Lock → Attack → Cooldown
    Turret,
    /// Stealth: Stealth → Flank → Strike → Disengage
    Stalker,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Rusher => "Rusher",
            Archetype::Shooter => "Shooter",
            Archetype::Turret => "Turret",
            Archetype::Stalker => "Stalker",
        }
    }
}

/// Враждебный агент.
///
/// Required Components добавляют сенсоры и движение; `CombatBody`, `Brain` и
/// `StatBlock` выставляет `spawn_agent` (им нужен stat block).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform, Motor, Perception, ThreatSensor, Fear, Collider)]
pub struct Agent {
    pub faction: FactionId,
    pub archetype: Archetype,
}

/// Ссылка на immutable конфиг архетипа.
///
/// `None` = агент заспавнен без конфига: логируем и выключаем (`AiDisabled`).
#[derive(Component, Debug, Clone, Default)]
pub struct StatBlock(pub Option<Arc<EnemyStats>>);

impl StatBlock {
    pub fn new(stats: Arc<EnemyStats>) -> Self {
        Self(Some(stats))
    }

    pub fn get(&self) -> Option<&EnemyStats> {
        self.0.as_deref()
    }

    pub fn name(&self) -> &str {
        self.get().map_or("<no stats>", |s| s.name.as_str())
    }
}

/// Маркер: агент выключен (нет конфига, деактивирован host'ом).
///
/// Все AI системы его пропускают, Director отбирает у него токен.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiDisabled;

/// Маркер primary adversary (игрок).
///
/// Только для удобства host/тестов: ядро видит игрока через `LAYER_ADVERSARY`.
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(Transform, Motor, Collider = Collider::circle(LAYER_ADVERSARY, 0.4))]
pub struct PlayerAdversary;
