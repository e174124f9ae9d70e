//! Designer data (read-only at runtime) + runtime tuning resource.
//!
//! Загрузка ассетов: на стороне host: всё здесь `serde`-совместимо,
//! host парсит RON/JSON и передаёт готовые `Arc<EnemyStats>` в `spawn_agent`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod affix;
pub mod attack;
pub mod boss;
pub mod stats;

pub use affix::{AffixDef, AffixEffect};
pub use attack::{AttackKind, AttackPattern, HitboxShapeKind};
pub use boss::BossPhase;
pub use stats::{
    EnemyStats, StalkerParams, TurretParams, TAG_CAN_BLOCK, TAG_CAN_DODGE, TAG_SUPER_ARMOR,
};

/// Глобальные параметры симуляции
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatAiConfig {
    /// FixedUpdate частота (Hz)
    pub tick_rate: f64,
    /// Период vision/faction scan (5 Hz)
    pub perception_interval: f32,
    /// Период скана снарядов
    pub threat_scan_interval: f32,
    /// Как часто Orbit повторно просит токен
    pub orbit_token_retry: f32,
    /// Радиус, в котором аффикс Reflect ищет обидчика
    pub reflect_search_radius: f32,
    /// Knockback взрыва ExplosiveOnDeath
    pub explosion_knockback: f32,
}

impl Default for CombatAiConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            perception_interval: 0.2,
            threat_scan_interval: 0.2,
            orbit_token_retry: 0.4,
            reflect_search_radius: 5.0,
            explosion_knockback: 8.0,
        }
    }
}
