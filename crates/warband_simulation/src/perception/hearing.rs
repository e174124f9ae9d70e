//! Hearing: выстрелы игрока как источник last-known позиции.
//!
//! Без LoS и без конуса: слышно сквозь стены, дальность = min(hearing_range, noise_radius).

use bevy::prelude::*;

use super::belief::Perception;
use crate::config::EnemyStats;

/// Событие: игрок выстрелил (hearing).
///
/// Генерируется host'ом (оружие игрока). Агенты в пределах
/// `min(hearing_range, noise_radius)` узнают позицию стрелка.
#[derive(Event, Debug, Clone)]
pub struct WeaponFired {
    pub shooter: Option<Entity>,
    /// Позиция стрелка в момент выстрела
    pub position: Vec2,
    /// Радиус слышимости выстрела (зависит от оружия)
    pub noise_radius: f32,
}

/// true если агент услышал выстрел
pub fn hear_weapon_fire(
    perception: &mut Perception,
    listener_position: Vec2,
    stats: &EnemyStats,
    event: &WeaponFired,
) -> bool {
    let audible = stats.hearing_range.min(event.noise_radius);
    if listener_position.distance(event.position) > audible {
        return false;
    }

    perception.hear(event.position, stats.memory_duration);
    true
}
