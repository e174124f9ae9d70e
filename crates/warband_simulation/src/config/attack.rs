//! Attack pattern data (one entry of an archetype's attack list, or a boss phase attack set).

use serde::{Deserialize, Serialize};

use super::stats::EnemyStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttackKind {
    #[default]
    Melee,
    Projectile,
    Laser,
}

/// Форма melee hitbox (см. `combat::hitbox`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HitboxShapeKind {
    #[default]
    Circle,
    /// `hitbox_radius` = half-width, `hitbox_length` = half-length
    Box,
    /// Circle + angle filter, `hitbox_angle` = half-angle (degrees)
    Cone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackPattern {
    pub name: String,
    pub kind: AttackKind,

    // Telegraph → Active → Recovery (секунды)
    pub telegraph_duration: f32,
    pub active_duration: f32,
    pub recovery_duration: f32,

    pub damage: f32,
    pub knockback: f32,

    // Melee hitbox
    pub shape: HitboxShapeKind,
    pub hitbox_radius: f32,
    pub hitbox_length: f32,
    pub hitbox_angle: f32,
    pub hitbox_offset: f32,

    // Projectile
    pub projectile_speed: f32,
    pub projectile_knockback: f32,
    pub projectile_lifetime: f32,
    pub shots_per_burst: u32,
    pub burst_interval: f32,

    // Laser
    pub laser_range: f32,
    pub laser_duration: f32,
    pub laser_width: f32,

    /// Вес для weighted random selection (0 = никогда не выбирается)
    pub selection_weight: f32,
    /// Персональный cooldown паттерна (поверх общего attack_cooldown)
    pub cooldown: f32,
}

impl Default for AttackPattern {
    fn default() -> Self {
        Self {
            name: "Attack".to_string(),
            kind: AttackKind::Melee,
            telegraph_duration: 0.4,
            active_duration: 0.2,
            recovery_duration: 0.6,
            damage: 10.0,
            knockback: 5.0,
            shape: HitboxShapeKind::Circle,
            hitbox_radius: 1.5,
            hitbox_length: 1.0,
            hitbox_angle: 45.0,
            hitbox_offset: 0.5,
            projectile_speed: 8.0,
            projectile_knockback: 3.0,
            projectile_lifetime: 4.0,
            shots_per_burst: 1,
            burst_interval: 0.25,
            laser_range: 15.0,
            laser_duration: 1.0,
            laser_width: 0.3,
            selection_weight: 1.0,
            cooldown: 0.0,
        }
    }
}

impl AttackPattern {
    /// Melee-атака из плоских полей stat block (агент без списка атак)
    pub fn legacy_melee(stats: &EnemyStats) -> Self {
        Self {
            name: format!("{} (melee)", stats.name),
            kind: AttackKind::Melee,
            telegraph_duration: stats.telegraph_duration,
            active_duration: stats.attack_active_duration,
            recovery_duration: stats.recovery_duration,
            damage: stats.attack_damage,
            knockback: stats.attack_knockback,
            hitbox_radius: stats.attack_range,
            ..Self::default()
        }
    }

    /// Projectile burst из плоских полей stat block
    pub fn legacy_projectile(stats: &EnemyStats) -> Self {
        Self {
            name: format!("{} (burst)", stats.name),
            kind: AttackKind::Projectile,
            telegraph_duration: stats.telegraph_duration,
            active_duration: stats.attack_active_duration,
            recovery_duration: stats.recovery_duration,
            damage: stats.projectile_damage,
            knockback: stats.projectile_knockback,
            projectile_speed: stats.projectile_speed,
            projectile_knockback: stats.projectile_knockback,
            projectile_lifetime: stats.projectile_lifetime,
            shots_per_burst: stats.shots_per_burst,
            burst_interval: stats.burst_interval,
            ..Self::default()
        }
    }

    /// Сколько длится Active окно у турели (лазер держится дольше)
    pub fn turret_active_window(&self) -> f32 {
        match self.kind {
            AttackKind::Laser => self.laser_duration + 0.15,
            _ => self.active_duration,
        }
    }
}
