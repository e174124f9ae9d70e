//! Immutable per-archetype stat block.
//!
//! Один `EnemyStats` делится между всеми агентами архетипа через `Arc`.
//! Runtime-значения (множители аффиксов, текущее HP) живут в `CombatBody`, не здесь.

use serde::{Deserialize, Serialize};

use super::attack::AttackPattern;
use crate::ai::rules::TransitionRule;
use crate::error::ConfigError;

pub const TAG_CAN_DODGE: &str = "CanDodge";
pub const TAG_CAN_BLOCK: &str = "CanBlock";
pub const TAG_SUPER_ARMOR: &str = "SuperArmor";

/// Параметры стационарной турели (Scan → Lock → Attack → Cooldown)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretParams {
    /// Скорость вращения в Scan (градусы/сек)
    pub scan_speed: f32,
    pub lock_on_duration: f32,
}

impl Default for TurretParams {
    fn default() -> Self {
        Self {
            scan_speed: 45.0,
            lock_on_duration: 0.8,
        }
    }
}

/// Параметры stealth-архетипа (Stealth → Flank → Strike → Disengage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalkerParams {
    pub stealth_alpha: f32,
    /// Скорость проявления/растворения alpha (единиц/сек)
    pub reveal_speed: f32,
    pub disengage_distance: f32,
    pub disengage_speed_multiplier: f32,
    /// Насколько далеко за спиной цели встаёт flanker
    pub flank_offset: f32,
}

impl Default for StalkerParams {
    fn default() -> Self {
        Self {
            stealth_alpha: 0.1,
            reveal_speed: 5.0,
            disengage_distance: 8.0,
            disengage_speed_multiplier: 2.0,
            flank_offset: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStats {
    pub name: String,

    // === Core ===
    pub max_health: f32,
    pub max_poise: f32,
    pub move_speed: f32,
    /// Градусы/сек
    pub rotation_speed: f32,
    pub attack_damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_knockback: f32,

    // === Attack timing (legacy, если `attacks` пуст) ===
    pub telegraph_duration: f32,
    pub attack_active_duration: f32,
    pub recovery_duration: f32,

    // === Ranged ===
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_knockback: f32,
    pub projectile_lifetime: f32,
    pub shots_per_burst: u32,
    pub burst_interval: f32,
    /// Shooter стреляет с этой дистанции
    pub preferred_range: f32,
    /// Ближе этого shooter отступает
    pub retreat_range: f32,

    pub stagger_duration: f32,

    // === Perception ===
    pub sight_range: f32,
    /// Half-angle конуса зрения (градусы)
    pub sight_angle: f32,
    pub hearing_range: f32,
    pub leash_range: f32,
    pub memory_duration: f32,

    pub hit_flash_duration: f32,

    // === Fear ===
    /// 0 = агент бесстрашный
    pub fear_threshold: f32,
    pub fear_from_ally_death: f32,
    pub fear_from_poise_broken: f32,
    /// Пассивный спад (единиц/сек)
    pub fear_decay_rate: f32,
    pub flee_duration: f32,

    // === Dodge / Block ===
    pub dodge_speed: f32,
    pub dodge_duration: f32,
    /// 0..1, доля урона, которую съедает блок
    pub block_damage_reduction: f32,
    pub block_duration: f32,
    pub threat_detection_radius: f32,

    pub behavior_tags: Vec<String>,
    pub transition_rules: Vec<TransitionRule>,
    pub attacks: Vec<AttackPattern>,

    pub turret: TurretParams,
    pub stalker: StalkerParams,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            name: "Enemy".to_string(),
            max_health: 100.0,
            max_poise: 50.0,
            move_speed: 3.0,
            rotation_speed: 360.0,
            attack_damage: 10.0,
            attack_range: 1.5,
            attack_cooldown: 1.0,
            attack_knockback: 5.0,
            telegraph_duration: 0.4,
            attack_active_duration: 0.2,
            recovery_duration: 0.6,
            projectile_speed: 8.0,
            projectile_damage: 8.0,
            projectile_knockback: 3.0,
            projectile_lifetime: 4.0,
            shots_per_burst: 3,
            burst_interval: 0.25,
            preferred_range: 10.0,
            retreat_range: 5.0,
            stagger_duration: 1.0,
            sight_range: 10.0,
            sight_angle: 60.0,
            hearing_range: 15.0,
            leash_range: 20.0,
            memory_duration: 3.0,
            hit_flash_duration: 0.1,
            fear_threshold: 50.0,
            fear_from_ally_death: 10.0,
            fear_from_poise_broken: 20.0,
            fear_decay_rate: 5.0,
            flee_duration: 4.0,
            dodge_speed: 8.0,
            dodge_duration: 0.3,
            block_damage_reduction: 0.7,
            block_duration: 1.5,
            threat_detection_radius: 5.0,
            behavior_tags: Vec::new(),
            transition_rules: Vec::new(),
            attacks: Vec::new(),
            turret: TurretParams::default(),
            stalker: StalkerParams::default(),
        }
    }
}

impl EnemyStats {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.behavior_tags.iter().any(|t| t == tag)
    }

    /// Проверка designer data до спавна.
    ///
    /// Отрицательные дальности/длительности ломают таймеры (вечный Stagger и т.п.),
    /// поэтому такой stat block не пускаем в симуляцию.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("max_health", self.max_health),
            ("max_poise", self.max_poise),
            ("move_speed", self.move_speed),
            ("attack_range", self.attack_range),
            ("attack_cooldown", self.attack_cooldown),
            ("stagger_duration", self.stagger_duration),
            ("sight_range", self.sight_range),
            ("hearing_range", self.hearing_range),
            ("leash_range", self.leash_range),
            ("memory_duration", self.memory_duration),
            ("fear_threshold", self.fear_threshold),
            ("fear_decay_rate", self.fear_decay_rate),
            ("flee_duration", self.flee_duration),
            ("dodge_duration", self.dodge_duration),
            ("block_duration", self.block_duration),
            ("threat_detection_radius", self.threat_detection_radius),
        ];

        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        if !(0.0..=180.0).contains(&self.sight_angle) {
            return Err(ConfigError::SightAngle {
                name: self.name.clone(),
                value: self.sight_angle,
            });
        }

        for attack in &self.attacks {
            if attack.selection_weight < 0.0 {
                return Err(ConfigError::AttackWeight {
                    name: self.name.clone(),
                    attack: attack.name.clone(),
                    weight: attack.selection_weight,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::rules::RuleCondition;
    use crate::ai::states::StateId;

    #[test]
    fn test_default_stats_are_valid() {
        let stats = EnemyStats::default();
        assert!(stats.validate().is_ok());
        assert_eq!(stats.max_health, 100.0);
        assert_eq!(stats.sight_angle, 60.0);
        assert_eq!(stats.memory_duration, 3.0);
    }

    #[test]
    fn test_negative_range_is_rejected() {
        let stats = EnemyStats {
            leash_range: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            stats.validate(),
            Err(ConfigError::Negative { field: "leash_range", .. })
        ));
    }

    #[test]
    fn test_sight_angle_above_180_is_rejected() {
        let stats = EnemyStats {
            sight_angle: 200.0,
            ..Default::default()
        };
        assert!(matches!(stats.validate(), Err(ConfigError::SightAngle { .. })));
    }

    #[test]
    fn test_designer_ron_fills_missing_fields_from_defaults() {
        let source = r#"(
            name: "Brute",
            max_health: 250.0,
            behavior_tags: ["SuperArmor"],
            transition_rules: [
                (condition: HealthBelow, threshold: 0.3, priority: 5, target: Flee),
            ],
        )"#;

        let stats: EnemyStats = ron::from_str(source).expect("valid ron");

        assert_eq!(stats.name, "Brute");
        assert_eq!(stats.max_health, 250.0);
        assert_eq!(stats.max_poise, 50.0);
        assert!(stats.has_tag(TAG_SUPER_ARMOR));
        assert_eq!(stats.transition_rules.len(), 1);
        assert_eq!(stats.transition_rules[0].condition, RuleCondition::HealthBelow);
        assert_eq!(stats.transition_rules[0].target, StateId::Flee);
    }
}
