use serde::{Deserialize, Serialize};

use super::attack::AttackPattern;
use crate::error::ConfigError;

/// Одна фаза босса.
///
/// Срабатывает, когда HP ratio опускается до `hp_threshold` или ниже.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossPhase {
    pub name: String,
    /// 0..1
    pub hp_threshold: f32,
    /// Пусто = атаки предыдущей фазы остаются
    pub attacks: Vec<AttackPattern>,
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
    /// Окно неуязвимости (секунды)
    pub transition_duration: f32,
    /// Визуальный hook (RGBA), рендер на стороне host
    pub tint: Option<[f32; 4]>,
    /// Id префаба для спавна при переходе (pool на стороне host)
    pub spawn_on_transition: Option<String>,
}

impl Default for BossPhase {
    fn default() -> Self {
        Self {
            name: "Phase".to_string(),
            hp_threshold: 0.5,
            attacks: Vec::new(),
            damage_multiplier: 1.0,
            speed_multiplier: 1.0,
            transition_duration: 1.5,
            tint: None,
            spawn_on_transition: None,
        }
    }
}

impl BossPhase {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.hp_threshold) {
            return Err(ConfigError::PhaseThreshold {
                phase: self.name.clone(),
                value: self.hp_threshold,
            });
        }
        Ok(())
    }
}
