use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AffixEffect {
    #[default]
    None,
    /// effect_value = радиус, effect_secondary = урон
    ExplosiveOnDeath,
    /// effect_value = доля нанесённого урона, возвращаемая в HP
    VampiricOnHit,
    /// effect_value = HP/сек
    ShieldRegen,
    /// effect_value = HP ratio порог, effect_secondary = множитель урона
    BerserkOnLowHp,
    /// effect_value = доля полученного урона, отражаемая обратно
    ReflectOnHit,
}

/// Runtime-модификатор: множители статов + опциональный спецэффект.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffixDef {
    pub name: String,
    /// Короткая подпись для debug overlay ("Berserk", "Vampiric")
    pub label: String,
    pub hp_multiplier: f32,
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
    pub add_behavior_tags: Vec<String>,
    pub effect: AffixEffect,
    pub effect_value: f32,
    pub effect_secondary: f32,
}

impl Default for AffixDef {
    fn default() -> Self {
        Self {
            name: "Affix".to_string(),
            label: String::new(),
            hp_multiplier: 1.0,
            damage_multiplier: 1.0,
            speed_multiplier: 1.0,
            add_behavior_tags: Vec::new(),
            effect: AffixEffect::None,
            effect_value: 0.0,
            effect_secondary: 0.0,
        }
    }
}

impl AffixDef {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}
