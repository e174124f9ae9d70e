//! Ошибки настройки агентов.
//!
//! Runtime-сбои (битая ссылка на цель, полный пул токенов) ошибками не считаются:
//! они гасятся на месте с безопасным дефолтом. Здесь только то, что прерывает
//! инициализацию одного агента.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("stat block '{name}': {field} must be >= 0 (got {value})")]
    Negative {
        name: String,
        field: &'static str,
        value: f32,
    },

    #[error("stat block '{name}': sight_angle {value} is outside 0..=180")]
    SightAngle { name: String, value: f32 },

    #[error("stat block '{name}': attack '{attack}' has non-positive weight {weight}")]
    AttackWeight {
        name: String,
        attack: String,
        weight: f32,
    },

    #[error("boss phase '{phase}': hp threshold {value} is outside 0..=1")]
    PhaseThreshold { phase: String, value: f32 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentSetupError {
    #[error("entity {0:?} has no CombatBody")]
    MissingBody(Entity),

    #[error("entity {0:?} does not exist")]
    MissingEntity(Entity),

    #[error("entity {0:?} has no stat block")]
    MissingStats(Entity),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}
