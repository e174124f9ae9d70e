//! ECS Components общего назначения
//!
//! Доменные компоненты лежат рядом со своими системами:
//! - perception: Perception, ThreatSensor
//! - ai: Brain, Fear
//! - combat: CombatBody, BossController, AffixSet
//! - physics: Motor
//! - spatial: Collider

pub mod agent;

pub use agent::*;
