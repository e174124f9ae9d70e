//! Data-driven transition rules.
//!
//! Дизайнер описывает переопределения переходов в stat block; состояние сначала
//! спрашивает `evaluate_rules`, и только если ничего не сработало: выполняет
//! свою hardcoded логику. Пустой список = поведение как без правил.

use serde::{Deserialize, Serialize};

use super::states::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCondition {
    /// has_target && distance < threshold
    TargetInRange,
    /// !has_target || distance > threshold
    TargetOutOfRange,
    TargetLost,
    /// health ratio < threshold
    HealthBelow,
    /// health ratio > threshold
    HealthAbove,
    PoiseBroken,
    /// time in state > threshold (секунды)
    TimeInState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub condition: RuleCondition,
    #[serde(default)]
    pub threshold: f32,
    /// Больше = важнее
    #[serde(default)]
    pub priority: i32,
    pub target: StateId,
}

/// Всё, что правила могут прочитать об агенте
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSnapshot {
    pub has_target: bool,
    pub distance: f32,
    pub health: f32,
    pub max_health: f32,
    pub staggered: bool,
}

impl RuleSnapshot {
    fn health_ratio(&self) -> Option<f32> {
        (self.max_health > 0.0).then(|| self.health / self.max_health)
    }
}

pub fn condition_holds(rule: &TransitionRule, snapshot: &RuleSnapshot, time_in_state: f32) -> bool {
    let t = rule.threshold;
    match rule.condition {
        RuleCondition::TargetInRange => snapshot.has_target && snapshot.distance < t,
        RuleCondition::TargetOutOfRange => !snapshot.has_target || snapshot.distance > t,
        RuleCondition::TargetLost => !snapshot.has_target,
        RuleCondition::HealthBelow => snapshot.health_ratio().is_some_and(|r| r < t),
        RuleCondition::HealthAbove => snapshot.health_ratio().is_some_and(|r| r > t),
        RuleCondition::PoiseBroken => snapshot.staggered,
        RuleCondition::TimeInState => time_in_state > t,
    }
}

/// Лучшее сработавшее правило: строго максимальный priority, при равенстве: первое.
///
/// Без side effects, можно звать каждый тик.
pub fn evaluate_rules<'a>(
    rules: &'a [TransitionRule],
    snapshot: &RuleSnapshot,
    time_in_state: f32,
) -> Option<&'a TransitionRule> {
    let mut best: Option<&TransitionRule> = None;

    for rule in rules {
        if !condition_holds(rule, snapshot, time_in_state) {
            continue;
        }
        if best.map_or(true, |b| rule.priority > b.priority) {
            best = Some(rule);
        }
    }

    best
}

/// Цель правила → состояние текущего графа.
///
/// None если архетип такого состояния не строит или агент уже в нём.
pub fn resolve_rule_target(target: StateId, current: StateId, available: &[StateId]) -> Option<StateId> {
    (target != current && available.contains(&target)).then_some(target)
}
