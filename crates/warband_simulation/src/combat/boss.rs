//! Boss phases.
//!
//! Фазы отсортированы по порогу HP по убыванию, индекс только растёт.
//! Переход: неуязвимость → Brain принудительно уходит в PhaseTransition →
//! по таймеру состояние зовёт `end_transition`.

use bevy::prelude::*;

use super::events::PhaseChanged;
use super::CombatBody;
use crate::ai::{Brain, StateId};
use crate::config::BossPhase;

#[derive(Component, Debug, Clone)]
pub struct BossController {
    phases: Vec<BossPhase>,
    /// -1 = ещё ни одной фазы
    current_phase: i32,
    transitioning: bool,
}

impl BossController {
    pub fn new(mut phases: Vec<BossPhase>) -> Self {
        phases.sort_by(|a, b| b.hp_threshold.total_cmp(&a.hp_threshold));
        Self {
            phases,
            current_phase: -1,
            transitioning: false,
        }
    }

    pub fn phases(&self) -> &[BossPhase] {
        &self.phases
    }

    pub fn current_phase(&self) -> i32 {
        self.current_phase
    }

    pub fn current(&self) -> Option<&BossPhase> {
        usize::try_from(self.current_phase).ok().and_then(|i| self.phases.get(i))
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Длительность текущего перехода (1.5 без фазы)
    pub fn transition_duration(&self) -> f32 {
        self.current().map_or(1.5, |p| p.transition_duration)
    }

    /// Первая фаза после текущей, чей порог ≥ ratio. Максимум одна за вызов.
    pub fn check(&mut self, health_ratio: f32) -> Option<usize> {
        if self.transitioning {
            return None;
        }

        let start = (self.current_phase + 1).max(0) as usize;
        let next = (start..self.phases.len()).find(|&i| health_ratio <= self.phases[i].hp_threshold)?;

        self.current_phase = next as i32;
        self.transitioning = true;
        Some(next)
    }

    /// Переход окончен: снимаем неуязвимость
    pub fn end_transition(&mut self, body: &mut CombatBody) {
        self.transitioning = false;
        body.set_invulnerable(false);
    }

    /// Acquire hook
    pub fn reset(&mut self) {
        self.current_phase = -1;
        self.transitioning = false;
    }
}

/// Проверка порогов сразу после попадания (внутри `apply_damage_requests`).
///
/// Неуязвимость включается до следующего DamageRequest того же тика,
/// так что второй удар в том же тике уже не проходит.
pub fn advance_phase(
    entity: Entity,
    boss: &mut BossController,
    body: &mut CombatBody,
    brain: Option<&mut Brain>,
) -> Option<PhaseChanged> {
    if !body.is_alive() {
        return None;
    }

    let index = boss.check(body.health_ratio())?;
    let phase = boss.current().cloned()?;

    body.set_invulnerable(true);
    if let Some(brain) = brain {
        brain.force_transition(StateId::PhaseTransition);
    }
    body.apply_affix_multipliers(1.0, phase.damage_multiplier, phase.speed_multiplier);
    if !phase.attacks.is_empty() {
        body.replace_attacks(phase.attacks.clone());
    }

    crate::log_info(&format!(
        "👑 {:?} entered phase {} '{}' at {:.0}% HP",
        entity,
        index,
        phase.name,
        body.health_ratio() * 100.0
    ));

    Some(PhaseChanged {
        entity,
        index,
        phase: phase.name,
        tint: phase.tint,
        spawn_on_transition: phase.spawn_on_transition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(name: &str, threshold: f32) -> BossPhase {
        BossPhase {
            name: name.to_string(),
            hp_threshold: threshold,
            ..Default::default()
        }
    }

    fn controller() -> BossController {
        BossController::new(vec![phase("enraged", 0.3), phase("angry", 0.6)])
    }

    #[test]
    fn test_phases_sorted_descending() {
        let boss = controller();
        assert_eq!(boss.phases()[0].name, "angry");
        assert_eq!(boss.phases()[1].name, "enraged");
        assert_eq!(boss.current_phase(), -1);
    }

    #[test]
    fn test_big_hit_advances_one_phase_at_a_time() {
        let mut boss = controller();

        assert_eq!(boss.check(0.1), Some(0));
        // Пока идёт переход: игнор
        assert_eq!(boss.check(0.1), None);

        let mut body = CombatBody::default();
        boss.end_transition(&mut body);
        assert_eq!(boss.check(0.1), Some(1));
        assert_eq!(boss.current_phase(), 1);
    }

    #[test]
    fn test_phase_index_never_decreases() {
        let mut boss = controller();
        let mut body = CombatBody::default();

        boss.check(0.5);
        boss.end_transition(&mut body);
        // HP "восстановилось": фаза остаётся
        assert_eq!(boss.check(0.9), None);
        assert_eq!(boss.current_phase(), 0);
    }

    #[test]
    fn test_end_transition_clears_invulnerability() {
        let mut boss = controller();
        let mut body = CombatBody::default();
        body.set_invulnerable(true);
        boss.check(0.5);

        boss.end_transition(&mut body);

        assert!(!body.is_invulnerable());
        assert!(!boss.is_transitioning());
    }

    #[test]
    fn test_reset_returns_to_no_phase() {
        let mut boss = controller();
        boss.check(0.2);
        boss.reset();
        assert_eq!(boss.current_phase(), -1);
        assert_eq!(boss.current(), None);
    }

    #[test]
    fn test_advance_phase_turns_on_invulnerability() {
        let mut boss = controller();
        let mut body = CombatBody::default();
        let entity = Entity::from_raw(7);

        body.apply_damage(50.0, Vec2::ZERO, 0.0, 0.0);
        let changed = advance_phase(entity, &mut boss, &mut body, None).unwrap();

        assert_eq!(changed.index, 0);
        assert_eq!(changed.phase, "angry");
        assert!(body.is_invulnerable());
        // Следующий удар того же тика отбивается
        assert!(body.apply_damage(30.0, Vec2::ZERO, 0.0, 0.0).is_none());
        assert!(advance_phase(entity, &mut boss, &mut body, None).is_none());
    }
}
