//! Активный набор атак агента (weighted random + per-pattern cooldown).
//!
//! Стартует из `EnemyStats::attacks`, босс подменяет набор при смене фазы.

use rand::Rng;

use crate::config::{AttackKind, AttackPattern};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackSet {
    patterns: Vec<AttackPattern>,
    /// Оставшийся cooldown на паттерн (тот же индекс)
    cooldowns: Vec<f32>,
}

impl AttackSet {
    pub fn new(patterns: Vec<AttackPattern>) -> Self {
        let cooldowns = vec![0.0; patterns.len()];
        Self { patterns, cooldowns }
    }

    /// Подмена набора (фаза босса). Cooldown'ы обнуляются.
    pub fn replace(&mut self, patterns: Vec<AttackPattern>) {
        *self = Self::new(patterns);
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
        self.cooldowns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> &[AttackPattern] {
        &self.patterns
    }

    pub fn get(&self, index: usize) -> Option<&AttackPattern> {
        self.patterns.get(index)
    }

    pub fn cooldown_remaining(&self, index: usize) -> f32 {
        self.cooldowns.get(index).copied().unwrap_or(0.0)
    }

    pub fn tick(&mut self, dt: f32) {
        for cooldown in &mut self.cooldowns {
            *cooldown = (*cooldown - dt).max(0.0);
        }
    }

    pub fn start_cooldown(&mut self, index: usize) {
        if let (Some(cooldown), Some(pattern)) = (self.cooldowns.get_mut(index), self.patterns.get(index)) {
            *cooldown = pattern.cooldown;
        }
    }

    /// Weighted random среди готовых паттернов нужного вида
    pub fn select(&self, rng: &mut impl Rng, kinds: &[AttackKind]) -> Option<usize> {
        let ready = |i: usize| {
            let p = &self.patterns[i];
            kinds.contains(&p.kind) && p.selection_weight > 0.0 && self.cooldowns[i] <= 0.0
        };

        let total: f32 = (0..self.patterns.len())
            .filter(|&i| ready(i))
            .map(|i| self.patterns[i].selection_weight)
            .sum();
        if total <= 0.0 {
            return None;
        }

        let mut roll = rng.gen::<f32>() * total;
        let mut last = None;
        for i in (0..self.patterns.len()).filter(|&i| ready(i)) {
            roll -= self.patterns[i].selection_weight;
            last = Some(i);
            if roll < 0.0 {
                return Some(i);
            }
        }
        // Float-погрешность: отдаём последний подходящий
        last
    }

    /// Выбрать атаку и запустить её cooldown; пусто → `fallback`
    pub fn take(
        &mut self,
        rng: &mut impl Rng,
        kinds: &[AttackKind],
        fallback: impl FnOnce() -> AttackPattern,
    ) -> AttackPattern {
        match self.select(rng, kinds) {
            Some(index) => {
                self.start_cooldown(index);
                self.patterns[index].clone()
            }
            None => fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pattern(name: &str, kind: AttackKind, weight: f32, cooldown: f32) -> AttackPattern {
        AttackPattern {
            name: name.to_string(),
            kind,
            selection_weight: weight,
            cooldown,
            ..Default::default()
        }
    }

    #[test]
    fn test_select_filters_by_kind() {
        let set = AttackSet::new(vec![
            pattern("slash", AttackKind::Melee, 1.0, 0.0),
            pattern("bolt", AttackKind::Projectile, 1.0, 0.0),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..20 {
            assert_eq!(set.select(&mut rng, &[AttackKind::Projectile]), Some(1));
        }
        assert_eq!(set.select(&mut rng, &[AttackKind::Laser]), None);
    }

    #[test]
    fn test_zero_weight_is_never_selected() {
        let set = AttackSet::new(vec![
            pattern("never", AttackKind::Melee, 0.0, 0.0),
            pattern("always", AttackKind::Melee, 2.0, 0.0),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            assert_eq!(set.select(&mut rng, &[AttackKind::Melee]), Some(1));
        }
    }

    #[test]
    fn test_weights_bias_selection() {
        let set = AttackSet::new(vec![
            pattern("rare", AttackKind::Melee, 1.0, 0.0),
            pattern("common", AttackKind::Melee, 9.0, 0.0),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let common = (0..1000)
            .filter(|_| set.select(&mut rng, &[AttackKind::Melee]) == Some(1))
            .count();
        assert!(common > 800, "common picked {} times", common);
    }

    #[test]
    fn test_cooldown_blocks_until_ticked() {
        let mut set = AttackSet::new(vec![
            pattern("heavy", AttackKind::Melee, 1.0, 2.0),
            pattern("jab", AttackKind::Melee, 1.0, 0.0),
        ]);
        set.start_cooldown(0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..20 {
            assert_eq!(set.select(&mut rng, &[AttackKind::Melee]), Some(1));
        }

        set.tick(2.0);
        assert_eq!(set.cooldown_remaining(0), 0.0);
    }

    #[test]
    fn test_take_falls_back_when_empty() {
        let mut set = AttackSet::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let attack = set.take(&mut rng, &[AttackKind::Melee], || pattern("legacy", AttackKind::Melee, 1.0, 0.0));
        assert_eq!(attack.name, "legacy");
    }
}
