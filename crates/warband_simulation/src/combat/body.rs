//! CombatBody: здоровье, poise, флаги и runtime-модификаторы агента.
//!
//! Body ничего не знает о событиях и других entity: `apply_damage` возвращает
//! `DamageOutcome`, а система урона (`combat::damage`) превращает его в события.

use bevy::prelude::*;
use std::collections::BTreeSet;

use super::attacks::AttackSet;
use crate::config::{AttackPattern, EnemyStats};

/// Что произошло с телом после одного попадания
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Урон после block reduction
    pub applied: f32,
    pub remaining_health: f32,
    pub impulse: Vec2,
    pub poise_broken: bool,
    pub died: bool,
}

#[derive(Component, Debug, Clone)]
pub struct CombatBody {
    health: f32,
    /// Runtime max (аффиксы умножают)
    max_health: f32,
    poise: f32,
    max_poise: f32,
    alive: bool,
    staggered: bool,
    invulnerable: bool,
    blocking: bool,
    block_reduction: f32,
    damage_multiplier: f32,
    speed_multiplier: f32,
    base_move_speed: f32,
    tags: BTreeSet<String>,
    hit_flash: f32,
    pub attacks: AttackSet,
}

impl Default for CombatBody {
    fn default() -> Self {
        Self::from_stats(&EnemyStats::default())
    }
}

impl CombatBody {
    pub fn from_stats(stats: &EnemyStats) -> Self {
        Self {
            health: stats.max_health,
            max_health: stats.max_health,
            poise: stats.max_poise,
            max_poise: stats.max_poise,
            alive: true,
            staggered: false,
            invulnerable: false,
            blocking: false,
            block_reduction: 0.0,
            damage_multiplier: 1.0,
            speed_multiplier: 1.0,
            base_move_speed: stats.move_speed,
            tags: stats.behavior_tags.iter().cloned().collect(),
            hit_flash: 0.0,
            attacks: AttackSet::new(stats.attacks.clone()),
        }
    }

    // === Getters ===

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn poise(&self) -> f32 {
        self.poise
    }

    pub fn max_poise(&self) -> f32 {
        self.max_poise
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_staggered(&self) -> bool {
        self.staggered
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn damage_multiplier(&self) -> f32 {
        self.damage_multiplier
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// move_speed × speed multiplier
    pub fn move_speed(&self) -> f32 {
        self.base_move_speed * self.speed_multiplier
    }

    pub fn hit_flash_remaining(&self) -> f32 {
        self.hit_flash
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    // === Flags ===

    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    pub fn set_blocking(&mut self, blocking: bool, reduction: f32) {
        self.blocking = blocking;
        self.block_reduction = if blocking { reduction.clamp(0.0, 1.0) } else { 0.0 };
    }

    // === Damage ===

    /// Удар по телу.
    ///
    /// Порядок: block reduction → health → knockback → hit flash → poise → смерть.
    /// `None` = удар проигнорирован (мёртв или неуязвим).
    pub fn apply_damage(
        &mut self,
        amount: f32,
        knockback_direction: Vec2,
        knockback_force: f32,
        hit_flash_duration: f32,
    ) -> Option<DamageOutcome> {
        if !self.alive || self.invulnerable {
            return None;
        }

        let mut applied = amount.max(0.0);
        if self.blocking {
            applied *= 1.0 - self.block_reduction;
        }

        self.health -= applied;

        let impulse = knockback_direction.normalize_or_zero() * knockback_force;
        self.hit_flash = hit_flash_duration.max(self.hit_flash);

        let poise_broken = self.apply_poise_damage(applied);

        let died = self.health <= 0.0;
        if died {
            self.health = 0.0;
            self.die();
        }

        Some(DamageOutcome {
            applied,
            remaining_health: self.health,
            impulse,
            poise_broken,
            died,
        })
    }

    /// Только poise. true = poise сломан этим ударом.
    pub fn apply_poise_damage(&mut self, amount: f32) -> bool {
        if !self.alive || self.staggered || self.max_poise <= 0.0 || amount <= 0.0 {
            return false;
        }

        self.poise -= amount;
        if self.poise <= 0.0 {
            self.poise = 0.0;
            self.staggered = true;
            return true;
        }
        false
    }

    /// true только на первом вызове
    pub fn die(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.staggered = false;
        self.blocking = false;
        self.block_reduction = 0.0;
        true
    }

    pub fn reset_poise(&mut self) {
        self.poise = self.max_poise;
        self.staggered = false;
    }

    pub fn restore_full(&mut self) {
        self.health = self.max_health;
        self.reset_poise();
    }

    /// Возвращает реально восстановленное HP
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.alive || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Множители аффикса / фазы босса. Текущее HP масштабируется тем же hp-фактором.
    pub fn apply_affix_multipliers(&mut self, hp: f32, damage: f32, speed: f32) {
        if hp > 0.0 {
            self.max_health *= hp;
            self.health *= hp;
        }
        if damage > 0.0 {
            self.damage_multiplier *= damage;
        }
        if speed > 0.0 {
            self.speed_multiplier *= speed;
        }
    }

    /// Подмена набора атак (фаза босса)
    pub fn replace_attacks(&mut self, patterns: Vec<AttackPattern>) {
        self.attacks.replace(patterns);
    }

    /// Тикает hit flash и cooldown'ы атак. true = hit flash только что закончился.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.attacks.tick(dt);
        if self.hit_flash > 0.0 {
            self.hit_flash = (self.hit_flash - dt).max(0.0);
            return self.hit_flash == 0.0;
        }
        false
    }

    // === Pool hooks ===

    /// Respawn: всё заново из конфига
    pub fn on_acquire(&mut self, stats: &EnemyStats) {
        *self = Self::from_stats(stats);
    }

    /// Возврат в pool: флаги и атаки чистятся, alive не трогаем
    pub fn on_release(&mut self) {
        self.staggered = false;
        self.invulnerable = false;
        self.blocking = false;
        self.block_reduction = 0.0;
        self.hit_flash = 0.0;
        self.attacks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> CombatBody {
        CombatBody::from_stats(&EnemyStats::default())
    }

    #[test]
    fn test_damage_reduces_health_and_poise() {
        let mut body = body();
        let outcome = body.apply_damage(20.0, Vec2::X, 5.0, 0.1).unwrap();

        assert_eq!(outcome.applied, 20.0);
        assert_eq!(body.health(), 80.0);
        assert_eq!(body.poise(), 30.0);
        assert_eq!(outcome.impulse, Vec2::new(5.0, 0.0));
        assert!(!outcome.poise_broken);
        assert!(!outcome.died);
    }

    #[test]
    fn test_block_reduces_damage() {
        let mut body = body();
        body.set_blocking(true, 0.7);

        let outcome = body.apply_damage(10.0, Vec2::ZERO, 0.0, 0.0).unwrap();

        assert!((outcome.applied - 3.0).abs() < 1e-5);
        assert!((body.health() - 97.0).abs() < 1e-5);

        body.set_blocking(false, 0.7);
        body.apply_damage(10.0, Vec2::ZERO, 0.0, 0.0);
        assert!((body.health() - 87.0).abs() < 1e-5);
    }

    #[test]
    fn test_invulnerable_and_dead_ignore_damage() {
        let mut body = body();
        body.set_invulnerable(true);
        assert!(body.apply_damage(50.0, Vec2::ZERO, 0.0, 0.0).is_none());
        assert_eq!(body.health(), 100.0);

        body.set_invulnerable(false);
        let outcome = body.apply_damage(150.0, Vec2::ZERO, 0.0, 0.0).unwrap();
        assert!(outcome.died);
        assert!(!body.is_alive());
        assert!(body.apply_damage(10.0, Vec2::ZERO, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_poise_break_happens_once() {
        let mut body = body();

        let first = body.apply_damage(60.0, Vec2::ZERO, 0.0, 0.0).unwrap();
        assert!(first.poise_broken);
        assert!(body.is_staggered());
        assert_eq!(body.poise(), 0.0);

        // Уже staggered: poise не трогаем
        let second = body.apply_damage(10.0, Vec2::ZERO, 0.0, 0.0).unwrap();
        assert!(!second.poise_broken);

        body.reset_poise();
        assert!(!body.is_staggered());
        assert_eq!(body.poise(), 50.0);
    }

    #[test]
    fn test_zero_max_poise_never_staggers() {
        let stats = EnemyStats {
            max_poise: 0.0,
            ..Default::default()
        };
        let mut body = CombatBody::from_stats(&stats);

        let outcome = body.apply_damage(40.0, Vec2::ZERO, 0.0, 0.0).unwrap();
        assert!(!outcome.poise_broken);
        assert!(!body.is_staggered());
    }

    #[test]
    fn test_die_is_idempotent() {
        let mut body = body();
        assert!(body.die());
        assert!(!body.die());
    }

    #[test]
    fn test_heal_is_capped_at_max() {
        let mut body = body();
        body.apply_damage(30.0, Vec2::ZERO, 0.0, 0.0);

        assert_eq!(body.heal(50.0), 30.0);
        assert_eq!(body.health(), 100.0);
    }

    #[test]
    fn test_affix_multipliers_keep_health_ratio() {
        let mut body = body();
        body.apply_damage(50.0, Vec2::ZERO, 0.0, 0.0);

        body.apply_affix_multipliers(2.0, 1.5, 1.3);

        assert_eq!(body.max_health(), 200.0);
        assert_eq!(body.health(), 100.0);
        assert_eq!(body.damage_multiplier(), 1.5);
        assert!((body.move_speed() - 3.9).abs() < 1e-5);
    }

    #[test]
    fn test_acquire_restores_everything_from_config() {
        let stats = EnemyStats {
            behavior_tags: vec!["CanDodge".to_string()],
            ..Default::default()
        };
        let mut body = CombatBody::from_stats(&stats);
        body.apply_damage(500.0, Vec2::ZERO, 0.0, 0.0);
        body.apply_affix_multipliers(2.0, 2.0, 2.0);
        body.on_release();

        body.on_acquire(&stats);

        assert!(body.is_alive());
        assert_eq!(body.health(), 100.0);
        assert_eq!(body.damage_multiplier(), 1.0);
        assert!(body.has_tag("CanDodge"));
    }
}
