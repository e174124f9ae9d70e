//! Turret: Scan → Lock → Attack → Cooldown. Стационарная, токены не берёт.

use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::combat::AgentIntent;
use crate::config::{AttackKind, AttackPattern};
use crate::spatial::geometry::{deg_of, direction_from_deg};

use super::ranged::MUZZLE_OFFSET;

/// Вращение "прожектора" по кругу
#[derive(Debug, Default)]
pub struct Scan {
    angle: f32,
}

impl Tactic for Scan {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
        self.angle = deg_of(ctx.motor.facing);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, _time_in_state: f32) -> Option<StateId> {
        if ctx.has_target() {
            return Some(StateId::Lock);
        }
        self.angle = (self.angle + ctx.stats.turret.scan_speed * dt).rem_euclid(360.0);
        ctx.face(direction_from_deg(self.angle));
        None
    }
}

/// Наведение: держим цель lock_on_duration, атака выбирается на входе
#[derive(Debug, Default)]
pub struct Lock;

impl Tactic for Lock {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        let pattern = ctx.pick_attack(&[AttackKind::Laser, AttackKind::Projectile], AttackPattern::legacy_projectile);
        crate::log(&format!("🎯 {:?} locking with '{}'", ctx.entity, pattern.name));
        ctx.blackboard.selected_attack = Some(pattern);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        if !ctx.has_target() {
            return Some(StateId::Scan);
        }
        ctx.face_target();
        (time_in_state >= ctx.stats.turret.lock_on_duration).then_some(StateId::Attack)
    }
}

/// Один выстрел выбранной атакой, потом ждём окно Active
#[derive(Debug, Default)]
pub struct TurretAttack {
    window: f32,
}

impl Tactic for TurretAttack {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        let Some(pattern) = ctx.blackboard.selected_attack.take() else {
            crate::log_warning(&format!("{:?}: turret attack without a locked pattern, skipping", ctx.entity));
            self.window = 0.0;
            return;
        };
        self.window = pattern.turret_active_window();

        let origin = ctx.position;
        let direction = ctx.motor.facing;
        let damage = pattern.damage * ctx.body.damage_multiplier();
        match pattern.kind {
            AttackKind::Laser => ctx.emit(AgentIntent::FireLaser {
                agent: ctx.entity,
                origin,
                direction,
                range: pattern.laser_range,
                width: pattern.laser_width,
                duration: pattern.laser_duration,
                damage,
            }),
            AttackKind::Projectile => ctx.emit(AgentIntent::FireProjectile {
                agent: ctx.entity,
                origin: origin + direction * MUZZLE_OFFSET,
                direction,
                speed: pattern.projectile_speed,
                damage,
                knockback: pattern.projectile_knockback,
                lifetime: pattern.projectile_lifetime,
            }),
            AttackKind::Melee => {
                crate::log_warning(&format!("{:?}: melee pattern '{}' on a turret ignored", ctx.entity, pattern.name));
            }
        }
    }

    fn tick(&mut self, _ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        (time_in_state >= self.window).then_some(StateId::Cooldown)
    }
}

#[derive(Debug, Default)]
pub struct Cooldown;

impl Tactic for Cooldown {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        if time_in_state < ctx.stats.attack_cooldown {
            return None;
        }
        Some(if ctx.has_target() { StateId::Lock } else { StateId::Scan })
    }
}
