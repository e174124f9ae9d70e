//! Shooter: Shoot (очередь снарядов под токеном) и Retreat (держать дистанцию).

use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::combat::AgentIntent;
use crate::config::{AttackKind, AttackPattern};

/// Снаряд появляется чуть впереди стрелка
pub const MUZZLE_OFFSET: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShootPhase {
    #[default]
    Telegraph,
    Firing,
    Recovery,
}

#[derive(Debug, Default)]
pub struct Shoot {
    phase: ShootPhase,
    phase_timer: f32,
    burst_timer: f32,
    shots_fired: u32,
    pattern: Option<AttackPattern>,
    denied: bool,
}

impl Shoot {
    pub fn phase(&self) -> ShootPhase {
        self.phase
    }

    fn fire(&self, ctx: &mut BrainContext<'_>, pattern: &AttackPattern) {
        let direction = ctx.direction_to_target();
        let direction = if direction == bevy::math::Vec2::ZERO {
            ctx.motor.facing
        } else {
            direction
        };
        ctx.face(direction);
        let intent = AgentIntent::FireProjectile {
            agent: ctx.entity,
            origin: ctx.position + direction * MUZZLE_OFFSET,
            direction,
            speed: pattern.projectile_speed,
            damage: pattern.damage * ctx.body.damage_multiplier(),
            knockback: pattern.projectile_knockback,
            lifetime: pattern.projectile_lifetime,
        };
        ctx.emit(intent);
    }
}

impl Tactic for Shoot {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        self.denied = !ctx.request_token();
        if self.denied {
            return;
        }

        let pattern = ctx.pick_attack(&[AttackKind::Projectile], AttackPattern::legacy_projectile);
        self.phase = ShootPhase::Telegraph;
        self.phase_timer = pattern.telegraph_duration;
        self.burst_timer = 0.0;
        self.shots_fired = 0;

        ctx.stop();
        ctx.face_target();
        ctx.emit(AgentIntent::TelegraphStarted {
            agent: ctx.entity,
            attack: pattern.name.clone(),
            duration: pattern.telegraph_duration,
        });
        self.pattern = Some(pattern);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, _time_in_state: f32) -> Option<StateId> {
        if self.denied {
            return Some(StateId::Orbit);
        }
        if ctx.target_out_of_leash() {
            return Some(StateId::Return);
        }
        if ctx.distance() < ctx.stats.retreat_range {
            return Some(StateId::Retreat);
        }

        let pattern = self.pattern.take()?;
        let next = match self.phase {
            ShootPhase::Telegraph => {
                ctx.face_target();
                self.phase_timer -= dt;
                if self.phase_timer <= 0.0 {
                    // Первый выстрел сразу
                    self.phase = ShootPhase::Firing;
                    self.shots_fired = 0;
                    self.burst_timer = 0.0;
                }
                None
            }
            ShootPhase::Firing => {
                let shots = pattern.shots_per_burst.max(1);
                self.burst_timer -= dt;
                if self.burst_timer <= 0.0 && self.shots_fired < shots {
                    self.fire(ctx, &pattern);
                    self.shots_fired += 1;
                    self.burst_timer = pattern.burst_interval;
                }
                if self.shots_fired >= shots {
                    self.phase = ShootPhase::Recovery;
                    self.phase_timer = pattern.recovery_duration;
                }
                None
            }
            ShootPhase::Recovery => {
                self.phase_timer -= dt;
                (self.phase_timer <= 0.0).then_some(ctx.routes.pursue)
            }
        };
        self.pattern = Some(pattern);
        next
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.release_token();
        self.pattern = None;
        self.denied = false;
        self.phase = ShootPhase::Telegraph;
    }

    fn sub_label(&self) -> Option<&'static str> {
        if self.pattern.is_none() {
            return None;
        }
        Some(match self.phase {
            ShootPhase::Telegraph => "Telegraph",
            ShootPhase::Firing => "Firing",
            ShootPhase::Recovery => "Recovery",
        })
    }
}

/// Цель слишком близко: пятимся до preferred_range
#[derive(Debug, Default)]
pub struct Retreat;

impl Tactic for Retreat {
    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, _time_in_state: f32) -> Option<StateId> {
        if ctx.target_out_of_leash() {
            return Some(StateId::Return);
        }

        if ctx.distance() >= ctx.stats.preferred_range {
            return Some(if ctx.request_token() {
                StateId::Shoot
            } else {
                StateId::Orbit
            });
        }

        let away = ctx.steer(-ctx.direction_to_target(), 0.5);
        ctx.move_to(away);
        // Пятимся лицом к цели
        let toward = ctx.direction_to_target();
        ctx.motor.face(toward);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }
}
