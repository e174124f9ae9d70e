//! Stalker: невидимость, заход за спину, удар, отход.

use bevy::math::Vec2;

use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::combat::AgentIntent;
use crate::config::{AttackKind, AttackPattern};

const HOME_DRIFT_DISTANCE: f32 = 1.0;
const SEPARATION_WEIGHT: f32 = 0.4;
/// dot(facing игрока, направление на stalker'а) ниже: мы за спиной
const BEHIND_THRESHOLD: f32 = -0.3;
const REVEAL_DURATION: f32 = 0.2;
const COMMIT_DURATION: f32 = 0.15;
const MAX_DISENGAGE_TIME: f32 = 3.0;

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[derive(Debug, Default)]
pub struct Stealth;

impl Tactic for Stealth {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.set_alpha(ctx.stats.stalker.stealth_alpha);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, _time_in_state: f32) -> Option<StateId> {
        ctx.set_alpha(ctx.stats.stalker.stealth_alpha);
        if ctx.has_target() {
            return Some(StateId::Flank);
        }

        let to_home = ctx.spawn_position - ctx.position;
        if to_home.length() > HOME_DRIFT_DISTANCE {
            ctx.move_to(to_home.normalize_or_zero());
        } else {
            ctx.stop();
        }
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }
}

#[derive(Debug, Default)]
pub struct Flank {
    behind: bool,
}

impl Tactic for Flank {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        self.behind = false;
        ctx.set_alpha(ctx.stats.stalker.stealth_alpha);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, _time_in_state: f32) -> Option<StateId> {
        if ctx.target_out_of_leash() {
            return Some(StateId::Stealth);
        }
        ctx.set_alpha(ctx.stats.stalker.stealth_alpha);

        let target = ctx.target_position();
        let belief = &ctx.perception.belief;
        // Facing известен только у игрока
        let target_facing = if belief.adversary.is_some() {
            belief.adversary_facing.normalize_or(Vec2::Y)
        } else {
            Vec2::Y
        };

        let from_target = (ctx.position - target).normalize_or_zero();
        self.behind = target_facing.dot(from_target) < BEHIND_THRESHOLD;
        let in_range = ctx.distance() < ctx.stats.attack_range;
        if self.behind && in_range && ctx.request_token() {
            return Some(StateId::Strike);
        }

        let behind_point = target - target_facing * ctx.stats.stalker.flank_offset;
        let direction = ctx.steer((behind_point - ctx.position).normalize_or_zero(), SEPARATION_WEIGHT);
        ctx.move_to(direction);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }

    fn sub_label(&self) -> Option<&'static str> {
        self.behind.then_some("Behind")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrikePhase {
    #[default]
    Reveal,
    Commit,
}

#[derive(Debug, Default)]
pub struct Strike {
    phase: StrikePhase,
    alpha: f32,
    pattern: Option<AttackPattern>,
    denied: bool,
}

impl Tactic for Strike {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        self.denied = !ctx.request_token();
        if self.denied {
            return;
        }
        self.phase = StrikePhase::Reveal;
        self.alpha = ctx.stats.stalker.stealth_alpha;
        ctx.stop();
        ctx.face_target();

        let pattern = ctx.pick_attack(&[AttackKind::Melee], AttackPattern::legacy_melee);
        ctx.emit(AgentIntent::TelegraphStarted {
            agent: ctx.entity,
            attack: pattern.name.clone(),
            duration: REVEAL_DURATION,
        });
        self.pattern = Some(pattern);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, time_in_state: f32) -> Option<StateId> {
        if self.denied {
            return Some(StateId::Disengage);
        }

        match self.phase {
            StrikePhase::Reveal => {
                self.alpha = move_towards(self.alpha, 1.0, ctx.stats.stalker.reveal_speed * dt);
                ctx.set_alpha(self.alpha);
                if time_in_state < REVEAL_DURATION {
                    return None;
                }

                ctx.set_alpha(1.0);
                if let Some(pattern) = self.pattern.take() {
                    let intent = AgentIntent::MeleeStrike {
                        agent: ctx.entity,
                        origin: ctx.position,
                        facing: ctx.motor.facing,
                        damage: pattern.damage * ctx.body.damage_multiplier(),
                        pattern,
                    };
                    ctx.emit(intent);
                }
                self.phase = StrikePhase::Commit;
                None
            }
            StrikePhase::Commit => (time_in_state >= REVEAL_DURATION + COMMIT_DURATION).then_some(StateId::Disengage),
        }
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.release_token();
        if !self.denied {
            ctx.set_alpha(1.0);
        }
        self.pattern = None;
        self.denied = false;
    }

    fn sub_label(&self) -> Option<&'static str> {
        if self.denied {
            return None;
        }
        Some(match self.phase {
            StrikePhase::Reveal => "Reveal",
            StrikePhase::Commit => "Commit",
        })
    }
}

/// Отход после удара, alpha плавно обратно в stealth
#[derive(Debug, Default)]
pub struct Disengage {
    alpha: f32,
}

impl Tactic for Disengage {
    fn enter(&mut self, _ctx: &mut BrainContext<'_>) {
        self.alpha = 1.0;
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, time_in_state: f32) -> Option<StateId> {
        let stalker = &ctx.stats.stalker;
        self.alpha = move_towards(self.alpha, stalker.stealth_alpha, stalker.reveal_speed * 0.5 * dt);
        let (disengage_distance, multiplier) = (stalker.disengage_distance, stalker.disengage_speed_multiplier);
        ctx.set_alpha(self.alpha);

        let threat = if ctx.has_target() {
            ctx.target_position()
        } else {
            ctx.spawn_position
        };
        let distance = ctx.position.distance(threat);
        if distance >= disengage_distance || time_in_state >= MAX_DISENGAGE_TIME {
            return Some(StateId::Stealth);
        }

        let away = (ctx.position - threat).normalize_or_zero();
        let speed = ctx.body.move_speed() * multiplier;
        ctx.move_at_speed(away, speed);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_towards_clamps_to_target() {
        assert_eq!(move_towards(0.3, 1.0, 0.2), 0.5);
        assert_eq!(move_towards(0.9, 1.0, 0.2), 1.0);
        assert_eq!(move_towards(1.0, 0.3, 0.5), 0.5);
    }
}
