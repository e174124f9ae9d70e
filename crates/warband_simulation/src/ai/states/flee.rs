use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::spatial::geometry::direction_from_deg;

pub const FLEE_SPEED_MULTIPLIER: f32 = 1.5;

/// Бегство от последней известной позиции цели.
///
/// Конец: flee_duration истёк или агент дальше leash от spawn → Return.
#[derive(Debug, Default)]
pub struct Flee {
    remaining: f32,
}

impl Tactic for Flee {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        self.remaining = ctx.stats.flee_duration;
        ctx.fear.is_fleeing = true;
        ctx.release_token();
        crate::log(&format!("😱 {:?} flees (fear {:.1})", ctx.entity, ctx.fear.value));
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, _time_in_state: f32) -> Option<StateId> {
        self.remaining -= dt;
        let beyond_leash = ctx.position.distance(ctx.spawn_position) > ctx.stats.leash_range;
        if self.remaining <= 0.0 || beyond_leash {
            return Some(StateId::Return);
        }

        let threat = if ctx.has_target() {
            ctx.target_position()
        } else {
            ctx.spawn_position
        };
        let mut away = ctx.position - threat;
        if away.length_squared() < 0.01 {
            away = direction_from_deg(ctx.random() * 360.0);
        }

        let speed = ctx.body.move_speed() * FLEE_SPEED_MULTIPLIER;
        ctx.move_at_speed(away.normalize_or_zero(), speed);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.fear.is_fleeing = false;
        ctx.stop();
    }
}
