use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;

const SEPARATION_WEIGHT: f32 = 0.5;

/// Преследование до дистанции атаки
#[derive(Debug, Default)]
pub struct Chase;

impl Tactic for Chase {
    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, _time_in_state: f32) -> Option<StateId> {
        if ctx.target_out_of_leash() {
            return Some(StateId::Return);
        }

        if ctx.distance() < ctx.routes.engage_range {
            // Нет свободного токена → кружим вокруг цели
            return Some(if ctx.request_token() {
                ctx.routes.attack
            } else {
                StateId::Orbit
            });
        }

        let direction = ctx.steer(ctx.direction_to_target(), SEPARATION_WEIGHT);
        ctx.move_to(direction);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }
}
