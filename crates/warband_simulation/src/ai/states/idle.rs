use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;

/// Стоит на месте, ждёт цель
#[derive(Debug, Default)]
pub struct Idle;

impl Tactic for Idle {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, _time_in_state: f32) -> Option<StateId> {
        ctx.has_target().then_some(ctx.routes.pursue)
    }
}
