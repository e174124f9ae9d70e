use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;

/// Ближе этого к точке spawn = "дома"
pub const HOME_TOLERANCE: f32 = 0.5;

/// Возврат к spawn. Дома: полное восстановление health/poise.
#[derive(Debug, Default)]
pub struct Return;

impl Tactic for Return {
    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, _time_in_state: f32) -> Option<StateId> {
        // Цель снова в пределах leash → догоняем (за leash не дёргаемся туда-обратно)
        if ctx.has_target() && ctx.distance() <= ctx.stats.leash_range {
            return Some(ctx.routes.pursue);
        }

        let to_home = ctx.spawn_position - ctx.position;
        if to_home.length() <= HOME_TOLERANCE {
            ctx.body.restore_full();
            crate::log(&format!("🏠 {:?} back home, restored", ctx.entity));
            return Some(ctx.routes.rest);
        }

        ctx.move_to(to_home.normalize_or_zero());
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }
}
