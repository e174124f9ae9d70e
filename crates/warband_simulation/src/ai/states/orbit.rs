use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::spatial::geometry::{deg_of, direction_from_deg};

const SEPARATION_WEIGHT: f32 = 0.5;

/// Ждём токен, кружа вокруг цели на attack_range × orbit multiplier
#[derive(Debug, Default)]
pub struct Orbit {
    /// Угол на окружности вокруг цели (градусы)
    angle: f32,
    /// +1 против часовой, -1 по часовой
    direction: f32,
    retry_timer: f32,
}

impl Tactic for Orbit {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        self.direction = ctx.random_sign();
        self.angle = deg_of(ctx.position - ctx.target_position());
        self.retry_timer = ctx.config.orbit_token_retry;
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, _time_in_state: f32) -> Option<StateId> {
        if ctx.target_out_of_leash() {
            ctx.release_token();
            return Some(StateId::Return);
        }

        self.retry_timer -= dt;
        if self.retry_timer <= 0.0 {
            self.retry_timer = ctx.config.orbit_token_retry;
            if ctx.request_token() {
                return Some(ctx.routes.attack);
            }
        }

        let radius = ctx.stats.attack_range * ctx.tokens.orbit_radius_multiplier();
        self.angle += self.direction * ctx.tokens.orbit_speed() * dt;
        let slot = ctx.target_position() + direction_from_deg(self.angle) * radius;

        let direction = ctx.steer((slot - ctx.position).normalize_or_zero(), SEPARATION_WEIGHT);
        ctx.move_to(direction);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }

    fn sub_label(&self) -> Option<&'static str> {
        Some(if self.direction >= 0.0 { "Ccw" } else { "Cw" })
    }
}
