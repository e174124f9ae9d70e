//! Committed состояния: правила и прерывания их не трогают.

use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;

/// Poise сломан: стоим stagger_duration
#[derive(Debug, Default)]
pub struct Stagger;

impl Tactic for Stagger {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        if time_in_state < ctx.stats.stagger_duration {
            return None;
        }
        Some(ctx.resume())
    }

    /// Poise восстанавливается при любом выходе (таймер или смена фазы босса)
    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.body.reset_poise();
    }

    fn consults_rules(&self) -> bool {
        false
    }
}

/// Смена фазы босса: неуязвим, стоит transition_duration фазы
#[derive(Debug, Default)]
pub struct PhaseTransition;

impl Tactic for PhaseTransition {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        let duration = ctx.boss.as_deref().map_or(0.0, |boss| boss.transition_duration());
        if time_in_state < duration {
            return None;
        }
        Some(ctx.resume())
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        // Идемпотентно: повторный вызов просто ещё раз снимает неуязвимость
        if let Some(boss) = ctx.boss.as_deref_mut() {
            boss.end_transition(ctx.body);
        }
    }

    fn consults_rules(&self) -> bool {
        false
    }
}
