//! Реакции на летящий снаряд (ThreatSensor): уклон или блок.

use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::spatial::geometry::direction_from_deg;

#[derive(Debug, Default)]
pub struct Dodge {
    direction: bevy::math::Vec2,
}

impl Tactic for Dodge {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        // Перпендикуляр к линии угрозы, сторона случайная
        let threat = ctx.threat.threat_direction;
        let sign = ctx.random_sign();
        self.direction = if threat.length_squared() > 1e-4 {
            threat.normalize_or_zero().perp() * sign
        } else {
            direction_from_deg(ctx.random() * 360.0)
        };
        crate::log(&format!("💨 {:?} dodges", ctx.entity));
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        if time_in_state >= ctx.stats.dodge_duration {
            return Some(ctx.resume());
        }
        ctx.move_at_speed(self.direction, ctx.stats.dodge_speed);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.stop();
    }
}

#[derive(Debug, Default)]
pub struct Block;

impl Tactic for Block {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.body.set_blocking(true, ctx.stats.block_damage_reduction);
        let threat = ctx.threat.threat_direction;
        ctx.face(threat);
        crate::log(&format!("🛡️ {:?} blocks", ctx.entity));
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, _dt: f32, time_in_state: f32) -> Option<StateId> {
        // Угроза пролетела или время вышло
        if time_in_state >= ctx.stats.block_duration || !ctx.threat.threat_detected {
            return Some(ctx.resume());
        }
        let threat = ctx.threat.threat_direction;
        ctx.face(threat);
        None
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        ctx.body.set_blocking(false, 0.0);
    }
}
