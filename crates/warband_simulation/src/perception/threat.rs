//! Threat Sensor: скан летящих в агента снарядов (5 Hz).
//!
//! Результат читает Brain: CanDodge → Dodge, CanBlock → Block.

use bevy::prelude::*;

use crate::spatial::{QueryShape, SpatialQuery, LAYER_PROJECTILE};

/// Снаряды медленнее этого (|v|²) не считаются угрозой
const MIN_THREAT_SPEED_SQ: f32 = 0.1;
/// dot(v̂, to_me) выше порога = летит в нашу сторону
const HEADING_THRESHOLD: f32 = 0.3;

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ThreatSensor {
    pub threat_detected: bool,
    /// От агента к снаряду (откуда летит)
    pub threat_direction: Vec2,
    pub threat_distance: f32,
    pub threat: Option<Entity>,
    scan_timer: f32,
}

impl ThreatSensor {
    pub fn tick_scan_timer(&mut self, dt: f32, interval: f32) -> bool {
        self.scan_timer -= dt;
        if self.scan_timer <= 0.0 {
            self.scan_timer = interval;
            true
        } else {
            false
        }
    }

    /// Пересчитать угрозу с нуля
    pub fn scan(&mut self, position: Vec2, radius: f32, spatial: &dyn SpatialQuery) {
        self.clear();

        let mut nearest = f32::INFINITY;
        for hit in spatial.overlap(&QueryShape::Circle { radius }, position, LAYER_PROJECTILE) {
            if hit.velocity.length_squared() < MIN_THREAT_SPEED_SQ {
                continue;
            }

            let offset = position - hit.position;
            let distance = offset.length();
            let to_me = offset.normalize_or_zero();
            if hit.velocity.normalize_or_zero().dot(to_me) <= HEADING_THRESHOLD {
                continue;
            }

            if distance < nearest {
                nearest = distance;
                self.threat_detected = true;
                self.threat_direction = -to_me;
                self.threat_distance = distance;
                self.threat = Some(hit.entity);
            }
        }
    }

    fn clear(&mut self) {
        self.threat_detected = false;
        self.threat_direction = Vec2::ZERO;
        self.threat_distance = f32::INFINITY;
        self.threat = None;
    }

    pub fn reset(&mut self) {
        self.clear();
        self.scan_timer = 0.0;
    }
}
