//! Kinematic движение агентов.
//!
//! Физика (коллизии со стенами, rigidbody): на стороне host. Ядро только
//! выставляет желаемую скорость и facing, здесь же velocity интегрируется в
//! `Transform` для headless-симуляции и тестов.
//!
//! Детерминизм: fixed timestep, порядок агентов фиксирован сортировкой по Entity.

use bevy::prelude::*;

use crate::combat::CombatBody;
use crate::spatial::{planar, SpatialQuery, QueryShape, LAYER_AGENT};

/// Минимальная дистанция между агентами (жёсткое расталкивание)
pub const MIN_AGENT_SPACING: f32 = 0.9;
/// Радиус boids-separation для Chase/Orbit/Flank
pub const SEPARATION_RADIUS: f32 = 1.5;
pub const SEPARATION_STRENGTH: f32 = 2.0;

/// Затухание knockback-импульса (доля в секунду)
const KNOCKBACK_DAMPING: f32 = 8.0;

/// Желаемое движение агента (или любого движущегося объекта: снаряды, игрок)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Motor {
    /// Скорость (units/s), выставляется Brain каждый тик
    pub velocity: Vec2,
    /// Unit vector, по умолчанию "вниз" (top-down камера)
    pub facing: Vec2,
    /// Knockback от урона, затухает сам
    pub knockback: Vec2,
}

impl Default for Motor {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            facing: Vec2::NEG_Y,
            knockback: Vec2::ZERO,
        }
    }
}

impl Motor {
    pub fn with_facing(facing: Vec2) -> Self {
        Self {
            facing: facing.normalize_or(Vec2::NEG_Y),
            ..Default::default()
        }
    }

    /// velocity = dir × speed, facing следует за направлением
    pub fn move_at_speed(&mut self, direction: Vec2, speed: f32) {
        let direction = direction.normalize_or_zero();
        self.velocity = direction * speed;
        if direction != Vec2::ZERO {
            self.facing = direction;
        }
    }

    pub fn face(&mut self, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.facing = direction;
        }
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Полная остановка (смерть): гасим и knockback
    pub fn halt(&mut self) {
        self.velocity = Vec2::ZERO;
        self.knockback = Vec2::ZERO;
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.knockback += impulse;
    }
}

/// Boids separation: inverse-distance сумма "от соседей", нормированная до `strength`.
///
/// Полное совпадение позиций → детерминированное направление по индексу entity.
pub fn separation_force(
    spatial: &dyn SpatialQuery,
    me: Entity,
    position: Vec2,
    radius: f32,
    strength: f32,
) -> Vec2 {
    let mut separation = Vec2::ZERO;
    let mut neighbors = 0;

    for hit in spatial.overlap(&QueryShape::Circle { radius }, position, LAYER_AGENT) {
        if hit.entity == me {
            continue;
        }

        let mut away = position - hit.position;
        let mut dist = away.length();
        if dist < 0.01 {
            away = tie_break_direction(me);
            dist = 0.01;
        }

        separation += away.normalize_or_zero() / dist;
        neighbors += 1;
    }

    if neighbors > 0 {
        separation.normalize_or_zero() * strength
    } else {
        Vec2::ZERO
    }
}

fn tie_break_direction(entity: Entity) -> Vec2 {
    // Золотой угол: соседние индексы расходятся в разные стороны
    let angle = entity.index() as f32 * 2.399_963;
    Vec2::new(angle.cos(), angle.sin())
}

/// Система: velocity + knockback → Transform
pub fn integrate_motion(mut query: Query<(&mut Transform, &mut Motor)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    for (mut transform, mut motor) in query.iter_mut() {
        let step = (motor.velocity + motor.knockback) * delta;
        transform.translation.x += step.x;
        transform.translation.y += step.y;

        let damping = (1.0 - KNOCKBACK_DAMPING * delta).max(0.0);
        motor.knockback *= damping;
        if motor.knockback.length_squared() < 1e-4 {
            motor.knockback = Vec2::ZERO;
        }
    }
}

/// Система: жёсткое расталкивание живых агентов ближе `MIN_AGENT_SPACING`.
///
/// Каждый из пары сдвигается на половину перекрытия.
pub fn resolve_agent_overlap(mut agents: Query<(Entity, &mut Transform, &CombatBody)>) {
    let mut positions: Vec<(Entity, Vec2)> = agents
        .iter()
        .filter(|(_, _, body)| body.is_alive())
        .map(|(entity, transform, _)| (entity, planar(transform)))
        .collect();
    positions.sort_by_key(|(entity, _)| *entity);

    let mut pushes: Vec<(Entity, Vec2)> = Vec::new();
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let (a, pa) = positions[i];
            let (b, pb) = positions[j];

            let mut away = pa - pb;
            let mut dist = away.length();
            if dist >= MIN_AGENT_SPACING {
                continue;
            }
            if dist < 0.01 {
                away = tie_break_direction(a);
                dist = 0.01;
            }

            let push = away.normalize_or_zero() * ((MIN_AGENT_SPACING - dist) * 0.5);
            pushes.push((a, push));
            pushes.push((b, -push));
        }
    }

    for (entity, push) in pushes {
        if let Ok((_, mut transform, _)) = agents.get_mut(entity) {
            transform.translation.x += push.x;
            transform.translation.y += push.y;
        }
    }
}
