//! Spatial Query Provider.
//!
//! Ядро AI не знает, как устроена физика: ему нужны только два вопроса:
//! "кто внутри формы X" и "есть ли препятствие между A и B".
//! Host может подставить свою реализацию (`SpatialProvider::new`), по умолчанию
//! работает `SpatialIndex`: brute-force снапшот коллайдеров, пересобираемый каждый тик.

use bevy::prelude::*;

pub mod geometry;
pub mod index;
pub mod layers;

pub use index::{sync_spatial_index, SpatialIndex};
pub use layers::*;

/// Форма коллайдера для spatial index
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ColliderShape {
    Circle { radius: f32 },
    /// Axis-aligned box (стены)
    Aabb { half_extents: Vec2 },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Circle { radius: 0.5 }
    }
}

/// Коллайдер, видимый spatial index
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Collider {
    /// Один из `LAYER_*`
    pub layer: u32,
    pub shape: ColliderShape,
    /// false после смерти (труп не блокирует и не ловит удары)
    pub enabled: bool,
}

impl Collider {
    pub fn circle(layer: u32, radius: f32) -> Self {
        Self {
            layer,
            shape: ColliderShape::Circle { radius },
            enabled: true,
        }
    }

    pub fn aabb(layer: u32, half_extents: Vec2) -> Self {
        Self {
            layer,
            shape: ColliderShape::Aabb { half_extents },
            enabled: true,
        }
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::circle(LAYER_AGENT, 0.5)
    }
}

/// Форма overlap-запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryShape {
    Circle {
        radius: f32,
    },
    /// Повёрнутый прямоугольник: `forward`: направление локальной оси Y
    Box {
        half_width: f32,
        half_length: f32,
        forward: Vec2,
    },
    /// Circle + angle filter (half-angle, градусы)
    Cone {
        radius: f32,
        forward: Vec2,
        half_angle: f32,
    },
}

/// Снапшот одного коллайдера (то, что провайдер знает о мире)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Vec2,
    pub layer: u32,
    pub shape: ColliderShape,
}

/// Результат overlap-запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialHit {
    pub entity: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Vec2,
    pub layer: u32,
}

impl From<&SpatialEntry> for SpatialHit {
    fn from(entry: &SpatialEntry) -> Self {
        Self {
            entity: entry.entity,
            position: entry.position,
            velocity: entry.velocity,
            facing: entry.facing,
            layer: entry.layer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec2,
    pub distance: f32,
}

pub trait SpatialQuery: Send + Sync + 'static {
    fn overlap(&self, shape: &QueryShape, origin: Vec2, mask: u32) -> Vec<SpatialHit>;

    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: u32) -> Option<RayHit>;

    /// Вызывается в начале тика со свежим снапшотом ECS-коллайдеров.
    /// Провайдеры с собственной физикой могут игнорировать.
    fn refresh(&mut self, _entries: &[SpatialEntry]) {}
}

/// Активный провайдер spatial-запросов
#[derive(Resource)]
pub struct SpatialProvider(Box<dyn SpatialQuery>);

impl SpatialProvider {
    pub fn new(query: impl SpatialQuery) -> Self {
        Self(Box::new(query))
    }

    pub fn get(&self) -> &dyn SpatialQuery {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> &mut dyn SpatialQuery {
        self.0.as_mut()
    }
}

impl Default for SpatialProvider {
    fn default() -> Self {
        Self::new(SpatialIndex::default())
    }
}

/// Line of sight: ничего из `MASK_LINE_OF_SIGHT` не стоит ближе цели
pub fn has_line_of_sight(spatial: &dyn SpatialQuery, from: Vec2, to: Vec2) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return true;
    }

    match spatial.raycast(from, delta / distance, distance, MASK_LINE_OF_SIGHT) {
        Some(hit) => hit.distance >= distance - 0.01,
        None => true,
    }
}

/// Ближайший hit к точке (тай-брейк по порядку выдачи)
pub fn nearest(hits: &[SpatialHit], to: Vec2) -> Option<SpatialHit> {
    let mut best: Option<(f32, SpatialHit)> = None;
    for hit in hits {
        let d = hit.position.distance_squared(to);
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, *hit));
        }
    }
    best.map(|(_, hit)| hit)
}

/// Позиция в плоскости симуляции
#[inline]
pub fn planar(transform: &Transform) -> Vec2 {
    transform.translation.truncate()
}
