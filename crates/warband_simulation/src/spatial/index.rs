//! Brute-force spatial index.
//!
//! O(n) на запрос. Для арены на несколько десятков агентов этого хватает;
//! host с настоящей физикой подменяет провайдер целиком.

use bevy::prelude::*;

use super::geometry::{angle_between_deg, closest_point_on_aabb, ray_aabb, ray_circle};
use super::{planar, Collider, ColliderShape, QueryShape, RayHit, SpatialEntry, SpatialHit, SpatialProvider, SpatialQuery};
use crate::physics::Motor;

#[derive(Debug, Default, Clone)]
pub struct SpatialIndex {
    entries: Vec<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new(entries: Vec<SpatialEntry>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, entry: SpatialEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Расстояние от точки до поверхности коллайдера (0 если внутри)
fn surface_distance(entry: &SpatialEntry, point: Vec2) -> f32 {
    match entry.shape {
        ColliderShape::Circle { radius } => (entry.position.distance(point) - radius).max(0.0),
        ColliderShape::Aabb { half_extents } => {
            closest_point_on_aabb(point, entry.position, half_extents).distance(point)
        }
    }
}

fn bounding_radius(shape: ColliderShape) -> f32 {
    match shape {
        ColliderShape::Circle { radius } => radius,
        ColliderShape::Aabb { half_extents } => half_extents.length(),
    }
}

fn overlaps(entry: &SpatialEntry, shape: &QueryShape, origin: Vec2) -> bool {
    match *shape {
        QueryShape::Circle { radius } => surface_distance(entry, origin) <= radius,

        QueryShape::Box {
            half_width,
            half_length,
            forward,
        } => {
            let forward = forward.normalize_or_zero();
            if forward == Vec2::ZERO {
                return false;
            }
            let right = Vec2::new(forward.y, -forward.x);
            let local = entry.position - origin;
            let local = Vec2::new(local.dot(right), local.dot(forward));
            let half = Vec2::new(half_width, half_length);
            let closest = closest_point_on_aabb(local, Vec2::ZERO, half);
            closest.distance(local) <= bounding_radius(entry.shape)
        }

        QueryShape::Cone {
            radius,
            forward,
            half_angle,
        } => {
            if surface_distance(entry, origin) > radius {
                return false;
            }
            let to_entry = entry.position - origin;
            if to_entry.length_squared() <= f32::EPSILON {
                return true;
            }
            angle_between_deg(forward, to_entry) <= half_angle
        }
    }
}

impl SpatialQuery for SpatialIndex {
    fn overlap(&self, shape: &QueryShape, origin: Vec2, mask: u32) -> Vec<SpatialHit> {
        self.entries
            .iter()
            .filter(|entry| entry.layer & mask != 0)
            .filter(|entry| overlaps(entry, shape, origin))
            .map(SpatialHit::from)
            .collect()
    }

    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: u32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for entry in self.entries.iter().filter(|e| e.layer & mask != 0) {
            let t = match entry.shape {
                ColliderShape::Circle { radius } => ray_circle(origin, direction, entry.position, radius),
                ColliderShape::Aabb { half_extents } => ray_aabb(origin, direction, entry.position, half_extents),
            };

            let Some(t) = t else { continue };
            if t > max_distance {
                continue;
            }
            if best.map_or(true, |b| t < b.distance) {
                best = Some(RayHit {
                    entity: entry.entity,
                    point: origin + direction * t,
                    distance: t,
                });
            }
        }
        best
    }

    fn refresh(&mut self, entries: &[SpatialEntry]) {
        self.entries.clear();
        self.entries.extend_from_slice(entries);
    }
}

/// Система: снапшот коллайдеров → провайдер (первая в тике)
pub fn sync_spatial_index(
    mut provider: ResMut<SpatialProvider>,
    colliders: Query<(Entity, &Transform, &Collider, Option<&Motor>)>,
) {
    let mut entries: Vec<SpatialEntry> = colliders
        .iter()
        .filter(|(_, _, collider, _)| collider.enabled)
        .map(|(entity, transform, collider, motor)| SpatialEntry {
            entity,
            position: planar(transform),
            velocity: motor.map_or(Vec2::ZERO, |m| m.velocity),
            facing: motor.map_or(Vec2::NEG_Y, |m| m.facing),
            layer: collider.layer,
            shape: collider.shape,
        })
        .collect();

    // Детерминированный порядок (ties в nearest() решаются порядком выдачи)
    entries.sort_by_key(|e| e.entity);

    provider.get_mut().refresh(&entries);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{has_line_of_sight, LAYER_ADVERSARY, LAYER_OBSTACLE};

    fn entry(index: u32, position: Vec2, layer: u32, shape: ColliderShape) -> SpatialEntry {
        SpatialEntry {
            entity: Entity::from_raw(index),
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::NEG_Y,
            layer,
            shape,
        }
    }

    #[test]
    fn test_overlap_filters_by_mask_and_radius() {
        let index = SpatialIndex::new(vec![
            entry(1, Vec2::new(3.0, 0.0), LAYER_ADVERSARY, ColliderShape::Circle { radius: 0.5 }),
            entry(2, Vec2::new(20.0, 0.0), LAYER_ADVERSARY, ColliderShape::Circle { radius: 0.5 }),
            entry(3, Vec2::new(1.0, 0.0), LAYER_OBSTACLE, ColliderShape::Circle { radius: 0.5 }),
        ]);

        let hits = index.overlap(&QueryShape::Circle { radius: 10.0 }, Vec2::ZERO, LAYER_ADVERSARY);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_cone_rejects_targets_behind() {
        let index = SpatialIndex::new(vec![
            entry(1, Vec2::new(2.0, 0.0), LAYER_ADVERSARY, ColliderShape::Circle { radius: 0.1 }),
            entry(2, Vec2::new(-2.0, 0.0), LAYER_ADVERSARY, ColliderShape::Circle { radius: 0.1 }),
        ]);

        let cone = QueryShape::Cone {
            radius: 3.0,
            forward: Vec2::X,
            half_angle: 45.0,
        };
        let hits = index.overlap(&cone, Vec2::ZERO, LAYER_ADVERSARY);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_rotated_box_overlap() {
        let index = SpatialIndex::new(vec![
            entry(1, Vec2::new(0.0, 1.5), LAYER_ADVERSARY, ColliderShape::Circle { radius: 0.1 }),
            entry(2, Vec2::new(1.5, 0.0), LAYER_ADVERSARY, ColliderShape::Circle { radius: 0.1 }),
        ]);

        // Box вытянут вдоль +Y: 0.5 в ширину, 2.0 в длину
        let shape = QueryShape::Box {
            half_width: 0.5,
            half_length: 2.0,
            forward: Vec2::Y,
        };
        let hits = index.overlap(&shape, Vec2::ZERO, LAYER_ADVERSARY);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let index = SpatialIndex::new(vec![entry(
            9,
            Vec2::new(2.5, 0.0),
            LAYER_OBSTACLE,
            ColliderShape::Aabb {
                half_extents: Vec2::new(0.25, 3.0),
            },
        )]);

        assert!(!has_line_of_sight(&index, Vec2::ZERO, Vec2::new(5.0, 0.0)));
        assert!(has_line_of_sight(&index, Vec2::ZERO, Vec2::new(0.0, 5.0)));
        // Цель перед стеной
        assert!(has_line_of_sight(&index, Vec2::ZERO, Vec2::new(2.0, 0.0)));
    }
}
