//! Vision + faction scan (один 5 Hz цикл).
//!
//! Порядок:
//! 1. Vision: ближайший игрок в sight_range → cone (half-angle) → LOS
//! 2. Faction scan (только если vision пуст): ближайший живой агент чужой фракции с LOS

use bevy::prelude::*;

use super::belief::Perception;
use crate::components::FactionId;
use crate::config::EnemyStats;
use crate::spatial::geometry::angle_between_deg;
use crate::spatial::{has_line_of_sight, QueryShape, SpatialQuery, LAYER_ADVERSARY, LAYER_AGENT};

/// Кто смотрит
#[derive(Debug, Clone, Copy)]
pub struct Observer {
    pub entity: Entity,
    pub position: Vec2,
    pub facing: Vec2,
    pub faction: FactionId,
}

/// Что faction scan знает о другом агенте (None из lookup = не агент / выключен)
#[derive(Debug, Clone, Copy)]
pub struct AgentView {
    pub faction: FactionId,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionOutcome {
    Adversary(Entity),
    Hostile(Entity),
    Nothing,
}

pub fn run_vision_cycle(
    perception: &mut Perception,
    observer: Observer,
    stats: &EnemyStats,
    spatial: &dyn SpatialQuery,
    lookup: impl Fn(Entity) -> Option<AgentView>,
) -> VisionOutcome {
    perception.begin_vision_cycle();

    if let Some(outcome) = look_for_adversary(perception, observer, stats, spatial) {
        return outcome;
    }

    scan_hostile_factions(perception, observer, stats, spatial, lookup)
}

fn look_for_adversary(
    perception: &mut Perception,
    observer: Observer,
    stats: &EnemyStats,
    spatial: &dyn SpatialQuery,
) -> Option<VisionOutcome> {
    let hits = spatial.overlap(
        &QueryShape::Circle {
            radius: stats.sight_range,
        },
        observer.position,
        LAYER_ADVERSARY,
    );
    let target = crate::spatial::nearest(&hits, observer.position)?;

    let to_target = target.position - observer.position;
    if to_target.length_squared() > f32::EPSILON
        && angle_between_deg(observer.facing, to_target) > stats.sight_angle
    {
        return None;
    }

    if !has_line_of_sight(spatial, observer.position, target.position) {
        return None;
    }

    perception.see_adversary(target.entity, target.position, target.facing, stats.memory_duration);
    Some(VisionOutcome::Adversary(target.entity))
}

fn scan_hostile_factions(
    perception: &mut Perception,
    observer: Observer,
    stats: &EnemyStats,
    spatial: &dyn SpatialQuery,
    lookup: impl Fn(Entity) -> Option<AgentView>,
) -> VisionOutcome {
    let hits = spatial.overlap(
        &QueryShape::Circle {
            radius: stats.sight_range,
        },
        observer.position,
        LAYER_AGENT,
    );

    let mut best: Option<(f32, Entity, Vec2)> = None;
    for hit in hits {
        if hit.entity == observer.entity {
            continue;
        }
        let Some(view) = lookup(hit.entity) else {
            continue;
        };
        if view.faction == observer.faction || !view.alive {
            continue;
        }
        if !has_line_of_sight(spatial, observer.position, hit.position) {
            continue;
        }

        let d = observer.position.distance_squared(hit.position);
        if best.map_or(true, |(bd, _, _)| d < bd) {
            best = Some((d, hit.entity, hit.position));
        }
    }

    match best {
        Some((_, entity, position)) => {
            perception.track_hostile(entity, position, stats.memory_duration);
            VisionOutcome::Hostile(entity)
        }
        None => VisionOutcome::Nothing,
    }
}
