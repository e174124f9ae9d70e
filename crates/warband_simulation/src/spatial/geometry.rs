//! 2D геометрия для spatial index и hitbox.
//!
//! Всё в плоскости XY, направления: unit vectors.

use bevy::math::Vec2;

/// Беззнаковый угол между векторами, градусы (0..=180)
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Unit vector из угла (градусы, 0 = +X, против часовой)
pub fn direction_from_deg(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Угол вектора в градусах (atan2)
pub fn deg_of(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

/// Поворот вектора на `degrees` против часовой
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Повернуть `current` к `target` не больше чем на `max_degrees`
pub fn rotate_towards(current: Vec2, target: Vec2, max_degrees: f32) -> Vec2 {
    let target = target.normalize_or_zero();
    if target == Vec2::ZERO {
        return current;
    }
    let current = current.normalize_or_zero();
    if current == Vec2::ZERO {
        return target;
    }

    let angle = angle_between_deg(current, target);
    if angle <= max_degrees {
        return target;
    }

    let sign = if current.perp_dot(target) >= 0.0 { 1.0 } else { -1.0 };
    rotate_deg(current, max_degrees * sign)
}

/// Расстояние вдоль луча до входа в окружность.
///
/// Origin внутри окружности → `Some(0.0)`.
pub fn ray_circle(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let to_origin = origin - center;
    let c = to_origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = to_origin.dot(direction);
    if b > 0.0 {
        // Луч смотрит от окружности
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    Some(-b - discriminant.sqrt())
}

/// Slab test: расстояние вдоль луча до входа в AABB
pub fn ray_aabb(origin: Vec2, direction: Vec2, center: Vec2, half_extents: Vec2) -> Option<f32> {
    let min = center - half_extents;
    let max = center + half_extents;

    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (min[axis] - o) * inv;
        let mut t2 = (max[axis] - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

/// Ближайшая к `point` точка AABB
pub fn closest_point_on_aabb(point: Vec2, center: Vec2, half_extents: Vec2) -> Vec2 {
    point.clamp(center - half_extents, center + half_extents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_between_is_unsigned() {
        assert!((angle_between_deg(Vec2::X, Vec2::Y) - 90.0).abs() < 1e-4);
        assert!((angle_between_deg(Vec2::X, -Vec2::Y) - 90.0).abs() < 1e-4);
        assert!((angle_between_deg(Vec2::X, -Vec2::X) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_ray_circle_hits_front_surface() {
        let t = ray_circle(Vec2::ZERO, Vec2::X, Vec2::new(5.0, 0.0), 1.0);
        assert!((t.unwrap() - 4.0).abs() < 1e-4);

        // Окружность за спиной
        assert!(ray_circle(Vec2::ZERO, Vec2::X, Vec2::new(-5.0, 0.0), 1.0).is_none());
        // Промах сбоку
        assert!(ray_circle(Vec2::ZERO, Vec2::X, Vec2::new(5.0, 3.0), 1.0).is_none());
    }

    #[test]
    fn test_ray_aabb_slab() {
        let t = ray_aabb(Vec2::ZERO, Vec2::X, Vec2::new(3.0, 0.0), Vec2::new(0.5, 2.0));
        assert!((t.unwrap() - 2.5).abs() < 1e-4);

        assert!(ray_aabb(Vec2::ZERO, Vec2::Y, Vec2::new(3.0, 0.0), Vec2::new(0.5, 2.0)).is_none());
    }

    #[test]
    fn test_rotate_towards_clamps_step() {
        let turned = rotate_towards(Vec2::X, Vec2::Y, 45.0);
        assert!((angle_between_deg(turned, Vec2::X) - 45.0).abs() < 1e-3);

        let snapped = rotate_towards(Vec2::X, Vec2::Y, 120.0);
        assert!((snapped - Vec2::Y).length() < 1e-5);
    }
}
