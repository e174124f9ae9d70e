//! Attack Director: bounded pool of attack tokens.
//!
//! Ограничивает число агентов, одновременно идущих в атаку ("по одному").
//! Отказ: не ошибка: агент уходит в Orbit и кружит вокруг цели.
//!
//! Director это опциональный resource. Без него `TokenBroker` выдаёт токен всем
//! (поведение как до появления Director).

use bevy::prelude::*;

use crate::combat::CombatBody;
use crate::components::AiDisabled;
use crate::logger;

pub const DEFAULT_MAX_ATTACK_TOKENS: usize = 2;
pub const DEFAULT_ORBIT_RADIUS_MULTIPLIER: f32 = 1.5;
/// Градусы/сек
pub const DEFAULT_ORBIT_SPEED: f32 = 90.0;

#[derive(Resource, Debug, Clone)]
pub struct AttackDirector {
    max_tokens: usize,
    pub orbit_radius_multiplier: f32,
    pub orbit_speed: f32,
    /// Порядок выдачи (детерминизм важнее O(1) поиска: N маленький)
    holders: Vec<Entity>,
}

impl Default for AttackDirector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTACK_TOKENS)
    }
}

impl AttackDirector {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens: max_tokens.max(1),
            orbit_radius_multiplier: DEFAULT_ORBIT_RADIUS_MULTIPLIER,
            orbit_speed: DEFAULT_ORBIT_SPEED,
            holders: Vec::with_capacity(max_tokens.max(1)),
        }
    }

    pub fn with_orbit(mut self, radius_multiplier: f32, speed: f32) -> Self {
        self.orbit_radius_multiplier = radius_multiplier;
        self.orbit_speed = speed;
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn held_count(&self) -> usize {
        self.holders.len()
    }

    pub fn holders(&self) -> &[Entity] {
        &self.holders
    }

    /// Уже держит → true; пул полон → false; иначе выдаём
    pub fn request(&mut self, agent: Entity) -> bool {
        if self.holds(agent) {
            return true;
        }
        if self.holders.len() >= self.max_tokens {
            return false;
        }
        self.holders.push(agent);
        true
    }

    /// Идемпотентно. true если токен действительно был возвращён.
    pub fn release(&mut self, agent: Entity) -> bool {
        match self.holders.iter().position(|h| *h == agent) {
            Some(index) => {
                self.holders.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn holds(&self, agent: Entity) -> bool {
        self.holders.contains(&agent)
    }

    /// Выкинуть невалидных держателей. Возвращает число отобранных токенов.
    pub fn reclaim_stale(&mut self, is_valid: impl Fn(Entity) -> bool) -> usize {
        let before = self.holders.len();
        self.holders.retain(|h| is_valid(*h));
        before - self.holders.len()
    }
}

/// Доступ к Director из Brain: явная ветка "Director отсутствует"
pub struct TokenBroker<'a> {
    director: Option<&'a mut AttackDirector>,
}

impl<'a> TokenBroker<'a> {
    pub fn new(director: Option<&'a mut AttackDirector>) -> Self {
        Self { director }
    }

    pub fn is_present(&self) -> bool {
        self.director.is_some()
    }

    pub fn request(&mut self, agent: Entity) -> bool {
        match self.director.as_deref_mut() {
            Some(director) => director.request(agent),
            None => true,
        }
    }

    pub fn release(&mut self, agent: Entity) {
        if let Some(director) = self.director.as_deref_mut() {
            director.release(agent);
        }
    }

    /// Без Director считаем, что атаковать можно всегда
    pub fn holds(&self, agent: Entity) -> bool {
        match self.director.as_deref() {
            Some(director) => director.holds(agent),
            None => true,
        }
    }

    pub fn orbit_radius_multiplier(&self) -> f32 {
        self.director
            .as_deref()
            .map_or(DEFAULT_ORBIT_RADIUS_MULTIPLIER, |d| d.orbit_radius_multiplier)
    }

    pub fn orbit_speed(&self) -> f32 {
        self.director.as_deref().map_or(DEFAULT_ORBIT_SPEED, |d| d.orbit_speed)
    }
}

/// Установить Director в мир.
///
/// Второй экземпляр не заменяет первый: warning и `false`.
pub fn install_director(world: &mut World, director: AttackDirector) -> bool {
    if world.contains_resource::<AttackDirector>() {
        logger::log_warning("AttackDirector: duplicate director ignored, keeping the existing one");
        return false;
    }

    logger::log_info(&format!(
        "AttackDirector: installed ({} tokens, orbit ×{:.2} at {:.0}°/s)",
        director.max_tokens, director.orbit_radius_multiplier, director.orbit_speed
    ));
    world.insert_resource(director);
    true
}

/// Plugin-обёртка над `install_director`
pub struct AttackDirectorPlugin {
    pub director: AttackDirector,
}

impl Default for AttackDirectorPlugin {
    fn default() -> Self {
        Self {
            director: AttackDirector::default(),
        }
    }
}

impl Plugin for AttackDirectorPlugin {
    fn build(&self, app: &mut App) {
        install_director(app.world_mut(), self.director.clone());
    }

    // Несколько экземпляров допустимы: дубликат гасится в install_director
    fn is_unique(&self) -> bool {
        false
    }
}

/// Система (late tick): отобрать токены у мёртвых, выключенных, despawned
pub fn reclaim_stale_tokens(
    director: Option<ResMut<AttackDirector>>,
    bodies: Query<(&CombatBody, Has<AiDisabled>)>,
) {
    let Some(mut director) = director else { return };
    if director.held_count() == 0 {
        return;
    }

    let reclaimed = director.reclaim_stale(|holder| match bodies.get(holder) {
        Ok((body, disabled)) => body.is_alive() && !disabled,
        Err(_) => false,
    });

    if reclaimed > 0 {
        logger::log(&format!(
            "🎟 AttackDirector: reclaimed {} stale token(s), {}/{} held",
            reclaimed,
            director.held_count(),
            director.max_tokens()
        ));
    }
}
