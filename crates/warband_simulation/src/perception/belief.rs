//! Perception component: target belief + memory.
//!
//! Vision/faction scan (5 Hz) и hearing только *обновляют* belief,
//! decay тикает каждый fixed tick. Вся логика здесь: чистые методы с явным dt,
//! системы в `perception::mod` лишь собирают входные данные из ECS.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum TargetKind {
    #[default]
    None,
    /// Игрок (vision или hearing)
    PrimaryAdversary,
    /// Агент враждебной фракции, отслеживается по `Entity`
    HostileAgent,
}

/// Что decay знает о tracked-цели в этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackedLookup {
    NotTracking,
    /// Entity жив и валиден (generation совпала)
    Alive(Vec2),
    /// Despawned / мёртв / выключен
    Lost,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct TargetBelief {
    pub has_target: bool,
    pub kind: TargetKind,
    pub last_known_position: Vec2,
    /// Weak reference: перед использованием всегда через ECS lookup
    pub tracked: Option<Entity>,
    /// Entity игрока из последнего vision hit (для flank: нужен его facing)
    pub adversary: Option<Entity>,
    pub adversary_facing: Vec2,
    /// +inf если цели нет
    pub distance: f32,
    pub visible: bool,
    pub heard: bool,
    pub memory_timer: f32,
}

impl Default for TargetBelief {
    fn default() -> Self {
        Self {
            has_target: false,
            kind: TargetKind::None,
            last_known_position: Vec2::ZERO,
            tracked: None,
            adversary: None,
            adversary_facing: Vec2::NEG_Y,
            distance: f32::INFINITY,
            visible: false,
            heard: false,
            memory_timer: 0.0,
        }
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub belief: TargetBelief,
    /// 0 = следующий тик делает vision check
    vision_timer: f32,
}

impl Perception {
    pub fn has_target(&self) -> bool {
        self.belief.has_target
    }

    pub fn kind(&self) -> TargetKind {
        self.belief.kind
    }

    pub fn distance(&self) -> f32 {
        self.belief.distance
    }

    pub fn last_known_position(&self) -> Vec2 {
        self.belief.last_known_position
    }

    pub fn is_visible(&self) -> bool {
        self.belief.visible
    }

    pub fn was_heard(&self) -> bool {
        self.belief.heard
    }

    pub fn tracked(&self) -> Option<Entity> {
        self.belief.tracked
    }

    pub fn memory_remaining(&self) -> f32 {
        self.belief.memory_timer
    }

    /// Throttle vision: true раз в `interval` секунд (первый вызов: сразу)
    pub fn tick_vision_timer(&mut self, dt: f32, interval: f32) -> bool {
        self.vision_timer -= dt;
        if self.vision_timer <= 0.0 {
            self.vision_timer = interval;
            true
        } else {
            false
        }
    }

    /// Начало vision-цикла: видимость пересчитывается с нуля
    pub fn begin_vision_cycle(&mut self) {
        self.belief.visible = false;
    }

    /// Vision hit по игроку. Приоритетнее всего остального.
    pub fn see_adversary(&mut self, adversary: Entity, position: Vec2, facing: Vec2, memory_duration: f32) {
        let belief = &mut self.belief;
        belief.has_target = true;
        belief.kind = TargetKind::PrimaryAdversary;
        belief.visible = true;
        belief.heard = false;
        belief.last_known_position = position;
        belief.adversary = Some(adversary);
        belief.adversary_facing = facing;
        belief.tracked = None;
        belief.memory_timer = memory_duration;
    }

    /// Faction scan hit: отслеживаем враждебного агента по Entity
    pub fn track_hostile(&mut self, target: Entity, position: Vec2, memory_duration: f32) {
        let belief = &mut self.belief;
        belief.has_target = true;
        belief.kind = TargetKind::HostileAgent;
        belief.tracked = Some(target);
        belief.last_known_position = position;
        belief.memory_timer = memory_duration;
    }

    /// Выстрел услышан: источник шума становится last-known позицией игрока
    pub fn hear(&mut self, source: Vec2, memory_duration: f32) {
        let belief = &mut self.belief;
        belief.has_target = true;
        belief.kind = TargetKind::PrimaryAdversary;
        belief.tracked = None;
        belief.heard = true;
        belief.last_known_position = source;
        belief.memory_timer = memory_duration;
    }

    /// Memory decay, каждый тик.
    ///
    /// Умершая tracked-цель сбрасывает kind, но не таймер: устаревшая позиция
    /// ещё живёт `memory_timer` секунд для Return/Orbit.
    pub fn decay(&mut self, dt: f32, tracked: TrackedLookup, memory_duration: f32) {
        if !self.belief.has_target {
            return;
        }

        let mut refreshed = self.belief.visible;

        if self.belief.kind == TargetKind::HostileAgent {
            match tracked {
                TrackedLookup::Alive(position) => {
                    self.belief.last_known_position = position;
                    refreshed = true;
                }
                TrackedLookup::Lost | TrackedLookup::NotTracking => {
                    self.belief.kind = TargetKind::None;
                    self.belief.tracked = None;
                }
            }
        }

        if refreshed {
            self.belief.memory_timer = memory_duration;
            return;
        }

        self.belief.memory_timer -= dt;
        if self.belief.memory_timer <= 0.0 {
            self.clear_target();
        }
    }

    pub fn refresh_distance(&mut self, own_position: Vec2) {
        self.belief.distance = if self.belief.has_target {
            own_position.distance(self.belief.last_known_position)
        } else {
            f32::INFINITY
        };
    }

    fn clear_target(&mut self) {
        let belief = &mut self.belief;
        belief.has_target = false;
        belief.kind = TargetKind::None;
        belief.tracked = None;
        belief.adversary = None;
        belief.visible = false;
        belief.heard = false;
        belief.memory_timer = 0.0;
        belief.distance = f32::INFINITY;
    }

    /// Полный сброс (respawn). Идемпотентен.
    pub fn reset(&mut self) {
        self.belief = TargetBelief::default();
        self.vision_timer = 0.0;
    }
}
