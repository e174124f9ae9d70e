//! Brain: per-agent state machine + interrupts.
//!
//! Граф состояний строится лениво (первый тик после spawn/respawn).
//! Порядок внутри тика:
//! 1. forced transition (босс) → PhaseTransition
//! 2. poise break → Stagger (SuperArmor: тихий reset poise)
//! 3. fear ≥ threshold → Flee
//! 4. threat → Dodge / Block
//! 5. tick активного состояния

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::director::TokenBroker;
use super::fear::Fear;
use super::fsm::{StateMachine, StateNode};
use super::graph::{build_state_graph, ArchetypeRoutes};
use super::rules::{evaluate_rules, resolve_rule_target, RuleSnapshot};
use super::states::{StateId, TacticalState};
use crate::combat::{AgentIntent, BossController, CombatBody};
use crate::components::Archetype;
use crate::config::{AttackKind, AttackPattern, CombatAiConfig, EnemyStats, TAG_CAN_BLOCK, TAG_CAN_DODGE, TAG_SUPER_ARMOR};
use crate::perception::{Perception, ThreatSensor};
use crate::physics::{separation_force, Motor, SEPARATION_RADIUS, SEPARATION_STRENGTH};
use crate::spatial::SpatialQuery;

/// Данные, которые делят несколько состояний одного агента
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    /// Атака, выбранная турелью в Lock (исполняется в Attack)
    pub selected_attack: Option<AttackPattern>,
    /// Последняя отправленная host'у прозрачность
    pub alpha: Option<f32>,
}

/// Всё, что система даёт Brain на один тик
pub struct BrainInputs<'a> {
    pub entity: Entity,
    pub archetype: Archetype,
    pub stats: &'a EnemyStats,
    pub config: &'a CombatAiConfig,
    pub position: Vec2,
    pub body: &'a mut CombatBody,
    pub motor: &'a mut Motor,
    pub perception: &'a Perception,
    pub threat: &'a ThreatSensor,
    pub fear: &'a mut Fear,
    pub boss: Option<&'a mut BossController>,
    pub tokens: TokenBroker<'a>,
    pub spatial: &'a dyn SpatialQuery,
    pub rng: &'a mut ChaCha8Rng,
    pub intents: &'a mut Vec<AgentIntent>,
}

/// Контекст, который видят состояния
pub struct BrainContext<'a> {
    pub entity: Entity,
    pub stats: &'a EnemyStats,
    pub config: &'a CombatAiConfig,
    pub routes: ArchetypeRoutes,
    pub position: Vec2,
    pub spawn_position: Vec2,
    pub body: &'a mut CombatBody,
    pub motor: &'a mut Motor,
    pub perception: &'a Perception,
    pub threat: &'a ThreatSensor,
    pub fear: &'a mut Fear,
    pub boss: Option<&'a mut BossController>,
    pub blackboard: &'a mut Blackboard,
    pub tokens: TokenBroker<'a>,
    pub spatial: &'a dyn SpatialQuery,
    pub rng: &'a mut ChaCha8Rng,
    pub intents: &'a mut Vec<AgentIntent>,
}

impl<'a> BrainContext<'a> {
    fn assemble(inputs: BrainInputs<'a>, spawn_position: Vec2, blackboard: &'a mut Blackboard) -> Self {
        let routes = ArchetypeRoutes::for_archetype(inputs.archetype, inputs.stats);
        Self {
            entity: inputs.entity,
            stats: inputs.stats,
            config: inputs.config,
            routes,
            position: inputs.position,
            spawn_position,
            body: inputs.body,
            motor: inputs.motor,
            perception: inputs.perception,
            threat: inputs.threat,
            fear: inputs.fear,
            boss: inputs.boss,
            blackboard,
            tokens: inputs.tokens,
            spatial: inputs.spatial,
            rng: inputs.rng,
            intents: inputs.intents,
        }
    }

    // === Perception ===

    pub fn has_target(&self) -> bool {
        self.perception.has_target()
    }

    pub fn distance(&self) -> f32 {
        self.perception.distance()
    }

    pub fn target_position(&self) -> Vec2 {
        self.perception.last_known_position()
    }

    pub fn direction_to_target(&self) -> Vec2 {
        (self.target_position() - self.position).normalize_or_zero()
    }

    /// Цель потеряна или за leash
    pub fn target_out_of_leash(&self) -> bool {
        !self.has_target() || self.distance() > self.stats.leash_range
    }

    /// Куда возвращаться после прерывания: есть цель → pursue, иначе rest
    pub fn resume(&self) -> StateId {
        if self.has_target() {
            self.routes.pursue
        } else {
            self.routes.rest
        }
    }

    // === Movement ===

    pub fn move_to(&mut self, direction: Vec2) {
        let speed = self.body.move_speed();
        self.motor.move_at_speed(direction, speed);
    }

    pub fn move_at_speed(&mut self, direction: Vec2, speed: f32) {
        self.motor.move_at_speed(direction, speed);
    }

    pub fn stop(&mut self) {
        self.motor.stop();
    }

    /// Повернуться без движения
    pub fn face(&mut self, direction: Vec2) {
        self.motor.face(direction);
        self.motor.stop();
    }

    pub fn face_target(&mut self) {
        if self.has_target() {
            let direction = self.direction_to_target();
            self.face(direction);
        }
    }

    pub fn separation(&self) -> Vec2 {
        separation_force(
            self.spatial,
            self.entity,
            self.position,
            SEPARATION_RADIUS,
            SEPARATION_STRENGTH,
        )
    }

    /// dir + separation × weight, нормированный
    pub fn steer(&self, direction: Vec2, separation_weight: f32) -> Vec2 {
        (direction + self.separation() * separation_weight).normalize_or(direction)
    }

    // === Tokens ===

    pub fn request_token(&mut self) -> bool {
        self.tokens.request(self.entity)
    }

    pub fn release_token(&mut self) {
        self.tokens.release(self.entity);
    }

    pub fn holds_token(&self) -> bool {
        self.tokens.holds(self.entity)
    }

    // === Rules ===

    pub fn rule_snapshot(&self) -> RuleSnapshot {
        RuleSnapshot {
            has_target: self.has_target(),
            distance: self.distance(),
            health: self.body.health(),
            max_health: self.body.max_health(),
            staggered: self.body.is_staggered(),
        }
    }

    /// Переопределение перехода из stat block (приоритетнее логики состояния)
    pub fn rule_override(&self, current: StateId, time_in_state: f32) -> Option<StateId> {
        let rule = evaluate_rules(&self.stats.transition_rules, &self.rule_snapshot(), time_in_state)?;
        resolve_rule_target(rule.target, current, self.routes.states)
    }

    // === Attacks / intents ===

    /// Weighted random среди готовых паттернов, иначе `fallback` из плоских статов
    pub fn pick_attack(&mut self, kinds: &[AttackKind], fallback: fn(&EnemyStats) -> AttackPattern) -> AttackPattern {
        let stats = self.stats;
        self.body.attacks.take(&mut *self.rng, kinds, || fallback(stats))
    }

    pub fn emit(&mut self, intent: AgentIntent) {
        self.intents.push(intent);
    }

    /// SetAlpha только при изменении
    pub fn set_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if self.blackboard.alpha.is_some_and(|a| (a - alpha).abs() < 1e-3) {
            return;
        }
        self.blackboard.alpha = Some(alpha);
        self.emit(AgentIntent::SetAlpha {
            agent: self.entity,
            alpha,
        });
    }

    pub fn random(&mut self) -> f32 {
        use rand::Rng;
        self.rng.gen::<f32>()
    }

    pub fn random_sign(&mut self) -> f32 {
        if self.random() > 0.5 {
            1.0
        } else {
            -1.0
        }
    }
}

#[derive(Component, Debug)]
pub struct Brain {
    machine: Option<StateMachine<TacticalState>>,
    blackboard: Blackboard,
    spawn_position: Vec2,
    needs_rebuild: bool,
    /// Запрошенный извне переход (фаза босса), применяется в начале тика
    forced: Option<StateId>,
    /// В pool: не тикает до respawn
    released: bool,
}

impl Brain {
    pub fn new(spawn_position: Vec2) -> Self {
        Self {
            machine: None,
            blackboard: Blackboard::default(),
            spawn_position,
            needs_rebuild: true,
            forced: None,
            released: false,
        }
    }

    pub fn spawn_position(&self) -> Vec2 {
        self.spawn_position
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.machine.as_ref().and_then(|m| m.current_id())
    }

    pub fn time_in_state(&self) -> f32 {
        self.machine.as_ref().map_or(0.0, |m| m.time_in_state())
    }

    /// "Engage/Telegraph", "Shoot/Firing", ...
    pub fn state_label(&self) -> String {
        let Some(state) = self.machine.as_ref().and_then(|m| m.current()) else {
            return "<none>".to_string();
        };
        match state.sub_label() {
            Some(sub) => format!("{:?}/{}", state.id(), sub),
            None => format!("{:?}", state.id()),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn has_graph(&self) -> bool {
        self.machine.is_some()
    }

    /// Респавн: граф пересоберётся на следующем тике
    pub fn request_rebuild(&mut self, spawn_position: Vec2) {
        self.spawn_position = spawn_position;
        self.needs_rebuild = true;
        self.released = false;
        self.forced = None;
    }

    /// Release hook: граф выбрасывается без exit (токен и флаги чистит сам hook)
    pub fn release(&mut self) {
        self.machine = None;
        self.blackboard = Blackboard::default();
        self.forced = None;
        self.released = true;
    }

    pub fn force_transition(&mut self, state: StateId) {
        self.forced = Some(state);
    }

    /// Один тик решения. Возвращает новое состояние, если был переход.
    pub fn tick(&mut self, inputs: BrainInputs<'_>, dt: f32) -> Option<StateId> {
        if self.released {
            return None;
        }

        let archetype = inputs.archetype;
        let Brain {
            machine,
            blackboard,
            spawn_position,
            needs_rebuild,
            forced,
            ..
        } = self;
        let mut ctx = BrainContext::assemble(inputs, *spawn_position, blackboard);

        if *needs_rebuild || machine.is_none() {
            *needs_rebuild = false;
            ctx.blackboard.selected_attack = None;
            ctx.blackboard.alpha = None;
            let mut graph = build_state_graph(archetype, ctx.stats);
            graph.initialize(ctx.routes.initial, &mut ctx);
            *machine = Some(graph);
            crate::log(&format!(
                "🧠 {:?} ({}) built {} graph, entering {:?}",
                ctx.entity,
                ctx.stats.name,
                archetype.as_str(),
                ctx.routes.initial
            ));
            return Some(ctx.routes.initial);
        }
        let machine = machine.as_mut()?;

        if let Some(target) = forced.take() {
            ctx.release_token();
            return enter(machine, target, &mut ctx, "forced");
        }

        let current = machine.current_id()?;
        let committed = matches!(current, StateId::Stagger | StateId::PhaseTransition);

        // Poise break
        if ctx.body.is_staggered() && !committed {
            if ctx.body.has_tag(TAG_SUPER_ARMOR) || !machine.contains(StateId::Stagger) {
                ctx.body.reset_poise();
            } else {
                ctx.release_token();
                return enter(machine, StateId::Stagger, &mut ctx, "poise broken");
            }
        }

        // Fear
        if !committed
            && current != StateId::Flee
            && machine.contains(StateId::Flee)
            && ctx.fear.should_flee(ctx.stats.fear_threshold)
        {
            ctx.release_token();
            return enter(machine, StateId::Flee, &mut ctx, "fear");
        }

        // Threat
        let evading = matches!(current, StateId::Dodge | StateId::Block | StateId::Flee);
        if ctx.threat.threat_detected && !committed && !evading {
            let reaction = if ctx.body.has_tag(TAG_CAN_DODGE) && machine.contains(StateId::Dodge) {
                Some(StateId::Dodge)
            } else if ctx.body.has_tag(TAG_CAN_BLOCK) && machine.contains(StateId::Block) {
                Some(StateId::Block)
            } else {
                None
            };
            if let Some(reaction) = reaction {
                ctx.release_token();
                return enter(machine, reaction, &mut ctx, "threat");
            }
        }

        let next = machine.tick(&mut ctx, dt)?;
        crate::log(&format!("🧠 {:?} {:?} → {:?}", ctx.entity, current, next));
        Some(next)
    }
}

fn enter(
    machine: &mut StateMachine<TacticalState>,
    target: StateId,
    ctx: &mut BrainContext<'_>,
    reason: &str,
) -> Option<StateId> {
    let from = machine.current_id();
    if !machine.transition_to(target, ctx) {
        return None;
    }
    crate::log(&format!("⚡ {:?} {:?} → {:?} ({})", ctx.entity, from, target, reason));
    Some(target)
}
