//! Per-archetype state graphs.
//!
//! Граф = фиксированный набор состояний + маршруты, по которым общие состояния
//! (Stagger, Dodge, Block, Orbit, PhaseTransition) возвращаются в "родную" логику.

use super::fsm::StateMachine;
use super::states::{StateId, TacticalState};
use crate::components::Archetype;
use crate::config::EnemyStats;

const RUSHER_STATES: &[StateId] = &[
    StateId::Idle,
    StateId::Chase,
    StateId::Engage,
    StateId::Return,
    StateId::Orbit,
    StateId::Flee,
    StateId::Dodge,
    StateId::Block,
    StateId::Stagger,
    StateId::PhaseTransition,
];

const SHOOTER_STATES: &[StateId] = &[
    StateId::Idle,
    StateId::Chase,
    StateId::Shoot,
    StateId::Retreat,
    StateId::Return,
    StateId::Orbit,
    StateId::Flee,
    StateId::Dodge,
    StateId::Block,
    StateId::Stagger,
    StateId::PhaseTransition,
];

const TURRET_STATES: &[StateId] = &[
    StateId::Scan,
    StateId::Lock,
    StateId::Attack,
    StateId::Cooldown,
    StateId::Stagger,
    StateId::PhaseTransition,
];

const STALKER_STATES: &[StateId] = &[
    StateId::Stealth,
    StateId::Flank,
    StateId::Strike,
    StateId::Disengage,
    StateId::Return,
    StateId::Stagger,
    StateId::PhaseTransition,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeRoutes {
    pub initial: StateId,
    /// Нет цели
    pub rest: StateId,
    /// Есть цель, не в радиусе атаки
    pub pursue: StateId,
    /// Атака (под токеном, кроме турели)
    pub attack: StateId,
    /// Дистанция, с которой pursue переходит в attack
    pub engage_range: f32,
    pub states: &'static [StateId],
}

impl ArchetypeRoutes {
    pub fn for_archetype(archetype: Archetype, stats: &EnemyStats) -> Self {
        match archetype {
            Archetype::Rusher => Self {
                initial: StateId::Idle,
                rest: StateId::Idle,
                pursue: StateId::Chase,
                attack: StateId::Engage,
                engage_range: stats.attack_range,
                states: RUSHER_STATES,
            },
            Archetype::Shooter => Self {
                initial: StateId::Idle,
                rest: StateId::Idle,
                pursue: StateId::Chase,
                attack: StateId::Shoot,
                engage_range: stats.preferred_range,
                states: SHOOTER_STATES,
            },
            Archetype::Turret => Self {
                initial: StateId::Scan,
                rest: StateId::Scan,
                pursue: StateId::Lock,
                attack: StateId::Attack,
                engage_range: stats.sight_range,
                states: TURRET_STATES,
            },
            Archetype::Stalker => Self {
                initial: StateId::Stealth,
                rest: StateId::Stealth,
                pursue: StateId::Flank,
                attack: StateId::Strike,
                engage_range: stats.attack_range,
                states: STALKER_STATES,
            },
        }
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.states.contains(&state)
    }
}

/// Построить граф архетипа (один раз на spawn/respawn)
pub fn build_state_graph(archetype: Archetype, stats: &EnemyStats) -> StateMachine<TacticalState> {
    let routes = ArchetypeRoutes::for_archetype(archetype, stats);
    let states = routes.states.iter().map(|id| TacticalState::build(*id)).collect();
    StateMachine::new(archetype.as_str(), states)
}
