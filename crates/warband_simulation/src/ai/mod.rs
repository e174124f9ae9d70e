//! AI decision-making module
//!
//! Hierarchical FSM на агента (`Brain`), графы по архетипам, data-driven правила,
//! общий Director для токенов атаки, страх.

use bevy::prelude::*;

pub mod brain;
pub mod director;
pub mod fear;
pub mod fsm;
pub mod graph;
pub mod rules;
pub mod states;
pub mod systems;

// Re-export основных типов
pub use brain::{Blackboard, Brain, BrainContext, BrainInputs};
pub use director::{install_director, AttackDirector, AttackDirectorPlugin, TokenBroker};
pub use fear::Fear;
pub use fsm::{StateBehavior, StateMachine, StateNode};
pub use graph::{build_state_graph, ArchetypeRoutes};
pub use rules::{evaluate_rules, resolve_rule_target, RuleCondition, RuleSnapshot, TransitionRule};
pub use states::{StateId, TacticalState};

use crate::WarbandSet;

/// AI Plugin
///
/// Порядок выполнения:
/// 1. Sense: пассивный спад страха
/// 2. React: смерти союзников / poise break → страх
/// 3. Decide: tick_brains
/// 4. Cleanup: отобрать токены у мёртвых и выключенных
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, fear::decay_fear.in_set(WarbandSet::Sense))
            .add_systems(FixedUpdate, fear::accumulate_fear.in_set(WarbandSet::React))
            .add_systems(FixedUpdate, systems::tick_brains.in_set(WarbandSet::Decide))
            .add_systems(FixedUpdate, director::reclaim_stale_tokens.in_set(WarbandSet::Cleanup));
    }
}
