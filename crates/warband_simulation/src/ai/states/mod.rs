//! Tactical states.
//!
//! Закрытый набор: `TacticalState` это enum, каждый вариант это отдельная структура
//! со своими таймерами. Граф архетипа (`ai::graph`) строит нужное подмножество.
//!
//! Правила из stat block (`ai::rules`) проверяются до логики состояния,
//! кроме committed состояний (Stagger, PhaseTransition) и Engage до конца цикла атаки.

use serde::{Deserialize, Serialize};

use super::brain::BrainContext;
use super::fsm::{StateBehavior, StateNode};

pub mod chase;
pub mod engage;
pub mod evade;
pub mod flee;
pub mod idle;
pub mod orbit;
pub mod ranged;
pub mod return_home;
pub mod stagger;
pub mod stalker;
pub mod turret;

pub use chase::Chase;
pub use engage::{AttackPhase, Engage};
pub use evade::{Block, Dodge};
pub use flee::Flee;
pub use idle::Idle;
pub use orbit::Orbit;
pub use ranged::{Retreat, Shoot};
pub use return_home::Return;
pub use stagger::{PhaseTransition, Stagger};
pub use stalker::{Disengage, Flank, Stealth, Strike};
pub use turret::{Cooldown, Lock, Scan, TurretAttack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateId {
    Idle,
    Chase,
    Engage,
    Return,
    Stagger,
    Orbit,
    Flee,
    Dodge,
    Block,
    Retreat,
    Shoot,
    Scan,
    Lock,
    Attack,
    Cooldown,
    Stealth,
    Flank,
    Strike,
    Disengage,
    PhaseTransition,
}

/// Поведение одного тактического состояния
pub trait Tactic {
    fn enter(&mut self, _ctx: &mut BrainContext<'_>) {}

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, time_in_state: f32) -> Option<StateId>;

    fn exit(&mut self, _ctx: &mut BrainContext<'_>) {}

    /// false = правила stat block сейчас не могут прервать состояние
    fn consults_rules(&self) -> bool {
        true
    }

    /// Под-состояние для debug ("Telegraph", "Firing", ...)
    fn sub_label(&self) -> Option<&'static str> {
        None
    }
}

#[derive(Debug)]
pub enum TacticalState {
    Idle(Idle),
    Chase(Chase),
    Engage(Engage),
    Return(Return),
    Stagger(Stagger),
    Orbit(Orbit),
    Flee(Flee),
    Dodge(Dodge),
    Block(Block),
    Retreat(Retreat),
    Shoot(Shoot),
    Scan(Scan),
    Lock(Lock),
    Attack(TurretAttack),
    Cooldown(Cooldown),
    Stealth(Stealth),
    Flank(Flank),
    Strike(Strike),
    Disengage(Disengage),
    PhaseTransition(PhaseTransition),
}

macro_rules! dispatch {
    ($state:expr, $inner:ident => $body:expr) => {
        match $state {
            TacticalState::Idle($inner) => $body,
            TacticalState::Chase($inner) => $body,
            TacticalState::Engage($inner) => $body,
            TacticalState::Return($inner) => $body,
            TacticalState::Stagger($inner) => $body,
            TacticalState::Orbit($inner) => $body,
            TacticalState::Flee($inner) => $body,
            TacticalState::Dodge($inner) => $body,
            TacticalState::Block($inner) => $body,
            TacticalState::Retreat($inner) => $body,
            TacticalState::Shoot($inner) => $body,
            TacticalState::Scan($inner) => $body,
            TacticalState::Lock($inner) => $body,
            TacticalState::Attack($inner) => $body,
            TacticalState::Cooldown($inner) => $body,
            TacticalState::Stealth($inner) => $body,
            TacticalState::Flank($inner) => $body,
            TacticalState::Strike($inner) => $body,
            TacticalState::Disengage($inner) => $body,
            TacticalState::PhaseTransition($inner) => $body,
        }
    };
}

impl TacticalState {
    pub fn build(id: StateId) -> Self {
        match id {
            StateId::Idle => Self::Idle(Idle),
            StateId::Chase => Self::Chase(Chase),
            StateId::Engage => Self::Engage(Engage::default()),
            StateId::Return => Self::Return(Return),
            StateId::Stagger => Self::Stagger(Stagger),
            StateId::Orbit => Self::Orbit(Orbit::default()),
            StateId::Flee => Self::Flee(Flee::default()),
            StateId::Dodge => Self::Dodge(Dodge::default()),
            StateId::Block => Self::Block(Block),
            StateId::Retreat => Self::Retreat(Retreat),
            StateId::Shoot => Self::Shoot(Shoot::default()),
            StateId::Scan => Self::Scan(Scan::default()),
            StateId::Lock => Self::Lock(Lock),
            StateId::Attack => Self::Attack(TurretAttack::default()),
            StateId::Cooldown => Self::Cooldown(Cooldown),
            StateId::Stealth => Self::Stealth(Stealth),
            StateId::Flank => Self::Flank(Flank::default()),
            StateId::Strike => Self::Strike(Strike::default()),
            StateId::Disengage => Self::Disengage(Disengage::default()),
            StateId::PhaseTransition => Self::PhaseTransition(PhaseTransition),
        }
    }

    pub fn sub_label(&self) -> Option<&'static str> {
        dispatch!(self, state => state.sub_label())
    }
}

impl StateNode for TacticalState {
    type Id = StateId;

    fn id(&self) -> StateId {
        match self {
            TacticalState::Idle(_) => StateId::Idle,
            TacticalState::Chase(_) => StateId::Chase,
            TacticalState::Engage(_) => StateId::Engage,
            TacticalState::Return(_) => StateId::Return,
            TacticalState::Stagger(_) => StateId::Stagger,
            TacticalState::Orbit(_) => StateId::Orbit,
            TacticalState::Flee(_) => StateId::Flee,
            TacticalState::Dodge(_) => StateId::Dodge,
            TacticalState::Block(_) => StateId::Block,
            TacticalState::Retreat(_) => StateId::Retreat,
            TacticalState::Shoot(_) => StateId::Shoot,
            TacticalState::Scan(_) => StateId::Scan,
            TacticalState::Lock(_) => StateId::Lock,
            TacticalState::Attack(_) => StateId::Attack,
            TacticalState::Cooldown(_) => StateId::Cooldown,
            TacticalState::Stealth(_) => StateId::Stealth,
            TacticalState::Flank(_) => StateId::Flank,
            TacticalState::Strike(_) => StateId::Strike,
            TacticalState::Disengage(_) => StateId::Disengage,
            TacticalState::PhaseTransition(_) => StateId::PhaseTransition,
        }
    }
}

impl<'a> StateBehavior<BrainContext<'a>> for TacticalState {
    fn on_enter(&mut self, ctx: &mut BrainContext<'a>) {
        dispatch!(self, state => state.enter(ctx))
    }

    fn on_tick(&mut self, ctx: &mut BrainContext<'a>, dt: f32, time_in_state: f32) -> Option<StateId> {
        let id = self.id();
        let consults_rules = dispatch!(&*self, state => state.consults_rules());
        if consults_rules {
            if let Some(next) = ctx.rule_override(id, time_in_state) {
                return Some(next);
            }
        }
        dispatch!(self, state => state.tick(ctx, dt, time_in_state))
    }

    fn on_exit(&mut self, ctx: &mut BrainContext<'a>) {
        dispatch!(self, state => state.exit(ctx))
    }
}
