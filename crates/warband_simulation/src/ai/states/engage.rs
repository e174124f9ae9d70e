//! Engage: melee атака под токеном.
//!
//! Внутри: своя машина фаз Telegraph → Active → Recovery (тот же `StateMachine`,
//! что и у Brain). Фаза Recovery по истечении помечает цикл завершённым; дальше
//! решает уже Engage.

use super::{StateId, Tactic};
use crate::ai::brain::BrainContext;
use crate::ai::fsm::{StateBehavior, StateMachine, StateNode};
use crate::combat::AgentIntent;
use crate::config::{AttackKind, AttackPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    Telegraph,
    Active,
    Recovery,
}

impl AttackPhase {
    pub fn label(self) -> &'static str {
        match self {
            AttackPhase::Telegraph => "Telegraph",
            AttackPhase::Active => "Active",
            AttackPhase::Recovery => "Recovery",
        }
    }
}

/// Контекст машины фаз: мозг агента + исполняемая атака
pub struct AttackCycle<'c, 'a> {
    pub brain: &'c mut BrainContext<'a>,
    pub pattern: &'c AttackPattern,
    pub complete: &'c mut bool,
}

impl StateNode for AttackPhase {
    type Id = AttackPhase;

    fn id(&self) -> AttackPhase {
        *self
    }
}

impl<'c, 'a> StateBehavior<AttackCycle<'c, 'a>> for AttackPhase {
    fn on_enter(&mut self, cycle: &mut AttackCycle<'c, 'a>) {
        let brain = &mut *cycle.brain;
        match self {
            AttackPhase::Telegraph => {
                brain.stop();
                brain.face_target();
                let intent = AgentIntent::TelegraphStarted {
                    agent: brain.entity,
                    attack: cycle.pattern.name.clone(),
                    duration: cycle.pattern.telegraph_duration,
                };
                brain.emit(intent);
            }
            AttackPhase::Active => {
                let intent = AgentIntent::MeleeStrike {
                    agent: brain.entity,
                    origin: brain.position,
                    facing: brain.motor.facing,
                    pattern: cycle.pattern.clone(),
                    damage: cycle.pattern.damage * brain.body.damage_multiplier(),
                };
                brain.emit(intent);
            }
            AttackPhase::Recovery => {}
        }
    }

    fn on_tick(&mut self, cycle: &mut AttackCycle<'c, 'a>, _dt: f32, time_in_state: f32) -> Option<AttackPhase> {
        match self {
            AttackPhase::Telegraph => {
                // Довороты к цели только во время замаха
                cycle.brain.face_target();
                (time_in_state >= cycle.pattern.telegraph_duration).then_some(AttackPhase::Active)
            }
            AttackPhase::Active => (time_in_state >= cycle.pattern.active_duration).then_some(AttackPhase::Recovery),
            AttackPhase::Recovery => {
                if time_in_state >= cycle.pattern.recovery_duration {
                    *cycle.complete = true;
                }
                None
            }
        }
    }

    fn on_exit(&mut self, _cycle: &mut AttackCycle<'c, 'a>) {}
}

#[derive(Debug)]
pub struct Engage {
    phases: StateMachine<AttackPhase>,
    pattern: Option<AttackPattern>,
    complete: bool,
    /// Токен не дали при входе (вход по правилу, а не из Chase)
    denied: bool,
}

impl Default for Engage {
    fn default() -> Self {
        Self {
            phases: StateMachine::new(
                "attack",
                vec![AttackPhase::Telegraph, AttackPhase::Active, AttackPhase::Recovery],
            ),
            pattern: None,
            complete: false,
            denied: false,
        }
    }
}

impl Engage {
    pub fn phase(&self) -> Option<AttackPhase> {
        self.phases.current_id()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl Tactic for Engage {
    fn enter(&mut self, ctx: &mut BrainContext<'_>) {
        self.complete = false;
        self.denied = !ctx.request_token();
        if self.denied {
            return;
        }

        let pattern = ctx.pick_attack(&[AttackKind::Melee], AttackPattern::legacy_melee);
        crate::log(&format!("🗡️ {:?} engages with '{}'", ctx.entity, pattern.name));

        let Engage {
            phases,
            pattern: slot,
            complete,
            ..
        } = self;
        let pattern = slot.insert(pattern);
        let mut cycle = AttackCycle {
            brain: ctx,
            pattern,
            complete,
        };
        phases.initialize(AttackPhase::Telegraph, &mut cycle);
    }

    fn tick(&mut self, ctx: &mut BrainContext<'_>, dt: f32, _time_in_state: f32) -> Option<StateId> {
        if self.denied {
            return Some(if ctx.routes.contains(StateId::Orbit) {
                StateId::Orbit
            } else {
                ctx.resume()
            });
        }

        if !self.complete {
            let Engage {
                phases,
                pattern,
                complete,
                ..
            } = self;
            let pattern = pattern.as_ref()?;
            let mut cycle = AttackCycle {
                brain: &mut *ctx,
                pattern,
                complete,
            };
            phases.tick(&mut cycle, dt);
        }

        if !self.complete {
            return None;
        }

        if ctx.has_target() && ctx.distance() < ctx.stats.leash_range {
            Some(ctx.routes.pursue)
        } else {
            Some(StateId::Return)
        }
    }

    fn exit(&mut self, ctx: &mut BrainContext<'_>) {
        if let Some(pattern) = self.pattern.take() {
            let mut complete = self.complete;
            let mut cycle = AttackCycle {
                brain: &mut *ctx,
                pattern: &pattern,
                complete: &mut complete,
            };
            self.phases.shutdown(&mut cycle);
        }
        ctx.release_token();
        self.denied = false;
    }

    /// Атака не прерывается правилами, пока цикл не закончился
    fn consults_rules(&self) -> bool {
        self.complete
    }

    fn sub_label(&self) -> Option<&'static str> {
        self.phase().map(AttackPhase::label)
    }
}
