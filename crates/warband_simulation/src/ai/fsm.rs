//! Generic hierarchical state machine.
//!
//! Граф состояний строится один раз (Vec<S>), дальше только переключается индекс:
//! никаких аллокаций в тике. Переход *запрашивается* возвратом из `on_tick`
//! и применяется машиной после тика: exit(old) → enter(new) → reset time.
//! `on_enter`/`on_exit` возвращают `()`, так что запросить переход из них нельзя.
//!
//! Вложенность: состояние может держать собственный `StateMachine<Sub>` и тикать
//! его из своего `on_tick` (Engage → Telegraph/Active/Recovery).

use std::fmt;

use crate::logger;

pub trait StateNode {
    type Id: Copy + Eq + fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// `{on_enter, on_tick, on_exit}` над контекстом `C`
pub trait StateBehavior<C>: StateNode {
    fn on_enter(&mut self, ctx: &mut C);

    /// `Some(id)` = запрос перехода (применится после возврата)
    fn on_tick(&mut self, ctx: &mut C, dt: f32, time_in_state: f32) -> Option<Self::Id>;

    fn on_exit(&mut self, ctx: &mut C);
}

pub struct StateMachine<S: StateNode> {
    label: &'static str,
    states: Vec<S>,
    current: Option<usize>,
    time_in_state: f32,
}

impl<S: StateNode + fmt::Debug> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("label", &self.label)
            .field("current", &self.current_id())
            .field("time_in_state", &self.time_in_state)
            .finish()
    }
}

impl<S: StateNode> StateMachine<S> {
    pub fn new(label: &'static str, states: Vec<S>) -> Self {
        Self {
            label,
            states,
            current: None,
            time_in_state: 0.0,
        }
    }

    fn index_of(&self, id: S::Id) -> Option<usize> {
        self.states.iter().position(|s| s.id() == id)
    }

    pub fn contains(&self, id: S::Id) -> bool {
        self.index_of(id).is_some()
    }

    pub fn current_id(&self) -> Option<S::Id> {
        self.current.map(|i| self.states[i].id())
    }

    pub fn is_in(&self, id: S::Id) -> bool {
        self.current_id() == Some(id)
    }

    pub fn current(&self) -> Option<&S> {
        self.current.map(|i| &self.states[i])
    }

    pub fn state(&self, id: S::Id) -> Option<&S> {
        self.index_of(id).map(|i| &self.states[i])
    }

    pub fn state_mut(&mut self, id: S::Id) -> Option<&mut S> {
        self.index_of(id).map(move |i| &mut self.states[i])
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn ids(&self) -> impl Iterator<Item = S::Id> + '_ {
        self.states.iter().map(|s| s.id())
    }

    /// Войти в начальное состояние. Если машина уже работала: сначала exit.
    pub fn initialize<C>(&mut self, id: S::Id, ctx: &mut C) -> bool
    where
        S: StateBehavior<C>,
    {
        let Some(next) = self.index_of(id) else {
            logger::log_error(&format!("{}: initial state {:?} is not in the graph", self.label, id));
            return false;
        };

        if let Some(prev) = self.current.take() {
            self.states[prev].on_exit(ctx);
        }

        self.current = Some(next);
        self.time_in_state = 0.0;
        self.states[next].on_enter(ctx);
        true
    }

    /// Тик активного состояния + применение запрошенного перехода.
    ///
    /// Возвращает id нового состояния, если переход состоялся.
    pub fn tick<C>(&mut self, ctx: &mut C, dt: f32) -> Option<S::Id>
    where
        S: StateBehavior<C>,
    {
        let index = self.current?;
        self.time_in_state += dt;

        let requested = self.states[index].on_tick(ctx, dt, self.time_in_state)?;
        self.transition_to(requested, ctx).then_some(requested)
    }

    /// exit(old) → enter(new). Тот же state или неизвестный id: no-op.
    pub fn transition_to<C>(&mut self, id: S::Id, ctx: &mut C) -> bool
    where
        S: StateBehavior<C>,
    {
        let Some(next) = self.index_of(id) else {
            logger::log_warning(&format!("{}: state {:?} is not available, transition ignored", self.label, id));
            return false;
        };

        if self.current == Some(next) {
            return false;
        }

        if let Some(prev) = self.current {
            self.states[prev].on_exit(ctx);
        }

        self.current = Some(next);
        self.time_in_state = 0.0;
        self.states[next].on_enter(ctx);
        true
    }

    /// Выйти из текущего состояния и остановиться (release / rebuild)
    pub fn shutdown<C>(&mut self, ctx: &mut C)
    where
        S: StateBehavior<C>,
    {
        if let Some(prev) = self.current.take() {
            self.states[prev].on_exit(ctx);
        }
        self.time_in_state = 0.0;
    }
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod fsm_tests;
