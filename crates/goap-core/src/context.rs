use core::fmt;

use crate::{Action, ActionKey, EntityId, Pool, Poolable, TickContext, WorldMut, WorldView};

/// An action bound to a target, with the run-time bookkeeping of one execution.
///
/// This is the unit a plan is made of. Contexts are borrowed from a [`ContextPool`] while a plan
/// is built and given back once the action finishes or the plan is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext<E: EntityId> {
    /// Index of the action in the agent's action list.
    pub action: usize,
    pub key: ActionKey,
    pub target: Option<E>,
    pub is_in_range: bool,
    pub is_done: bool,
    start_time: Option<f64>,
}

pub type ContextPool<E> = Pool<ActionContext<E>>;

impl<E: EntityId> Default for ActionContext<E> {
    fn default() -> Self {
        Self {
            action: 0,
            key: ActionKey::NONE,
            target: None,
            is_in_range: false,
            is_done: false,
            start_time: None,
        }
    }
}

impl<E: EntityId> Poolable for ActionContext<E> {
    fn reset(&mut self) {
        self.init(0, ActionKey::NONE, None);
    }
}

impl<E: EntityId> ActionContext<E> {
    pub fn init(&mut self, action: usize, key: ActionKey, target: Option<E>) {
        self.action = action;
        self.key = key;
        self.target = target;
        self.is_in_range = false;
        self.is_done = false;
        self.start_time = None;
    }

    /// A fresh context from `pool` bound to the same action and target.
    pub fn clone_in(&self, pool: &mut ContextPool<E>) -> Self {
        let mut clone = pool.borrow();
        clone.init(self.action, self.key, self.target);
        clone
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Run `action` for one tick.
    ///
    /// The first call re-checks [`Action::can_do_now`] and starts the work timer. Once more than
    /// the action's work duration has elapsed, [`Action::on_done`] commits the action and the
    /// context is marked done. Returns `false` if the action can no longer proceed.
    pub fn perform<W>(
        &mut self,
        action: &dyn Action<W>,
        agent: E,
        ctx: &TickContext,
        world: &mut W,
    ) -> bool
    where
        W: WorldMut<Entity = E> + 'static,
    {
        let Some(target) = self.target else {
            return false;
        };

        let start = match self.start_time {
            Some(start) => start,
            None => {
                if !action.can_do_now(agent, target, world) {
                    return false;
                }
                self.start_time = Some(ctx.time_seconds);
                ctx.time_seconds
            }
        };

        if ctx.time_seconds - start > action.work_duration() as f64 {
            if !action.on_done(agent, target, world) {
                return false;
            }
            self.is_done = true;
        }
        true
    }

    /// `Name@target`, naming the target through `world`.
    pub fn describe<W>(&self, world: &W) -> String
    where
        W: WorldView<Entity = E>,
    {
        match self.target {
            Some(target) => format!("{}@{}", self.key.0, world.name(target)),
            None => format!("{}@?", self.key.0),
        }
    }
}

impl<E: EntityId> fmt::Display for ActionContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(target) => write!(f, "{}@#{}", self.key.0, target.stable_id()),
            None => write!(f, "{}@?", self.key.0),
        }
    }
}
