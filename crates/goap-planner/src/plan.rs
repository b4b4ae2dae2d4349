use std::collections::VecDeque;

use goap_core::{ActionContext, ContextPool, EntityId, WorldView};

/// An ordered queue of bound actions, first to execute at the front.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<E: EntityId> {
    pub steps: VecDeque<ActionContext<E>>,
    /// Accumulated edge cost.
    pub cost: f32,
    pub expansions: usize,
}

impl<E: EntityId> Plan<E> {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionContext<E>> + '_ {
        self.steps.iter()
    }

    /// `Name@target-> Name@target-> GOAL`
    pub fn pretty<W>(&self, world: &W) -> String
    where
        W: WorldView<Entity = E>,
    {
        let mut s = String::new();
        for step in self.steps.iter() {
            s.push_str(&step.describe(world));
            s.push_str("-> ");
        }
        s.push_str("GOAL");
        s
    }

    /// Return every context to `pool`.
    pub fn release(self, pool: &mut ContextPool<E>) {
        pool.give_back_all(self.steps);
    }
}
