use core::fmt::Debug;
use core::hash::Hash;

use crate::{ActionDef, ActionKey, State, Vec2};

/// Stable identifier for anything that carries state: agents, piles, doors.
///
/// Planning is deterministic only if entities have a stable ordering (`Ord`) and a stable numeric
/// id (`stable_id`) for logs and traces.
pub trait EntityId: Copy + Ord + Eq + Hash + Debug {
    fn stable_id(self) -> u64;
}

impl EntityId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}

impl EntityId for u32 {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

impl EntityId for usize {
    fn stable_id(self) -> u64 {
        self as u64
    }
}

/// Read-only world access used by the planner.
pub trait WorldView {
    type Entity: EntityId;

    /// Ground-truth state of `entity`, or `None` if it does not exist.
    fn state(&self, entity: Self::Entity) -> Option<State>;

    /// State as the planning agent believes it to be. Unsearched containers may report
    /// optimistic contents here.
    fn perceived_state(&self, entity: Self::Entity) -> Option<State> {
        self.state(entity)
    }

    /// Planar position used for travel costs and arrival checks. Reads the `x`/`y` facts by
    /// default.
    fn position(&self, entity: Self::Entity) -> Option<Vec2> {
        self.state(entity).and_then(|state| Vec2::from_state(&state))
    }

    fn name(&self, entity: Self::Entity) -> String {
        format!("#{}", entity.stable_id())
    }

    /// Action owned by `target` that fires back onto the agent whenever the action `key` is
    /// performed on `target`.
    ///
    /// The returned definition is read from the target's point of view: its own preconditions
    /// and effects apply to `target`, its target preconditions and effects apply to the agent.
    fn triggered_action(&self, _target: Self::Entity, _key: ActionKey) -> Option<&ActionDef> {
        None
    }
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
