//! State model, action abstraction and pooling primitives for goal-oriented action planning.
//!
//! The planner and the agent loop live in `goap-planner`; this crate only defines the data they
//! operate on and the contracts the embedding application implements.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod context;
pub mod math;
pub mod pool;
pub mod regress;
pub mod state;
pub mod tick;
pub mod value;
pub mod world;

pub use action::{Action, ActionDef, ActionKey};
pub use context::{ActionContext, ContextPool};
pub use math::Vec2;
pub use pool::{Pool, Poolable};
pub use regress::{
    condition_distance, is_goal_closer, is_world_goal_closer, progress_condition, progress_goal,
    progress_world_goal, regress_condition, regress_goal, regress_world_goal,
};
pub use state::{
    do_conditions_apply, do_conditions_apply_to_world, Effects, FactKey, Goal, State,
    WorldEffects, WorldGoal, WorldState,
};
pub use tick::TickContext;
pub use value::{
    apply_effect, check_condition, CompareType, Condition, Effect, ModificationType, Value,
    ValueError,
};
pub use world::{EntityId, WorldMut, WorldView};
