//! Forward A* planning over world states and the stack-FSM loop that executes the plans.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod brain;
pub mod config;
pub mod error;
pub mod fsm;
pub mod node;
pub mod plan;
pub mod planner;

pub use brain::{GoapAgent, GoapBrain};
pub use config::{BrainConfig, PlannerConfig};
pub use error::PlanError;
pub use fsm::{AgentState, StackFsm, Transition};
pub use node::{Node, NodeArena, NodeId, Step};
pub use plan::Plan;
pub use planner::{GoapPlanner, Heuristic, PlanRequest};
