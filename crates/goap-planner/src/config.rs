#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use goap_core::FactKey;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Maximum number of live frontier nodes. Hitting it fails the search.
    pub max_nodes: usize,
    /// Maximum number of node expansions per search.
    pub max_expansions: usize,
    /// Add each action's work duration to its edge cost.
    pub include_work_duration: bool,
    pub position_x: FactKey,
    pub position_y: FactKey,
    /// After an in-range action the successor state places the agent at the target.
    pub update_agent_position: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_nodes: 5000,
            max_expansions: 20_000,
            include_work_duration: true,
            position_x: FactKey::Borrowed("x"),
            position_y: FactKey::Borrowed("y"),
            update_agent_position: true,
        }
    }
}

impl PlannerConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrainConfig {
    pub planner: PlannerConfig,
    /// Action contexts preallocated for plans.
    pub context_pool_capacity: usize,
    /// Contexts added whenever the pool runs dry.
    pub context_pool_growth: usize,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            context_pool_capacity: 100,
            context_pool_growth: 25,
        }
    }
}
