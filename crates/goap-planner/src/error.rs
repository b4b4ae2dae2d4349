use goap_core::ValueError;
use thiserror::Error;

/// Why a planning call produced no plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no plan reaches the goal ({expansions} expansions)")]
    NoPlan { expansions: usize },

    #[error("search budget exhausted after {expansions} expansions with {frontier} frontier nodes")]
    BudgetExhausted { expansions: usize, frontier: usize },

    #[error("agent #{agent} state lacks position facts `{x}`/`{y}`")]
    MissingPosition { agent: u64, x: String, y: String },

    #[error("action {action} has an effect that does not fit the state: {source}")]
    InvalidEffect {
        action: &'static str,
        #[source]
        source: ValueError,
    },
}

impl PlanError {
    /// Fatal errors are setup defects; the others are ordinary planning outcomes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlanError::MissingPosition { .. } | PlanError::InvalidEffect { .. }
        )
    }
}
