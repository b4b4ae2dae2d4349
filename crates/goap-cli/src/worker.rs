use goap_core::{ActionContext, TickContext, WorldGoal, WorldView};
use goap_planner::{GoapAgent, Plan, PlanError};
use tracing::info;

use crate::world::DemoWorld;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub plans_found: u32,
    pub plans_failed: u32,
    pub plans_aborted: u32,
    pub plans_finished: u32,
}

/// A labourer that walks at a fixed speed and always wants the same thing.
#[derive(Debug)]
pub struct Worker {
    goal: WorldGoal<u32>,
    speed: f32,
    pub stats: WorkerStats,
}

impl Worker {
    pub fn new(goal: WorldGoal<u32>, speed: f32) -> Self {
        Self {
            goal,
            speed,
            stats: WorkerStats::default(),
        }
    }
}

impl GoapAgent<DemoWorld> for Worker {
    fn create_goal_state(&mut self, _agent: u32, _world: &DemoWorld) -> WorldGoal<u32> {
        self.goal.clone()
    }

    fn plan_failed(&mut self, _goal: &WorldGoal<u32>, _error: &PlanError) {
        self.stats.plans_failed += 1;
    }

    fn plan_found(&mut self, _goal: &WorldGoal<u32>, _plan: &Plan<u32>) {
        self.stats.plans_found += 1;
    }

    fn actions_finished(&mut self) {
        self.stats.plans_finished += 1;
    }

    fn plan_aborted(&mut self, aborter: &ActionContext<u32>) {
        self.stats.plans_aborted += 1;
        info!(aborter = %aborter, "worker will replan");
    }

    fn move_agent(
        &mut self,
        agent: u32,
        action: &ActionContext<u32>,
        ctx: &TickContext,
        world: &mut DemoWorld,
    ) -> bool {
        let Some(to) = action.target.and_then(|target| world.position(target)) else {
            return false;
        };
        world.move_towards(agent, to, self.speed * ctx.dt_seconds.max(0.0))
    }
}
