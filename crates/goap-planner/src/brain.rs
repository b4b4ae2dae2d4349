use std::collections::VecDeque;

use goap_core::{Action, ActionContext, ContextPool, EntityId, TickContext, WorldGoal, WorldMut};
use goap_tools::{TraceEvent, TraceKind, Tracer};
use tracing::{debug, info, warn};

use crate::{
    AgentState, BrainConfig, GoapPlanner, Plan, PlanError, PlanRequest, StackFsm, Transition,
};

/// The domain side of an agent: what it wants and how it reacts to planning outcomes.
pub trait GoapAgent<W>
where
    W: WorldMut + 'static,
{
    /// The goal to plan for next.
    fn create_goal_state(&mut self, agent: W::Entity, world: &W) -> WorldGoal<W::Entity>;

    /// No plan was found. Can be used to pick another goal next time.
    fn plan_failed(&mut self, _goal: &WorldGoal<W::Entity>, _error: &PlanError) {}

    fn plan_found(&mut self, _goal: &WorldGoal<W::Entity>, _plan: &Plan<W::Entity>) {}

    /// Every queued action completed.
    fn actions_finished(&mut self) {}

    /// `aborter` failed and the rest of the plan was dropped.
    fn plan_aborted(&mut self, _aborter: &ActionContext<W::Entity>) {}

    /// Move the agent toward the target of `action`. Returns `true` once it has arrived.
    fn move_agent(
        &mut self,
        agent: W::Entity,
        action: &ActionContext<W::Entity>,
        ctx: &TickContext,
        world: &mut W,
    ) -> bool;
}

/// Drives one agent through Idle -> PerformAction -> MoveTo, planning whenever it is idle.
///
/// The brain owns the action queue and the context pool the queue is drawn from; contexts go back
/// to the pool when an action completes, when a plan is aborted, and when a new plan replaces the
/// old one.
pub struct GoapBrain<W, A>
where
    W: WorldMut + 'static,
    A: GoapAgent<W>,
{
    pub agent: W::Entity,
    pub behavior: A,
    actions: Vec<Box<dyn Action<W>>>,
    planner: GoapPlanner<W>,
    pool: ContextPool<W::Entity>,
    queue: VecDeque<ActionContext<W::Entity>>,
    fsm: StackFsm<AgentState>,
    tracer: Tracer,
    plan_calls: u64,
}

impl<W, A> GoapBrain<W, A>
where
    W: WorldMut + 'static,
    A: GoapAgent<W>,
{
    pub fn new(
        agent: W::Entity,
        actions: Vec<Box<dyn Action<W>>>,
        behavior: A,
        config: BrainConfig,
    ) -> Self {
        Self {
            agent,
            behavior,
            actions,
            planner: GoapPlanner::new().with_config(config.planner),
            pool: ContextPool::with_capacity(
                config.context_pool_capacity,
                config.context_pool_growth,
            ),
            queue: VecDeque::new(),
            fsm: StackFsm::new(AgentState::Idle),
            tracer: Tracer::new(),
            plan_calls: 0,
        }
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn state(&self) -> AgentState {
        self.fsm.current().unwrap_or(AgentState::Idle)
    }

    pub fn queue(&self) -> &VecDeque<ActionContext<W::Entity>> {
        &self.queue
    }

    pub fn actions(&self) -> &[Box<dyn Action<W>>] {
        &self.actions
    }

    pub fn pool(&self) -> &ContextPool<W::Entity> {
        &self.pool
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    pub fn plan_calls(&self) -> u64 {
        self.plan_calls
    }

    /// `Name@target-> ... GOAL` for the remaining queue.
    pub fn describe_queue(&self, world: &W) -> String {
        let mut s = String::new();
        for step in self.queue.iter() {
            s.push_str(&step.describe(world));
            s.push_str("-> ");
        }
        s.push_str("GOAL");
        s
    }

    /// Drop the current plan and plan again on the next tick.
    pub fn abort_plan(&mut self) {
        self.release_queue();
        self.fsm.reset(AgentState::Idle);
    }

    /// Run the active state once.
    ///
    /// Only setup defects surface as errors; failing to find a plan is reported through
    /// [`GoapAgent::plan_failed`] and the agent stays idle.
    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) -> Result<AgentState, PlanError> {
        let transition = match self.state() {
            AgentState::Idle => self.idle(ctx, world)?,
            AgentState::PerformAction => self.perform_action(ctx, world),
            AgentState::MoveTo => self.move_to(ctx, world),
        };
        self.fsm.apply(transition);
        Ok(self.state())
    }

    fn idle(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
    ) -> Result<Transition<AgentState>, PlanError> {
        let goal = self.behavior.create_goal_state(self.agent, world);
        self.plan_calls += 1;
        self.tracer
            .emit(TraceEvent::of(ctx.tick, TraceKind::PlanCall).with_agent(self.agent));

        let request = PlanRequest {
            agent: self.agent,
            actions: &self.actions,
            goal: &goal,
        };
        match self.planner.plan(request, world, &mut self.pool) {
            Ok(plan) => {
                self.release_queue();
                info!(
                    agent = %world.name(self.agent),
                    plan = %plan.pretty(world),
                    cost = plan.cost,
                    "GOAP plan found"
                );
                self.tracer.emit(
                    TraceEvent::of(ctx.tick, TraceKind::PlanFound)
                        .with_agent(self.agent)
                        .with_b(plan.len() as u64),
                );
                self.behavior.plan_found(&goal, &plan);
                self.queue = plan.steps;
                Ok(Transition::Replace(AgentState::PerformAction))
            }
            Err(err) if err.is_fatal() => {
                warn!(agent = %world.name(self.agent), error = %err, "GOAP planning setup error");
                Err(err)
            }
            Err(err) => {
                warn!(
                    agent = %world.name(self.agent),
                    goal = %goal,
                    error = %err,
                    "GOAP plan failed"
                );
                self.tracer
                    .emit(TraceEvent::of(ctx.tick, TraceKind::PlanFailed).with_agent(self.agent));
                self.behavior.plan_failed(&goal, &err);
                Ok(Transition::Stay)
            }
        }
    }

    fn perform_action(&mut self, ctx: &TickContext, world: &mut W) -> Transition<AgentState> {
        if self.queue.front().is_some_and(|head| head.is_done) {
            if let Some(done) = self.queue.pop_front() {
                debug!(agent = %world.name(self.agent), action = done.key.0, "GOAP action done");
                let mut event = TraceEvent::of(ctx.tick, TraceKind::ActionDone)
                    .with_agent(self.agent)
                    .with_label(done.key.0);
                if let Some(target) = done.target {
                    event = event.with_target(target);
                }
                self.tracer.emit(event);
                self.pool.give_back(done);
            }
        }

        let Some(head) = self.queue.front_mut() else {
            info!(agent = %world.name(self.agent), "GOAP actions finished");
            self.tracer.emit(
                TraceEvent::of(ctx.tick, TraceKind::ActionsFinished).with_agent(self.agent),
            );
            self.behavior.actions_finished();
            return Transition::Replace(AgentState::Idle);
        };

        let running = match self.actions.get(head.action) {
            Some(action) => {
                if action.requires_in_range() && !head.is_in_range {
                    return Transition::Push(AgentState::MoveTo);
                }
                head.perform(action.as_ref(), self.agent, ctx, world)
            }
            None => false,
        };

        if running {
            Transition::Stay
        } else {
            self.abort(ctx, world);
            Transition::Replace(AgentState::Idle)
        }
    }

    fn move_to(&mut self, ctx: &TickContext, world: &mut W) -> Transition<AgentState> {
        let Some(head) = self.queue.front() else {
            return Transition::Pop;
        };

        let requires_in_range = self
            .actions
            .get(head.action)
            .is_some_and(|action| action.requires_in_range());
        let resolvable = head
            .target
            .is_some_and(|target| world.position(target).is_some());
        if requires_in_range && !resolvable {
            warn!(
                agent = %world.name(self.agent),
                action = head.key.0,
                "GOAP action requires a target but has none"
            );
            self.abort(ctx, world);
            return Transition::Reset(AgentState::Idle);
        }

        if !self.behavior.move_agent(self.agent, head, ctx, world) {
            return Transition::Stay;
        }

        if let Some(head) = self.queue.front_mut() {
            head.is_in_range = true;
            let mut event =
                TraceEvent::of(ctx.tick, TraceKind::MoveArrived).with_agent(self.agent);
            if let Some(target) = head.target {
                event = event.with_target(target);
            }
            self.tracer.emit(event);
        }
        Transition::Pop
    }

    fn abort(&mut self, ctx: &TickContext, world: &W) {
        let Some(aborter) = self.queue.pop_front() else {
            return;
        };
        warn!(
            agent = %world.name(self.agent),
            action = %aborter.describe(world),
            "GOAP plan aborted"
        );
        self.tracer.emit(
            TraceEvent::of(ctx.tick, TraceKind::PlanAborted)
                .with_agent(self.agent)
                .with_label(aborter.key.0),
        );
        self.behavior.plan_aborted(&aborter);
        self.pool.give_back(aborter);
        self.release_queue();
    }

    fn release_queue(&mut self) {
        self.pool.give_back_all(self.queue.drain(..));
    }
}

impl<W, A> core::fmt::Debug for GoapBrain<W, A>
where
    W: WorldMut + 'static,
    A: GoapAgent<W>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GoapBrain")
            .field("agent", &self.agent.stable_id())
            .field("state", &self.state())
            .field("queued", &self.queue.len())
            .field("plan_calls", &self.plan_calls)
            .finish()
    }
}
