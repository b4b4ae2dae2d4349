use core::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use goap_core::{
    Action, ActionDef, ContextPool, EntityId, State, ValueError, Vec2, WorldGoal, WorldMut,
    WorldState,
};
use tracing::{debug, trace};

use crate::{Node, NodeArena, NodeId, Plan, PlanError, PlannerConfig, Step};

/// Estimated remaining cost from a state to the goal.
pub type Heuristic<E> = Box<dyn Fn(&WorldState<E>, &WorldGoal<E>) -> f32>;

/// One planning call: who plans, with which actions, toward which goal.
pub struct PlanRequest<'a, W>
where
    W: WorldMut + 'static,
{
    pub agent: W::Entity,
    pub actions: &'a [Box<dyn Action<W>>],
    pub goal: &'a WorldGoal<W::Entity>,
}

#[derive(Debug)]
struct OpenNode {
    f: f32,
    g: f32,
    id: NodeId,
    tie: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap; earlier insertions win ties.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

/// Forward A* search over world states.
///
/// Starting from the agent's perceived world, each expansion tries every action against every
/// candidate target, applies the action's effects (and any target-owned triggered action) to get
/// a successor state, and prices the edge by cost, travel distance and work duration. A node is a
/// solution once its world state satisfies the goal.
pub struct GoapPlanner<W>
where
    W: WorldMut + 'static,
{
    config: PlannerConfig,
    heuristic: Option<Heuristic<W::Entity>>,
    arena: NodeArena<W::Entity>,
}

impl<W> Default for GoapPlanner<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<W> GoapPlanner<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self {
            config: PlannerConfig::default(),
            heuristic: None,
            arena: NodeArena::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Order the frontier with a domain estimate instead of uniform cost.
    pub fn with_heuristic(
        mut self,
        heuristic: impl Fn(&WorldState<W::Entity>, &WorldGoal<W::Entity>) -> f32 + 'static,
    ) -> Self {
        self.heuristic = Some(Box::new(heuristic));
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Nodes created by the last search.
    pub fn arena(&self) -> &NodeArena<W::Entity> {
        &self.arena
    }

    pub fn plan(
        &mut self,
        request: PlanRequest<'_, W>,
        world: &W,
        pool: &mut ContextPool<W::Entity>,
    ) -> Result<Plan<W::Entity>, PlanError> {
        let PlanRequest {
            agent,
            actions,
            goal,
        } = request;

        let agent_state = world.perceived_state(agent).unwrap_or_default();
        if !agent_state.contains(&self.config.position_x)
            || !agent_state.contains(&self.config.position_y)
        {
            return Err(PlanError::MissingPosition {
                agent: agent.stable_id(),
                x: self.config.position_x.to_string(),
                y: self.config.position_y.to_string(),
            });
        }

        let candidates: Vec<Vec<W::Entity>> =
            actions.iter().map(|a| a.targets(agent, world)).collect();

        // Every entity the search can touch is sampled once up front so that successor states are
        // compared over the same set of entities.
        let mut root = WorldState::new().with(agent, agent_state);
        for target in candidates.iter().flatten() {
            root.materialize(*target, world);
        }
        for entity in goal.entities() {
            root.materialize(entity, world);
        }

        debug!(
            agent = ?agent,
            actions = actions.len(),
            entities = root.len(),
            "GOAP search started"
        );

        self.arena.clear();
        let mut open = BinaryHeap::<OpenNode>::new();
        let mut explored: HashMap<WorldState<W::Entity>, NodeId> = HashMap::new();
        let mut closed: HashSet<WorldState<W::Entity>> = HashSet::new();
        let mut tie: u64 = 0;
        let mut expansions: usize = 0;

        let root_h = self.estimate(&root, goal);
        let root_id = self.arena.push(Node {
            parent: None,
            running_cost: 0.0,
            heuristic: root_h,
            state: root.clone(),
            step: None,
        });
        explored.insert(root, root_id);
        open.push(OpenNode {
            f: root_h,
            g: 0.0,
            id: root_id,
            tie,
        });
        tie += 1;

        while let Some(open_node) = open.pop() {
            let node = self.arena.get(open_node.id);
            if open_node.g > node.running_cost || closed.contains(&node.state) {
                continue; // stale heap entry
            }

            let state = node.state.clone();
            let g = node.running_cost;
            if state.satisfies(goal, world) {
                let plan = self.extract(open_node.id, g, expansions, pool);
                debug!(
                    agent = ?agent,
                    steps = plan.len(),
                    cost = plan.cost,
                    expansions,
                    "GOAP plan found"
                );
                return Ok(plan);
            }

            // Only nodes that generate successors count against the budget.
            if expansions >= self.config.max_expansions {
                debug!(agent = ?agent, expansions, "GOAP search hit expansion budget");
                return Err(PlanError::BudgetExhausted {
                    expansions,
                    frontier: open.len(),
                });
            }
            expansions += 1;
            trace!(
                expansion = expansions,
                cost = g,
                path = %self.arena.path_to_string(open_node.id, world),
                "GOAP expand"
            );

            closed.insert(state.clone());

            let from = self.agent_position(&state, agent, world);

            for (index, action) in actions.iter().enumerate() {
                if !state.satisfies(&action.independent_preconditions(agent), world) {
                    continue;
                }

                for &target in candidates[index].iter() {
                    if !state.satisfies(&action.dependent_preconditions(agent, target), world) {
                        continue;
                    }

                    let trigger = world.triggered_action(target, action.key());
                    if let Some(def) = trigger {
                        let conditions = def.triggered_preconditions(target, agent);
                        if !state.satisfies(&conditions, world) {
                            continue;
                        }
                    }

                    let (edge, target_position) = if action.requires_in_range() {
                        let Some(to) = world.position(target) else {
                            trace!(
                                action = action.key().0,
                                target = ?target,
                                "GOAP target has no position"
                            );
                            continue;
                        };
                        (action.calculate_cost(from, to), Some(to))
                    } else {
                        (action.cost(), None)
                    };
                    let edge = if self.config.include_work_duration {
                        edge + action.work_duration()
                    } else {
                        edge
                    };

                    let next = self.successor(
                        &state,
                        action.as_ref(),
                        trigger,
                        agent,
                        target,
                        target_position,
                        world,
                    )?;
                    if next == state || closed.contains(&next) {
                        continue;
                    }

                    let next_g = g + edge;
                    let step = Step {
                        action: index,
                        key: action.key(),
                        target,
                    };

                    if let Some(&existing) = explored.get(&next) {
                        let known = self.arena.get_mut(existing);
                        if next_g >= known.running_cost {
                            continue;
                        }
                        known.parent = Some(open_node.id);
                        known.running_cost = next_g;
                        known.step = Some(step);
                        open.push(OpenNode {
                            f: known.score(),
                            g: next_g,
                            id: existing,
                            tie,
                        });
                        tie += 1;
                        continue;
                    }

                    if open.len() >= self.config.max_nodes {
                        debug!(agent = ?agent, expansions, "GOAP search hit node budget");
                        return Err(PlanError::BudgetExhausted {
                            expansions,
                            frontier: open.len(),
                        });
                    }

                    let h = self.estimate(&next, goal);
                    let id = self.arena.push(Node {
                        parent: Some(open_node.id),
                        running_cost: next_g,
                        heuristic: h,
                        state: next.clone(),
                        step: Some(step),
                    });
                    explored.insert(next, id);
                    open.push(OpenNode {
                        f: next_g + h,
                        g: next_g,
                        id,
                        tie,
                    });
                    tie += 1;
                }
            }
        }

        debug!(agent = ?agent, expansions, "GOAP frontier exhausted");
        Err(PlanError::NoPlan { expansions })
    }

    fn estimate(&self, state: &WorldState<W::Entity>, goal: &WorldGoal<W::Entity>) -> f32 {
        match &self.heuristic {
            Some(h) => h(state, goal).max(0.0),
            None => 0.0,
        }
    }

    fn agent_position(&self, state: &WorldState<W::Entity>, agent: W::Entity, world: &W) -> Vec2 {
        state
            .get(agent)
            .and_then(|s| {
                Vec2::from_state_keys(s, &self.config.position_x, &self.config.position_y)
            })
            .or_else(|| world.position(agent))
            .unwrap_or(Vec2::ZERO)
    }

    #[allow(clippy::too_many_arguments)]
    fn successor(
        &self,
        state: &WorldState<W::Entity>,
        action: &dyn Action<W>,
        trigger: Option<&ActionDef>,
        agent: W::Entity,
        target: W::Entity,
        target_position: Option<Vec2>,
        world: &W,
    ) -> Result<WorldState<W::Entity>, PlanError> {
        let invalid = |source: ValueError| PlanError::InvalidEffect {
            action: action.key().0,
            source,
        };

        let mut next = state
            .changed(&action.dependent_effects(agent, target), world)
            .map_err(invalid)?;
        if let Some(def) = trigger {
            next = next
                .changed(&def.triggered_effects(target, agent), world)
                .map_err(|source: ValueError| PlanError::InvalidEffect {
                    action: def.key.0,
                    source,
                })?;
        }

        if let (true, Some(position)) = (self.config.update_agent_position, target_position) {
            let (x, y) = position.truncated();
            let agent_state: &mut State = next.materialize(agent, world);
            agent_state.set(self.config.position_x.clone(), x);
            agent_state.set(self.config.position_y.clone(), y);
        }
        Ok(next)
    }

    fn extract(
        &self,
        id: NodeId,
        cost: f32,
        expansions: usize,
        pool: &mut ContextPool<W::Entity>,
    ) -> Plan<W::Entity> {
        let steps: VecDeque<_> = self
            .arena
            .path(id)
            .into_iter()
            .map(|step| {
                let mut ctx = pool.borrow();
                ctx.init(step.action, step.key, Some(step.target));
                ctx
            })
            .collect();
        Plan {
            steps,
            cost,
            expansions,
        }
    }
}
