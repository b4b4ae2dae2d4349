#![allow(dead_code)]

use std::collections::BTreeMap;

use goap_core::{
    Action, ActionContext, ActionDef, ActionKey, State, TickContext, WorldEffects, WorldGoal,
    WorldMut, WorldView,
};
use goap_planner::{GoapAgent, Plan, PlanError};

pub const AGENT: u64 = 1;

/// A small world of named entities with optional perception overrides and trigger tables.
#[derive(Default)]
pub struct Camp {
    pub truth: BTreeMap<u64, State>,
    pub perceived: BTreeMap<u64, State>,
    pub names: BTreeMap<u64, &'static str>,
    pub triggers: BTreeMap<(u64, ActionKey), ActionDef>,
}

impl Camp {
    pub fn with_agent(state: State) -> Self {
        let mut camp = Self::default();
        camp.add(AGENT, "agent", state);
        camp
    }

    pub fn add(&mut self, id: u64, name: &'static str, state: State) {
        self.truth.insert(id, state);
        self.names.insert(id, name);
    }

    pub fn fact(&self, id: u64, key: &str) -> Option<goap_core::Value> {
        self.truth.get(&id).and_then(|s| s.get(key))
    }

    pub fn apply(&mut self, effects: &WorldEffects<u64>) {
        for (entity, entity_effects) in effects.iter() {
            let state = self.truth.entry(entity).or_default();
            state.apply(entity_effects).expect("effects fit the state");
        }
    }
}

impl WorldView for Camp {
    type Entity = u64;

    fn state(&self, entity: u64) -> Option<State> {
        self.truth.get(&entity).cloned()
    }

    fn perceived_state(&self, entity: u64) -> Option<State> {
        self.perceived
            .get(&entity)
            .or_else(|| self.truth.get(&entity))
            .cloned()
    }

    fn name(&self, entity: u64) -> String {
        self.names
            .get(&entity)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("#{entity}"))
    }

    fn triggered_action(&self, target: u64, key: ActionKey) -> Option<&ActionDef> {
        self.triggers.get(&(target, key))
    }
}

impl WorldMut for Camp {}

/// An action fully described by its definition, committing its effects to the world when done.
pub struct DefAction {
    pub def: ActionDef,
    pub targets: Vec<u64>,
}

impl DefAction {
    pub fn new(def: ActionDef) -> Self {
        Self {
            def,
            targets: Vec::new(),
        }
    }

    pub fn on(mut self, targets: &[u64]) -> Self {
        self.targets = targets.to_vec();
        self
    }

    pub fn boxed(self) -> Box<dyn Action<Camp>> {
        Box::new(self)
    }
}

impl Action<Camp> for DefAction {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, agent: u64, _world: &Camp) -> Vec<u64> {
        if self.targets.is_empty() {
            vec![agent]
        } else {
            self.targets.clone()
        }
    }

    fn on_done(&self, agent: u64, target: u64, world: &mut Camp) -> bool {
        let effects = self.dependent_effects(agent, target);
        world.apply(&effects);
        if let Some(def) = world.triggers.get(&(target, self.key())).cloned() {
            world.apply(&def.triggered_effects(target, agent));
        }
        true
    }
}

/// Records every callback and walks straight onto the target after `move_ticks` calls.
pub struct Recorder {
    pub goal: WorldGoal<u64>,
    pub events: Vec<String>,
    pub move_ticks: u32,
    moving: u32,
}

impl Recorder {
    pub fn new(goal: WorldGoal<u64>) -> Self {
        Self {
            goal,
            events: Vec::new(),
            move_ticks: 1,
            moving: 0,
        }
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl GoapAgent<Camp> for Recorder {
    fn create_goal_state(&mut self, _agent: u64, _world: &Camp) -> WorldGoal<u64> {
        self.goal.clone()
    }

    fn plan_failed(&mut self, _goal: &WorldGoal<u64>, error: &PlanError) {
        self.events.push(format!("failed: {error}"));
    }

    fn plan_found(&mut self, _goal: &WorldGoal<u64>, plan: &Plan<u64>) {
        let steps: Vec<_> = plan.iter().map(|s| s.key.0).collect();
        self.events.push(format!("found: {}", steps.join(",")));
    }

    fn actions_finished(&mut self) {
        self.events.push("finished".to_string());
    }

    fn plan_aborted(&mut self, aborter: &ActionContext<u64>) {
        self.events.push(format!("aborted: {}", aborter.key.0));
    }

    fn move_agent(
        &mut self,
        agent: u64,
        action: &ActionContext<u64>,
        _ctx: &TickContext,
        world: &mut Camp,
    ) -> bool {
        self.moving += 1;
        if self.moving < self.move_ticks {
            return false;
        }
        self.moving = 0;
        let Some(target) = action.target.and_then(|t| world.position(t)) else {
            return false;
        };
        let (x, y) = target.truncated();
        let state = world.truth.entry(agent).or_default();
        state.set("x", x);
        state.set("y", y);
        self.events.push(format!("arrived: {}", world.name(action.target.unwrap_or(agent))));
        true
    }
}

pub fn at(x: i64, y: i64) -> State {
    State::new().with("x", x).with("y", y)
}
