use crate::{
    do_conditions_apply_to_world, progress_world_goal, regress_world_goal, Condition, Effect,
    Effects, EntityId, FactKey, Goal, Vec2, WorldEffects, WorldGoal, WorldMut, WorldState,
};

/// Stable identity of an action, used by trigger tables, traces and plan printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionKey(pub &'static str);

impl ActionKey {
    pub const NONE: ActionKey = ActionKey("None");

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl Default for ActionKey {
    fn default() -> Self {
        ActionKey::NONE
    }
}

/// Static description of an action: cost, duration, preconditions and effects on the acting
/// agent and on its target.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDef {
    pub key: ActionKey,
    pub cost: f32,
    pub work_duration: f32,
    pub requires_in_range: bool,
    pub preconditions: Goal,
    pub target_preconditions: Goal,
    pub effects: Effects,
    pub target_effects: Effects,
}

impl ActionDef {
    pub fn new(key: ActionKey) -> Self {
        Self {
            key,
            cost: 1.0,
            work_duration: 0.0,
            requires_in_range: false,
            preconditions: Goal::new(),
            target_preconditions: Goal::new(),
            effects: Effects::new(),
            target_effects: Effects::new(),
        }
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_work_duration(mut self, seconds: f32) -> Self {
        self.work_duration = seconds;
        self
    }

    pub fn in_range(mut self) -> Self {
        self.requires_in_range = true;
        self
    }

    pub fn with_precondition(mut self, key: impl Into<FactKey>, condition: Condition) -> Self {
        self.preconditions.insert(key, condition);
        self
    }

    pub fn with_target_precondition(
        mut self,
        key: impl Into<FactKey>,
        condition: Condition,
    ) -> Self {
        self.target_preconditions.insert(key, condition);
        self
    }

    pub fn with_effect(mut self, key: impl Into<FactKey>, effect: Effect) -> Self {
        self.effects.insert(key, effect);
        self
    }

    pub fn with_target_effect(mut self, key: impl Into<FactKey>, effect: Effect) -> Self {
        self.target_effects.insert(key, effect);
        self
    }

    pub fn name(&self) -> &'static str {
        self.key.0
    }

    /// Preconditions of this definition when it is owned by `owner` and fires back onto `agent`.
    pub fn triggered_preconditions<E: EntityId>(&self, owner: E, agent: E) -> WorldGoal<E> {
        let mut goal = WorldGoal::new();
        if !self.preconditions.is_empty() {
            goal.insert(owner, self.preconditions.clone());
        }
        if !self.target_preconditions.is_empty() {
            match goal.get_mut(agent) {
                Some(existing) => {
                    for (key, condition) in self.target_preconditions.iter() {
                        existing.insert(key.to_owned(), *condition);
                    }
                }
                None => goal.insert(agent, self.target_preconditions.clone()),
            }
        }
        goal
    }

    /// Effects of this definition when it is owned by `owner` and fires back onto `agent`.
    pub fn triggered_effects<E: EntityId>(&self, owner: E, agent: E) -> WorldEffects<E> {
        let mut effects = WorldEffects::new();
        if !self.effects.is_empty() {
            effects.insert(owner, self.effects.clone());
        }
        if !self.target_effects.is_empty() {
            effects.insert(agent, self.target_effects.clone());
        }
        effects
    }
}

/// A behavior the agent can plan with and perform.
///
/// Implementors provide [`Action::def`]; every other method has a default derived from it and
/// can be overridden for dynamic preconditions, target filtering or side effects.
pub trait Action<W>: 'static
where
    W: WorldMut + 'static,
{
    fn def(&self) -> &ActionDef;

    fn key(&self) -> ActionKey {
        self.def().key
    }

    fn cost(&self) -> f32 {
        self.def().cost
    }

    fn work_duration(&self) -> f32 {
        self.def().work_duration
    }

    /// Whether the agent must stand at the target before the action can run.
    fn requires_in_range(&self) -> bool {
        self.def().requires_in_range
    }

    /// Candidate targets. Defaults to the agent itself.
    fn targets(&self, agent: W::Entity, _world: &W) -> Vec<W::Entity> {
        vec![agent]
    }

    /// Preconditions on the acting agent.
    fn independent_preconditions(&self, agent: W::Entity) -> WorldGoal<W::Entity> {
        let mut goal = WorldGoal::new();
        if !self.def().preconditions.is_empty() {
            goal.insert(agent, self.def().preconditions.clone());
        }
        goal
    }

    /// Preconditions on the entity acted upon.
    fn dependent_preconditions(
        &self,
        _agent: W::Entity,
        target: W::Entity,
    ) -> WorldGoal<W::Entity> {
        let mut goal = WorldGoal::new();
        if !self.def().target_preconditions.is_empty() {
            goal.insert(target, self.def().target_preconditions.clone());
        }
        goal
    }

    /// Effects on both the agent and the target. When the target is the agent, the target
    /// effects are layered after the agent effects.
    fn dependent_effects(&self, agent: W::Entity, target: W::Entity) -> WorldEffects<W::Entity> {
        let mut effects = WorldEffects::new();
        if !self.def().effects.is_empty() {
            effects.insert(agent, self.def().effects.clone());
        }
        if !self.def().target_effects.is_empty() {
            effects.insert(target, self.def().target_effects.clone());
        }
        effects
    }

    /// Re-check the target preconditions against ground truth right before execution starts.
    fn can_do_now(&self, agent: W::Entity, target: W::Entity, world: &W) -> bool {
        let mut state = WorldState::new();
        state.insert(agent, world.state(agent).unwrap_or_default());
        state.insert(target, world.state(target).unwrap_or_default());
        let conditions = self.dependent_preconditions(agent, target);
        do_conditions_apply_to_world(&conditions, &mut state, world)
    }

    /// Commit the action's side effects once its work duration has elapsed. Returning `false`
    /// aborts the remaining plan.
    fn on_done(&self, _agent: W::Entity, _target: W::Entity, _world: &mut W) -> bool {
        true
    }

    /// Edge weight of an in-range action: base cost plus straight-line travel.
    fn calculate_cost(&self, from: Vec2, to: Vec2) -> f32 {
        self.cost() + from.distance(to)
    }

    /// The goal that must hold before this action so that `goal` holds after it.
    fn previous_goal(
        &self,
        agent: W::Entity,
        target: W::Entity,
        goal: &WorldGoal<W::Entity>,
    ) -> WorldGoal<W::Entity> {
        let mut previous = regress_world_goal(goal, &self.dependent_effects(agent, target));
        previous.merge_missing(&self.independent_preconditions(agent));
        previous.merge_missing(&self.dependent_preconditions(agent, target));
        previous
    }

    /// What `goal` becomes once this action's effects are applied forward.
    fn resulting_goal(
        &self,
        agent: W::Entity,
        target: W::Entity,
        goal: &WorldGoal<W::Entity>,
    ) -> WorldGoal<W::Entity> {
        progress_world_goal(goal, &self.dependent_effects(agent, target))
    }
}
