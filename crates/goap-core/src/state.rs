use core::fmt;
use std::borrow::Cow;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{check_condition, Condition, Effect, EntityId, Value, ValueError, WorldView};

/// Name of a fact, e.g. `"Logs"`, `"hasTool"` or `"x"`.
pub type FactKey = Cow<'static, str>;

/// One entity's observable facts.
///
/// Backed by a `BTreeMap` so that equality, ordering and hashing are structural: two states with
/// the same facts are the same search state regardless of how they were built.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct State {
    facts: BTreeMap<FactKey, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<FactKey>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<FactKey>, value: impl Into<Value>) {
        self.facts.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.facts.get(key).copied()
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_int()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.facts.remove(key)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.facts.iter().map(|(k, v)| (k.as_ref(), *v))
    }

    /// Apply `effects` in place. On error the state is left unchanged.
    pub fn apply(&mut self, effects: &Effects) -> Result<(), ValueError> {
        *self = self.changed(effects)?;
        Ok(())
    }

    /// A copy of this state with `effects` applied.
    pub fn changed(&self, effects: &Effects) -> Result<State, ValueError> {
        let mut next = self.clone();
        for (key, effect) in effects.iter() {
            let value = match self.facts.get(key) {
                Some(current) => current.apply(effect)?,
                None => effect.apply_to_missing()?,
            };
            next.facts.insert(Cow::Owned(key.to_owned()), value);
        }
        Ok(next)
    }
}

impl<K, V> FromIterator<(K, V)> for State
where
    K: Into<FactKey>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            facts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.facts.iter() {
            write!(f, "{key}:{value}, ")?;
        }
        Ok(())
    }
}

/// Conditions a single entity must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Goal {
    conditions: BTreeMap<FactKey, Condition>,
}

impl Goal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<FactKey>, condition: Condition) -> Self {
        self.insert(key, condition);
        self
    }

    pub fn insert(&mut self, key: impl Into<FactKey>, condition: Condition) {
        self.conditions.insert(key.into(), condition);
    }

    pub fn get(&self, key: &str) -> Option<&Condition> {
        self.conditions.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.conditions.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Condition> {
        self.conditions.remove(key)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> + '_ {
        self.conditions.iter().map(|(k, c)| (k.as_ref(), c))
    }

    pub fn is_satisfied_by(&self, state: &State) -> bool {
        do_conditions_apply(self, state)
    }
}

impl<K: Into<FactKey>> FromIterator<(K, Condition)> for Goal {
    fn from_iter<I: IntoIterator<Item = (K, Condition)>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().map(|(k, c)| (k.into(), c)).collect(),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, condition) in self.conditions.iter() {
            write!(f, "{key}:{condition}, ")?;
        }
        Ok(())
    }
}

/// Per-fact modifications applied to a single entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Effects {
    changes: BTreeMap<FactKey, Effect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<FactKey>, effect: Effect) -> Self {
        self.insert(key, effect);
        self
    }

    pub fn insert(&mut self, key: impl Into<FactKey>, effect: Effect) {
        self.changes.insert(key.into(), effect);
    }

    pub fn get(&self, key: &str) -> Option<&Effect> {
        self.changes.get(key)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Effect)> + '_ {
        self.changes.iter().map(|(k, e)| (k.as_ref(), e))
    }
}

impl<K: Into<FactKey>> FromIterator<(K, Effect)> for Effects {
    fn from_iter<I: IntoIterator<Item = (K, Effect)>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().map(|(k, e)| (k.into(), e)).collect(),
        }
    }
}

/// Perceived state of every entity relevant to one search.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldState<E: EntityId> {
    states: BTreeMap<E, State>,
}

impl<E: EntityId> Default for WorldState<E> {
    fn default() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }
}

impl<E: EntityId> WorldState<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entity: E, state: State) -> Self {
        self.insert(entity, state);
        self
    }

    pub fn insert(&mut self, entity: E, state: State) {
        self.states.insert(entity, state);
    }

    pub fn get(&self, entity: E) -> Option<&State> {
        self.states.get(&entity)
    }

    pub fn get_mut(&mut self, entity: E) -> Option<&mut State> {
        self.states.get_mut(&entity)
    }

    pub fn contains(&self, entity: E) -> bool {
        self.states.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (E, &State)> + '_ {
        self.states.iter().map(|(e, s)| (*e, s))
    }

    /// Return the cached state of `entity`, fetching its perceived state on first access.
    ///
    /// Entities that expose no state are cached as an empty `State`.
    pub fn materialize<W>(&mut self, entity: E, world: &W) -> &mut State
    where
        W: WorldView<Entity = E>,
    {
        self.states
            .entry(entity)
            .or_insert_with(|| world.perceived_state(entity).unwrap_or_default())
    }

    /// Like [`do_conditions_apply_to_world`] but without caching: entities missing from this
    /// state are looked up in `world` and discarded afterwards.
    pub fn satisfies<W>(&self, goal: &WorldGoal<E>, world: &W) -> bool
    where
        W: WorldView<Entity = E>,
    {
        goal.iter().all(|(entity, entity_goal)| match self.states.get(&entity) {
            Some(state) => do_conditions_apply(entity_goal, state),
            None => {
                let fetched = world.perceived_state(entity).unwrap_or_default();
                do_conditions_apply(entity_goal, &fetched)
            }
        })
    }

    /// A copy of this world state with `effects` applied. Entities touched for the first time
    /// are materialized from `world` before the change.
    pub fn changed<W>(&self, effects: &WorldEffects<E>, world: &W) -> Result<Self, ValueError>
    where
        W: WorldView<Entity = E>,
    {
        let mut next = self.clone();
        for entity in effects.effects.keys() {
            let state = next.materialize(*entity, world);
            *state = effects.apply_to(*entity, state)?;
        }
        Ok(next)
    }
}

impl<E: EntityId> fmt::Display for WorldState<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (entity, state) in self.states.iter() {
            writeln!(f, "{entity:?}: {state}")?;
        }
        Ok(())
    }
}

/// Goals for every entity involved in a search.
///
/// An action's own preconditions are keyed by the acting agent, target preconditions by the
/// entity acted upon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorldGoal<E: EntityId> {
    goals: BTreeMap<E, Goal>,
}

impl<E: EntityId> Default for WorldGoal<E> {
    fn default() -> Self {
        Self {
            goals: BTreeMap::new(),
        }
    }
}

impl<E: EntityId> WorldGoal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(entity: E, goal: Goal) -> Self {
        Self::new().with(entity, goal)
    }

    pub fn with(mut self, entity: E, goal: Goal) -> Self {
        self.insert(entity, goal);
        self
    }

    pub fn insert(&mut self, entity: E, goal: Goal) {
        self.goals.insert(entity, goal);
    }

    pub fn get(&self, entity: E) -> Option<&Goal> {
        self.goals.get(&entity)
    }

    pub fn get_mut(&mut self, entity: E) -> Option<&mut Goal> {
        self.goals.get_mut(&entity)
    }

    pub fn remove(&mut self, entity: E) -> Option<Goal> {
        self.goals.remove(&entity)
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = E> + '_ {
        self.goals.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (E, &Goal)> + '_ {
        self.goals.iter().map(|(e, g)| (*e, g))
    }

    /// Add every condition of `other` whose fact is not yet constrained for that entity.
    pub fn merge_missing(&mut self, other: &WorldGoal<E>) {
        for (entity, goal) in other.goals.iter() {
            let target = self.goals.entry(*entity).or_default();
            for (key, condition) in goal.iter() {
                if !target.contains(key) {
                    target.insert(key.to_owned(), *condition);
                }
            }
        }
    }
}

impl<E: EntityId> fmt::Display for WorldGoal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (entity, goal) in self.goals.iter() {
            writeln!(f, "{entity:?}: {goal}")?;
        }
        Ok(())
    }
}

/// How an action changes each entity it touches.
///
/// Effects recorded for the same entity are kept as ordered layers and applied one after the
/// other, so an action that targets its own agent changes a shared fact by both its agent and its
/// target effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorldEffects<E: EntityId> {
    effects: BTreeMap<E, Vec<Effects>>,
}

impl<E: EntityId> Default for WorldEffects<E> {
    fn default() -> Self {
        Self {
            effects: BTreeMap::new(),
        }
    }
}

impl<E: EntityId> WorldEffects<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entity: E, effects: Effects) -> Self {
        self.insert(entity, effects);
        self
    }

    /// Record `effects` on `entity`, after any effects already recorded for it.
    pub fn insert(&mut self, entity: E, effects: Effects) {
        self.effects.entry(entity).or_default().push(effects);
    }

    /// Effect layers on `entity`, in application order.
    pub fn layers(&self, entity: E) -> &[Effects] {
        self.effects.get(&entity).map(Vec::as_slice).unwrap_or_default()
    }

    /// The last effect recorded on one fact of `entity`.
    pub fn get(&self, entity: E, key: &str) -> Option<&Effect> {
        self.layers(entity).iter().rev().find_map(|layer| layer.get(key))
    }

    /// Entities touched, in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = E> + '_ {
        self.effects.keys().copied()
    }

    /// Number of entities touched.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Every layer, grouped by entity and in application order within an entity.
    pub fn iter(&self) -> impl Iterator<Item = (E, &Effects)> + '_ {
        self.effects
            .iter()
            .flat_map(|(e, layers)| layers.iter().map(move |fx| (*e, fx)))
    }

    /// `entity`'s state after every layer recorded for it, or the first error.
    pub fn apply_to(&self, entity: E, state: &State) -> Result<State, ValueError> {
        let mut next = state.clone();
        for layer in self.layers(entity) {
            next = next.changed(layer)?;
        }
        Ok(next)
    }
}

/// Check that every condition in `goal` holds in `state`. A missing fact is unsatisfied.
pub fn do_conditions_apply(goal: &Goal, state: &State) -> bool {
    goal.iter().all(|(key, condition)| match state.get(key) {
        Some(value) => check_condition(&value, condition),
        None => false,
    })
}

/// Per-entity lift of [`do_conditions_apply`].
///
/// Entities absent from `state` have their perceived state fetched from `world` and cached into
/// `state` before evaluation.
pub fn do_conditions_apply_to_world<W>(
    goal: &WorldGoal<W::Entity>,
    state: &mut WorldState<W::Entity>,
    world: &W,
) -> bool
where
    W: WorldView,
{
    for (entity, entity_goal) in goal.iter() {
        let entity_state = state.materialize(entity, world);
        if !do_conditions_apply(entity_goal, entity_state) {
            return false;
        }
    }
    true
}
