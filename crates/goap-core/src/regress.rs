//! Goal transformation under an action's effects.
//!
//! The planner searches forward over world states; these helpers map goals backward
//! ([`regress_goal`]) and forward ([`progress_goal`]) through effects, and judge whether a
//! transformed goal got closer to a known state ([`is_goal_closer`]).

use crate::{
    CompareType, Condition, Effect, Effects, EntityId, Goal, ModificationType, State, Value,
    WorldEffects, WorldGoal, WorldState,
};

/// The condition a fact must meet before `effect` so that `condition` holds after it.
///
/// `Set` and `Truncate` overwrite the fact, so no prior constraint survives and `None` is
/// returned. `Add(v)` shifts the bound to `c - v`, `Subtract(v)` to `c + v`.
pub fn regress_condition(effect: &Effect, condition: &Condition) -> Option<Condition> {
    match effect.modifier {
        ModificationType::Set | ModificationType::Truncate => None,
        ModificationType::Add => shift(condition, effect.value, |c, v| c.saturating_sub(v)),
        ModificationType::Subtract => shift(condition, effect.value, |c, v| c.saturating_add(v)),
    }
}

/// The condition a fact meets after `effect` if it met `condition` before.
///
/// `Set` and `Truncate` pin the fact to a known value.
pub fn progress_condition(effect: &Effect, condition: &Condition) -> Option<Condition> {
    match effect.modifier {
        ModificationType::Set => Some(Condition::equal(effect.value)),
        ModificationType::Truncate => Some(Condition::equal(condition.value.zeroed())),
        ModificationType::Add => shift(condition, effect.value, |c, v| c.saturating_add(v)),
        ModificationType::Subtract => shift(condition, effect.value, |c, v| c.saturating_sub(v)),
    }
}

fn shift(condition: &Condition, delta: Value, op: impl Fn(i64, i64) -> i64) -> Option<Condition> {
    let (c, v) = (condition.value.as_int()?, delta.as_int()?);
    Some(Condition::new(condition.comparison, op(c, v)))
}

pub fn regress_goal(goal: &Goal, effects: &Effects) -> Goal {
    transform_goal(goal, effects, regress_condition)
}

pub fn progress_goal(goal: &Goal, effects: &Effects) -> Goal {
    transform_goal(goal, effects, progress_condition)
}

fn transform_goal(
    goal: &Goal,
    effects: &Effects,
    step: fn(&Effect, &Condition) -> Option<Condition>,
) -> Goal {
    let mut next = Goal::new();
    for (key, condition) in goal.iter() {
        let transformed = match effects.get(key) {
            Some(effect) => step(effect, condition),
            None => Some(*condition),
        };
        if let Some(condition) = transformed {
            next.insert(key.to_owned(), condition);
        }
    }
    next
}

pub fn regress_world_goal<E: EntityId>(
    goal: &WorldGoal<E>,
    effects: &WorldEffects<E>,
) -> WorldGoal<E> {
    let mut next = WorldGoal::new();
    for (entity, entity_goal) in goal.iter() {
        let transformed = effects
            .layers(entity)
            .iter()
            .rev()
            .fold(entity_goal.clone(), |acc, layer| regress_goal(&acc, layer));
        if !transformed.is_empty() {
            next.insert(entity, transformed);
        }
    }
    next
}

pub fn progress_world_goal<E: EntityId>(
    goal: &WorldGoal<E>,
    effects: &WorldEffects<E>,
) -> WorldGoal<E> {
    let mut next = WorldGoal::new();
    for (entity, entity_goal) in goal.iter() {
        let transformed = effects
            .layers(entity)
            .iter()
            .fold(entity_goal.clone(), |acc, layer| progress_goal(&acc, layer));
        if !transformed.is_empty() {
            next.insert(entity, transformed);
        }
    }
    next
}

/// How far `value` is from meeting `condition`; `0` when it already does.
///
/// A missing fact is measured from the zero of the condition's variant. Booleans and mismatched
/// variants are either met (`0`) or not (`1`).
pub fn condition_distance(value: Option<Value>, condition: &Condition) -> u64 {
    let value = value.unwrap_or_else(|| condition.value.zeroed());
    if value.satisfies(condition) {
        return 0;
    }
    let (Some(x), Some(c)) = (value.as_int(), condition.value.as_int()) else {
        return 1;
    };
    let gap = match condition.comparison {
        CompareType::Equal => x.abs_diff(c),
        CompareType::NotEqual => 1,
        CompareType::MoreThan => c.saturating_add(1).abs_diff(x),
        CompareType::MoreThanOrEqual => c.abs_diff(x),
        CompareType::LessThan => x.abs_diff(c.saturating_sub(1)),
        CompareType::LessThanOrEqual => x.abs_diff(c),
    };
    gap.max(1)
}

/// Whether `candidate` is a strict improvement over `current` with respect to `state`.
///
/// No fact constrained by both goals may end up further from `state`, and at least one must get
/// closer or be dropped while still unmet.
pub fn is_goal_closer(current: &Goal, candidate: &Goal, state: &State) -> bool {
    let mut improved = false;
    for (key, condition) in current.iter() {
        let before = condition_distance(state.get(key), condition);
        match candidate.get(key) {
            Some(next) => {
                let after = condition_distance(state.get(key), next);
                if after > before {
                    return false;
                }
                improved |= after < before;
            }
            None => improved |= before > 0,
        }
    }
    improved
}

/// Per-entity lift of [`is_goal_closer`]. Entities missing from `state` count as empty.
pub fn is_world_goal_closer<E: EntityId>(
    current: &WorldGoal<E>,
    candidate: &WorldGoal<E>,
    state: &WorldState<E>,
) -> bool {
    let empty_goal = Goal::new();
    let empty_state = State::new();
    let mut improved = false;
    for entity in current.entities().chain(candidate.entities()) {
        let before = current.get(entity).unwrap_or(&empty_goal);
        let after = candidate.get(entity).unwrap_or(&empty_goal);
        let entity_state = state.get(entity).unwrap_or(&empty_state);
        if before == after {
            continue;
        }
        if is_goal_closer(before, after, entity_state) {
            improved = true;
        } else if worsens(before, after, entity_state) {
            return false;
        }
    }
    improved
}

fn worsens(current: &Goal, candidate: &Goal, state: &State) -> bool {
    current.iter().any(|(key, condition)| match candidate.get(key) {
        Some(next) => {
            condition_distance(state.get(key), next) > condition_distance(state.get(key), condition)
        }
        None => false,
    })
}
