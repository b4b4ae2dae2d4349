use std::collections::BTreeMap;

use goap_core::{
    do_conditions_apply, do_conditions_apply_to_world, Condition, Effect, Effects, Goal, State,
    WorldEffects, WorldGoal, WorldMut, WorldState, WorldView,
};

#[derive(Default)]
struct Piles {
    truth: BTreeMap<u64, State>,
    perceived: BTreeMap<u64, State>,
}

impl WorldView for Piles {
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
}

impl WorldMut for Piles {}

fn worker() -> State {
    State::new().with("Logs", 2).with("hasTool", true)
}

#[test]
fn every_condition_must_hold() {
    let goal = Goal::new()
        .with("Logs", Condition::at_least(2))
        .with("hasTool", Condition::equal(true));
    assert!(do_conditions_apply(&goal, &worker()));

    for key in ["Logs", "hasTool"] {
        let mut missing = worker();
        missing.remove(key);
        assert!(!do_conditions_apply(&goal, &missing), "missing {key}");
    }

    let violated = worker().with("Logs", 1);
    assert!(!do_conditions_apply(&goal, &violated));
}

#[test]
fn empty_goal_is_trivially_satisfied() {
    assert!(do_conditions_apply(&Goal::new(), &State::new()));
}

#[test]
fn world_check_materializes_absent_entities_from_perception() {
    let mut world = Piles::default();
    world.truth.insert(7, State::new().with("Mushrooms", 0));
    world.perceived.insert(7, State::new().with("Mushrooms", 3));

    let goal = WorldGoal::single(7, Goal::new().with("Mushrooms", Condition::more_than(0)));
    let mut state = WorldState::new();
    assert!(do_conditions_apply_to_world(&goal, &mut state, &world));
    assert_eq!(state.get(7).and_then(|s| s.get_int("Mushrooms")), Some(3));
}

#[test]
fn world_check_prefers_cached_state() {
    let mut world = Piles::default();
    world.truth.insert(7, State::new().with("Mushrooms", 3));

    let goal = WorldGoal::single(7, Goal::new().with("Mushrooms", Condition::more_than(0)));
    let mut state = WorldState::new().with(7, State::new().with("Mushrooms", 0));
    assert!(!do_conditions_apply_to_world(&goal, &mut state, &world));
}

#[test]
fn unknown_entities_are_cached_as_empty() {
    let world = Piles::default();
    let goal = WorldGoal::single(9, Goal::new().with("Logs", Condition::at_least(1)));
    let mut state = WorldState::new();
    assert!(!do_conditions_apply_to_world(&goal, &mut state, &world));
    assert_eq!(state.get(9), Some(&State::new()));
}

#[test]
fn changed_copies_instead_of_mutating() {
    let before = worker();
    let effects = Effects::new()
        .with("Logs", Effect::add(1))
        .with("Ore", Effect::subtract(2));
    let after = before.changed(&effects).unwrap();

    assert_eq!(before.get_int("Logs"), Some(2));
    assert_eq!(after.get_int("Logs"), Some(3));
    assert_eq!(after.get_int("Ore"), Some(-2));
}

#[test]
fn world_changed_materializes_touched_entities() {
    let mut world = Piles::default();
    world.truth.insert(2, State::new().with("NewTool", 1));

    let start = WorldState::new().with(1, worker());
    let effects = WorldEffects::new()
        .with(1, Effects::new().with("hasTool", Effect::set(true)))
        .with(2, Effects::new().with("NewTool", Effect::subtract(1)));
    let next = start.changed(&effects, &world).unwrap();

    assert_eq!(start.len(), 1);
    assert_eq!(next.get(2).and_then(|s| s.get_int("NewTool")), Some(0));
}

#[test]
fn structurally_equal_states_are_equal() {
    let a = State::new().with("Logs", 1).with("Ore", 2);
    let b: State = [("Ore", 2), ("Logs", 1)].into_iter().collect();
    assert_eq!(a, b);
    assert_eq!(
        WorldState::new().with(1u64, a.clone()),
        WorldState::new().with(1u64, b)
    );
}

#[test]
fn effects_on_the_same_entity_apply_in_order() {
    let world = Piles::default();
    let effects = WorldEffects::new()
        .with(1u64, Effects::new().with("Logs", Effect::add(1)))
        .with(1u64, Effects::new().with("Logs", Effect::set(7)).with("Ore", Effect::add(1)));
    assert_eq!(effects.len(), 1);
    assert_eq!(effects.layers(1).len(), 2);

    let next = WorldState::new()
        .with(1, worker())
        .changed(&effects, &world)
        .unwrap();
    let state = next.get(1).unwrap();
    assert_eq!(state.get_int("Logs"), Some(7));
    assert_eq!(state.get_int("Ore"), Some(1));
}

#[test]
fn display_matches_debug_format() {
    let state = State::new().with("Logs", 1).with("hasTool", true);
    assert_eq!(state.to_string(), "Logs:1, hasTool:true, ");

    let goal = Goal::new().with("Logs", Condition::at_least(2));
    assert_eq!(goal.to_string(), "Logs:MoreThanOrEqual 2, ");
}
