mod common;

use common::{at, Camp, DefAction, Recorder, AGENT};
use goap_core::{
    Action, ActionDef, ActionKey, Condition, Effect, Goal, State, TickContext, Value, WorldGoal,
};
use goap_planner::{AgentState, BrainConfig, GoapBrain, PlanError, PlannerConfig};
use goap_tools::{TraceKind, Tracer};

const SUPPLY_PILE: u64 = 11;
const CRAFTING_STATION: u64 = 12;

fn crafting_world() -> Camp {
    let mut world = Camp::with_agent(at(0, 0).with("hasTool", false));
    world.add(SUPPLY_PILE, "supplyPile", at(2, 0).with("NewTool", 1));
    world.add(CRAFTING_STATION, "craftingStation", at(5, 0));
    world
}

fn crafting_actions() -> Vec<Box<dyn Action<Camp>>> {
    let pick_up_tool = ActionDef::new(ActionKey("PickUpTool"))
        .in_range()
        .with_target_precondition("NewTool", Condition::more_than(0))
        .with_effect("hasTool", Effect::set(true))
        .with_target_effect("NewTool", Effect::subtract(1));
    let craft_item = ActionDef::new(ActionKey("CraftItem"))
        .in_range()
        .with_precondition("hasTool", Condition::equal(true))
        .with_effect("product", Effect::add(1));
    vec![
        DefAction::new(pick_up_tool).on(&[SUPPLY_PILE]).boxed(),
        DefAction::new(craft_item).on(&[CRAFTING_STATION]).boxed(),
    ]
}

fn brain_for(goal: Goal) -> GoapBrain<Camp, Recorder> {
    let mut recorder = Recorder::new(WorldGoal::single(AGENT, goal));
    recorder.move_ticks = 2;
    GoapBrain::new(AGENT, crafting_actions(), recorder, BrainConfig::default())
        .with_tracer(Tracer::new().with_log())
}

fn run_until(
    brain: &mut GoapBrain<Camp, Recorder>,
    world: &mut Camp,
    ticks: usize,
    done: impl Fn(&Recorder) -> bool,
) -> TickContext {
    let mut ctx = TickContext::new(0.1);
    for _ in 0..ticks {
        brain.tick(&ctx, world).expect("no setup errors");
        if done(&brain.behavior) {
            break;
        }
        ctx = ctx.advance();
    }
    ctx
}

#[test]
fn brain_walks_plans_and_finishes() {
    let mut world = crafting_world();
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));

    run_until(&mut brain, &mut world, 40, |r| r.count("finished") > 0);

    assert_eq!(
        brain.behavior.events,
        vec![
            "found: PickUpTool,CraftItem",
            "arrived: supplyPile",
            "arrived: craftingStation",
            "finished",
        ]
    );
    assert_eq!(world.fact(AGENT, "product"), Some(Value::Int(1)));
    assert_eq!(world.fact(SUPPLY_PILE, "NewTool"), Some(Value::Int(0)));
    assert_eq!(brain.state(), AgentState::Idle);
    assert!(brain.queue().is_empty());
    assert_eq!(brain.pool().outstanding(), 0);

    let log = brain.tracer().log().unwrap();
    assert_eq!(log.count(TraceKind::PlanCall), 1);
    assert_eq!(log.count(TraceKind::PlanFound), 1);
    assert_eq!(log.count(TraceKind::MoveArrived), 2);
    assert_eq!(log.count(TraceKind::ActionDone), 2);
    assert_eq!(log.count(TraceKind::ActionsFinished), 1);
}

#[test]
fn move_to_nests_inside_perform_action() {
    let mut world = crafting_world();
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));
    let mut ctx = TickContext::new(0.1);

    let mut states = Vec::new();
    for _ in 0..4 {
        states.push(brain.tick(&ctx, &mut world).unwrap());
        ctx = ctx.advance();
    }
    assert_eq!(
        states,
        vec![
            AgentState::PerformAction,
            AgentState::MoveTo,
            AgentState::MoveTo,
            AgentState::PerformAction,
        ]
    );
    assert!(brain.queue().front().is_some_and(|head| head.is_in_range));
}

#[test]
fn finished_agent_replans_forever() {
    let mut world = crafting_world();
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));

    run_until(&mut brain, &mut world, 60, |r| r.count("finished") > 1);

    // the goal already holds, so the second plan is empty
    assert_eq!(brain.behavior.count("found: "), 2);
    assert!(brain.behavior.events.contains(&"found: ".to_string()));
    assert_eq!(brain.plan_calls(), 2);
}

#[test]
fn failed_plan_keeps_the_agent_idle() {
    let mut world = crafting_world();
    let recorder = Recorder::new(WorldGoal::single(
        AGENT,
        Goal::new().with("hasTreasure", Condition::equal(true)),
    ));
    // crafting can raise `product` without bound, so the search needs a small budget
    let config = BrainConfig {
        planner: PlannerConfig::default().with_max_expansions(50),
        ..BrainConfig::default()
    };
    let mut brain = GoapBrain::new(AGENT, crafting_actions(), recorder, config)
        .with_tracer(Tracer::new().with_log());
    let ctx = TickContext::new(0.1);

    assert_eq!(brain.tick(&ctx, &mut world), Ok(AgentState::Idle));
    assert_eq!(brain.tick(&ctx.advance(), &mut world), Ok(AgentState::Idle));
    assert_eq!(brain.behavior.count("failed: "), 2);
    assert_eq!(brain.plan_calls(), 2);
    assert_eq!(brain.tracer().log().unwrap().count(TraceKind::PlanFailed), 2);
    assert_eq!(brain.pool().outstanding(), 0);
}

#[test]
fn stale_perception_aborts_the_whole_plan() {
    let mut world = crafting_world();
    world.truth.insert(SUPPLY_PILE, at(2, 0).with("NewTool", 0));
    world
        .perceived
        .insert(SUPPLY_PILE, at(2, 0).with("NewTool", 2));
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));

    run_until(&mut brain, &mut world, 20, |r| r.count("aborted: ") > 0);

    assert_eq!(
        brain.behavior.events,
        vec![
            "found: PickUpTool,CraftItem",
            "arrived: supplyPile",
            "aborted: PickUpTool",
        ]
    );
    assert_eq!(brain.state(), AgentState::Idle);
    assert!(brain.queue().is_empty());
    assert_eq!(brain.pool().outstanding(), 0);
    assert_eq!(brain.tracer().log().unwrap().count(TraceKind::PlanAborted), 1);
}

#[test]
fn vanished_target_aborts_without_moving() {
    let mut world = crafting_world();
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));
    let ctx = TickContext::new(0.1);

    assert_eq!(brain.tick(&ctx, &mut world), Ok(AgentState::PerformAction));
    assert_eq!(brain.tick(&ctx, &mut world), Ok(AgentState::MoveTo));

    world.truth.insert(SUPPLY_PILE, State::new().with("NewTool", 1));
    assert_eq!(brain.tick(&ctx, &mut world), Ok(AgentState::Idle));

    assert_eq!(brain.behavior.count("arrived: "), 0);
    assert_eq!(brain.behavior.count("aborted: PickUpTool"), 1);
    assert_eq!(brain.pool().outstanding(), 0);
    assert_eq!(world.fact(AGENT, "x"), Some(Value::Int(0)));
}

#[test]
fn agent_without_position_fails_loudly() {
    let mut world = crafting_world();
    world.truth.insert(AGENT, State::new().with("hasTool", false));
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));

    let err = brain.tick(&TickContext::new(0.1), &mut world).unwrap_err();
    assert!(matches!(err, PlanError::MissingPosition { agent: AGENT, .. }));
    assert_eq!(brain.state(), AgentState::Idle);
    assert_eq!(brain.behavior.count("failed: "), 0);
}

#[test]
fn new_plan_returns_old_contexts() {
    let mut world = crafting_world();
    let mut brain = brain_for(Goal::new().with("product", Condition::at_least(1)));
    let ctx = TickContext::new(0.1);

    brain.tick(&ctx, &mut world).unwrap();
    assert_eq!(brain.pool().outstanding(), 2);

    brain.abort_plan();
    assert_eq!(brain.pool().outstanding(), 0);
    assert_eq!(brain.state(), AgentState::Idle);

    brain.tick(&ctx, &mut world).unwrap();
    assert_eq!(brain.pool().outstanding(), 2);
    assert_eq!(
        brain.describe_queue(&world),
        "PickUpTool@supplyPile-> CraftItem@craftingStation-> GOAL"
    );
}
