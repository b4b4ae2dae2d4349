//! The demo map: one worker, a camp with tools and wood, and a walled-off treasure.

use goap_core::{
    Action, ActionDef, ActionKey, Condition, Effect, Goal, State, Vec2, WorldGoal, WorldView,
};

use crate::actions::{
    BashWall, Collect, CraftItem, IncrementItem, OpenDoor, PickUpTool, Pray, TryToFind,
};
use crate::config::{DemoConfig, Role};
use crate::rng::SplitMix64;
use crate::world::{inventory, DemoWorld, Item, Kind, HAS_TOOL, IN_PART2, OPEN, SEARCHED};

pub struct Scenario {
    pub world: DemoWorld,
    pub agent: u32,
    pub actions: Vec<Box<dyn Action<DemoWorld>>>,
    pub goal: WorldGoal<u32>,
}

impl Scenario {
    pub fn new(config: &DemoConfig) -> Self {
        let mut rng = SplitMix64::new(config.seed);
        let mut world = DemoWorld::new();

        let agent = world.spawn_worker("ann", Vec2::ZERO);

        world.spawn(
            "supplies",
            Kind::SupplyPile,
            Vec2::new(3.0, 0.0),
            inventory(&[(Item::NewTool, 2)]),
        );
        world.spawn("oak", Kind::Tree, Vec2::new(6.0, 2.0), State::new());
        world.spawn("block", Kind::ChoppingBlock, Vec2::new(5.0, -1.0), State::new());
        world.spawn("brush", Kind::Branches, Vec2::new(-4.0, 0.0), State::new());
        world.spawn("patch", Kind::MushroomsPile, Vec2::new(2.0, 2.0), State::new());
        world.spawn("peak", Kind::Mountain, Vec2::new(-5.0, 5.0), State::new());

        let piles = [
            ("dig site", Vec2::new(-3.0, 2.0)),
            ("old well", Vec2::new(-2.0, -3.0)),
        ];
        for (name, position) in piles {
            world.spawn_unknown_pile(name, position, &[Item::Keys], config.find_chance, &mut rng);
        }

        let door = world.spawn(
            "door",
            Kind::Door,
            Vec2::new(4.0, 0.0),
            State::new().with(OPEN, false),
        );
        world.set_trigger(
            door,
            OpenDoor::KEY,
            ActionDef::new(ActionKey("Unlock"))
                .with_precondition(OPEN, Condition::equal(false))
                .with_effect(OPEN, Effect::set(true))
                .with_target_effect(Item::Keys.key(), Effect::subtract(1)),
        );
        world.spawn("wall", Kind::BrickWall, Vec2::new(4.0, 3.0), State::new());
        world.spawn(
            "chest",
            Kind::Treasure,
            Vec2::new(9.0, 1.0),
            inventory(&[(Item::Treasure, 1)]),
        );

        let goal = goal_for(config, agent);
        Self {
            world,
            agent,
            actions: actions_for(config),
            goal,
        }
    }

    /// Whether the goal holds in the ground-truth world.
    pub fn is_done(&self) -> bool {
        self.goal.iter().all(|(entity, goal)| {
            self.world
                .state(entity)
                .is_some_and(|state| goal.is_satisfied_by(&state))
        })
    }

    /// Unknown piles that have been searched so far.
    pub fn searched(&self) -> usize {
        self.world
            .of_kind(Kind::DiggableGround)
            .into_iter()
            .filter(|pile| {
                self.world
                    .entity(*pile)
                    .is_some_and(|entity| entity.facts.get_bool(SEARCHED) == Some(true))
            })
            .count()
    }
}

pub fn goal_for(config: &DemoConfig, agent: u32) -> WorldGoal<u32> {
    let goal = match config.role {
        Role::Woodcutter => {
            Goal::new().with(Item::Firewood.key(), Condition::at_least(config.firewood_wanted))
        }
        Role::Pirate => Goal::new().with(Item::Treasure.key(), Condition::at_least(1)),
        Role::Creature => Goal::new().with(Item::Nirvana.key(), Condition::at_least(1)),
    };
    WorldGoal::single(agent, goal)
}

/// The trades a worker of `config.role` knows.
pub fn actions_for(config: &DemoConfig) -> Vec<Box<dyn Action<DemoWorld>>> {
    match config.role {
        Role::Woodcutter => vec![
            Box::new(PickUpTool::new()),
            Box::new(
                Collect::new(ActionKey("ChopLog"), Item::Logs, 1, Kind::Tree)
                    .with_precondition(HAS_TOOL, Condition::equal(true)),
            ),
            Box::new(
                CraftItem::new(
                    ActionKey("SplitFirewood"),
                    &[(Item::Logs, 1)],
                    &[(Item::Firewood, 2)],
                )
                .at(Kind::ChoppingBlock)
                .with_tool(0.34),
            ),
            Box::new(Collect::new(
                ActionKey("GatherBranches"),
                Item::Branches,
                1,
                Kind::Branches,
            )),
            Box::new(CraftItem::new(
                ActionKey("BundleBranches"),
                &[(Item::Branches, 2)],
                &[(Item::Firewood, 1)],
            )),
        ],
        Role::Pirate => vec![
            Box::new(
                IncrementItem::new(ActionKey("Train"), Item::Strength, 1, &[Item::Treasure])
                    .with_cost(2.0),
            ),
            Box::new(BashWall::new(config.wall_strength)),
            Box::new(TryToFind::new(ActionKey("DigForKeys"), Item::Keys, Kind::DiggableGround)),
            Box::new(OpenDoor::new()),
            Box::new(
                Collect::new(ActionKey("TakeTreasure"), Item::Treasure, 1, Kind::Treasure)
                    .with_precondition(IN_PART2, Condition::equal(true))
                    .from_stock(),
            ),
        ],
        Role::Creature => vec![
            Box::new(Collect::new(
                ActionKey("PickMushroom"),
                Item::Mushrooms,
                1,
                Kind::MushroomsPile,
            )),
            Box::new(Pray::new(
                ActionKey("Meditate"),
                Item::Nirvana,
                Item::Mushrooms,
                3,
                Kind::Mountain,
            )),
        ],
    }
}
