use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use goap_core::{ActionDef, ActionKey, State, Value, Vec2, WorldEffects, WorldMut, WorldView};

use crate::rng::SplitMix64;

pub const HAS_TOOL: &str = "hasTool";
pub const IN_PART2: &str = "inPart2";
pub const SEARCHED: &str = "searchedHere";
pub const OPEN: &str = "open";

/// Countable things an inventory can hold. Each one is an `Int` fact named after the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Item {
    Logs,
    Firewood,
    Ore,
    NewTool,
    Branches,
    Treasure,
    Keys,
    Strength,
    Nirvana,
    Mushrooms,
}

impl Item {
    pub const ALL: [Item; 10] = [
        Item::Logs,
        Item::Firewood,
        Item::Ore,
        Item::NewTool,
        Item::Branches,
        Item::Treasure,
        Item::Keys,
        Item::Strength,
        Item::Nirvana,
        Item::Mushrooms,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Item::Logs => "Logs",
            Item::Firewood => "Firewood",
            Item::Ore => "Ore",
            Item::NewTool => "NewTool",
            Item::Branches => "Branches",
            Item::Treasure => "Treasure",
            Item::Keys => "Keys",
            Item::Strength => "Strength",
            Item::Nirvana => "Nirvana",
            Item::Mushrooms => "Mushrooms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Worker,
    SupplyPile,
    Tree,
    ChoppingBlock,
    Branches,
    DiggableGround,
    Door,
    BrickWall,
    Treasure,
    Mountain,
    MushroomsPile,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub kind: Kind,
    pub position: Vec2,
    pub facts: State,
    /// What an agent assumes this entity holds until it has been searched.
    pub rumored: Option<State>,
    /// Remaining strength of a carried tool, from 1.0 down to 0.0.
    pub tool_strength: Option<f32>,
}

impl Entity {
    fn new(name: impl Into<String>, kind: Kind, position: Vec2, facts: State) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            facts,
            rumored: None,
            tool_strength: None,
        }
    }

    pub fn count(&self, item: Item) -> i64 {
        self.facts.get_int(item.key()).unwrap_or(0)
    }

    pub fn is_searched(&self) -> bool {
        self.facts.get_bool(SEARCHED).unwrap_or(true)
    }
}

/// A flat world of named entities addressed by `u32` ids.
#[derive(Debug, Default)]
pub struct DemoWorld {
    entities: BTreeMap<u32, Entity>,
    next_id: u32,
    triggers: HashMap<(u32, ActionKey), ActionDef>,
}

impl DemoWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        kind: Kind,
        position: Vec2,
        facts: State,
    ) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.entities
            .insert(id, Entity::new(name, kind, position, facts));
        id
    }

    /// A worker with an empty inventory and no tool.
    pub fn spawn_worker(&mut self, name: impl Into<String>, position: Vec2) -> u32 {
        let mut facts: State = Item::ALL.iter().map(|item| (item.key(), 0)).collect();
        facts.set(HAS_TOOL, false);
        facts.set(IN_PART2, false);
        self.spawn(name, Kind::Worker, position, facts)
    }

    /// A pile whose real contents are rolled from `rng`; until searched it is believed to hold
    /// one of every item in `possible`.
    pub fn spawn_unknown_pile(
        &mut self,
        name: impl Into<String>,
        position: Vec2,
        possible: &[Item],
        chance: f32,
        rng: &mut SplitMix64,
    ) -> u32 {
        let mut facts = State::new().with(SEARCHED, false);
        let mut rumored = State::new();
        for item in possible {
            facts.set(item.key(), i64::from(rng.chance(chance)));
            rumored.set(item.key(), 1);
        }
        let id = self.spawn(name, Kind::DiggableGround, position, facts);
        if let Some(pile) = self.entities.get_mut(&id) {
            pile.rumored = Some(rumored);
        }
        id
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn of_kind(&self, kind: Kind) -> Vec<u32> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Register `def` as owned by `owner`, fired whenever `on` is performed on it.
    pub fn set_trigger(&mut self, owner: u32, on: ActionKey, def: ActionDef) {
        self.triggers.insert((owner, on), def);
    }

    pub fn count(&self, id: u32, item: Item) -> i64 {
        self.entity(id).map_or(0, |entity| entity.count(item))
    }

    /// Apply `effects` to every entity they touch, or to none of them.
    pub fn apply(&mut self, effects: &WorldEffects<u32>) -> Result<()> {
        let mut staged = Vec::with_capacity(effects.len());
        for id in effects.entities() {
            let entity = self
                .entities
                .get(&id)
                .with_context(|| format!("no entity #{id}"))?;
            let facts = effects
                .apply_to(id, &entity.facts)
                .with_context(|| format!("effects do not fit {}", entity.name))?;
            staged.push((id, facts));
        }
        for (id, facts) in staged {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.facts = facts;
            }
        }
        Ok(())
    }

    /// Step `id` toward `to` by at most `step`. Returns `true` once it stands on `to`.
    pub fn move_towards(&mut self, id: u32, to: Vec2, step: f32) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let delta = to - entity.position;
        let dist = delta.length();
        if dist <= step.max(f32::EPSILON) {
            entity.position = to;
            return true;
        }
        entity.position = entity.position + delta * (step / dist);
        false
    }
}

impl WorldView for DemoWorld {
    type Entity = u32;

    fn state(&self, entity: u32) -> Option<State> {
        let entity = self.entities.get(&entity)?;
        let (x, y) = entity.position.truncated();
        Some(entity.facts.clone().with("x", x).with("y", y))
    }

    fn perceived_state(&self, entity: u32) -> Option<State> {
        let mut state = self.state(entity)?;
        if let Some(found) = self.entities.get(&entity) {
            if let (false, Some(rumored)) = (found.is_searched(), &found.rumored) {
                for (key, value) in rumored.iter() {
                    state.set(key.to_owned(), value);
                }
            }
        }
        Some(state)
    }

    fn position(&self, entity: u32) -> Option<Vec2> {
        self.entities.get(&entity).map(|entity| entity.position)
    }

    fn name(&self, entity: u32) -> String {
        self.entities
            .get(&entity)
            .map_or_else(|| format!("#{entity}"), |entity| entity.name.clone())
    }

    fn triggered_action(&self, target: u32, key: ActionKey) -> Option<&ActionDef> {
        self.triggers.get(&(target, key))
    }
}

impl WorldMut for DemoWorld {}

/// Convenience for building facts from an item list.
pub fn inventory(items: &[(Item, i64)]) -> State {
    items
        .iter()
        .map(|(item, count)| (item.key(), Value::Int(*count)))
        .collect()
}

#[cfg(test)]
mod tests {
    use goap_core::{Effect, Effects};

    use super::*;

    #[test]
    fn state_carries_truncated_position() {
        let mut world = DemoWorld::new();
        let id = world.spawn_worker("ann", Vec2::new(2.7, -1.2));
        let state = world.state(id).unwrap();
        assert_eq!(state.get_int("x"), Some(2));
        assert_eq!(state.get_int("y"), Some(-1));
        assert_eq!(state.get_bool(HAS_TOOL), Some(false));
    }

    #[test]
    fn unknown_pile_is_optimistic_until_searched() {
        let mut world = DemoWorld::new();
        let mut rng = SplitMix64::new(1);
        let pile = world.spawn_unknown_pile("dig", Vec2::ZERO, &[Item::Keys], 0.0, &mut rng);

        assert_eq!(world.state(pile).unwrap().get_int("Keys"), Some(0));
        assert_eq!(world.perceived_state(pile).unwrap().get_int("Keys"), Some(1));

        world.entity_mut(pile).unwrap().facts.set(SEARCHED, true);
        assert_eq!(world.perceived_state(pile).unwrap().get_int("Keys"), Some(0));
    }

    #[test]
    fn apply_writes_nothing_when_one_entity_fails() {
        let mut world = DemoWorld::new();
        let ann = world.spawn_worker("ann", Vec2::ZERO);
        let door = world.spawn("door", Kind::Door, Vec2::ZERO, State::new().with(OPEN, false));

        let effects = WorldEffects::new()
            .with(ann, Effects::new().with(Item::Keys.key(), Effect::add(1)))
            .with(door, Effects::new().with(OPEN, Effect::add(1)));
        assert!(world.apply(&effects).is_err());
        assert_eq!(world.count(ann, Item::Keys), 0);
    }

    #[test]
    fn apply_rejects_missing_entities() {
        let mut world = DemoWorld::new();
        let ann = world.spawn_worker("ann", Vec2::ZERO);

        let effects = WorldEffects::new()
            .with(ann, Effects::new().with(Item::Keys.key(), Effect::add(1)))
            .with(99, Effects::new().with(Item::Keys.key(), Effect::subtract(1)));
        let err = world.apply(&effects).unwrap_err();
        assert!(err.to_string().contains("#99"));
        assert_eq!(world.count(ann, Item::Keys), 0);
    }

    #[test]
    fn move_towards_snaps_on_arrival() {
        let mut world = DemoWorld::new();
        let id = world.spawn_worker("ann", Vec2::ZERO);
        let goal = Vec2::new(3.0, 0.0);
        assert!(!world.move_towards(id, goal, 2.0));
        assert!(world.move_towards(id, goal, 2.0));
        assert_eq!(world.position(id), Some(goal));
    }
}
