//! Concrete demo behaviors.
//!
//! Each action keeps its planning model in an [`ActionDef`] and commits the same effects to the
//! world in `on_done`, together with any triggered action the target owns.

use goap_core::{
    do_conditions_apply_to_world, Action, ActionDef, ActionKey, Condition, Effect, FactKey,
    WorldEffects, WorldState, WorldView,
};
use tracing::{debug, warn};

use crate::world::{DemoWorld, Item, Kind, HAS_TOOL, IN_PART2, SEARCHED};

/// Apply `def`'s effects to `agent` and `target`, then the effects of whatever `target` triggers.
/// Nothing is written unless every change fits.
fn commit(def: &ActionDef, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
    let mut effects = WorldEffects::new();
    if !def.effects.is_empty() {
        effects.insert(agent, def.effects.clone());
    }
    if !def.target_effects.is_empty() {
        effects.insert(target, def.target_effects.clone());
    }
    if let Some(trigger) = world.triggered_action(target, def.key) {
        debug!(action = def.name(), trigger = trigger.name(), "triggered action fired");
        for (entity, layer) in trigger.triggered_effects(target, agent).iter() {
            effects.insert(entity, layer.clone());
        }
    }

    match world.apply(&effects) {
        Ok(()) => true,
        Err(err) => {
            let error = format!("{err:#}");
            warn!(action = def.name(), %error, "effects could not be committed");
            false
        }
    }
}

fn targets_of(kind: Option<Kind>, agent: u32, world: &DemoWorld) -> Vec<u32> {
    match kind {
        Some(kind) => world.of_kind(kind),
        None => vec![agent],
    }
}

/// Break through a brick wall once strong enough.
pub struct BashWall {
    def: ActionDef,
}

impl BashWall {
    pub const KEY: ActionKey = ActionKey("BashWall");

    pub fn new(strength_required: i64) -> Self {
        Self {
            def: ActionDef::new(Self::KEY)
                .in_range()
                .with_work_duration(1.0)
                .with_precondition(Item::Strength.key(), Condition::at_least(strength_required))
                .with_effect(IN_PART2, Effect::set(true)),
        }
    }
}

impl Action<DemoWorld> for BashWall {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, _agent: u32, world: &DemoWorld) -> Vec<u32> {
        world.of_kind(Kind::BrickWall)
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        commit(&self.def, agent, target, world)
    }
}

/// Take a fresh tool from a supply pile.
pub struct PickUpTool {
    def: ActionDef,
}

impl PickUpTool {
    pub const KEY: ActionKey = ActionKey("PickUpTool");

    pub fn new() -> Self {
        Self {
            def: ActionDef::new(Self::KEY)
                .in_range()
                .with_work_duration(0.5)
                .with_precondition(HAS_TOOL, Condition::equal(false))
                .with_effect(HAS_TOOL, Effect::set(true))
                .with_target_precondition(Item::NewTool.key(), Condition::more_than(0))
                .with_target_effect(Item::NewTool.key(), Effect::subtract(1)),
        }
    }
}

impl Default for PickUpTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Action<DemoWorld> for PickUpTool {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, _agent: u32, world: &DemoWorld) -> Vec<u32> {
        world.of_kind(Kind::SupplyPile)
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        // Someone else may have emptied the pile while we were working.
        if world.count(target, Item::NewTool) == 0 {
            return false;
        }
        if !commit(&self.def, agent, target, world) {
            return false;
        }
        if let Some(worker) = world.entity_mut(agent) {
            worker.tool_strength = Some(1.0);
        }
        true
    }
}

/// Turn ingredients into products, optionally at a station and wearing down a tool.
pub struct CraftItem {
    def: ActionDef,
    station: Option<Kind>,
    tool_damage: Option<f32>,
}

impl CraftItem {
    /// A recipe that can be made anywhere, bare-handed.
    ///
    /// A product the agent already holds enough of blocks the recipe.
    pub fn new(key: ActionKey, ingredients: &[(Item, i64)], products: &[(Item, i64)]) -> Self {
        let mut def = ActionDef::new(key).with_work_duration(1.0);
        for (item, amount) in ingredients {
            def = def
                .with_precondition(item.key(), Condition::at_least(*amount))
                .with_effect(item.key(), Effect::subtract(*amount));
        }
        for (item, amount) in products {
            def = def
                .with_precondition(item.key(), Condition::less_than(*amount))
                .with_effect(item.key(), Effect::add(*amount));
        }
        Self {
            def,
            station: None,
            tool_damage: None,
        }
    }

    pub fn at(mut self, station: Kind) -> Self {
        self.station = Some(station);
        self.def = self.def.in_range();
        self
    }

    /// Require a tool and wear it down by `damage` (a fraction of a fresh tool) per use.
    pub fn with_tool(mut self, damage: f32) -> Self {
        self.tool_damage = Some(damage);
        self.def = self.def.with_precondition(HAS_TOOL, Condition::equal(true));
        self
    }
}

impl Action<DemoWorld> for CraftItem {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, agent: u32, world: &DemoWorld) -> Vec<u32> {
        targets_of(self.station, agent, world)
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        if !commit(&self.def, agent, target, world) {
            return false;
        }
        let Some(damage) = self.tool_damage else {
            return true;
        };
        let Some(worker) = world.entity_mut(agent) else {
            return false;
        };
        let strength = worker.tool_strength.unwrap_or(0.0) - damage;
        if strength <= 0.0 {
            debug!(worker = %worker.name, "tool broke");
            worker.tool_strength = None;
            worker.facts.set(HAS_TOOL, false);
        } else {
            worker.tool_strength = Some(strength);
        }
        true
    }
}

/// Gather a resource at a point of interest.
pub struct Collect {
    def: ActionDef,
    source: Kind,
    from_stock: bool,
}

impl Collect {
    pub fn new(key: ActionKey, resource: Item, amount: i64, source: Kind) -> Self {
        Self {
            def: ActionDef::new(key)
                .in_range()
                .with_work_duration(1.0)
                .with_effect(resource.key(), Effect::add(amount)),
            source,
            from_stock: false,
        }
    }

    pub fn with_precondition(mut self, key: impl Into<FactKey>, condition: Condition) -> Self {
        self.def = self.def.with_precondition(key, condition);
        self
    }

    /// The source holds a finite amount of the resource and gives it up.
    pub fn from_stock(mut self) -> Self {
        let effects: Vec<_> = self
            .def
            .effects
            .iter()
            .map(|(key, effect)| (key.to_owned(), *effect))
            .collect();
        for (key, effect) in effects {
            self.def = self
                .def
                .with_target_precondition(key.clone(), Condition::at_least(effect.value))
                .with_target_effect(key, Effect::subtract(effect.value));
        }
        self.from_stock = true;
        self
    }
}

impl Action<DemoWorld> for Collect {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, _agent: u32, world: &DemoWorld) -> Vec<u32> {
        world.of_kind(self.source)
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        if self.from_stock && !self.can_do_now(agent, target, world) {
            return false;
        }
        commit(&self.def, agent, target, world)
    }
}

/// Raise a stat on the agent itself, e.g. training strength.
pub struct IncrementItem {
    def: ActionDef,
}

impl IncrementItem {
    pub fn new(key: ActionKey, resource: Item, amount: i64, unless_has: &[Item]) -> Self {
        let mut def = ActionDef::new(key)
            .with_work_duration(0.5)
            .with_effect(resource.key(), Effect::add(amount));
        for item in unless_has {
            def = def.with_precondition(item.key(), Condition::equal(0));
        }
        Self { def }
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.def = self.def.with_cost(cost);
        self
    }
}

impl Action<DemoWorld> for IncrementItem {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        commit(&self.def, agent, target, world)
    }
}

/// Spend a resource at a meditation point to earn an achievement.
pub struct Pray {
    def: ActionDef,
    place: Kind,
}

impl Pray {
    pub fn new(
        key: ActionKey,
        achievement: Item,
        resource: Item,
        needed: i64,
        place: Kind,
    ) -> Self {
        Self {
            def: ActionDef::new(key)
                .in_range()
                .with_work_duration(2.0)
                .with_precondition(resource.key(), Condition::at_least(needed))
                .with_effect(resource.key(), Effect::subtract(needed))
                .with_effect(achievement.key(), Effect::set(1)),
            place,
        }
    }
}

impl Action<DemoWorld> for Pray {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, _agent: u32, world: &DemoWorld) -> Vec<u32> {
        world.of_kind(self.place)
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        commit(&self.def, agent, target, world)
    }
}

/// Search an unknown pile for `item`.
///
/// Planning uses the pile's rumored contents. The pile is marked searched whatever it held, so a
/// failed search aborts the plan and the next plan sees the truth.
pub struct TryToFind {
    def: ActionDef,
    item: Item,
    place: Kind,
}

impl TryToFind {
    pub fn new(key: ActionKey, item: Item, place: Kind) -> Self {
        Self {
            def: ActionDef::new(key)
                .in_range()
                .with_work_duration(1.5)
                .with_effect(item.key(), Effect::add(1))
                .with_target_precondition(item.key(), Condition::at_least(1))
                .with_target_precondition(SEARCHED, Condition::equal(false))
                .with_target_effect(item.key(), Effect::subtract(1))
                .with_target_effect(SEARCHED, Effect::set(true)),
            item,
            place,
        }
    }
}

impl Action<DemoWorld> for TryToFind {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, _agent: u32, world: &DemoWorld) -> Vec<u32> {
        world.of_kind(self.place)
    }

    /// Searching only needs an unsearched pile; whether it holds anything is found out by doing.
    fn can_do_now(&self, _agent: u32, target: u32, world: &DemoWorld) -> bool {
        world.entity(target).is_some_and(|pile| !pile.is_searched())
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        if world.count(target, self.item) >= 1 {
            return commit(&self.def, agent, target, world);
        }
        if let Some(pile) = world.entity_mut(target) {
            pile.facts.set(SEARCHED, true);
        }
        debug!(pile = %world.name(target), item = self.item.key(), "nothing found");
        false
    }
}

/// Walk through a door with a key. The door owns the effects of being unlocked.
pub struct OpenDoor {
    def: ActionDef,
}

impl OpenDoor {
    pub const KEY: ActionKey = ActionKey("OpenDoor");

    pub fn new() -> Self {
        Self {
            def: ActionDef::new(Self::KEY)
                .in_range()
                .with_work_duration(0.5)
                .with_precondition(Item::Keys.key(), Condition::at_least(1))
                .with_effect(IN_PART2, Effect::set(true)),
        }
    }
}

impl Default for OpenDoor {
    fn default() -> Self {
        Self::new()
    }
}

impl Action<DemoWorld> for OpenDoor {
    fn def(&self) -> &ActionDef {
        &self.def
    }

    fn targets(&self, _agent: u32, world: &DemoWorld) -> Vec<u32> {
        world.of_kind(Kind::Door)
    }

    fn can_do_now(&self, agent: u32, target: u32, world: &DemoWorld) -> bool {
        let Some(trigger) = world.triggered_action(target, self.def.key) else {
            return true;
        };
        let conditions = trigger.triggered_preconditions(target, agent);
        let mut state = WorldState::new();
        state.insert(agent, world.state(agent).unwrap_or_default());
        state.insert(target, world.state(target).unwrap_or_default());
        do_conditions_apply_to_world(&conditions, &mut state, world)
    }

    fn on_done(&self, agent: u32, target: u32, world: &mut DemoWorld) -> bool {
        commit(&self.def, agent, target, world)
    }
}
