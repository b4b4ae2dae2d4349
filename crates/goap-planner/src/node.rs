use goap_core::{ActionKey, EntityId, WorldState, WorldView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// The action application that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<E: EntityId> {
    pub action: usize,
    pub key: ActionKey,
    pub target: E,
}

#[derive(Debug, Clone)]
pub struct Node<E: EntityId> {
    pub parent: Option<NodeId>,
    /// Cost to reach this node.
    pub running_cost: f32,
    pub heuristic: f32,
    pub state: WorldState<E>,
    pub step: Option<Step<E>>,
}

impl<E: EntityId> Node<E> {
    /// `f = g + h`, the frontier priority.
    pub fn score(&self) -> f32 {
        self.running_cost + self.heuristic
    }
}

/// Search nodes of one planning call, addressed by [`NodeId`].
///
/// The arena is owned by the planner and cleared at the start of each search; capacity is kept
/// so repeated searches stop allocating once warmed up.
#[derive(Debug, Clone)]
pub struct NodeArena<E: EntityId> {
    nodes: Vec<Node<E>>,
}

impl<E: EntityId> Default for NodeArena<E> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<E: EntityId> NodeArena<E> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn push(&mut self, node: Node<E>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node<E> {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<E> {
        &mut self.nodes[id.0]
    }

    /// Steps from the root to `id`, in execution order.
    pub fn path(&self, id: NodeId) -> Vec<Step<E>> {
        let mut steps = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id);
            if let Some(step) = node.step {
                steps.push(step);
            }
            current = node.parent;
        }
        steps.reverse();
        steps
    }

    pub fn path_to_string<W>(&self, id: NodeId, world: &W) -> String
    where
        W: WorldView<Entity = E>,
    {
        self.path(id)
            .iter()
            .map(|step| format!("{}@{}>", step.key.0, world.name(step.target)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(parent: Option<NodeId>, step: Option<Step<u64>>) -> Node<u64> {
        Node {
            parent,
            running_cost: 0.0,
            heuristic: 0.0,
            state: WorldState::new(),
            step,
        }
    }

    #[test]
    fn path_walks_back_to_the_root() {
        let mut arena = NodeArena::default();
        let root = arena.push(node(None, None));
        let first = arena.push(node(
            Some(root),
            Some(Step {
                action: 0,
                key: ActionKey("A"),
                target: 1,
            }),
        ));
        let second = arena.push(node(
            Some(first),
            Some(Step {
                action: 1,
                key: ActionKey("B"),
                target: 2,
            }),
        ));

        let keys: Vec<_> = arena.path(second).iter().map(|s| s.key).collect();
        assert_eq!(keys, vec![ActionKey("A"), ActionKey("B")]);
        assert!(arena.path(root).is_empty());
    }

    #[test]
    fn score_adds_cost_and_estimate() {
        let mut n = node(None, None);
        n.running_cost = 2.5;
        n.heuristic = 1.5;
        assert_eq!(n.score(), 4.0);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut arena = NodeArena::with_capacity(8);
        arena.push(node(None, None));
        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.capacity() >= 8);
    }
}
