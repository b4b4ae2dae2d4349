/// States of the agent execution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// Pick a goal and plan for it.
    Idle,
    /// Run the head of the action queue.
    PerformAction,
    /// Walk to the head action's target.
    MoveTo,
}

/// What a state handler wants the machine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    Stay,
    Push(S),
    Pop,
    Replace(S),
    /// Drop the whole stack and start over in `S`.
    Reset(S),
}

/// Stack-based finite state machine.
///
/// The top of the stack is the active state. Nested states (moving within an action) push
/// themselves and pop back to their caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFsm<S> {
    stack: Vec<S>,
}

impl<S: Copy> StackFsm<S> {
    pub fn new(initial: S) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    pub fn current(&self) -> Option<S> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, state: S) {
        self.stack.push(state);
    }

    pub fn pop(&mut self) -> Option<S> {
        self.stack.pop()
    }

    pub fn replace(&mut self, state: S) {
        self.stack.pop();
        self.stack.push(state);
    }

    pub fn reset(&mut self, state: S) {
        self.stack.clear();
        self.stack.push(state);
    }

    /// Apply `transition` and return the new active state.
    pub fn apply(&mut self, transition: Transition<S>) -> Option<S> {
        match transition {
            Transition::Stay => {}
            Transition::Push(state) => self.push(state),
            Transition::Pop => {
                self.pop();
            }
            Transition::Replace(state) => self.replace(state),
            Transition::Reset(state) => self.reset(state),
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_nests_inside_perform_action() {
        let mut fsm = StackFsm::new(AgentState::Idle);
        assert_eq!(
            fsm.apply(Transition::Replace(AgentState::PerformAction)),
            Some(AgentState::PerformAction)
        );
        assert_eq!(
            fsm.apply(Transition::Push(AgentState::MoveTo)),
            Some(AgentState::MoveTo)
        );
        assert_eq!(fsm.depth(), 2);
        assert_eq!(fsm.apply(Transition::Pop), Some(AgentState::PerformAction));
        assert_eq!(fsm.apply(Transition::Stay), Some(AgentState::PerformAction));
    }

    #[test]
    fn reset_unwinds_the_whole_stack() {
        let mut fsm = StackFsm::new(AgentState::PerformAction);
        fsm.push(AgentState::MoveTo);
        assert_eq!(fsm.apply(Transition::Reset(AgentState::Idle)), Some(AgentState::Idle));
        assert_eq!(fsm.depth(), 1);
    }
}
