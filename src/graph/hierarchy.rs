//! Arena of state nodes and the hierarchical walks over it.

use super::node::{NodeId, StateNode};
use crate::core::{BoxError, FireContext, State, Transition, Trigger};
use std::collections::HashMap;
use tracing::trace;

/// Registry of every state referenced by configuration.
///
/// Nodes are created lazily on first reference and never removed, so a
/// [`NodeId`] stays valid for the lifetime of the graph.
pub(crate) struct StateGraph<S: State, T: Trigger> {
    nodes: Vec<StateNode<S, T>>,
    index: HashMap<S, NodeId>,
}

impl<S: State, T: Trigger> Default for StateGraph<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Trigger> StateGraph<S, T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn node_id(&self, state: &S) -> Option<NodeId> {
        self.index.get(state).copied()
    }

    pub(crate) fn node(&self, id: NodeId) -> &StateNode<S, T> {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut StateNode<S, T> {
        &mut self.nodes[id]
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &StateNode<S, T>> {
        self.nodes.iter()
    }

    /// Id of the node for `state`, creating it on first reference.
    pub(crate) fn get_or_insert(&mut self, state: S) -> NodeId {
        if let Some(id) = self.index.get(&state) {
            return *id;
        }
        let id = self.nodes.len();
        self.nodes.push(StateNode::new(state.clone()));
        self.index.insert(state, id);
        id
    }

    /// Whether `state` is the node's own state or that of any descendant.
    pub(crate) fn includes(&self, id: NodeId, state: &S) -> bool {
        let node = &self.nodes[id];
        node.state == *state
            || node
                .substates
                .iter()
                .any(|substate| self.includes(*substate, state))
    }

    /// Whether the node is `state` or sits anywhere below it.
    pub(crate) fn is_included_in(&self, id: NodeId, state: &S) -> bool {
        self.ancestors(id).any(|ancestor| self.nodes[ancestor].state == *state)
    }

    /// The node itself followed by each superstate, innermost first.
    pub(crate) fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.nodes[*current].superstate)
    }

    /// Make `parent` the superstate of `child`, detaching it from any
    /// previous superstate. Cycle checks belong to the caller.
    pub(crate) fn link(&mut self, child: NodeId, parent: NodeId) {
        if let Some(previous) = self.nodes[child].superstate.take() {
            self.nodes[previous].substates.retain(|substate| *substate != child);
        }
        self.nodes[child].superstate = Some(parent);
        if !self.nodes[parent].substates.contains(&child) {
            self.nodes[parent].substates.push(child);
        }
    }

    /// Run entry actions for arriving at node `id`.
    ///
    /// Superstates that are not already active are entered first, outermost
    /// to innermost. An initial-transition descent never re-enters the
    /// state it descends from, but does enter any states between that state
    /// and its target.
    pub(crate) fn enter(
        &self,
        id: NodeId,
        ctx: &FireContext,
        transition: &Transition<S, T>,
    ) -> Result<(), BoxError> {
        let node = &self.nodes[id];
        if transition.is_reentry() {
            trace!(state = ?node.state, "re-entering state");
            return node.execute_entry_actions(ctx, transition);
        }
        if self.includes(id, &transition.source) {
            return Ok(());
        }
        if let Some(superstate) = node.superstate {
            let declaring =
                transition.is_initial() && self.nodes[superstate].state == transition.source;
            if !declaring {
                self.enter(superstate, ctx, transition)?;
            }
        }
        trace!(state = ?node.state, "entering state");
        node.execute_entry_actions(ctx, transition)
    }

    /// Run exit actions for leaving node `id`, innermost to outermost,
    /// stopping at the first superstate that contains the destination.
    pub(crate) fn exit(
        &self,
        id: NodeId,
        ctx: &FireContext,
        transition: &Transition<S, T>,
    ) -> Result<(), BoxError> {
        let node = &self.nodes[id];
        if transition.is_reentry() {
            trace!(state = ?node.state, "exiting state for reentry");
            return node.execute_exit_actions(ctx, transition);
        }
        if self.includes(id, &transition.destination) {
            return Ok(());
        }
        trace!(state = ?node.state, "exiting state");
        node.execute_exit_actions(ctx, transition)?;
        match node.superstate {
            Some(superstate) => self.exit(superstate, ctx, transition),
            None => Ok(()),
        }
    }

    /// Activate the node, outermost superstate first.
    pub(crate) fn activate(&self, id: NodeId, ctx: &FireContext) -> Result<(), BoxError> {
        let node = &self.nodes[id];
        if let Some(superstate) = node.superstate {
            self.activate(superstate, ctx)?;
        }
        node.execute_activate_actions(ctx)
    }

    /// Deactivate the node, then each superstate outwards.
    pub(crate) fn deactivate(&self, id: NodeId, ctx: &FireContext) -> Result<(), BoxError> {
        let node = &self.nodes[id];
        node.execute_deactivate_actions(ctx)?;
        match node.superstate {
            Some(superstate) => self.deactivate(superstate, ctx),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActivationAction, Args, TransitionAction};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Root,
        Parent,
        Child,
        Other,
    }

    type Log = Arc<Mutex<Vec<String>>>;

    /// Root > Parent > Child, plus an unrelated Other; every node logs its
    /// entry, exit, activation and deactivation.
    fn graph(log: &Log) -> StateGraph<TestState, &'static str> {
        let mut graph = StateGraph::new();
        let root = graph.get_or_insert(TestState::Root);
        let parent = graph.get_or_insert(TestState::Parent);
        let child = graph.get_or_insert(TestState::Child);
        graph.get_or_insert(TestState::Other);
        graph.link(parent, root);
        graph.link(child, parent);

        for id in 0..4 {
            let name = format!("{:?}", graph.node(id).state);
            let node = graph.node_mut(id);
            for (kind, list) in [("Enter", &mut node.entry_actions), ("Exit", &mut node.exit_actions)] {
                let log = Arc::clone(log);
                let entry = format!("{kind}{name}");
                list.push(TransitionAction::new(move |_, _| {
                    log.lock().unwrap().push(entry.clone());
                    Ok(())
                }));
            }
            for (kind, list) in [
                ("Activate", &mut node.activate_actions),
                ("Deactivate", &mut node.deactivate_actions),
            ] {
                let log = Arc::clone(log);
                let entry = format!("{kind}{name}");
                list.push(ActivationAction::new(move |_| {
                    log.lock().unwrap().push(entry.clone());
                    Ok(())
                }));
            }
        }
        graph
    }

    fn id(graph: &StateGraph<TestState, &'static str>, state: TestState) -> NodeId {
        graph.node_id(&state).unwrap()
    }

    fn transition(source: TestState, destination: TestState) -> Transition<TestState, &'static str> {
        Transition::new(source, destination, "go", Args::none())
    }

    #[test]
    fn includes_covers_descendants() {
        let log = Log::default();
        let graph = graph(&log);
        let root = id(&graph, TestState::Root);

        assert!(graph.includes(root, &TestState::Child));
        assert!(graph.includes(root, &TestState::Root));
        assert!(!graph.includes(root, &TestState::Other));
        assert!(!graph.includes(id(&graph, TestState::Child), &TestState::Parent));
    }

    #[test]
    fn is_included_in_walks_ancestors() {
        let log = Log::default();
        let graph = graph(&log);
        let child = id(&graph, TestState::Child);

        assert!(graph.is_included_in(child, &TestState::Root));
        assert!(graph.is_included_in(child, &TestState::Child));
        assert!(!graph.is_included_in(child, &TestState::Other));
    }

    #[test]
    fn entering_nested_state_enters_superstates_first() {
        let log = Log::default();
        let graph = graph(&log);

        graph
            .enter(
                id(&graph, TestState::Child),
                &FireContext::new(),
                &transition(TestState::Other, TestState::Child),
            )
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["EnterRoot", "EnterParent", "EnterChild"]);
    }

    #[test]
    fn exiting_nested_state_exits_substates_first() {
        let log = Log::default();
        let graph = graph(&log);

        graph
            .exit(
                id(&graph, TestState::Child),
                &FireContext::new(),
                &transition(TestState::Child, TestState::Other),
            )
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["ExitChild", "ExitParent", "ExitRoot"]);
    }

    #[test]
    fn exit_stops_at_common_superstate() {
        let log = Log::default();
        let graph = graph(&log);

        graph
            .exit(
                id(&graph, TestState::Child),
                &FireContext::new(),
                &transition(TestState::Child, TestState::Parent),
            )
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["ExitChild"]);
    }

    #[test]
    fn entering_superstate_from_substate_runs_nothing() {
        let log = Log::default();
        let graph = graph(&log);

        graph
            .enter(
                id(&graph, TestState::Parent),
                &FireContext::new(),
                &transition(TestState::Child, TestState::Parent),
            )
            .unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn reentry_runs_only_own_actions() {
        let log = Log::default();
        let graph = graph(&log);
        let child = id(&graph, TestState::Child);
        let reentry = transition(TestState::Child, TestState::Child);

        graph.exit(child, &FireContext::new(), &reentry).unwrap();
        graph.enter(child, &FireContext::new(), &reentry).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["ExitChild", "EnterChild"]);
    }

    #[test]
    fn initial_descent_skips_superstates() {
        let log = Log::default();
        let graph = graph(&log);
        let descent = Transition::initial(TestState::Parent, TestState::Child, "go", Args::none());

        graph
            .enter(id(&graph, TestState::Child), &FireContext::new(), &descent)
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["EnterChild"]);
    }

    #[test]
    fn initial_descent_to_grandchild_enters_intermediate_states() {
        let log = Log::default();
        let graph = graph(&log);
        let descent = Transition::initial(TestState::Root, TestState::Child, "go", Args::none());

        graph
            .enter(id(&graph, TestState::Child), &FireContext::new(), &descent)
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["EnterParent", "EnterChild"]);
    }

    #[test]
    fn activation_order_mirrors_deactivation() {
        let log = Log::default();
        let graph = graph(&log);
        let child = id(&graph, TestState::Child);

        graph.activate(child, &FireContext::new()).unwrap();
        graph.deactivate(child, &FireContext::new()).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "ActivateRoot",
                "ActivateParent",
                "ActivateChild",
                "DeactivateChild",
                "DeactivateParent",
                "DeactivateRoot",
            ]
        );
    }

    #[test]
    fn relinking_detaches_from_previous_superstate() {
        let log = Log::default();
        let mut graph = graph(&log);
        let child = id(&graph, TestState::Child);
        let parent = id(&graph, TestState::Parent);
        let other = id(&graph, TestState::Other);

        graph.link(child, other);

        assert!(!graph.node(parent).substates.contains(&child));
        assert_eq!(graph.node(child).superstate, Some(other));
        assert!(graph.includes(other, &TestState::Child));
    }
}
