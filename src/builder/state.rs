//! Fluent configuration of a single state.

use super::error::ConfigError;
use crate::core::{
    ActivationAction, Args, BoxError, FireContext, GuardConditions, State, Transition,
    TransitionAction, Trigger,
};
use crate::graph::{DestinationSelector, NodeId, StateGraph, TriggerBehaviour};

/// Handle returned by [`StateMachine::configure`](crate::machine::StateMachine::configure).
///
/// Methods consume and return the handle so calls chain. Methods that can
/// detect a structural mistake return `Result<Self, ConfigError<S>>`.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::Guard;
/// use nested_fsm::machine::StateMachine;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door { Open, Closed, Locked }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Action { Close, Lock, Knock }
///
/// let mut door = StateMachine::new(Door::Open);
/// door.configure(Door::Open)
///     .permit(Action::Close, Door::Closed)
///     .unwrap();
/// door.configure(Door::Closed)
///     .permit_if(Action::Lock, Door::Locked, Guard::new("has key", |_, _| true))
///     .unwrap()
///     .ignore(Action::Knock);
///
/// assert_eq!(door.configure(Door::Closed).state(), &Door::Closed);
/// ```
pub struct StateConfiguration<'m, S: State, T: Trigger> {
    graph: &'m mut StateGraph<S, T>,
    node: NodeId,
}

impl<'m, S: State, T: Trigger> StateConfiguration<'m, S, T> {
    pub(crate) fn new(graph: &'m mut StateGraph<S, T>, state: S) -> Self {
        let node = graph.get_or_insert(state);
        Self { graph, node }
    }

    /// The state being configured.
    pub fn state(&self) -> &S {
        &self.graph.node(self.node).state
    }

    /// Transition to `destination` when `trigger` fires.
    pub fn permit(self, trigger: T, destination: S) -> Result<Self, ConfigError<S>> {
        self.permit_if(trigger, destination, GuardConditions::none())
    }

    /// Transition to `destination` when `trigger` fires and every guard passes.
    pub fn permit_if(
        mut self,
        trigger: T,
        destination: S,
        guard: impl Into<GuardConditions>,
    ) -> Result<Self, ConfigError<S>> {
        if destination == *self.state() {
            return Err(ConfigError::SelfTransition { state: destination });
        }
        self.graph.get_or_insert(destination.clone());
        Ok(self.behaviour(
            trigger,
            TriggerBehaviour::Transitioning {
                destination,
                guard: guard.into(),
            },
        ))
    }

    /// Exit and re-enter this state when `trigger` fires.
    pub fn permit_reentry(self, trigger: T) -> Self {
        self.permit_reentry_if(trigger, GuardConditions::none())
    }

    /// Like [`permit_reentry`](Self::permit_reentry), but only when `guard`
    /// passes.
    pub fn permit_reentry_if(self, trigger: T, guard: impl Into<GuardConditions>) -> Self {
        let destination = self.state().clone();
        self.behaviour(
            trigger,
            TriggerBehaviour::Reentry {
                destination,
                guard: guard.into(),
            },
        )
    }

    /// Transition to a destination computed from the trigger's arguments.
    ///
    /// When the selector returns this same state the transition behaves as
    /// a reentry.
    pub fn permit_dynamic<F>(self, trigger: T, selector: F) -> Self
    where
        F: Fn(&FireContext, &Args) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        self.permit_dynamic_if(trigger, selector, GuardConditions::none())
    }

    /// Like [`permit_dynamic`](Self::permit_dynamic), but only when `guard`
    /// passes. The selector runs after the guard.
    pub fn permit_dynamic_if<F>(
        self,
        trigger: T,
        selector: F,
        guard: impl Into<GuardConditions>,
    ) -> Self
    where
        F: Fn(&FireContext, &Args) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        self.behaviour(
            trigger,
            TriggerBehaviour::Dynamic {
                selector: DestinationSelector::new(selector),
                guard: guard.into(),
            },
        )
    }

    /// Run `action` without leaving the state. No entry or exit actions run
    /// and transition observers are not notified.
    pub fn internal_transition<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.internal_transition_if(trigger, action, GuardConditions::none())
    }

    /// Like [`internal_transition`](Self::internal_transition), but only
    /// when `guard` passes.
    pub fn internal_transition_if<F>(
        self,
        trigger: T,
        action: F,
        guard: impl Into<GuardConditions>,
    ) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.behaviour(
            trigger,
            TriggerBehaviour::Internal {
                action: TransitionAction::new(action),
                guard: guard.into(),
            },
        )
    }

    /// Accept `trigger` and do nothing.
    pub fn ignore(self, trigger: T) -> Self {
        self.ignore_if(trigger, GuardConditions::none())
    }

    /// Accept `trigger` and do nothing while `guard` passes. When it is
    /// rejected the trigger falls through to the superstate.
    pub fn ignore_if(self, trigger: T, guard: impl Into<GuardConditions>) -> Self {
        self.behaviour(
            trigger,
            TriggerBehaviour::Ignored {
                guard: guard.into(),
            },
        )
    }

    /// Run `action` whenever the state is entered.
    pub fn on_entry<F>(self, action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.entry_action(TransitionAction::new(action))
    }

    /// Run `action` only when the state is entered because of `trigger`.
    pub fn on_entry_from<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.entry_action(TransitionAction::from_trigger(trigger, action))
    }

    /// Append a prebuilt entry action, e.g. one with a readable description.
    pub fn entry_action(mut self, action: TransitionAction<S, T>) -> Self {
        self.graph.node_mut(self.node).entry_actions.push(action);
        self
    }

    /// Run `action` whenever the state is exited.
    pub fn on_exit<F>(self, action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.exit_action(TransitionAction::new(action))
    }

    /// Run `action` only when the state is exited because of `trigger`.
    pub fn on_exit_with<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.exit_action(TransitionAction::from_trigger(trigger, action))
    }

    /// Append a prebuilt exit action.
    pub fn exit_action(mut self, action: TransitionAction<S, T>) -> Self {
        self.graph.node_mut(self.node).exit_actions.push(action);
        self
    }

    /// Run `action` when the machine is activated while in this state or
    /// one of its substates. Superstates activate first.
    pub fn on_activate<F>(mut self, action: F) -> Self
    where
        F: Fn(&FireContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.graph
            .node_mut(self.node)
            .activate_actions
            .push(ActivationAction::new(action));
        self
    }

    /// Run `action` when the machine is deactivated while in this state or
    /// one of its substates. Substates deactivate first.
    pub fn on_deactivate<F>(mut self, action: F) -> Self
    where
        F: Fn(&FireContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.graph
            .node_mut(self.node)
            .deactivate_actions
            .push(ActivationAction::new(action));
        self
    }

    /// Nest this state under `superstate`, moving it out of any previous
    /// superstate.
    pub fn substate_of(mut self, superstate: S) -> Result<Self, ConfigError<S>> {
        let parent = self.graph.get_or_insert(superstate.clone());
        if parent == self.node || self.graph.includes(self.node, &superstate) {
            return Err(ConfigError::CyclicSuperstate {
                state: self.state().clone(),
                superstate,
            });
        }
        self.graph.link(self.node, parent);
        Ok(self)
    }

    /// Descend into `target` whenever this state is entered.
    ///
    /// `target` must end up a descendant of this state; that is checked
    /// when the transition happens, since substates may be declared later.
    /// Any states between this one and `target` are entered on the way down.
    pub fn initial_transition(mut self, target: S) -> Result<Self, ConfigError<S>> {
        let node = self.graph.node(self.node);
        if target == node.state {
            return Err(ConfigError::SelfInitialTransition { state: target });
        }
        if let Some(existing) = &node.initial_transition {
            return Err(ConfigError::DuplicateInitialTransition {
                state: node.state.clone(),
                existing: existing.clone(),
            });
        }
        self.graph.get_or_insert(target.clone());
        self.graph.node_mut(self.node).initial_transition = Some(target);
        Ok(self)
    }

    fn behaviour(mut self, trigger: T, behaviour: TriggerBehaviour<S, T>) -> Self {
        self.graph.node_mut(self.node).add_behaviour(trigger, behaviour);
        self
    }
}
