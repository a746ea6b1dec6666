//! Read-only description of a configured machine.
//!
//! [`StateMachine::info`] walks the state graph and returns plain data that
//! renderers, documentation generators or tests can inspect. Every type
//! here implements `Serialize` when the state and trigger types do.

use crate::core::{State, TransitionAction, Trigger};
use crate::graph::{StateNode, TriggerBehaviour};
use crate::machine::{FireError, StateMachine};
use serde::Serialize;

/// Snapshot of a machine's configuration.
#[derive(Clone, Debug, Serialize)]
pub struct StateMachineInfo<S, T> {
    pub current_state: S,
    pub states: Vec<StateInfo<S, T>>,
    pub state_type: &'static str,
    pub trigger_type: &'static str,
}

impl<S: PartialEq, T> StateMachineInfo<S, T> {
    /// Look up the description of `state`.
    pub fn state(&self, state: &S) -> Option<&StateInfo<S, T>> {
        self.states.iter().find(|info| info.state == *state)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StateInfo<S, T> {
    pub state: S,
    pub superstate: Option<S>,
    pub substates: Vec<S>,
    pub initial_transition: Option<S>,
    pub entry_actions: Vec<ActionInfo<T>>,
    pub exit_actions: Vec<ActionInfo<T>>,
    pub activate_actions: Vec<String>,
    pub deactivate_actions: Vec<String>,
    pub transitions: Vec<TransitionInfo<S, T>>,
}

/// An entry, exit or internal action.
#[derive(Clone, Debug, Serialize)]
pub struct ActionInfo<T> {
    pub description: String,
    /// Set when the action only runs for transitions caused by this trigger.
    pub trigger: Option<T>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Fixed,
    Reentry,
    Dynamic,
    Internal,
    Ignored,
}

#[derive(Clone, Debug, Serialize)]
pub struct TransitionInfo<S, T> {
    pub trigger: T,
    pub kind: TransitionKind,
    /// Known for fixed and reentry transitions only.
    pub destination: Option<S>,
    pub guards: Vec<String>,
    /// Destination selector or internal action, when there is one.
    pub description: Option<String>,
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Describe every configured state. Nothing is executed: guards are
    /// reported by description, not evaluated.
    pub fn info(&self) -> Result<StateMachineInfo<S, T>, FireError<S, T>> {
        let graph = self.graph();
        let state_of = |id: usize| graph.node(id).state.clone();

        let states = graph
            .nodes()
            .map(|node| StateInfo {
                state: node.state.clone(),
                superstate: node.superstate.map(state_of),
                substates: node.substates.iter().copied().map(state_of).collect(),
                initial_transition: node.initial_transition.clone(),
                entry_actions: actions(&node.entry_actions),
                exit_actions: actions(&node.exit_actions),
                activate_actions: node
                    .activate_actions
                    .iter()
                    .map(|action| action.description().to_string())
                    .collect(),
                deactivate_actions: node
                    .deactivate_actions
                    .iter()
                    .map(|action| action.description().to_string())
                    .collect(),
                transitions: transitions(node),
            })
            .collect();

        Ok(StateMachineInfo {
            current_state: self.state()?,
            states,
            state_type: std::any::type_name::<S>(),
            trigger_type: std::any::type_name::<T>(),
        })
    }
}

fn actions<S: State, T: Trigger>(actions: &[TransitionAction<S, T>]) -> Vec<ActionInfo<T>> {
    actions
        .iter()
        .map(|action| ActionInfo {
            description: action.description().to_string(),
            trigger: action.trigger().cloned(),
        })
        .collect()
}

fn transitions<S: State, T: Trigger>(node: &StateNode<S, T>) -> Vec<TransitionInfo<S, T>> {
    node.triggers()
        .flat_map(|(trigger, behaviours)| {
            behaviours.iter().map(move |behaviour| {
                let (kind, destination, description) = match behaviour {
                    TriggerBehaviour::Transitioning { destination, .. } => {
                        (TransitionKind::Fixed, Some(destination.clone()), None)
                    }
                    TriggerBehaviour::Reentry { destination, .. } => {
                        (TransitionKind::Reentry, Some(destination.clone()), None)
                    }
                    TriggerBehaviour::Dynamic { selector, .. } => {
                        (TransitionKind::Dynamic, None, Some(selector.description.clone()))
                    }
                    TriggerBehaviour::Internal { action, .. } => (
                        TransitionKind::Internal,
                        None,
                        Some(action.description().to_string()),
                    ),
                    TriggerBehaviour::Ignored { .. } => (TransitionKind::Ignored, None, None),
                };
                TransitionInfo {
                    trigger: trigger.clone(),
                    kind,
                    destination,
                    guards: behaviour.guard().descriptions(),
                    description,
                }
            })
        })
        .collect()
}
