//! A single state's configured behaviour.

use super::behaviour::TriggerBehaviour;
use crate::core::{ActivationAction, BoxError, FireContext, State, Transition, TransitionAction, Trigger};
use std::collections::HashMap;

/// Index of a node inside its [`StateGraph`](super::StateGraph).
pub(crate) type NodeId = usize;

/// Everything configured for one state value.
///
/// Hierarchy links are arena indices: `superstate` is a non-owning back
/// reference, `substates` lists the children.
pub(crate) struct StateNode<S: State, T: Trigger> {
    pub(crate) state: S,
    pub(crate) superstate: Option<NodeId>,
    pub(crate) substates: Vec<NodeId>,
    pub(crate) initial_transition: Option<S>,
    pub(crate) entry_actions: Vec<TransitionAction<S, T>>,
    pub(crate) exit_actions: Vec<TransitionAction<S, T>>,
    pub(crate) activate_actions: Vec<ActivationAction>,
    pub(crate) deactivate_actions: Vec<ActivationAction>,
    behaviours: HashMap<T, Vec<TriggerBehaviour<S, T>>>,
    trigger_order: Vec<T>,
}

impl<S: State, T: Trigger> StateNode<S, T> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            state,
            superstate: None,
            substates: Vec::new(),
            initial_transition: None,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            activate_actions: Vec::new(),
            deactivate_actions: Vec::new(),
            behaviours: HashMap::new(),
            trigger_order: Vec::new(),
        }
    }

    /// Append a behaviour for `trigger`. Several behaviours per trigger are
    /// allowed; their guards decide which one applies.
    pub(crate) fn add_behaviour(&mut self, trigger: T, behaviour: TriggerBehaviour<S, T>) {
        if !self.behaviours.contains_key(&trigger) {
            self.trigger_order.push(trigger.clone());
        }
        self.behaviours.entry(trigger).or_default().push(behaviour);
    }

    pub(crate) fn behaviours(&self, trigger: &T) -> Option<&[TriggerBehaviour<S, T>]> {
        self.behaviours.get(trigger).map(Vec::as_slice)
    }

    /// Configured triggers with their behaviours, in configuration order.
    pub(crate) fn triggers(&self) -> impl Iterator<Item = (&T, &[TriggerBehaviour<S, T>])> {
        self.trigger_order.iter().filter_map(|trigger| {
            self.behaviours
                .get(trigger)
                .map(|behaviours| (trigger, behaviours.as_slice()))
        })
    }

    pub(crate) fn execute_entry_actions(
        &self,
        ctx: &FireContext,
        transition: &Transition<S, T>,
    ) -> Result<(), BoxError> {
        self.entry_actions
            .iter()
            .try_for_each(|action| action.execute(ctx, transition))
    }

    pub(crate) fn execute_exit_actions(
        &self,
        ctx: &FireContext,
        transition: &Transition<S, T>,
    ) -> Result<(), BoxError> {
        self.exit_actions
            .iter()
            .try_for_each(|action| action.execute(ctx, transition))
    }

    pub(crate) fn execute_activate_actions(&self, ctx: &FireContext) -> Result<(), BoxError> {
        self.activate_actions
            .iter()
            .try_for_each(|action| action.execute(ctx))
    }

    pub(crate) fn execute_deactivate_actions(&self, ctx: &FireContext) -> Result<(), BoxError> {
        self.deactivate_actions
            .iter()
            .try_for_each(|action| action.execute(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Args, GuardConditions};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
        Busy,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestTrigger {
        Start,
        Stop,
    }

    fn ignored() -> TriggerBehaviour<TestState, TestTrigger> {
        TriggerBehaviour::Ignored {
            guard: GuardConditions::none(),
        }
    }

    #[test]
    fn behaviours_accumulate_per_trigger() {
        let mut node = StateNode::new(TestState::Idle);
        node.add_behaviour(TestTrigger::Start, ignored());
        node.add_behaviour(TestTrigger::Start, ignored());

        assert_eq!(node.behaviours(&TestTrigger::Start).map(<[_]>::len), Some(2));
        assert!(node.behaviours(&TestTrigger::Stop).is_none());
    }

    #[test]
    fn triggers_keep_configuration_order() {
        let mut node = StateNode::new(TestState::Idle);
        node.add_behaviour(TestTrigger::Stop, ignored());
        node.add_behaviour(TestTrigger::Start, ignored());
        node.add_behaviour(TestTrigger::Stop, ignored());

        let order: Vec<_> = node.triggers().map(|(trigger, _)| trigger.clone()).collect();
        assert_eq!(order, vec![TestTrigger::Stop, TestTrigger::Start]);
    }

    #[test]
    fn entry_actions_run_in_order_and_stop_on_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut node = StateNode::new(TestState::Busy);

        for (name, fail) in [("first", false), ("second", true), ("third", false)] {
            let log = Arc::clone(&log);
            node.entry_actions.push(TransitionAction::new(move |_, _| {
                log.lock().unwrap().push(name);
                if fail {
                    Err("entry failed".into())
                } else {
                    Ok(())
                }
            }));
        }

        let transition = Transition::new(TestState::Idle, TestState::Busy, TestTrigger::Start, Args::none());
        let result = node.execute_entry_actions(&FireContext::new(), &transition);

        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }
}
