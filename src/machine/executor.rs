//! Executing a resolved transition.
//!
//! One dispatch runs: resolve the trigger, exit the source, update the
//! stored state, notify `transitioned` observers, enter the destination,
//! descend through initial transitions, then notify `completed` observers.
//! Nothing is rolled back when an action fails part-way.

use super::error::FireError;
use super::StateMachine;
use crate::core::{Args, FireContext, State, Transition, Trigger};
use crate::graph::{Handler, NodeId, Resolution, TriggerBehaviour};
use tracing::{debug, trace};

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Resolve and execute a single trigger from the current state.
    pub(crate) fn fire_one(
        &self,
        ctx: &FireContext,
        trigger: T,
        args: Args,
    ) -> Result<(), FireError<S, T>> {
        self.validate_parameters(&trigger, &args)?;
        let source = self.state_ctx(ctx)?;

        let Some(node) = self.graph.node_id(&source) else {
            return self.unhandled_trigger(ctx, None, source, trigger, &args, Vec::new());
        };

        let Handler { behaviour, owner } = match self
            .graph
            .resolve(node, &trigger, ctx, &args)
            .map_err(FireError::Guard)?
        {
            Resolution::Handler(handler) => handler,
            Resolution::Ambiguous { state } => {
                return Err(FireError::Ambiguous { state, trigger });
            }
            Resolution::Unhandled { unmet_guards } => {
                return self.unhandled_trigger(ctx, Some(node), source, trigger, &args, unmet_guards);
            }
        };

        trace!(state = ?source, ?trigger, handled_by = ?self.graph.node(owner).state, "trigger resolved");
        match behaviour {
            TriggerBehaviour::Ignored { .. } => {
                debug!(state = ?source, ?trigger, "trigger ignored");
                Ok(())
            }
            TriggerBehaviour::Internal { action, .. } => {
                debug!(state = ?source, ?trigger, "internal transition");
                let transition = Transition::new(source.clone(), source, trigger, args);
                action.execute(ctx, &transition).map_err(FireError::Action)
            }
            TriggerBehaviour::Transitioning { destination, .. } => {
                if *destination == source {
                    // Inherited from a superstate and targeting the state we
                    // are already in.
                    debug!(state = ?source, ?trigger, "transition targets current state, skipping");
                    return Ok(());
                }
                let transition = Transition::new(source, destination.clone(), trigger, args);
                self.handle_transitioning(ctx, node, transition)
            }
            TriggerBehaviour::Reentry { destination, .. } => {
                let transition = Transition::new(source, destination.clone(), trigger, args);
                self.handle_reentry(ctx, node, owner, transition)
            }
            TriggerBehaviour::Dynamic { selector, .. } => {
                let destination = selector.select(ctx, &args).map_err(FireError::Action)?;
                let transition = Transition::new(source, destination, trigger, args);
                self.handle_transitioning(ctx, node, transition)
            }
        }
    }

    fn handle_transitioning(
        &self,
        ctx: &FireContext,
        source: NodeId,
        transition: Transition<S, T>,
    ) -> Result<(), FireError<S, T>> {
        debug!(
            source = ?transition.source,
            destination = ?transition.destination,
            trigger = ?transition.trigger,
            "transitioning"
        );
        self.graph
            .exit(source, ctx, &transition)
            .map_err(FireError::Action)?;
        self.complete_transition(ctx, transition)
    }

    /// Exit and re-enter the state that configured the reentry. When the
    /// behaviour was inherited from a superstate, the current substate is
    /// exited first and the superstate is then re-entered on its own.
    fn handle_reentry(
        &self,
        ctx: &FireContext,
        source: NodeId,
        owner: NodeId,
        transition: Transition<S, T>,
    ) -> Result<(), FireError<S, T>> {
        debug!(
            source = ?transition.source,
            destination = ?transition.destination,
            trigger = ?transition.trigger,
            "reentering"
        );
        self.graph
            .exit(source, ctx, &transition)
            .map_err(FireError::Action)?;

        let transition = if transition.is_reentry() {
            transition
        } else {
            let reentry = Transition::new(
                transition.destination.clone(),
                transition.destination,
                transition.trigger,
                transition.args,
            );
            self.graph
                .exit(owner, ctx, &reentry)
                .map_err(FireError::Action)?;
            reentry
        };

        self.complete_transition(ctx, transition)
    }

    /// Everything after the source has been exited.
    fn complete_transition(
        &self,
        ctx: &FireContext,
        transition: Transition<S, T>,
    ) -> Result<(), FireError<S, T>> {
        self.store_state(ctx, transition.destination.clone())?;
        self.notify_transitioned(ctx, &transition);
        self.enter_state(ctx, &transition)?;

        // Entry actions may have fired further triggers, so report where the
        // machine actually ended up.
        let reached = self.state_ctx(ctx)?;
        let completed = Transition::new(transition.source, reached, transition.trigger, transition.args);
        self.notify_completed(ctx, &completed);
        Ok(())
    }

    /// Enter the destination, then follow initial transitions down the
    /// hierarchy for as long as the machine is still where we put it.
    fn enter_state(
        &self,
        ctx: &FireContext,
        transition: &Transition<S, T>,
    ) -> Result<(), FireError<S, T>> {
        let Some(mut current) = self.graph.node_id(&transition.destination) else {
            return Ok(());
        };
        self.graph
            .enter(current, ctx, transition)
            .map_err(FireError::Action)?;

        loop {
            let node = self.graph.node(current);
            let Some(target) = &node.initial_transition else {
                return Ok(());
            };
            if self.state_ctx(ctx)? != node.state {
                return Ok(());
            }
            let target_id = match self.graph.node_id(target) {
                Some(id) if id != current && self.graph.includes(current, target) => id,
                _ => {
                    return Err(FireError::InvalidInitialTransition {
                        state: node.state.clone(),
                        target: target.clone(),
                    });
                }
            };

            let descent = Transition::initial(
                node.state.clone(),
                target.clone(),
                transition.trigger.clone(),
                transition.args.clone(),
            );
            debug!(source = ?descent.source, destination = ?descent.destination, "initial transition");
            self.notify_transitioned(ctx, &descent);
            self.store_state(ctx, target.clone())?;
            self.graph
                .enter(target_id, ctx, &descent)
                .map_err(FireError::Action)?;
            current = target_id;
        }
    }

    fn unhandled_trigger(
        &self,
        ctx: &FireContext,
        node: Option<NodeId>,
        state: S,
        trigger: T,
        args: &Args,
        unmet_guards: Vec<String>,
    ) -> Result<(), FireError<S, T>> {
        if let Some(handler) = &self.unhandled {
            debug!(?state, ?trigger, ?unmet_guards, "routing unhandled trigger to callback");
            return handler(ctx, &state, &trigger, &unmet_guards).map_err(FireError::Action);
        }
        let permitted = match node {
            Some(id) => self
                .graph
                .permitted_triggers(id, ctx, args)
                .map_err(FireError::Guard)?,
            None => Vec::new(),
        };
        Err(FireError::Unhandled {
            state,
            trigger,
            unmet_guards,
            permitted,
        })
    }
}
