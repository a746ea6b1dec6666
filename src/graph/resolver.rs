//! Finding the behaviour that handles a trigger.
//!
//! Resolution starts at the current state and walks outwards. The first
//! node with exactly one guard-satisfied behaviour for the trigger wins, so
//! a substate's passing behaviour always overrides its superstates'. When a
//! node has no passing behaviour, its unmet guards are recorded and the walk
//! continues with the superstate.

use super::behaviour::TriggerBehaviour;
use super::hierarchy::StateGraph;
use super::node::NodeId;
use crate::core::{Args, BoxError, FireContext, State, Trigger};
use tracing::trace;

/// A behaviour selected by resolution, with the node it is configured on.
pub(crate) struct Handler<'g, S: State, T: Trigger> {
    pub(crate) behaviour: &'g TriggerBehaviour<S, T>,
    pub(crate) owner: NodeId,
}

pub(crate) enum Resolution<'g, S: State, T: Trigger> {
    Handler(Handler<'g, S, T>),
    /// More than one behaviour on `state` passed its guards.
    Ambiguous { state: S },
    /// Nothing in the hierarchy accepted the trigger.
    Unhandled { unmet_guards: Vec<String> },
}

impl<S: State, T: Trigger> StateGraph<S, T> {
    /// Resolve `trigger` fired while in node `id`.
    ///
    /// Guard failures other than rejections abort resolution.
    pub(crate) fn resolve(
        &self,
        id: NodeId,
        trigger: &T,
        ctx: &FireContext,
        args: &Args,
    ) -> Result<Resolution<'_, S, T>, BoxError> {
        let mut unmet_guards = Vec::new();

        for owner in self.ancestors(id) {
            let node = self.node(owner);
            let Some(behaviours) = node.behaviours(trigger) else {
                continue;
            };

            let mut permitted = None;
            for behaviour in behaviours {
                let unmet = behaviour.guard().unmet(ctx, args)?;
                if !unmet.is_empty() {
                    unmet_guards.extend(unmet);
                    continue;
                }
                if permitted.is_some() {
                    return Ok(Resolution::Ambiguous {
                        state: node.state.clone(),
                    });
                }
                permitted = Some(behaviour);
            }

            if let Some(behaviour) = permitted {
                return Ok(Resolution::Handler(Handler { behaviour, owner }));
            }
            trace!(state = ?node.state, ?trigger, "guards unmet, trying superstate");
        }

        Ok(Resolution::Unhandled { unmet_guards })
    }

    /// Whether resolution from node `id` yields a usable handler.
    pub(crate) fn can_handle(
        &self,
        id: NodeId,
        trigger: &T,
        ctx: &FireContext,
        args: &Args,
    ) -> Result<bool, BoxError> {
        Ok(matches!(
            self.resolve(id, trigger, ctx, args)?,
            Resolution::Handler(_)
        ))
    }

    /// Triggers with at least one guard-satisfied behaviour on node `id` or
    /// any of its superstates, deduplicated, innermost first.
    pub(crate) fn permitted_triggers(
        &self,
        id: NodeId,
        ctx: &FireContext,
        args: &Args,
    ) -> Result<Vec<T>, BoxError> {
        let mut permitted: Vec<T> = Vec::new();
        for owner in self.ancestors(id) {
            for (trigger, behaviours) in self.node(owner).triggers() {
                if permitted.contains(trigger) {
                    continue;
                }
                for behaviour in behaviours {
                    if behaviour.guard().unmet(ctx, args)?.is_empty() {
                        permitted.push(trigger.clone());
                        break;
                    }
                }
            }
        }
        Ok(permitted)
    }
}
