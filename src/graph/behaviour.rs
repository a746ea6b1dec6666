//! Transition behaviours attached to a trigger.

use crate::core::{Args, BoxError, FireContext, GuardConditions, State, TransitionAction, Trigger};
use std::sync::Arc;

pub(crate) type DestinationFn<S> =
    dyn Fn(&FireContext, &Args) -> Result<S, BoxError> + Send + Sync;

/// Computes the destination of a dynamic transition at fire time.
pub(crate) struct DestinationSelector<S: State> {
    select: Arc<DestinationFn<S>>,
    pub(crate) description: String,
}

impl<S: State> DestinationSelector<S> {
    pub(crate) fn new<F>(select: F) -> Self
    where
        F: Fn(&FireContext, &Args) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        Self {
            select: Arc::new(select),
            description: std::any::type_name::<F>().to_string(),
        }
    }

    pub(crate) fn select(&self, ctx: &FireContext, args: &Args) -> Result<S, BoxError> {
        (self.select)(ctx, args)
    }
}

/// What a trigger does when it is handled by a state.
pub(crate) enum TriggerBehaviour<S: State, T: Trigger> {
    /// Move to a fixed destination.
    Transitioning { destination: S, guard: GuardConditions },
    /// Exit and re-enter the owning state.
    Reentry { destination: S, guard: GuardConditions },
    /// Move to a destination computed from the trigger's arguments.
    Dynamic {
        selector: DestinationSelector<S>,
        guard: GuardConditions,
    },
    /// Run an action without leaving the state.
    Internal {
        action: TransitionAction<S, T>,
        guard: GuardConditions,
    },
    /// Accept the trigger and do nothing.
    Ignored { guard: GuardConditions },
}

impl<S: State, T: Trigger> TriggerBehaviour<S, T> {
    pub(crate) fn guard(&self) -> &GuardConditions {
        match self {
            Self::Transitioning { guard, .. }
            | Self::Reentry { guard, .. }
            | Self::Dynamic { guard, .. }
            | Self::Internal { guard, .. }
            | Self::Ignored { guard } => guard,
        }
    }
}
