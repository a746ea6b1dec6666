//! Entry, exit, internal and activation actions.
//!
//! Actions are stored closures behind a uniform signature. The engine only
//! invokes them; any error they return aborts the current fire.

use super::context::FireContext;
use super::guard::BoxError;
use super::state::{State, Trigger};
use super::transition::Transition;
use std::sync::Arc;

type TransitionActionFn<S, T> =
    dyn Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync;

type ActivationActionFn = dyn Fn(&FireContext) -> Result<(), BoxError> + Send + Sync;

/// Action that receives the transition being executed: entry, exit and
/// internal-transition actions.
///
/// An action created with [`TransitionAction::from_trigger`] only runs when
/// the transition was caused by that trigger.
pub struct TransitionAction<S: State, T: Trigger> {
    action: Arc<TransitionActionFn<S, T>>,
    description: String,
    trigger: Option<T>,
}

impl<S: State, T: Trigger> TransitionAction<S, T> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            description: std::any::type_name::<F>().to_string(),
            trigger: None,
        }
    }

    /// Restrict the action to transitions fired by `trigger`.
    pub fn from_trigger<F>(trigger: T, action: F) -> Self
    where
        F: Fn(&FireContext, &Transition<S, T>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            trigger: Some(trigger),
            ..Self::new(action)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Run the action if it applies to this transition's trigger.
    pub fn execute(&self, ctx: &FireContext, transition: &Transition<S, T>) -> Result<(), BoxError> {
        match &self.trigger {
            Some(trigger) if *trigger != transition.trigger => Ok(()),
            _ => (self.action)(ctx, transition),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn trigger(&self) -> Option<&T> {
        self.trigger.as_ref()
    }
}

impl<S: State, T: Trigger> Clone for TransitionAction<S, T> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            description: self.description.clone(),
            trigger: self.trigger.clone(),
        }
    }
}

impl<S: State, T: Trigger> std::fmt::Debug for TransitionAction<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionAction")
            .field("description", &self.description)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}

/// Action run when the machine is activated or deactivated.
#[derive(Clone)]
pub struct ActivationAction {
    action: Arc<ActivationActionFn>,
    description: String,
}

impl ActivationAction {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&FireContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            description: std::any::type_name::<F>().to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn execute(&self, ctx: &FireContext) -> Result<(), BoxError> {
        (self.action)(ctx)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for ActivationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationAction")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
