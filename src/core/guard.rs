//! Guard predicates for controlling transitions.
//!
//! A guard either permits a transition or refuses it. Refusals come in two
//! kinds: an expected [`GuardError::Rejected`] that simply makes the
//! behaviour unavailable, and [`GuardError::Failed`] which aborts the fire.

use super::args::Args;
use super::context::FireContext;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Boxed error returned by caller-supplied guards, actions and storage.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a guard did not permit a transition.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Ordinary business-rule refusal, reported as an unmet guard.
    #[error("guard rejected: {0}")]
    Rejected(String),

    /// Unexpected failure while evaluating the guard.
    #[error("guard failed: {0}")]
    Failed(#[source] BoxError),
}

impl GuardError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }
}

type GuardFn = dyn Fn(&FireContext, &Args) -> Result<(), GuardError> + Send + Sync;

/// Predicate that determines whether a transition behaviour applies.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::{Args, FireContext, Guard};
///
/// let has_credit = Guard::new("has credit", |_ctx, args| {
///     args.get::<u32>().is_some_and(|credit| *credit > 0)
/// });
///
/// let ctx = FireContext::new();
/// assert!(has_credit.check(&ctx, &Args::new(5u32)).is_ok());
/// assert!(has_credit.check(&ctx, &Args::new(0u32)).is_err());
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<GuardFn>,
    description: String,
}

impl Guard {
    /// Create a guard from a boolean predicate.
    ///
    /// A `false` result is reported as a rejection carrying `description`.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FireContext, &Args) -> bool + Send + Sync + 'static,
    {
        let description = description.into();
        let reason = description.clone();
        Self {
            predicate: Arc::new(move |ctx: &FireContext, args: &Args| {
                if predicate(ctx, args) {
                    Ok(())
                } else {
                    Err(GuardError::Rejected(reason.clone()))
                }
            }),
            description,
        }
    }

    /// Create a guard that reports its own outcome, including unexpected
    /// failures.
    pub fn fallible<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FireContext, &Args) -> Result<(), GuardError> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self, ctx: &FireContext, args: &Args) -> Result<(), GuardError> {
        (self.predicate)(ctx, args)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// The guards attached to one transition behaviour. All must pass.
#[derive(Clone, Debug, Default)]
pub struct GuardConditions {
    guards: Vec<Guard>,
}

impl GuardConditions {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.guards
            .iter()
            .map(|guard| guard.description().to_string())
            .collect()
    }

    /// Evaluate every guard, accumulating all rejections.
    ///
    /// Returns the reasons of the guards that rejected; an empty list means
    /// the behaviour is permitted. A guard that fails unexpectedly stops
    /// evaluation and its error is returned.
    pub fn unmet(&self, ctx: &FireContext, args: &Args) -> Result<Vec<String>, BoxError> {
        let mut checks: Vec<Validation<(), NonEmptyVec<String>>> =
            Vec::with_capacity(self.guards.len());

        for guard in &self.guards {
            let check = match guard.check(ctx, args) {
                Ok(()) => Validation::success(()),
                Err(GuardError::Rejected(reason)) => Validation::fail(reason),
                Err(GuardError::Failed(err)) => return Err(err),
            };
            checks.push(check);
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(Vec::new()),
            Validation::Failure(unmet) => Ok(unmet.iter().cloned().collect()),
        }
    }
}

impl From<Guard> for GuardConditions {
    fn from(guard: Guard) -> Self {
        Self {
            guards: vec![guard],
        }
    }
}

impl From<Vec<Guard>> for GuardConditions {
    fn from(guards: Vec<Guard>) -> Self {
        Self { guards }
    }
}

impl<const N: usize> From<[Guard; N]> for GuardConditions {
    fn from(guards: [Guard; N]) -> Self {
        Self {
            guards: guards.into(),
        }
    }
}
