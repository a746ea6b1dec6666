//! Errors returned while firing triggers.

use crate::core::{BoxError, State, Trigger};
use thiserror::Error;

/// Errors that can occur when firing a trigger or querying the machine.
#[derive(Debug, Error)]
pub enum FireError<S: State, T: Trigger> {
    /// No guard-satisfied behaviour exists anywhere in the hierarchy and no
    /// unhandled-trigger callback is registered.
    #[error(
        "No valid leaving transitions are permitted from state '{state:?}' for trigger '{trigger:?}' \
         (unmet guards: {unmet_guards:?}, permitted triggers: {permitted:?})"
    )]
    Unhandled {
        state: S,
        trigger: T,
        unmet_guards: Vec<String>,
        permitted: Vec<T>,
    },

    /// Two or more behaviours on one state passed their guards at once.
    #[error(
        "Multiple permitted transitions are configured from state '{state:?}' for trigger \
         '{trigger:?}'. Guard clauses must be mutually exclusive"
    )]
    Ambiguous { state: S, trigger: T },

    /// An initial-transition target is not a descendant of its state.
    #[error("The target '{target:?}' for the initial transition of '{state:?}' is not a substate")]
    InvalidInitialTransition { state: S, target: S },

    /// The fire context was cancelled before dispatch.
    #[error("Firing trigger '{trigger:?}' was cancelled")]
    Cancelled { trigger: T },

    /// The arguments do not match the declared trigger parameters.
    #[error("Trigger '{trigger:?}' expects an argument of type {expected}, got {found}")]
    InvalidArgument {
        trigger: T,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Guard failed: {0}")]
    Guard(#[source] BoxError),

    #[error("Action failed: {0}")]
    Action(#[source] BoxError),

    #[error("State storage failed: {0}")]
    Storage(#[source] BoxError),
}

impl<S: State, T: Trigger> FireError<S, T> {
    /// Whether this error reports a trigger nothing accepted.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::Unhandled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
    }

    #[test]
    fn unhandled_message_lists_guards_and_permitted() {
        let err: FireError<TestState, &str> = FireError::Unhandled {
            state: TestState::Idle,
            trigger: "start",
            unmet_guards: vec!["has fuel".to_string()],
            permitted: vec!["refuel"],
        };

        let message = err.to_string();
        assert!(message.contains("Idle"));
        assert!(message.contains("has fuel"));
        assert!(message.contains("refuel"));
        assert!(err.is_unhandled());
    }

    #[test]
    fn wrapped_errors_expose_source() {
        use std::error::Error as _;

        let err: FireError<TestState, &str> = FireError::Action("boom".into());
        assert_eq!(err.to_string(), "Action failed: boom");
        assert!(err.source().is_some());
        assert!(!err.is_unhandled());
    }

    #[test]
    fn errors_convert_into_box_error() {
        let err: FireError<TestState, &str> = FireError::Cancelled { trigger: "start" };
        let boxed: BoxError = err.into();
        assert!(boxed.to_string().contains("cancelled"));
    }
}
