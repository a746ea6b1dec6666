//! Configuration and build errors.

use crate::core::State;
use thiserror::Error;

/// Structural mistakes caught while configuring a state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError<S: State> {
    #[error(
        "permit() and permit_if() require a destination different from the source state \
         '{state:?}'. To accept a trigger without changing state, use ignore() or permit_reentry()"
    )]
    SelfTransition { state: S },

    #[error("Making '{superstate:?}' the superstate of '{state:?}' would create a cycle")]
    CyclicSuperstate { state: S, superstate: S },

    #[error("State '{state:?}' cannot be its own initial transition target")]
    SelfInitialTransition { state: S },

    #[error("State '{state:?}' already has initial transition target '{existing:?}'")]
    DuplicateInitialTransition { state: S, existing: S },
}

/// Errors from [`StateMachineBuilder::build`](super::StateMachineBuilder::build).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) or .storage(..) before .build()")]
    MissingInitialState,

    #[error("Both an initial state and a state storage were given. Use only one")]
    ConflictingInitialState,
}
