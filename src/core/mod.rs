//! Leaf value types of the engine.
//!
//! This module contains everything a state machine is declared with but
//! that holds no hierarchy of its own:
//! - State and trigger identity via the `State` and `Trigger` traits
//! - Opaque trigger arguments and the execution context
//! - Guards, actions and transition records

mod action;
mod args;
mod context;
mod guard;
mod state;
mod transition;

pub use action::{ActivationAction, TransitionAction};
pub use args::Args;
pub use context::{CancellationToken, FireContext};
pub use guard::{BoxError, Guard, GuardConditions, GuardError};
pub use state::{State, Trigger};
pub use transition::Transition;
