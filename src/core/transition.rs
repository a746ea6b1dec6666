//! Transition records.

use super::args::Args;
use super::state::{State, Trigger};

/// Record of a single transition, created per fire and handed to actions
/// and observers.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::{Args, Transition};
///
/// let transition = Transition::new("Idle", "Running", "start", Args::none());
/// assert!(!transition.is_reentry());
/// assert!(!transition.is_initial());
/// ```
#[derive(Clone, Debug)]
pub struct Transition<S: State, T: Trigger> {
    /// The state being transitioned from
    pub source: S,
    /// The state being transitioned to
    pub destination: S,
    /// The trigger that caused the transition
    pub trigger: T,
    /// Arguments supplied with the trigger
    pub args: Args,
    initial: bool,
}

impl<S: State, T: Trigger> Transition<S, T> {
    pub fn new(source: S, destination: S, trigger: T, args: Args) -> Self {
        Self {
            source,
            destination,
            trigger,
            args,
            initial: false,
        }
    }

    /// Record for an automatic descent into a configured initial substate.
    pub(crate) fn initial(source: S, destination: S, trigger: T, args: Args) -> Self {
        Self {
            initial: true,
            ..Self::new(source, destination, trigger, args)
        }
    }

    /// True when source and destination are the same state.
    pub fn is_reentry(&self) -> bool {
        self.source == self.destination
    }

    /// True when this record describes an initial-transition descent rather
    /// than a caller-fired transition.
    pub fn is_initial(&self) -> bool {
        self.initial
    }
}
