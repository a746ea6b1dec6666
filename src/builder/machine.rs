//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{BoxError, FireContext, State, Trigger};
use crate::machine::{ExternalStorage, FiringMode, StateMachine, StateStorage};

/// Builder for constructing state machines with a fluent API.
///
/// Exactly one of [`initial`](Self::initial), [`storage`](Self::storage) or
/// [`external_storage`](Self::external_storage) must be given.
///
/// # Example
///
/// ```rust
/// use nested_fsm::builder::StateMachineBuilder;
/// use nested_fsm::machine::FiringMode;
/// use std::sync::{Arc, Mutex};
///
/// let row = Arc::new(Mutex::new("Draft"));
/// let (read, write) = (Arc::clone(&row), Arc::clone(&row));
///
/// let mut machine = StateMachineBuilder::new()
///     .external_storage(
///         move |_| Ok(*read.lock().unwrap()),
///         move |_, state| {
///             *write.lock().unwrap() = state;
///             Ok(())
///         },
///     )
///     .firing_mode(FiringMode::Immediate)
///     .build()
///     .unwrap();
/// machine.configure("Draft").permit("publish", "Published").unwrap();
///
/// machine.fire("publish").unwrap();
/// assert_eq!(*row.lock().unwrap(), "Published");
/// ```
pub struct StateMachineBuilder<S: State> {
    initial: Option<S>,
    storage: Option<Box<dyn StateStorage<S>>>,
    firing_mode: FiringMode,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            storage: None,
            firing_mode: FiringMode::default(),
        }
    }

    /// Keep state in memory, starting at `state`.
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Read and write state through `storage`.
    pub fn storage(mut self, storage: impl StateStorage<S> + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Read and write state through an accessor/mutator pair.
    pub fn external_storage<A, M>(self, accessor: A, mutator: M) -> Self
    where
        A: Fn(&FireContext) -> Result<S, BoxError> + Send + Sync + 'static,
        M: Fn(&FireContext, S) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.storage(ExternalStorage::new(accessor, mutator))
    }

    /// Defaults to [`FiringMode::Queued`].
    pub fn firing_mode(mut self, firing_mode: FiringMode) -> Self {
        self.firing_mode = firing_mode;
        self
    }

    /// Build the state machine.
    pub fn build<T: Trigger>(self) -> Result<StateMachine<S, T>, BuildError> {
        match (self.initial, self.storage) {
            (Some(initial), None) => Ok(StateMachine::with_firing_mode(initial, self.firing_mode)),
            (None, Some(storage)) => Ok(StateMachine::with_storage(storage, self.firing_mode)),
            (None, None) => Err(BuildError::MissingInitialState),
            (Some(_), Some(_)) => Err(BuildError::ConflictingInitialState),
        }
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
