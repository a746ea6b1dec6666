//! Where the current state lives.
//!
//! The machine reads and writes its current state through a
//! [`StateStorage`], which lets the state live outside the machine (for
//! example in a database row). [`InMemoryStorage`] is the default.

use crate::core::{BoxError, FireContext, State};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Getter/setter pair for the current state.
pub trait StateStorage<S: State>: Send + Sync {
    fn load(&self, ctx: &FireContext) -> Result<S, BoxError>;

    fn store(&self, ctx: &FireContext, state: S) -> Result<(), BoxError>;
}

/// State cell held inside the machine. Reads are lock-free.
pub struct InMemoryStorage<S> {
    state: ArcSwap<S>,
}

impl<S: State> InMemoryStorage<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: ArcSwap::new(Arc::new(initial)),
        }
    }
}

impl<S: State> StateStorage<S> for InMemoryStorage<S> {
    fn load(&self, _ctx: &FireContext) -> Result<S, BoxError> {
        Ok(S::clone(&self.state.load()))
    }

    fn store(&self, _ctx: &FireContext, state: S) -> Result<(), BoxError> {
        self.state.store(Arc::new(state));
        Ok(())
    }
}

/// Storage backed by caller-supplied accessor and mutator closures.
///
/// # Example
///
/// ```rust
/// use nested_fsm::machine::{ExternalStorage, StateStorage};
/// use nested_fsm::core::FireContext;
/// use std::sync::{Arc, Mutex};
///
/// let row = Arc::new(Mutex::new("Draft"));
/// let read = Arc::clone(&row);
/// let write = Arc::clone(&row);
/// let storage = ExternalStorage::new(
///     move |_ctx| Ok(*read.lock().unwrap()),
///     move |_ctx, state| {
///         *write.lock().unwrap() = state;
///         Ok(())
///     },
/// );
///
/// let ctx = FireContext::new();
/// storage.store(&ctx, "Published").unwrap();
/// assert_eq!(storage.load(&ctx).unwrap(), "Published");
/// ```
pub struct ExternalStorage<A, M> {
    accessor: A,
    mutator: M,
}

impl<A, M> ExternalStorage<A, M> {
    pub fn new<S>(accessor: A, mutator: M) -> Self
    where
        S: State,
        A: Fn(&FireContext) -> Result<S, BoxError> + Send + Sync,
        M: Fn(&FireContext, S) -> Result<(), BoxError> + Send + Sync,
    {
        Self { accessor, mutator }
    }
}

impl<S, A, M> StateStorage<S> for ExternalStorage<A, M>
where
    S: State,
    A: Fn(&FireContext) -> Result<S, BoxError> + Send + Sync,
    M: Fn(&FireContext, S) -> Result<(), BoxError> + Send + Sync,
{
    fn load(&self, ctx: &FireContext) -> Result<S, BoxError> {
        (self.accessor)(ctx)
    }

    fn store(&self, ctx: &FireContext, state: S) -> Result<(), BoxError> {
        (self.mutator)(ctx, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Draft,
        Published,
    }

    #[test]
    fn in_memory_storage_round_trips() {
        let storage = InMemoryStorage::new(TestState::Draft);
        let ctx = FireContext::new();

        assert_eq!(storage.load(&ctx).unwrap(), TestState::Draft);
        storage.store(&ctx, TestState::Published).unwrap();
        assert_eq!(storage.load(&ctx).unwrap(), TestState::Published);
    }

    #[test]
    fn external_storage_surfaces_errors() {
        let storage = ExternalStorage::new(
            |_: &FireContext| -> Result<TestState, BoxError> { Err("row locked".into()) },
            |_: &FireContext, _: TestState| Ok(()),
        );

        let err = storage.load(&FireContext::new()).unwrap_err();
        assert_eq!(err.to_string(), "row locked");
    }
}
