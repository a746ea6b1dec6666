//! Identity traits for states and triggers.
//!
//! The engine treats both as opaque values: it compares them for equality
//! and hashes them to key its registries, and never looks inside.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// Implemented automatically for every type that satisfies the bounds, so
/// a plain `#[derive(Clone, PartialEq, Eq, Hash, Debug)]` enum qualifies.
///
/// # Required Traits
///
/// - `Clone`: states are copied into transition records
/// - `Eq` + `Hash`: states key the node registry
/// - `Debug`: states appear in errors and logs
/// - `Send` + `Sync`: machines may be shared across threads in queued mode
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Phone {
///     OffHook,
///     Ringing,
///     Connected,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Phone>();
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<S> State for S where S: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Trait for triggers fired against a state machine.
///
/// Same bounds as [`State`]; triggers are queued by value in queued mode.
pub trait Trigger: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Trigger for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn requires_state<S: State>(state: S) -> S {
        state
    }

    fn requires_trigger<T: Trigger>(trigger: T) -> T {
        trigger
    }

    #[test]
    fn derived_enums_are_states() {
        let state = requires_state(TestState::Processing);
        assert_eq!(state, TestState::Processing);
    }

    #[test]
    fn primitive_types_are_triggers() {
        assert_eq!(requires_trigger("dial"), "dial");
        assert_eq!(requires_trigger(7u32), 7);
        assert_eq!(requires_trigger(String::from("hang-up")), "hang-up");
    }

    #[test]
    fn states_hash_by_value() {
        let states: HashSet<TestState> = [
            TestState::Initial,
            TestState::Complete,
            TestState::Initial,
        ]
        .into_iter()
        .collect();

        assert_eq!(states.len(), 2);
        assert!(states.contains(&TestState::Initial));
        assert!(!states.contains(&TestState::Processing));
    }
}
