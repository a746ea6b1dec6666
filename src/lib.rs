//! nested-fsm: a hierarchical state machine engine
//!
//! States may be nested inside superstates. A trigger fired while in a
//! substate is handled by the innermost state that accepts it, so shared
//! behaviour is declared once on the superstate. Entering a state enters
//! its superstates first; leaving it exits them last.
//!
//! # Core Concepts
//!
//! - **States and triggers**: any `Clone + Eq + Hash + Debug` type
//! - **Guards**: predicates over the fire context and trigger arguments
//! - **Behaviours**: fixed, reentry, dynamic, internal and ignored
//!   transitions
//! - **Initial transitions**: automatic descent into a default substate
//! - **Firing modes**: immediate (nested) or queued (serialized) dispatch
//!
//! # Example
//!
//! ```rust
//! use nested_fsm::{FiringMode, Guard, StateMachine};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Player { Stopped, Active, Playing, Paused }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Button { Play, Pause, Stop }
//!
//! let mut player = StateMachine::with_firing_mode(Player::Stopped, FiringMode::Immediate);
//! player
//!     .configure(Player::Stopped)
//!     .permit_if(Button::Play, Player::Active, Guard::new("media loaded", |_, _| true))
//!     .unwrap();
//! player
//!     .configure(Player::Active)
//!     .initial_transition(Player::Playing)
//!     .unwrap()
//!     .permit(Button::Stop, Player::Stopped)
//!     .unwrap();
//! player
//!     .configure(Player::Playing)
//!     .substate_of(Player::Active)
//!     .unwrap()
//!     .permit(Button::Pause, Player::Paused)
//!     .unwrap();
//! player
//!     .configure(Player::Paused)
//!     .substate_of(Player::Active)
//!     .unwrap()
//!     .permit(Button::Play, Player::Playing)
//!     .unwrap();
//!
//! player.fire(Button::Play).unwrap();
//! assert_eq!(player.state().unwrap(), Player::Playing);
//!
//! player.fire(Button::Pause).unwrap();
//! assert!(player.is_in_state(&Player::Active).unwrap());
//!
//! // Stop is inherited from Active.
//! player.fire(Button::Stop).unwrap();
//! assert_eq!(player.state().unwrap(), Player::Stopped);
//! ```

pub mod builder;
pub mod core;
mod graph;
pub mod info;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, ConfigError, StateConfiguration, StateMachineBuilder};
pub use self::core::{Args, FireContext, Guard, GuardError, State, Transition, Trigger};
pub use info::StateMachineInfo;
pub use machine::{FireError, FiringMode, StateMachine};
