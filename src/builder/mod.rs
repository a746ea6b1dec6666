//! Builder API for ergonomic state machine construction.
//!
//! [`StateConfiguration`] declares what one state does; it is obtained from
//! [`StateMachine::configure`](crate::machine::StateMachine::configure).
//! [`StateMachineBuilder`] picks the storage and firing mode of a new
//! machine.

pub mod error;
pub mod machine;
pub mod state;

pub use error::{BuildError, ConfigError};
pub use machine::StateMachineBuilder;
pub use state::StateConfiguration;
