//! The state hierarchy.
//!
//! States live in an arena ([`StateGraph`]) indexed by [`NodeId`]. A node
//! owns its configured behaviours and actions; superstate links are plain
//! indices, so walking ancestors is cheap and no reference cycles exist.

mod behaviour;
mod hierarchy;
mod node;
mod resolver;

pub(crate) use behaviour::{DestinationSelector, TriggerBehaviour};
pub(crate) use hierarchy::StateGraph;
pub(crate) use node::{NodeId, StateNode};
pub(crate) use resolver::{Handler, Resolution};
