//! The state machine instance.
//!
//! A [`StateMachine`] owns the state hierarchy, the current-state cell and
//! the observers. Configuration and observer registration need `&mut self`
//! and are expected to finish before the first fire. Firing, queries and
//! activation take `&self`, so actions may fire further triggers through a
//! shared handle to the machine.
//!
//! # Example
//!
//! ```rust
//! use nested_fsm::machine::{FiringMode, StateMachine};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Call { OffHook, Ringing, Connected, OnHold }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Event { Dial, PickUp, Hold, Resume }
//!
//! let mut phone = StateMachine::with_firing_mode(Call::OffHook, FiringMode::Immediate);
//! phone.configure(Call::OffHook).permit(Event::Dial, Call::Ringing).unwrap();
//! phone.configure(Call::Ringing).permit(Event::PickUp, Call::Connected).unwrap();
//! phone.configure(Call::Connected).permit(Event::Hold, Call::OnHold).unwrap();
//! phone
//!     .configure(Call::OnHold)
//!     .substate_of(Call::Connected)
//!     .unwrap()
//!     .permit(Event::Resume, Call::Connected)
//!     .unwrap();
//!
//! phone.fire(Event::Dial).unwrap();
//! phone.fire(Event::PickUp).unwrap();
//! phone.fire(Event::Hold).unwrap();
//!
//! assert_eq!(phone.state().unwrap(), Call::OnHold);
//! assert!(phone.is_in_state(&Call::Connected).unwrap());
//! ```

mod error;
mod executor;
mod firing;
mod storage;

pub use error::FireError;
pub use firing::FiringMode;
pub use storage::{ExternalStorage, InMemoryStorage, StateStorage};

use crate::builder::StateConfiguration;
use crate::core::{Args, BoxError, FireContext, State, Transition, Trigger};
use crate::graph::StateGraph;
use firing::FireQueue;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

type TransitionObserver<S, T> = Box<dyn Fn(&FireContext, &Transition<S, T>) + Send + Sync>;

type UnhandledTriggerHandler<S, T> =
    Box<dyn Fn(&FireContext, &S, &T, &[String]) -> Result<(), BoxError> + Send + Sync>;

/// Payload type declared for a trigger.
struct TriggerParameters {
    type_id: TypeId,
    type_name: &'static str,
}

/// Hierarchical state machine.
pub struct StateMachine<S: State, T: Trigger> {
    graph: StateGraph<S, T>,
    storage: Box<dyn StateStorage<S>>,
    firing_mode: FiringMode,
    queue: Mutex<FireQueue<T>>,
    in_flight: AtomicUsize,
    active: AtomicBool,
    transitioned: Vec<TransitionObserver<S, T>>,
    completed: Vec<TransitionObserver<S, T>>,
    unhandled: Option<UnhandledTriggerHandler<S, T>>,
    parameters: HashMap<T, TriggerParameters>,
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Create a machine in `initial`, storing state in memory and firing in
    /// queued mode.
    pub fn new(initial: S) -> Self {
        Self::with_firing_mode(initial, FiringMode::default())
    }

    pub fn with_firing_mode(initial: S, firing_mode: FiringMode) -> Self {
        let mut machine = Self::with_storage(
            Box::new(InMemoryStorage::new(initial.clone())),
            firing_mode,
        );
        machine.graph.get_or_insert(initial);
        machine
    }

    pub(crate) fn with_storage(storage: Box<dyn StateStorage<S>>, firing_mode: FiringMode) -> Self {
        Self {
            graph: StateGraph::new(),
            storage,
            firing_mode,
            queue: Mutex::new(FireQueue::default()),
            in_flight: AtomicUsize::new(0),
            active: AtomicBool::new(false),
            transitioned: Vec::new(),
            completed: Vec::new(),
            unhandled: None,
            parameters: HashMap::new(),
        }
    }

    /// Begin configuring `state`. Repeated calls for the same state
    /// configure the same node.
    pub fn configure(&mut self, state: S) -> StateConfiguration<'_, S, T> {
        StateConfiguration::new(&mut self.graph, state)
    }

    /// Declare the payload type `A` carried by `trigger`.
    ///
    /// Firing `trigger` with arguments of any other type (or none) fails
    /// with [`FireError::InvalidArgument`] before the state is touched.
    pub fn set_trigger_parameters<A: Any>(&mut self, trigger: T) {
        self.parameters.insert(
            trigger,
            TriggerParameters {
                type_id: TypeId::of::<A>(),
                type_name: std::any::type_name::<A>(),
            },
        );
    }

    /// Observe every state change, including initial-transition descents.
    /// Runs after the stored state is updated and before entry actions.
    pub fn on_transitioned<F>(&mut self, observer: F)
    where
        F: Fn(&FireContext, &Transition<S, T>) + Send + Sync + 'static,
    {
        self.transitioned.push(Box::new(observer));
    }

    /// Observe the end of each transition. The record's destination is the
    /// state the machine actually ended in.
    pub fn on_transition_completed<F>(&mut self, observer: F)
    where
        F: Fn(&FireContext, &Transition<S, T>) + Send + Sync + 'static,
    {
        self.completed.push(Box::new(observer));
    }

    /// Handle triggers nothing accepts instead of failing the fire.
    ///
    /// The handler receives the current state, the trigger and the unmet
    /// guard descriptions. Ambiguous configuration is never routed here.
    pub fn on_unhandled_trigger<F>(&mut self, handler: F)
    where
        F: Fn(&FireContext, &S, &T, &[String]) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.unhandled = Some(Box::new(handler));
    }

    pub fn clear_transitioned_observers(&mut self) {
        self.transitioned.clear();
    }

    pub fn clear_transition_completed_observers(&mut self) {
        self.completed.clear();
    }

    pub fn clear_unhandled_trigger_handler(&mut self) {
        self.unhandled = None;
    }

    pub fn firing_mode(&self) -> FiringMode {
        self.firing_mode
    }

    /// Whether a fire is currently executing on any thread.
    pub fn is_firing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The current state.
    pub fn state(&self) -> Result<S, FireError<S, T>> {
        self.state_ctx(&FireContext::new())
    }

    pub fn state_ctx(&self, ctx: &FireContext) -> Result<S, FireError<S, T>> {
        self.storage.load(ctx).map_err(FireError::Storage)
    }

    /// Whether the current state is `state` or one of its substates.
    pub fn is_in_state(&self, state: &S) -> Result<bool, FireError<S, T>> {
        self.is_in_state_ctx(&FireContext::new(), state)
    }

    pub fn is_in_state_ctx(&self, ctx: &FireContext, state: &S) -> Result<bool, FireError<S, T>> {
        let current = self.state_ctx(ctx)?;
        Ok(match self.graph.node_id(&current) {
            Some(id) => self.graph.is_included_in(id, state),
            None => current == *state,
        })
    }

    /// Whether firing `trigger` without arguments would find a handler.
    pub fn can_fire(&self, trigger: &T) -> Result<bool, FireError<S, T>> {
        self.can_fire_ctx(&FireContext::new(), trigger, &Args::none())
    }

    pub fn can_fire_ctx(
        &self,
        ctx: &FireContext,
        trigger: &T,
        args: &Args,
    ) -> Result<bool, FireError<S, T>> {
        let current = self.state_ctx(ctx)?;
        match self.graph.node_id(&current) {
            Some(id) => self
                .graph
                .can_handle(id, trigger, ctx, args)
                .map_err(FireError::Guard),
            None => Ok(false),
        }
    }

    /// Triggers accepted in the current state, evaluated without arguments.
    pub fn permitted_triggers(&self) -> Result<Vec<T>, FireError<S, T>> {
        self.permitted_triggers_ctx(&FireContext::new(), &Args::none())
    }

    pub fn permitted_triggers_ctx(
        &self,
        ctx: &FireContext,
        args: &Args,
    ) -> Result<Vec<T>, FireError<S, T>> {
        let current = self.state_ctx(ctx)?;
        match self.graph.node_id(&current) {
            Some(id) => self
                .graph
                .permitted_triggers(id, ctx, args)
                .map_err(FireError::Guard),
            None => Ok(Vec::new()),
        }
    }

    /// Run activation actions of the current state and its superstates,
    /// outermost first. Does nothing if already active.
    pub fn activate(&self) -> Result<(), FireError<S, T>> {
        self.activate_ctx(&FireContext::new())
    }

    pub fn activate_ctx(&self, ctx: &FireContext) -> Result<(), FireError<S, T>> {
        if self.is_active() {
            return Ok(());
        }
        let current = self.state_ctx(ctx)?;
        if let Some(id) = self.graph.node_id(&current) {
            self.graph.activate(id, ctx).map_err(FireError::Action)?;
        }
        self.active.store(true, Ordering::Release);
        debug!(state = ?current, "state machine activated");
        Ok(())
    }

    /// Run deactivation actions of the current state and its superstates,
    /// innermost first. Does nothing if not active.
    pub fn deactivate(&self) -> Result<(), FireError<S, T>> {
        self.deactivate_ctx(&FireContext::new())
    }

    pub fn deactivate_ctx(&self, ctx: &FireContext) -> Result<(), FireError<S, T>> {
        if !self.is_active() {
            return Ok(());
        }
        let current = self.state_ctx(ctx)?;
        if let Some(id) = self.graph.node_id(&current) {
            self.graph.deactivate(id, ctx).map_err(FireError::Action)?;
        }
        self.active.store(false, Ordering::Release);
        debug!(state = ?current, "state machine deactivated");
        Ok(())
    }

    pub(crate) fn graph(&self) -> &StateGraph<S, T> {
        &self.graph
    }

    fn store_state(&self, ctx: &FireContext, state: S) -> Result<(), FireError<S, T>> {
        self.storage.store(ctx, state).map_err(FireError::Storage)
    }

    fn notify_transitioned(&self, ctx: &FireContext, transition: &Transition<S, T>) {
        for observer in &self.transitioned {
            observer(ctx, transition);
        }
    }

    fn notify_completed(&self, ctx: &FireContext, transition: &Transition<S, T>) {
        for observer in &self.completed {
            observer(ctx, transition);
        }
    }

    fn validate_parameters(&self, trigger: &T, args: &Args) -> Result<(), FireError<S, T>> {
        let Some(expected) = self.parameters.get(trigger) else {
            return Ok(());
        };
        if args.type_id() == Some(expected.type_id) {
            Ok(())
        } else {
            Err(FireError::InvalidArgument {
                trigger: trigger.clone(),
                expected: expected.type_name,
                found: args.type_name(),
            })
        }
    }
}
