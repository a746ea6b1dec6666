//! Firing policy: immediate or queued dispatch of triggers.

use super::error::FireError;
use super::StateMachine;
use crate::core::{Args, FireContext, State, Trigger};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// How fire requests are dispatched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FiringMode {
    /// Execute on the calling thread right away. A trigger fired from an
    /// action runs to completion before the outer transition continues.
    /// Not safe for concurrent fires from several threads.
    Immediate,

    /// Serialize every fire through a FIFO. A trigger fired from an action
    /// runs after the current transition finishes; concurrent callers
    /// enqueue and return while one caller drains.
    #[default]
    Queued,
}

pub(crate) struct QueuedTrigger<T> {
    ctx: FireContext,
    trigger: T,
    args: Args,
}

/// Pending requests and the flag telling whether a drainer is running.
pub(crate) struct FireQueue<T> {
    pending: VecDeque<QueuedTrigger<T>>,
    firing: bool,
}

impl<T> Default for FireQueue<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            firing: false,
        }
    }
}

/// Counts a fire as in flight for as long as it is alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Drainer role; releases the firing flag if the drain ends early.
struct Drain<'a, T> {
    queue: &'a Mutex<FireQueue<T>>,
    finished: bool,
}

impl<T> Drop for Drain<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.queue).firing = false;
        }
    }
}

// The queue holds no invariant an unwinding action can break.
fn lock<T>(queue: &Mutex<FireQueue<T>>) -> MutexGuard<'_, FireQueue<T>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Fire `trigger` without arguments.
    pub fn fire(&self, trigger: T) -> Result<(), FireError<S, T>> {
        self.fire_ctx(&FireContext::new(), trigger, Args::none())
    }

    /// Fire `trigger` with arguments.
    pub fn fire_with(&self, trigger: T, args: Args) -> Result<(), FireError<S, T>> {
        self.fire_ctx(&FireContext::new(), trigger, args)
    }

    /// Fire `trigger` under `ctx`.
    ///
    /// Fails with [`FireError::Cancelled`] without touching state if `ctx`
    /// is already cancelled. In queued mode the call may return before the
    /// trigger is processed when another caller is draining the queue.
    ///
    /// In queued mode an error from any drained trigger is returned to the
    /// caller doing the draining. Triggers still in the queue at that point
    /// are not dispatched, and their callers are not told: they already
    /// returned `Ok`. They run, in order, on the next call that fires.
    pub fn fire_ctx(
        &self,
        ctx: &FireContext,
        trigger: T,
        args: Args,
    ) -> Result<(), FireError<S, T>> {
        if ctx.is_cancelled() {
            return Err(FireError::Cancelled { trigger });
        }
        match self.firing_mode {
            FiringMode::Immediate => {
                let _in_flight = InFlight::enter(&self.in_flight);
                self.fire_one(ctx, trigger, args)
            }
            FiringMode::Queued => self.fire_queued(ctx, trigger, args),
        }
    }

    fn fire_queued(&self, ctx: &FireContext, trigger: T, args: Args) -> Result<(), FireError<S, T>> {
        {
            let mut queue = lock(&self.queue);
            trace!(?trigger, pending = queue.pending.len(), "queueing trigger");
            queue.pending.push_back(QueuedTrigger {
                ctx: ctx.clone(),
                trigger,
                args,
            });
            if queue.firing {
                return Ok(());
            }
            queue.firing = true;
        }

        let _in_flight = InFlight::enter(&self.in_flight);
        let mut drain = Drain {
            queue: &self.queue,
            finished: false,
        };

        loop {
            let next = {
                let mut queue = lock(&self.queue);
                match queue.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        queue.firing = false;
                        drain.finished = true;
                        return Ok(());
                    }
                }
            };
            if next.ctx.is_cancelled() {
                debug!(trigger = ?next.trigger, "skipping cancelled queued trigger");
                continue;
            }
            if let Err(err) = self.fire_one(&next.ctx, next.trigger, next.args) {
                debug!(
                    pending = lock(&self.queue).pending.len(),
                    error = %err,
                    "queued trigger failed, remaining triggers wait for the next fire"
                );
                return Err(err);
            }
        }
    }
}
