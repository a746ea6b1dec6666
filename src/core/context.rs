//! Execution context handed to every guard, action and storage call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag signalling that pending work should not start.
///
/// Cancellation is only consulted when a fire request is about to be
/// dispatched; an in-flight transition always runs to completion.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Context a fire request executes under.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::{CancellationToken, FireContext};
///
/// let token = CancellationToken::new();
/// let ctx = FireContext::with_cancellation(token.clone());
/// assert!(!ctx.is_cancelled());
///
/// token.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct FireContext {
    cancellation: CancellationToken,
}

impl FireContext {
    /// A context that is never cancelled unless its token is.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_not_cancelled() {
        assert!(!FireContext::new().is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let ctx = FireContext::with_cancellation(token.clone());
        let cloned = ctx.clone();

        token.cancel();

        assert!(ctx.is_cancelled());
        assert!(cloned.is_cancelled());
        assert!(cloned.cancellation().is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
