//! Opaque argument payload carried by a fired trigger.
//!
//! The engine never inspects the payload. Guards, actions and dynamic
//! selectors receive it as-is and downcast to whatever type the caller
//! attached at the call site.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

/// Type-erased arguments passed along with a trigger.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::Args;
///
/// let args = Args::new(42u32);
/// assert_eq!(args.get::<u32>(), Some(&42));
/// assert_eq!(args.get::<String>(), None);
///
/// let empty = Args::none();
/// assert!(empty.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct Args {
    payload: Option<Payload>,
}

impl Args {
    /// Arguments carrying no payload.
    pub fn none() -> Self {
        Self { payload: None }
    }

    /// Wrap a value as the trigger's payload.
    pub fn new<A>(value: A) -> Self
    where
        A: Any + Send + Sync,
    {
        Self {
            payload: Some(Payload {
                value: Arc::new(value),
                type_id: TypeId::of::<A>(),
                type_name: std::any::type_name::<A>(),
            }),
        }
    }

    /// Borrow the payload as `A`, if that is what it holds.
    pub fn get<A: Any>(&self) -> Option<&A> {
        self.payload
            .as_ref()
            .and_then(|payload| payload.value.downcast_ref::<A>())
    }

    /// Whether any payload was attached.
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// `TypeId` of the attached payload.
    pub fn type_id(&self) -> Option<TypeId> {
        self.payload.as_ref().map(|payload| payload.type_id)
    }

    /// Type name of the attached payload, or `"()"` when empty.
    pub fn type_name(&self) -> &'static str {
        self.payload
            .as_ref()
            .map_or("()", |payload| payload.type_name)
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(payload) => f.debug_tuple("Args").field(&payload.type_name).finish(),
            None => f.write_str("Args(none)"),
        }
    }
}
