//! # Interceptors
//!
//! The unit of behavior an extension attaches to a patched function.
//!
//! Interceptors are synchronous: they run to completion inside the proxied
//! call, in registration order, each receiving the same
//! [`InvocationContext`]. An `Err` (or a panic) is an interceptor fault; what
//! happens next is decided by the registry's fault policy.
//!
//! # Static vs Shared
//!
//! Implement [`Intercept`] for reusable types, or pass a closure. Wrap either
//! in an [`Interceptor`] when the same instance must be registered (and later
//! recognized) more than once: interceptor sets compare handles by identity.

use crate::{context::InvocationContext, error::BoxError};
use std::{fmt, sync::Arc};

/// Behavior run around every call of a patched function.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Intercept`",
    label = "missing `Intercept` implementation",
    note = "Closures must have the signature `Fn(&mut InvocationContext<'_>) -> Result<(), BoxError>`."
)]
pub trait Intercept: Send + Sync + 'static {
    /// Observe or modify one invocation.
    fn intercept(&self, context: &mut InvocationContext<'_>) -> Result<(), BoxError>;
}

impl<F> Intercept for F
where
    F: Fn(&mut InvocationContext<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn intercept(&self, context: &mut InvocationContext<'_>) -> Result<(), BoxError> {
        self(context)
    }
}

/// A shared, identity-carrying interceptor handle.
#[derive(Clone)]
pub struct Interceptor(Arc<dyn Intercept>);

impl Interceptor {
    /// Wrap any [`Intercept`] implementation.
    pub fn new<I: Intercept>(interceptor: I) -> Self {
        Self(Arc::new(interceptor))
    }

    /// Wrap a closure. Prefer this over [`new`](Self::new) for closures so the
    /// argument type is inferred.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut InvocationContext<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Interceptor) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Intercept for Interceptor {
    fn intercept(&self, context: &mut InvocationContext<'_>) -> Result<(), BoxError> {
        self.0.intercept(context)
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interceptor({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}
