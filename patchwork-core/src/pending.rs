//! Deferred host values.

use crate::{error::CallError, value::Value};
use futures::{
    FutureExt,
    future::{self, BoxFuture, Shared},
};
use std::{fmt, future::Future, sync::Arc};

type SharedOutcome = Shared<BoxFuture<'static, Result<Value, CallError>>>;

/// A value that settles later, either resolving to a [`Value`] or rejecting
/// with a [`CallError`].
///
/// Cloning shares the same underlying computation; every clone observes the
/// same outcome.
#[derive(Clone)]
pub struct Pending(Arc<SharedOutcome>);

impl Pending {
    /// Wrap a future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value, CallError>> + Send + 'static,
    {
        Self(Arc::new(future.boxed().shared()))
    }

    /// An already-resolved pending value.
    pub fn resolved(value: impl Into<Value>) -> Self {
        Self::new(future::ready(Ok(value.into())))
    }

    /// An already-rejected pending value.
    pub fn rejected(error: CallError) -> Self {
        Self::new(future::ready(Err(error)))
    }

    /// Wait for the outcome.
    pub async fn settle(&self) -> Result<Value, CallError> {
        SharedOutcome::clone(&self.0).await
    }

    /// The outcome, if it is already available.
    pub fn peek(&self) -> Option<Result<Value, CallError>> {
        self.0.peek().cloned()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Pending) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("settled", &self.0.peek().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolved_settles() {
        let pending = Pending::resolved(4);
        assert_eq!(pending.settle().await, Ok(Value::from(4)));
        assert_eq!(pending.peek(), Some(Ok(Value::from(4))));
    }

    #[tokio::test]
    async fn test_clones_share_outcome() {
        let pending = Pending::new(async { Err(CallError::thrown("nope")) });
        let clone = pending.clone();
        assert!(pending.ptr_eq(&clone));
        assert_eq!(clone.settle().await, Err(CallError::thrown("nope")));
        assert_eq!(pending.settle().await, Err(CallError::thrown("nope")));
    }
}
