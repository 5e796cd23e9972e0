//! Conditional interceptor: run an inner interceptor only for some calls.

use patchwork_core::{BoxError, Intercept, InvocationContext};

/// An interceptor that conditionally runs an inner interceptor.
///
/// When the condition is `false` the call passes through untouched.
///
/// # Example
///
/// ```rust,ignore
/// use patchwork::{ConditionalInterceptor, Interceptor, Value};
///
/// // Only silence calls whose first argument is "debug".
/// let quiet = ConditionalInterceptor::new(
///     |ctx: &InvocationContext<'_>| ctx.argument(0) == Value::from("debug"),
///     |ctx: &mut InvocationContext<'_>| {
///         ctx.prevent_default();
///         Ok(())
///     },
/// );
/// registry.patch_with(&console, "log", Interceptor::new(quiet), PatchOptions::new())?;
/// ```
#[derive(Debug, Clone)]
pub struct ConditionalInterceptor<C, I> {
    condition: C,
    inner: I,
}

impl<C, I> ConditionalInterceptor<C, I> {
    /// Create a new `ConditionalInterceptor`.
    ///
    /// `inner` runs only when `condition(context)` returns `true`.
    pub fn new(condition: C, inner: I) -> Self {
        Self { condition, inner }
    }
}

impl<C, I> Intercept for ConditionalInterceptor<C, I>
where
    C: Fn(&InvocationContext<'_>) -> bool + Send + Sync + 'static,
    I: Intercept,
{
    fn intercept(&self, context: &mut InvocationContext<'_>) -> Result<(), BoxError> {
        if (self.condition)(context) {
            self.inner.intercept(context)
        } else {
            Ok(())
        }
    }
}
