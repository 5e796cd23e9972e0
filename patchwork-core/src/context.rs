//! # Invocation Context
//!
//! The mutable view an interceptor receives for one call of a patched
//! function. A context is created fresh for every invocation and is never
//! shared between calls, so re-entrant invocations each get their own.
//!
//! # Surface
//!
//! - Read: [`arguments`](InvocationContext::arguments),
//!   [`this`](InvocationContext::this), [`kind`](InvocationContext::kind),
//!   [`return_value_set`](InvocationContext::return_value_set),
//!   [`return_value`](InvocationContext::return_value),
//!   [`default_prevented`](InvocationContext::default_prevented)
//! - Mutate: [`prevent_default`](InvocationContext::prevent_default),
//!   [`set_return`](InvocationContext::set_return)
//! - Delegate: [`call_original`](InvocationContext::call_original),
//!   [`call_original_with`](InvocationContext::call_original_with)
//!
//! # Example
//!
//! ```rust,ignore
//! registry.patch(&console, "log", |ctx| {
//!     // Upper-case the first argument and suppress the real call.
//!     let first = ctx.argument(0).to_string().to_uppercase();
//!     let result = ctx.call_original_with(&[Value::from(first)])?;
//!     ctx.set_return(result);
//!     ctx.prevent_default();
//!     Ok(())
//! })?;
//! ```

use crate::{
    error::CallError,
    function::{CallKind, Function, Invocation},
    value::Value,
};

/// Per-invocation state shared by every interceptor of one proxied call.
#[derive(Debug)]
pub struct InvocationContext<'a> {
    original: &'a Function,
    kind: CallKind,
    this: &'a Value,
    arguments: &'a [Value],
    return_value: Option<Value>,
    default_prevented: bool,
}

impl<'a> InvocationContext<'a> {
    /// Create a context for one invocation of `original`.
    pub fn new(original: &'a Function, invocation: Invocation<'a>) -> Self {
        Self {
            original,
            kind: invocation.kind,
            this: invocation.this,
            arguments: invocation.args,
            return_value: None,
            default_prevented: false,
        }
    }

    /// The arguments the proxy was called with.
    pub fn arguments(&self) -> &'a [Value] {
        self.arguments
    }

    /// Argument `index`, or [`Value::Null`] when missing.
    pub fn argument(&self, index: usize) -> Value {
        self.arguments.get(index).cloned().unwrap_or_default()
    }

    /// The receiver of the call.
    pub fn this(&self) -> &'a Value {
        self.this
    }

    /// Whether the proxy was called plainly or as a constructor.
    pub fn kind(&self) -> CallKind {
        self.kind
    }

    /// The unpatched function behind the proxy.
    pub fn original(&self) -> &'a Function {
        self.original
    }

    /// Returns `true` once any interceptor called [`prevent_default`](Self::prevent_default).
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Suppress the original call. Later interceptors still run.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Returns `true` once any interceptor called [`set_return`](Self::set_return).
    pub fn return_value_set(&self) -> bool {
        self.return_value.is_some()
    }

    /// The value most recently passed to [`set_return`](Self::set_return).
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// Override the proxy's result. The last call wins.
    pub fn set_return(&mut self, value: impl Into<Value>) {
        self.return_value = Some(value.into());
    }

    /// Take the override out of the context.
    pub fn take_return(&mut self) -> Option<Value> {
        self.return_value.take()
    }

    /// Invoke the original with the call's own arguments.
    pub fn call_original(&self) -> Result<Value, CallError> {
        self.call_original_with(self.arguments)
    }

    /// Invoke the original with replacement arguments.
    ///
    /// Constructor calls stay constructor calls and plain calls keep the
    /// original receiver.
    pub fn call_original_with(&self, args: &[Value]) -> Result<Value, CallError> {
        self.original.invoke(self.kind, self.this, args)
    }
}
