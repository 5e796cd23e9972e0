//! Host callables with stable identity.
//!
//! A [`Function`] is the composition key of the patch registry: two handles
//! are the same function exactly when they share an allocation. The interface
//! is deliberately narrow (invoke, construct, metadata) so the kernel never
//! has to reflect over host shapes it does not understand.

use crate::{
    error::CallError,
    value::{Object, Value},
};
use std::{fmt, sync::Arc};

/// How a function is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// A plain call with an explicit receiver.
    Call,
    /// A constructor call (`new f(...)`).
    Construct,
}

/// The arguments of one invocation, as seen by a native body.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Plain call or constructor call.
    pub kind: CallKind,
    /// The receiver. For constructor calls this is the freshly allocated object.
    pub this: &'a Value,
    /// The positional arguments.
    pub args: &'a [Value],
}

impl<'a> Invocation<'a> {
    /// Create a plain-call invocation.
    pub fn call(this: &'a Value, args: &'a [Value]) -> Self {
        Self {
            kind: CallKind::Call,
            this,
            args,
        }
    }

    /// Positional argument `index`, or [`Value::Null`] when missing.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }
}

/// The native body of a [`Function`].
pub type NativeFn = dyn Fn(Invocation<'_>) -> Result<Value, CallError> + Send + Sync;

/// Opaque identity of a [`Function`].
///
/// Stable for as long as any handle to the function is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(usize);

struct FunctionInner {
    name: String,
    constructible: bool,
    metadata: Object,
    proxy_target: Option<Function>,
    body: Box<NativeFn>,
}

/// A shared host callable.
#[derive(Clone)]
pub struct Function(Arc<FunctionInner>);

impl Function {
    /// Wrap a native closure as a plain (non-constructible) function.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::build(name.into(), false, Object::new(), None, Box::new(body))
    }

    /// Wrap a native closure as a function that also supports [`construct`](Self::construct).
    pub fn constructor<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::build(name.into(), true, Object::new(), None, Box::new(body))
    }

    /// An anonymous function that does nothing and returns [`Value::Null`].
    pub fn noop() -> Self {
        Self::new("", |_| Ok(Value::Null))
    }

    /// Build a replacement for `original`.
    ///
    /// The result carries copies of every metadata descriptor of `original`,
    /// the same name and constructibility, and a back-reference readable via
    /// [`proxy_target`](Self::proxy_target).
    pub fn proxy_for<F>(original: &Function, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self::build(
            original.0.name.clone(),
            original.0.constructible,
            original.0.metadata.copy_descriptors(),
            Some(original.clone()),
            Box::new(body),
        )
    }

    fn build(
        name: String,
        constructible: bool,
        metadata: Object,
        proxy_target: Option<Function>,
        body: Box<NativeFn>,
    ) -> Self {
        Self(Arc::new(FunctionInner {
            name,
            constructible,
            metadata,
            proxy_target,
            body,
        }))
    }

    /// Attach a metadata property (e.g. `displayName`), builder style.
    pub fn with_metadata(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.metadata.set(key, value);
        self
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns `true` if the function supports constructor calls.
    pub fn is_constructor(&self) -> bool {
        self.0.constructible
    }

    /// Static properties carried by the function (its own enumerable metadata).
    pub fn metadata(&self) -> &Object {
        &self.0.metadata
    }

    /// The function this one replaces, if it was built by [`proxy_for`](Self::proxy_for).
    pub fn proxy_target(&self) -> Option<&Function> {
        self.0.proxy_target.as_ref()
    }

    /// Returns `true` if this function is a proxy for another.
    pub fn is_proxy(&self) -> bool {
        self.0.proxy_target.is_some()
    }

    /// The true original behind any chain of proxies.
    pub fn original(&self) -> &Function {
        let mut current = self;
        while let Some(target) = current.proxy_target() {
            current = target;
        }
        current
    }

    /// Identity of this function.
    pub fn id(&self) -> FunctionId {
        FunctionId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Plain call with an explicit receiver.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, CallError> {
        (self.0.body)(Invocation::call(this, args))
    }

    /// Constructor call.
    ///
    /// A fresh object is passed as the receiver. If the body returns an
    /// object, array or function that value is the result, otherwise the
    /// receiver is.
    pub fn construct(&self, args: &[Value]) -> Result<Value, CallError> {
        if !self.0.constructible {
            return Err(CallError::NotConstructible {
                name: self.0.name.clone(),
            });
        }
        let this = Value::Object(Object::new());
        let result = (self.0.body)(Invocation {
            kind: CallKind::Construct,
            this: &this,
            args,
        })?;
        Ok(match result {
            Value::Object(_) | Value::Array(_) | Value::Function(_) => result,
            _ => this,
        })
    }

    /// Dispatch on `kind`. The receiver is ignored for constructor calls.
    pub fn invoke(&self, kind: CallKind, this: &Value, args: &[Value]) -> Result<Value, CallError> {
        match kind {
            CallKind::Call => self.call(this, args),
            CallKind::Construct => self.construct(args),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.0.name)
            .field("proxy", &self.is_proxy())
            .finish()
    }
}

impl Value {
    /// Call this value as a function.
    ///
    /// Fails with [`CallError::NotCallable`] if it is not one.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, CallError> {
        match self {
            Value::Function(function) => function.call(this, args),
            other => Err(CallError::NotCallable {
                found: other.type_name(),
            }),
        }
    }
}
