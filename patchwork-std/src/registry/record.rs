//! One record per original function: its ordered interceptor set and the
//! single proxy that stands in for it.

use super::FaultPolicy;
use patchwork_core::{
    CallError, Function, Intercept, Interceptor, InterceptorFault, Invocation, InvocationContext,
    Value,
};
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, PoisonError, RwLock, Weak},
};

/// The interceptors registered on one original function, and its proxy.
///
/// Created on the first patch of an original and never recreated, so the
/// proxy's identity is stable for the registry's lifetime.
pub struct PatchRecord {
    original: Function,
    proxy: Function,
    interceptors: RwLock<Vec<Interceptor>>,
    policy: FaultPolicy,
}

impl PatchRecord {
    pub(crate) fn new(original: Function, policy: FaultPolicy) -> Arc<Self> {
        Arc::new_cyclic(|record: &Weak<PatchRecord>| {
            let record = record.clone();
            let fallback = original.clone();
            // The proxy only holds the record weakly; once the registry is
            // gone it degrades to calling the original directly.
            let proxy = Function::proxy_for(&original, move |invocation| match record.upgrade() {
                Some(record) => record.dispatch(invocation),
                None => fallback.invoke(invocation.kind, invocation.this, invocation.args),
            });
            PatchRecord {
                original,
                proxy,
                interceptors: RwLock::new(Vec::new()),
                policy,
            }
        })
    }

    /// The unpatched function.
    pub fn original(&self) -> &Function {
        &self.original
    }

    /// The proxy installed in place of the original.
    pub fn proxy(&self) -> &Function {
        &self.proxy
    }

    /// A snapshot of the registered interceptors, in insertion order.
    pub fn interceptors(&self) -> Vec<Interceptor> {
        self.interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` if `interceptor` is currently registered.
    pub fn contains(&self, interceptor: &Interceptor) -> bool {
        self.interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|i| i.ptr_eq(interceptor))
    }

    /// Number of registered interceptors.
    pub fn len(&self) -> usize {
        self.interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no interceptor is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `interceptor` unless the same handle is already present.
    pub(crate) fn add(&self, interceptor: Interceptor) -> bool {
        let mut interceptors = self
            .interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if interceptors.iter().any(|i| i.ptr_eq(&interceptor)) {
            return false;
        }
        interceptors.push(interceptor);
        true
    }

    /// Remove `interceptor`, keeping the relative order of the rest.
    pub(crate) fn remove(&self, interceptor: &Interceptor) -> bool {
        let mut interceptors = self
            .interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match interceptors.iter().position(|i| i.ptr_eq(interceptor)) {
            Some(index) => {
                interceptors.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run one proxied invocation.
    fn dispatch(&self, invocation: Invocation<'_>) -> Result<Value, CallError> {
        // Taken before any interceptor runs: interceptors that patch or
        // unpatch during the call only affect later calls.
        let snapshot = self.interceptors();
        let mut context = InvocationContext::new(&self.original, invocation);

        for (position, interceptor) in snapshot.iter().enumerate() {
            if let Err(fault) = run_interceptor(interceptor, &mut context, position) {
                match self.policy {
                    FaultPolicy::Isolate => tracing::warn!(
                        function = %self.original.name(),
                        position = fault.position,
                        error = %fault.message,
                        "interceptor failed, continuing with the next one"
                    ),
                    FaultPolicy::FailFast => return Err(fault.into()),
                }
            }
        }

        let original_return = if context.default_prevented() {
            Value::Null
        } else {
            context.call_original()?
        };

        Ok(context.take_return().unwrap_or(original_return))
    }
}

fn run_interceptor(
    interceptor: &Interceptor,
    context: &mut InvocationContext<'_>,
    position: usize,
) -> Result<(), InterceptorFault> {
    match panic::catch_unwind(AssertUnwindSafe(|| interceptor.intercept(context))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(InterceptorFault::new(position, error.to_string())),
        Err(payload) => Err(InterceptorFault::new(position, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "interceptor panicked".to_owned()
    }
}

impl fmt::Debug for PatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchRecord")
            .field("original", &self.original)
            .field("interceptors", &self.len())
            .field("policy", &self.policy)
            .finish()
    }
}
