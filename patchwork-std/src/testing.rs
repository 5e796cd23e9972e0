//! Testing utilities for Patchwork.
//!
//! Helpers for asserting on interception order and on how often an original
//! function ran.
//!
//! # Features
//!
//! - [`CallLog`]: a shared, ordered log several interceptors can write to
//! - [`RecordingInterceptor`]: an interceptor that records its activations
//! - [`CountingFunction`]: a native function that counts its invocations

use patchwork_core::{BoxError, Function, Intercept, Interceptor, InvocationContext, Value};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Call Log
// ============================================================================

/// An ordered log of labels, shared between interceptors.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let a = RecordingInterceptor::new("a", &log);
/// let b = RecordingInterceptor::new("b", &log);
///
/// registry.patch_with(&target, "run", a.interceptor(), PatchOptions::new())?;
/// registry.patch_with(&target, "run", b.interceptor(), PatchOptions::new())?;
/// target.get("run").call(&Value::Null, &[])?;
///
/// assert_eq!(log.entries(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// A copy of every entry, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

// ============================================================================
// Recording Interceptor
// ============================================================================

/// An interceptor that records every call it sees.
///
/// Each activation appends its label to a [`CallLog`] and keeps a copy of the
/// call's arguments. It never changes the call.
#[derive(Debug, Clone)]
pub struct RecordingInterceptor {
    label: String,
    log: CallLog,
    arguments: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl RecordingInterceptor {
    /// Record into a shared `log` under `label`.
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
            arguments: Arc::default(),
        }
    }

    /// Record into a private log.
    pub fn standalone(label: impl Into<String>) -> Self {
        Self::new(label, &CallLog::new())
    }

    /// A new registrable handle sharing this recorder's log. Keep the handle
    /// to unpatch it later: every call creates a distinct identity.
    pub fn interceptor(&self) -> Interceptor {
        Interceptor::new(self.clone())
    }

    /// The log this recorder writes to.
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Arguments of every recorded call, oldest first.
    pub fn arguments(&self) -> Vec<Vec<Value>> {
        self.arguments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        self.arguments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Intercept for RecordingInterceptor {
    fn intercept(&self, context: &mut InvocationContext<'_>) -> Result<(), BoxError> {
        self.log.push(self.label.clone());
        self.arguments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(context.arguments().to_vec());
        Ok(())
    }
}

// ============================================================================
// Counting Function
// ============================================================================

/// A native function that counts its invocations and echoes its first
/// argument.
#[derive(Debug, Clone)]
pub struct CountingFunction {
    function: Function,
    count: Arc<AtomicUsize>,
}

impl CountingFunction {
    /// Create a counting function called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let function = Function::new(name, move |invocation| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(invocation.arg(0))
        });
        Self { function, count }
    }

    /// The function itself.
    pub fn function(&self) -> &Function {
        &self.function
    }

    /// The function as a [`Value`], ready to store in an object slot.
    pub fn value(&self) -> Value {
        self.function.clone().into()
    }

    /// Number of times the function ran.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
