//! # Patch Registry
//!
//! Multiplexed function interception. Any number of independent interceptors
//! can be attached to one host function; they all share a single proxy that
//! replaces the function in its slot, and each can be removed on its own.
//!
//! # Guarantees
//!
//! - **One record per original**: patching a slot that already holds a proxy
//!   resolves back to the original, so every extension composes onto the same
//!   record and the slot keeps one stable proxy.
//! - **Insertion order**: interceptors run in the order they were added;
//!   removing one never reorders the rest.
//! - **Isolation**: an [`Unpatch`] handle removes exactly the interceptor it
//!   was created for.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = PatchRegistry::new();
//! let unpatch = registry.patch(&console, "log", |ctx| {
//!     ctx.set_return("x");
//!     ctx.prevent_default();
//!     Ok(())
//! })?;
//!
//! // ... later
//! unpatch.unpatch();
//! ```

mod record;

pub use record::PatchRecord;

use patchwork_core::{
    BoxError, Function, FunctionId, Interceptor, InvocationContext, Object, PatchError, Property,
    Value,
};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, Weak},
};

/// What a proxy does when one of its interceptors fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Log the fault and continue with the next interceptor; the original
    /// still runs unless prevented.
    #[default]
    Isolate,
    /// Abort the invocation with [`CallError::Interceptor`](patchwork_core::CallError::Interceptor).
    FailFast,
}

/// Options for a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOptions {
    /// Install a no-op placeholder when the slot is missing or `Null`.
    pub force: bool,
}

impl PatchOptions {
    /// Default options (`force` enabled).
    pub fn new() -> Self {
        Self { force: true }
    }

    /// Set whether a missing slot receives a placeholder.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes one interceptor from one record.
///
/// Idempotent: calling [`unpatch`](Self::unpatch) again, or after the
/// registry is gone, does nothing.
#[derive(Debug, Clone)]
pub struct Unpatch {
    record: Weak<PatchRecord>,
    interceptor: Interceptor,
}

impl Unpatch {
    fn new(record: &Arc<PatchRecord>, interceptor: Interceptor) -> Self {
        Self {
            record: Arc::downgrade(record),
            interceptor,
        }
    }

    /// Remove the interceptor. Returns `true` if this call removed it.
    pub fn unpatch(&self) -> bool {
        let Some(record) = self.record.upgrade() else {
            return false;
        };
        let removed = record.remove(&self.interceptor);
        if removed {
            tracing::debug!(
                function = %record.original().name(),
                remaining = record.len(),
                "interceptor removed"
            );
        }
        removed
    }

    /// Returns `true` while the interceptor is still registered.
    pub fn is_active(&self) -> bool {
        self.record
            .upgrade()
            .is_some_and(|record| record.contains(&self.interceptor))
    }

    /// The interceptor this handle controls.
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }
}

/// The process-wide patch service.
///
/// Maps each original function's identity to its [`PatchRecord`]. Create one
/// explicitly at start-up and share it (e.g. behind an `Arc`) with every
/// extension; records live as long as the registry does.
pub struct PatchRegistry {
    records: RwLock<HashMap<FunctionId, Arc<PatchRecord>>>,
    policy: FaultPolicy,
}

impl PatchRegistry {
    /// Create a registry with the default [`FaultPolicy`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a registry.
    pub fn builder() -> PatchRegistryBuilder {
        PatchRegistryBuilder::new()
    }

    /// The policy applied by every proxy this registry creates.
    pub fn fault_policy(&self) -> FaultPolicy {
        self.policy
    }

    /// Attach a closure to `target[name]` with default [`PatchOptions`].
    pub fn patch<F>(&self, target: &Object, name: &str, interceptor: F) -> Result<Unpatch, PatchError>
    where
        F: Fn(&mut InvocationContext<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.patch_with(
            target,
            name,
            Interceptor::from_fn(interceptor),
            PatchOptions::new(),
        )
    }

    /// Attach `interceptor` to `target[name]`.
    ///
    /// Creates the record and proxy on the first patch of the underlying
    /// original, appends the interceptor, and installs the proxy in the slot
    /// while keeping the slot's other attributes.
    pub fn patch_with(
        &self,
        target: &Object,
        name: &str,
        interceptor: Interceptor,
        options: PatchOptions,
    ) -> Result<Unpatch, PatchError> {
        self.attach(target, name, interceptor, options)
            .map(|(handle, _)| handle)
    }

    /// Like [`patch_with`](Self::patch_with), but also reports whether the
    /// interceptor was newly added rather than already registered.
    fn attach(
        &self,
        target: &Object,
        name: &str,
        interceptor: Interceptor,
        options: PatchOptions,
    ) -> Result<(Unpatch, bool), PatchError> {
        if options.force && target.get(name).is_nullish() {
            target.set(name, Function::noop());
        }

        let current = match target.get(name) {
            Value::Function(function) => function,
            other => {
                return Err(PatchError::NotPatchable {
                    name: name.to_owned(),
                    found: other.type_name(),
                });
            }
        };
        let original = current.original().clone();
        let flags = target.property(name).map(|p| p.flags).unwrap_or_default();

        let record = match self.lookup(&original) {
            Some(record) if record.proxy().ptr_eq(&current) => record,
            existing => {
                let frozen = target
                    .property(name)
                    .is_some_and(|p| !p.is_writable() && !p.is_configurable());
                if frozen {
                    return Err(PatchError::ReadOnly {
                        name: name.to_owned(),
                    });
                }
                let record = existing.unwrap_or_else(|| self.record_for(&original));
                target.define(name, Property::new(record.proxy().clone(), flags));
                record
            }
        };

        let added = record.add(interceptor.clone());
        tracing::debug!(
            function = %original.name(),
            slot = name,
            interceptors = record.len(),
            added,
            "interceptor attached"
        );

        Ok((Unpatch::new(&record, interceptor), added))
    }

    /// Patch several slots of `target` at once.
    ///
    /// Returns one handle per entry, in order. If any entry fails, the
    /// interceptors added by this call are removed again before the error is
    /// returned. Interceptors that were already registered stay in place.
    pub fn patch_many<I, K>(
        &self,
        target: &Object,
        entries: I,
        options: PatchOptions,
    ) -> Result<Vec<Unpatch>, PatchError>
    where
        I: IntoIterator<Item = (K, Interceptor)>,
        K: AsRef<str>,
    {
        let mut handles = Vec::new();
        let mut added = Vec::new();
        for (name, interceptor) in entries {
            match self.attach(target, name.as_ref(), interceptor, options) {
                Ok((handle, fresh)) => {
                    added.push(fresh);
                    handles.push(handle);
                }
                Err(error) => {
                    for (handle, _) in handles.iter().zip(&added).filter(|(_, fresh)| **fresh) {
                        handle.unpatch();
                    }
                    return Err(error);
                }
            }
        }
        Ok(handles)
    }

    /// The record for `function`, resolving proxies to their original.
    pub fn record(&self, function: &Function) -> Option<Arc<PatchRecord>> {
        self.lookup(function.original())
    }

    /// Returns `true` if `function` (or the original behind it) has at least
    /// one interceptor.
    pub fn is_patched(&self, function: &Function) -> bool {
        self.record(function).is_some_and(|record| !record.is_empty())
    }

    /// Number of originals that have ever been patched.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been patched yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, original: &Function) -> Option<Arc<PatchRecord>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&original.id())
            .cloned()
    }

    fn record_for(&self, original: &Function) -> Arc<PatchRecord> {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        records
            .entry(original.id())
            .or_insert_with(|| {
                tracing::debug!(function = %original.name(), "creating patch record");
                PatchRecord::new(original.clone(), self.policy)
            })
            .clone()
    }
}

impl Default for PatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a [`PatchRegistry`].
#[derive(Debug, Clone, Default)]
pub struct PatchRegistryBuilder {
    policy: FaultPolicy,
}

impl PatchRegistryBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fault policy of every proxy the registry creates.
    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the registry.
    pub fn build(self) -> PatchRegistry {
        PatchRegistry {
            records: RwLock::new(HashMap::new()),
            policy: self.policy,
        }
    }
}
