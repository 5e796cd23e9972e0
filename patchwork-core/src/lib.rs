//! # patchwork-core
//!
//! Core value model and interception traits for the Patchwork injection kernel.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! extensions that only need to describe interceptors or expose host values,
//! without pulling in the registry and cursor from `patchwork-std`.
//!
//! # Building Blocks
//!
//! ## Host Values ([`Value`])
//!
//! The run-time object graph of the host application: primitives plus shared
//! [`Object`], [`Array`], [`Function`] and [`Pending`] handles. Reference types
//! compare by identity, the way the host compares them.
//!
//! ## Callables ([`Function`])
//!
//! The composition key of patching. A function exposes only what the kernel
//! needs: invoke, construct, and its static metadata. Proxies remember the
//! function they replace, so nested patching always resolves to the original.
//!
//! ## Interception ([`Intercept`], [`InvocationContext`])
//!
//! Interceptors observe or modify one invocation through a per-call context:
//! read the arguments, override the result, suppress the original, or call it
//! with rewritten arguments.
//!
//! ## Lookup ([`Lookup`])
//!
//! The contract for the external service that resolves live values out of a
//! host's module registry.
//!
//! # Error Types
//!
//! - [`PatchError`] - Registration errors
//! - [`CallError`] - Invocation errors
//! - [`InterceptorFault`] - A failing interceptor

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod function;
mod interceptor;
pub mod lookup;
mod pending;
mod value;

// Re-exports
pub use context::InvocationContext;
pub use error::{BoxError, CallError, InterceptorFault, PatchError};
pub use function::{CallKind, Function, FunctionId, Invocation, NativeFn};
pub use interceptor::{Intercept, Interceptor};
pub use lookup::{Lookup, LookupOptions, ModuleFilter, ModuleId};
pub use pending::Pending;
pub use value::{Array, Object, Property, PropertyFlags, Value};
