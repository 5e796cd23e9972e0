//! Error types for Patchwork.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`PatchError`] - Errors raised synchronously while registering a patch
//! - [`CallError`] - Errors raised while invoking a host function
//! - [`InterceptorFault`] - A failure reported by a single interceptor

use crate::value::Value;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering a patch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    /// The slot holds something that is not a function and was not created via `force`.
    #[error("`{name}` is not patchable: expected a function, found {found}")]
    NotPatchable {
        /// The slot name.
        name: String,
        /// The host type name of the value found in the slot.
        found: &'static str,
    },

    /// The slot can neither be written nor redefined.
    #[error("`{name}` is read-only and cannot receive a proxy")]
    ReadOnly {
        /// The slot name.
        name: String,
    },
}

/// Errors that can occur while invoking a host function.
///
/// The type is `Clone` so that a settled [`Pending`](crate::Pending) value can
/// hand the same failure to every waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    /// The function raised a host value.
    #[error("function threw: {0:?}")]
    Thrown(Value),

    /// The callee is not a function.
    #[error("value of type `{found}` is not callable")]
    NotCallable {
        /// The host type name of the callee.
        found: &'static str,
    },

    /// The function was invoked as a constructor but does not support it.
    #[error("`{name}` is not a constructor")]
    NotConstructible {
        /// The function name.
        name: String,
    },

    /// An interceptor failed and the registry runs with a fail-fast policy.
    #[error(transparent)]
    Interceptor(#[from] InterceptorFault),
}

impl CallError {
    /// Convenience constructor for a thrown host value.
    pub fn thrown(value: impl Into<Value>) -> Self {
        CallError::Thrown(value.into())
    }
}

/// A failure reported by one interceptor during a proxied call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("interceptor #{position} failed: {message}")]
pub struct InterceptorFault {
    /// Zero-based position of the interceptor in the invocation snapshot.
    pub position: usize,
    /// Rendered error or panic payload.
    pub message: String,
}

impl InterceptorFault {
    /// Create a fault for the interceptor at `position`.
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}
