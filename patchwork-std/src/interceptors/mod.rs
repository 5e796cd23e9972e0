//! Reusable interceptors.
//!
//! - [`LoggingInterceptor`]: traces every call, never changes it.
//! - [`ConditionalInterceptor`]: runs an inner interceptor only when a
//!   predicate over the call holds.

mod conditional;
mod logging;

pub use conditional::ConditionalInterceptor;
pub use logging::LoggingInterceptor;
