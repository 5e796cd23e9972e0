//! # patchwork - Injection Kernel
//!
//! `patchwork` lets extensions change the behavior of a live host application
//! whose internals are not exposed through a stable API. It has two halves:
//!
//! - **Interception**: attach any number of independent interceptors to one
//!   host function. They share a single proxy that keeps a stable identity, run
//!   in insertion order, and can each be removed on their own.
//! - **Traversal**: locate values inside deep, possibly cyclic object graphs
//!   with a fluent [`Cursor`] that short-circuits as soon as a step fails.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use patchwork::prelude::*;
//!
//! let registry = PatchRegistry::new();
//!
//! // Make console.log return "x" without printing.
//! let unpatch = registry.patch(&console, "log", |ctx| {
//!     ctx.prevent_default();
//!     ctx.set_return("x");
//!     Ok(())
//! })?;
//!
//! // Find a rendered component's click handler.
//! let on_click = Cursor::new(tree, Preset::Component)
//!     .find(|node| node.has("onClick"))
//!     .walk(["onClick"])
//!     .is_function()
//!     .into_value();
//!
//! unpatch.unpatch();
//! ```

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use patchwork_core::{
    // Error types
    BoxError,
    CallError,
    // Invocation
    CallKind,
    Function,
    FunctionId,
    // Interception
    Intercept,
    Interceptor,
    InterceptorFault,
    Invocation,
    InvocationContext,
    // Lookup
    Lookup,
    LookupOptions,
    ModuleFilter,
    ModuleId,
    NativeFn,
    // Values
    Array,
    Object,
    PatchError,
    Pending,
    Property,
    PropertyFlags,
    Value,
};

// Patching
pub use patchwork_std::registry::{
    FaultPolicy, PatchOptions, PatchRecord, PatchRegistry, PatchRegistryBuilder, Unpatch,
};

// Traversal
pub use patchwork_std::cursor::{Cursor, DEFAULT_MAX_VISITS, FindOptions, Preset, State, Walkable};

// Lookup
pub use patchwork_std::lookup::ModuleTable;

/// Generic module filters.
pub mod filters {
    pub use patchwork_std::lookup::filters::{by_display_name, by_props, by_source};
}

/// Standard interceptor implementations.
pub mod interceptors {
    #![allow(clippy::wildcard_imports)]
    pub use patchwork_std::interceptors::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use patchwork_std::testing::*;
}

/// Prelude module - common imports for Patchwork.
///
/// # Usage
///
/// ```rust,ignore
/// use patchwork::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        CallError,
        // Traversal
        Cursor,
        FindOptions,
        // Values
        Function,
        // Interception
        Intercept,
        Interceptor,
        InvocationContext,
        // Lookup
        Lookup,
        Object,
        PatchError,
        PatchOptions,
        // Patching
        PatchRegistry,
        Preset,
        Unpatch,
        Value,
        Walkable,
    };
}
