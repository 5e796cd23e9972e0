//! # patchwork-std
//!
//! Standard implementations for the Patchwork injection kernel.
//!
//! This crate provides:
//! - **Patching**: [`PatchRegistry`](registry::PatchRegistry), one stable proxy per
//!   original with any number of independently removable interceptors
//! - **Traversal**: [`Cursor`](cursor::Cursor), short-circuiting queries over value graphs
//! - **Lookup**: [`ModuleTable`](lookup::ModuleTable), an in-memory module registry
//! - **Standard interceptors**: Logging, Conditional
//! - **Testing**: recorders and counters for asserting on interception

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use patchwork_core;

// Modules
pub mod cursor;
pub mod interceptors;
pub mod lookup;
pub mod registry;
pub mod testing;
