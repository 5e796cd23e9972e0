//! # Lookup Service
//!
//! The contract the kernel consumes from whatever resolves live values out of
//! a host's module registry. Resolution itself (finding the registry, waiting
//! for it to become ready) is host-specific and lives behind this trait; the
//! kernel only needs "a nullable single value, or every match".
//!
//! Lookups seed [`Cursor`] roots and patch targets:
//!
//! ```rust,ignore
//! let dispatcher = modules.get_by_props(&["dispatch", "subscribe"]);
//! let root = Cursor::new(dispatcher.unwrap_or_default(), Preset::Empty);
//! ```
//!
//! [`Cursor`]: https://docs.rs/patchwork-std/latest/patchwork_std/cursor/struct.Cursor.html

use crate::value::Value;
use regex::Regex;
use std::fmt;

/// Identifier of a module inside the host registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A predicate over module exports.
pub type ModuleFilter<'a> = &'a dyn Fn(&Value, ModuleId) -> bool;

/// Options for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// When a match is found on an ES-module `default` export, return the
    /// `default` value itself (`true`) or the whole exports object (`false`).
    pub default_export: bool,
}

impl LookupOptions {
    /// Default options: return `default` exports directly.
    pub fn new() -> Self {
        Self {
            default_export: true,
        }
    }

    /// Set whether `default` exports are returned directly.
    pub fn default_export(mut self, default_export: bool) -> Self {
        self.default_export = default_export;
        self
    }
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A source of live host values.
pub trait Lookup {
    /// The first module whose exports match `filter`.
    fn get_module(&self, filter: ModuleFilter<'_>, options: LookupOptions) -> Option<Value>;

    /// Every module whose exports match `filter`, in registry order.
    fn get_modules(&self, filter: ModuleFilter<'_>, options: LookupOptions) -> Vec<Value>;

    /// The first module exposing every key in `props`.
    fn get_by_props(&self, props: &[&str]) -> Option<Value> {
        self.get_module(&filters::by_props(props), LookupOptions::new())
    }

    /// Every module exposing every key in `props`.
    fn get_all_by_props(&self, props: &[&str]) -> Vec<Value> {
        self.get_modules(&filters::by_props(props), LookupOptions::new())
    }

    /// The first module whose `displayName` equals `name`.
    fn get_by_display_name(&self, name: &str) -> Option<Value> {
        self.get_module(&filters::by_display_name(name), LookupOptions::new())
    }

    /// The first module whose rendered text matches `pattern`.
    fn get_by_regex(&self, pattern: &Regex) -> Option<Value> {
        self.get_module(&filters::by_source(pattern.clone()), LookupOptions::new())
    }

    /// The first module whose `default` export matches `filter`.
    fn get_default(&self, filter: ModuleFilter<'_>) -> Option<Value> {
        self.get_module(&|m, id| filter(&m.get("default"), id), LookupOptions::new())
    }
}

/// Generic module filters.
pub mod filters {
    use super::ModuleId;
    use crate::value::Value;
    use regex::Regex;

    /// Matches modules exposing every key in `props`.
    pub fn by_props<S: AsRef<str>>(
        props: impl IntoIterator<Item = S>,
    ) -> impl Fn(&Value, ModuleId) -> bool + Send + Sync + 'static {
        let props: Vec<String> = props.into_iter().map(|p| p.as_ref().to_owned()).collect();
        move |module, _| props.iter().all(|prop| module.has(prop))
    }

    /// Matches modules whose `displayName` equals `name`.
    pub fn by_display_name(
        name: impl Into<String>,
    ) -> impl Fn(&Value, ModuleId) -> bool + Send + Sync + 'static {
        let name = name.into();
        move |module, _| module.get("displayName").as_str() == Some(name.as_str())
    }

    /// Matches modules whose [`Display`](std::fmt::Display) rendering
    /// contains a match for `pattern`.
    pub fn by_source(pattern: Regex) -> impl Fn(&Value, ModuleId) -> bool + Send + Sync + 'static {
        move |module, _| pattern.is_match(&module.to_string())
    }
}
