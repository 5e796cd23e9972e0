//! In-memory module table.
//!
//! [`ModuleTable`] is the reference [`Lookup`] implementation: a host (or a
//! test) inserts module exports under their ids, and lookups scan them in
//! insertion order with the same matching rules a bundled host registry
//! uses.
//!
//! # Matching
//!
//! - Only exports that are object-like or functions are considered.
//! - The filter is tried on the exports first.
//! - Otherwise, for ES-module exports (those with an `__esModule` key) whose
//!   `default` is object-like or a function, the filter is tried on
//!   `default`. [`LookupOptions::default_export`] then decides whether the
//!   `default` value or the whole exports are returned.
//! - A panicking filter counts as "no match".

pub use patchwork_core::lookup::filters;

use patchwork_core::{Lookup, LookupOptions, ModuleFilter, ModuleId, Value};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{PoisonError, RwLock},
};

/// Insertion-ordered table of module exports.
#[derive(Debug, Default)]
pub struct ModuleTable {
    modules: RwLock<Vec<(ModuleId, Value)>>,
}

impl ModuleTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `exports` under `id`, replacing any previous exports of `id`
    /// in place.
    pub fn insert(&self, id: ModuleId, exports: impl Into<Value>) {
        let exports = exports.into();
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        match modules.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = exports,
            None => modules.push((id, exports)),
        }
    }

    /// The exports registered under `id`.
    pub fn get_by_index(&self, id: ModuleId) -> Option<Value> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, exports)| exports.clone())
    }

    /// The id of the first module matching `filter`.
    pub fn get_index(&self, filter: ModuleFilter<'_>) -> Option<ModuleId> {
        self.scan(filter, LookupOptions::new())
            .next()
            .map(|(id, _)| id)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no module is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn scan<'a>(
        &self,
        filter: ModuleFilter<'a>,
        options: LookupOptions,
    ) -> impl Iterator<Item = (ModuleId, Value)> + use<'a> {
        // Filters may touch the table themselves, so none runs under the lock.
        let snapshot = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        snapshot.into_iter().filter_map(move |(id, exports)| {
            if !is_exportable(&exports) {
                return None;
            }
            if accepts(filter, &exports, id) {
                return Some((id, exports));
            }
            if !exports.has("__esModule") {
                return None;
            }
            let default = exports.get("default");
            if !is_exportable(&default) || !accepts(filter, &default, id) {
                return None;
            }
            Some((id, if options.default_export { default } else { exports }))
        })
    }
}

impl Lookup for ModuleTable {
    fn get_module(&self, filter: ModuleFilter<'_>, options: LookupOptions) -> Option<Value> {
        self.scan(filter, options).next().map(|(_, value)| value)
    }

    fn get_modules(&self, filter: ModuleFilter<'_>, options: LookupOptions) -> Vec<Value> {
        self.scan(filter, options).map(|(_, value)| value).collect()
    }
}

fn is_exportable(value: &Value) -> bool {
    matches!(value.type_name(), "object" | "function")
}

fn accepts(filter: ModuleFilter<'_>, exports: &Value, id: ModuleId) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| filter(exports, id))) {
        Ok(matched) => matched,
        Err(_) => {
            tracing::warn!(module = %id, "module filter panicked, treating as no match");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::{Function, Object};

    fn es_module(default: impl Into<Value>) -> Object {
        [("__esModule", Value::from(true)), ("default", default.into())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_first_match_in_insertion_order() {
        let table = ModuleTable::new();
        let first: Object = [("dispatch", 1)].into_iter().collect();
        let second: Object = [("dispatch", 2)].into_iter().collect();
        table.insert(ModuleId(9), first.clone());
        table.insert(ModuleId(3), second.clone());

        let filter = filters::by_props(["dispatch"]);
        assert_eq!(table.get_module(&filter, LookupOptions::new()), Some(first.into()));
        assert_eq!(table.get_modules(&filter, LookupOptions::new()).len(), 2);
        assert_eq!(table.get_index(&filter), Some(ModuleId(9)));
    }

    #[test]
    fn test_primitive_exports_are_skipped() {
        let table = ModuleTable::new();
        table.insert(ModuleId(1), "a string module");
        table.insert(ModuleId(2), Value::Null);
        assert_eq!(table.get_module(&|_, _| true, LookupOptions::new()), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_default_export_resolution() {
        let table = ModuleTable::new();
        let component = Function::noop().with_metadata("displayName", "Avatar");
        let module = es_module(component.clone());
        table.insert(ModuleId(1), module.clone());

        assert_eq!(table.get_by_display_name("Avatar"), Some(component.into()));
        let whole = table.get_module(
            &filters::by_display_name("Avatar"),
            LookupOptions::new().default_export(false),
        );
        assert_eq!(whole, Some(module.into()));
    }

    #[test]
    fn test_default_requires_es_module_marker() {
        let table = ModuleTable::new();
        let component = Function::noop().with_metadata("displayName", "Avatar");
        let plain: Object = [("default", Value::from(component))].into_iter().collect();
        table.insert(ModuleId(1), plain);
        assert_eq!(table.get_by_display_name("Avatar"), None);
    }

    #[test]
    fn test_panicking_filter_is_no_match() {
        let table = ModuleTable::new();
        table.insert(ModuleId(1), Object::new());
        let target: Object = [("ok", true)].into_iter().collect();
        table.insert(ModuleId(2), target.clone());

        let found = table.get_module(
            &|m, id| {
                if id == ModuleId(1) {
                    panic!("bad filter");
                }
                m.has("ok")
            },
            LookupOptions::new(),
        );
        assert_eq!(found, Some(target.into()));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let table = ModuleTable::new();
        table.insert(ModuleId(1), Object::new());
        table.insert(ModuleId(2), Object::new());
        let replacement: Object = [("v", 2)].into_iter().collect();
        table.insert(ModuleId(1), replacement.clone());

        assert_eq!(table.len(), 2);
        assert_eq!(table.get_by_index(ModuleId(1)), Some(replacement.into()));
        assert_eq!(table.get_index(&|m, _| m.has("v")), Some(ModuleId(1)));
        assert_eq!(table.get_by_index(ModuleId(7)), None);
    }

    #[test]
    fn test_filter_may_reenter_table() {
        let table = ModuleTable::new();
        table.insert(ModuleId(1), Object::new());
        let found = table.get_module(&|_, _| table.len() == 1, LookupOptions::new());
        assert!(found.is_some());
    }
}
