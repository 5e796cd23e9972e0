//! Bounded breadth-first search over a value graph.

use super::preset::Walkable;
use patchwork_core::Value;
use std::collections::VecDeque;

/// Default node-visit budget of a search.
pub const DEFAULT_MAX_VISITS: usize = 100;

/// Options for [`Cursor::find_with`](super::Cursor::find_with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOptions {
    /// Keys never traversed into, even when walkable.
    pub ignore: Vec<String>,
    /// Overrides the cursor's preset when set.
    pub walkable: Option<Walkable>,
    /// Maximum number of nodes tested before the search gives up.
    pub max_visits: usize,
}

impl FindOptions {
    /// Default options: no deny-list, the cursor's preset, 100 visits.
    pub fn new() -> Self {
        Self {
            ignore: Vec::new(),
            walkable: None,
            max_visits: DEFAULT_MAX_VISITS,
        }
    }

    /// Set the deny-list.
    pub fn ignore<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Override the walkable keys.
    pub fn walkable(mut self, walkable: Walkable) -> Self {
        self.walkable = Some(walkable);
        self
    }

    /// Set the visit budget.
    pub fn max_visits(mut self, max_visits: usize) -> Self {
        self.max_visits = max_visits;
        self
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Search from `root`, returning the first node accepted by `predicate`.
///
/// Sequences enqueue every element; objects enqueue the values of enumerable
/// keys that `walkable` allows and `ignore` does not list. Every other value
/// is a leaf. `None` means the queue or the budget ran out.
pub(super) fn breadth_first<P>(
    root: &Value,
    predicate: P,
    walkable: &Walkable,
    ignore: &[String],
    max_visits: usize,
) -> Option<Value>
where
    P: Fn(&Value) -> bool,
{
    let mut queue = VecDeque::from([root.clone()]);
    let mut visits = 0;

    while visits < max_visits {
        let Some(node) = queue.pop_front() else {
            break;
        };
        visits += 1;

        if predicate(&node) {
            tracing::trace!(visits, "search matched");
            return Some(node);
        }

        match &node {
            Value::Array(array) => queue.extend(array.snapshot()),
            Value::Object(object) => queue.extend(
                object
                    .enumerable_entries()
                    .into_iter()
                    .filter(|(key, _)| walkable.allows(key) && !ignore.iter().any(|i| i == key))
                    .map(|(_, value)| value),
            ),
            _ => {}
        }
    }

    tracing::trace!(visits, queued = queue.len(), "search exhausted");
    None
}
