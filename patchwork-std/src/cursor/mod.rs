//! Fluent queries over a rooted value graph.
//!
//! A [`Cursor`] holds one current value and a [`State`]. Every operation
//! consumes the cursor and returns it, either still [`State::Live`] with a new
//! current value, or [`State::Broken`]. Once broken, a cursor ignores every
//! further step, so a chain never needs intermediate checks:
//!
//! ```ignore
//! let button = Cursor::new(tree, Preset::Component)
//!     .find(|v| v.has("onClick"))
//!     .walk(["props", "onClick"])
//!     .is_function()
//!     .into_value();
//! ```
//!
//! A failed search is not an error: the cursor ends broken with a
//! [`Value::Null`] current value.

mod find;
mod preset;

pub use find::{DEFAULT_MAX_VISITS, FindOptions};
pub use preset::{Preset, Walkable};

use patchwork_core::{CallError, Value};
use std::fmt;

/// Whether a [`Cursor`] still accepts steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Steps are applied.
    Live,
    /// Terminal: steps are no-ops.
    Broken,
}

/// A short-circuiting query over a value graph.
#[derive(Debug, Clone)]
pub struct Cursor {
    current: Value,
    state: State,
    walkable: Walkable,
    error: Option<CallError>,
}

impl Cursor {
    /// Start at `root`, walking the keys of `preset` in [`find`](Self::find).
    pub fn new(root: impl Into<Value>, preset: Preset) -> Self {
        Self {
            current: root.into(),
            state: State::Live,
            walkable: preset.walkable(),
            error: None,
        }
    }

    /// Start at `root` with no walkable keys.
    pub fn root(root: impl Into<Value>) -> Self {
        Self::new(root, Preset::Empty)
    }

    /// Start at `root` with the preset called `name`; unknown names walk
    /// nothing.
    pub fn with_preset_name(root: impl Into<Value>, name: &str) -> Self {
        Self::new(root, Preset::from_name(name))
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns `true` once the cursor has broken.
    pub fn is_broken(&self) -> bool {
        self.state == State::Broken
    }

    /// The current value, live or broken.
    pub fn value(&self) -> &Value {
        &self.current
    }

    /// Consume the cursor, returning the current value.
    pub fn into_value(self) -> Value {
        self.current
    }

    /// Keys [`find`](Self::find) walks by default.
    pub fn walkable(&self) -> &Walkable {
        &self.walkable
    }

    /// The failure that broke a [`call`](Self::call), if any.
    pub fn error(&self) -> Option<&CallError> {
        self.error.as_ref()
    }

    /// Host `typeof` of the current value.
    pub fn type_name(&self) -> &'static str {
        self.current.type_name()
    }

    /// Returns `true` if the current value is null.
    pub fn is_nullish(&self) -> bool {
        self.current.is_nullish()
    }

    fn broken(mut self, reason: &'static str) -> Self {
        tracing::debug!(reason, "cursor broke");
        self.state = State::Broken;
        self.current = Value::Null;
        self
    }

    fn guard(self, holds: impl FnOnce(&Value) -> bool, reason: &'static str) -> Self {
        if self.is_broken() || holds(&self.current) {
            self
        } else {
            self.broken(reason)
        }
    }

    /// Break unless the current value is an array.
    pub fn is_array(self) -> Self {
        self.guard(|v| matches!(v, Value::Array(_)), "not an array")
    }

    /// Break unless the current value is a number.
    pub fn is_number(self) -> Self {
        self.guard(|v| matches!(v, Value::Number(_)), "not a number")
    }

    /// Break unless the current value is a function.
    pub fn is_function(self) -> Self {
        self.guard(|v| matches!(v, Value::Function(_)), "not a function")
    }

    /// Break unless the current value is object-like (objects, arrays and
    /// pending values; never null).
    pub fn is_object(self) -> Self {
        self.guard(|v| v.type_name() == "object", "not an object")
    }

    /// Break unless `predicate` accepts the current value.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&Value, &Cursor) -> bool,
    {
        if self.is_broken() || predicate(&self.current, &self) {
            self
        } else {
            self.broken("predicate rejected")
        }
    }

    /// Descend through `path`, one property read per key.
    ///
    /// Breaks as soon as a read yields null, including the last one.
    pub fn walk<I>(mut self, path: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.is_broken() {
            return self;
        }
        for key in path {
            if self.current.is_nullish() {
                break;
            }
            self.current = self.current.get(key.as_ref());
        }
        if self.current.is_nullish() {
            return self.broken("walked into null");
        }
        self
    }

    /// Breadth-first search with the cursor's walkable keys and the default
    /// visit budget.
    pub fn find<P>(self, predicate: P) -> Self
    where
        P: Fn(&Value) -> bool,
    {
        self.find_with(predicate, FindOptions::new())
    }

    /// Breadth-first search from the current value.
    ///
    /// The first node `predicate` accepts becomes the current value. Running
    /// out of nodes or of visits breaks the cursor.
    pub fn find_with<P>(mut self, predicate: P, options: FindOptions) -> Self
    where
        P: Fn(&Value) -> bool,
    {
        if self.is_broken() {
            return self;
        }
        let walkable = options.walkable.as_ref().unwrap_or(&self.walkable);
        match find::breadth_first(
            &self.current,
            predicate,
            walkable,
            &options.ignore,
            options.max_visits,
        ) {
            Some(node) => {
                self.current = node;
                self
            }
            None => self.broken("search exhausted"),
        }
    }

    /// Replace the current value with `factory(current, cursor)`; breaks on
    /// null.
    pub fn put<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Value, &Cursor) -> Value,
    {
        if self.is_broken() {
            return self;
        }
        self.current = factory(&self.current, &self);
        if self.current.is_nullish() {
            return self.broken("factory returned null");
        }
        self
    }

    /// Call the current value with `receiver` and `args`; the result becomes
    /// the current value.
    ///
    /// A non-callable value or a failing call breaks the cursor and keeps the
    /// failure in [`error`](Self::error). A null result breaks it too.
    pub fn call(mut self, receiver: &Value, args: &[Value]) -> Self {
        if self.is_broken() {
            return self;
        }
        match self.current.call(receiver, args) {
            Ok(value) if value.is_nullish() => self.broken("call returned null"),
            Ok(value) => {
                self.current = value;
                self
            }
            Err(error) => {
                self.error = Some(error);
                self.broken("call failed")
            }
        }
    }

    /// Break unconditionally, keeping the current value.
    pub fn halt(mut self) -> Self {
        self.state = State::Broken;
        self
    }

    /// Wait for a pending current value and continue with its outcome.
    ///
    /// Non-pending values settle to themselves. A rejection is returned to
    /// the caller. A live cursor whose value settles to null breaks.
    pub async fn settle(mut self) -> Result<Self, CallError> {
        if let Some(pending) = self.current.as_pending().cloned() {
            self.current = pending.settle().await?;
        }
        if !self.is_broken() && self.current.is_nullish() {
            return Ok(self.broken("settled to null"));
        }
        Ok(self)
    }

    /// Like [`settle`](Self::settle), but a rejection is handed to `recover`,
    /// whose result becomes the current value.
    pub async fn settle_or_else<F>(self, recover: F) -> Self
    where
        F: FnOnce(CallError) -> Value,
    {
        let broken = self.is_broken();
        let walkable = self.walkable.clone();
        match self.settle().await {
            Ok(cursor) => cursor,
            Err(error) => {
                let cursor = Cursor {
                    current: recover(error),
                    state: if broken { State::Broken } else { State::Live },
                    walkable,
                    error: None,
                };
                if !cursor.is_broken() && cursor.is_nullish() {
                    return cursor.broken("settled to null");
                }
                cursor
            }
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.current, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::{Array, Function, Object, Pending};
    use std::cell::Cell;

    fn obj<const N: usize>(entries: [(&str, Value); N]) -> Value {
        entries.into_iter().collect::<Object>().into()
    }

    #[test]
    fn test_guards_keep_current() {
        let root = obj([("a", Value::from(1))]);
        let cursor = Cursor::root(root.clone()).is_object();
        assert_eq!(cursor.state(), State::Live);
        assert_eq!(cursor.value(), &root);

        let cursor = Cursor::root(Value::from(3)).is_number().is_array();
        assert!(cursor.is_broken());
        assert!(cursor.value().is_nullish());
    }

    #[test]
    fn test_null_is_not_an_object() {
        assert!(Cursor::root(Value::Null).is_object().is_broken());
        assert!(!Cursor::root(Array::new()).is_object().is_broken());
    }

    #[test]
    fn test_short_circuit() {
        let root = obj([("a", Value::from("present"))]);
        let cursor = Cursor::root(root)
            .is_object()
            .filter(|_, _| false)
            .walk(["a"]);
        assert!(cursor.is_broken());
        assert_eq!(cursor.value(), &Value::Null);
    }

    #[test]
    fn test_broken_cursor_ignores_steps() {
        let factory_ran = Cell::new(false);
        let cursor = Cursor::root(Value::from(1)).halt().put(|_, _| {
            factory_ran.set(true);
            Value::from(2)
        });
        assert!(!factory_ran.get());
        assert!(cursor.is_broken());
        assert_eq!(cursor.value(), &Value::from(1));
    }

    #[test]
    fn test_filter_sees_cursor() {
        let cursor = Cursor::new(Value::from(5), Preset::Fiber)
            .filter(|value, cursor| *value == Value::from(5) && cursor.walkable().allows("child"));
        assert_eq!(cursor.into_value(), Value::from(5));
    }

    #[test]
    fn test_walk() {
        let root = obj([("a", obj([("b", obj([("c", Value::from(42))]))]))]);
        let cursor = Cursor::root(root.clone()).walk(["a", "b", "c"]);
        assert_eq!(cursor.value(), &Value::from(42));
        assert!(!cursor.is_broken());

        assert!(Cursor::root(root.clone()).walk(["a", "x", "c"]).is_broken());
        assert!(Cursor::root(root).walk(["a", "b", "missing"]).is_broken());
    }

    #[test]
    fn test_walk_keeps_falsy_values() {
        let root = obj([("zero", Value::from(0)), ("empty", Value::from(""))]);
        assert_eq!(
            Cursor::root(root.clone()).walk(["zero"]).into_value(),
            Value::from(0)
        );
        assert!(!Cursor::root(root).walk(["empty"]).is_broken());
    }

    #[test]
    fn test_find_full_traversal() {
        let root = obj([
            ("a", obj([("b", Value::from(1))])),
            ("c", obj([("d", Value::from(2))])),
        ]);
        let cursor = Cursor::root(root).find_with(
            |v| *v == Value::from(2),
            FindOptions::new().walkable(Walkable::Any),
        );
        assert_eq!(cursor.value(), &Value::from(2));
        assert_eq!(cursor.state(), State::Live);
    }

    #[test]
    fn test_find_uses_preset() {
        let leaf = obj([("id", Value::from("leaf"))]);
        let tree = obj([("props", obj([("children", leaf.clone())]))]);
        let is_leaf = |v: &Value| v.get("id") == Value::from("leaf");

        let cursor = Cursor::new(tree.clone(), Preset::Component).find(is_leaf);
        assert_eq!(cursor.value(), &leaf);

        assert!(Cursor::with_preset_name(tree, "unknown").find(is_leaf).is_broken());
    }

    #[test]
    fn test_find_ignore() {
        let tree = obj([("props", obj([("children", Value::from(9))]))]);
        let cursor = Cursor::new(tree, Preset::Component).find_with(
            |v| *v == Value::from(9),
            FindOptions::new().ignore(["children"]),
        );
        assert!(cursor.is_broken());
    }

    #[test]
    fn test_find_bounded_on_cycles() {
        let node = Object::new();
        node.set("self", node.clone());
        let cursor = Cursor::root(node).find_with(
            |_| false,
            FindOptions::new().walkable(Walkable::Any).max_visits(3),
        );
        assert!(cursor.is_broken());
        assert!(cursor.value().is_nullish());
    }

    #[test]
    fn test_find_can_match_null() {
        let root: Value = Array::from(vec![Value::from(1), Value::Null]).into();
        let cursor = Cursor::root(root).find(Value::is_nullish);
        assert!(!cursor.is_broken());
        assert!(cursor.is_nullish());
    }

    #[test]
    fn test_put() {
        let cursor = Cursor::root(Value::from(2))
            .put(|v, _| Value::from(v.as_number().unwrap_or(0.0) + 1.0));
        assert_eq!(cursor.value(), &Value::from(3));
        assert!(Cursor::root(Value::from(2)).put(|_, _| Value::Null).is_broken());
    }

    #[test]
    fn test_call() {
        let greet = Function::new("greet", |inv| {
            Ok(Value::from(format!("hello {}", inv.arg(0))))
        });
        let cursor = Cursor::root(greet).call(&Value::Null, &[Value::from("there")]);
        assert_eq!(cursor.value(), &Value::from("hello there"));

        let cursor = Cursor::root(Value::from(1)).call(&Value::Null, &[]);
        assert!(cursor.is_broken());
        assert_eq!(cursor.error(), Some(&CallError::NotCallable { found: "number" }));
    }

    #[test]
    fn test_call_null_result_breaks() {
        let cursor = Cursor::root(Function::noop()).call(&Value::Null, &[]);
        assert!(cursor.is_broken());
        assert!(cursor.error().is_none());
    }

    #[test]
    fn test_halt_keeps_value() {
        let cursor = Cursor::root(Value::from("kept")).halt();
        assert!(cursor.is_broken());
        assert_eq!(cursor.to_string(), "kept");
    }

    #[tokio::test]
    async fn test_settle_resolves() {
        let cursor = Cursor::root(Pending::resolved(obj([("ready", Value::from(true))])))
            .settle()
            .await
            .unwrap()
            .walk(["ready"]);
        assert_eq!(cursor.value(), &Value::from(true));
    }

    #[tokio::test]
    async fn test_settle_plain_value() {
        let cursor = Cursor::root(Value::from(1)).settle().await.unwrap();
        assert_eq!(cursor.into_value(), Value::from(1));
    }

    #[tokio::test]
    async fn test_settle_rejection() {
        let pending = Pending::rejected(CallError::thrown("boom"));
        let result = Cursor::root(pending.clone()).settle().await;
        assert_eq!(result.unwrap_err(), CallError::thrown("boom"));

        let cursor = Cursor::root(pending)
            .settle_or_else(|_| Value::from("recovered"))
            .await;
        assert_eq!(cursor.value(), &Value::from("recovered"));
        assert!(!cursor.is_broken());
    }

    #[tokio::test]
    async fn test_settle_broken_cursor() {
        let cursor = Cursor::root(Pending::resolved(1)).halt().settle().await.unwrap();
        assert!(cursor.is_broken());
        assert_eq!(cursor.value(), &Value::from(1));
    }
}
