use patchwork::{
    CallError, Cursor, FindOptions, Function, Object, Pending, Preset, State, Value, Walkable,
};
use std::time::Duration;

mod common;
use common::{component_tree, obj};

#[test]
fn test_failed_predicate_short_circuits_walk() {
    let root = obj([("a", Value::from("reachable"))]);
    let cursor = Cursor::root(root)
        .is_object()
        .filter(|_, _| false)
        .walk(["a"]);

    assert_eq!(cursor.state(), State::Broken);
    assert_eq!(cursor.value(), &Value::Null);
}

#[test]
fn test_breadth_first_full_traversal() {
    let root = obj([
        ("a", obj([("b", Value::from(1))])),
        ("c", obj([("d", Value::from(2))])),
    ]);
    let cursor = Cursor::root(root).find_with(
        |v| *v == Value::from(2),
        FindOptions::new().walkable(Walkable::Any),
    );

    assert_eq!(cursor.value(), &Value::from(2));
    assert!(!cursor.is_broken());
}

#[test]
fn test_visit_bound_on_cyclic_graph() {
    let a = Object::new();
    let b = Object::new();
    a.set("next", b.clone());
    b.set("next", a.clone());

    let cursor = Cursor::root(a).find_with(
        |v| v.get("missing").is_truthy(),
        FindOptions::new().walkable(Walkable::Any).max_visits(3),
    );

    assert!(cursor.is_broken());
    assert!(cursor.value().is_nullish());
}

#[test]
fn test_find_handler_in_component_tree() {
    let on_click = Function::new("onClick", |_| Ok(Value::from("clicked")));
    let tree = component_tree(on_click.clone());

    let handler = Cursor::new(tree, Preset::Component)
        .find(|node| node.get("type") == Value::from("button"))
        .walk(["props", "onClick"])
        .is_function();
    assert_eq!(handler.value(), &Value::from(on_click));

    let clicked = handler.call(&Value::Null, &[]);
    assert_eq!(clicked.into_value(), Value::from("clicked"));
}

#[test]
fn test_preset_by_name() {
    let tree = component_tree(Function::noop());
    let is_button = |node: &Value| node.get("type") == Value::from("button");

    assert!(!Cursor::with_preset_name(tree.clone(), "react").find(is_button).is_broken());
    assert!(Cursor::with_preset_name(tree, "none").find(is_button).is_broken());
}

#[test]
fn test_fiber_preset_walks_links() {
    let leaf = obj([("stateNode", Value::from("leaf"))]);
    let parent = obj([("child", leaf.clone())]);
    let cursor = Cursor::new(parent, Preset::Fiber)
        .find(|node| node.get("stateNode") == Value::from("leaf"))
        .walk(["stateNode"]);
    assert_eq!(cursor.to_string(), "leaf");
}

#[test]
fn test_steps_after_break_are_inert() {
    let cursor = Cursor::root(Value::from(1))
        .is_array()
        .put(|_, _| Value::from("replaced"))
        .walk(["anything"])
        .call(&Value::Null, &[]);

    assert!(cursor.is_broken());
    assert!(cursor.value().is_nullish());
    assert!(cursor.error().is_none());
}

#[test]
fn test_call_failure_is_kept() {
    let failing = Function::new("failing", |_| Err(CallError::thrown("nope")));
    let cursor = Cursor::root(failing).is_function().call(&Value::Null, &[]);

    assert!(cursor.is_broken());
    assert_eq!(cursor.error(), Some(&CallError::thrown("nope")));
}

#[tokio::test]
async fn test_settle_waits_for_pending_value() {
    let pending = Pending::new(async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(obj([("ready", Value::from(true))]))
    });

    let cursor = Cursor::root(pending)
        .is_object()
        .settle()
        .await
        .unwrap()
        .walk(["ready"]);
    assert_eq!(cursor.into_value(), Value::from(true));
}

#[tokio::test]
async fn test_settle_rejection_reaches_caller() {
    let pending = Pending::rejected(CallError::thrown("offline"));
    let result = Cursor::root(pending.clone()).settle().await;
    assert_eq!(result.unwrap_err(), CallError::thrown("offline"));

    let recovered = Cursor::root(pending)
        .settle_or_else(|_| Value::Null)
        .await;
    assert!(recovered.is_broken());
}
