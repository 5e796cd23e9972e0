#![allow(dead_code)]

use patchwork::{
    Function, Object, Value,
    testing::{CallLog, CountingFunction, RecordingInterceptor},
};

// ============================================================================
// Host Fixtures
// ============================================================================

/// A `console` object whose `log` counts how often it printed.
pub fn console() -> (Object, CountingFunction) {
    let log = CountingFunction::new("log");
    let console = Object::new();
    console.set("log", log.value());
    (console, log)
}

/// `{ add: (a, b) => a + b }`
pub fn calculator() -> Object {
    let add = Function::new("add", |inv| {
        let a = inv.arg(0).as_number().unwrap_or(f64::NAN);
        let b = inv.arg(1).as_number().unwrap_or(f64::NAN);
        Ok(Value::from(a + b))
    });
    let calculator = Object::new();
    calculator.set("add", add);
    calculator
}

pub fn obj<const N: usize>(entries: [(&str, Value); N]) -> Value {
    entries.into_iter().collect::<Object>().into()
}

/// A rendered component tree:
///
/// ```text
/// root
/// └─ props.children[0] (header)
///    └─ props.children (button, with props.onClick)
/// ```
pub fn component_tree(on_click: Function) -> Value {
    let button = obj([
        ("type", Value::from("button")),
        (
            "props",
            obj([("onClick", on_click.into()), ("label", Value::from("Send"))]),
        ),
    ]);
    let header = obj([
        ("type", Value::from("header")),
        ("props", obj([("children", button)])),
    ]);
    obj([
        ("type", Value::from("root")),
        ("props", obj([("children", vec![header].into())])),
    ])
}

// ============================================================================
// Interceptors
// ============================================================================

pub fn recorders<const N: usize>(labels: [&str; N]) -> (CallLog, [RecordingInterceptor; N]) {
    let log = CallLog::new();
    let recorders = labels.map(|label| RecordingInterceptor::new(label, &log));
    (log, recorders)
}
