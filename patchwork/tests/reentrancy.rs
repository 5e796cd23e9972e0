use patchwork::{FaultPolicy, PatchOptions, PatchRegistry, Unpatch, Value};
use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

mod common;
use common::{calculator, recorders};

fn strict_registry() -> Arc<PatchRegistry> {
    Arc::new(
        PatchRegistry::builder()
            .fault_policy(FaultPolicy::FailFast)
            .build(),
    )
}

#[test]
fn test_self_removal_takes_effect_on_next_call() {
    let registry = strict_registry();
    let target = calculator();
    let (log, [b]) = recorders(["b"]);

    let own_handle: Arc<OnceLock<Unpatch>> = Arc::default();
    let slot = Arc::clone(&own_handle);
    let a_log = log.clone();
    let handle = registry
        .patch(&target, "add", move |_| {
            a_log.push("a");
            if let Some(handle) = slot.get() {
                handle.unpatch();
            }
            Ok(())
        })
        .unwrap();
    own_handle.set(handle).unwrap();
    registry
        .patch_with(&target, "add", b.interceptor(), PatchOptions::new())
        .unwrap();

    let add = target.get("add");
    add.call(&Value::Null, &[Value::from(1), Value::from(1)]).unwrap();
    add.call(&Value::Null, &[Value::from(1), Value::from(1)]).unwrap();

    assert_eq!(log.entries(), ["a", "b", "b"]);
}

#[test]
fn test_interceptor_added_mid_call_waits_for_next_call() {
    let registry = strict_registry();
    let target = calculator();
    let (log, [late]) = recorders(["late"]);

    let added = AtomicBool::new(false);
    let inner_registry = Arc::clone(&registry);
    let inner_target = target.clone();
    let late_handle = late.interceptor();
    let first_log = log.clone();
    registry
        .patch(&target, "add", move |_| {
            first_log.push("first");
            if !added.swap(true, Ordering::SeqCst) {
                inner_registry.patch_with(
                    &inner_target,
                    "add",
                    late_handle.clone(),
                    PatchOptions::new(),
                )?;
            }
            Ok(())
        })
        .unwrap();

    let add = target.get("add");
    add.call(&Value::Null, &[Value::from(1), Value::from(1)]).unwrap();
    add.call(&Value::Null, &[Value::from(1), Value::from(1)]).unwrap();

    assert_eq!(log.entries(), ["first", "first", "late"]);
    assert_eq!(target.get("add"), add);
}

#[test]
fn test_nested_call_through_proxy() {
    let registry = strict_registry();
    let target = calculator();
    let depth = AtomicUsize::new(0);
    let inner_target = target.clone();

    registry
        .patch(&target, "add", move |ctx| {
            if depth.fetch_add(1, Ordering::SeqCst) == 0 {
                let inner = inner_target
                    .get("add")
                    .call(&Value::Null, &[Value::from(10), Value::from(10)])?;
                ctx.set_return(inner);
            }
            Ok(())
        })
        .unwrap();

    let result = target
        .get("add")
        .call(&Value::Null, &[Value::from(1), Value::from(1)]);
    assert_eq!(result, Ok(Value::from(20)));
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = strict_registry();
    let target = calculator();
    let (log, [observer]) = recorders(["observer"]);
    registry
        .patch_with(&target, "add", observer.interceptor(), PatchOptions::new())
        .unwrap();

    let add = target.get("add");
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let add = add.clone();
            std::thread::spawn(move || {
                add.call(&Value::Null, &[Value::from(i), Value::from(1)])
                    .unwrap()
            })
        })
        .collect();

    for (i, worker) in workers.into_iter().enumerate() {
        assert_eq!(worker.join().unwrap(), Value::from(i as f64 + 1.0));
    }
    assert_eq!(log.len(), 4);
}
