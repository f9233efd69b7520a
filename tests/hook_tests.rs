//! Hooking, invoking backups and restoring through the scope API
mod common;

use common::{echo, target, test_case_stub};
use partialmock::{Class, MockError, Object, ScopeMode, Value};
use serde_json::json;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

fn pair_object() -> Object {
    let class = Class::builder("Pair")
        .method("m", |_, args| Ok(Value::Array(args.to_vec())))
        .build();
    Object::new(&class)
}

#[test]
fn test_hook_invoke_backup_restore() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let o = pair_object();
    partialmock::define_caller_mock("slot", |_| Ok(json!("mocked"))).unwrap();

    partialmock::hook("slot", &o, "m").unwrap();
    assert_eq!(o.call("m", &[json!(1), json!(2)]).unwrap(), json!("mocked"));
    assert_eq!(
        partialmock::invoke_backup(&o, "m", &[json!(1), json!(2)]).unwrap(),
        json!([1, 2])
    );

    partialmock::restore(&o, "m").unwrap();
    assert_eq!(o.call("m", &[json!(1), json!(2)]).unwrap(), json!([1, 2]));
    assert!(matches!(
        partialmock::restore(&o, "m"),
        Err(MockError::NotHooked { .. })
    ));
    partialmock::wipe().unwrap();
}

#[test]
fn test_scope_in_caller_scoped_hook() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();

    // State of the defining scope, reachable only through the closure.
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let expected = obj.clone();
    partialmock::define_caller_mock("slot_notininstance", move |args| {
        assert_eq!(args, &[json!(0), json!(1), json!(2)][..]);
        assert_eq!(partialmock::current_object().unwrap(), Some(expected.clone()));
        assert_eq!(partialmock::current_method().unwrap().as_deref(), Some("meth1"));
        sink.borrow_mut().push(args.len());
        Ok(json!(7))
    })
    .unwrap();

    partialmock::hook("slot_notininstance", &obj, "meth1").unwrap();
    assert_eq!(
        obj.call("meth1", &[json!(0), json!(1), json!(2)]).unwrap(),
        json!(7)
    );
    assert_eq!(*seen.borrow(), vec![3]);

    assert_eq!(partialmock::current_object().unwrap(), None);
    assert_eq!(partialmock::current_method().unwrap(), None);
    partialmock::wipe().unwrap();
}

#[test]
fn test_scope_in_instance_scoped_hook() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    obj.set("visits", json!(0));

    partialmock::define_instance_mock("slot_ininstance", |this, args| {
        assert_eq!(args, &[json!(0), json!(1), json!(2)][..]);
        let visits = this.get("visits").and_then(|v| v.as_i64()).unwrap_or(0);
        this.set("visits", json!(visits + 1));
        // Other methods of the receiver are available.
        let own = this.call("meth2", &[json!("from hook")])?;
        assert_eq!(own["method"], json!("meth2"));
        Ok(json!(11))
    })
    .unwrap();

    partialmock::hook("slot_ininstance", &obj, "meth1").unwrap();
    assert_eq!(
        obj.call("meth1", &[json!(0), json!(1), json!(2)]).unwrap(),
        json!(11)
    );
    assert_eq!(obj.get("visits"), Some(json!(1)));
    // Instance-scoped mocks do not publish a call context.
    assert_eq!(partialmock::current_object().unwrap(), None);
    partialmock::wipe().unwrap();
}

#[test]
fn test_instance_scoped_receiver_is_the_hooked_object() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let o1 = target();
    let o2 = target();
    partialmock::define_instance_mock("whoami", |this, _| Ok(json!(this.id().as_u64())))
        .unwrap();

    partialmock::hook("whoami", &o1, "meth1").unwrap();
    partialmock::hook("whoami", &o2, "meth1").unwrap();
    assert_eq!(o1.call("meth1", &[]).unwrap(), json!(o1.id().as_u64()));
    assert_eq!(o2.call("meth1", &[]).unwrap(), json!(o2.id().as_u64()));
    partialmock::wipe().unwrap();
}

#[test]
fn test_interceptor_is_per_object() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj1 = target();
    let obj2 = target();
    partialmock::define_caller_mock("slot", |_| Ok(json!(null))).unwrap();

    partialmock::hook("slot", &obj1, "meth1").unwrap();
    partialmock::hook("slot", &obj2, "meth2").unwrap();

    assert_eq!(
        partialmock::invoke_backup(&obj1, "meth1", &[json!(0), json!(1)]).unwrap(),
        echo(&obj1, "meth1", &[json!(0), json!(1)])
    );
    assert_eq!(
        partialmock::invoke_backup(&obj2, "meth2", &[json!(2), json!(3)]).unwrap(),
        echo(&obj2, "meth2", &[json!(2), json!(3)])
    );
    assert_eq!(partialmock::hooked_methods(&obj1).unwrap(), vec!["meth1"]);
    assert_eq!(partialmock::hooked_methods(&obj2).unwrap(), vec!["meth2"]);
    partialmock::wipe().unwrap();
}

#[test]
fn test_hooking_one_object_leaves_siblings_alone() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let hooked = target();
    let sibling = target();
    partialmock::define_caller_mock("slot", |_| Ok(json!("mocked"))).unwrap();

    partialmock::hook("slot", &hooked, "meth1").unwrap();
    assert_eq!(hooked.call("meth1", &[]).unwrap(), json!("mocked"));
    assert_eq!(
        sibling.call("meth1", &[]).unwrap(),
        echo(&sibling, "meth1", &[])
    );
    partialmock::wipe().unwrap();
}

#[test]
fn test_rehook_keeps_first_backup() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    partialmock::define_caller_mock("first", |_| Ok(json!("first"))).unwrap();
    partialmock::define_caller_mock("second", |_| Ok(json!("second"))).unwrap();

    partialmock::hook("first", &obj, "meth1").unwrap();
    partialmock::hook("second", &obj, "meth1").unwrap();
    assert_eq!(obj.call("meth1", &[]).unwrap(), json!("second"));
    partialmock::hook("first", &obj, "meth1").unwrap();
    assert_eq!(obj.call("meth1", &[]).unwrap(), json!("first"));

    assert_eq!(
        partialmock::invoke_backup(&obj, "meth1", &[]).unwrap(),
        echo(&obj, "meth1", &[])
    );
    partialmock::restore(&obj, "meth1").unwrap();
    assert_eq!(obj.call("meth1", &[]).unwrap(), echo(&obj, "meth1", &[]));
    partialmock::wipe().unwrap();
}

#[test]
fn test_inherited_and_mixin_methods_can_be_hooked() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let greeting = Class::builder("Greeting")
        .method("greet", |_, _| Ok(json!("hello")))
        .build();
    let base = Class::builder("Base")
        .method("name", |_, _| Ok(json!("base")))
        .build();
    let derived = Class::builder("Derived")
        .extends(&base)
        .include(&greeting)
        .build();
    let obj = Object::new(&derived);
    partialmock::define_caller_mock("slot", |_| Ok(json!("mocked"))).unwrap();

    partialmock::hook("slot", &obj, "greet").unwrap();
    partialmock::hook("slot", &obj, "name").unwrap();
    assert_eq!(obj.call("greet", &[]).unwrap(), json!("mocked"));
    assert_eq!(obj.call("name", &[]).unwrap(), json!("mocked"));
    assert_eq!(
        partialmock::invoke_backup(&obj, "greet", &[]).unwrap(),
        json!("hello")
    );

    partialmock::restore_all(&obj).unwrap();
    assert_eq!(obj.call("greet", &[]).unwrap(), json!("hello"));
    assert_eq!(obj.call("name", &[]).unwrap(), json!("base"));
    assert!(obj.own_method("greet").is_none());
    partialmock::wipe().unwrap();
}

/// Which block answered the last invocation: (object, method, slot)
type Invocation = (Object, String, Option<String>);

#[test]
fn test_call_sequence() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let last: Rc<RefCell<Option<Invocation>>> = Rc::new(RefCell::new(None));

    let original_sink = Rc::clone(&last);
    let mut builder = Class::builder("CallseqTarget");
    for name in ["meth1", "meth2", "meth3", "meth4"] {
        let sink = Rc::clone(&original_sink);
        builder = builder.method(name, move |this, _| {
            *sink.borrow_mut() = Some((this.clone(), name.to_string(), None));
            Ok(json!(null))
        });
    }
    let class = builder.build();
    let obj1 = Object::new(&class);
    let obj2 = Object::new(&class);

    for slot in ["slot1", "slot2"] {
        let sink = Rc::clone(&last);
        partialmock::define_caller_mock(slot, move |_| {
            let object = partialmock::current_object()?.expect("inside caller-scoped mock");
            let method = partialmock::current_method()?.expect("inside caller-scoped mock");
            *sink.borrow_mut() = Some((object, method, Some(slot.to_string())));
            Ok(json!(null))
        })
        .unwrap();
    }

    let expect = |obj: &Object, method: &str, slot: Option<&str>, run: &dyn Fn()| {
        *last.borrow_mut() = None;
        run();
        let got = last.borrow_mut().take().expect("something was invoked");
        assert_eq!(got.0, *obj);
        assert_eq!(got.1, method);
        assert_eq!(got.2.as_deref(), slot);
    };

    partialmock::hook("slot1", &obj1, "meth1").unwrap();
    partialmock::hook("slot2", &obj1, "meth2").unwrap();
    partialmock::hook("slot1", &obj1, "meth3").unwrap();
    partialmock::hook("slot2", &obj1, "meth4").unwrap();
    partialmock::hook("slot2", &obj2, "meth1").unwrap();
    partialmock::hook("slot2", &obj2, "meth2").unwrap();
    partialmock::hook("slot1", &obj2, "meth3").unwrap();
    partialmock::hook("slot1", &obj2, "meth4").unwrap();

    expect(&obj1, "meth1", Some("slot1"), &|| {
        obj1.call("meth1", &[]).unwrap();
    });

    expect(&obj1, "meth2", Some("slot2"), &|| {
        obj1.call("meth2", &[]).unwrap();
    });
    expect(&obj1, "meth2", None, &|| {
        partialmock::invoke_backup(&obj1, "meth2", &[]).unwrap();
    });
    partialmock::restore(&obj1, "meth2").unwrap();
    assert!(partialmock::restore(&obj1, "meth2").is_err());
    expect(&obj1, "meth2", None, &|| {
        obj1.call("meth2", &[]).unwrap();
    });
    assert!(partialmock::invoke_backup(&obj1, "meth2", &[]).is_err());

    expect(&obj1, "meth3", Some("slot1"), &|| {
        obj1.call("meth3", &[]).unwrap();
    });
    expect(&obj1, "meth4", Some("slot2"), &|| {
        obj1.call("meth4", &[]).unwrap();
    });

    partialmock::restore_all(&obj1).unwrap();
    for method in ["meth1", "meth2", "meth3", "meth4"] {
        expect(&obj1, method, None, &|| {
            obj1.call(method, &[]).unwrap();
        });
    }

    expect(&obj2, "meth1", Some("slot2"), &|| {
        obj2.call("meth1", &[]).unwrap();
    });
    partialmock::hook("slot1", &obj2, "meth1").unwrap();
    expect(&obj2, "meth1", Some("slot1"), &|| {
        obj2.call("meth1", &[]).unwrap();
    });
    partialmock::hook("slot2", &obj2, "meth1").unwrap();
    expect(&obj2, "meth1", Some("slot2"), &|| {
        obj2.call("meth1", &[]).unwrap();
    });
    expect(&obj2, "meth1", None, &|| {
        partialmock::invoke_backup(&obj2, "meth1", &[]).unwrap();
    });

    expect(&obj2, "meth2", Some("slot2"), &|| {
        obj2.call("meth2", &[]).unwrap();
    });
    expect(&obj2, "meth3", Some("slot1"), &|| {
        obj2.call("meth3", &[]).unwrap();
    });
    expect(&obj2, "meth4", Some("slot1"), &|| {
        obj2.call("meth4", &[]).unwrap();
    });

    partialmock::wipe().unwrap();

    for method in ["meth1", "meth2", "meth3", "meth4"] {
        expect(&obj2, method, None, &|| {
            obj2.call(method, &[]).unwrap();
        });
    }
}

#[test]
fn test_wipe_restores_every_object() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let o1 = target();
    let o2 = target();
    partialmock::define_caller_mock("slot", |_| Ok(json!("mocked"))).unwrap();
    partialmock::hook("slot", &o1, "meth1").unwrap();
    partialmock::hook("slot", &o2, "meth2").unwrap();
    partialmock::set("key", json!(true)).unwrap();

    partialmock::wipe().unwrap();
    assert_eq!(o1.call("meth1", &[]).unwrap(), echo(&o1, "meth1", &[]));
    assert_eq!(o2.call("meth2", &[]).unwrap(), echo(&o2, "meth2", &[]));

    partialmock::setup_for(&test_case_stub()).unwrap();
    assert!(matches!(
        partialmock::restore(&o1, "meth1"),
        Err(MockError::NotHooked { .. })
    ));
    assert!(matches!(
        partialmock::restore(&o2, "meth2"),
        Err(MockError::NotHooked { .. })
    ));
    assert_eq!(partialmock::get("key").unwrap(), None);
    partialmock::wipe().unwrap();
}

#[test]
fn test_context_cleared_after_error() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    partialmock::define_caller_mock("failing", |_| Err(MockError::raised("boom"))).unwrap();
    partialmock::hook("failing", &obj, "meth1").unwrap();

    assert_eq!(
        obj.call("meth1", &[]),
        Err(MockError::Raised("boom".to_string()))
    );
    assert_eq!(partialmock::current_object().unwrap(), None);
    assert_eq!(partialmock::current_method().unwrap(), None);

    // The interceptor bookkeeping is intact as well.
    assert_eq!(
        partialmock::invoke_backup(&obj, "meth1", &[]).unwrap(),
        echo(&obj, "meth1", &[])
    );
    partialmock::wipe().unwrap();
}

#[test]
fn test_context_cleared_after_panic() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    partialmock::define_caller_mock("panicking", |_| panic!("replacement panicked")).unwrap();
    partialmock::hook("panicking", &obj, "meth1").unwrap();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| obj.call("meth1", &[])));
    assert!(outcome.is_err());
    assert_eq!(partialmock::current_object().unwrap(), None);
    assert_eq!(partialmock::current_method().unwrap(), None);
    partialmock::wipe().unwrap();
}

#[test]
fn test_nested_caller_scoped_call_is_rejected() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let outer = target();
    let inner = target();

    let inner_handle = inner.clone();
    partialmock::define_caller_mock("outer", move |_| {
        let nested = inner_handle.call("meth2", &[]);
        assert_eq!(
            nested,
            Err(MockError::NestedCallerScope {
                method: "meth2".to_string()
            })
        );
        // The outer context survives the rejected call.
        assert_eq!(partialmock::current_method().unwrap().as_deref(), Some("meth1"));
        Ok(json!("outer"))
    })
    .unwrap();
    partialmock::define_caller_mock("inner", |_| Ok(json!("inner"))).unwrap();
    partialmock::hook("outer", &outer, "meth1").unwrap();
    partialmock::hook("inner", &inner, "meth2").unwrap();

    assert_eq!(outer.call("meth1", &[]).unwrap(), json!("outer"));
    assert_eq!(inner.call("meth2", &[]).unwrap(), json!("inner"));
    assert_eq!(partialmock::current_object().unwrap(), None);
    partialmock::wipe().unwrap();
}

#[test]
fn test_caller_scoped_mock_may_call_backup() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    partialmock::define_caller_mock("wrapping", |args| {
        let object = partialmock::current_object()?.expect("inside caller-scoped mock");
        let method = partialmock::current_method()?.expect("inside caller-scoped mock");
        let original = partialmock::invoke_backup(&object, &method, args)?;
        Ok(json!({ "wrapped": original }))
    })
    .unwrap();
    partialmock::hook("wrapping", &obj, "meth1").unwrap();

    assert_eq!(
        obj.call("meth1", &[json!(5)]).unwrap(),
        json!({ "wrapped": echo(&obj, "meth1", &[json!(5)]) })
    );
    partialmock::wipe().unwrap();
}

#[test]
fn test_calls_are_recorded() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    partialmock::define_caller_mock("caller", |_| Ok(json!(null))).unwrap();
    partialmock::define_instance_mock("instance", |_, _| Ok(json!(null))).unwrap();
    partialmock::hook("caller", &obj, "meth1").unwrap();
    partialmock::hook("instance", &obj, "meth2").unwrap();

    obj.call("meth1", &[json!(1)]).unwrap();
    obj.call("meth2", &[json!(2), json!(3)]).unwrap();
    partialmock::invoke_backup(&obj, "meth1", &[]).unwrap();

    let calls = partialmock::calls().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].is_for(&obj, "meth1"));
    assert_eq!(calls[0].slot, "caller");
    assert_eq!(calls[0].mode, ScopeMode::Caller);
    assert_eq!(calls[0].args, vec![json!(1)]);
    assert!(calls[1].is_for(&obj, "meth2"));
    assert_eq!(calls[1].mode, ScopeMode::Instance);
    assert_eq!(calls[1].class, "Target");
    partialmock::wipe().unwrap();
}

#[test]
fn test_call_recording_can_be_disabled() {
    let mut config = partialmock::ScopeConfig::default();
    config.interception.record_calls = false;
    partialmock::setup_for_with(&test_case_stub(), config).unwrap();
    let obj = target();
    partialmock::define_caller_mock("slot", |_| Ok(json!(null))).unwrap();
    partialmock::hook("slot", &obj, "meth1").unwrap();

    obj.call("meth1", &[]).unwrap();
    assert!(partialmock::calls().unwrap().is_empty());
    partialmock::wipe().unwrap();
}

#[test]
fn test_wipe_from_inside_a_replacement() {
    partialmock::setup_for(&test_case_stub()).unwrap();
    let obj = target();
    partialmock::define_caller_mock("wiping", |_| {
        partialmock::wipe()?;
        Ok(json!("wiped"))
    })
    .unwrap();
    partialmock::hook("wiping", &obj, "meth1").unwrap();

    assert_eq!(obj.call("meth1", &[]).unwrap(), json!("wiped"));
    assert!(!partialmock::is_active());
    assert_eq!(obj.call("meth1", &[]).unwrap(), echo(&obj, "meth1", &[]));
}
