use partialmock::{BackupPattern, Class, Method, MethodInterceptor, Object, Value};
use proptest::prelude::*;
use serde_json::json;
use std::rc::Rc;

use crate::utils::{args, method_names};

fn constant(value: Value) -> Method {
    Rc::new(move |_: &Object, _: &[Value]| Ok(value.clone()))
}

/// Class whose methods answer with their own name and the arguments
fn echo_class(methods: &[String]) -> Rc<Class> {
    let mut builder = Class::builder("Echo");
    for name in methods {
        let name = name.clone();
        let tag = name.clone();
        builder = builder.method(name, move |_, args| Ok(json!({ "method": tag, "args": args })));
    }
    builder.build()
}

proptest! {
    #[test]
    fn test_backup_survives_any_number_of_hooks(
        hooks in 1usize..8,
        call_args in args(),
    ) {
        let obj = Object::new(&echo_class(&["meth".to_string()]));
        let before = obj.call("meth", &call_args).unwrap();
        let mut interceptor = MethodInterceptor::new(obj.clone(), BackupPattern::default());

        for n in 0..hooks {
            interceptor.hook("meth", constant(json!(n))).unwrap();
            prop_assert_eq!(obj.call("meth", &call_args).unwrap(), json!(n));
            prop_assert_eq!(interceptor.invoke_original("meth", &call_args).unwrap(), before.clone());
        }
        prop_assert_eq!(interceptor.backup_key("meth"), Some("saved method meth"));
    }

    #[test]
    fn test_restore_all_reproduces_original_behaviour(
        methods in method_names(),
        call_args in args(),
    ) {
        let obj = Object::new(&echo_class(&methods));
        let before: Vec<Value> = methods
            .iter()
            .map(|m| obj.call(m, &call_args).unwrap())
            .collect();

        let mut interceptor = MethodInterceptor::new(obj.clone(), BackupPattern::original());
        for m in &methods {
            interceptor.hook(m, constant(json!("hooked"))).unwrap();
        }
        let restored = interceptor.restore_all();
        prop_assert_eq!(restored.len(), methods.len());

        for (m, expected) in methods.iter().zip(before) {
            prop_assert_eq!(obj.call(m, &call_args).unwrap(), expected);
            prop_assert!(obj.own_method(m).is_none());
        }
    }

    #[test]
    fn test_scope_wipe_reproduces_original_behaviour(
        methods in method_names(),
        call_args in args(),
    ) {
        let class = echo_class(&methods);
        let objects = [Object::new(&class), Object::new(&class)];
        let tc = Object::new(
            &Class::builder("Case").method("teardown", |_, _| Ok(json!(null))).build(),
        );

        partialmock::setup_for(&tc).unwrap();
        let outcome = hook_then_tear_down(&tc, &objects, &methods, &call_args);
        // A failed case must not leave the scope behind for the next one.
        if partialmock::is_active() {
            partialmock::wipe().unwrap();
        }
        outcome?;

        for obj in &objects {
            for m in &methods {
                prop_assert_eq!(
                    obj.call(m, &call_args).unwrap(),
                    json!({ "method": m, "args": call_args.clone() })
                );
            }
        }
    }
}

fn checked<T>(result: partialmock::Result<T>) -> Result<T, TestCaseError> {
    result.map_err(|e| TestCaseError::fail(e.to_string()))
}

fn hook_then_tear_down(
    tc: &Object,
    objects: &[Object],
    methods: &[String],
    call_args: &[Value],
) -> Result<(), TestCaseError> {
    checked(partialmock::define_caller_mock("slot", |_| Ok(json!("mocked"))))?;
    for obj in objects {
        for m in methods {
            checked(partialmock::hook("slot", obj, m))?;
            prop_assert_eq!(checked(obj.call(m, call_args))?, json!("mocked"));
        }
    }
    prop_assert!(checked(partialmock::current_object())?.is_none());
    checked(tc.call("teardown", &[]))?;
    prop_assert!(!partialmock::is_active());
    Ok(())
}
