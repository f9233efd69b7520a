#![no_main]

use libfuzzer_sys::fuzz_target;
use partialmock::{Class, Object};
use serde_json::json;

const METHODS: [&str; 3] = ["a", "b", "c"];

fuzz_target!(|data: &[u8]| {
    let class = Class::builder("Target")
        .method("a", |_, _| Ok(json!("a")))
        .method("b", |_, _| Ok(json!("b")))
        .method("c", |_, _| Ok(json!("c")))
        .build();
    let objects = [Object::new(&class), Object::new(&class)];
    let tc = Object::new(
        &Class::builder("Case")
            .method("teardown", |_, _| Ok(json!(null)))
            .build(),
    );

    partialmock::setup_for(&tc).unwrap();
    partialmock::define_caller_mock("caller", |_| Ok(json!("caller"))).unwrap();
    partialmock::define_instance_mock("instance", |_, _| Ok(json!("instance"))).unwrap();

    for byte in data {
        let obj = &objects[(byte & 1) as usize];
        let method = METHODS[((byte >> 1) % 3) as usize];
        let _ = match byte >> 4 {
            0..=5 => partialmock::hook("caller", obj, method),
            6..=10 => partialmock::hook("instance", obj, method),
            11..=13 => partialmock::restore(obj, method),
            _ => partialmock::restore_all(obj).map(|_| ()),
        };
        if let Ok(original) = partialmock::invoke_backup(obj, method, &[]) {
            assert_eq!(original, json!(method));
        }
    }

    tc.call("teardown", &[]).unwrap();
    assert!(!partialmock::is_active());
    for obj in &objects {
        for method in METHODS {
            assert_eq!(obj.call(method, &[]).unwrap(), json!(method));
        }
    }
});
