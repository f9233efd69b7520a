#![allow(dead_code)]

use partialmock::{Class, Object, Value};
use serde_json::json;
use std::rc::Rc;

/// Stand-in for a framework test case: `teardown` returns 42
pub fn test_case_stub() -> Object {
    let class = Class::builder("TestCaseStub")
        .method("teardown", |_, _| Ok(json!(42)))
        .build();
    Object::new(&class)
}

/// What the original methods of [`target_class`] return
pub fn echo(this: &Object, method: &str, args: &[Value]) -> Value {
    json!({ "self": this.id().as_u64(), "method": method, "args": args })
}

/// Class with `meth1`..`meth4`, each answering with [`echo`]
pub fn target_class() -> Rc<Class> {
    let mut builder = Class::builder("Target");
    for name in ["meth1", "meth2", "meth3", "meth4"] {
        builder = builder.method(name, move |this, args| Ok(echo(this, name, args)));
    }
    builder.build()
}

pub fn target() -> Object {
    Object::new(&target_class())
}
