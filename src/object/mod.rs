//! Dynamic object model with explicit per-object dispatch tables.
//!
//! Every [`Object`] resolves a method name by first looking at its own
//! singleton table and then at its [`Class`]. Interception only ever touches
//! the singleton table, so hooking one object never affects its siblings.

mod class;

pub use class::{Class, ClassBuilder};

use crate::{MockError, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Argument and return value type of every method
pub type Value = serde_json::Value;

/// A method implementation; the first argument is the receiver.
pub type Method = Rc<dyn Fn(&Object, &[Value]) -> Result<Value>>;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an [`Object`], unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ObjectInner {
    id: ObjectId,
    class: Rc<Class>,
    fields: RefCell<HashMap<String, Value>>,
    singleton: RefCell<HashMap<String, Method>>,
}

/// Shared handle to a live object. Clones refer to the same object.
#[derive(Clone)]
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Object {
    pub fn new(class: &Rc<Class>) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                id: ObjectId::next(),
                class: Rc::clone(class),
                fields: RefCell::new(HashMap::new()),
                singleton: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.inner.class
    }

    pub fn class_name(&self) -> &str {
        self.inner.class.name()
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.fields.borrow().get(field).cloned()
    }

    pub fn set(&self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.inner.fields.borrow_mut().insert(field.into(), value)
    }

    /// Resolve the implementation `call` would currently use for `method`.
    pub fn resolve(&self, method: &str) -> Option<Method> {
        if let Some(own) = self.own_method(method) {
            return Some(own);
        }
        self.inner.class.lookup(method)
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.resolve(method).is_some()
    }

    /// Method defined on this object alone, ignoring its class.
    pub fn own_method(&self, method: &str) -> Option<Method> {
        self.inner.singleton.borrow().get(method).map(Rc::clone)
    }

    /// Define (or replace) a method on this object only.
    pub fn define_method<F>(&self, name: impl Into<String>, body: F) -> Option<Method>
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + 'static,
    {
        self.install_method(name, Rc::new(body))
    }

    pub(crate) fn install_method(&self, name: impl Into<String>, method: Method) -> Option<Method> {
        self.inner.singleton.borrow_mut().insert(name.into(), method)
    }

    pub(crate) fn remove_method(&self, name: &str) -> Option<Method> {
        self.inner.singleton.borrow_mut().remove(name)
    }

    /// Invoke `method` with this object as receiver.
    ///
    /// The dispatch table is not borrowed while the body runs, so bodies may
    /// freely rebind methods of the object they run on.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let body = self.resolve(method).ok_or_else(|| MockError::NoSuchMethod {
            class: self.class_name().to_string(),
            method: method.to_string(),
        })?;
        body(self, args)
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{} {}>", self.class_name(), self.inner.id)
    }
}
