use super::{Method, Object, Value};
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A named method table with an optional parent class and mixins.
///
/// Classes are immutable once built; per-object changes go through the
/// object's singleton table instead.
pub struct Class {
    name: String,
    parent: Option<Rc<Class>>,
    mixins: Vec<Rc<Class>>,
    methods: HashMap<String, Method>,
}

impl Class {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<Class>> {
        self.parent.as_ref()
    }

    /// Resolve `method` through this class, its mixins and its ancestors.
    ///
    /// Mixins included later shadow those included earlier, and every mixin
    /// shadows the parent chain.
    pub fn lookup(&self, method: &str) -> Option<Method> {
        if let Some(found) = self.methods.get(method) {
            return Some(Rc::clone(found));
        }
        for mixin in self.mixins.iter().rev() {
            if let Some(found) = mixin.lookup(method) {
                return Some(found);
            }
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(method))
    }

    /// Whether instances of this class respond to `method`
    pub fn responds_to(&self, method: &str) -> bool {
        self.lookup(method).is_some()
    }

    /// Names of this class followed by its mixins and ancestors, in lookup order
    pub fn ancestors(&self) -> Vec<String> {
        let mut names = vec![self.name.clone()];
        for mixin in self.mixins.iter().rev() {
            names.extend(mixin.ancestors());
        }
        if let Some(parent) = &self.parent {
            names.extend(parent.ancestors());
        }
        names
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("methods", &methods)
            .finish()
    }
}

/// Builder for [`Class`]
pub struct ClassBuilder {
    name: String,
    parent: Option<Rc<Class>>,
    mixins: Vec<Rc<Class>>,
    methods: HashMap<String, Method>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            mixins: Vec::new(),
            methods: HashMap::new(),
        }
    }

    pub fn extends(mut self, parent: &Rc<Class>) -> Self {
        self.parent = Some(Rc::clone(parent));
        self
    }

    pub fn include(mut self, mixin: &Rc<Class>) -> Self {
        self.mixins.push(Rc::clone(mixin));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + 'static,
    {
        self.methods.insert(name.into(), Rc::new(body));
        self
    }

    pub fn build(self) -> Rc<Class> {
        Rc::new(Class {
            name: self.name,
            parent: self.parent,
            mixins: self.mixins,
            methods: self.methods,
        })
    }
}
